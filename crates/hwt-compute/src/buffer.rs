//! Scoped device buffers
//!
//! A [`DeviceBuffer`] owns its backend allocation and releases it when
//! dropped, so every exit path out of a pipeline (including `?` on a failed
//! dispatch) frees device memory.

use crate::backend::{AccessMode, BufferHandle, ComputeBackend};
use hwt_core::{ComputeError, ComputeResult};
use std::mem::size_of;

pub struct DeviceBuffer<'a, B: ComputeBackend + ?Sized> {
    backend: &'a B,
    handle: BufferHandle,
    len: usize,
}

impl<'a, B: ComputeBackend + ?Sized> DeviceBuffer<'a, B> {
    /// Allocate room for `len` samples
    pub fn new(backend: &'a B, len: usize, access: AccessMode) -> ComputeResult<Self> {
        let bytes = len
            .checked_mul(size_of::<f32>())
            .ok_or_else(|| ComputeError::AllocationFailed {
                bytes: usize::MAX,
                reason: format!("{} samples overflow the address space", len),
            })?;
        let handle = backend.allocate(bytes, access)?;
        Ok(Self {
            backend,
            handle,
            len,
        })
    }

    /// Allocate a read-write buffer holding a copy of `data`
    pub fn from_slice(backend: &'a B, data: &[f32]) -> ComputeResult<Self> {
        let buffer = Self::new(backend, data.len(), AccessMode::ReadWrite)?;
        buffer.upload(data)?;
        Ok(buffer)
    }

    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn upload(&self, data: &[f32]) -> ComputeResult<()> {
        self.backend.upload(self.handle, data)
    }

    /// Read the whole buffer back
    pub fn download(&self) -> ComputeResult<Vec<f32>> {
        self.backend.download(self.handle, self.len)
    }
}

impl<B: ComputeBackend + ?Sized> Drop for DeviceBuffer<'_, B> {
    fn drop(&mut self) {
        if let Err(err) = self.backend.release(self.handle) {
            tracing::warn!(handle = self.handle.id(), %err, "failed to release device buffer");
        }
    }
}

impl<B: ComputeBackend + ?Sized> std::fmt::Debug for DeviceBuffer<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("handle", &self.handle)
            .field("len", &self.len)
            .finish()
    }
}
