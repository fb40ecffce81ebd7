//! Reference compute device running on the host
//!
//! Buffers live in host memory behind per-buffer locks. A dispatch validates
//! its launch extent against the program's group limit, takes a read lock on
//! the input and a write lock on the output, and runs the program's groups in
//! parallel. Completion is synchronous: the event returned by `dispatch` is
//! already finished.

mod kernels;

use crate::backend::{AccessMode, BufferHandle, ComputeBackend, Event, KernelArgs, NdRange};
use hwt_core::consts::DEFAULT_GROUP_LIMIT;
use hwt_core::{ComputeError, ComputeResult, Program};
use std::collections::HashMap;
use std::mem::size_of;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::debug;

struct Slot {
    access: AccessMode,
    data: RwLock<Vec<f32>>,
}

impl Slot {
    fn read(&self) -> RwLockReadGuard<'_, Vec<f32>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<f32>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Host-memory backend with configurable per-program group limits
pub struct CpuBackend {
    buffers: Mutex<HashMap<u64, Arc<Slot>>>,
    group_limits: HashMap<Program, usize>,
    memory_limit: Option<usize>,
    allocated_bytes: AtomicUsize,
    next_handle: AtomicU64,
    next_event: AtomicU64,
    total_allocations: AtomicUsize,
}

impl CpuBackend {
    /// Backend whose programs all accept groups of up to 256 threads
    pub fn new() -> Self {
        Self {
            buffers: Mutex::new(HashMap::new()),
            group_limits: Program::ALL
                .iter()
                .map(|&p| (p, DEFAULT_GROUP_LIMIT))
                .collect(),
            memory_limit: None,
            allocated_bytes: AtomicUsize::new(0),
            next_handle: AtomicU64::new(1),
            next_event: AtomicU64::new(0),
            total_allocations: AtomicUsize::new(0),
        }
    }

    /// Override the maximum group size of one program
    pub fn with_group_limit(mut self, program: Program, limit: usize) -> Self {
        self.group_limits.insert(program, limit);
        self
    }

    /// Override the maximum group size of every program
    pub fn with_uniform_group_limit(mut self, limit: usize) -> Self {
        for value in self.group_limits.values_mut() {
            *value = limit;
        }
        self
    }

    /// Fail allocations once `bytes` are in use
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Buffers allocated and not yet released
    pub fn live_buffers(&self) -> usize {
        self.slots().len()
    }

    /// Allocations made over the backend's lifetime
    pub fn total_allocations(&self) -> usize {
        self.total_allocations.load(Ordering::Relaxed)
    }

    /// Bytes currently allocated
    pub fn allocated_bytes(&self) -> usize {
        self.allocated_bytes.load(Ordering::Acquire)
    }

    /// Account for `bytes` more in use, atomically checking the memory limit
    fn reserve(&self, bytes: usize) -> ComputeResult<()> {
        self.allocated_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |in_use| {
                let next = in_use.checked_add(bytes)?;
                match self.memory_limit {
                    Some(limit) if next > limit => None,
                    _ => Some(next),
                }
            })
            .map(|_| ())
            .map_err(|in_use| ComputeError::AllocationFailed {
                bytes,
                reason: match self.memory_limit {
                    Some(limit) => format!("{} of {} bytes already in use", in_use, limit),
                    None => "allocation size overflows".to_string(),
                },
            })
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<u64, Arc<Slot>>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, handle: BufferHandle) -> ComputeResult<Arc<Slot>> {
        self.slots()
            .get(&handle.id())
            .cloned()
            .ok_or(ComputeError::UnknownBuffer(handle.id()))
    }

    fn execute(&self, program: Program, args: &KernelArgs, range: &NdRange) -> ComputeResult<()> {
        let (input, output) = args.buffers();
        if input == output {
            return Err(ComputeError::AliasedBuffers {
                program,
                handle: input.id(),
            });
        }

        let src = self.slot(input)?;
        let dst = self.slot(output)?;
        if !src.access.can_read() {
            return Err(ComputeError::AccessViolation {
                handle: input.id(),
                operation: "program reads",
            });
        }
        if !dst.access.can_write() {
            return Err(ComputeError::AccessViolation {
                handle: output.id(),
                operation: "program writes",
            });
        }

        // Lock in handle order so opposing dispatches cannot deadlock
        let (src_data, mut dst_data) = if input < output {
            let r = src.read();
            (r, dst.write())
        } else {
            let w = dst.write();
            (src.read(), w)
        };

        match *args {
            KernelArgs::Forward {
                levels,
                signal_len,
                num_signals,
                ..
            } => kernels::forward_step(
                &src_data,
                &mut dst_data,
                levels,
                signal_len,
                num_signals,
                range,
            ),
            KernelArgs::Inverse {
                levels,
                signal_len,
                num_signals,
                low_len,
                ..
            } => kernels::inverse_step(
                &src_data,
                &mut dst_data,
                levels,
                signal_len,
                num_signals,
                low_len,
                range,
            ),
            KernelArgs::Transpose { width, height, .. } => {
                kernels::transpose(&src_data, &mut dst_data, width, height, range)
            }
            KernelArgs::Threshold { len, cutoff, .. } => {
                kernels::threshold(&src_data, &mut dst_data, len, cutoff, program, range)
            }
        }
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu-reference"
    }

    fn allocate(&self, size_bytes: usize, access: AccessMode) -> ComputeResult<BufferHandle> {
        if size_bytes == 0 || size_bytes % size_of::<f32>() != 0 {
            return Err(ComputeError::AllocationFailed {
                bytes: size_bytes,
                reason: "size must be a positive multiple of 4".to_string(),
            });
        }
        self.reserve(size_bytes)?;

        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let slot = Slot {
            access,
            data: RwLock::new(vec![0.0; size_bytes / size_of::<f32>()]),
        };
        self.slots().insert(id, Arc::new(slot));
        self.total_allocations.fetch_add(1, Ordering::Relaxed);
        Ok(BufferHandle::from_raw(id))
    }

    fn release(&self, handle: BufferHandle) -> ComputeResult<()> {
        let slot = self
            .slots()
            .remove(&handle.id())
            .ok_or(ComputeError::UnknownBuffer(handle.id()))?;
        let bytes = slot.read().len() * size_of::<f32>();
        self.allocated_bytes.fetch_sub(bytes, Ordering::AcqRel);
        Ok(())
    }

    fn upload(&self, handle: BufferHandle, data: &[f32]) -> ComputeResult<()> {
        let slot = self.slot(handle)?;
        let mut dst = slot.write();
        if data.len() > dst.len() {
            return Err(ComputeError::TransferOutOfBounds {
                handle: handle.id(),
                requested: data.len(),
                available: dst.len(),
            });
        }
        dst[..data.len()].copy_from_slice(data);
        Ok(())
    }

    fn download(&self, handle: BufferHandle, len: usize) -> ComputeResult<Vec<f32>> {
        let slot = self.slot(handle)?;
        let src = slot.read();
        if len > src.len() {
            return Err(ComputeError::TransferOutOfBounds {
                handle: handle.id(),
                requested: len,
                available: src.len(),
            });
        }
        Ok(src[..len].to_vec())
    }

    fn copy(&self, src: BufferHandle, dst: BufferHandle, len: usize) -> ComputeResult<()> {
        if src == dst {
            return Ok(());
        }
        let from = self.slot(src)?;
        let to = self.slot(dst)?;
        let (from_data, mut to_data) = if src < dst {
            let r = from.read();
            (r, to.write())
        } else {
            let w = to.write();
            (from.read(), w)
        };
        let available = from_data.len().min(to_data.len());
        if len > available {
            return Err(ComputeError::TransferOutOfBounds {
                handle: if from_data.len() < to_data.len() { src.id() } else { dst.id() },
                requested: len,
                available,
            });
        }
        to_data[..len].copy_from_slice(&from_data[..len]);
        Ok(())
    }

    fn dispatch(
        &self,
        program: Program,
        args: &KernelArgs,
        range: NdRange,
    ) -> ComputeResult<Event> {
        if !args.matches(program) {
            return Err(ComputeError::ArgumentMismatch { program });
        }
        range.validate(program, self.max_group_size(program))?;

        let sequence = self.next_event.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        self.execute(program, args, &range)?;
        let elapsed = start.elapsed();

        debug!(
            %program,
            sequence,
            global = ?range.global,
            local = ?range.local,
            elapsed_us = elapsed.as_micros() as u64,
            "dispatch complete"
        );
        Ok(Event::new(program, sequence, elapsed))
    }

    fn wait(&self, _event: &Event) -> ComputeResult<()> {
        Ok(())
    }

    fn elapsed(&self, event: &Event) -> Duration {
        event.duration()
    }

    fn max_group_size(&self, program: Program) -> usize {
        self.group_limits
            .get(&program)
            .copied()
            .unwrap_or(DEFAULT_GROUP_LIMIT)
    }
}
