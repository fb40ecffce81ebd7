//! Compute backend abstraction for wavelet denoising
//!
//! The engine never touches device memory directly. It talks to a
//! [`ComputeBackend`]: allocate buffers, move data, launch one of the five
//! denoising programs over an [`NdRange`], and wait for completion. Work-group
//! size limits reported per program bound how much of a transform a single
//! dispatch may do.
//!
//! [`CpuBackend`] is the reference device. It executes each program group by
//! group with the same data movement a GPU kernel would use, running groups in
//! parallel on the rayon thread pool.

pub mod backend;
pub mod buffer;
pub mod cpu;

pub use backend::{AccessMode, BufferHandle, ComputeBackend, Event, KernelArgs, NdRange};
pub use buffer::DeviceBuffer;
pub use cpu::CpuBackend;
