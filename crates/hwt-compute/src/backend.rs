//! Backend trait and the types passed across it

use hwt_core::{ComputeError, ComputeResult, Program};
use std::time::Duration;

/// Opaque handle to backend-resident memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(u64);

impl BufferHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// How programs may access a buffer (host transfers are always allowed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn can_read(&self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }
}

/// Launch extent: total threads and threads per group, in up to two dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdRange {
    pub global: [usize; 2],
    pub local: [usize; 2],
}

impl NdRange {
    /// One-dimensional launch
    pub fn linear(global: usize, local: usize) -> Self {
        Self {
            global: [global, 1],
            local: [local, 1],
        }
    }

    /// Two-dimensional launch
    pub fn grid(global: [usize; 2], local: [usize; 2]) -> Self {
        Self { global, local }
    }

    /// One-dimensional launch with `len` rounded up to whole groups
    pub fn covering(len: usize, local: usize) -> Self {
        Self::linear(len.next_multiple_of(local), local)
    }

    /// Two-dimensional launch with each edge rounded up to whole tiles
    pub fn covering_grid(width: usize, height: usize, tile: usize) -> Self {
        Self::grid(
            [width.next_multiple_of(tile), height.next_multiple_of(tile)],
            [tile, tile],
        )
    }

    /// Threads in one group, `None` if the product overflows
    pub fn group_size(&self) -> Option<usize> {
        self.local[0].checked_mul(self.local[1])
    }

    /// Groups along each dimension
    pub fn group_counts(&self) -> [usize; 2] {
        [self.global[0] / self.local[0], self.global[1] / self.local[1]]
    }

    /// Check the extent against a program's group limit
    pub fn validate(&self, program: Program, max_group_size: usize) -> ComputeResult<()> {
        for dim in 0..2 {
            if self.local[dim] == 0 || self.global[dim] == 0 {
                return Err(ComputeError::InvalidExtent {
                    program,
                    reason: format!("empty extent {:?}/{:?}", self.global, self.local),
                });
            }
            if self.global[dim] % self.local[dim] != 0 {
                return Err(ComputeError::InvalidExtent {
                    program,
                    reason: format!(
                        "global {} is not a multiple of local {} in dimension {}",
                        self.global[dim], self.local[dim], dim
                    ),
                });
            }
        }
        let group_size = self.group_size().ok_or_else(|| ComputeError::InvalidExtent {
            program,
            reason: format!("group {:?} overflows", self.local),
        })?;
        if group_size > max_group_size {
            return Err(ComputeError::InsufficientCapacity {
                program,
                required: group_size,
                available: max_group_size,
            });
        }
        Ok(())
    }
}

/// Argument bindings for each program
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArgs {
    /// `levels` forward levels per group over `num_signals` signals of `signal_len`
    Forward {
        input: BufferHandle,
        output: BufferHandle,
        levels: u32,
        signal_len: usize,
        num_signals: usize,
    },
    /// `levels` inverse levels per group, starting from a `low_len` low-pass band
    Inverse {
        input: BufferHandle,
        output: BufferHandle,
        levels: u32,
        signal_len: usize,
        num_signals: usize,
        low_len: usize,
    },
    /// Transpose a `height` x `width` row-major matrix
    Transpose {
        input: BufferHandle,
        output: BufferHandle,
        width: usize,
        height: usize,
    },
    /// Threshold the first `len` coefficients
    Threshold {
        input: BufferHandle,
        output: BufferHandle,
        len: usize,
        cutoff: f32,
    },
}

impl KernelArgs {
    /// `(input, output)` buffers bound to the program
    pub fn buffers(&self) -> (BufferHandle, BufferHandle) {
        match *self {
            KernelArgs::Forward { input, output, .. }
            | KernelArgs::Inverse { input, output, .. }
            | KernelArgs::Transpose { input, output, .. }
            | KernelArgs::Threshold { input, output, .. } => (input, output),
        }
    }

    /// Whether these bindings fit `program`'s signature
    pub fn matches(&self, program: Program) -> bool {
        matches!(
            (self, program),
            (KernelArgs::Forward { .. }, Program::ForwardStep)
                | (KernelArgs::Inverse { .. }, Program::InverseStep)
                | (KernelArgs::Transpose { .. }, Program::Transpose)
                | (KernelArgs::Threshold { .. }, Program::HardThreshold)
                | (KernelArgs::Threshold { .. }, Program::SoftThreshold)
        )
    }
}

/// Completion record of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    program: Program,
    sequence: u64,
    elapsed: Duration,
}

impl Event {
    pub fn new(program: Program, sequence: u64, elapsed: Duration) -> Self {
        Self {
            program,
            sequence,
            elapsed,
        }
    }

    pub fn program(&self) -> Program {
        self.program
    }

    /// Position of this dispatch in the backend's command stream
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Execution time recorded by the backend
    pub fn duration(&self) -> Duration {
        self.elapsed
    }
}

/// A device that can hold buffers and run the denoising programs
///
/// Methods take `&self`; implementations synchronize internally so several
/// denoise calls, each with its own buffers, can share one backend.
pub trait ComputeBackend: Send + Sync {
    /// Human-readable device name
    fn name(&self) -> &str;

    /// Allocate `size_bytes` of `f32` storage
    fn allocate(&self, size_bytes: usize, access: AccessMode) -> ComputeResult<BufferHandle>;

    /// Free a buffer
    fn release(&self, handle: BufferHandle) -> ComputeResult<()>;

    /// Copy host samples to the start of a buffer
    fn upload(&self, handle: BufferHandle, data: &[f32]) -> ComputeResult<()>;

    /// Copy the first `len` samples of a buffer to the host
    fn download(&self, handle: BufferHandle, len: usize) -> ComputeResult<Vec<f32>>;

    /// Device-to-device copy of the first `len` samples
    fn copy(&self, src: BufferHandle, dst: BufferHandle, len: usize) -> ComputeResult<()>;

    /// Launch `program`
    fn dispatch(&self, program: Program, args: &KernelArgs, range: NdRange)
        -> ComputeResult<Event>;

    /// Block until the dispatch behind `event` has finished
    fn wait(&self, event: &Event) -> ComputeResult<()>;

    /// Execution time of a finished dispatch
    fn elapsed(&self, event: &Event) -> Duration;

    /// Largest work group `program` can be launched with
    fn max_group_size(&self, program: Program) -> usize;

    /// Dispatch, wait, and report the execution time
    fn run(&self, program: Program, args: &KernelArgs, range: NdRange) -> ComputeResult<Duration> {
        let event = self.dispatch(program, args, range)?;
        self.wait(&event)?;
        Ok(self.elapsed(&event))
    }
}
