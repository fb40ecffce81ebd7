//! Error types for wavelet denoising operations

use crate::Program;
use thiserror::Error;

/// Result type for denoising operations
pub type HwtResult<T> = Result<T, HwtError>;

/// Result type for compute backend operations
pub type ComputeResult<T> = Result<T, ComputeError>;

/// Errors that can occur while validating, transforming or denoising
#[derive(Error, Debug)]
pub enum HwtError {
    #[error("Signal length {len} is not a power of two")]
    NotPowerOfTwo { len: usize },

    #[error("Invalid dimensions: {width}x{height} (each edge must be a power of two)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Compute error: {0}")]
    Compute(#[from] ComputeError),

    #[error("Unsupported format: {bit_depth}-bit with {channels} channel(s), expected 8-bit single channel")]
    UnsupportedFormat { bit_depth: u16, channels: u8 },

    #[error("Buffer too small: expected {expected}, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("Image codec error: {0}")]
    ImageCodec(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl HwtError {
    /// True for the dimension errors raised before any device work happens
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            HwtError::NotPowerOfTwo { .. } | HwtError::InvalidDimensions { .. }
        )
    }
}

/// Failures reported by a compute backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("Failed to allocate {bytes} bytes: {reason}")]
    AllocationFailed { bytes: usize, reason: String },

    #[error("Unknown buffer handle #{0}")]
    UnknownBuffer(u64),

    #[error("Transfer of {requested} elements exceeds buffer #{handle} ({available} elements)")]
    TransferOutOfBounds {
        handle: u64,
        requested: usize,
        available: usize,
    },

    #[error("Buffer #{handle} does not allow {operation}")]
    AccessViolation { handle: u64, operation: &'static str },

    #[error("Input and output of {program} alias buffer #{handle}")]
    AliasedBuffers { program: Program, handle: u64 },

    #[error("Invalid launch extent for {program}: {reason}")]
    InvalidExtent { program: Program, reason: String },

    #[error("Arguments do not match program {program}")]
    ArgumentMismatch { program: Program },

    #[error("{program} needs work groups of {required} but the device allows {available}")]
    InsufficientCapacity {
        program: Program,
        required: usize,
        available: usize,
    },

    #[error("Dispatch of {program} failed: {reason}")]
    DispatchFailed { program: Program, reason: String },
}
