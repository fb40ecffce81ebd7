//! # Haar wavelet denoising
//!
//! Removes noise from power-of-two sized 8-bit grayscale images by shrinking
//! their 2D Haar wavelet coefficients.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hwt::{load_gray8, save_gray8, CpuBackend, DenoiseOptions, NoiseCleaner};
//!
//! let backend = CpuBackend::new();
//! let cleaner = NoiseCleaner::new(&backend).unwrap();
//!
//! let image = load_gray8("noisy.png").unwrap();
//! let options = DenoiseOptions::new().threshold(0.12).soft();
//! let clean = cleaner.denoise_image(&image, &options).unwrap();
//! save_gray8("clean.png", &clean).unwrap();
//! ```
//!
//! ## Layout
//!
//! - `hwt-core`: errors, constants, images, threshold parameters
//! - `hwt-transform`: host Haar transform, transpose, thresholding, dispatch schedules
//! - `hwt-compute`: the compute backend interface and the CPU reference device
//! - `hwt-denoise`: the denoising engine
//! - `hwt-io`: image files and float fixtures

pub use hwt_core::consts;
pub use hwt_core::{
    decomposition_levels, denormalize_pixels, levels_per_dispatch, normalize_pixels,
    ComputeError, ComputeResult, Dimensions, GrayImage, HwtError, HwtResult, Program,
    ThresholdMode, ThresholdParams,
};

pub use hwt_transform::{
    buffers_match, forward_haar, hard_threshold, inverse_haar, max_abs_diff, soft_threshold,
    transposed, LevelSchedule, Pass,
};

pub use hwt_compute::{
    AccessMode, BufferHandle, ComputeBackend, CpuBackend, DeviceBuffer, Event, KernelArgs,
    NdRange,
};

pub use hwt_denoise::{denoise_reference, DenoiseOptions, DenoiseProfile, NoiseCleaner};

pub use hwt_io::{
    load_gray8, load_gray8_converting, read_fixture, read_fixture_file, save_gray8,
    write_fixture, write_fixture_file,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
