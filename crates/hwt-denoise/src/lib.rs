//! Haar wavelet denoising engine
//!
//! [`NoiseCleaner`] drives the separable 2D pipeline on a
//! [`ComputeBackend`](hwt_compute::ComputeBackend): forward rows, transpose,
//! forward columns, threshold, inverse columns, transpose back, inverse rows.
//! The [`dispatch`] module splits each 1D transform into as many dispatches as
//! the backend's group limits require.

pub mod cleaner;
pub mod dispatch;
pub mod options;
pub mod profile;
pub mod reference;

pub use cleaner::NoiseCleaner;
pub use options::DenoiseOptions;
pub use profile::DenoiseProfile;
pub use reference::denoise_reference;
