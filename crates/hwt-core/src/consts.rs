//! Constants used throughout the denoising pipeline

/// 1/√2, the forward Haar normalization factor
pub const INV_SQRT_2: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// √2, the inverse Haar normalization factor
pub const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// Edge of the square tile used by the transpose program
pub const TILE_SIZE: usize = 16;

/// Extra column per tile row so column reads hit distinct memory banks
pub const TILE_PADDING: usize = 1;

/// Elements handled by one threshold work group
pub const THRESHOLD_GROUP_SIZE: usize = 256;

/// Soft operational limit on image edges (device memory and sync limits)
pub const MAX_EDGE: u32 = 1024;

/// Default maximum work-group size reported by the reference backend
pub const DEFAULT_GROUP_LIMIT: usize = 256;

/// Default threshold for 8-bit images normalized to [0, 1]
pub const DEFAULT_THRESHOLD: f32 = 0.12;

/// Absolute per-element tolerance used when comparing against regression fixtures
pub const FIXTURE_TOLERANCE: f32 = 0.001;

/// Scale between 8-bit samples and normalized floats
pub const PIXEL_SCALE: f32 = 255.0;
