//! Denoising options

use hwt_core::consts::DEFAULT_THRESHOLD;
use hwt_core::{ThresholdMode, ThresholdParams};

/// Threshold settings for [`NoiseCleaner::denoise_image`](crate::NoiseCleaner::denoise_image)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoiseOptions {
    /// Coefficient cutoff on the `[0, 1]` sample scale
    pub threshold: f32,
    /// Hard or soft shrinkage
    pub mode: ThresholdMode,
}

impl Default for DenoiseOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            mode: ThresholdMode::Soft,
        }
    }
}

impl DenoiseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Negative and NaN cutoffs become 0
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    pub fn mode(mut self, mode: ThresholdMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn hard(self) -> Self {
        self.mode(ThresholdMode::Hard)
    }

    pub fn soft(self) -> Self {
        self.mode(ThresholdMode::Soft)
    }

    pub fn params(&self) -> ThresholdParams {
        ThresholdParams::new(self.threshold, self.mode)
    }
}

impl From<ThresholdParams> for DenoiseOptions {
    fn from(params: ThresholdParams) -> Self {
        Self::new().threshold(params.cutoff).mode(params.mode)
    }
}
