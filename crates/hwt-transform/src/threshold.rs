//! Wavelet coefficient thresholding

use hwt_core::{HwtError, HwtResult, ThresholdMode, ThresholdParams};

/// Keep `x` when `|x| > cutoff`, otherwise zero (ties are suppressed)
#[inline]
pub fn hard_threshold(x: f32, cutoff: f32) -> f32 {
    if x.abs() > cutoff {
        x
    } else {
        0.0
    }
}

/// `sign(x) * max(|x| - cutoff, 0)`
#[inline]
pub fn soft_threshold(x: f32, cutoff: f32) -> f32 {
    let magnitude = (x.abs() - cutoff).max(0.0);
    if magnitude == 0.0 {
        0.0
    } else {
        x.signum() * magnitude
    }
}

/// Apply a single coefficient rule
#[inline]
pub fn threshold_value(x: f32, params: ThresholdParams) -> f32 {
    match params.mode {
        ThresholdMode::Hard => hard_threshold(x, params.cutoff),
        ThresholdMode::Soft => soft_threshold(x, params.cutoff),
    }
}

/// Threshold `input` into `output` elementwise
pub fn apply_threshold(
    input: &[f32],
    output: &mut [f32],
    params: ThresholdParams,
) -> HwtResult<()> {
    if output.len() < input.len() {
        return Err(HwtError::BufferTooSmall {
            expected: input.len(),
            actual: output.len(),
        });
    }
    for (o, &x) in output.iter_mut().zip(input) {
        *o = threshold_value(x, params);
    }
    Ok(())
}

/// Threshold a coefficient buffer in place
pub fn threshold_in_place(coeffs: &mut [f32], params: ThresholdParams) {
    for c in coeffs.iter_mut() {
        *c = threshold_value(*c, params);
    }
}

/// Reject cutoffs that would make every rule meaningless
pub fn validate_cutoff(cutoff: f32) -> HwtResult<()> {
    if !cutoff.is_finite() || cutoff < 0.0 {
        return Err(HwtError::InvalidParameter(format!(
            "threshold cutoff must be finite and non-negative, got {}",
            cutoff
        )));
    }
    Ok(())
}
