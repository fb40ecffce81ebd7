//! Host-only rendition of the denoise pipeline
//!
//! Uses the single-pass transforms from `hwt-transform` with no backend
//! involved. Device results are compared against it.

use hwt_core::{
    decomposition_levels, denormalize_pixels, normalize_pixels, HwtError, HwtResult,
    ThresholdParams,
};
use hwt_transform::{
    forward_haar_rows, inverse_haar_rows, threshold_in_place, transposed, validate_cutoff,
};

/// Denoise an 8-bit `width` x `height` image on the host
pub fn denoise_reference(
    input: &[u8],
    width: u32,
    height: u32,
    params: ThresholdParams,
) -> HwtResult<Vec<u8>> {
    let (w, h) = (width as usize, height as usize);
    if decomposition_levels(w).is_none() || decomposition_levels(h).is_none() {
        return Err(HwtError::InvalidDimensions { width, height });
    }
    if input.len() != w * h {
        return Err(HwtError::InvalidParameter(format!(
            "{}x{} image needs {} samples, got {}",
            width,
            height,
            w * h,
            input.len()
        )));
    }
    validate_cutoff(params.cutoff)?;

    let mut rows = normalize_pixels(input);
    forward_haar_rows(&mut rows, w)?;
    let mut columns = transposed(&rows, w, h)?;
    forward_haar_rows(&mut columns, h)?;
    threshold_in_place(&mut columns, params);
    inverse_haar_rows(&mut columns, h)?;
    let mut rows = transposed(&columns, h, w)?;
    inverse_haar_rows(&mut rows, w)?;
    Ok(denormalize_pixels(&rows))
}
