//! Image data structures

use crate::{consts::PIXEL_SCALE, Dimensions, HwtError, HwtResult};

/// An 8-bit single-channel image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    pub dimensions: Dimensions,
    pub pixels: Vec<u8>,
}

impl GrayImage {
    /// Create a black image
    pub fn new(dimensions: Dimensions) -> HwtResult<Self> {
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(HwtError::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
            });
        }

        Ok(Self {
            dimensions,
            pixels: vec![0; dimensions.pixel_count()],
        })
    }

    /// Wrap existing pixels, checking the length against the dimensions
    pub fn from_pixels(dimensions: Dimensions, pixels: Vec<u8>) -> HwtResult<Self> {
        let expected = dimensions.pixel_count();
        if expected == 0 {
            return Err(HwtError::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
            });
        }
        if pixels.len() != expected {
            return Err(HwtError::BufferTooSmall {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self { dimensions, pixels })
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn pixel_count(&self) -> usize {
        self.dimensions.pixel_count()
    }
}

/// Map 8-bit samples to `[0, 1]`
pub fn normalize_pixels(pixels: &[u8]) -> Vec<f32> {
    pixels.iter().map(|&p| p as f32 / PIXEL_SCALE).collect()
}

/// Map normalized samples back to 8 bits
///
/// Truncates towards zero; the float-to-int cast saturates, so values
/// outside `[0, 1]` land on 0 or 255.
pub fn denormalize_pixels(samples: &[f32]) -> Vec<u8> {
    samples.iter().map(|&v| (v * PIXEL_SCALE) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pixels_checks_length() {
        let dims = Dimensions::new(4, 2);
        assert!(GrayImage::from_pixels(dims, vec![0; 8]).is_ok());

        let err = GrayImage::from_pixels(dims, vec![0; 7]).unwrap_err();
        assert!(matches!(
            err,
            HwtError::BufferTooSmall {
                expected: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(GrayImage::new(Dimensions::new(0, 16)).is_err());
    }

    #[test]
    fn test_normalize_roundtrip_within_one_level() {
        let pixels: Vec<u8> = (0..=255).collect();
        let restored = denormalize_pixels(&normalize_pixels(&pixels));
        // p / 255 * 255 can land just under p; truncation then loses one step
        for (p, r) in pixels.iter().zip(restored.iter()) {
            assert!((*p as i32 - *r as i32).abs() <= 1, "pixel {} restored as {}", p, r);
        }
    }

    #[test]
    fn test_denormalize_saturates() {
        assert_eq!(denormalize_pixels(&[-0.5, 0.0, 1.0, 1.7, f32::NAN]), vec![0, 0, 255, 255, 0]);
        assert_eq!(denormalize_pixels(&[0.5]), vec![127]);
    }
}
