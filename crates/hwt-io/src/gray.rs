//! 8-bit grayscale image files

use hwt_core::{Dimensions, GrayImage, HwtError, HwtResult};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::BufWriter;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

fn codec_error(err: image::ImageError) -> HwtError {
    HwtError::ImageCodec(err.to_string())
}

fn decode(path: &Path) -> HwtResult<DynamicImage> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(codec_error)
}

fn into_gray(width: u32, height: u32, pixels: Vec<u8>) -> HwtResult<GrayImage> {
    GrayImage::from_pixels(Dimensions::new(width, height), pixels)
}

/// Load an image that is already 8-bit single-channel
pub fn load_gray8<P: AsRef<Path>>(path: P) -> HwtResult<GrayImage> {
    let path = path.as_ref();
    match decode(path)? {
        DynamicImage::ImageLuma8(buffer) => {
            let (width, height) = buffer.dimensions();
            debug!(path = %path.display(), width, height, "loaded gray image");
            into_gray(width, height, buffer.into_raw())
        }
        other => {
            let color = other.color();
            let channels = color.channel_count();
            Err(HwtError::UnsupportedFormat {
                bit_depth: color.bits_per_pixel() / channels.max(1) as u16,
                channels,
            })
        }
    }
}

/// Load any decodable image, converting it to 8-bit luma
pub fn load_gray8_converting<P: AsRef<Path>>(path: P) -> HwtResult<GrayImage> {
    let path = path.as_ref();
    let decoded = decode(path)?;
    let color = decoded.color();
    let buffer = decoded.into_luma8();
    let (width, height) = buffer.dimensions();
    debug!(path = %path.display(), width, height, source = ?color, "loaded and converted image");
    into_gray(width, height, buffer.into_raw())
}

/// Save an image, picking the format from the file extension
///
/// The image is encoded into a temporary file next to `path` and renamed over
/// it once complete, so a failed save never leaves a truncated file behind.
pub fn save_gray8<P: AsRef<Path>>(path: P, image: &GrayImage) -> HwtResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).map_err(codec_error)?;
    let buffer = image::GrayImage::from_raw(image.width(), image.height(), image.pixels.clone())
        .ok_or(HwtError::BufferTooSmall {
            expected: image.pixel_count(),
            actual: image.pixels.len(),
        })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        DynamicImage::ImageLuma8(buffer)
            .write_to(&mut writer, format)
            .map_err(codec_error)?;
    }
    tmp.persist(path).map_err(|err| HwtError::IoError(err.error))?;

    debug!(path = %path.display(), dimensions = %image.dimensions, "saved gray image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample(width: u32, height: u32) -> GrayImage {
        let pixels = (0..width * height).map(|i| (i % 251) as u8).collect();
        GrayImage::from_pixels(Dimensions::new(width, height), pixels).unwrap()
    }

    #[test]
    fn test_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let image = sample(32, 16);
        save_gray8(&path, &image).unwrap();
        assert_eq!(load_gray8(&path).unwrap(), image);
    }

    #[test]
    fn test_rgb_rejected_unless_converting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("color.png");
        RgbImage::from_pixel(8, 4, Rgb([10, 200, 30])).save(&path).unwrap();

        let err = load_gray8(&path).unwrap_err();
        assert!(matches!(
            err,
            HwtError::UnsupportedFormat {
                bit_depth: 8,
                channels: 3
            }
        ));

        let converted = load_gray8_converting(&path).unwrap();
        assert_eq!(converted.dimensions, Dimensions::new(8, 4));
    }

    #[test]
    fn test_failed_save_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown-ext");
        assert!(save_gray8(&path, &sample(4, 4)).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_gray8("/nonexistent/input.png").unwrap_err();
        assert!(matches!(err, HwtError::IoError(_)));
    }
}
