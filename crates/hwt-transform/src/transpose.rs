//! Tiled matrix transpose
//!
//! Lets the row transform run over columns: transpose, transform rows,
//! transpose back. Works tile by tile so both the reads and the writes of a
//! tile stay within a few cache lines.

use hwt_core::consts::TILE_SIZE;
use hwt_core::{HwtError, HwtResult};

/// Transpose a `height` x `width` row-major matrix into `output` (`width` x `height`)
pub fn transpose(input: &[f32], output: &mut [f32], width: usize, height: usize) -> HwtResult<()> {
    let expected = width * height;
    if input.len() != expected {
        return Err(HwtError::InvalidParameter(format!(
            "matrix {}x{} needs {} samples, got {}",
            width,
            height,
            expected,
            input.len()
        )));
    }
    if output.len() < expected {
        return Err(HwtError::BufferTooSmall {
            expected,
            actual: output.len(),
        });
    }

    for tile_y in (0..height).step_by(TILE_SIZE) {
        for tile_x in (0..width).step_by(TILE_SIZE) {
            for y in tile_y..(tile_y + TILE_SIZE).min(height) {
                for x in tile_x..(tile_x + TILE_SIZE).min(width) {
                    output[x * height + y] = input[y * width + x];
                }
            }
        }
    }

    Ok(())
}

/// Allocating variant of [`transpose`]
pub fn transposed(input: &[f32], width: usize, height: usize) -> HwtResult<Vec<f32>> {
    let mut output = vec![0.0f32; width * height];
    transpose(input, &mut output, width, height)?;
    Ok(output)
}
