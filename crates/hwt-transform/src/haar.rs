//! Normalized (orthogonal) discrete Haar wavelet transform
//!
//! Forward level over the first `w` samples:
//! `out[i] = (in[2i] + in[2i+1]) / √2`, `out[i + w/2] = (in[2i] - in[2i+1]) / √2`.
//! The full transform repeats this on the low-pass half until one scaling
//! coefficient remains at index 0. The inverse starts from `w = 1` and doubles
//! `w` until it spans the signal.
//!
//! Device programs build on [`haar_pair`] and [`inverse_haar_pair`] so that a
//! transform split over several dispatches produces the same bits as the
//! single-pass functions here.

use hwt_core::consts::{INV_SQRT_2, SQRT_2};
use hwt_core::{require_levels, HwtError, HwtResult};

/// Forward butterfly: `(low, high)` for an adjacent sample pair
#[inline]
pub fn haar_pair(a: f32, b: f32) -> (f32, f32) {
    ((a + b) * INV_SQRT_2, (a - b) * INV_SQRT_2)
}

/// Inverse butterfly: the `(even, odd)` samples behind a `(low, high)` pair
#[inline]
pub fn inverse_haar_pair(low: f32, high: f32) -> (f32, f32) {
    let even = (low + high) * SQRT_2 * 0.5;
    let odd = low * SQRT_2 - even;
    (even, odd)
}

/// One forward level over `data[..width]`, using `scratch[..width]`
fn forward_level(data: &mut [f32], scratch: &mut [f32], width: usize) {
    let half = width / 2;
    scratch[..width].copy_from_slice(&data[..width]);
    for i in 0..half {
        let (low, high) = haar_pair(scratch[2 * i], scratch[2 * i + 1]);
        data[i] = low;
        data[i + half] = high;
    }
}

/// One inverse level growing the low-pass band from `half` to `2 * half` samples
fn inverse_level(data: &mut [f32], scratch: &mut [f32], half: usize) {
    scratch[..2 * half].copy_from_slice(&data[..2 * half]);
    for i in 0..half {
        let (even, odd) = inverse_haar_pair(scratch[i], scratch[i + half]);
        data[2 * i] = even;
        data[2 * i + 1] = odd;
    }
}

/// Full forward transform of one signal, in place
pub fn forward_haar_in_place(signal: &mut [f32]) -> HwtResult<()> {
    require_levels(signal.len())?;
    let mut scratch = vec![0.0f32; signal.len()];
    let mut width = signal.len();
    while width > 1 {
        forward_level(signal, &mut scratch, width);
        width /= 2;
    }
    Ok(())
}

/// Full inverse transform of one signal, in place
pub fn inverse_haar_in_place(coeffs: &mut [f32]) -> HwtResult<()> {
    require_levels(coeffs.len())?;
    let mut scratch = vec![0.0f32; coeffs.len()];
    let mut half = 1;
    while half < coeffs.len() {
        inverse_level(coeffs, &mut scratch, half);
        half *= 2;
    }
    Ok(())
}

/// Forward transform of `input` into `output`
pub fn forward_haar(input: &[f32], output: &mut [f32]) -> HwtResult<()> {
    check_same_len(input, output)?;
    output.copy_from_slice(input);
    forward_haar_in_place(output)
}

/// Inverse transform of `input` into `output`
pub fn inverse_haar(input: &[f32], output: &mut [f32]) -> HwtResult<()> {
    check_same_len(input, output)?;
    output.copy_from_slice(input);
    inverse_haar_in_place(output)
}

/// Forward transform of every `row_len`-sample row of a row-major buffer
pub fn forward_haar_rows(data: &mut [f32], row_len: usize) -> HwtResult<()> {
    require_levels(row_len)?;
    check_whole_rows(data, row_len)?;
    for row in data.chunks_exact_mut(row_len) {
        forward_haar_in_place(row)?;
    }
    Ok(())
}

/// Inverse transform of every `row_len`-sample row of a row-major buffer
pub fn inverse_haar_rows(data: &mut [f32], row_len: usize) -> HwtResult<()> {
    require_levels(row_len)?;
    check_whole_rows(data, row_len)?;
    for row in data.chunks_exact_mut(row_len) {
        inverse_haar_in_place(row)?;
    }
    Ok(())
}

fn check_same_len(input: &[f32], output: &[f32]) -> HwtResult<()> {
    if output.len() < input.len() {
        return Err(HwtError::BufferTooSmall {
            expected: input.len(),
            actual: output.len(),
        });
    }
    if output.len() != input.len() {
        return Err(HwtError::InvalidParameter(format!(
            "output holds {} samples, input {}",
            output.len(),
            input.len()
        )));
    }
    Ok(())
}

fn check_whole_rows(data: &[f32], row_len: usize) -> HwtResult<()> {
    if data.len() % row_len != 0 {
        return Err(HwtError::InvalidParameter(format!(
            "{} samples do not form whole rows of {}",
            data.len(),
            row_len
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signal(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| ((i * 37 + 11) % 101) as f32 / 101.0 - 0.25)
            .collect()
    }

    #[test]
    fn test_forward_two_samples() {
        let mut out = [0.0f32; 2];
        forward_haar(&[3.0, 1.0], &mut out).unwrap();
        assert!((out[0] - 4.0 * INV_SQRT_2).abs() < 1e-6);
        assert!((out[1] - 2.0 * INV_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_forward_known_coefficients() {
        let input = [1.0f32, 2.0, 3.0, 4.0];
        let mut out = [0.0f32; 4];
        forward_haar(&input, &mut out).unwrap();

        // Scaling coefficient is sum / sqrt(N), the coarsest detail compares halves
        assert!((out[0] - 5.0).abs() < 1e-5, "scaling = {}", out[0]);
        assert!((out[1] - -2.0).abs() < 1e-5, "coarse detail = {}", out[1]);
        assert!((out[2] - -INV_SQRT_2).abs() < 1e-5);
        assert!((out[3] - -INV_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_constant_signal_has_no_detail() {
        let input = vec![0.5f32; 64];
        let mut out = vec![0.0f32; 64];
        forward_haar(&input, &mut out).unwrap();
        assert!((out[0] - 0.5 * 8.0).abs() < 1e-5);
        for (i, c) in out.iter().enumerate().skip(1) {
            assert!(c.abs() < 1e-6, "detail {} = {}", i, c);
        }
    }

    #[test]
    fn test_roundtrip_all_sizes() {
        for k in 1..=10 {
            let len = 1usize << k;
            let input = test_signal(len);
            let mut coeffs = vec![0.0f32; len];
            let mut restored = vec![0.0f32; len];

            forward_haar(&input, &mut coeffs).unwrap();
            inverse_haar(&coeffs, &mut restored).unwrap();

            for i in 0..len {
                assert!(
                    (input[i] - restored[i]).abs() < 0.001,
                    "len {} index {}: {} vs {}",
                    len,
                    i,
                    input[i],
                    restored[i]
                );
            }
        }
    }

    #[test]
    fn test_energy_preserved() {
        let input = test_signal(256);
        let mut coeffs = vec![0.0f32; 256];
        forward_haar(&input, &mut coeffs).unwrap();

        let energy_in: f32 = input.iter().map(|x| x * x).sum();
        let energy_out: f32 = coeffs.iter().map(|x| x * x).sum();
        assert!((energy_in - energy_out).abs() < 1e-3 * energy_in.max(1.0));
    }

    #[test]
    fn test_single_sample_is_identity() {
        let mut out = [0.0f32; 1];
        forward_haar(&[0.75], &mut out).unwrap();
        assert_eq!(out[0], 0.75);
        inverse_haar(&[0.75], &mut out).unwrap();
        assert_eq!(out[0], 0.75);
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        let input = vec![0.0f32; 200];
        let mut out = vec![0.0f32; 200];
        let err = forward_haar(&input, &mut out).unwrap_err();
        assert!(matches!(err, HwtError::NotPowerOfTwo { len: 200 }));
        assert!(inverse_haar(&input, &mut out).is_err());
    }

    #[test]
    fn test_rows_match_individual_transforms() {
        let row_len = 32;
        let rows = 4;
        let data = test_signal(row_len * rows);

        let mut batched = data.clone();
        forward_haar_rows(&mut batched, row_len).unwrap();

        for (r, row) in data.chunks(row_len).enumerate() {
            let mut single = vec![0.0f32; row_len];
            forward_haar(row, &mut single).unwrap();
            assert_eq!(&batched[r * row_len..(r + 1) * row_len], &single[..]);
        }

        inverse_haar_rows(&mut batched, row_len).unwrap();
        for (a, b) in batched.iter().zip(data.iter()) {
            assert!((a - b).abs() < 0.001);
        }
    }

    #[test]
    fn test_partial_rows_rejected() {
        let mut data = vec![0.0f32; 48];
        assert!(forward_haar_rows(&mut data, 32).is_err());
    }
}
