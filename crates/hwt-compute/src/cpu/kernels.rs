//! Group-by-group implementations of the five programs
//!
//! Each kernel checks that the launch extent describes the work its arguments
//! ask for, then runs one closure per work group. Groups that write disjoint
//! output regions run in parallel; groups of one signal share interleaved
//! detail bands, so a signal's groups run in order on one worker.

use hwt_core::consts::{TILE_PADDING, TILE_SIZE};
use hwt_core::{ComputeError, ComputeResult, Program, ThresholdMode, ThresholdParams};
use hwt_transform::{haar_pair, inverse_haar_pair, threshold_value};
use rayon::prelude::*;

use crate::backend::NdRange;

fn extent_error(program: Program, reason: String) -> ComputeError {
    ComputeError::InvalidExtent { program, reason }
}

fn check_len(program: Program, buffer: &[f32], needed: usize) -> ComputeResult<()> {
    if buffer.len() < needed {
        return Err(ComputeError::DispatchFailed {
            program,
            reason: format!(
                "dispatch touches {} samples but the buffer holds {}",
                needed,
                buffer.len()
            ),
        });
    }
    Ok(())
}

/// Group size a step program running `levels` levels must be launched with
fn step_group_size(program: Program, levels: u32, range: &NdRange) -> ComputeResult<usize> {
    if levels == 0 || levels >= usize::BITS {
        return Err(extent_error(program, format!("cannot run {} levels", levels)));
    }
    let group = 1usize << (levels - 1);
    if range.local != [group, 1] || range.global[1] != 1 {
        return Err(extent_error(
            program,
            format!(
                "{} levels need 1D groups of {}, got local {:?}",
                levels, group, range.local
            ),
        ));
    }
    Ok(group)
}

fn signal_geometry(
    program: Program,
    signal_len: usize,
    num_signals: usize,
    range: &NdRange,
) -> ComputeResult<(usize, usize)> {
    if num_signals == 0 || !signal_len.is_power_of_two() {
        return Err(extent_error(
            program,
            format!("{} signals of {} samples", num_signals, signal_len),
        ));
    }
    if range.global[0] % num_signals != 0 {
        return Err(extent_error(
            program,
            format!(
                "global size {} does not split over {} signals",
                range.global[0], num_signals
            ),
        ));
    }
    let total = signal_len
        .checked_mul(num_signals)
        .ok_or_else(|| extent_error(program, "signal batch overflows".to_string()))?;
    Ok((range.global[0] / num_signals, total))
}

/// Forward step: each group runs `levels` Haar levels over `2G` samples
pub(crate) fn forward_step(
    input: &[f32],
    output: &mut [f32],
    levels: u32,
    signal_len: usize,
    num_signals: usize,
    range: &NdRange,
) -> ComputeResult<()> {
    let program = Program::ForwardStep;
    let group = step_group_size(program, levels, range)?;
    let (threads, total) = signal_geometry(program, signal_len, num_signals, range)?;
    if threads > signal_len / 2 || threads % group != 0 {
        return Err(extent_error(
            program,
            format!(
                "{} threads per signal cannot run groups of {} over {} samples",
                threads, group, signal_len
            ),
        ));
    }
    check_len(program, input, total)?;
    check_len(program, output, total)?;

    let active = threads * 2;
    let groups = threads / group;
    output[..total]
        .par_chunks_mut(signal_len)
        .zip(input[..total].par_chunks(signal_len))
        .for_each(|(out, inp)| {
            let mut local = vec![0.0f32; 2 * group];
            for b in 0..groups {
                local.copy_from_slice(&inp[2 * group * b..2 * group * (b + 1)]);
                let mut width = 2 * group;
                for k in 0..levels {
                    let half = width / 2;
                    let band = (active >> (k + 1)) + b * (group >> k);
                    for i in 0..half {
                        let (low, high) = haar_pair(local[2 * i], local[2 * i + 1]);
                        local[i] = low;
                        out[band + i] = high;
                    }
                    width = half;
                }
                out[b] = local[0];
            }
        });
    Ok(())
}

/// Inverse step: each group grows one low-pass sample into `2^levels` samples
pub(crate) fn inverse_step(
    input: &[f32],
    output: &mut [f32],
    levels: u32,
    signal_len: usize,
    num_signals: usize,
    low_len: usize,
    range: &NdRange,
) -> ComputeResult<()> {
    let program = Program::InverseStep;
    let group = step_group_size(program, levels, range)?;
    let (threads, total) = signal_geometry(program, signal_len, num_signals, range)?;
    let span = 2 * group;
    let fits = low_len
        .checked_mul(span)
        .is_some_and(|len| len <= signal_len);
    if low_len == 0 || group.checked_mul(low_len) != Some(threads) || !fits {
        return Err(extent_error(
            program,
            format!(
                "{} threads per signal cannot grow a band of {} by {} levels within {} samples",
                threads, low_len, levels, signal_len
            ),
        ));
    }
    check_len(program, input, total)?;
    check_len(program, output, total)?;

    output[..total]
        .par_chunks_mut(signal_len)
        .zip(input[..total].par_chunks(signal_len))
        .for_each(|(out, inp)| {
            let mut local = vec![0.0f32; span];
            for (g, block) in out[..low_len * span].chunks_exact_mut(span).enumerate() {
                local[0] = inp[g];
                for j in 0..levels {
                    let width = 1usize << j;
                    let details = (low_len << j) + g * width;
                    // Expand from the top so unread low-pass values are not overwritten
                    for i in (0..width).rev() {
                        let (even, odd) = inverse_haar_pair(local[i], inp[details + i]);
                        local[2 * i] = even;
                        local[2 * i + 1] = odd;
                    }
                }
                block.copy_from_slice(&local);
            }
        });
    Ok(())
}

/// Transpose a `height` x `width` matrix through padded shared tiles
pub(crate) fn transpose(
    input: &[f32],
    output: &mut [f32],
    width: usize,
    height: usize,
    range: &NdRange,
) -> ComputeResult<()> {
    let program = Program::Transpose;
    if range.local != [TILE_SIZE, TILE_SIZE] {
        return Err(extent_error(
            program,
            format!("tiles are {0}x{0}, got local {1:?}", TILE_SIZE, range.local),
        ));
    }
    if width == 0 || height == 0 || range.global[0] < width || range.global[1] < height {
        return Err(extent_error(
            program,
            format!(
                "global {:?} does not cover a {}x{} matrix",
                range.global, width, height
            ),
        ));
    }
    let total = width * height;
    check_len(program, input, total)?;
    check_len(program, output, total)?;

    // One chunk per tile column: output rows tx*16 .. tx*16+16
    output[..total]
        .par_chunks_mut(TILE_SIZE * height)
        .enumerate()
        .for_each(|(tx, out)| {
            let mut tile = [[0.0f32; TILE_SIZE + TILE_PADDING]; TILE_SIZE];
            let x0 = tx * TILE_SIZE;
            let cols = TILE_SIZE.min(width - x0);
            for y0 in (0..height).step_by(TILE_SIZE) {
                let rows = TILE_SIZE.min(height - y0);
                for (ly, row) in tile.iter_mut().enumerate().take(rows) {
                    let src = (y0 + ly) * width + x0;
                    row[..cols].copy_from_slice(&input[src..src + cols]);
                }
                for lx in 0..cols {
                    for (ly, row) in tile.iter().enumerate().take(rows) {
                        out[lx * height + y0 + ly] = row[lx];
                    }
                }
            }
        });
    Ok(())
}

/// Hard or soft threshold of `input[..len]`, one group per 256 coefficients
pub(crate) fn threshold(
    input: &[f32],
    output: &mut [f32],
    len: usize,
    cutoff: f32,
    program: Program,
    range: &NdRange,
) -> ComputeResult<()> {
    let mode = match program {
        Program::HardThreshold => ThresholdMode::Hard,
        Program::SoftThreshold => ThresholdMode::Soft,
        other => return Err(ComputeError::ArgumentMismatch { program: other }),
    };
    if range.global[1] != 1 || range.local[1] != 1 || range.global[0] < len {
        return Err(extent_error(
            program,
            format!("global {:?} does not cover {} coefficients", range.global, len),
        ));
    }
    check_len(program, input, len)?;
    check_len(program, output, len)?;

    let params = ThresholdParams::new(cutoff, mode);
    output[..len]
        .par_chunks_mut(range.local[0])
        .zip(input[..len].par_chunks(range.local[0]))
        .for_each(|(out, inp)| {
            for (o, &x) in out.iter_mut().zip(inp) {
                *o = threshold_value(x, params);
            }
        });
    Ok(())
}
