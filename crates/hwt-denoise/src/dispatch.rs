//! Dispatch drivers for the individual pipeline stages
//!
//! Each driver issues one or more programs on the backend and returns the
//! summed execution time the backend reported for them.

use hwt_compute::{ComputeBackend, DeviceBuffer, KernelArgs, NdRange};
use hwt_core::consts::{THRESHOLD_GROUP_SIZE, TILE_SIZE};
use hwt_core::{require_levels, HwtError, HwtResult, Program, ThresholdParams};
use hwt_transform::LevelSchedule;
use std::time::Duration;

fn batch_len(signal_len: usize, num_signals: usize) -> HwtResult<usize> {
    signal_len.checked_mul(num_signals).ok_or_else(|| {
        HwtError::InvalidParameter(format!(
            "{} signals of {} samples overflow",
            num_signals, signal_len
        ))
    })
}

/// Forward transform of `num_signals` contiguous signals from `input` into `output`
///
/// Runs `ceil(L / capacity)` dispatches. Between dispatches the partial result
/// is copied back into `input`, so `input` does not survive a multi-pass
/// transform.
pub fn forward_rows<B: ComputeBackend + ?Sized>(
    backend: &B,
    input: &DeviceBuffer<'_, B>,
    output: &DeviceBuffer<'_, B>,
    signal_len: usize,
    num_signals: usize,
    capacity: u32,
) -> HwtResult<Duration> {
    let total = batch_len(signal_len, num_signals)?;
    if require_levels(signal_len)? == 0 {
        backend.copy(input.handle(), output.handle(), total)?;
        return Ok(Duration::ZERO);
    }

    let schedule = LevelSchedule::forward(signal_len, capacity)?;
    let passes = schedule.len();
    let mut elapsed = Duration::ZERO;
    for (i, pass) in schedule.enumerate() {
        let args = KernelArgs::Forward {
            input: input.handle(),
            output: output.handle(),
            levels: pass.levels,
            signal_len,
            num_signals,
        };
        let range = NdRange::linear(pass.global_size(num_signals), pass.group_size);
        elapsed += backend.run(Program::ForwardStep, &args, range)?;
        if i + 1 < passes {
            backend.copy(output.handle(), input.handle(), total)?;
        }
    }
    Ok(elapsed)
}

/// Inverse transform of `num_signals` contiguous coefficient vectors
///
/// A multi-pass inverse first seeds `output` with the coefficients so the
/// detail bands a pass does not rewrite are still present for the next one.
pub fn inverse_rows<B: ComputeBackend + ?Sized>(
    backend: &B,
    input: &DeviceBuffer<'_, B>,
    output: &DeviceBuffer<'_, B>,
    signal_len: usize,
    num_signals: usize,
    capacity: u32,
) -> HwtResult<Duration> {
    let total = batch_len(signal_len, num_signals)?;
    if require_levels(signal_len)? == 0 {
        backend.copy(input.handle(), output.handle(), total)?;
        return Ok(Duration::ZERO);
    }

    let schedule = LevelSchedule::inverse(signal_len, capacity)?;
    let passes = schedule.len();
    if passes > 1 {
        backend.copy(input.handle(), output.handle(), total)?;
    }

    let mut elapsed = Duration::ZERO;
    for (i, pass) in schedule.enumerate() {
        let args = KernelArgs::Inverse {
            input: input.handle(),
            output: output.handle(),
            levels: pass.levels,
            signal_len,
            num_signals,
            low_len: pass.low_len,
        };
        let range = NdRange::linear(pass.global_size(num_signals), pass.group_size);
        elapsed += backend.run(Program::InverseStep, &args, range)?;
        if i + 1 < passes {
            backend.copy(output.handle(), input.handle(), total)?;
        }
    }
    Ok(elapsed)
}

/// Transpose a `height` x `width` matrix from `input` into `output`
pub fn transpose<B: ComputeBackend + ?Sized>(
    backend: &B,
    input: &DeviceBuffer<'_, B>,
    output: &DeviceBuffer<'_, B>,
    width: usize,
    height: usize,
) -> HwtResult<Duration> {
    let args = KernelArgs::Transpose {
        input: input.handle(),
        output: output.handle(),
        width,
        height,
    };
    let range = NdRange::covering_grid(width, height, TILE_SIZE);
    Ok(backend.run(Program::Transpose, &args, range)?)
}

/// Threshold the first `len` coefficients of `input` into `output`
pub fn threshold<B: ComputeBackend + ?Sized>(
    backend: &B,
    input: &DeviceBuffer<'_, B>,
    output: &DeviceBuffer<'_, B>,
    len: usize,
    params: ThresholdParams,
) -> HwtResult<Duration> {
    let args = KernelArgs::Threshold {
        input: input.handle(),
        output: output.handle(),
        len,
        cutoff: params.cutoff,
    };
    let range = NdRange::covering(len, THRESHOLD_GROUP_SIZE);
    Ok(backend.run(params.program(), &args, range)?)
}
