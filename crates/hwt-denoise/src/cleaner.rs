//! The denoising engine

use crate::dispatch;
use crate::options::DenoiseOptions;
use crate::profile::DenoiseProfile;
use hwt_compute::{AccessMode, ComputeBackend, DeviceBuffer};
use hwt_core::consts::{MAX_EDGE, THRESHOLD_GROUP_SIZE, TILE_SIZE};
use hwt_core::{
    decomposition_levels, denormalize_pixels, levels_per_dispatch, normalize_pixels,
    require_levels, ComputeError, Dimensions, GrayImage, HwtError, HwtResult, Program,
    ThresholdParams,
};
use hwt_transform::validate_cutoff;
use tracing::{info, warn};

/// Wavelet denoiser bound to one compute backend
///
/// Construction queries how many Haar levels each transform program can run
/// per dispatch. Every call allocates its own device buffers and releases
/// them before returning, so one cleaner (or several sharing a backend) can
/// serve concurrent calls.
pub struct NoiseCleaner<'b, B: ComputeBackend + ?Sized> {
    backend: &'b B,
    forward_capacity: u32,
    inverse_capacity: u32,
}

impl<'b, B: ComputeBackend + ?Sized> NoiseCleaner<'b, B> {
    pub fn new(backend: &'b B) -> HwtResult<Self> {
        let forward_capacity = transform_capacity(backend, Program::ForwardStep)?;
        let inverse_capacity = transform_capacity(backend, Program::InverseStep)?;
        require_group(backend, Program::Transpose, TILE_SIZE * TILE_SIZE)?;
        require_group(backend, Program::HardThreshold, THRESHOLD_GROUP_SIZE)?;
        require_group(backend, Program::SoftThreshold, THRESHOLD_GROUP_SIZE)?;

        info!(
            backend = backend.name(),
            forward_capacity, inverse_capacity, "noise cleaner ready"
        );
        Ok(Self {
            backend,
            forward_capacity,
            inverse_capacity,
        })
    }

    /// Forward levels one dispatch can run
    pub fn forward_capacity(&self) -> u32 {
        self.forward_capacity
    }

    /// Inverse levels one dispatch can run
    pub fn inverse_capacity(&self) -> u32 {
        self.inverse_capacity
    }

    /// Denoise an 8-bit row-major `width` x `height` image
    pub fn clean_noise(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        params: ThresholdParams,
    ) -> HwtResult<Vec<u8>> {
        self.clean_noise_profiled(input, width, height, params)
            .map(|(pixels, _)| pixels)
    }

    /// [`clean_noise`](Self::clean_noise) plus the kernel time of every stage
    pub fn clean_noise_profiled(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
        params: ThresholdParams,
    ) -> HwtResult<(Vec<u8>, DenoiseProfile)> {
        validate_request(input, width, height, params)?;
        // Column stages run as row transforms over the transposed matrix
        let rows = Dimensions::new(width, height);
        let columns = rows.transposed();
        let (w, h) = (rows.width as usize, rows.height as usize);
        let (cw, ch) = (columns.width as usize, columns.height as usize);
        let n = rows.pixel_count();
        let backend = self.backend;

        let a = DeviceBuffer::from_slice(backend, &normalize_pixels(input))?;
        let b = DeviceBuffer::new(backend, n, AccessMode::ReadWrite)?;

        let forward = self.forward_capacity;
        let inverse = self.inverse_capacity;
        let profile = DenoiseProfile {
            forward_rows: dispatch::forward_rows(backend, &a, &b, w, h, forward)?,
            transpose: dispatch::transpose(backend, &b, &a, w, h)?,
            forward_columns: dispatch::forward_rows(backend, &a, &b, cw, ch, forward)?,
            threshold: dispatch::threshold(backend, &b, &a, n, params)?,
            inverse_columns: dispatch::inverse_rows(backend, &a, &b, cw, ch, inverse)?,
            transpose_back: dispatch::transpose(backend, &b, &a, cw, ch)?,
            inverse_rows: dispatch::inverse_rows(backend, &a, &b, w, h, inverse)?,
        };

        let output = denormalize_pixels(&b.download()?);

        for (stage, duration) in profile.stages() {
            info!(stage, elapsed_us = duration.as_micros() as u64, "denoise stage");
        }
        info!(
            width,
            height,
            mode = params.mode.name(),
            cutoff = params.cutoff,
            total_us = profile.total().as_micros() as u64,
            "denoised image"
        );
        Ok((output, profile))
    }

    /// Denoise a [`GrayImage`] with the given options
    pub fn denoise_image(
        &self,
        image: &GrayImage,
        options: &DenoiseOptions,
    ) -> HwtResult<GrayImage> {
        let params = options.params();
        let pixels = self.clean_noise(&image.pixels, image.width(), image.height(), params)?;
        GrayImage::from_pixels(image.dimensions, pixels)
    }

    /// Forward transform of every `signal_len`-sample signal in `signals`
    pub fn forward_transform(&self, signals: &[f32], signal_len: usize) -> HwtResult<Vec<f32>> {
        let num_signals = signal_count(signals, signal_len)?;
        let input = DeviceBuffer::from_slice(self.backend, signals)?;
        let output = DeviceBuffer::new(self.backend, signals.len(), AccessMode::ReadWrite)?;
        dispatch::forward_rows(
            self.backend,
            &input,
            &output,
            signal_len,
            num_signals,
            self.forward_capacity,
        )?;
        Ok(output.download()?)
    }

    /// Inverse transform of every `signal_len`-sample coefficient vector in `coeffs`
    pub fn inverse_transform(&self, coeffs: &[f32], signal_len: usize) -> HwtResult<Vec<f32>> {
        let num_signals = signal_count(coeffs, signal_len)?;
        let input = DeviceBuffer::from_slice(self.backend, coeffs)?;
        let output = DeviceBuffer::new(self.backend, coeffs.len(), AccessMode::ReadWrite)?;
        dispatch::inverse_rows(
            self.backend,
            &input,
            &output,
            signal_len,
            num_signals,
            self.inverse_capacity,
        )?;
        Ok(output.download()?)
    }

    /// Transpose a `height` x `width` row-major matrix on the device
    pub fn transpose(&self, matrix: &[f32], width: usize, height: usize) -> HwtResult<Vec<f32>> {
        if width == 0 || height == 0 || matrix.len() != width * height {
            return Err(HwtError::InvalidParameter(format!(
                "{}x{} matrix needs {} samples, got {}",
                width,
                height,
                width * height,
                matrix.len()
            )));
        }
        let input = DeviceBuffer::from_slice(self.backend, matrix)?;
        let output = DeviceBuffer::new(self.backend, matrix.len(), AccessMode::ReadWrite)?;
        dispatch::transpose(self.backend, &input, &output, width, height)?;
        Ok(output.download()?)
    }

    /// Threshold a coefficient vector on the device
    pub fn threshold(&self, coeffs: &[f32], params: ThresholdParams) -> HwtResult<Vec<f32>> {
        validate_cutoff(params.cutoff)?;
        if coeffs.is_empty() {
            return Ok(Vec::new());
        }
        let input = DeviceBuffer::from_slice(self.backend, coeffs)?;
        let output = DeviceBuffer::new(self.backend, coeffs.len(), AccessMode::ReadWrite)?;
        dispatch::threshold(self.backend, &input, &output, coeffs.len(), params)?;
        Ok(output.download()?)
    }
}

fn transform_capacity<B: ComputeBackend + ?Sized>(backend: &B, program: Program) -> HwtResult<u32> {
    let capacity = levels_per_dispatch(backend.max_group_size(program));
    if capacity == 0 {
        return Err(ComputeError::InsufficientCapacity {
            program,
            required: 1,
            available: 0,
        }
        .into());
    }
    Ok(capacity)
}

fn require_group<B: ComputeBackend + ?Sized>(
    backend: &B,
    program: Program,
    required: usize,
) -> HwtResult<()> {
    let available = backend.max_group_size(program);
    if available < required {
        return Err(ComputeError::InsufficientCapacity {
            program,
            required,
            available,
        }
        .into());
    }
    Ok(())
}

/// Everything checked before a single buffer is allocated
fn validate_request(
    input: &[u8],
    width: u32,
    height: u32,
    params: ThresholdParams,
) -> HwtResult<()> {
    if decomposition_levels(width as usize).is_none()
        || decomposition_levels(height as usize).is_none()
    {
        return Err(HwtError::InvalidDimensions { width, height });
    }
    let dimensions = Dimensions::new(width, height);
    if input.len() != dimensions.pixel_count() {
        return Err(HwtError::InvalidParameter(format!(
            "{} image needs {} samples, got {}",
            dimensions,
            dimensions.pixel_count(),
            input.len()
        )));
    }
    validate_cutoff(params.cutoff)?;

    if width > MAX_EDGE || height > MAX_EDGE {
        warn!(%dimensions, max_edge = MAX_EDGE, "image edge exceeds the supported size");
    }
    Ok(())
}

fn signal_count(data: &[f32], signal_len: usize) -> HwtResult<usize> {
    require_levels(signal_len)?;
    if data.is_empty() || data.len() % signal_len != 0 {
        return Err(HwtError::BufferTooSmall {
            expected: data.len().next_multiple_of(signal_len).max(signal_len),
            actual: data.len(),
        });
    }
    Ok(data.len() / signal_len)
}
