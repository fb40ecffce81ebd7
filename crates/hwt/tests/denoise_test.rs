//! End-to-end denoising through the engine

use hwt::*;
use std::time::Duration;

fn checkerboard(width: u32, height: u32) -> Vec<u8> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| if (x / 4 + y / 4) % 2 == 0 { 0 } else { 255 }))
        .collect()
}

/// Flat gray plus deterministic noise of up to +-20 levels
fn noisy_flat(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..width * height)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let noise = ((state >> 16) % 41) as i32 - 20;
            (128 + noise) as u8
        })
        .collect()
}

fn mse(a: &[u8], b: &[u8]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    sum / a.len() as f64
}

#[test]
fn test_non_power_of_two_rejected_before_allocation() {
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let input = vec![0u8; 100 * 256];

    let err = cleaner
        .clean_noise(&input, 100, 256, ThresholdParams::soft(0.12))
        .unwrap_err();
    assert!(matches!(
        err,
        HwtError::InvalidDimensions {
            width: 100,
            height: 256
        }
    ));
    assert_eq!(backend.total_allocations(), 0);
}

#[test]
fn test_non_power_of_two_height_rejected_before_allocation() {
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let input = vec![0u8; 256 * 100];

    let err = cleaner
        .clean_noise(&input, 256, 100, ThresholdParams::hard(0.2))
        .unwrap_err();
    assert!(matches!(
        err,
        HwtError::InvalidDimensions {
            width: 256,
            height: 100
        }
    ));
    assert_eq!(backend.total_allocations(), 0);
}

#[test]
fn test_output_has_input_shape() {
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();

    for (w, h) in [(16, 16), (128, 32), (8, 256), (2, 1)] {
        let input = checkerboard(w, h);
        for params in [ThresholdParams::hard(0.2), ThresholdParams::soft(0.12)] {
            let out = cleaner.clean_noise(&input, w, h, params).unwrap();
            assert_eq!(out.len(), input.len(), "{}x{}", w, h);
        }
    }
}

#[test]
fn test_zero_threshold_reconstructs_input() {
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let input = noisy_flat(64, 64, 1);
    let out = cleaner
        .clean_noise(&input, 64, 64, ThresholdParams::hard(0.0))
        .unwrap();
    for (a, b) in input.iter().zip(&out) {
        assert!((*a as i32 - *b as i32).abs() <= 1, "{} vs {}", a, b);
    }
}

#[test]
fn test_soft_threshold_reduces_noise() {
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let clean = vec![128u8; 64 * 64];
    let noisy = noisy_flat(64, 64, 42);

    let denoised = cleaner
        .clean_noise(&noisy, 64, 64, ThresholdParams::soft(0.12))
        .unwrap();
    let before = mse(&clean, &noisy);
    let after = mse(&clean, &denoised);
    assert!(after < before / 2.0, "MSE {} -> {}", before, after);
}

#[test]
fn test_constrained_backend_matches_host_pipeline() {
    let backend = CpuBackend::new()
        .with_group_limit(Program::ForwardStep, 4)
        .with_group_limit(Program::InverseStep, 8);
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let input = noisy_flat(256, 64, 9);

    for params in [ThresholdParams::hard(0.1), ThresholdParams::soft(0.12)] {
        let device = cleaner.clean_noise(&input, 256, 64, params).unwrap();
        let host = denoise_reference(&input, 256, 64, params).unwrap();
        assert_eq!(device, host);
    }
}

#[test]
fn test_concurrent_calls_share_backend() {
    let backend = CpuBackend::new().with_group_limit(Program::ForwardStep, 16);
    let cleaner = NoiseCleaner::new(&backend).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u32)
            .map(|seed| {
                let cleaner = &cleaner;
                scope.spawn(move || {
                    let input = noisy_flat(128, 64, seed);
                    let params = ThresholdParams::soft(0.12);
                    let device = cleaner.clean_noise(&input, 128, 64, params).unwrap();
                    let host = denoise_reference(&input, 128, 64, params).unwrap();
                    device == host
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
    assert_eq!(backend.live_buffers(), 0);
}

#[test]
fn test_denoise_image_with_options() {
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let dims = Dimensions::new(32, 16);
    let image = GrayImage::from_pixels(dims, checkerboard(32, 16)).unwrap();

    let out = cleaner
        .denoise_image(&image, &DenoiseOptions::default())
        .unwrap();
    assert_eq!(out.dimensions, dims);
    assert_eq!(out.pixels.len(), image.pixels.len());
}

/// Delegates to a CPU backend but fails every dispatch of one program
struct FailingBackend {
    inner: CpuBackend,
    fail_on: Program,
}

impl ComputeBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn allocate(&self, size_bytes: usize, access: AccessMode) -> ComputeResult<BufferHandle> {
        self.inner.allocate(size_bytes, access)
    }

    fn release(&self, handle: BufferHandle) -> ComputeResult<()> {
        self.inner.release(handle)
    }

    fn upload(&self, handle: BufferHandle, data: &[f32]) -> ComputeResult<()> {
        self.inner.upload(handle, data)
    }

    fn download(&self, handle: BufferHandle, len: usize) -> ComputeResult<Vec<f32>> {
        self.inner.download(handle, len)
    }

    fn copy(&self, src: BufferHandle, dst: BufferHandle, len: usize) -> ComputeResult<()> {
        self.inner.copy(src, dst, len)
    }

    fn dispatch(
        &self,
        program: Program,
        args: &KernelArgs,
        range: NdRange,
    ) -> ComputeResult<Event> {
        if program == self.fail_on {
            return Err(ComputeError::DispatchFailed {
                program,
                reason: "device lost".to_string(),
            });
        }
        self.inner.dispatch(program, args, range)
    }

    fn wait(&self, event: &Event) -> ComputeResult<()> {
        self.inner.wait(event)
    }

    fn elapsed(&self, event: &Event) -> Duration {
        self.inner.elapsed(event)
    }

    fn max_group_size(&self, program: Program) -> usize {
        self.inner.max_group_size(program)
    }
}

#[test]
fn test_dispatch_failure_releases_buffers() {
    for fail_on in [Program::ForwardStep, Program::SoftThreshold, Program::InverseStep] {
        let backend = FailingBackend {
            inner: CpuBackend::new(),
            fail_on,
        };
        let cleaner = NoiseCleaner::new(&backend).unwrap();
        let err = cleaner
            .clean_noise(&[10; 64], 8, 8, ThresholdParams::soft(0.12))
            .unwrap_err();
        assert!(matches!(
            err,
            HwtError::Compute(ComputeError::DispatchFailed { program, .. }) if program == fail_on
        ));
        assert!(backend.inner.total_allocations() > 0);
        assert_eq!(backend.inner.live_buffers(), 0);
    }
}

#[test]
fn test_profile_reports_every_stage() {
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let (_, profile) = cleaner
        .clean_noise_profiled(&noisy_flat(64, 32, 3), 64, 32, ThresholdParams::hard(0.2))
        .unwrap();
    let total: Duration = profile.stages().iter().map(|(_, d)| *d).sum();
    assert_eq!(total, profile.total());
}
