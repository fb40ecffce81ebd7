//! End-to-end denoising benchmarks
//!
//! Run with: cargo bench --bench denoise

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hwt_compute::CpuBackend;
use hwt_core::ThresholdParams;
use hwt_denoise::{denoise_reference, NoiseCleaner};

fn noisy_image(width: u32, height: u32) -> Vec<u8> {
    let mut state = 12_345u32;
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x + y) % 256))
        .map(|base| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (base as i32 + ((state >> 16) % 31) as i32 - 15).clamp(0, 255) as u8
        })
        .collect()
}

fn bench_denoise(c: &mut Criterion) {
    let mut group = c.benchmark_group("Denoise");
    group.sample_size(20);
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();
    let params = ThresholdParams::soft(0.12);

    for size in [256u32, 512, 1024] {
        let image = noisy_image(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("device", size), &image, |b, image| {
            b.iter(|| cleaner.clean_noise(black_box(image), size, size, params).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("host_reference", size), &image, |b, image| {
            b.iter(|| denoise_reference(black_box(image), size, size, params).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_denoise);
criterion_main!(benches);
