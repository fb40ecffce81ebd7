//! Benchmarks for the 1D transform, transpose and threshold stages
//!
//! Run with: cargo bench --bench transforms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hwt_compute::CpuBackend;
use hwt_core::{Program, ThresholdParams};
use hwt_denoise::NoiseCleaner;
use hwt_transform::{forward_haar_in_place, inverse_haar_in_place, threshold_in_place, transposed};

fn signal(len: usize) -> Vec<f32> {
    (0..len).map(|i| ((i * 31) % 97) as f32 / 97.0).collect()
}

fn bench_host_haar(c: &mut Criterion) {
    let mut group = c.benchmark_group("Host Haar");

    for len in [256usize, 1024, 4096] {
        let input = signal(len);
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("forward", len), &input, |b, input| {
            b.iter(|| {
                let mut data = input.clone();
                forward_haar_in_place(black_box(&mut data)).unwrap();
                data
            });
        });

        group.bench_with_input(BenchmarkId::new("inverse", len), &input, |b, input| {
            b.iter(|| {
                let mut data = input.clone();
                inverse_haar_in_place(black_box(&mut data)).unwrap();
                data
            });
        });
    }

    group.finish();
}

fn bench_device_forward_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("Device forward by group limit");
    let (len, rows) = (1024usize, 64usize);
    let input = signal(len * rows);
    group.throughput(Throughput::Elements(input.len() as u64));

    for limit in [4usize, 32, 256] {
        let backend = CpuBackend::new().with_group_limit(Program::ForwardStep, limit);
        let cleaner = NoiseCleaner::new(&backend).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(limit), &input, |b, input| {
            b.iter(|| cleaner.forward_transform(black_box(input), len).unwrap());
        });
    }

    group.finish();
}

fn bench_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("Transpose");
    let backend = CpuBackend::new();
    let cleaner = NoiseCleaner::new(&backend).unwrap();

    for n in [256usize, 1024] {
        let matrix = signal(n * n);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(BenchmarkId::new("host", n), &matrix, |b, m| {
            b.iter(|| transposed(black_box(m), n, n).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("device", n), &matrix, |b, m| {
            b.iter(|| cleaner.transpose(black_box(m), n, n).unwrap());
        });
    }

    group.finish();
}

fn bench_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("Threshold");
    let coeffs = signal(512 * 512);
    group.throughput(Throughput::Elements(coeffs.len() as u64));

    for params in [ThresholdParams::hard(0.12), ThresholdParams::soft(0.12)] {
        group.bench_function(params.mode.name(), |b| {
            b.iter(|| {
                let mut data = coeffs.clone();
                threshold_in_place(black_box(&mut data), params);
                data
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_host_haar,
    bench_device_forward_capacity,
    bench_transpose,
    bench_threshold
);
criterion_main!(benches);
