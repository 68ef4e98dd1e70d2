// SPDX-License-Identifier: MPL-2.0
use codec_adapter::media::tensor::{normalize, restore, to_rgb_bytes};
use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array, ArrayD, IxDyn};
use std::hint::black_box;

fn tensor(shape: &[usize]) -> ArrayD<u8> {
    let len: usize = shape.iter().product();
    Array::from_shape_vec(IxDyn(shape), (0..len).map(|v| (v % 251) as u8).collect())
        .expect("shape matches length")
}

fn tensor_normalization_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tensor_normalization");

    let channel_last = tensor(&[1080, 1920, 3]);
    let channel_first = tensor(&[3, 1080, 1920]);
    let batched = tensor(&[1, 3, 1080, 1920]);

    group.bench_function("channel_last_to_bytes", |b| {
        b.iter(|| {
            let (view, _) = normalize(black_box(channel_last.view())).unwrap();
            black_box(to_rgb_bytes(view));
        });
    });

    group.bench_function("channel_first_to_bytes", |b| {
        b.iter(|| {
            let (view, _) = normalize(black_box(channel_first.view())).unwrap();
            black_box(to_rgb_bytes(view));
        });
    });

    group.bench_function("batched_round_trip", |b| {
        b.iter(|| {
            let (view, layout) = normalize(black_box(batched.view())).unwrap();
            black_box(restore(view.to_owned(), layout));
        });
    });

    group.finish();
}

criterion_group!(benches, tensor_normalization_benchmark);
criterion_main!(benches);
