// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-multipath-synth project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use criterion::{criterion_group, criterion_main, Criterion};
use rust_multipath_synth::loader::{ChannelResponse, Segment, SignalLibrary};
use rust_multipath_synth::synthesis::{synthesize_paths, SegmentWindow, SynthesisParams, Synthesizer};
use std::hint::black_box;

const FS: f64 = 48_000.0;

fn response(frequency: f64, paths: usize) -> ChannelResponse {
    let amplitudes = (0..paths).map(|p| 1.0 / (p + 1) as f64).collect();
    let delays = (0..paths).map(|p| p as f64 * 1.7e-3).collect();
    let phases = (0..paths).map(|p| p as f64 * 0.3).collect();
    ChannelResponse::new(frequency, amplitudes, delays, phases).expect("aligned path sequences")
}

fn bench_kernel(c: &mut Criterion) {
    let time_base: Vec<f64> = (0..4800).map(|i| i as f64 / FS).collect();
    let channel = response(1000.0, 32);
    c.bench_function("synthesize_paths 32 paths x 0.1 s", |b| {
        b.iter(|| synthesize_paths(1000.0, FS, black_box(&time_base), 1.0, 0.0, &channel))
    });
}

fn bench_compositor(c: &mut Criterion) {
    let frequencies: Vec<f64> = (1..=8).map(|k| k as f64 * 500.0).collect();
    let segment = Segment::from_parallel(&[1.0; 8], &frequencies, &[0.0; 8]).expect("aligned components");
    let spacing: Vec<f64> = (0..16).map(|k| k as f64 * 0.1).collect();
    let library = SignalLibrary::new(FS, spacing, vec![segment; 16], frequencies.clone())
        .expect("valid library");
    let responses: Vec<ChannelResponse> = frequencies.iter().map(|&f| response(f, 16)).collect();
    let column: Vec<&ChannelResponse> = responses.iter().collect();
    let synthesizer = Synthesizer::new(SynthesisParams::default()).expect("default parameters");

    c.bench_function("generate 16 segments x 8 tones x 16 paths", |b| {
        b.iter(|| {
            synthesizer
                .generate_window(
                    black_box(&library),
                    &column,
                    1e5,
                    SegmentWindow { start: 0, len: 16 },
                )
                .expect("synthesis")
        })
    });
}

criterion_group!(benches, bench_kernel, bench_compositor);
criterion_main!(benches);
