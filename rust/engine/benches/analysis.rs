// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of the local analysis pipeline.
//!
//! Measures:
//! 1. Feature extraction on synthetic roofs of increasing size
//! 2. Report synthesis alone
//! 3. Image to report end to end
//!
//! Run with: cargo bench -p rooftop-engine --bench analysis

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{GrayImage, Luma};
use rooftop_engine::{AdvisoryInput, AnalysisEngine, ClimateContext, LocationRecord};

/// Bright gabled roof with a dark chimney on a dark background.
fn synthetic_roof(size: u32) -> GrayImage {
    let mut img = GrayImage::from_pixel(size, size, Luma([40]));
    let margin = size / 6;
    let ridge = size / 2;

    for y in margin..size - margin {
        for x in margin..size - margin {
            let shade = if y < ridge { 200 } else { 175 };
            img.put_pixel(x, y, Luma([shade]));
        }
    }

    let chimney = size / 12;
    for y in margin + chimney..margin + 2 * chimney {
        for x in ridge..ridge + chimney {
            img.put_pixel(x, y, Luma([25]));
        }
    }

    img
}

fn bench_extraction(c: &mut Criterion) {
    let engine = AnalysisEngine::default();
    let mut group = c.benchmark_group("feature_extraction");

    for size in [256u32, 512, 1024] {
        let img = synthetic_roof(size);
        group.throughput(Throughput::Elements(size as u64 * size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &img, |b, img| {
            b.iter(|| engine.analyze_image(black_box(img)))
        });
    }

    group.finish();
}

fn bench_synthesis(c: &mut Criterion) {
    let engine = AnalysisEngine::default();
    let features = engine
        .analyze_image(&synthetic_roof(512))
        .expect("synthetic roof analyses")
        .features;
    let input = AdvisoryInput::new(features, ClimateContext::default(), LocationRecord::default());

    c.bench_function("synthesize", |b| b.iter(|| engine.synthesize(black_box(&input))));
}

fn bench_end_to_end(c: &mut Criterion) {
    let engine = AnalysisEngine::default();
    let img = synthetic_roof(512);

    c.bench_function("analyze_locally_512", |b| {
        b.iter(|| {
            engine.analyze_locally(
                black_box(&img),
                ClimateContext::default(),
                LocationRecord::default(),
            )
        })
    });
}

criterion_group!(benches, bench_extraction, bench_synthesis, bench_end_to_end);
criterion_main!(benches);
