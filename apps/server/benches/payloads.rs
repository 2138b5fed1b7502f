// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmark of the JSON payloads the server handles.
//!
//! Compares:
//! 1. Serializing a synthesized report (response body)
//! 2. Parsing an advisor reply with the report embedded in prose
//!
//! Run with: cargo bench -p rooftop-server --bench payloads

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rooftop_engine::{parse_advisor_response, AdvisoryInput, AnalysisEngine, ClimateContext, LocationRecord};
use rooftop_vision::{FeatureSet, Orientation, RoofMaterial, RoofSlope};

/// Feature sets spanning small to large roofs.
fn feature_sets() -> Vec<(&'static str, FeatureSet)> {
    [("small", 180.0), ("medium", 1400.0), ("large", 12000.0)]
        .into_iter()
        .map(|(name, area)| {
            let features = FeatureSet {
                roof_area_sqft: area,
                usable_area_sqft: area * 0.8,
                orientation: Orientation::SouthWest,
                shading_percent: 18.0,
                roof_material: RoofMaterial::Concrete,
                roof_slope: RoofSlope::Flat,
                complexity_score: 4.2,
                obstacle_count: 3,
            };
            (name, features)
        })
        .collect()
}

fn bench_serialize(c: &mut Criterion) {
    let engine = AnalysisEngine::default();
    let mut group = c.benchmark_group("report_to_json");

    for (name, features) in feature_sets() {
        let input = AdvisoryInput::new(features, ClimateContext::default(), LocationRecord::default());
        let report = engine.synthesize(&input);
        let size = serde_json::to_vec(&report).map(|v| v.len()).unwrap_or(0);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &report, |b, report| {
            b.iter(|| serde_json::to_vec(black_box(report)))
        });
    }

    group.finish();
}

fn bench_parse_advisor(c: &mut Criterion) {
    let engine = AnalysisEngine::default();
    let max_score = engine.config().scoring.max_score;
    let mut group = c.benchmark_group("advisor_reply_parse");

    for (name, features) in feature_sets() {
        let input = AdvisoryInput::new(features, ClimateContext::default(), LocationRecord::default());
        let report = engine.synthesize(&input);
        let reply = format!(
            "Sure! Here is the rooftop analysis.\n```json\n{}\n```\nHope this helps.",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );

        group.throughput(Throughput::Bytes(reply.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &reply, |b, reply| {
            b.iter(|| parse_advisor_response(black_box(reply), max_score))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_parse_advisor);
criterion_main!(benches);
