//! Benchmarks for the synchronous extraction pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use streamscout::config::{ExtractionConfig, ScoutConfig};
use streamscout::engine::ExtractionEngine;
use streamscout::extract::patterns::is_likely_media;
use streamscout::testing::{full_featured_page, hostile_page, ScriptedTransport, FIXTURE_PAGE_URL};
use streamscout::validate::validate_and_rank;

fn engine() -> anyhow::Result<ExtractionEngine> {
    Ok(ExtractionEngine::new(
        Arc::new(ScriptedTransport::new()),
        ScoutConfig::default(),
    )?)
}

fn extraction_benchmark(c: &mut Criterion) {
    let engine = engine().expect("default config is valid");
    let page = full_featured_page();
    let hostile = hostile_page();

    c.bench_function("extract_full_page", |b| {
        b.iter(|| engine.extract_from_content(black_box(&page), FIXTURE_PAGE_URL));
    });

    c.bench_function("extract_hostile_page", |b| {
        b.iter(|| engine.extract_from_content(black_box(&hostile), FIXTURE_PAGE_URL));
    });

    let candidates = engine
        .extract_from_content(&page, FIXTURE_PAGE_URL)
        .links;
    let config = ExtractionConfig::default();
    c.bench_function("validate_and_rank", |b| {
        b.iter(|| validate_and_rank(black_box(candidates.clone()), &config));
    });

    c.bench_function("is_likely_media", |b| {
        b.iter(|| is_likely_media(black_box("https://cdn.example.com/hls/master_1080p.m3u8?token=abc"), 10));
    });
}

criterion_group!(benches, extraction_benchmark);
criterion_main!(benches);
