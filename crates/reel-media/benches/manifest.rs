//! Benchmark the per-run bookkeeping on a large album.
//!
//! Uses 20,000 synthetic photos (about 2,200 segments) to measure:
//! - segmentation + change detection against a full prior ledger
//! - manifest rendering
//! - manifest parsing back into index records

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reel_core::config::FingerprintConfig;
use reel_media::hls::{parse_manifest, render_manifest};
use reel_media::{find_resume_point, IndexRecord, Photo, Segmenter};

const PHOTOS: usize = 20_000;

fn album() -> Vec<Photo> {
    let rule = FingerprintConfig::default();
    (0..PHOTOS)
        .map(|i| {
            let name = format!(
                "VRChat_1920x1080_2024-{:02}-{:02}_{:02}-{:02}-{:02}.{:03}.png",
                i / 1_000 % 12 + 1,
                i / 100 % 28 + 1,
                i / 60 % 24,
                i % 60,
                i % 59,
                i % 1_000
            );
            Photo::new(format!("/album/{name}"), &rule).unwrap()
        })
        .collect()
}

fn entry_name(i: usize) -> String {
    format!("video-{i:05}_00000.ts")
}

fn bench_manifest(c: &mut Criterion) {
    let photos = album();
    let segmenter = Segmenter::new(9).unwrap();
    let records: Vec<IndexRecord> = segmenter
        .segment(&photos)
        .map(|s| IndexRecord::from(&s))
        .collect();
    let text = render_manifest(&records, entry_name);

    let mut group = c.benchmark_group("manifest");

    group.bench_function("detect_up_to_date", |b| {
        b.iter(|| find_resume_point(segmenter.segment(black_box(&photos)), black_box(&records)));
    });

    group.bench_function("render", |b| {
        b.iter(|| render_manifest(black_box(&records), entry_name));
    });

    group.bench_function("parse", |b| {
        b.iter(|| parse_manifest(black_box(&text)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_manifest);
criterion_main!(benches);
