// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the flatscan-document crate. Covers the full
// automatic pipeline on a synthetic page photo and the fallback path on a
// featureless image.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use flatscan_core::{ImageKind, ScanConfig};
use flatscan_document::{ImageProcessor, ScanEngine};
use image::{DynamicImage, Rgb, RgbImage};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn encode_png(img: RgbImage) -> Vec<u8> {
    ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
        .to_png_bytes()
        .expect("encode fixture")
}

/// A 640x480 photo: dark desk with a light page from (80, 60) to (560, 420).
fn page_photo() -> Vec<u8> {
    let mut img = RgbImage::from_pixel(640, 480, Rgb([30, 32, 40]));
    for y in 60..420 {
        for x in 80..560 {
            img.put_pixel(x, y, Rgb([238, 236, 228]));
        }
    }
    encode_png(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_scan(c: &mut Criterion) {
    let engine = ScanEngine::new(ScanConfig::default()).expect("engine");
    let page = page_photo();
    let blank = encode_png(RgbImage::from_pixel(640, 480, Rgb([0, 0, 0])));

    c.bench_function("scan detected page (640x480)", |b| {
        b.iter(|| {
            let result = engine.scan(black_box(&page), Some(ImageKind::Png));
            black_box(result.expect("scan"));
        });
    });

    c.bench_function("scan fallback (640x480)", |b| {
        b.iter(|| {
            let result = engine.scan(black_box(&blank), Some(ImageKind::Png));
            black_box(result.expect("scan"));
        });
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
