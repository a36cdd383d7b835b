//! Performance benchmarks for bundle building and scanning
//!
//! Firmware bundles are scanned in one pass over the whole file; these
//! benchmarks track the cost of that pass at realistic partition sizes.

use criterion::{Criterion, criterion_group, criterion_main};
use fwbundle::bundle::{BundleBuilder, SummarySink, scan, short_sha1};
use fwbundle::config::ManifestDefaults;
use fwbundle::models::PartitionKind;
use std::hint::black_box;

fn firmware_bundle() -> Vec<u8> {
    BundleBuilder::new(ManifestDefaults::default())
        .partition(PartitionKind::Boot, vec![0x5A; 0x40000])
        .partition(PartitionKind::Kernel, vec![0xA5; 0x1C0000])
        .partition(PartitionKind::Rootfs, vec![0x3C; 0x480000])
        .build()
        .expect("Benchmark bundle should build")
        .to_bytes()
        .expect("Benchmark bundle should serialize")
}

/// Benchmark truncated digest over a kernel-sized payload
fn benchmark_short_sha1(c: &mut Criterion) {
    let kernel = vec![0xA5u8; 0x200000];

    c.bench_function("short_sha1_kernel", |b| {
        b.iter(|| black_box(short_sha1(black_box(&kernel))));
    });
}

/// Benchmark a full validation pass
fn benchmark_scan(c: &mut Criterion) {
    let data = firmware_bundle();

    c.bench_function("scan_full_bundle", |b| {
        b.iter(|| {
            let report = scan(black_box(&data), &mut SummarySink).expect("Bundle should scan");
            black_box(report);
        });
    });
}

/// Benchmark manifest construction and serialization
fn benchmark_build(c: &mut Criterion) {
    c.bench_function("build_full_bundle", |b| {
        b.iter(|| black_box(firmware_bundle()));
    });
}

criterion_group!(benches, benchmark_short_sha1, benchmark_scan, benchmark_build);
criterion_main!(benches);
