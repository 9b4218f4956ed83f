// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::BenchmarkId;
use criterion::Throughput;
use criterion::{criterion_group, criterion_main, Criterion};
use hdrhistogram::{Histogram, Width};

fn record(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram/record");

    for sigfig in 1..=4 {
        let mut histogram = Histogram::new_with_max(3_600_000_000, sigfig).unwrap();
        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("min/sigfig", sigfig), |b| {
            b.iter(|| histogram.record(1))
        });
        group.bench_function(BenchmarkId::new("max/sigfig", sigfig), |b| {
            b.iter(|| histogram.record(3_600_000_000))
        });
    }
}

fn record_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram/record/width");

    for width in [Width::U16, Width::U32, Width::U64] {
        let mut histogram = Histogram::builder()
            .highest_trackable_value(3_600_000_000)
            .counter_width(width)
            .build()
            .unwrap();
        group.throughput(Throughput::Elements(1));
        group.bench_function(BenchmarkId::new("bytes", width.bytes()), |b| {
            b.iter(|| {
                let _ = histogram.record(1_000_000);
                histogram.reset();
            })
        });
    }
}

fn percentile(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram/percentile");

    for sigfig in 1..=4 {
        let mut histogram = Histogram::new_with_max(3_600_000_000, sigfig).unwrap();
        for value in 1..=100_000 {
            let _ = histogram.record(value * 31);
        }
        group.bench_function(BenchmarkId::new("p999/sigfig", sigfig), |b| {
            b.iter(|| histogram.value_at_percentile(99.9))
        });
    }
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram/encode");

    let mut histogram = Histogram::new_with_max(3_600_000_000, 3).unwrap();
    for value in 1..=100_000 {
        let _ = histogram.record(value * 31);
    }
    group.bench_function("encode", |b| b.iter(|| histogram.encode()));

    let encoded = histogram.encode().unwrap();
    group.bench_function("decode", |b| b.iter(|| Histogram::decode(&encoded)));
}

criterion_group!(benches, record, record_widths, percentile, encode);
criterion_main!(benches);
