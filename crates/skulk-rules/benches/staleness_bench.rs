//! Benchmarks for the old-series rule.
//!
//! Run with: cargo bench --package alopex-skulk-rules
//!
//! ## Benchmark Categories
//!
//! - **Apply**: accumulation over many blocks, single and multi-threaded
//! - **Report**: sort, filter and format at the end of traversal

use alopex_skulk_rules::key::composite_key;
use alopex_skulk_rules::{Rule, StalenessRule, Value};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::io;
use std::thread;

const SERIES: usize = 10_000;
const FIELDS: usize = 4;

/// Generate one block per (series, field) with regular one-second samples.
fn generate_blocks() -> Vec<(Vec<u8>, Vec<Value>)> {
    let start_ts = 1_000_000_000_i64;
    let interval = 1_000_000_000_i64;

    let mut blocks = Vec::with_capacity(SERIES * FIELDS);
    for series in 0..SERIES {
        for field in 0..FIELDS {
            let key = composite_key(
                format!("cpu,host=server{series}").as_bytes(),
                format!("field{field}").as_bytes(),
            );
            let values = (0..8)
                .map(|i| Value::float(start_ts + (series as i64 + i) * interval, 1.0))
                .collect();
            blocks.push((key, values));
        }
    }
    blocks
}

fn new_rule() -> StalenessRule {
    StalenessRule::with_format(
        1_000_000_000 + (SERIES as i64 / 2) * 1_000_000_000,
        Box::new(io::sink()),
        "text",
    )
    .unwrap()
}

fn bench_apply(c: &mut Criterion) {
    let blocks = generate_blocks();
    let mut group = c.benchmark_group("old_series_apply");
    group.throughput(Throughput::Elements(blocks.len() as u64));

    group.bench_function("sequential", |b| {
        b.iter_batched(
            new_rule,
            |rule| {
                for (key, values) in &blocks {
                    black_box(rule.apply(key, values).unwrap());
                }
                rule
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function("four_threads", |b| {
        b.iter_batched(
            new_rule,
            |rule| {
                thread::scope(|scope| {
                    for part in blocks.chunks(blocks.len() / 4) {
                        let rule = &rule;
                        scope.spawn(move || {
                            for (key, values) in part {
                                black_box(rule.apply(key, values).unwrap());
                            }
                        });
                    }
                });
                rule
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let blocks = generate_blocks();

    c.bench_function("old_series_report_10k", |b| {
        b.iter_batched(
            || {
                let rule = new_rule();
                for (key, values) in &blocks {
                    rule.apply(key, values).unwrap();
                }
                rule
            },
            |mut rule| black_box(rule.report().unwrap()),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_apply, bench_report);
criterion_main!(benches);
