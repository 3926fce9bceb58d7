//! Merge fold benchmarks.
//!
//! Measures the per-file fold on large expected-data files, where many
//! failing tests each changed a few scattered lines.
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench fold
//! # With a custom filter:
//! cargo bench --bench fold -- records
//! ```

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use tdmerge::merge::partition::FileDiffGroup;
use tdmerge::merge::{fold_group, merge};
use tdmerge::model::record::DiffRecord;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A file of `lines` numbered lines.
fn base_text(lines: usize) -> String {
    (0..lines).map(|i| format!("line {i}\n")).collect()
}

/// `base` with every line at `offset + k * stride` replaced.
fn edited(lines: usize, offset: usize, stride: usize) -> String {
    (0..lines)
        .map(|i| {
            if i >= offset && (i - offset) % stride == 0 {
                format!("edited {i} by {offset}\n")
            } else {
                format!("line {i}\n")
            }
        })
        .collect()
}

/// `records` non-overlapping edits of a `lines`-line file.
fn group(lines: usize, records: usize) -> FileDiffGroup {
    let base = base_text(lines);
    let stride = records * 2;
    let records = (0..records)
        .map(|r| DiffRecord::new("bench.txt", base.clone(), edited(lines, r * 2, stride)))
        .collect();
    FileDiffGroup::new("bench.txt".into(), records).expect("non-empty group")
}

// ---------------------------------------------------------------------------
// Benchmark: single three-way merge
// ---------------------------------------------------------------------------

fn bench_merge(c: &mut Criterion) {
    let mut bench_group = c.benchmark_group("merge/lines");

    for &n in &[1_000_usize, 10_000, 50_000] {
        let base = base_text(n);
        let left = edited(n, 0, 10);
        let right = edited(n, 5, 10);

        bench_group.throughput(Throughput::Elements(n as u64));
        bench_group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| merge(black_box(&left), black_box(&base), black_box(&right)));
        });
    }

    bench_group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: fold over many records
// ---------------------------------------------------------------------------

fn bench_fold(c: &mut Criterion) {
    let mut bench_group = c.benchmark_group("fold/records");

    for &records in &[2_usize, 8, 32] {
        let group = group(10_000, records);

        bench_group.throughput(Throughput::Elements(records as u64));
        bench_group.bench_with_input(BenchmarkId::from_parameter(records), &records, |b, _| {
            b.iter(|| fold_group(black_box(&group), similar::Algorithm::Myers));
        });
    }

    bench_group.finish();
}

criterion_group!(benches, bench_merge, bench_fold);
criterion_main!(benches);
