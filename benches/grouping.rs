//! Criterion benchmarks for parsing, multi-key sort, filter and group-by.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rust_tabular_dataset::coercion::TypeSpec;
use rust_tabular_dataset::ingestion::TableOptions;
use rust_tabular_dataset::processing::{GroupPredicate, SortOrder, ValuePredicate};
use rust_tabular_dataset::types::{Row, Value};
use rust_tabular_dataset::DataSet;

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

fn synthetic_csv(rows: usize) -> String {
    let mut out = String::from("id,region,bucket,amount\n");
    for i in 0..rows {
        let region = REGIONS[i % REGIONS.len()];
        out.push_str(&format!("{i},{region},{},{}\n", i % 17, (i * 7919) % 1000));
    }
    out
}

fn options() -> TableOptions {
    TableOptions::new()
        .with_type("id", TypeSpec::Number)
        .with_type("bucket", TypeSpec::Number)
        .with_type("amount", TypeSpec::Number)
        .with_encoder("region")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for rows in [1_000usize, 10_000] {
        let text = synthetic_csv(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| DataSet::parse(black_box(text), &options()).unwrap())
        });
    }
    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let ds = DataSet::parse(&synthetic_csv(10_000), &options()).unwrap();
    c.bench_function("sort_by/three_keys_10k", |b| {
        b.iter(|| {
            ds.sorted_by(&[
                ("region", SortOrder::Ascending),
                ("bucket", SortOrder::Descending),
                ("amount", SortOrder::Ascending),
            ])
            .unwrap()
        })
    });
}

fn bench_filter_and_group(c: &mut Criterion) {
    let ds = DataSet::parse(&synthetic_csv(10_000), &options()).unwrap();

    c.bench_function("filter_by/key_and_group_10k", |b| {
        b.iter(|| {
            let low: ValuePredicate = Box::new(|v: &Value| v.as_f64().is_some_and(|n| n < 500.0));
            let big: GroupPredicate = Box::new(|rows: &[Row]| rows.len() > 100);
            ds.filtered_by(&[("amount", low)], &[("bucket", big)]).unwrap()
        })
    });

    c.bench_function("group_by/two_keys_10k", |b| {
        b.iter(|| black_box(ds.group_by(&["region", "bucket"]).unwrap()))
    });
}

criterion_group!(benches, bench_parse, bench_sort, bench_filter_and_group);
criterion_main!(benches);
