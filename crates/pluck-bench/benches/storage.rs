//! Storage benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pluck_bench::fixtures::{generate_blog, Scale};
use pluck_bench::harness::TestContext;
use pluck_core::filter::FilterExpr;
use pluck_core::storage::{decode_row, encode_row, Record};
use pluck_core::store::{FetchRequest, RowStore};
use pluck_core::value::Value;

fn post_request(filter: FilterExpr) -> FetchRequest {
    FetchRequest::new("Post", vec!["id".into(), "title".into(), "user_id".into()])
        .with_filter(filter)
}

fn bench_fetch(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage/fetch");
    let ctx = TestContext::with_scale(Scale::Small).unwrap();

    for keys in [10i64, 100, 400] {
        let ids: Vec<Value> = (0..keys).map(|i| Value::Int64(i * 2)).collect();

        let point = post_request(FilterExpr::in_values("id", ids.clone()));
        group.bench_with_input(BenchmarkId::new("point_lookup", keys), &point, |b, r| {
            b.iter(|| black_box(ctx.sled.fetch_rows(r).unwrap()));
        });

        // Same rows through a non-key filter forces a prefix scan.
        let scan = post_request(FilterExpr::in_values("user_id", ids));
        group.bench_with_input(BenchmarkId::new("scan", keys), &scan, |b, r| {
            b.iter(|| black_box(ctx.sled.fetch_rows(r).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("memory", keys), &point, |b, r| {
            b.iter(|| black_box(ctx.memory.fetch_rows(r).unwrap()));
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("storage/codec");
    let data = generate_blog(Scale::Tiny);
    let post = &data.posts[0];
    let encoded = encode_row(post).unwrap();
    let record = Record::new(encoded.clone()).to_bytes().unwrap();

    group.bench_function("encode_row", |b| {
        b.iter(|| black_box(encode_row(black_box(post)).unwrap()));
    });
    group.bench_function("decode_row", |b| {
        b.iter(|| black_box(decode_row(black_box(&encoded)).unwrap()));
    });
    group.bench_function("record_roundtrip", |b| {
        b.iter(|| {
            let record = Record::from_bytes(black_box(&record)).unwrap();
            black_box(decode_row(&record.data).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fetch, bench_codec);
criterion_main!(benches);
