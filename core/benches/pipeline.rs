use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dataset_anchor_core::crypto::fingerprint;
use dataset_anchor_core::metadata::compact;
use dataset_anchor_core::tabular::parse;
use dataset_anchor_core::{IngestPipeline, RawDocument};

fn sales_csv(rows: usize) -> Vec<u8> {
    let mut csv = String::from("date,product,quantity,price,in_stock\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "2024-01-{:02},Widget {},{},{}.99,{}\n",
            i % 28 + 1,
            i,
            i % 17,
            i % 100,
            i % 2 == 0
        ));
    }
    csv.into_bytes()
}

fn bench_fingerprint(c: &mut Criterion) {
    let data = sales_csv(10_000);
    c.bench_function("fingerprint_10k_rows", |b| b.iter(|| fingerprint(black_box(&data))));
}

fn bench_parse(c: &mut Criterion) {
    let data = sales_csv(10_000);
    c.bench_function("parse_10k_rows", |b| b.iter(|| parse(black_box(&data))));
}

fn bench_pipeline(c: &mut Criterion) {
    let pipeline = IngestPipeline::default();
    let document = RawDocument::new("sales.csv", sales_csv(1_000));

    c.bench_function("ingest_and_prepare_1k_rows", |b| {
        b.iter(|| {
            let ingestion = pipeline.ingest(black_box(&document));
            let prepared = pipeline.prepare(&ingestion).ok();
            prepared.map(|p| compact(&p.metadata))
        })
    });
}

criterion_group!(benches, bench_fingerprint, bench_parse, bench_pipeline);
criterion_main!(benches);
