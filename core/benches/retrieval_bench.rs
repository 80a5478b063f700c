use concierge_core::model::sample_assets;
use concierge_core::tokenizer::tokenize;
use concierge_core::{Asset, IndexConfig, NewAsset, RetrievalIndex};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn corpus(copies: usize) -> Vec<Asset> {
    let seeds = sample_assets();
    (0..copies)
        .flat_map(|i| {
            seeds.iter().map(move |s| NewAsset { id: Some(format!("{}-{i}", s.title)), content: format!("{} wing{i}", s.content), ..s.clone() })
        })
        .map(Asset::from_new)
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let text: String = sample_assets().iter().map(|a| a.content.as_str()).collect::<Vec<_>>().join(" ");
    c.bench_function("tokenize_sample_assets", |b| b.iter(|| tokenize(black_box(&text))));
}

fn bench_build(c: &mut Criterion) {
    let records = corpus(40);
    c.bench_function("build_200_docs", |b| {
        b.iter(|| RetrievalIndex::<Asset>::build(black_box(records.clone()), IndexConfig::default()))
    });
}

fn bench_search(c: &mut Criterion) {
    let idx = RetrievalIndex::<Asset>::build(corpus(40), IndexConfig::default()).expect("valid corpus");
    c.bench_function("search_200_docs", |b| b.iter(|| idx.search(black_box("spa facilities pool hours"), 3)));
}

criterion_group!(benches, bench_tokenize, bench_build, bench_search);
criterion_main!(benches);
