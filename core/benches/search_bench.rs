use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdsearch_core::{DocumentStore, FieldBoosts, Index, Record, Schema};

const WORDS: &[&str] = &[
    "server", "tool", "client", "prompt", "resource", "context", "transport", "auth", "deploy", "proxy",
    "middleware", "schema", "stream", "session", "logging", "testing", "config", "cli", "http", "stdio",
];

fn corpus(n: usize) -> DocumentStore {
    (0..n)
        .map(|i| {
            let content: Vec<&str> = (0..120).map(|j| WORDS[(i * 7 + j * 13) % WORDS.len()]).collect();
            Record::new(format!("docs/page{i}.mdx"))
                .with_field("content", content.join(" "))
                .with_field("filename", format!("docs/{}/page{i}.mdx", WORDS[i % WORDS.len()]))
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let store = corpus(1_000);
    c.bench_function("build_1k_docs", |b| b.iter(|| Index::build(black_box(store.clone()), Schema::default())));
}

fn bench_search(c: &mut Criterion) {
    let index = Index::build(corpus(1_000), Schema::default());
    let boosts = FieldBoosts::filename_weighted();
    c.bench_function("search_two_terms", |b| {
        b.iter(|| index.search(black_box("deploy server"), 5, &boosts).map(|r| r.len()))
    });
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
