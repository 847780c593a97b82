use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gnav_core::rng::RngHandle;
use gnav_graph::{default_template, random_tree, sample_graph};

fn sample_graph_bench(c: &mut Criterion) {
    let base = default_template();
    c.bench_function("sample_graph_1k", |b| {
        let mut rng = RngHandle::from_seed(42);
        b.iter(|| {
            let sampled = sample_graph(1_000, &base, &mut rng).unwrap();
            black_box(sampled);
        });
    });
    c.bench_function("random_tree_500", |b| {
        let mut rng = RngHandle::from_seed(42);
        b.iter(|| black_box(random_tree(500, &mut rng)));
    });
}

criterion_group!(benches, sample_graph_bench);
criterion_main!(benches);
