use codress::embedder::l2_normalize;
use codress::search::{rank_compound, rank_simple};
use codress::store::EmbeddingIndex;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// 生成随机的单位向量，维度与 CLIP ViT-B/32 一致
fn random_vectors(rng: &mut StdRng, n: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|_| l2_normalize((0..dim).map(|_| rng.random_range(-1.0..1.0)).collect()))
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let dim = 512;
    let mut group = c.benchmark_group("rank");

    for n in [1_000, 10_000, 50_000] {
        let rows = random_vectors(&mut rng, n, dim);
        let paths = (0..n).map(|i| format!("{i:08}.png")).collect();
        let index = EmbeddingIndex::from_rows(paths, rows).unwrap();
        let queries = random_vectors(&mut rng, 2, dim);

        group.bench_with_input(BenchmarkId::new("simple", n), &index, |b, index| {
            b.iter(|| rank_simple(index, black_box(&queries[0])))
        });

        let parts = [("first", queries[0].clone()), ("second", queries[1].clone())];
        group.bench_with_input(BenchmarkId::new("compound", n), &index, |b, index| {
            b.iter(|| rank_compound(index, black_box(&parts)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
