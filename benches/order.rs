use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use srv_join::{order::order_srv_records, SrvCandidate};

fn candidates(count: u16) -> Vec<SrvCandidate> {
    (0..count)
        .map(|i| SrvCandidate::new(format!("node-{i}.db.local."), 26257, i % 3, (i * 7) % 50))
        .collect()
}

fn order(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_srv_records");
    for count in [3u16, 16, 128] {
        let records = candidates(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            let mut rng = StdRng::seed_from_u64(2782);
            b.iter(|| order_srv_records(black_box(records.clone()), &mut rng))
        });
    }
    group.finish();
}

criterion_group!(benches, order);
criterion_main!(benches);
