//! Criterion benches for lattice operations and transfer functions on
//! reproducible random polyhedra (3 dimensions unless noted).

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use polka::api::{
    draw_box_cut, draw_vertex_cloud, increasing_chain, BoxCutCfg, Domain, LinExpr, Polyhedron, ReplayToken,
    VertexCloudCfg,
};

fn operands(dom: &Domain, seed: u64) -> (Polyhedron, Polyhedron) {
    let a = draw_box_cut(dom, BoxCutCfg::default(), ReplayToken::new(seed, 0)).unwrap();
    let b = draw_vertex_cloud(dom, VertexCloudCfg::default(), ReplayToken::new(seed, 1)).unwrap();
    (a, b)
}

fn bench_meet_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice");
    let dom = Domain::default();
    let (a, b) = operands(&dom, 11);
    group.bench_function(BenchmarkId::new("meet", "cut_x_cloud"), |bch| {
        bch.iter(|| a.meet(&dom, &b).unwrap())
    });
    group.bench_function(BenchmarkId::new("join", "cut_x_cloud"), |bch| {
        bch.iter(|| a.join(&dom, &b).unwrap())
    });
    group.bench_function(BenchmarkId::new("is_leq", "cut_x_cloud"), |bch| {
        bch.iter(|| a.is_leq(&dom, &b).unwrap())
    });
    group.finish();
}

fn bench_widening_chain(c: &mut Criterion) {
    let dom = Domain::default();
    let chain = increasing_chain(&dom, VertexCloudCfg::default(), ReplayToken::new(5, 0), 10).unwrap();
    c.bench_function("widen_chain10", |b| {
        b.iter(|| {
            let mut w = chain[0].clone();
            for p in &chain[1..] {
                let next = w.join(&dom, p).unwrap().into_value();
                w = w.widening(&dom, &next).unwrap().into_value();
            }
            w
        })
    });
}

fn bench_transfer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer");
    let dom = Domain::default();
    let (a, _) = operands(&dom, 23);
    let shift = LinExpr::from_ints(&[(0, 1), (1, 2)], 3);
    let drop = LinExpr::from_ints(&[(1, 1), (2, -1)], 0);
    group.bench_function(BenchmarkId::new("assign", "invertible"), |b| {
        b.iter_batched(
            || a.clone(),
            |mut p| p.assign_in_place(&dom, 0, &shift, None).unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.bench_function(BenchmarkId::new("assign", "projecting"), |b| {
        b.iter_batched(
            || a.clone(),
            |mut p| p.assign_in_place(&dom, 0, &drop, None).unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.bench_function(BenchmarkId::new("substitute", "invertible"), |b| {
        b.iter_batched(
            || a.clone(),
            |mut p| p.substitute_in_place(&dom, 0, &shift, None).unwrap(),
            BatchSize::SmallInput,
        )
    });
    group.bench_function(BenchmarkId::new("bound", "x0+x1"), |b| {
        let e = LinExpr::from_ints(&[(0, 1), (1, 1)], 0);
        b.iter(|| a.bound_linexpr(&dom, &e).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_meet_join, bench_widening_chain, bench_transfer);
criterion_main!(benches);
