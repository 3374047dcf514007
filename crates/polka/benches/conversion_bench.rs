//! Criterion benches for the double-description conversion.
//!
//! - Constraints to generators: box-cut draws in 3-6 dimensions.
//! - Generators to constraints: vertex clouds of 8-24 points.
//! - Canonical form on top of an already minimal value.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use polka::api::{box_cut_constraints, vertex_cloud, BoxCutCfg, Domain, Polyhedron, ReplayToken, VertexCloudCfg};

fn bench_constraints_to_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("conv_c2g");
    let dom = Domain::default();
    for dims in [3usize, 4, 6] {
        let cfg = BoxCutCfg {
            dims,
            cuts: 2 * dims,
            ..BoxCutCfg::default()
        };
        group.bench_function(BenchmarkId::new("box_cut", dims), |b| {
            b.iter_batched(
                || box_cut_constraints(cfg, ReplayToken::new(42, dims as u64)),
                |cons| {
                    let _ = Polyhedron::of_linear_constraints(&dom, 0, dims, &cons);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_generators_to_constraints(c: &mut Criterion) {
    let mut group = c.benchmark_group("conv_g2c");
    let dom = Domain::default();
    for points in [8usize, 16, 24] {
        let cfg = VertexCloudCfg {
            dims: 4,
            points,
            range: 20,
        };
        group.bench_function(BenchmarkId::new("vertex_cloud4", points), |b| {
            b.iter_batched(
                || vertex_cloud(cfg, ReplayToken::new(7, points as u64)),
                |gens| {
                    let _ = Polyhedron::of_generators(&dom, 0, cfg.dims, &gens);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_canonicalize(c: &mut Criterion) {
    let dom = Domain::default();
    let cfg = BoxCutCfg {
        dims: 5,
        cuts: 8,
        ..BoxCutCfg::default()
    };
    let cons = box_cut_constraints(cfg, ReplayToken::new(3, 0));
    c.bench_function("canonicalize_box_cut5", |b| {
        b.iter_batched(
            || Polyhedron::of_linear_constraints(&dom, 0, cfg.dims, &cons).unwrap().into_value(),
            |mut p| p.canonicalize_in_place(&dom),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_constraints_to_generators,
    bench_generators_to_constraints,
    bench_canonicalize
);
criterion_main!(benches);
