//! Reproducible random polyhedra for tests and benches.
//!
//! Model
//! - Box-cut: the box `[-w, w]^n` cut by random half-spaces `a·x ≤ b` with
//!   `b ≥ 0`, so the origin stays inside. Directions are drawn uniformly in
//!   the cube with `nalgebra`, normalized, then rounded to small integers.
//!   With `strict_cuts` the cuts are open, `a·x < b` with `b ≥ 1`.
//! - Vertex cloud: the convex hull of random integer points.
//! - Increasing chains: a seed polyhedron joined with one fresh point per step.
//!
//! Determinism uses a replay token `(seed, index)` mixed into one `StdRng`,
//! so a failing draw can be replayed from its token alone.

use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::Domain;
use crate::error::PolyError;
use crate::linear::{LinCons, LinExpr, LinGen};
use crate::num::rat;
use crate::poly::Polyhedron;

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    /// Next token of the same stream.
    #[inline]
    pub fn next(self) -> Self {
        Self {
            seed: self.seed,
            index: self.index.wrapping_add(1),
        }
    }

    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Box cut by random half-spaces.
#[derive(Clone, Copy, Debug)]
pub struct BoxCutCfg {
    pub dims: usize,
    /// Half side length of the enclosing box.
    pub half_width: i64,
    pub cuts: usize,
    /// Largest absolute integer coefficient of a cut direction.
    pub max_coeff: i64,
    pub strict_cuts: bool,
}

impl Default for BoxCutCfg {
    fn default() -> Self {
        Self {
            dims: 3,
            half_width: 10,
            cuts: 4,
            max_coeff: 5,
            strict_cuts: false,
        }
    }
}

/// Convex hull of random lattice points.
#[derive(Clone, Copy, Debug)]
pub struct VertexCloudCfg {
    pub dims: usize,
    pub points: usize,
    /// Coordinates are drawn from `-range..=range`.
    pub range: i64,
}

impl Default for VertexCloudCfg {
    fn default() -> Self {
        Self {
            dims: 3,
            points: 6,
            range: 8,
        }
    }
}

/// Integer direction with entries in `-max_coeff..=max_coeff`, not all zero.
fn draw_direction(rng: &mut StdRng, dims: usize, max_coeff: i64) -> Vec<i64> {
    let scale = max_coeff.max(1) as f64;
    loop {
        let v: DVector<f64> = DVector::from_fn(dims, |_, _| rng.gen_range(-1.0..=1.0));
        if v.norm() < 1e-9 {
            continue;
        }
        let u = v.normalize();
        let a: Vec<i64> = u.iter().map(|x| (x * scale).round() as i64).collect();
        if a.iter().any(|&c| c != 0) {
            return a;
        }
    }
}

/// Constraints of a box-cut draw; `x_d ≥ -w`, `x_d ≤ w`, then the cuts.
pub fn box_cut_constraints(cfg: BoxCutCfg, tok: ReplayToken) -> Vec<LinCons> {
    let mut rng = tok.to_std_rng();
    let w = cfg.half_width.max(1);
    let mut cons = Vec::with_capacity(2 * cfg.dims + cfg.cuts);
    for d in 0..cfg.dims {
        cons.push(LinCons::lower(d, -w));
        cons.push(LinCons::upper(d, w));
    }
    if cfg.dims == 0 {
        return cons;
    }
    for _ in 0..cfg.cuts {
        let a = draw_direction(&mut rng, cfg.dims, cfg.max_coeff);
        let reach: i64 = a.iter().map(|c| c.abs() * w).sum();
        let b = rng.gen_range(i64::from(cfg.strict_cuts)..=reach.max(1));
        let terms: Vec<(usize, i64)> = a
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(|(d, c)| (d, -c))
            .collect();
        // b - a·x >= 0, or > 0
        let e = LinExpr::from_ints(&terms, b);
        cons.push(if cfg.strict_cuts { LinCons::gt(e) } else { LinCons::ge(e) });
    }
    cons
}

pub fn draw_box_cut(dom: &Domain, cfg: BoxCutCfg, tok: ReplayToken) -> Result<Polyhedron, PolyError> {
    let cons = box_cut_constraints(cfg, tok);
    Ok(Polyhedron::of_linear_constraints(dom, 0, cfg.dims, &cons)?.into_value())
}

/// Vertices of a vertex-cloud draw.
pub fn vertex_cloud(cfg: VertexCloudCfg, tok: ReplayToken) -> Vec<LinGen> {
    let mut rng = tok.to_std_rng();
    let r = cfg.range.max(0);
    (0..cfg.points.max(1))
        .map(|_| {
            let coords = (0..cfg.dims)
                .map(|d| (d, rat(rng.gen_range(-r..=r))))
                .collect();
            LinGen::vertex(coords)
        })
        .collect()
}

pub fn draw_vertex_cloud(dom: &Domain, cfg: VertexCloudCfg, tok: ReplayToken) -> Result<Polyhedron, PolyError> {
    let gens = vertex_cloud(cfg, tok);
    Ok(Polyhedron::of_generators(dom, 0, cfg.dims, &gens)?.into_value())
}

/// `len` polyhedra, each the join of the previous one with a fresh point
/// of the vertex-cloud distribution.
pub fn increasing_chain(
    dom: &Domain,
    cfg: VertexCloudCfg,
    tok: ReplayToken,
    len: usize,
) -> Result<Vec<Polyhedron>, PolyError> {
    let mut out = Vec::with_capacity(len);
    if len == 0 {
        return Ok(out);
    }
    let mut cur = draw_vertex_cloud(dom, cfg, tok)?;
    out.push(cur.clone());
    let step_cfg = VertexCloudCfg { points: 1, ..cfg };
    let mut t = tok;
    for _ in 1..len {
        t = t.next();
        let p = draw_vertex_cloud(dom, step_cfg, t)?;
        cur = cur.join(dom, &p)?.into_value();
        out.push(cur.clone());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::ConsKind;

    #[test]
    fn replay_is_deterministic() {
        let tok = ReplayToken::new(7, 3);
        let cfg = BoxCutCfg::default();
        assert_eq!(box_cut_constraints(cfg, tok), box_cut_constraints(cfg, tok));
        assert_ne!(
            box_cut_constraints(cfg, tok),
            box_cut_constraints(cfg, tok.next())
        );
    }

    #[test]
    fn box_cuts_keep_the_origin() {
        let dom = Domain::default();
        let cfg = BoxCutCfg::default();
        for i in 0..8 {
            let p = draw_box_cut(&dom, cfg, ReplayToken::new(1, i)).unwrap();
            let origin = Polyhedron::of_generators(&dom, 0, cfg.dims, &[LinGen::vertex(vec![])])
                .unwrap()
                .into_value();
            assert!(origin.is_leq(&dom, &p).unwrap().is_true());
        }
    }

    #[test]
    fn strict_cuts_are_open_and_keep_the_origin() {
        let dom = Domain::strict();
        let cfg = BoxCutCfg {
            strict_cuts: true,
            ..BoxCutCfg::default()
        };
        let cons = box_cut_constraints(cfg, ReplayToken::new(5, 0));
        assert_eq!(cons.iter().filter(|c| c.kind == ConsKind::Sup).count(), cfg.cuts);
        let origin = Polyhedron::of_generators(&dom, 0, cfg.dims, &[LinGen::vertex(vec![])])
            .unwrap()
            .into_value();
        let p = draw_box_cut(&dom, cfg, ReplayToken::new(5, 0)).unwrap();
        assert!(origin.is_leq(&dom, &p).unwrap().is_true());
    }

    #[test]
    fn cloud_contains_its_points() {
        let dom = Domain::default();
        let cfg = VertexCloudCfg::default();
        let tok = ReplayToken::new(11, 0);
        let p = draw_vertex_cloud(&dom, cfg, tok).unwrap();
        for v in vertex_cloud(cfg, tok) {
            let q = Polyhedron::of_generators(&dom, 0, cfg.dims, &[v]).unwrap().into_value();
            assert!(q.is_leq(&dom, &p).unwrap().is_true());
        }
    }
}
