use proptest::prelude::*;

use num_traits::{Signed, Zero};

use super::*;
use crate::linear::{ConsKind, Interval, LinCons, LinExpr, LinGen};
use crate::num::rat;
use crate::random::{
    box_cut_constraints, draw_box_cut, draw_vertex_cloud, increasing_chain, vertex_cloud, BoxCutCfg, ReplayToken,
    VertexCloudCfg,
};

fn cloud_cfg(dims: usize) -> VertexCloudCfg {
    VertexCloudCfg {
        dims,
        points: 5,
        range: 6,
    }
}

fn cut_cfg(dims: usize) -> BoxCutCfg {
    BoxCutCfg {
        dims,
        half_width: 6,
        cuts: 3,
        max_coeff: 4,
        strict_cuts: false,
    }
}

fn open_cut_cfg(dims: usize) -> BoxCutCfg {
    BoxCutCfg {
        strict_cuts: true,
        ..cut_cfg(dims)
    }
}

/// `x` satisfies every constraint of the raw list, strictly where asked.
fn satisfies_all(cons: &[LinCons], x: &[i64]) -> bool {
    cons.iter().all(|c| {
        let v = c
            .expr
            .quasilinearize(|_| Interval::top())
            .eval_on_box(|d| Interval::point(rat(x[d])));
        let Some(v) = v.inf else {
            return false;
        };
        match c.kind {
            ConsKind::Sup => v.is_positive(),
            ConsKind::Eq => v.is_zero(),
            _ => !v.is_negative(),
        }
    })
}

fn point(dom: &Domain, x: &[i64]) -> Polyhedron {
    let coords = x.iter().enumerate().map(|(d, &v)| (d, rat(v))).collect();
    Polyhedron::of_generators(dom, 0, x.len(), &[LinGen::vertex(coords)])
        .unwrap()
        .into_value()
}

fn leq(dom: &Domain, a: &Polyhedron, b: &Polyhedron) -> bool {
    a.is_leq(dom, b).unwrap() == Tbool::True
}

fn same(dom: &Domain, a: &Polyhedron, b: &Polyhedron) -> bool {
    a.is_eq(dom, b).unwrap() == Tbool::True
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Meet is a lower bound of both operands and idempotent.
    #[test]
    fn meet_is_a_lower_bound(seed in any::<u64>(), dims in 1usize..=3) {
        let dom = Domain::default();
        let p = draw_box_cut(&dom, cut_cfg(dims), ReplayToken::new(seed, 0)).unwrap();
        let q = draw_vertex_cloud(&dom, cloud_cfg(dims), ReplayToken::new(seed, 1)).unwrap();
        let m = p.meet(&dom, &q).unwrap().into_value();
        prop_assert!(leq(&dom, &m, &p));
        prop_assert!(leq(&dom, &m, &q));
        let mm = p.meet(&dom, &p).unwrap().into_value();
        prop_assert!(same(&dom, &mm, &p));
    }

    /// Join is an upper bound of both operands and idempotent.
    #[test]
    fn join_is_an_upper_bound(seed in any::<u64>(), dims in 1usize..=3) {
        let dom = Domain::default();
        let p = draw_box_cut(&dom, cut_cfg(dims), ReplayToken::new(seed, 0)).unwrap();
        let q = draw_vertex_cloud(&dom, cloud_cfg(dims), ReplayToken::new(seed, 1)).unwrap();
        let j = p.join(&dom, &q).unwrap().into_value();
        prop_assert!(leq(&dom, &p, &j));
        prop_assert!(leq(&dom, &q, &j));
        let jj = q.join(&dom, &q).unwrap().into_value();
        prop_assert!(same(&dom, &jj, &q));
    }

    /// The box of a vertex cloud contains every drawn point.
    #[test]
    fn bounds_cover_the_points(seed in any::<u64>(), dims in 1usize..=3) {
        let dom = Domain::default();
        let cfg = cloud_cfg(dims);
        let tok = ReplayToken::new(seed, 0);
        let p = draw_vertex_cloud(&dom, cfg, tok).unwrap();
        let bx = p.to_box(&dom).unwrap().into_value();
        for v in vertex_cloud(cfg, tok) {
            for (d, itv) in bx.iter().enumerate() {
                prop_assert!(itv.contains_value(&v.coord(d)));
            }
        }
    }

    /// Exporting and re-importing either system gives the same polyhedron.
    #[test]
    fn export_round_trips(seed in any::<u64>(), dims in 1usize..=3) {
        let dom = Domain::default();
        let p = draw_box_cut(&dom, cut_cfg(dims), ReplayToken::new(seed, 0)).unwrap();
        let cons = p.to_constraints(&dom).unwrap();
        let c = Polyhedron::of_linear_constraints(&dom, 0, dims, &cons).unwrap().into_value();
        prop_assert!(same(&dom, &c, &p));
        let gens = p.to_generators(&dom).unwrap();
        let g = Polyhedron::of_generators(&dom, 0, dims, &gens).unwrap().into_value();
        prop_assert!(same(&dom, &g, &p));
    }

    /// An invertible assignment is undone by the substitution of the same expression.
    #[test]
    fn substitution_inverts_assignment(seed in any::<u64>(), k in -3i64..=3, c in -5i64..=5) {
        let dom = Domain::default();
        let p = draw_box_cut(&dom, cut_cfg(2), ReplayToken::new(seed, 0)).unwrap();
        let e = LinExpr::from_ints(&[(0, 1), (1, k)], c);
        let q = p.assign(&dom, 0, &e, None).unwrap().into_value();
        let back = q.substitute(&dom, 0, &e, None).unwrap().into_value();
        prop_assert!(same(&dom, &back, &p));
    }

    /// Widening over-approximates both operands, and widened chains stop growing.
    #[test]
    fn widening_is_an_upper_bound_and_stabilizes(seed in any::<u64>()) {
        let dom = Domain::default();
        let dims = 2;
        let chain = increasing_chain(&dom, cloud_cfg(dims), ReplayToken::new(seed, 0), 12).unwrap();
        let mut w = chain[0].clone();
        let budget = w.to_constraints(&dom).unwrap().len() + dims;
        let mut growth = 0;
        for p in &chain[1..] {
            let next = w.join(&dom, p).unwrap().into_value();
            let widened = w.widening(&dom, &next).unwrap().into_value();
            prop_assert!(leq(&dom, &w, &widened));
            prop_assert!(leq(&dom, &next, &widened));
            if !same(&dom, &widened, &w) {
                growth += 1;
            }
            w = widened;
        }
        prop_assert!(growth <= 2 * budget, "grew {} times for budget {}", growth, budget);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Membership in an open box-cut agrees with the raw constraints,
    /// including points on the open faces.
    #[test]
    fn strict_membership_matches_the_constraints(seed in any::<u64>(), dims in 1usize..=2) {
        let dom = Domain::strict();
        let cfg = open_cut_cfg(dims);
        let tok = ReplayToken::new(seed, 0);
        let cons = box_cut_constraints(cfg, tok);
        let p = draw_box_cut(&dom, cfg, tok).unwrap();
        prop_assert_eq!(p.is_bottom(&dom).unwrap(), Tbool::False);
        let w = cfg.half_width;
        let grid: Vec<Vec<i64>> = if dims == 1 {
            (-w..=w).map(|a| vec![a]).collect()
        } else {
            (-w..=w).flat_map(|a| (-w..=w).map(move |b| vec![a, b])).collect()
        };
        for x in grid {
            let inside = point(&dom, &x).is_leq(&dom, &p).unwrap();
            prop_assert_eq!(inside, Tbool::of_bool(satisfies_all(&cons, &x)), "at {:?}", x);
        }
    }

    /// Meet and join stay lower and upper bounds with open faces, and the
    /// meet of an open set with its boundary is empty.
    #[test]
    fn strict_meet_and_join_are_bounds(seed in any::<u64>(), dims in 1usize..=3) {
        let dom = Domain::strict();
        let p = draw_box_cut(&dom, open_cut_cfg(dims), ReplayToken::new(seed, 0)).unwrap();
        let q = draw_vertex_cloud(&dom, cloud_cfg(dims), ReplayToken::new(seed, 1)).unwrap();
        let m = p.meet(&dom, &q).unwrap().into_value();
        prop_assert!(leq(&dom, &m, &p));
        prop_assert!(leq(&dom, &m, &q));
        let j = p.join(&dom, &q).unwrap().into_value();
        prop_assert!(leq(&dom, &p, &j));
        prop_assert!(leq(&dom, &q, &j));
        prop_assert!(same(&dom, &p.meet(&dom, &p).unwrap().into_value(), &p));
        // x0 > 0 against x0 = 0
        let open = p.meet_lincons(&dom, &[LinCons::gt(LinExpr::from_ints(&[(0, 1)], 0))]).unwrap().into_value();
        let face = LinCons::eq(LinExpr::from_ints(&[(0, 1)], 0));
        let empty = open.meet_lincons(&dom, &[face]).unwrap().into_value();
        prop_assert_eq!(empty.is_bottom(&dom).unwrap(), Tbool::True);
    }

    /// Constraint export keeps strictness; generator export is the closure.
    #[test]
    fn strict_export_round_trips(seed in any::<u64>(), dims in 1usize..=3) {
        let dom = Domain::strict();
        let p = draw_box_cut(&dom, open_cut_cfg(dims), ReplayToken::new(seed, 0)).unwrap();
        let cons = p.to_constraints(&dom).unwrap();
        let c = Polyhedron::of_linear_constraints(&dom, 0, dims, &cons).unwrap().into_value();
        prop_assert!(same(&dom, &c, &p));
        let gens = p.to_generators(&dom).unwrap();
        let g = Polyhedron::of_generators(&dom, 0, dims, &gens).unwrap().into_value();
        let closed = p.closure(&dom).unwrap().into_value();
        prop_assert!(same(&dom, &g, &closed));
        prop_assert!(leq(&dom, &p, &closed));
    }

    /// Widening of chains that start from an open set is an upper bound and
    /// stops growing.
    #[test]
    fn strict_widening_is_an_upper_bound_and_stabilizes(seed in any::<u64>()) {
        let dom = Domain::strict();
        let dims = 2;
        let seed_cfg = BoxCutCfg { half_width: 2, ..open_cut_cfg(dims) };
        let mut w = draw_box_cut(&dom, seed_cfg, ReplayToken::new(seed, 0)).unwrap();
        let budget = w.to_constraints(&dom).unwrap().len() + dims;
        let step = VertexCloudCfg { points: 1, ..cloud_cfg(dims) };
        let mut cur = w.clone();
        let mut growth = 0;
        for i in 1..12 {
            let pt = draw_vertex_cloud(&dom, step, ReplayToken::new(seed, i)).unwrap();
            cur = cur.join(&dom, &pt).unwrap().into_value();
            let next = w.join(&dom, &cur).unwrap().into_value();
            let widened = w.widening(&dom, &next).unwrap().into_value();
            prop_assert!(leq(&dom, &w, &widened));
            prop_assert!(leq(&dom, &next, &widened));
            if !same(&dom, &widened, &w) {
                growth += 1;
            }
            w = widened;
        }
        prop_assert!(growth <= 2 * budget, "grew {} times for budget {}", growth, budget);
    }
}
