use super::*;
use crate::num::{frac, rat};

#[test]
fn interval_products_with_infinities() {
    let pos = Interval::new(Some(rat(1)), None);
    let neg = Interval::closed(rat(-2), rat(-1));
    let p = pos.mul(&neg);
    assert_eq!(p.inf, None);
    assert_eq!(p.sup, Some(rat(-1)));

    // 0 * ]-oo,+oo[ collapses to 0.
    let zero = Interval::point(rat(0));
    assert_eq!(zero.mul(&Interval::top()), Interval::point(rat(0)));
}

#[test]
fn interval_order_queries() {
    let a = Interval::closed(rat(0), rat(5));
    let b = Interval::closed(rat(1), rat(2));
    assert!(a.contains(&b));
    assert!(!b.contains(&a));
    assert!(Interval::top().contains(&a));
    assert!(Interval::bottom().is_bottom());
    assert_eq!(a.join(&Interval::closed(rat(-3), rat(1))), Interval::closed(rat(-3), rat(5)));
    assert_eq!(a.scale(&rat(-2)), Interval::closed(rat(-10), rat(0)));
    assert_eq!(a.pick_scalar(), frac(5, 2));
}

#[test]
fn expr_builder_merges_dimensions() {
    let e = LinExpr::from_ints(&[(1, 2), (0, 1), (1, -2)], 4);
    assert_eq!(e.terms.len(), 2);
    assert!(e.coeff(1).is_some_and(|c| c.is_zero()));
    assert_eq!(e.max_dim(), Some(0));
    assert!(e.is_linear());
    assert_eq!(e.to_string(), "x0 + 4");
}

#[test]
fn quasilinearization_folds_interval_coefficients() {
    // [1,3]x0 + x1 with x0 in [0,2]: x0 gets 2, remainder [-1,1]*[0,2] = [-2,2].
    let e = LinExpr::new()
        .with(0, Coeff::Interval(Interval::closed(rat(1), rat(3))))
        .with(1, Coeff::int(1));
    assert!(!e.is_quasilinear());
    let q = e.quasilinearize(|d| {
        if d == 0 {
            Interval::closed(rat(0), rat(2))
        } else {
            Interval::top()
        }
    });
    assert!(!q.exact);
    assert_eq!(q.terms, vec![(0, rat(2)), (1, rat(1))]);
    assert_eq!(q.cst, Interval::closed(rat(-2), rat(2)));
}

#[test]
fn quasilinearization_merges_repeated_dimensions() {
    let e = LinExpr {
        terms: vec![
            (1, Coeff::int(2)),
            (0, Coeff::int(1)),
            (1, Coeff::int(-2)),
            (0, Coeff::Interval(Interval::closed(rat(0), rat(2)))),
        ],
        cst: Coeff::int(3),
    };
    let q = e.quasilinearize(|_| Interval::closed(rat(0), rat(1)));
    assert!(!q.exact);
    assert_eq!(q.terms, vec![(0, rat(2))]);
    assert_eq!(q.cst, Interval::closed(rat(2), rat(4)));
}

#[test]
fn display_of_constraints_and_generators() {
    assert_eq!(LinCons::upper(0, 5).to_string(), "-x0 >= -5");
    let c = LinCons::eq(LinExpr::from_ints(&[(0, 2), (1, -1)], -3));
    assert_eq!(c.to_string(), "2x0 - x1 = 3");
    let g = LinGen::vertex(vec![(1, frac(1, 2)), (0, rat(0))]);
    assert_eq!(g.to_string(), "V(x1=1/2)");
    assert_eq!(g.coord(0), rat(0));
}
