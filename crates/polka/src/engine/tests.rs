use super::*;
use crate::cfg::PolyCfg;
use crate::matrix::{dot, Row, XI};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

fn r(xs: &[i64]) -> Row {
    xs.iter().map(|&x| BigInt::from(x)).collect()
}

fn m(width: usize, rows: &[&[i64]]) -> Matrix {
    Matrix::from_rows(width, rows.iter().map(|x| r(x)).collect())
}

fn sorted_rays(c: &Conversion) -> Vec<Row> {
    let mut v: Vec<Row> = c
        .dual
        .iter()
        .filter(|row| !row[0].is_zero())
        .cloned()
        .collect();
    v.sort();
    v
}

fn unit_square() -> Matrix {
    m(
        4,
        &[
            &[1, 1, 0, 0],
            &[1, 0, 1, 0],
            &[1, 1, -1, 0],
            &[1, 0, 0, 1],
            &[1, 1, 0, -1],
        ],
    )
}

#[test]
fn square_has_four_vertices() {
    let layout = Layout::new(false, 0, 2);
    let budget = Budget::unlimited();
    let conv = Chernikova.convert(&layout, &unit_square(), &budget).unwrap();
    assert_eq!(conv.dual_lines, 0);
    let mut want = vec![r(&[1, 1, 0, 0]), r(&[1, 1, 1, 0]), r(&[1, 1, 0, 1]), r(&[1, 1, 1, 1])];
    want.sort();
    assert_eq!(sorted_rays(&conv), want);
    assert_eq!(conv.sat, SatMatrix::compute(&conv.dual, &unit_square()));
}

#[test]
fn equality_leaves_a_line() {
    // x = 1 in the plane: vertex (1, 0) plus the line along y
    let layout = Layout::new(false, 0, 2);
    let cons = m(4, &[&[1, 1, 0, 0], &[0, -1, 1, 0]]);
    let conv = Chernikova.convert(&layout, &cons, &Budget::unlimited()).unwrap();
    assert_eq!(conv.dual_lines, 1);
    assert_eq!(conv.dual.row(0), &r(&[0, 0, 0, 1]));
    assert_eq!(sorted_rays(&conv), vec![r(&[1, 1, 1, 0])]);
}

#[test]
fn infeasible_system_has_no_point() {
    let layout = Layout::new(false, 0, 1);
    let cons = m(3, &[&[1, 1, 0], &[1, -1, 1], &[1, 0, -1]]);
    let conv = Chernikova.convert(&layout, &cons, &Budget::unlimited()).unwrap();
    assert!(conv.dual.iter().all(|g| !g[XI].is_positive()));
}

#[test]
fn generators_to_constraints() {
    // triangle (0,0), (1,0), (0,1)
    let layout = Layout::new(false, 0, 2);
    let gens = m(4, &[&[1, 1, 0, 0], &[1, 1, 1, 0], &[1, 1, 0, 1]]);
    let conv = Chernikova.convert(&layout, &gens, &Budget::unlimited()).unwrap();
    assert_eq!(conv.dual_lines, 0);
    assert_eq!(conv.dual.nrows(), 3);
    for c in conv.dual.iter() {
        for g in gens.iter() {
            assert!(!dot(c, g).is_negative());
        }
    }
}

#[test]
fn extend_matches_full_conversion() {
    let layout = Layout::new(false, 0, 2);
    let all = unit_square();
    let head = Matrix::from_rows(4, all.rows()[..3].to_vec());
    let budget = Budget::unlimited();
    let prev = Chernikova.convert(&layout, &head, &budget).unwrap();
    let inc = Chernikova.extend(&layout, &all, 3, prev, &budget).unwrap();
    let full = Chernikova.convert(&layout, &all, &budget).unwrap();
    assert_eq!(sorted_rays(&inc), sorted_rays(&full));
    assert_eq!(inc.sat, SatMatrix::compute(&inc.dual, &all));
}

#[test]
fn row_budget_is_enforced() {
    let layout = Layout::new(false, 0, 3);
    let cfg = PolyCfg {
        max_rows: 3,
        ..PolyCfg::default()
    };
    let cons = m(5, &[&[1, 1, 0, 0, 0], &[1, 0, 1, 0, 0]]);
    let err = Chernikova
        .convert(&layout, &cons, &Budget::new(&cfg))
        .unwrap_err();
    assert!(matches!(err, PolyError::OutOfSpace { limit: 3, .. }));
}

#[test]
fn simplify_drops_redundant_rows() {
    let layout = Layout::new(false, 0, 2);
    let mut cons = unit_square();
    cons.push(r(&[1, 2, -1, 0])); // x <= 2
    cons.push(r(&[1, 0, 2, 0])); // 2x >= 0
    let mut conv = Chernikova
        .convert(&layout, &cons, &Budget::unlimited())
        .unwrap();
    let eqs = simplify(&layout, &mut cons, &mut conv);
    assert_eq!(eqs, 0);
    assert_eq!(cons.nrows(), 4);
    assert_eq!(conv.sat.ncols(), 4);
    assert!(!cons.rows().contains(&r(&[1, 1, 0, 0])));
    assert!(cons.rows().contains(&r(&[1, 0, 1, 0])));
    assert_eq!(conv.sat, SatMatrix::compute(&conv.dual, &cons));
}

#[test]
fn simplify_detects_implicit_equality() {
    // x >= 1 and x <= 1
    let layout = Layout::new(false, 0, 1);
    let mut cons = m(3, &[&[1, 1, 0], &[1, -1, 1], &[1, 1, -1]]);
    let mut conv = Chernikova
        .convert(&layout, &cons, &Budget::unlimited())
        .unwrap();
    let eqs = simplify(&layout, &mut cons, &mut conv);
    assert_eq!(eqs, 1);
    assert_eq!(cons.rows(), &[r(&[1, 1, 0]), r(&[0, 1, -1])]);
}

#[test]
fn gauss_back_substitutes() {
    // x + y = 2, x - y = 0
    let mut eqs = m(4, &[&[0, -2, 1, 1], &[0, 0, 1, -1]]);
    let rank = gauss(&mut eqs);
    assert_eq!(rank, 2);
    assert_eq!(eqs.rows(), &[r(&[0, 1, 0, -1]), r(&[0, 1, -1, 0])]);
}

#[test]
fn sorting_keeps_saturation_aligned() {
    let layout = Layout::new(false, 0, 2);
    let mut cons = unit_square();
    let mut conv = Chernikova
        .convert(&layout, &cons, &Budget::unlimited())
        .unwrap();
    simplify(&layout, &mut cons, &mut conv);
    sort_primal(&mut cons, &mut conv.sat);
    sort_dual(&mut conv.dual, &mut conv.sat);
    assert!(cons.is_sorted() && conv.dual.is_sorted());
    assert_eq!(conv.sat, SatMatrix::compute(&conv.dual, &cons));
}
