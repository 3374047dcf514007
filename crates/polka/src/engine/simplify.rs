//! Removal of redundant primal rows once the dual is known.
//!
//! - An inequality saturated by every dual ray is an implicit equality.
//! - Equalities are kept only while linearly independent (Gauss on a copy).
//! - An inequality defines a facet iff enough rays saturate it and no other
//!   inequality is saturated by a strict superset of its rays. Among rows with
//!   identical saturation only the first one is kept.

use num_traits::Zero;

use super::Conversion;
use crate::matrix::{
    eliminate, is_equality, is_subset, normalize_sign, popcount, Layout, Matrix, Row, SatMatrix,
    MARKER,
};

/// Minimize `primal` against its dual in `conv`; returns the number of
/// equalities (lines) left in `primal`. Saturation columns follow the rows.
pub fn simplify(layout: &Layout, primal: &mut Matrix, conv: &mut Conversion) -> usize {
    let n = primal.nrows();
    let rays: Vec<usize> = (0..conv.dual.nrows())
        .filter(|&g| !is_equality(conv.dual.row(g)))
        .collect();

    for i in 0..n {
        if !is_equality(primal.row(i)) && rays.iter().all(|&g| conv.sat.get(g, i)) {
            let row = primal.row_mut(i);
            row[MARKER] = Zero::zero();
            normalize_sign(row);
        }
    }

    let mut keep = vec![true; n];
    let mut basis: Vec<(Row, usize)> = Vec::new();
    for i in 0..n {
        if !is_equality(primal.row(i)) {
            continue;
        }
        let mut r = primal.row(i).clone();
        for (b, col) in &basis {
            eliminate(&mut r, b, *col);
        }
        match pivot_column(&r) {
            Some(c) => basis.push((r, c)),
            None => keep[i] = false,
        }
    }
    let rank = basis.len();

    let lines = conv.dual_lines;
    let need = layout
        .cone_dim()
        .saturating_sub(rank + lines)
        .saturating_sub(1);
    let by_row = conv.sat.transpose();
    let ineqs: Vec<usize> = (0..n).filter(|&i| !is_equality(primal.row(i))).collect();
    for &i in &ineqs {
        if popcount(by_row.row(i)).saturating_sub(lines) < need {
            keep[i] = false;
        }
    }
    for &i in &ineqs {
        if !keep[i] {
            continue;
        }
        let si = by_row.row(i);
        let dominated = ineqs.iter().any(|&j| {
            j != i && keep[j] && is_subset(si, by_row.row(j)) && (j < i || si != by_row.row(j))
        });
        if dominated {
            keep[i] = false;
        }
    }

    if keep.iter().any(|k| !k) {
        primal.retain_rows(&keep);
        conv.sat.retain_columns(&keep);
    }
    rank
}

/// Last non-zero column after the marker.
fn pivot_column(row: &Row) -> Option<usize> {
    (1..row.len()).rev().find(|&c| !row[c].is_zero())
}

/// Gauss-Jordan reduction of the equalities (lines) of `m`, followed by
/// reduction of the remaining rows. Each row changes by a positive factor plus
/// a combination of equalities, so saturation is unchanged. Returns the rank.
pub fn gauss(m: &mut Matrix) -> usize {
    let n = m.nrows();
    let mut pivots: Vec<(usize, usize)> = Vec::new();
    for i in 0..n {
        if !is_equality(m.row(i)) {
            continue;
        }
        let mut r = m.row(i).clone();
        for &(pi, col) in &pivots {
            eliminate(&mut r, m.row(pi), col);
        }
        let Some(c) = pivot_column(&r) else {
            continue;
        };
        normalize_sign(&mut r);
        for &(pi, _) in &pivots {
            let mut q = m.row(pi).clone();
            eliminate(&mut q, &r, c);
            normalize_sign(&mut q);
            *m.row_mut(pi) = q;
        }
        *m.row_mut(i) = r;
        pivots.push((i, c));
    }
    for i in 0..n {
        if is_equality(m.row(i)) {
            continue;
        }
        let mut r = m.row(i).clone();
        for &(pi, col) in &pivots {
            eliminate(&mut r, m.row(pi), col);
        }
        if r != *m.row(i) {
            *m.row_mut(i) = r;
        }
    }
    pivots.len()
}

/// Sort primal rows; saturation columns follow.
pub fn sort_primal(primal: &mut Matrix, sat: &mut SatMatrix) {
    let order = primal.sort();
    sat.select_columns(&order);
}

/// Sort dual rows; saturation rows follow.
pub fn sort_dual(dual: &mut Matrix, sat: &mut SatMatrix) {
    let order = dual.sort();
    sat.reorder_rows(&order);
}
