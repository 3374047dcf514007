//! Translation between exchange types and internal rows, and the
//! constructors built on it.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::{Polyhedron, Side};
use crate::domain::Domain;
use crate::error::PolyError;
use crate::linear::{Coeff, ConsKind, GenKind, Interval, LinCons, LinExpr, LinGen};
use crate::matrix::{is_equality, normalize, tighten_integer, Layout, Matrix, Row, EPS, MARKER, XI};
use crate::num::{lcm_denoms, scaled_numer};
use crate::outcome::Outcome;

/// Rows produced from exchange data; `exact` is false when something was
/// over-approximated on the way.
#[derive(Debug)]
pub(crate) struct RowBatch {
    pub rows: Vec<Row>,
    pub exact: bool,
}

/// `a·x + c` scaled to integers, as an inequality (or equality if `eq`).
pub(crate) fn linear_row(layout: &Layout, eq: bool, terms: &[(usize, BigRational)], cst: &BigRational) -> Row {
    let scale = lcm_denoms(terms.iter().map(|(_, q)| q).chain(std::iter::once(cst)));
    let mut row = layout.zero_row();
    row[MARKER] = if eq { BigInt::zero() } else { BigInt::one() };
    row[XI] = scaled_numer(cst, &scale);
    for (d, q) in terms {
        row[layout.col(*d)] += scaled_numer(q, &scale);
    }
    normalize(&mut row);
    row
}

/// The constraint `-1 ≥ 0`.
pub(crate) fn contradiction(layout: &Layout) -> Row {
    let mut row = layout.zero_row();
    row[MARKER] = BigInt::one();
    row[XI] = -BigInt::one();
    row
}

fn check_expr(layout: &Layout, expr: &LinExpr) -> Result<(), PolyError> {
    match expr.terms.iter().map(|(d, _)| *d).max() {
        Some(d) if d >= layout.dims() => Err(PolyError::invalid(format!(
            "constraint mentions dimension {d} (have {})",
            layout.dims()
        ))),
        _ => Ok(()),
    }
}

/// Rows of an interval-linear constraint system. Interval coefficients are
/// folded into the constant using `bounds`.
pub(crate) fn constraint_rows(
    layout: &Layout,
    cons: &[LinCons],
    bounds: impl Fn(usize) -> Interval,
) -> Result<RowBatch, PolyError> {
    let mut rows = Vec::with_capacity(cons.len());
    let mut exact = true;
    for c in cons {
        check_expr(layout, &c.expr)?;
        let q = c.expr.quasilinearize(&bounds);
        exact &= q.exact;
        if q.cst.is_bottom() {
            rows.push(contradiction(layout));
            continue;
        }
        match &c.kind {
            ConsKind::SupEq => match &q.cst.sup {
                Some(hi) => rows.push(linear_row(layout, false, &q.terms, hi)),
                None => exact = false,
            },
            ConsKind::Sup => match &q.cst.sup {
                Some(hi) => {
                    let mut row = linear_row(layout, false, &q.terms, hi);
                    let all_int = q.terms.iter().all(|(d, _)| layout.is_int(*d));
                    if layout.strict {
                        row[EPS] = -BigInt::one();
                    } else if all_int {
                        row[XI] -= BigInt::one();
                        normalize(&mut row);
                    } else {
                        exact = false;
                    }
                    rows.push(row);
                }
                None => exact = false,
            },
            ConsKind::Eq => {
                if q.cst.is_point() {
                    if let Some(v) = &q.cst.inf {
                        rows.push(linear_row(layout, true, &q.terms, v));
                    }
                } else {
                    // a·x + [lo, hi] = 0  ⟺  -hi ≤ a·x ≤ -lo
                    if let Some(hi) = &q.cst.sup {
                        rows.push(linear_row(layout, false, &q.terms, hi));
                    }
                    if let Some(lo) = &q.cst.inf {
                        let neg: Vec<(usize, BigRational)> =
                            q.terms.iter().map(|(d, a)| (*d, -a)).collect();
                        rows.push(linear_row(layout, false, &neg, &-lo));
                    }
                }
            }
            ConsKind::EqMod(_) | ConsKind::Diseq => exact = false,
        }
    }
    rows.retain(|r| r.iter().skip(1).any(|x| !x.is_zero()));
    if layout.int_dims > 0 {
        for r in &mut rows {
            tighten_integer(layout, r);
        }
    }
    Ok(RowBatch { rows, exact })
}

/// Rows of a generator system. A vertex becomes a point; in strict mode it
/// is accompanied by its closure point.
pub(crate) fn generator_rows(layout: &Layout, gens: &[LinGen]) -> Result<Vec<Row>, PolyError> {
    let mut rows = Vec::with_capacity(gens.len() * if layout.strict { 2 } else { 1 });
    for g in gens {
        if let Some((d, _)) = g.coords.iter().find(|(d, _)| *d >= layout.dims()) {
            return Err(PolyError::invalid(format!(
                "generator mentions dimension {d} (have {})",
                layout.dims()
            )));
        }
        let scale = lcm_denoms(g.coords.iter().map(|(_, q)| q));
        let mut row = layout.zero_row();
        for (d, q) in &g.coords {
            row[layout.col(*d)] += scaled_numer(q, &scale);
        }
        match g.kind {
            GenKind::Vertex => {
                row[MARKER] = BigInt::one();
                row[XI] = scale;
                normalize(&mut row);
                if layout.strict {
                    rows.push(row.clone());
                    row[EPS] = row[XI].clone();
                }
                rows.push(row);
            }
            GenKind::Ray | GenKind::Line => {
                if g.coords.is_empty() {
                    continue;
                }
                row[MARKER] = if g.kind == GenKind::Ray {
                    BigInt::one()
                } else {
                    BigInt::zero()
                };
                normalize(&mut row);
                rows.push(row);
            }
            GenKind::RayMod | GenKind::LineMod => {
                return Err(PolyError::not_implemented("modular generators"));
            }
        }
    }
    Ok(rows)
}

/// Constraint row in exchange form: `=` for equalities, `>` for a negative ε
/// coefficient, `≥` otherwise.
pub(crate) fn row_to_cons(layout: &Layout, row: &Row) -> LinCons {
    let mut expr = LinExpr::constant(BigRational::from_integer(row[XI].clone()));
    for d in 0..layout.dims() {
        let a = &row[layout.col(d)];
        if !a.is_zero() {
            expr = expr.with(d, Coeff::Scalar(BigRational::from_integer(a.clone())));
        }
    }
    let kind = if is_equality(row) {
        ConsKind::Eq
    } else if layout.strict && row[EPS].is_negative() {
        ConsKind::Sup
    } else {
        ConsKind::SupEq
    };
    LinCons::new(kind, expr)
}

/// Generator row in exchange form; `None` for rows without a direction.
pub(crate) fn row_to_gen(layout: &Layout, row: &Row) -> Option<LinGen> {
    let xi = &row[XI];
    let vertex = !is_equality(row) && xi.is_positive();
    let coords: Vec<(usize, BigRational)> = (0..layout.dims())
        .filter(|&d| !row[layout.col(d)].is_zero())
        .map(|d| {
            let c = row[layout.col(d)].clone();
            let q = if vertex {
                BigRational::new(c, xi.clone())
            } else {
                BigRational::from_integer(c)
            };
            (d, q)
        })
        .collect();
    if vertex {
        return Some(LinGen::vertex(coords));
    }
    if coords.is_empty() {
        return None;
    }
    if is_equality(row) {
        Some(LinGen::line(coords))
    } else {
        Some(LinGen::ray(coords))
    }
}

impl Polyhedron {
    /// Polyhedron described by a constraint system.
    pub fn of_linear_constraints(
        dom: &Domain,
        int_dims: usize,
        real_dims: usize,
        cons: &[LinCons],
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        let layout = dom.layout(int_dims, real_dims);
        let batch = constraint_rows(&layout, cons, |_| Interval::top())?;
        Self::build(dom, layout, Side::Constraints, batch.rows, batch.exact)
    }

    /// Polyhedron spanned by vertices, rays and lines; bottom without a vertex.
    pub fn of_generators(
        dom: &Domain,
        int_dims: usize,
        real_dims: usize,
        gens: &[LinGen],
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        let layout = dom.layout(int_dims, real_dims);
        let rows = generator_rows(&layout, gens)?;
        Self::build(dom, layout, Side::Generators, rows, true)
    }

    /// Box with one interval per dimension.
    pub fn of_box(
        dom: &Domain,
        int_dims: usize,
        real_dims: usize,
        itvs: &[Interval],
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        let layout = dom.layout(int_dims, real_dims);
        if itvs.len() != layout.dims() {
            return Err(PolyError::invalid(format!(
                "box has {} intervals for {} dimensions",
                itvs.len(),
                layout.dims()
            )));
        }
        if itvs.iter().any(Interval::is_bottom) {
            return Ok(Outcome::exact(Self::bottom_of(layout)));
        }
        let one = BigRational::one();
        let mut rows = Vec::with_capacity(2 * itvs.len());
        for (d, itv) in itvs.iter().enumerate() {
            if let Some(lo) = &itv.inf {
                rows.push(linear_row(&layout, false, &[(d, one.clone())], &-lo));
            }
            if let Some(hi) = &itv.sup {
                rows.push(linear_row(&layout, false, &[(d, -one.clone())], hi));
            }
        }
        if layout.int_dims > 0 {
            for r in &mut rows {
                tighten_integer(&layout, r);
            }
        }
        Self::build(dom, layout, Side::Constraints, rows, true)
    }

    fn build(
        dom: &Domain,
        layout: Layout,
        side: Side,
        rows: Vec<Row>,
        exact: bool,
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        let mut p = Self::from_side(layout, side, Matrix::from_rows(layout.width(), rows));
        let flags = p.guarded("construct", layout, |p| {
            p.convert_from(dom, side)?;
            Ok(p.flags(exact))
        })?;
        Ok(flags.map(|_| p))
    }
}
