//! Assignment `x_j := e` and substitution `x_j ← e`.
//!
//! A single deterministic assignment rewrites rows in place: generators get
//! the new coordinate, constraints are rewritten with the inverse map when it
//! exists. Substitution is the same pair of kernels on opposite sides.
//! Parallel and interval-valued transfers go through fresh dimensions:
//! extend, link with `x'_i = e_i`, exchange, project.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::import::constraint_rows;
use super::resize::DimChange;
use super::{Polyhedron, Side, StatusFlags};
use crate::domain::Domain;
use crate::error::PolyError;
use crate::linear::{Coeff, Interval, LinCons, LinExpr};
use crate::matrix::{dot, is_zero_vector, normalize, Layout, Matrix, Row, MARKER, XI};
use crate::num::{gcd_all, lcm_denoms, scaled_numer};
use crate::outcome::Outcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Transfer {
    Assign,
    Substitute,
}

impl Transfer {
    fn name(self) -> &'static str {
        match self {
            Transfer::Assign => "assign",
            Transfer::Substitute => "substitute",
        }
    }

    /// Side rewritten with the expression itself.
    fn forward(self) -> Side {
        match self {
            Transfer::Assign => Side::Generators,
            Transfer::Substitute => Side::Constraints,
        }
    }
}

/// `(Σ coeffs[c]·col_c) / den` over row columns; `coeffs[XI]` is the constant.
#[derive(Clone, Debug, PartialEq, Eq)]
struct IntExpr {
    den: BigInt,
    coeffs: Row,
}

impl IntExpr {
    fn new(layout: &Layout, terms: &[(usize, BigRational)], cst: &BigRational) -> Self {
        let den = lcm_denoms(terms.iter().map(|(_, q)| q).chain(std::iter::once(cst)));
        let mut coeffs = layout.zero_row();
        coeffs[XI] = scaled_numer(cst, &den);
        for (d, q) in terms {
            coeffs[layout.col(*d)] += scaled_numer(q, &den);
        }
        let g = gcd_all(coeffs.iter()).gcd(&den);
        let mut e = IntExpr { den, coeffs };
        if !g.is_zero() && g != BigInt::from(1) {
            e.den = &e.den / &g;
            for x in e.coeffs.iter_mut() {
                *x = &*x / &g;
            }
        }
        e
    }

    /// Inverse of `x_col := self`, when the coefficient of `col` is non-zero.
    fn inverse(&self, col: usize) -> Option<IntExpr> {
        let pivot = &self.coeffs[col];
        if pivot.is_zero() {
            return None;
        }
        let mut coeffs: Row = self.coeffs.iter().map(|x| -x).collect();
        coeffs[MARKER] = BigInt::zero();
        coeffs[col] = self.den.clone();
        if pivot.is_negative() {
            for x in coeffs.iter_mut() {
                *x = -&*x;
            }
        }
        Some(IntExpr {
            den: pivot.abs(),
            coeffs,
        })
    }
}

/// Generator image under `x_col := e`.
fn assign_row(row: &mut Row, col: usize, e: &IntExpr) {
    let v = dot(&e.coeffs, row);
    for (c, x) in row.iter_mut().enumerate().skip(1) {
        if c != col {
            *x *= &e.den;
        }
    }
    row[col] = v;
    normalize(row);
}

/// Constraint with `x_col` replaced by `e`.
fn subst_row(row: &mut Row, col: usize, e: &IntExpr) {
    let a = row[col].clone();
    if a.is_zero() {
        return;
    }
    for c in 1..row.len() {
        row[c] = if c == col {
            &a * &e.coeffs[col]
        } else {
            &row[c] * &e.den + &a * &e.coeffs[c]
        };
    }
    normalize(row);
}

fn rewrite(m: &mut Matrix, side: Side, col: usize, e: &IntExpr) {
    for i in 0..m.nrows() {
        let row = m.row_mut(i);
        match side {
            Side::Generators => assign_row(row, col, e),
            Side::Constraints => subst_row(row, col, e),
        }
    }
}

impl Polyhedron {
    pub fn assign_in_place(
        &mut self,
        dom: &Domain,
        dim: usize,
        expr: &LinExpr,
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<()>, PolyError> {
        self.transfer_in_place(dom, Transfer::Assign, &[dim], std::slice::from_ref(expr), dest)
    }

    pub fn assign(
        &self,
        dom: &Domain,
        dim: usize,
        expr: &LinExpr,
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.assign_in_place(dom, dim, expr, dest))
    }

    /// Parallel assignment of `exprs[i]` to `dims[i]`.
    pub fn assign_array_in_place(
        &mut self,
        dom: &Domain,
        dims: &[usize],
        exprs: &[LinExpr],
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<()>, PolyError> {
        self.transfer_in_place(dom, Transfer::Assign, dims, exprs, dest)
    }

    pub fn assign_array(
        &self,
        dom: &Domain,
        dims: &[usize],
        exprs: &[LinExpr],
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.assign_array_in_place(dom, dims, exprs, dest))
    }

    pub fn substitute_in_place(
        &mut self,
        dom: &Domain,
        dim: usize,
        expr: &LinExpr,
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<()>, PolyError> {
        self.transfer_in_place(dom, Transfer::Substitute, &[dim], std::slice::from_ref(expr), dest)
    }

    pub fn substitute(
        &self,
        dom: &Domain,
        dim: usize,
        expr: &LinExpr,
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.substitute_in_place(dom, dim, expr, dest))
    }

    pub fn substitute_array_in_place(
        &mut self,
        dom: &Domain,
        dims: &[usize],
        exprs: &[LinExpr],
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<()>, PolyError> {
        self.transfer_in_place(dom, Transfer::Substitute, dims, exprs, dest)
    }

    pub fn substitute_array(
        &self,
        dom: &Domain,
        dims: &[usize],
        exprs: &[LinExpr],
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.substitute_array_in_place(dom, dims, exprs, dest))
    }

    fn transfer_in_place(
        &mut self,
        dom: &Domain,
        kind: Transfer,
        dims: &[usize],
        exprs: &[LinExpr],
        dest: Option<&Polyhedron>,
    ) -> Result<Outcome<()>, PolyError> {
        if dims.len() != exprs.len() {
            return Err(PolyError::invalid(format!(
                "{} dimensions for {} expressions",
                dims.len(),
                exprs.len()
            )));
        }
        let n = self.dims();
        let mut sorted = dims.to_vec();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) || sorted.last().is_some_and(|&d| d >= n) {
            return Err(PolyError::invalid(format!("bad target dimensions {dims:?}")));
        }
        if let Some(d) = exprs.iter().flat_map(|e| e.terms.iter().map(|(d, _)| *d)).find(|&d| d >= n) {
            return Err(PolyError::invalid(format!("expression mentions dimension {d} (have {n})")));
        }
        if let Some(d) = dest {
            self.check_compatible(d)?;
        }
        let layout = self.layout;
        self.guarded(kind.name(), layout, |p| {
            if p.is_empty_repr() || dims.is_empty() {
                return Ok(Outcome::exact(()));
            }
            let exact = match (dims, exprs) {
                ([dim], [expr]) if expr.is_linear() => {
                    let q = expr.quasilinearize(|_| Interval::top());
                    let cst = q.cst.inf.clone().unwrap_or_else(BigRational::zero);
                    let e = IntExpr::new(&layout, &q.terms, &cst);
                    p.transfer_exact(dom, kind, *dim, &e)?;
                    true
                }
                _ => p.transfer_general(dom, kind, dims, exprs)?,
            };
            let mut out = p.flags(exact);
            if let Some(d) = dest {
                let step = p.meet_in_place(dom, d)?;
                out = out.and_flags(&step);
            }
            Ok(out)
        })
    }

    /// Row rewriting for one deterministic expression.
    fn transfer_exact(&mut self, dom: &Domain, kind: Transfer, dim: usize, e: &IntExpr) -> Result<(), PolyError> {
        let col = self.layout.col(dim);
        let fwd = kind.forward();
        let inv = e.inverse(col);
        if inv.is_none() {
            self.ensure(dom, fwd)?;
        }
        if self.is_empty_repr() {
            return Ok(());
        }
        if let Some(m) = self.reps[fwd].as_mut() {
            rewrite(m, fwd, col, e);
        }
        match &inv {
            Some(inv) => {
                let back = fwd.dual();
                if let Some(m) = self.reps[back].as_mut() {
                    rewrite(m, back, col, inv);
                }
            }
            None => {
                if let Some(m) = self.reps[fwd].as_mut() {
                    let keep: Vec<bool> = m.iter().map(|r| !is_zero_vector(r)).collect();
                    m.retain_rows(&keep);
                }
                self.keep_only(fwd);
            }
        }
        self.status.remove(StatusFlags::C_GAUSS);
        self.status.remove(StatusFlags::G_GAUSS);
        self.status.remove(StatusFlags::C_EPS_NORMALIZED);
        Ok(())
    }

    /// Transfer through `k` fresh dimensions appended after the last one.
    fn transfer_general(
        &mut self,
        dom: &Domain,
        kind: Transfer,
        dims: &[usize],
        exprs: &[LinExpr],
    ) -> Result<bool, PolyError> {
        let layout = self.layout;
        let n = layout.dims();
        let k = dims.len();
        let mut bounds = if exprs.iter().any(|e| !e.is_quasilinear()) {
            self.dimension_bounds(dom)?
        } else {
            Vec::new()
        };
        if kind == Transfer::Substitute && !bounds.is_empty() {
            // the substituted dimensions are free in the result
            for &d in dims {
                bounds[d] = Interval::top();
            }
        }
        self.add_dims_raw(&DimChange::append_real(&layout, k), false);
        let extended = self.layout;
        let mut swap: Vec<usize> = (0..n + k).collect();
        for (i, &d) in dims.iter().enumerate() {
            swap[d] = n + i;
            swap[n + i] = d;
        }
        if kind == Transfer::Substitute {
            self.permute_raw(&swap);
        }
        let links: Vec<LinCons> = exprs
            .iter()
            .enumerate()
            .map(|(i, e)| LinCons::eq(e.neg().with(n + i, Coeff::int(1))))
            .collect();
        let batch = constraint_rows(&extended, &links, |d| {
            bounds.get(d).cloned().unwrap_or_else(Interval::top)
        })?;
        self.add_rows(dom, Side::Constraints, batch.rows)?;
        if kind == Transfer::Assign {
            self.permute_raw(&swap);
        }
        let primed: Vec<usize> = (n..n + k).collect();
        self.remove_dims_raw(dom, &primed, layout)?;
        Ok(batch.exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::{frac, rat};

    fn r(xs: &[i64]) -> Row {
        xs.iter().map(|&x| BigInt::from(x)).collect()
    }

    #[test]
    fn inverse_of_shift_and_scale() {
        // x0 := (2x0 + 3) / 5 over one real dimension
        let layout = Layout::new(false, 0, 1);
        let e = IntExpr::new(&layout, &[(0, frac(2, 5))], &frac(3, 5));
        assert_eq!(e.den, BigInt::from(5));
        assert_eq!(e.coeffs, r(&[0, 3, 2]));
        let inv = e.inverse(2).unwrap();
        // x0 = (5y - 3) / 2
        assert_eq!(inv.den, BigInt::from(2));
        assert_eq!(inv.coeffs, r(&[0, -3, 5]));
    }

    #[test]
    fn negative_pivot_keeps_denominator_positive() {
        let layout = Layout::new(false, 0, 1);
        let e = IntExpr::new(&layout, &[(0, rat(-1))], &rat(4));
        let inv = e.inverse(2).unwrap();
        assert_eq!(inv.den, BigInt::from(1));
        assert_eq!(inv.coeffs, r(&[0, 4, -1]));
    }

    #[test]
    fn kernels_are_dual() {
        // x0 := x0 + x1 + 1 on the point (2, 3), against x0 - 4 >= 0
        let layout = Layout::new(false, 0, 2);
        let e = IntExpr::new(&layout, &[(0, rat(1)), (1, rat(1))], &rat(1));
        let mut g = r(&[1, 1, 2, 3]);
        assign_row(&mut g, 2, &e);
        assert_eq!(g, r(&[1, 1, 6, 3]));
        let mut c = r(&[1, -4, 1, 0]);
        subst_row(&mut c, 2, &e);
        // (x0 + x1 + 1) - 4 >= 0
        assert_eq!(c, r(&[1, -3, 1, 1]));
        // substituted constraint on the old point equals the original on the image
        let old = r(&[1, 1, 2, 3]);
        assert_eq!(dot(&c, &old), dot(&r(&[1, -4, 1, 0]), &g));
    }
}
