//! Tests, bounds and extraction.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use tracing::warn;

use super::import::{linear_row, row_to_cons, row_to_gen};
use super::{tri, Polyhedron, Side};
use crate::domain::Domain;
use crate::error::PolyError;
use crate::linear::{ConsKind, Interval, LinCons, LinExpr, LinGen};
use crate::matrix::{dot, dot_without_eps, is_equality, Layout, Row, EPS, XI};
use crate::num::rat;
use crate::outcome::{Outcome, Tbool};

/// Generator `g` satisfies constraint `c`. A line must be orthogonal to it;
/// a point (ε > 0) must satisfy a strict constraint strictly.
pub(crate) fn gen_satisfies(layout: &Layout, c: &Row, g: &Row) -> bool {
    let s = dot_without_eps(layout, c, g);
    if is_equality(c) || is_equality(g) {
        return s.is_zero();
    }
    if s.is_negative() {
        return false;
    }
    !(s.is_zero() && layout.strict && c[EPS].is_negative() && g[EPS].is_positive())
}

/// Resource errors in extraction fall back to the answer for `top`.
fn recover<T>(op: &'static str, r: Result<T, PolyError>, top: impl FnOnce() -> T) -> Result<T, PolyError> {
    match r {
        Ok(v) => Ok(v),
        Err(e) if e.is_resource() => {
            warn!(op, error = %e, "resource limit reached, answering for top");
            Ok(top())
        }
        Err(e) => Err(e),
    }
}

impl Polyhedron {
    pub fn is_bottom(&self, dom: &Domain) -> Result<Tbool, PolyError> {
        tri("is_bottom", self.view(dom, Side::Generators).map(|v| v.is_empty_repr()))
    }

    pub fn is_top(&self, dom: &Domain) -> Result<Tbool, PolyError> {
        let r = self.minimal_view(dom).map(|v| match v.rep(Side::Constraints) {
            None => false,
            Some(c) => c.iter().all(|r| self.layout.is_positivity(r)),
        });
        tri("is_top", r)
    }

    /// Inclusion `self ⊑ other`.
    pub fn is_leq(&self, dom: &Domain, other: &Polyhedron) -> Result<Tbool, PolyError> {
        self.check_compatible(other)?;
        tri("is_leq", self.leq(dom, other))
    }

    pub fn is_eq(&self, dom: &Domain, other: &Polyhedron) -> Result<Tbool, PolyError> {
        self.check_compatible(other)?;
        if std::ptr::eq(self, other) {
            return Ok(Tbool::True);
        }
        tri("is_eq", Ok(self.leq(dom, other)? && other.leq(dom, self)?))
    }

    fn leq(&self, dom: &Domain, other: &Polyhedron) -> Result<bool, PolyError> {
        let a = self.view(dom, Side::Generators)?;
        let Some(gens) = a.rep(Side::Generators) else {
            return Ok(true);
        };
        let b = other.view(dom, Side::Constraints)?;
        let Some(cons) = b.rep(Side::Constraints) else {
            return Ok(false);
        };
        let layout = self.layout;
        Ok(cons
            .iter()
            .filter(|c| !layout.is_positivity(c))
            .all(|c| gens.iter().all(|g| gen_satisfies(&layout, c, g))))
    }

    /// Every point satisfies `cons`. An interval constant must work for
    /// each of its values.
    pub fn sat_lincons(&self, dom: &Domain, cons: &LinCons) -> Result<Tbool, PolyError> {
        if let Some(d) = cons.expr.max_dim() {
            self.check_dim(d)?;
        }
        recover("sat_lincons", self.sat_lincons_raw(dom, cons), || Tbool::Top)
    }

    fn sat_lincons_raw(&self, dom: &Domain, cons: &LinCons) -> Result<Tbool, PolyError> {
        let layout = self.layout;
        let view = self.view(dom, Side::Generators)?;
        let Some(gens) = view.rep(Side::Generators) else {
            return Ok(Tbool::True);
        };
        let bounds = if cons.expr.is_quasilinear() {
            Vec::new()
        } else {
            view.dimension_bounds(dom)?
        };
        let q = cons
            .expr
            .quasilinearize(|d| bounds.get(d).cloned().unwrap_or_else(Interval::top));
        let holds = |row: Row| gens.iter().all(|g| gen_satisfies(&layout, &row, g));
        let answer = match &cons.kind {
            ConsKind::SupEq => match &q.cst.inf {
                Some(lo) => holds(linear_row(&layout, false, &q.terms, lo)),
                None => false,
            },
            ConsKind::Sup => match &q.cst.inf {
                Some(lo) if layout.strict => {
                    let mut row = linear_row(&layout, false, &q.terms, lo);
                    row[EPS] = -BigInt::one();
                    holds(row)
                }
                // closed polyhedron: the minimum is attained
                Some(lo) => {
                    let itv = view.bound_quasi(&q.terms, &Interval::point(lo.clone()));
                    matches!(itv.inf, Some(m) if m.is_positive())
                }
                None => false,
            },
            ConsKind::Eq => match (q.cst.is_point(), &q.cst.inf) {
                (true, Some(v)) => holds(linear_row(&layout, true, &q.terms, v)),
                _ => false,
            },
            ConsKind::Diseq => {
                let zero = BigRational::zero();
                let itv = view.bound_quasi(&q.terms, &q.cst);
                let inside = itv.inf.as_ref().map_or(true, |lo| *lo < zero)
                    && itv.sup.as_ref().map_or(true, |hi| *hi > zero);
                if !itv.contains_value(&zero) {
                    true
                } else if !layout.strict || itv.is_point() || inside {
                    // some point of the polyhedron reaches 0
                    false
                } else {
                    // 0 is an end of the closure's range: it is reached iff
                    // the strict inequality towards the inside fails
                    let Some(c) = q.cst.is_point().then(|| q.cst.inf.clone()).flatten() else {
                        return Ok(Tbool::Top);
                    };
                    let below = itv.sup.as_ref() == Some(&zero);
                    let (terms, c): (Vec<(usize, BigRational)>, BigRational) = if below {
                        (q.terms.iter().map(|(d, a)| (*d, -a)).collect(), -c)
                    } else {
                        (q.terms.clone(), c)
                    };
                    let mut row = linear_row(&layout, false, &terms, &c);
                    row[EPS] = -BigInt::one();
                    holds(row)
                }
            }
            ConsKind::EqMod(_) => return Ok(Tbool::Top),
        };
        Ok(match (answer, q.exact) {
            (true, _) => Tbool::True,
            (false, true) => Tbool::False,
            (false, false) => Tbool::Top,
        })
    }

    /// The projection on `dim` lies in `itv`.
    pub fn sat_interval(&self, dom: &Domain, dim: usize, itv: &Interval) -> Result<Tbool, PolyError> {
        self.check_dim(dim)?;
        let r = self
            .dimension_bound(dom, dim)
            .map(|b| itv.contains(&b));
        tri("sat_interval", r)
    }

    /// No constraint of the minimal system mentions `dim`.
    pub fn is_dimension_unconstrained(&self, dom: &Domain, dim: usize) -> Result<Tbool, PolyError> {
        self.check_dim(dim)?;
        let col = self.layout.col(dim);
        let r = self.minimal_view(dom).map(|v| match v.rep(Side::Constraints) {
            None => false,
            Some(c) => c.iter().all(|r| r[col].is_zero()),
        });
        tri("is_dimension_unconstrained", r)
    }

    /// Range of `expr` over the polyhedron (over its closure in strict mode).
    pub fn bound_linexpr(&self, dom: &Domain, expr: &LinExpr) -> Result<Outcome<Interval>, PolyError> {
        if let Some(d) = expr.max_dim() {
            self.check_dim(d)?;
        }
        recover("bound_linexpr", self.bound_linexpr_raw(dom, expr), || {
            Outcome::degraded(Interval::top())
        })
    }

    fn bound_linexpr_raw(&self, dom: &Domain, expr: &LinExpr) -> Result<Outcome<Interval>, PolyError> {
        let view = self.view(dom, Side::Generators)?;
        if view.is_empty_repr() {
            return Ok(Outcome::exact(Interval::bottom()));
        }
        let bounds = if expr.is_quasilinear() {
            Vec::new()
        } else {
            view.dimension_bounds(dom)?
        };
        let q = expr.quasilinearize(|d| bounds.get(d).cloned().unwrap_or_else(Interval::top));
        let itv = view.bound_quasi(&q.terms, &q.cst);
        Ok(self.flags(q.exact).map(|_| itv))
    }

    pub fn bound_dimension(&self, dom: &Domain, dim: usize) -> Result<Outcome<Interval>, PolyError> {
        self.check_dim(dim)?;
        self.bound_linexpr(dom, &LinExpr::from_ints(&[(dim, 1)], 0))
    }

    /// Minimal constraint system; bottom is the single constraint `-1 ≥ 0`.
    pub fn to_constraints(&self, dom: &Domain) -> Result<Vec<LinCons>, PolyError> {
        let layout = self.layout;
        let r = self.minimal_view(dom).map(|v| match v.rep(Side::Constraints) {
            None => vec![LinCons::ge(LinExpr::constant(rat(-1)))],
            Some(c) => c
                .iter()
                .filter(|r| !layout.is_positivity(r))
                .map(|r| row_to_cons(&layout, r))
                .collect(),
        });
        recover("to_constraints", r, Vec::new)
    }

    /// Minimal generator system of the closure; empty for bottom.
    pub fn to_generators(&self, dom: &Domain) -> Result<Vec<LinGen>, PolyError> {
        let layout = self.layout;
        recover("to_generators", self.to_generators_raw(dom), || {
            let top = Polyhedron::top_of(layout);
            top.generators()
                .map(|g| g.iter().filter_map(|r| row_to_gen(&layout, r)).collect())
                .unwrap_or_default()
        })
    }

    fn to_generators_raw(&self, dom: &Domain) -> Result<Vec<LinGen>, PolyError> {
        let layout = self.layout;
        let closed;
        let source = if layout.strict {
            closed = self.closure(dom)?.value;
            &closed
        } else {
            self
        };
        let view = source.minimal_view(dom)?;
        let mut out: Vec<LinGen> = Vec::new();
        if let Some(g) = view.rep(Side::Generators) {
            for lg in g.iter().filter_map(|r| row_to_gen(&layout, r)) {
                if !out.contains(&lg) {
                    out.push(lg);
                }
            }
        }
        Ok(out)
    }

    /// Smallest enclosing box; every interval is empty for bottom.
    pub fn to_box(&self, dom: &Domain) -> Result<Outcome<Vec<Interval>>, PolyError> {
        let r = self.dimension_bounds(dom).map(|b| self.flags(true).map(|_| b));
        recover("to_box", r, || {
            Outcome::degraded(vec![Interval::top(); self.dims()])
        })
    }

    fn dimension_bound(&self, dom: &Domain, dim: usize) -> Result<Interval, PolyError> {
        let view = self.view(dom, Side::Generators)?;
        if view.is_empty_repr() {
            return Ok(Interval::bottom());
        }
        Ok(view.bound_quasi(&[(dim, BigRational::from_integer(1.into()))], &Interval::point(BigRational::zero())))
    }

    /// Bounds of every dimension, from the generators.
    pub(crate) fn dimension_bounds(&self, dom: &Domain) -> Result<Vec<Interval>, PolyError> {
        let view = self.view(dom, Side::Generators)?;
        if view.is_empty_repr() {
            return Ok(vec![Interval::bottom(); self.dims()]);
        }
        let one = BigRational::from_integer(1.into());
        let zero = Interval::point(BigRational::zero());
        Ok((0..self.dims())
            .map(|d| view.bound_quasi(&[(d, one.clone())], &zero))
            .collect())
    }

    /// Range of `terms + cst` over the generators; requires them present.
    fn bound_quasi(&self, terms: &[(usize, BigRational)], cst: &Interval) -> Interval {
        let layout = self.layout;
        let Some(gens) = self.rep(Side::Generators) else {
            return Interval::bottom();
        };
        let f = linear_row(&layout, false, terms, &BigRational::zero());
        let (mut lo, mut hi): (Option<BigRational>, Option<BigRational>) = (None, None);
        let (mut lo_inf, mut hi_inf) = (false, false);
        for g in gens {
            let v = dot(&f, g);
            if is_equality(g) {
                if !v.is_zero() {
                    lo_inf = true;
                    hi_inf = true;
                }
            } else if g[XI].is_zero() {
                if v.is_positive() {
                    hi_inf = true;
                } else if v.is_negative() {
                    lo_inf = true;
                }
            } else {
                let q = BigRational::new(v, g[XI].clone());
                if lo.as_ref().map_or(true, |m| q < *m) {
                    lo = Some(q.clone());
                }
                if hi.as_ref().map_or(true, |m| q > *m) {
                    hi = Some(q);
                }
            }
        }
        // `linear_row` divided `f` by a positive factor; undo it on the values.
        let scale = row_scale(terms, &f, &layout);
        let inf = if lo_inf { None } else { lo.map(|q| q / &scale) };
        let sup = if hi_inf { None } else { hi.map(|q| q / &scale) };
        Interval::new(inf, sup).add(cst)
    }
}

/// Positive factor `k` with `f = k · terms` as produced by `linear_row`;
/// `terms` holds one non-zero entry per dimension.
fn row_scale(terms: &[(usize, BigRational)], f: &Row, layout: &Layout) -> BigRational {
    terms
        .iter()
        .find(|(_, q)| !q.is_zero())
        .map(|(d, q)| BigRational::from_integer(f[layout.col(*d)].clone()) / q)
        .unwrap_or_else(|| BigRational::from_integer(1.into()))
}

