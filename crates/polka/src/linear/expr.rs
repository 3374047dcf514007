//! Interval-linear expressions handed in by the linearizer.

use std::collections::BTreeMap;
use std::fmt;

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::interval::Interval;
use crate::num::rat;

/// Coefficient of an interval-linear expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Coeff {
    Scalar(BigRational),
    Interval(Interval),
}

impl Coeff {
    #[inline]
    pub fn int(n: i64) -> Self {
        Coeff::Scalar(rat(n))
    }

    #[inline]
    pub fn zero() -> Self {
        Coeff::Scalar(BigRational::zero())
    }

    /// Singleton intervals count as scalars.
    pub fn as_scalar(&self) -> Option<BigRational> {
        match self {
            Coeff::Scalar(q) => Some(q.clone()),
            Coeff::Interval(i) if i.is_point() => i.inf.clone(),
            Coeff::Interval(_) => None,
        }
    }

    pub fn to_interval(&self) -> Interval {
        match self {
            Coeff::Scalar(q) => Interval::point(q.clone()),
            Coeff::Interval(i) => i.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.as_scalar(), Some(q) if q.is_zero())
    }
}

impl From<BigRational> for Coeff {
    fn from(q: BigRational) -> Self {
        Coeff::Scalar(q)
    }
}

impl From<Interval> for Coeff {
    fn from(i: Interval) -> Self {
        Coeff::Interval(i)
    }
}

/// Sparse expression `Σ coeff_i · x_i + cst`.
///
/// Invariants:
/// - Terms are sorted by dimension and a dimension occurs at most once
///   (the builder merges repeated dimensions).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinExpr {
    pub terms: Vec<(usize, Coeff)>,
    pub cst: Coeff,
}

impl Default for LinExpr {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            cst: Coeff::zero(),
        }
    }
}

/// Linear expression after quasi-linearization: scalar terms, interval constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuasiLinExpr {
    pub terms: Vec<(usize, BigRational)>,
    pub cst: Interval,
    /// False when an interval coefficient was folded into the constant.
    pub exact: bool,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(c: BigRational) -> Self {
        Self {
            terms: Vec::new(),
            cst: Coeff::Scalar(c),
        }
    }

    /// Build from integer coefficients, e.g. `from_ints(&[(0, 1), (1, -2)], 3)` is `x0 - 2x1 + 3`.
    pub fn from_ints(terms: &[(usize, i64)], cst: i64) -> Self {
        let mut e = Self::constant(rat(cst));
        for &(d, c) in terms {
            e = e.with(d, Coeff::int(c));
        }
        e
    }

    /// Add `coeff · x_dim`, merging with an existing term on the same dimension.
    pub fn with(mut self, dim: usize, coeff: Coeff) -> Self {
        match self.terms.binary_search_by_key(&dim, |(d, _)| *d) {
            Ok(pos) => {
                let merged = add_coeffs(&self.terms[pos].1, &coeff);
                self.terms[pos].1 = merged;
            }
            Err(pos) => self.terms.insert(pos, (dim, coeff)),
        }
        self
    }

    pub fn with_cst(mut self, cst: Coeff) -> Self {
        self.cst = cst;
        self
    }

    pub fn coeff(&self, dim: usize) -> Option<&Coeff> {
        self.terms
            .binary_search_by_key(&dim, |(d, _)| *d)
            .ok()
            .map(|pos| &self.terms[pos].1)
    }

    /// Every coefficient, constant included, is a scalar.
    pub fn is_linear(&self) -> bool {
        self.cst.as_scalar().is_some() && self.is_quasilinear()
    }

    /// Every dimension coefficient is a scalar (the constant may be an interval).
    pub fn is_quasilinear(&self) -> bool {
        self.terms.iter().all(|(_, c)| c.as_scalar().is_some())
    }

    /// Largest dimension mentioned with a non-zero coefficient.
    pub fn max_dim(&self) -> Option<usize> {
        self.terms
            .iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(d, _)| *d)
            .max()
    }

    pub fn neg(&self) -> LinExpr {
        LinExpr {
            terms: self
                .terms
                .iter()
                .map(|(d, c)| (*d, neg_coeff(c)))
                .collect(),
            cst: neg_coeff(&self.cst),
        }
    }

    /// Replace interval coefficients on dimensions by a scalar and bound the
    /// remainder with `bounds(dim)`; the remainder is folded into the constant.
    /// Terms come out sorted by dimension, one per dimension, none zero.
    pub fn quasilinearize(&self, bounds: impl Fn(usize) -> Interval) -> QuasiLinExpr {
        let mut cst = self.cst.to_interval();
        let mut exact = self.cst.as_scalar().is_some();
        let mut merged: BTreeMap<usize, BigRational> = BTreeMap::new();
        for (d, c) in &self.terms {
            let q = match c.as_scalar() {
                Some(q) => q,
                None => {
                    exact = false;
                    let itv = c.to_interval();
                    let q = itv.pick_scalar();
                    let rest = itv.add(&Interval::point(-q.clone()));
                    cst = cst.add(&rest.mul(&bounds(*d)));
                    q
                }
            };
            *merged.entry(*d).or_insert_with(BigRational::zero) += q;
        }
        let terms = merged.into_iter().filter(|(_, q)| !q.is_zero()).collect();
        QuasiLinExpr { terms, cst, exact }
    }
}

impl QuasiLinExpr {
    pub fn from_linear(terms: Vec<(usize, BigRational)>, cst: BigRational) -> Self {
        Self {
            terms,
            cst: Interval::point(cst),
            exact: true,
        }
    }

    /// Evaluate the scalar part over a box, then add the constant interval.
    pub fn eval_on_box(&self, bounds: impl Fn(usize) -> Interval) -> Interval {
        let mut acc = self.cst.clone();
        for (d, q) in &self.terms {
            acc = acc.add(&bounds(*d).scale(q));
        }
        acc
    }
}

fn add_coeffs(a: &Coeff, b: &Coeff) -> Coeff {
    match (a.as_scalar(), b.as_scalar()) {
        (Some(x), Some(y)) => Coeff::Scalar(x + y),
        _ => Coeff::Interval(a.to_interval().add(&b.to_interval())),
    }
}

fn neg_coeff(c: &Coeff) -> Coeff {
    match c {
        Coeff::Scalar(q) => Coeff::Scalar(-q),
        Coeff::Interval(i) => Coeff::Interval(i.neg()),
    }
}

/// Writes `2x0 - x1 + 3` style expressions; used by every Display impl here.
pub(crate) fn write_terms(
    f: &mut fmt::Formatter<'_>,
    terms: &[(usize, BigRational)],
    cst: Option<&BigRational>,
) -> fmt::Result {
    let mut first = true;
    for (d, q) in terms {
        if q.is_zero() {
            continue;
        }
        let mag = q.abs();
        if first {
            if q.is_negative() {
                f.write_str("-")?;
            }
        } else if q.is_negative() {
            f.write_str(" - ")?;
        } else {
            f.write_str(" + ")?;
        }
        if mag.is_one() {
            write!(f, "x{d}")?;
        } else {
            write!(f, "{mag}x{d}")?;
        }
        first = false;
    }
    match cst {
        Some(c) if !c.is_zero() || first => {
            if first {
                write!(f, "{c}")
            } else if c.is_negative() {
                write!(f, " - {}", c.abs())
            } else {
                write!(f, " + {c}")
            }
        }
        _ => Ok(()),
    }
}

impl fmt::Display for LinExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_linear() {
            let terms: Vec<(usize, BigRational)> = self
                .terms
                .iter()
                .filter_map(|(d, c)| c.as_scalar().map(|q| (*d, q)))
                .collect();
            let cst = self.cst.as_scalar();
            return write_terms(f, &terms, cst.as_ref());
        }
        let mut first = true;
        for (d, c) in &self.terms {
            if !first {
                f.write_str(" + ")?;
            }
            match c {
                Coeff::Scalar(q) => write!(f, "{q}x{d}")?,
                Coeff::Interval(i) => write!(f, "{i}x{d}")?,
            }
            first = false;
        }
        if !first {
            f.write_str(" + ")?;
        }
        match &self.cst {
            Coeff::Scalar(q) => write!(f, "{q}"),
            Coeff::Interval(i) => write!(f, "{i}"),
        }
    }
}
