//! Rational intervals with optional infinite bounds.

use std::cmp::Ordering;
use std::fmt;

use num_rational::BigRational;
use num_traits::{Signed, Zero};

/// Closed interval `[inf, sup]`; `None` stands for -∞ / +∞ respectively.
///
/// Invariants:
/// - An interval with `inf > sup` is empty (`is_bottom`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Interval {
    pub inf: Option<BigRational>,
    pub sup: Option<BigRational>,
}

/// Extended rational used for endpoint products.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Ext {
    NegInf,
    Fin(BigRational),
    PosInf,
}

impl Ext {
    fn mul(&self, other: &Ext) -> Ext {
        match (self, other) {
            (Ext::Fin(a), Ext::Fin(b)) => Ext::Fin(a * b),
            // 0 * inf = 0 keeps products of bounded zero coefficients finite.
            (Ext::Fin(a), _) | (_, Ext::Fin(a)) if a.is_zero() => Ext::Fin(BigRational::zero()),
            (Ext::Fin(a), inf) | (inf, Ext::Fin(a)) => {
                let pos = matches!(inf, Ext::PosInf) == a.is_positive();
                if pos {
                    Ext::PosInf
                } else {
                    Ext::NegInf
                }
            }
            (Ext::PosInf, Ext::PosInf) | (Ext::NegInf, Ext::NegInf) => Ext::PosInf,
            _ => Ext::NegInf,
        }
    }

    fn rank(&self) -> i8 {
        match self {
            Ext::NegInf => -1,
            Ext::Fin(_) => 0,
            Ext::PosInf => 1,
        }
    }
}

impl PartialOrd for Ext {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ext {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Ext::Fin(a), Ext::Fin(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Interval {
    #[inline]
    pub fn new(inf: Option<BigRational>, sup: Option<BigRational>) -> Self {
        Self { inf, sup }
    }

    #[inline]
    pub fn top() -> Self {
        Self {
            inf: None,
            sup: None,
        }
    }

    #[inline]
    pub fn point(q: BigRational) -> Self {
        Self {
            inf: Some(q.clone()),
            sup: Some(q),
        }
    }

    #[inline]
    pub fn closed(inf: BigRational, sup: BigRational) -> Self {
        Self {
            inf: Some(inf),
            sup: Some(sup),
        }
    }

    /// Canonical empty interval `[1, 0]`.
    pub fn bottom() -> Self {
        Self {
            inf: Some(BigRational::from_integer(1.into())),
            sup: Some(BigRational::zero()),
        }
    }

    pub fn is_top(&self) -> bool {
        self.inf.is_none() && self.sup.is_none()
    }

    pub fn is_bottom(&self) -> bool {
        matches!((&self.inf, &self.sup), (Some(a), Some(b)) if a > b)
    }

    pub fn is_point(&self) -> bool {
        matches!((&self.inf, &self.sup), (Some(a), Some(b)) if a == b)
    }

    pub fn is_bounded(&self) -> bool {
        self.inf.is_some() && self.sup.is_some()
    }

    pub fn contains_value(&self, q: &BigRational) -> bool {
        self.inf.as_ref().map_or(true, |a| a <= q) && self.sup.as_ref().map_or(true, |b| q <= b)
    }

    /// `self ⊇ other`.
    pub fn contains(&self, other: &Interval) -> bool {
        if other.is_bottom() {
            return true;
        }
        let lo_ok = match (&self.inf, &other.inf) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a <= b,
        };
        let hi_ok = match (&self.sup, &other.sup) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => b <= a,
        };
        lo_ok && hi_ok
    }

    pub fn neg(&self) -> Interval {
        Interval {
            inf: self.sup.as_ref().map(|b| -b),
            sup: self.inf.as_ref().map(|a| -a),
        }
    }

    pub fn add(&self, other: &Interval) -> Interval {
        let add = |a: &Option<BigRational>, b: &Option<BigRational>| match (a, b) {
            (Some(x), Some(y)) => Some(x + y),
            _ => None,
        };
        Interval {
            inf: add(&self.inf, &other.inf),
            sup: add(&self.sup, &other.sup),
        }
    }

    pub fn scale(&self, q: &BigRational) -> Interval {
        if q.is_zero() {
            return Interval::point(BigRational::zero());
        }
        let inf = self.inf.as_ref().map(|a| a * q);
        let sup = self.sup.as_ref().map(|b| b * q);
        if q.is_negative() {
            Interval { inf: sup, sup: inf }
        } else {
            Interval { inf, sup }
        }
    }

    pub fn mul(&self, other: &Interval) -> Interval {
        let lo = |b: &Option<BigRational>| b.clone().map_or(Ext::NegInf, Ext::Fin);
        let hi = |b: &Option<BigRational>| b.clone().map_or(Ext::PosInf, Ext::Fin);
        let xs = [lo(&self.inf), hi(&self.sup)];
        let ys = [lo(&other.inf), hi(&other.sup)];
        let prods: Vec<Ext> = xs
            .iter()
            .flat_map(|x| ys.iter().map(move |y| x.mul(y)))
            .collect();
        let min = prods.iter().min().cloned().unwrap_or(Ext::NegInf);
        let max = prods.iter().max().cloned().unwrap_or(Ext::PosInf);
        Interval {
            inf: match min {
                Ext::Fin(q) => Some(q),
                _ => None,
            },
            sup: match max {
                Ext::Fin(q) => Some(q),
                _ => None,
            },
        }
    }

    /// Convex hull of both intervals.
    pub fn join(&self, other: &Interval) -> Interval {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        let inf = match (&self.inf, &other.inf) {
            (Some(a), Some(b)) => Some(a.min(b).clone()),
            _ => None,
        };
        let sup = match (&self.sup, &other.sup) {
            (Some(a), Some(b)) => Some(a.max(b).clone()),
            _ => None,
        };
        Interval { inf, sup }
    }

    /// A representative scalar: the midpoint, a finite bound, or zero.
    pub fn pick_scalar(&self) -> BigRational {
        match (&self.inf, &self.sup) {
            (Some(a), Some(b)) => (a + b) / BigRational::from_integer(2.into()),
            (Some(a), None) => a.clone(),
            (None, Some(b)) => b.clone(),
            (None, None) => BigRational::zero(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_point() {
            if let Some(a) = &self.inf {
                return write!(f, "{a}");
            }
        }
        match &self.inf {
            Some(a) => write!(f, "[{a},")?,
            None => write!(f, "]-oo,")?,
        }
        match &self.sup {
            Some(b) => write!(f, "{b}]"),
            None => write!(f, "+oo["),
        }
    }
}
