//! Row encoding and per-row arithmetic.
//!
//! Layout of a row (width `dec + dims`)
//! - col 0: marker. Constraints: 0 = equality, 1 = inequality.
//!   Generators: 0 = line, 1 = ray or vertex.
//! - col 1: ξ. Constant term of a constraint; denominator of a vertex
//!   (0 for rays and lines).
//! - col 2: ε, present only in strict mode.
//! - cols `dec..`: one column per dimension, integer dimensions first.
//!
//! A constraint row `[m, b, e, a]` reads `b·ξ + e·ε + a·x ≥ 0` (`= 0` if `m = 0`).
//! Dot products never include the marker column.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::num::gcd_all;

/// Coefficients of one constraint or generator.
pub type Row = Vec<BigInt>;

pub const MARKER: usize = 0;
pub const XI: usize = 1;
pub const EPS: usize = 2;

/// Column layout shared by every matrix of one polyhedron.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    pub strict: bool,
    pub int_dims: usize,
    pub real_dims: usize,
}

impl Layout {
    #[inline]
    pub fn new(strict: bool, int_dims: usize, real_dims: usize) -> Self {
        Self {
            strict,
            int_dims,
            real_dims,
        }
    }

    /// Index of the first dimension column.
    #[inline]
    pub fn dec(&self) -> usize {
        if self.strict {
            3
        } else {
            2
        }
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.int_dims + self.real_dims
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dec() + self.dims()
    }

    /// Column of dimension `d`.
    #[inline]
    pub fn col(&self, d: usize) -> usize {
        self.dec() + d
    }

    #[inline]
    pub fn is_int(&self, d: usize) -> bool {
        d < self.int_dims
    }

    /// Dimension of the homogenized cone (row width without the marker).
    #[inline]
    pub fn cone_dim(&self) -> usize {
        self.width() - 1
    }

    pub fn zero_row(&self) -> Row {
        vec![BigInt::zero(); self.width()]
    }

    /// Rows that every constraint system handed to a conversion carries:
    /// `ξ ≥ 0`, or `ε ≥ 0` and `ξ - ε ≥ 0` in strict mode.
    pub fn positivity_rows(&self) -> Vec<Row> {
        if self.strict {
            let mut eps = self.zero_row();
            eps[MARKER] = BigInt::one();
            eps[EPS] = BigInt::one();
            let mut xi_eps = self.zero_row();
            xi_eps[MARKER] = BigInt::one();
            xi_eps[XI] = BigInt::one();
            xi_eps[EPS] = -BigInt::one();
            vec![eps, xi_eps]
        } else {
            let mut xi = self.zero_row();
            xi[MARKER] = BigInt::one();
            xi[XI] = BigInt::one();
            vec![xi]
        }
    }

    /// Row involves no dimension column (only ξ and ε).
    pub fn is_structural(&self, row: &Row) -> bool {
        row[self.dec()..].iter().all(Zero::is_zero)
    }

    /// Positivity row, up to a positive factor.
    pub fn is_positivity(&self, row: &Row) -> bool {
        if !row[MARKER].is_one() || !self.is_structural(row) {
            return false;
        }
        if self.strict {
            let (xi, eps) = (&row[XI], &row[EPS]);
            (xi.is_zero() && eps.is_positive()) || (xi.is_positive() && *eps == -xi)
        } else {
            row[XI].is_positive()
        }
    }

    /// Generator is a point of the polyhedron (vertex with ε > 0 in strict mode).
    pub fn is_point(&self, gen: &Row) -> bool {
        if self.strict {
            gen[EPS].is_positive()
        } else {
            gen[XI].is_positive()
        }
    }

    /// Negative ε coefficient on a row that constrains some dimension.
    pub fn is_strict_constraint(&self, row: &Row) -> bool {
        self.strict && row[EPS].is_negative() && !self.is_structural(row)
    }
}

#[inline]
pub fn is_equality(row: &Row) -> bool {
    row[MARKER].is_zero()
}

/// Lexicographic order on all columns (equalities and lines sort first).
pub fn compare(a: &Row, b: &Row) -> Ordering {
    debug_assert_eq!(a.len(), b.len());
    a.iter().cmp(b.iter())
}

/// Dot product over every column except the marker.
pub fn dot(a: &Row, b: &Row) -> BigInt {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .skip(1)
        .filter(|(x, y)| !x.is_zero() && !y.is_zero())
        .map(|(x, y)| x * y)
        .sum()
}

/// Dot product that ignores the ε column.
pub fn dot_without_eps(layout: &Layout, a: &Row, b: &Row) -> BigInt {
    let mut s = dot(a, b);
    if layout.strict {
        s -= &a[EPS] * &b[EPS];
    }
    s
}

pub fn is_zero_vector(row: &Row) -> bool {
    row.iter().skip(1).all(Zero::is_zero)
}

/// Largest coefficient bit size.
pub fn max_bits(row: &Row) -> u64 {
    row.iter().skip(1).map(|x| x.bits()).max().unwrap_or(0)
}

/// Divide every non-marker column by their gcd. Returns false for zero vectors.
pub fn normalize(row: &mut Row) -> bool {
    let g = gcd_all(row.iter().skip(1));
    if g.is_zero() {
        return false;
    }
    if !g.is_one() {
        for x in row.iter_mut().skip(1) {
            *x = &*x / &g;
        }
    }
    true
}

/// Canonical sign for equalities and lines: first non-zero coefficient positive.
pub fn normalize_sign(row: &mut Row) {
    if !is_equality(row) {
        return;
    }
    if let Some(first) = row.iter().skip(1).find(|x| !x.is_zero()) {
        if first.is_negative() {
            for x in row.iter_mut().skip(1) {
                *x = -&*x;
            }
        }
    }
}

/// `ca·a + cb·b` on the non-marker columns; the marker is taken from `a`.
pub fn lin_comb(ca: &BigInt, a: &Row, cb: &BigInt, b: &Row) -> Row {
    let mut out = Vec::with_capacity(a.len());
    out.push(a[MARKER].clone());
    for (x, y) in a.iter().zip(b.iter()).skip(1) {
        out.push(ca * x + cb * y);
    }
    out
}

/// Eliminate column `col` of `row` using `pivot`, which must have a non-zero
/// entry there. The multiplier of `row` is positive, so the direction of an
/// inequality or ray is kept; `pivot` must be an equality or a line.
pub fn eliminate(row: &mut Row, pivot: &Row, col: usize) {
    if row[col].is_zero() {
        return;
    }
    let p = &pivot[col];
    let g = row[col].gcd(p);
    let ca = (p / &g).abs();
    let cb = if p.is_positive() {
        -(&row[col] / &g)
    } else {
        &row[col] / &g
    };
    let out = lin_comb(&ca, row, &cb, pivot);
    *row = out;
    normalize(row);
}

/// Integer tightening of a constraint whose dimensions are all integer.
///
/// - `a·x + b ≥ 0` with `g = gcd(a)` becomes `(a/g)·x + ⌊b/g⌋ ≥ 0`.
/// - a strict `a·x + b > 0` (ε coefficient < 0) first becomes `a·x + b - 1 ≥ 0`.
/// - `a·x + b = 0` with `g ∤ b` becomes the contradiction `1 = 0`.
///
/// Returns true when the row changed.
pub fn tighten_integer(layout: &Layout, row: &mut Row) -> bool {
    let dec = layout.dec();
    if layout.is_structural(row) || (layout.strict && row[EPS].is_positive()) {
        return false;
    }
    let all_int = row[dec..]
        .iter()
        .enumerate()
        .all(|(d, x)| x.is_zero() || layout.is_int(d));
    if !all_int {
        return false;
    }
    let mut changed = false;
    if layout.strict && row[EPS].is_negative() && !is_equality(row) {
        row[EPS] = BigInt::zero();
        row[XI] -= BigInt::one();
        changed = true;
    }
    let g = gcd_all(row[dec..].iter());
    if g.is_one() {
        return changed;
    }
    if is_equality(row) {
        if !row[XI].is_multiple_of(&g) {
            for x in row.iter_mut().skip(1) {
                *x = BigInt::zero();
            }
            row[XI] = BigInt::one();
            return true;
        }
        for x in row.iter_mut().skip(1) {
            *x = &*x / &g;
        }
        return true;
    }
    row[XI] = row[XI].div_floor(&g);
    if layout.strict {
        row[EPS] = row[EPS].div_floor(&g);
    }
    for x in row[dec..].iter_mut() {
        *x = &*x / &g;
    }
    true
}

/// Epsilon normalization of a strict constraint: the ε coefficient becomes
/// `-gcd` of the other coefficients, then the row is divided by that gcd.
/// A strict row without dimensions collapses to `ξ - ε ≥ 0` when `b > 0`.
pub fn normalize_epsilon(layout: &Layout, row: &mut Row) -> bool {
    if !layout.strict || is_equality(row) || !row[EPS].is_negative() {
        return false;
    }
    let before = row.clone();
    if layout.is_structural(row) {
        if row[XI].is_positive() {
            row[XI] = BigInt::one();
            row[EPS] = -BigInt::one();
        }
        return *row != before;
    }
    let g = gcd_all(row.iter().skip(1).enumerate().filter(|(i, _)| *i + 1 != EPS).map(|(_, x)| x));
    row[EPS] = -g;
    normalize(row);
    *row != before
}
