//! Exact-arithmetic helpers over `num` big integers and rationals.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};

/// Rational from an integer.
#[inline]
pub fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Rational `n/d`; `d` must be non-zero.
#[inline]
pub fn frac(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

/// Gcd of all entries (0 if all are zero).
pub(crate) fn gcd_all<'a>(items: impl IntoIterator<Item = &'a BigInt>) -> BigInt {
    let mut g = BigInt::zero();
    for x in items {
        if x.is_zero() {
            continue;
        }
        g = g.gcd(x);
        if g.is_one() {
            break;
        }
    }
    g
}

/// Least common multiple of the denominators (1 for an empty input).
pub(crate) fn lcm_denoms<'a>(items: impl IntoIterator<Item = &'a BigRational>) -> BigInt {
    let mut l = BigInt::one();
    for q in items {
        l = l.lcm(q.denom());
    }
    l
}

/// `q * scale` where `scale` is a multiple of `q.denom()`.
#[inline]
pub(crate) fn scaled_numer(q: &BigRational, scale: &BigInt) -> BigInt {
    q.numer() * (scale / q.denom())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_and_lcm() {
        let xs = [BigInt::from(12), BigInt::from(0), BigInt::from(-18)];
        assert_eq!(gcd_all(xs.iter()), BigInt::from(6));
        let zeros = [BigInt::from(0)];
        assert!(gcd_all(zeros.iter()).is_zero());
        let qs = [frac(1, 4), frac(5, 6), rat(3)];
        assert_eq!(lcm_denoms(qs.iter()), BigInt::from(12));
        assert_eq!(scaled_numer(&frac(5, 6), &BigInt::from(12)), BigInt::from(10));
    }
}
