//! Domain configuration and per-operation resource budgets.
//!
//! Policy
//! - Defaults are fixed constants; callers override fields on a copy of
//!   `PolyCfg::default()` and hand it to `Domain::new`.
//! - A `Budget` is created per operation. The conversion engine consults it
//!   after every processed row; exceeding a bound is a resource error.

use std::time::{Duration, Instant};

use crate::error::PolyError;

/// Default bound on the number of rows a conversion may hold.
pub(crate) const MAX_ROWS: usize = 50_000;
/// Default bound on the bit size of a single coefficient.
pub(crate) const MAX_COEFF_BITS: u64 = 4096;
/// Default coefficient width above which `approximate(1)` drops a constraint.
pub(crate) const APPROX_COEFF_BITS: u64 = 64;

/// Domain configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolyCfg {
    /// Carry the epsilon column so strict inequalities are represented exactly.
    pub strict: bool,
    pub max_rows: usize,
    pub max_coeff_bits: u64,
    pub timeout: Option<Duration>,
    pub approx_max_coeff_bits: u64,
}

impl Default for PolyCfg {
    fn default() -> Self {
        Self {
            strict: false,
            max_rows: MAX_ROWS,
            max_coeff_bits: MAX_COEFF_BITS,
            timeout: None,
            approx_max_coeff_bits: APPROX_COEFF_BITS,
        }
    }
}

impl PolyCfg {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Resource bounds for one operation.
#[derive(Clone, Debug)]
pub struct Budget {
    started: Instant,
    timeout: Option<Duration>,
    max_rows: usize,
    max_coeff_bits: u64,
}

impl Budget {
    pub fn new(cfg: &PolyCfg) -> Self {
        Self {
            started: Instant::now(),
            timeout: cfg.timeout,
            max_rows: cfg.max_rows,
            max_coeff_bits: cfg.max_coeff_bits,
        }
    }

    /// Unbounded budget for internal bookkeeping that cannot blow up.
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            timeout: None,
            max_rows: usize::MAX,
            max_coeff_bits: u64::MAX,
        }
    }

    #[inline]
    pub fn check_rows(&self, rows: usize) -> Result<(), PolyError> {
        if rows > self.max_rows {
            return Err(PolyError::OutOfSpace {
                rows,
                limit: self.max_rows,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn check_bits(&self, bits: u64) -> Result<(), PolyError> {
        if bits > self.max_coeff_bits {
            return Err(PolyError::Overflow {
                bits,
                limit: self.max_coeff_bits,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn check_time(&self) -> Result<(), PolyError> {
        if let Some(limit) = self.timeout {
            let elapsed = self.started.elapsed();
            if elapsed > limit {
                return Err(PolyError::Timeout { elapsed });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_bounds() {
        let cfg = PolyCfg {
            max_rows: 4,
            max_coeff_bits: 16,
            ..PolyCfg::default()
        };
        let b = Budget::new(&cfg);
        assert!(b.check_rows(4).is_ok());
        assert!(matches!(
            b.check_rows(5),
            Err(PolyError::OutOfSpace { rows: 5, limit: 4 })
        ));
        assert!(b.check_bits(16).is_ok());
        assert!(b.check_bits(17).is_err());
        assert!(b.check_time().is_ok());
    }

    #[test]
    fn zero_timeout_expires() {
        let cfg = PolyCfg {
            timeout: Some(Duration::ZERO),
            ..PolyCfg::default()
        };
        let b = Budget::new(&cfg);
        std::thread::sleep(Duration::from_millis(1));
        assert!(matches!(b.check_time(), Err(PolyError::Timeout { .. })));
    }
}
