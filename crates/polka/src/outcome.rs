//! Precision flags reported alongside every produced value.
//!
//! `exact`: the value is the mathematically precise result.
//! `best`: the value is the best one representable in the domain.

use std::fmt;

/// Three-valued boolean; `Top` means "unknown".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tbool {
    False,
    True,
    Top,
}

impl Tbool {
    #[inline]
    pub fn of_bool(b: bool) -> Self {
        if b {
            Tbool::True
        } else {
            Tbool::False
        }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        self == Tbool::True
    }

    /// Conjunction (`False` absorbs, then `Top`).
    pub fn and(self, other: Tbool) -> Tbool {
        match (self, other) {
            (Tbool::False, _) | (_, Tbool::False) => Tbool::False,
            (Tbool::True, Tbool::True) => Tbool::True,
            _ => Tbool::Top,
        }
    }
}

impl From<bool> for Tbool {
    fn from(b: bool) -> Self {
        Tbool::of_bool(b)
    }
}

impl fmt::Display for Tbool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tbool::False => "false",
            Tbool::True => "true",
            Tbool::Top => "top",
        };
        f.write_str(s)
    }
}

/// A produced value together with its precision flags.
#[derive(Clone, Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub exact: Tbool,
    pub best: Tbool,
}

impl<T> Outcome<T> {
    #[inline]
    pub fn exact(value: T) -> Self {
        Self {
            value,
            exact: Tbool::True,
            best: Tbool::True,
        }
    }

    /// Over-approximation of unknown quality.
    #[inline]
    pub fn approx(value: T) -> Self {
        Self {
            value,
            exact: Tbool::Top,
            best: Tbool::Top,
        }
    }

    /// Result of a recovered resource failure.
    #[inline]
    pub fn degraded(value: T) -> Self {
        Self {
            value,
            exact: Tbool::False,
            best: Tbool::False,
        }
    }

    #[inline]
    pub fn with_flags(value: T, exact: Tbool, best: Tbool) -> Self {
        Self { value, exact, best }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            exact: self.exact,
            best: self.best,
        }
    }

    /// Combine flags of a follow-up step into this outcome.
    pub fn and_flags<U>(self, other: &Outcome<U>) -> Self {
        Self {
            value: self.value,
            exact: self.exact.and(other.exact),
            best: self.best.and(other.best),
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tbool_conjunction() {
        assert_eq!(Tbool::True.and(Tbool::True), Tbool::True);
        assert_eq!(Tbool::True.and(Tbool::Top), Tbool::Top);
        assert_eq!(Tbool::Top.and(Tbool::False), Tbool::False);
    }

    #[test]
    fn outcome_flag_merge() {
        let a = Outcome::exact(1);
        let b = Outcome::approx(());
        let c = a.and_flags(&b).map(|v| v + 1);
        assert_eq!(c.value, 2);
        assert_eq!(c.exact, Tbool::Top);
        assert_eq!(Outcome::degraded(()).best, Tbool::False);
    }
}
