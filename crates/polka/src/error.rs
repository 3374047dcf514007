//! Error type shared by the matrix layer, the conversion engine and the domain.
//!
//! Policy
//! - `InvalidArgument` and `NotImplemented` surface to callers.
//! - `OutOfSpace`, `Overflow` and `Timeout` are resource errors raised by the
//!   conversion engine. Polyhedron operations recover from them locally by
//!   returning `top` with cleared exactness flags (see `Polyhedron::guarded`).

use std::fmt;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PolyError {
    InvalidArgument { reason: String },
    OutOfSpace { rows: usize, limit: usize },
    Overflow { bits: u64, limit: u64 },
    Timeout { elapsed: Duration },
    NotImplemented { what: String },
}

impl PolyError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_implemented(what: impl Into<String>) -> Self {
        Self::NotImplemented { what: what.into() }
    }

    /// Resource errors are recoverable by over-approximation.
    pub fn is_resource(&self) -> bool {
        matches!(
            self,
            Self::OutOfSpace { .. } | Self::Overflow { .. } | Self::Timeout { .. }
        )
    }
}

impl fmt::Display for PolyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::OutOfSpace { rows, limit } => {
                write!(f, "out of space: {rows} rows exceed the limit of {limit}")
            }
            Self::Overflow { bits, limit } => {
                write!(f, "coefficient overflow: {bits} bits exceed the limit of {limit}")
            }
            Self::Timeout { elapsed } => write!(f, "timeout after {elapsed:?}"),
            Self::NotImplemented { what } => write!(f, "not implemented: {what}"),
        }
    }
}

impl std::error::Error for PolyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_classification() {
        assert!(PolyError::Timeout {
            elapsed: Duration::from_millis(3)
        }
        .is_resource());
        assert!(PolyError::Overflow { bits: 9, limit: 8 }.is_resource());
        assert!(!PolyError::invalid("dims").is_resource());
        assert!(!PolyError::not_implemented("raymod").is_resource());
    }

    #[test]
    fn display_mentions_limits() {
        let e = PolyError::OutOfSpace {
            rows: 12,
            limit: 10,
        };
        assert_eq!(e.to_string(), "out of space: 12 rows exceed the limit of 10");
    }
}
