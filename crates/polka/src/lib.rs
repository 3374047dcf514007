//! Convex polyhedra abstract domain with a lazily maintained double
//! description (constraints and generators), over exact integers.
//!
//! Layers, bottom up
//! - `matrix`: homogeneous `BigInt` rows, row matrices and saturation bits.
//! - `engine`: Chernikova's conversion between the two descriptions.
//! - `poly`: the `Polyhedron` value and its operations, all taking a `Domain`.
//! - `linear`: exchange types with the linearizer (interval-linear
//!   constraints, expressions, generators).
//!
//! API Policy
//! - Operations come in an in-place form (`*_in_place`) and a borrowing form.
//! - Every produced value carries `exact`/`best` flags (`Outcome`).

pub mod api;
pub mod cfg;
pub mod domain;
pub mod engine;
pub mod error;
pub mod linear;
pub mod matrix;
pub mod num;
pub mod outcome;
pub mod poly;
pub mod random;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::PolyCfg;
pub use domain::Domain;
pub use error::PolyError;
pub use outcome::{Outcome, Tbool};
pub use poly::{DimChange, Polyhedron};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::linear::{Coeff, ConsKind, GenKind, Interval, LinCons, LinExpr, LinGen};
    pub use crate::num::{frac, rat};
    pub use crate::{DimChange, Domain, Outcome, PolyCfg, PolyError, Polyhedron, Tbool};
}
