//! Exchange types shared with the linearizer and the analyzer.
//!
//! Purpose
//! - Carry interval-linear constraints, expressions and generators over a
//!   fixed set of dimensions into and out of the polyhedra domain.
//! - Keep them independent of the internal row encoding (`crate::matrix`).
//!
//! Conventions
//! - Dimensions are numbered `0..int_dims+real_dims`; integer dimensions come first.
//! - A constraint reads `expr ⋈ 0`; e.g. `x0 <= 5` is `-x0 + 5 >= 0`.

mod cons;
mod expr;
mod interval;

pub use cons::{ConsKind, GenKind, LinCons, LinGen};
pub use expr::{Coeff, LinExpr, QuasiLinExpr};
pub use interval::Interval;

#[cfg(test)]
mod tests;
