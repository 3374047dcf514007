//! Double-description conversion between constraint and generator systems.
//!
//! Purpose
//! - Given one representation of a polyhedral cone (the "primal" rows),
//!   compute the minimal dual representation and the saturation relation.
//! - The same code serves both directions: constraints → generators and
//!   generators → constraints. Equalities and lines are the rows with
//!   marker 0 on either side.
//!
//! Why this design (short)
//! - `ConversionEngine` is a trait so a `Domain` can plug in another
//!   algorithm; `Chernikova` is the default.
//! - Conversion output is returned by value and only committed by the caller
//!   on success; a resource error leaves the caller's polyhedron untouched.
//!
//! Assumptions and conventions
//! - `Conversion::sat` has one row per dual row and one column per primal row.
//! - Dual rows are ordered lines first, then rays; `dual_lines` counts the lines.

mod chernikova;
mod simplify;

pub use chernikova::Chernikova;
pub use simplify::{gauss, simplify, sort_dual, sort_primal};

use std::fmt::Debug;

use crate::cfg::Budget;
use crate::error::PolyError;
use crate::matrix::{Layout, Matrix, SatMatrix};

/// Minimal dual system of some primal rows, with saturation.
#[derive(Clone, Debug)]
pub struct Conversion {
    pub dual: Matrix,
    pub sat: SatMatrix,
    pub dual_lines: usize,
}

/// A double-description algorithm.
pub trait ConversionEngine: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Convert all `primal` rows from scratch.
    fn convert(
        &self,
        layout: &Layout,
        primal: &Matrix,
        budget: &Budget,
    ) -> Result<Conversion, PolyError>;

    /// Incremental form: `prev` is the minimal dual of `primal[..start]`.
    /// Rows `start..` are added and the dual is updated.
    fn extend(
        &self,
        layout: &Layout,
        primal: &Matrix,
        start: usize,
        prev: Conversion,
        budget: &Budget,
    ) -> Result<Conversion, PolyError>;
}

#[cfg(test)]
mod tests;
