//! Curated surface for the command-line front end and experiments.
//!
//! Important
//! - Prefer these re-exports over reaching into submodules; internal paths
//!   move when the layers are refactored.

// Domain values and context
pub use crate::cfg::{Budget, PolyCfg};
pub use crate::domain::Domain;
pub use crate::error::PolyError;
pub use crate::outcome::{Outcome, Tbool};
pub use crate::poly::{DimChange, Polyhedron, Side, StatusFlags};
// Exchange types
pub use crate::linear::{Coeff, ConsKind, GenKind, Interval, LinCons, LinExpr, LinGen, QuasiLinExpr};
// Conversion engine
pub use crate::engine::{Chernikova, Conversion, ConversionEngine};
// Reproducible random polyhedra
pub use crate::random::{
    box_cut_constraints, draw_box_cut, draw_vertex_cloud, increasing_chain, vertex_cloud,
    BoxCutCfg, ReplayToken, VertexCloudCfg,
};
