//! Convex polyhedra with a lazily maintained double description.
//!
//! Purpose
//! - The domain value of the library: a polyhedron over `int_dims + real_dims`
//!   dimensions, kept as a constraint system, a generator system, or both.
//! - Operations are methods taking the `Domain` first. Each comes as an
//!   in-place form (`*_in_place`, exclusive receiver) and a borrowing form
//!   returning a fresh value.
//!
//! Why this design (short)
//! - Both systems are caches; either may be absent until an operation needs
//!   it (`ensure`). When both are present they are minimal and a saturation
//!   matrix links them.
//! - The two sides are addressed through `Side`, so meet and join, or
//!   assignment and substitution, run the same code on opposite sides.
//!
//! Assumptions and conventions
//! - Bottom ⟺ both systems absent.
//! - `sats[s]` has one row per row of the opposite side and one column per
//!   row of side `s`. At most one orientation is stored; the other is the
//!   transpose.
//! - In strict mode the homogenized cone is closed under lowering ε: every
//!   point is accompanied by its closure point. Under that invariant a
//!   constraint with negative ε coefficient reads `a·x + b > 0` and any other
//!   reads `a·x + b ≥ 0`.

mod assign;
mod import;
mod meetjoin;
mod query;
mod repr;
mod resize;
mod widen;

pub use resize::DimChange;

use std::fmt;
use std::ops::{Index, IndexMut};

use num_bigint::BigInt;
use num_traits::One;
use tracing::warn;

use crate::domain::Domain;
use crate::error::PolyError;
use crate::matrix::{Layout, Matrix, SatMatrix, EPS, MARKER, XI};
use crate::outcome::{Outcome, Tbool};

/// Which system of a polyhedron an operation treats as primal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Constraints,
    Generators,
}

impl Side {
    #[inline]
    pub fn dual(self) -> Side {
        match self {
            Side::Constraints => Side::Generators,
            Side::Generators => Side::Constraints,
        }
    }

    #[inline]
    fn idx(self) -> usize {
        match self {
            Side::Constraints => 0,
            Side::Generators => 1,
        }
    }
}

/// One value per side, indexed by `Side`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PerSide<T>([T; 2]);

impl<T> PerSide<T> {
    #[inline]
    pub(crate) fn new(constraints: T, generators: T) -> Self {
        PerSide([constraints, generators])
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T> Index<Side> for PerSide<T> {
    type Output = T;
    fn index(&self, s: Side) -> &T {
        &self.0[s.idx()]
    }
}

impl<T> IndexMut<Side> for PerSide<T> {
    fn index_mut(&mut self, s: Side) -> &mut T {
        &mut self.0[s.idx()]
    }
}

/// Which normal forms currently hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusFlags(u8);

impl StatusFlags {
    pub const C_EPS_NORMALIZED: StatusFlags = StatusFlags(1);
    pub const C_GAUSS: StatusFlags = StatusFlags(2);
    pub const G_GAUSS: StatusFlags = StatusFlags(4);
    pub const MINIMAL: StatusFlags = StatusFlags(8);

    #[inline]
    pub fn empty() -> Self {
        StatusFlags(0)
    }

    #[inline]
    pub fn contains(self, other: StatusFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: StatusFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: StatusFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    fn gauss(side: Side) -> StatusFlags {
        match side {
            Side::Constraints => Self::C_GAUSS,
            Side::Generators => Self::G_GAUSS,
        }
    }
}

/// A convex polyhedron over mixed integer/real dimensions.
#[derive(Clone, Debug)]
pub struct Polyhedron {
    layout: Layout,
    reps: PerSide<Option<Matrix>>,
    sats: PerSide<Option<SatMatrix>>,
    /// Equalities (constraint side) and lines (generator side); valid when minimal.
    nb_eq: PerSide<usize>,
    status: StatusFlags,
}

impl Polyhedron {
    pub fn bottom(dom: &Domain, int_dims: usize, real_dims: usize) -> Self {
        Self::bottom_of(dom.layout(int_dims, real_dims))
    }

    pub fn top(dom: &Domain, int_dims: usize, real_dims: usize) -> Self {
        Self::top_of(dom.layout(int_dims, real_dims))
    }

    pub(crate) fn bottom_of(layout: Layout) -> Self {
        Self {
            layout,
            reps: PerSide::new(None, None),
            sats: PerSide::new(None, None),
            nb_eq: PerSide::new(0, 0),
            status: StatusFlags::empty(),
        }
    }

    /// Universe: constraints are the positivity rows, generators one point at
    /// the origin (plus its closure point) and a line per dimension.
    pub(crate) fn top_of(layout: Layout) -> Self {
        let width = layout.width();
        let cons = Matrix::from_rows(width, layout.positivity_rows());
        let mut gens = Matrix::with_capacity(width, layout.dims() + 2);
        for d in 0..layout.dims() {
            let mut line = layout.zero_row();
            line[layout.col(d)] = BigInt::one();
            gens.push(line);
        }
        let mut origin = layout.zero_row();
        origin[MARKER] = BigInt::one();
        origin[XI] = BigInt::one();
        if layout.strict {
            gens.push(origin.clone());
            origin[EPS] = BigInt::one();
        }
        gens.push(origin);
        let sat = SatMatrix::compute(&gens, &cons);
        Self {
            layout,
            reps: PerSide::new(Some(cons), Some(gens)),
            sats: PerSide::new(Some(sat), None),
            nb_eq: PerSide::new(0, layout.dims()),
            status: StatusFlags::MINIMAL,
        }
    }

    /// Polyhedron holding only `rows` on `side`; not minimized.
    pub(crate) fn from_side(layout: Layout, side: Side, rows: Matrix) -> Self {
        let mut p = Self::bottom_of(layout);
        p.reps[side] = Some(rows);
        p
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub fn int_dims(&self) -> usize {
        self.layout.int_dims
    }

    #[inline]
    pub fn real_dims(&self) -> usize {
        self.layout.real_dims
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.layout.dims()
    }

    pub fn constraints(&self) -> Option<&Matrix> {
        self.reps[Side::Constraints].as_ref()
    }

    pub fn generators(&self) -> Option<&Matrix> {
        self.reps[Side::Generators].as_ref()
    }

    /// Rows: generators, columns: constraints.
    pub fn sat_by_constraint(&self) -> Option<&SatMatrix> {
        self.sats[Side::Constraints].as_ref()
    }

    /// Rows: constraints, columns: generators.
    pub fn sat_by_generator(&self) -> Option<&SatMatrix> {
        self.sats[Side::Generators].as_ref()
    }

    /// Number of equalities in the minimal constraint system.
    pub fn redundant_equalities(&self) -> usize {
        self.nb_eq[Side::Constraints]
    }

    /// Number of lines in the minimal generator system.
    pub fn redundant_lines(&self) -> usize {
        self.nb_eq[Side::Generators]
    }

    #[inline]
    pub fn status(&self) -> StatusFlags {
        self.status
    }

    #[inline]
    pub fn is_minimal(&self) -> bool {
        self.status.contains(StatusFlags::MINIMAL)
    }

    /// Both systems absent. Emptiness of a non-minimal value is only known
    /// after conversion; see `is_bottom`.
    #[inline]
    pub(crate) fn is_empty_repr(&self) -> bool {
        self.reps.iter().all(Option::is_none)
    }

    #[inline]
    pub(crate) fn rep(&self, side: Side) -> Option<&Matrix> {
        self.reps[side].as_ref()
    }

    /// Number of rows over both systems.
    pub fn size(&self) -> usize {
        self.reps.iter().flatten().map(Matrix::nrows).sum()
    }

    pub(crate) fn set_bottom(&mut self) {
        *self = Self::bottom_of(self.layout);
    }

    /// Drop everything but `side`, which must be present.
    pub(crate) fn keep_only(&mut self, side: Side) {
        debug_assert!(self.reps[side].is_some());
        self.reps[side.dual()] = None;
        self.sats = PerSide::new(None, None);
        self.nb_eq = PerSide::new(0, 0);
        self.status = StatusFlags::empty();
    }

    /// Saturation with `side` as primal, transposing the stored one if needed.
    pub(crate) fn sat_for(&self, side: Side) -> Option<SatMatrix> {
        match (&self.sats[side], &self.sats[side.dual()]) {
            (Some(s), _) => Some(s.clone()),
            (None, Some(t)) => Some(t.transpose()),
            (None, None) => None,
        }
    }

    pub(crate) fn check_compatible(&self, other: &Polyhedron) -> Result<(), PolyError> {
        if self.layout != other.layout {
            return Err(PolyError::invalid(format!(
                "dimension mismatch: ({}, {}) vs ({}, {})",
                self.int_dims(),
                self.real_dims(),
                other.int_dims(),
                other.real_dims()
            )));
        }
        Ok(())
    }

    pub(crate) fn check_dim(&self, dim: usize) -> Result<(), PolyError> {
        if dim >= self.dims() {
            return Err(PolyError::invalid(format!(
                "dimension {dim} out of range (have {})",
                self.dims()
            )));
        }
        Ok(())
    }

    /// Flags of an operation that is exact on real dimensions.
    pub(crate) fn flags(&self, exact: bool) -> Outcome<()> {
        if self.int_dims() > 0 {
            Outcome::approx(())
        } else if exact {
            Outcome::exact(())
        } else {
            Outcome::with_flags((), Tbool::Top, Tbool::True)
        }
    }

    /// Run `f` on `self`. A resource error turns `self` into `top` of
    /// `expected` and reports `exact = best = false`.
    pub(crate) fn guarded(
        &mut self,
        op: &'static str,
        expected: Layout,
        f: impl FnOnce(&mut Polyhedron) -> Result<Outcome<()>, PolyError>,
    ) -> Result<Outcome<()>, PolyError> {
        match f(self) {
            Ok(flags) => Ok(flags),
            Err(e) if e.is_resource() => {
                warn!(op, error = %e, "resource limit reached, falling back to top");
                *self = Self::top_of(expected);
                Ok(Outcome::degraded(()))
            }
            Err(e) => Err(e),
        }
    }

    /// Borrowing form of an in-place operation.
    pub(crate) fn functional(
        &self,
        f: impl FnOnce(&mut Polyhedron) -> Result<Outcome<()>, PolyError>,
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        let mut out = self.clone();
        let flags = f(&mut out)?;
        Ok(flags.map(|_| out))
    }
}

/// Answer of a query; resource errors become `Top`.
pub(crate) fn tri(op: &'static str, r: Result<bool, PolyError>) -> Result<Tbool, PolyError> {
    match r {
        Ok(b) => Ok(Tbool::of_bool(b)),
        Err(e) if e.is_resource() => {
            warn!(op, error = %e, "resource limit reached, answering top");
            Ok(Tbool::Top)
        }
        Err(e) => Err(e),
    }
}

impl fmt::Display for Polyhedron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_repr() {
            return f.write_str("bottom");
        }
        let side = if self.reps[Side::Constraints].is_some() {
            Side::Constraints
        } else {
            Side::Generators
        };
        let items: Vec<String> = match (side, self.rep(side)) {
            (Side::Constraints, Some(m)) => m
                .iter()
                .filter(|r| !self.layout.is_positivity(r))
                .map(|r| import::row_to_cons(&self.layout, r).to_string())
                .collect(),
            (Side::Generators, Some(m)) => m
                .iter()
                .filter_map(|r| import::row_to_gen(&self.layout, r))
                .map(|g| g.to_string())
                .collect(),
            _ => Vec::new(),
        };
        if items.is_empty() && side == Side::Constraints {
            // only positivity rows left
            return f.write_str("top");
        }
        write!(f, "{{ {} }}", items.join("; "))
    }
}

#[cfg(test)]
mod props;
