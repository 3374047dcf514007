//! Dimension changes: add, remove, permute, expand, fold and forget.

use num_bigint::BigInt;
use num_traits::{One, Zero};

use super::{Polyhedron, Side, StatusFlags};
use crate::domain::Domain;
use crate::error::PolyError;
use crate::matrix::{is_zero_vector, normalize, normalize_sign, Layout, Matrix, MARKER};
use crate::outcome::Outcome;

/// Dimensions added or removed.
///
/// For additions, `positions[i]` is the old dimension before which the
/// `i`-th new dimension is inserted (`dims()` appends). The first `int_dims`
/// entries go into the integer block. For removals, `positions` lists the
/// removed dimensions, integer ones first.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DimChange {
    pub int_dims: usize,
    pub real_dims: usize,
    pub positions: Vec<usize>,
}

impl DimChange {
    pub fn new(int_dims: usize, real_dims: usize, positions: Vec<usize>) -> Self {
        Self {
            int_dims,
            real_dims,
            positions,
        }
    }

    /// `n` real dimensions appended after the last one of `layout`.
    pub fn append_real(layout: &Layout, n: usize) -> Self {
        Self::new(0, n, vec![layout.dims(); n])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.int_dims + self.real_dims
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_len(&self) -> Result<(), PolyError> {
        if self.positions.len() != self.len() {
            return Err(PolyError::invalid(format!(
                "dimension change lists {} positions for {} dimensions",
                self.positions.len(),
                self.len()
            )));
        }
        Ok(())
    }

    fn check_add(&self, layout: &Layout) -> Result<(), PolyError> {
        self.check_len()?;
        let (ints, reals) = self.positions.split_at(self.int_dims);
        let sorted = self.positions.windows(2).all(|w| w[0] <= w[1]);
        let ints_ok = ints.iter().all(|&p| p <= layout.int_dims);
        let reals_ok = reals
            .iter()
            .all(|&p| p >= layout.int_dims && p <= layout.dims());
        if !(sorted && ints_ok && reals_ok) {
            return Err(PolyError::invalid(format!(
                "bad insertion positions {:?}",
                self.positions
            )));
        }
        Ok(())
    }

    fn check_remove(&self, layout: &Layout) -> Result<(), PolyError> {
        self.check_len()?;
        let (ints, reals) = self.positions.split_at(self.int_dims);
        let sorted = self.positions.windows(2).all(|w| w[0] < w[1]);
        let ints_ok = ints.iter().all(|&p| p < layout.int_dims);
        let reals_ok = reals
            .iter()
            .all(|&p| p >= layout.int_dims && p < layout.dims());
        if !(sorted && ints_ok && reals_ok) {
            return Err(PolyError::invalid(format!(
                "bad removed dimensions {:?}",
                self.positions
            )));
        }
        Ok(())
    }

    /// Index of each new dimension after insertion.
    fn inserted_indices(&self) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &p)| p + i)
            .collect()
    }
}

impl Polyhedron {
    /// Insert dimensions. New dimensions are unconstrained, or fixed to 0
    /// with `project`.
    pub fn add_dimensions_in_place(&mut self, change: &DimChange, project: bool) -> Result<Outcome<()>, PolyError> {
        change.check_add(&self.layout)?;
        self.add_dims_raw(change, project);
        Ok(Outcome::exact(()))
    }

    pub fn add_dimensions(&self, change: &DimChange, project: bool) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.add_dimensions_in_place(change, project))
    }

    /// Project the given dimensions away.
    pub fn remove_dimensions_in_place(&mut self, dom: &Domain, change: &DimChange) -> Result<Outcome<()>, PolyError> {
        change.check_remove(&self.layout)?;
        let expected = Layout::new(
            self.layout.strict,
            self.layout.int_dims - change.int_dims,
            self.layout.real_dims - change.real_dims,
        );
        self.guarded("remove_dimensions", expected, |p| {
            p.remove_dims_raw(dom, &change.positions, expected)?;
            Ok(p.flags(true))
        })
    }

    pub fn remove_dimensions(&self, dom: &Domain, change: &DimChange) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.remove_dimensions_in_place(dom, change))
    }

    /// Rename dimensions: `perm[d]` is the new index of dimension `d`.
    /// Integer dimensions must stay integer.
    pub fn permute_dimensions_in_place(&mut self, perm: &[usize]) -> Result<Outcome<()>, PolyError> {
        let n = self.dims();
        let bad = || PolyError::invalid(format!("bad permutation {perm:?}"));
        if perm.len() != n {
            return Err(bad());
        }
        let mut seen = vec![false; n];
        for (d, &to) in perm.iter().enumerate() {
            if to >= n || seen[to] || self.layout.is_int(d) != self.layout.is_int(to) {
                return Err(bad());
            }
            seen[to] = true;
        }
        self.permute_raw(perm);
        Ok(Outcome::exact(()))
    }

    pub fn permute_dimensions(&self, perm: &[usize]) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.permute_dimensions_in_place(perm))
    }

    /// Duplicate `dim` into `n` fresh dimensions of the same kind, related to
    /// the others exactly as `dim` is. Integer copies go at the end of the
    /// integer block, real copies at the very end.
    pub fn expand_in_place(&mut self, dom: &Domain, dim: usize, n: usize) -> Result<Outcome<()>, PolyError> {
        self.check_dim(dim)?;
        if n == 0 {
            return Ok(Outcome::exact(()));
        }
        let layout = self.layout;
        let change = if layout.is_int(dim) {
            DimChange::new(n, 0, vec![layout.int_dims; n])
        } else {
            DimChange::new(0, n, vec![layout.dims(); n])
        };
        let expected = Layout::new(
            layout.strict,
            layout.int_dims + change.int_dims,
            layout.real_dims + change.real_dims,
        );
        self.guarded("expand", expected, |p| {
            p.ensure_constraints(dom)?;
            p.add_dims_raw(&change, false);
            let Some(cons) = p.rep(Side::Constraints) else {
                return Ok(Outcome::exact(()));
            };
            let col = expected.col(dim);
            let mut copies = Vec::new();
            for r in cons.iter().filter(|r| !r[col].is_zero()) {
                for new in change.inserted_indices() {
                    let mut c = r.clone();
                    c[expected.col(new)] = r[col].clone();
                    c[col] = BigInt::zero();
                    copies.push(c);
                }
            }
            p.add_rows(dom, Side::Constraints, copies)?;
            Ok(p.flags(true))
        })
    }

    pub fn expand(&self, dom: &Domain, dim: usize, n: usize) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.expand_in_place(dom, dim, n))
    }

    /// Merge `dims[1..]` into `dims[0]` (convex hull of the copies) and
    /// remove them. `dims` is strictly increasing and of one kind.
    pub fn fold_in_place(&mut self, dom: &Domain, dims: &[usize]) -> Result<Outcome<()>, PolyError> {
        let layout = self.layout;
        let Some(&first) = dims.first() else {
            return Err(PolyError::invalid("fold of no dimension"));
        };
        for &d in dims {
            self.check_dim(d)?;
        }
        let same_kind = dims.iter().all(|&d| layout.is_int(d) == layout.is_int(first));
        if !dims.windows(2).all(|w| w[0] < w[1]) || !same_kind {
            return Err(PolyError::invalid(format!("bad fold dimensions {dims:?}")));
        }
        if dims.len() == 1 {
            return Ok(Outcome::exact(()));
        }
        let removed = &dims[1..];
        let ints = if layout.is_int(first) { removed.len() } else { 0 };
        let expected = Layout::new(
            layout.strict,
            layout.int_dims - ints,
            layout.real_dims - (removed.len() - ints),
        );
        self.guarded("fold", expected, |p| {
            p.ensure_generators(dom)?;
            if let Some(gens) = p.rep(Side::Generators) {
                let target = layout.col(first);
                let mut copies = Vec::with_capacity(gens.nrows() * removed.len());
                for g in gens.iter() {
                    for &d in removed {
                        let mut c = g.clone();
                        c[target] = g[layout.col(d)].clone();
                        copies.push(c);
                    }
                }
                p.add_rows(dom, Side::Generators, copies)?;
            }
            p.remove_dims_raw(dom, removed, expected)?;
            Ok(p.flags(false))
        })
    }

    pub fn fold(&self, dom: &Domain, dims: &[usize]) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.fold_in_place(dom, dims))
    }

    /// Existential quantification of `dims`; with `project` they are then
    /// set to 0.
    pub fn forget_in_place(&mut self, dom: &Domain, dims: &[usize], project: bool) -> Result<Outcome<()>, PolyError> {
        for &d in dims {
            self.check_dim(d)?;
        }
        let layout = self.layout;
        self.guarded("forget", layout, |p| {
            p.ensure_generators(dom)?;
            let Some(gens) = p.reps[Side::Generators].as_mut() else {
                return Ok(Outcome::exact(()));
            };
            let mut rows = std::mem::replace(gens, Matrix::new(layout.width())).into_rows();
            for r in &mut rows {
                for &d in dims {
                    r[layout.col(d)] = BigInt::zero();
                }
                normalize(r);
                normalize_sign(r);
            }
            rows.retain(|r| !is_zero_vector(r));
            if !project {
                for &d in dims {
                    let mut line = layout.zero_row();
                    line[layout.col(d)] = BigInt::one();
                    rows.push(line);
                }
            }
            *gens = Matrix::from_rows(layout.width(), rows);
            p.keep_only(Side::Generators);
            Ok(p.flags(true))
        })
    }

    pub fn forget(&self, dom: &Domain, dims: &[usize], project: bool) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.forget_in_place(dom, dims, project))
    }

    /// Column insertion with the matching lines (or equalities with
    /// `project`); minimality and saturation are kept.
    pub(crate) fn add_dims_raw(&mut self, change: &DimChange, project: bool) {
        let old = self.layout;
        let new = Layout::new(
            old.strict,
            old.int_dims + change.int_dims,
            old.real_dims + change.real_dims,
        );
        let at: Vec<usize> = change.positions.iter().map(|&p| old.col(p)).collect();
        for m in [Side::Constraints, Side::Generators] {
            if let Some(mat) = self.reps[m].as_mut() {
                mat.insert_columns(&at);
            }
        }
        self.layout = new;
        let k = change.len();
        if k == 0 || self.is_empty_repr() {
            return;
        }
        let unit = |d: usize, marker: BigInt| {
            let mut r = new.zero_row();
            r[MARKER] = marker;
            r[new.col(d)] = BigInt::one();
            r
        };
        // Lines go to the generators, equalities to the constraints.
        let side = if project {
            Side::Constraints
        } else {
            Side::Generators
        };
        let Some(mat) = self.reps[side].as_mut() else {
            return;
        };
        for d in change.inserted_indices() {
            mat.push(unit(d, BigInt::zero()));
        }
        if let Some(sat) = self.sats[side].as_mut() {
            sat.extend_columns(k, true);
        }
        if let Some(sat) = self.sats[side.dual()].as_mut() {
            for _ in 0..k {
                let full = sat.full_row();
                sat.push_row(full);
            }
        }
        if self.is_minimal() {
            self.nb_eq[side] += k;
        }
        self.status.remove(StatusFlags::gauss(side));
    }

    /// Remove the columns of `dims` (sorted) from the generators.
    pub(crate) fn remove_dims_raw(&mut self, dom: &Domain, dims: &[usize], expected: Layout) -> Result<(), PolyError> {
        let old = self.layout;
        self.ensure_generators(dom)?;
        self.layout = expected;
        let Some(gens) = self.reps[Side::Generators].as_mut() else {
            return Ok(());
        };
        let mut keep = vec![true; old.width()];
        for &d in dims {
            keep[old.col(d)] = false;
        }
        gens.retain_columns(&keep);
        let mut rows = std::mem::replace(gens, Matrix::new(expected.width())).into_rows();
        for r in &mut rows {
            normalize(r);
            normalize_sign(r);
        }
        rows.retain(|r| !is_zero_vector(r));
        *gens = Matrix::from_rows(expected.width(), rows);
        self.keep_only(Side::Generators);
        Ok(())
    }

    /// Column permutation on both sides; saturation and counts carry over.
    pub(crate) fn permute_raw(&mut self, perm: &[usize]) {
        let layout = self.layout;
        let mut cols: Vec<usize> = (0..layout.width()).collect();
        for (d, &to) in perm.iter().enumerate() {
            cols[layout.col(d)] = layout.col(to);
        }
        for side in [Side::Constraints, Side::Generators] {
            if let Some(m) = self.reps[side].as_mut() {
                m.permute_columns(&cols);
            }
        }
        self.status.remove(StatusFlags::C_GAUSS);
        self.status.remove(StatusFlags::G_GAUSS);
    }
}
