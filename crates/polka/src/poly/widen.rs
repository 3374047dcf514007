//! Standard widening, widening with thresholds, and topological closure.

use num_bigint::BigInt;
use num_traits::Zero;
use tracing::debug;

use super::import::constraint_rows;
use super::query::gen_satisfies;
use super::repr::Strength;
use super::{Polyhedron, Side};
use crate::domain::Domain;
use crate::error::PolyError;
use crate::linear::{Interval, LinCons};
use crate::matrix::{dot, set_bit, words_for, Matrix, Row, EPS};
use crate::outcome::Outcome;

impl Polyhedron {
    /// `self ∇ other`, with `self ⊑ other`: keep the constraints of `other`
    /// that saturate exactly the generators of `self` that some constraint of
    /// `self` saturates.
    pub fn widening(&self, dom: &Domain, other: &Polyhedron) -> Result<Outcome<Polyhedron>, PolyError> {
        self.check_compatible(other)?;
        let mut out = Self::top_of(self.layout);
        let flags = out.guarded("widening", self.layout, |w| {
            *w = self.widen_rows(dom, other, &[])?;
            Ok(Outcome::approx(()))
        })?;
        Ok(flags.map(|_| out))
    }

    /// Widening that also keeps each threshold constraint satisfied by both
    /// operands.
    pub fn widening_threshold(
        &self,
        dom: &Domain,
        other: &Polyhedron,
        thresholds: &[LinCons],
    ) -> Result<Outcome<Polyhedron>, PolyError> {
        self.check_compatible(other)?;
        let batch = constraint_rows(&self.layout, thresholds, |_| Interval::top())?;
        let mut out = Self::top_of(self.layout);
        let flags = out.guarded("widening_threshold", self.layout, |w| {
            *w = self.widen_rows(dom, other, &batch.rows)?;
            Ok(Outcome::approx(()))
        })?;
        Ok(flags.map(|_| out))
    }

    fn widen_rows(&self, dom: &Domain, other: &Polyhedron, thresholds: &[Row]) -> Result<Polyhedron, PolyError> {
        let layout = self.layout;
        let a = self.minimal_view(dom)?;
        if a.is_empty_repr() {
            return Ok(other.clone());
        }
        let b = other.view(dom, Side::Constraints)?;
        let Some(b_cons) = b.rep(Side::Constraints) else {
            return Ok(self.clone());
        };
        let (Some(a_gens), Some(mut signatures)) = (a.rep(Side::Generators), a.sat_for(Side::Generators))
        else {
            return Ok(other.clone());
        };
        signatures.sort_rows();
        let mut rows: Vec<Row> = layout.positivity_rows();
        for c in b_cons.iter().filter(|c| !layout.is_positivity(c)) {
            if signatures.contains_row(&signature(c, a_gens)) {
                rows.push(c.clone());
            }
        }
        let kept = rows.len();
        if !thresholds.is_empty() {
            let b_gens = other.view(dom, Side::Generators)?;
            let b_gens = b_gens.rep(Side::Generators);
            for t in thresholds {
                let by_a = a_gens.iter().all(|g| gen_satisfies(&layout, t, g));
                let by_b = b_gens.map_or(true, |m| m.iter().all(|g| gen_satisfies(&layout, t, g)));
                if by_a && by_b {
                    rows.push(t.clone());
                }
            }
        }
        debug!(
            kept,
            thresholds = rows.len() - kept,
            dropped = b_cons.nrows() + layout.positivity_rows().len() - kept,
            "widening"
        );
        Ok(Self::from_side(layout, Side::Constraints, Matrix::from_rows(layout.width(), rows)))
    }

    /// Topological closure: strict constraints become non-strict.
    pub fn closure_in_place(&mut self, dom: &Domain) -> Result<Outcome<()>, PolyError> {
        let layout = self.layout;
        if !layout.strict {
            return Ok(Outcome::exact(()));
        }
        self.guarded("closure", layout, |p| {
            p.minimize_with(dom, Strength::Plain)?;
            let Some(cons) = p.reps[Side::Constraints].as_mut() else {
                return Ok(Outcome::exact(()));
            };
            let mut changed = false;
            for i in 0..cons.nrows() {
                if layout.is_strict_constraint(cons.row(i)) {
                    cons.row_mut(i)[EPS] = BigInt::zero();
                    changed = true;
                }
            }
            if changed {
                p.keep_only(Side::Constraints);
            }
            Ok(Outcome::exact(()))
        })
    }

    pub fn closure(&self, dom: &Domain) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.closure_in_place(dom))
    }
}

/// Saturation signature of `c` over `gens`.
fn signature(c: &Row, gens: &Matrix) -> Vec<u64> {
    let mut sig = vec![0u64; words_for(gens.nrows())];
    for (j, g) in gens.iter().enumerate() {
        if dot(c, g).is_zero() {
            set_bit(&mut sig, j);
        }
    }
    sig
}
