//! Duality control: lazy conversion, minimization and normal forms.

use std::borrow::Cow;

use tracing::{debug, warn};

use super::{Polyhedron, Side, StatusFlags};
use crate::domain::Domain;
use crate::engine::{gauss, simplify, sort_dual, sort_primal, Conversion};
use crate::error::PolyError;
use crate::matrix::{max_bits, normalize_epsilon, tighten_integer, Matrix, Row};
use crate::outcome::{Outcome, Tbool};

/// How much normalization `minimize` performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Strength {
    /// Both systems present and free of redundancy.
    Plain,
    /// Plus epsilon-normalized strict constraints.
    Epsilon,
    /// Plus Gauss-reduced equalities and lines, and sorted rows.
    Canonical,
}

impl Polyhedron {
    /// Make `side` available, converting from the other one if necessary.
    pub(crate) fn ensure(&mut self, dom: &Domain, side: Side) -> Result<(), PolyError> {
        if self.is_empty_repr() || self.reps[side].is_some() {
            return Ok(());
        }
        self.convert_from(dom, side.dual())
    }

    pub(crate) fn ensure_constraints(&mut self, dom: &Domain) -> Result<(), PolyError> {
        self.ensure(dom, Side::Constraints)
    }

    pub(crate) fn ensure_generators(&mut self, dom: &Domain) -> Result<(), PolyError> {
        self.ensure(dom, Side::Generators)
    }

    /// Full conversion from `primal`; afterwards both sides are minimal, or
    /// the polyhedron is bottom.
    pub(crate) fn convert_from(&mut self, dom: &Domain, primal_side: Side) -> Result<(), PolyError> {
        let Some(mut primal) = self.reps[primal_side].clone() else {
            return Ok(());
        };
        let layout = self.layout;
        match primal_side {
            Side::Constraints => {
                for pos in layout.positivity_rows() {
                    if !primal.rows().contains(&pos) {
                        primal.push(pos);
                    }
                }
            }
            Side::Generators => {
                if !primal.iter().any(|g| layout.is_point(g)) {
                    self.set_bottom();
                    return Ok(());
                }
            }
        }
        let conv = dom.engine().convert(&layout, &primal, &dom.budget())?;
        debug!(
            engine = dom.engine().name(),
            side = ?primal_side,
            primal = primal.nrows(),
            dual = conv.dual.nrows(),
            "full conversion"
        );
        self.commit(primal_side, primal, conv);
        Ok(())
    }

    /// Install a conversion result, simplifying the primal side.
    pub(crate) fn commit(&mut self, primal_side: Side, mut primal: Matrix, mut conv: Conversion) {
        let layout = self.layout;
        let gens = match primal_side {
            Side::Constraints => &conv.dual,
            Side::Generators => &primal,
        };
        if !gens.iter().any(|g| layout.is_point(g)) {
            self.set_bottom();
            return;
        }
        let eqs = simplify(&layout, &mut primal, &mut conv);
        let dual_side = primal_side.dual();
        self.reps[primal_side] = Some(primal);
        self.reps[dual_side] = Some(conv.dual);
        self.sats[primal_side] = Some(conv.sat);
        self.sats[dual_side] = None;
        self.nb_eq[primal_side] = eqs;
        self.nb_eq[dual_side] = conv.dual_lines;
        self.status = StatusFlags::MINIMAL;
    }

    /// Append `rows` to `side` and minimize, incrementally when the current
    /// value is already minimal. Bottom stays bottom on the constraint side
    /// and is replaced by the new rows on the generator side.
    pub(crate) fn add_rows(&mut self, dom: &Domain, side: Side, rows: Vec<Row>) -> Result<(), PolyError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.ensure(dom, side)?;
        if self.is_empty_repr() {
            if side == Side::Constraints {
                return Ok(());
            }
            *self = Polyhedron::from_side(self.layout, side, Matrix::from_rows(self.layout.width(), rows));
            return self.convert_from(dom, side);
        }
        let Some(mut primal) = self.reps[side].clone() else {
            return Ok(());
        };
        let start = primal.nrows();
        for r in rows {
            primal.push(r);
        }
        match (self.is_minimal(), self.reps[side.dual()].clone(), self.sat_for(side)) {
            (true, Some(dual), Some(sat)) => {
                let prev = Conversion {
                    dual,
                    sat,
                    dual_lines: self.nb_eq[side.dual()],
                };
                let conv = dom
                    .engine()
                    .extend(&self.layout, &primal, start, prev, &dom.budget())?;
                self.commit(side, primal, conv);
            }
            _ => {
                self.reps[side] = Some(primal);
                self.keep_only(side);
                self.convert_from(dom, side)?;
            }
        }
        Ok(())
    }

    /// Plain minimization. On a resource error the value is left as it was
    /// (same set, possibly redundant) and both flags are false.
    pub fn minimize_in_place(&mut self, dom: &Domain) -> Result<Outcome<()>, PolyError> {
        self.minimize_guarded(dom, Strength::Plain)
    }

    pub fn minimize(&self, dom: &Domain) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.minimize_in_place(dom))
    }

    /// Strongest normal form: both systems minimal, Gauss-reduced and sorted.
    pub fn canonicalize_in_place(&mut self, dom: &Domain) -> Result<Outcome<()>, PolyError> {
        self.minimize_guarded(dom, Strength::Canonical)
    }

    pub fn canonicalize(&self, dom: &Domain) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.canonicalize_in_place(dom))
    }

    fn minimize_guarded(&mut self, dom: &Domain, strength: Strength) -> Result<Outcome<()>, PolyError> {
        let mut work = self.clone();
        match work.minimize_with(dom, strength) {
            Ok(()) => {
                *self = work;
                Ok(Outcome::exact(()))
            }
            Err(e) if e.is_resource() => {
                warn!(?strength, error = %e, "resource limit reached, minimization skipped");
                Ok(Outcome::degraded(()))
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn minimize_with(&mut self, dom: &Domain, strength: Strength) -> Result<(), PolyError> {
        if self.is_empty_repr() {
            return Ok(());
        }
        if !self.is_minimal() {
            let from = if self.reps[Side::Constraints].is_some() {
                Side::Constraints
            } else {
                Side::Generators
            };
            if self.reps[from.dual()].is_some() {
                self.keep_only(from);
            }
            self.convert_from(dom, from)?;
            if self.is_empty_repr() {
                return Ok(());
            }
        }
        if strength >= Strength::Epsilon {
            self.normalize_strict(dom)?;
            if self.is_empty_repr() {
                return Ok(());
            }
        }
        if strength >= Strength::Canonical {
            self.reduce_and_sort();
        }
        Ok(())
    }

    fn normalize_strict(&mut self, dom: &Domain) -> Result<(), PolyError> {
        if !self.layout.strict || self.status.contains(StatusFlags::C_EPS_NORMALIZED) {
            return Ok(());
        }
        let layout = self.layout;
        let Some(cons) = self.reps[Side::Constraints].as_mut() else {
            return Ok(());
        };
        let mut changed = false;
        for i in 0..cons.nrows() {
            if layout.is_strict_constraint(cons.row(i)) {
                let mut r = cons.row(i).clone();
                if normalize_epsilon(&layout, &mut r) {
                    *cons.row_mut(i) = r;
                    changed = true;
                }
            }
        }
        if changed {
            self.keep_only(Side::Constraints);
            self.convert_from(dom, Side::Constraints)?;
        }
        self.status.insert(StatusFlags::C_EPS_NORMALIZED);
        Ok(())
    }

    /// Gauss-reduce both sides and sort them; saturation follows the rows.
    fn reduce_and_sort(&mut self) {
        for side in [Side::Constraints, Side::Generators] {
            let flag = StatusFlags::gauss(side);
            if !self.status.contains(flag) {
                if let Some(m) = self.reps[side].as_mut() {
                    gauss(m);
                }
                self.status.insert(flag);
            }
        }
        let primal = if self.sats[Side::Constraints].is_some() {
            Side::Constraints
        } else {
            Side::Generators
        };
        let dual = primal.dual();
        let (Some(mut p), Some(mut d), Some(mut sat)) = (
            self.reps[primal].take(),
            self.reps[dual].take(),
            self.sats[primal].take(),
        ) else {
            return;
        };
        sort_primal(&mut p, &mut sat);
        sort_dual(&mut d, &mut sat);
        self.reps[primal] = Some(p);
        self.reps[dual] = Some(d);
        self.sats[primal] = Some(sat);
    }

    /// Minimized view for queries; clones only when work is needed.
    pub(crate) fn minimal_view(&self, dom: &Domain) -> Result<Cow<'_, Polyhedron>, PolyError> {
        if self.is_empty_repr() || self.is_minimal() {
            return Ok(Cow::Borrowed(self));
        }
        let mut p = self.clone();
        p.minimize_with(dom, Strength::Plain)?;
        Ok(Cow::Owned(p))
    }

    /// View with the given side available.
    pub(crate) fn view(&self, dom: &Domain, side: Side) -> Result<Cow<'_, Polyhedron>, PolyError> {
        if self.is_empty_repr() || self.reps[side].is_some() {
            return Ok(Cow::Borrowed(self));
        }
        let mut p = self.clone();
        p.ensure(dom, side)?;
        Ok(Cow::Owned(p))
    }

    /// Integer tightening (level 0) and dropping of constraints with wide
    /// coefficients (level 1 and above). Both over-approximate.
    pub fn approximate_in_place(&mut self, dom: &Domain, level: u8) -> Result<Outcome<()>, PolyError> {
        let layout = self.layout;
        let limit = dom.cfg().approx_max_coeff_bits;
        self.guarded("approximate", layout, |p| {
            p.ensure_constraints(dom)?;
            let Some(cons) = p.reps[Side::Constraints].as_ref() else {
                return Ok(Outcome::exact(()));
            };
            let mut rows = Vec::with_capacity(cons.nrows());
            let mut changed = false;
            for r in cons.iter() {
                let mut r = r.clone();
                if layout.int_dims > 0 && tighten_integer(&layout, &mut r) {
                    changed = true;
                }
                if level >= 1 && !layout.is_structural(&r) && max_bits(&r) > limit {
                    changed = true;
                    continue;
                }
                rows.push(r);
            }
            if !changed {
                return Ok(Outcome::exact(()));
            }
            debug!(level, kept = rows.len(), "approximated constraint system");
            p.reps[Side::Constraints] = Some(Matrix::from_rows(layout.width(), rows));
            p.keep_only(Side::Constraints);
            Ok(Outcome::with_flags((), Tbool::Top, Tbool::Top))
        })
    }

    pub fn approximate(&self, dom: &Domain, level: u8) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.approximate_in_place(dom, level))
    }
}
