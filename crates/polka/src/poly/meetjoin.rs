//! Meet and join. Both add the rows of one operand to the other, on the
//! constraint side for meet and on the generator side for join.

use std::cmp::Reverse;

use super::import::{constraint_rows, generator_rows};
use super::{Polyhedron, Side};
use crate::domain::Domain;
use crate::error::PolyError;
use crate::linear::{GenKind, Interval, LinCons, LinGen};
use crate::outcome::Outcome;

fn op_name(side: Side) -> &'static str {
    match side {
        Side::Constraints => "meet",
        Side::Generators => "join",
    }
}

impl Polyhedron {
    pub fn meet_in_place(&mut self, dom: &Domain, other: &Polyhedron) -> Result<Outcome<()>, PolyError> {
        self.combine_in_place(dom, other, Side::Constraints)
    }

    pub fn meet(&self, dom: &Domain, other: &Polyhedron) -> Result<Outcome<Polyhedron>, PolyError> {
        if std::ptr::eq(self, other) {
            return Ok(Outcome::exact(self.clone()));
        }
        self.functional(|p| p.meet_in_place(dom, other))
    }

    pub fn join_in_place(&mut self, dom: &Domain, other: &Polyhedron) -> Result<Outcome<()>, PolyError> {
        self.combine_in_place(dom, other, Side::Generators)
    }

    pub fn join(&self, dom: &Domain, other: &Polyhedron) -> Result<Outcome<Polyhedron>, PolyError> {
        if std::ptr::eq(self, other) {
            return Ok(Outcome::exact(self.clone()));
        }
        self.functional(|p| p.join_in_place(dom, other))
    }

    pub fn meet_array(dom: &Domain, ps: &[Polyhedron]) -> Result<Outcome<Polyhedron>, PolyError> {
        Self::combine_array(dom, ps, Side::Constraints)
    }

    pub fn join_array(dom: &Domain, ps: &[Polyhedron]) -> Result<Outcome<Polyhedron>, PolyError> {
        Self::combine_array(dom, ps, Side::Generators)
    }

    /// Intersection with interval-linear constraints. Interval coefficients
    /// are bounded with the current box.
    pub fn meet_lincons_in_place(&mut self, dom: &Domain, cons: &[LinCons]) -> Result<Outcome<()>, PolyError> {
        let layout = self.layout;
        self.guarded("meet_lincons", layout, |p| {
            if p.is_empty_repr() || cons.is_empty() {
                return Ok(Outcome::exact(()));
            }
            let bounds = if cons.iter().any(|c| !c.expr.is_quasilinear()) {
                p.dimension_bounds(dom)?
            } else {
                Vec::new()
            };
            let batch = constraint_rows(&layout, cons, |d| {
                bounds.get(d).cloned().unwrap_or_else(Interval::top)
            })?;
            p.add_rows(dom, Side::Constraints, batch.rows)?;
            Ok(p.flags(batch.exact))
        })
    }

    pub fn meet_lincons(&self, dom: &Domain, cons: &[LinCons]) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.meet_lincons_in_place(dom, cons))
    }

    /// Join with the cone spanned by rays and lines. Bottom stays bottom.
    pub fn add_rays_in_place(&mut self, dom: &Domain, gens: &[LinGen]) -> Result<Outcome<()>, PolyError> {
        if gens.iter().any(|g| g.kind == GenKind::Vertex) {
            return Err(PolyError::invalid("add_rays accepts rays and lines only"));
        }
        let layout = self.layout;
        let rows = generator_rows(&layout, gens)?;
        self.guarded("add_rays", layout, |p| {
            p.ensure_generators(dom)?;
            if p.is_empty_repr() {
                return Ok(Outcome::exact(()));
            }
            p.add_rows(dom, Side::Generators, rows)?;
            Ok(p.flags(true))
        })
    }

    pub fn add_rays(&self, dom: &Domain, gens: &[LinGen]) -> Result<Outcome<Polyhedron>, PolyError> {
        self.functional(|p| p.add_rays_in_place(dom, gens))
    }

    fn combine_in_place(&mut self, dom: &Domain, other: &Polyhedron, side: Side) -> Result<Outcome<()>, PolyError> {
        self.check_compatible(other)?;
        let layout = self.layout;
        let exact = side == Side::Constraints;
        self.guarded(op_name(side), layout, |p| {
            match side {
                Side::Constraints if p.is_empty_repr() => return Ok(Outcome::exact(())),
                Side::Constraints if other.is_empty_repr() => {
                    p.set_bottom();
                    return Ok(Outcome::exact(()));
                }
                Side::Generators if other.is_empty_repr() => return Ok(Outcome::exact(())),
                Side::Generators if p.is_empty_repr() => {
                    *p = other.clone();
                    return Ok(Outcome::exact(()));
                }
                _ => {}
            }
            // Accumulate into the operand that is already minimal.
            if !p.is_minimal() && other.is_minimal() {
                let mine = std::mem::replace(p, other.clone());
                p.absorb(dom, side, &mine)?;
            } else {
                p.absorb(dom, side, other)?;
            }
            Ok(p.flags(exact))
        })
    }

    /// Add the `side` rows of `other` to `self`.
    fn absorb(&mut self, dom: &Domain, side: Side, other: &Polyhedron) -> Result<(), PolyError> {
        let view = other.view(dom, side)?;
        let Some(rows) = view.rep(side) else {
            if side == Side::Constraints {
                self.set_bottom();
            }
            return Ok(());
        };
        let mut rows = rows.clone();
        rows.sort_dedup();
        let layout = self.layout;
        let rows: Vec<_> = rows
            .into_rows()
            .into_iter()
            .filter(|r| side == Side::Generators || !layout.is_positivity(r))
            .collect();
        self.add_rows(dom, side, rows)
    }

    fn combine_array(dom: &Domain, ps: &[Polyhedron], side: Side) -> Result<Outcome<Polyhedron>, PolyError> {
        let Some(first) = ps.first() else {
            return Err(PolyError::invalid(format!("{} of an empty array", op_name(side))));
        };
        for p in &ps[1..] {
            first.check_compatible(p)?;
        }
        if ps.len() == 1 {
            return Ok(Outcome::exact(first.clone()));
        }
        let pivot = (0..ps.len())
            .max_by_key(|&i| (ps[i].nb_eq[side], ps[i].is_minimal(), Reverse(i)))
            .unwrap_or(0);
        let mut acc = ps[pivot].clone();
        let mut out = Outcome::exact(());
        for (i, p) in ps.iter().enumerate() {
            if i == pivot {
                continue;
            }
            let step = acc.combine_in_place(dom, p, side)?;
            out = out.and_flags(&step);
        }
        Ok(out.map(|_| acc))
    }
}
