//! Chernikova's algorithm (double description with adjacency tests).
//!
//! The dual cone starts as the whole space, spanned by unit lines, and is cut
//! by one primal row at a time.
//! - If some line is not orthogonal to the row, it becomes the pivot: every
//!   other line and ray is projected onto the row's hyperplane along it, and
//!   the pivot itself turns into a ray (inequality) or disappears (equality).
//! - Otherwise rays are split by the sign of their scalar product. Each pair
//!   of a positive and a negative ray that is adjacent in the current cone
//!   yields a new ray on the hyperplane. Negative rays are dropped, and so are
//!   positive ones for an equality.
//!
//! Adjacency uses the cheap combinatorial bound first (two adjacent rays share
//! at least `cone_dim - lines - 2` saturated rows) and then the exact test:
//! no third ray saturates every row both of them saturate.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use tracing::trace;

use super::{Conversion, ConversionEngine};
use crate::cfg::Budget;
use crate::error::PolyError;
use crate::matrix::{
    and_bits, dot, is_equality, is_subset, lin_comb, max_bits, normalize, normalize_sign,
    popcount, set_bit, words_for, Layout, Matrix, Row, SatMatrix, MARKER,
};

/// Default conversion engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Chernikova;

/// Dual cone under construction.
struct Cone {
    width: usize,
    lines: Vec<Row>,
    rays: Vec<Row>,
    /// Saturation bits of each ray over the primal rows processed so far.
    sat: Vec<Vec<u64>>,
    words: usize,
}

impl Cone {
    fn whole_space(width: usize, nprimal: usize) -> Self {
        let lines = (1..width)
            .map(|c| {
                let mut l = vec![BigInt::zero(); width];
                l[c] = BigInt::one();
                l
            })
            .collect();
        Self {
            width,
            lines,
            rays: Vec::new(),
            sat: Vec::new(),
            words: words_for(nprimal),
        }
    }

    fn from_conversion(prev: Conversion, nprimal: usize) -> Self {
        let width = prev.dual.width();
        let words = words_for(nprimal);
        let bits = prev.sat.into_rows();
        let mut cone = Self {
            width,
            lines: Vec::with_capacity(prev.dual_lines),
            rays: Vec::new(),
            sat: Vec::new(),
            words,
        };
        for (row, mut b) in prev.dual.into_rows().into_iter().zip(bits) {
            if is_equality(&row) {
                cone.lines.push(row);
            } else {
                b.resize(words, 0);
                cone.rays.push(row);
                cone.sat.push(b);
            }
        }
        cone
    }

    fn size(&self) -> usize {
        self.lines.len() + self.rays.len()
    }

    /// Cut the cone with primal row `k`.
    fn add_row(&mut self, row: &Row, k: usize, budget: &Budget) -> Result<(), PolyError> {
        let eq = is_equality(row);
        let mut line_sp: Vec<BigInt> = self.lines.iter().map(|l| dot(row, l)).collect();
        if let Some(p) = line_sp.iter().position(|s| !s.is_zero()) {
            let pivot = self.lines.swap_remove(p);
            let sp_p = line_sp.swap_remove(p);
            self.pivot_on_line(row, k, eq, pivot, sp_p, &line_sp, budget)
        } else {
            self.split_rays(row, k, eq, budget)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn pivot_on_line(
        &mut self,
        row: &Row,
        k: usize,
        eq: bool,
        pivot: Row,
        sp_p: BigInt,
        line_sp: &[BigInt],
        budget: &Budget,
    ) -> Result<(), PolyError> {
        for (l, s) in self.lines.iter_mut().zip(line_sp) {
            if !s.is_zero() {
                *l = lin_comb(&sp_p, l, &-s, &pivot);
                normalize(l);
                budget.check_bits(max_bits(l))?;
            }
        }
        let abs_p = sp_p.abs();
        for (ray, bits) in self.rays.iter_mut().zip(self.sat.iter_mut()) {
            let s = dot(row, ray);
            if !s.is_zero() {
                let c = if sp_p.is_positive() { -s } else { s };
                *ray = lin_comb(&abs_p, ray, &c, &pivot);
                normalize(ray);
                budget.check_bits(max_bits(ray))?;
            }
            set_bit(bits, k);
        }
        if !eq {
            let mut ray = pivot;
            ray[MARKER] = BigInt::one();
            if sp_p.is_negative() {
                for x in ray.iter_mut().skip(1) {
                    *x = -&*x;
                }
            }
            let mut bits = vec![0u64; self.words];
            for j in 0..k {
                set_bit(&mut bits, j);
            }
            self.rays.push(ray);
            self.sat.push(bits);
        }
        Ok(())
    }

    fn split_rays(&mut self, row: &Row, k: usize, eq: bool, budget: &Budget) -> Result<(), PolyError> {
        let sps: Vec<BigInt> = self.rays.iter().map(|r| dot(row, r)).collect();
        let pos: Vec<usize> = (0..sps.len()).filter(|&i| sps[i].is_positive()).collect();
        let neg: Vec<usize> = (0..sps.len()).filter(|&i| sps[i].is_negative()).collect();
        for (i, s) in sps.iter().enumerate() {
            if s.is_zero() {
                set_bit(&mut self.sat[i], k);
            }
        }
        if neg.is_empty() && (pos.is_empty() || !eq) {
            return Ok(());
        }

        let min_common = (self.width - 1).saturating_sub(self.lines.len() + 2);
        let mut new_rays = Vec::new();
        let mut new_sat = Vec::new();
        for &p in &pos {
            for &n in &neg {
                let common = and_bits(&self.sat[p], &self.sat[n]);
                if popcount(&common) < min_common {
                    continue;
                }
                let blocked = (0..self.rays.len())
                    .any(|t| t != p && t != n && is_subset(&common, &self.sat[t]));
                if blocked {
                    continue;
                }
                let mut ray = lin_comb(&sps[p], &self.rays[n], &-&sps[n], &self.rays[p]);
                if !normalize(&mut ray) {
                    continue;
                }
                budget.check_bits(max_bits(&ray))?;
                let mut bits = common;
                set_bit(&mut bits, k);
                new_rays.push(ray);
                new_sat.push(bits);
            }
            budget.check_rows(self.size() + new_rays.len())?;
        }

        let keep: Vec<bool> = sps
            .iter()
            .map(|s| s.is_zero() || (!eq && s.is_positive()))
            .collect();
        let mut it = keep.iter();
        self.rays.retain(|_| *it.next().unwrap_or(&true));
        let mut it = keep.iter();
        self.sat.retain(|_| *it.next().unwrap_or(&true));
        self.rays.extend(new_rays);
        self.sat.extend(new_sat);
        Ok(())
    }

    fn finish(self, nprimal: usize) -> Conversion {
        let dual_lines = self.lines.len();
        let full = {
            let mut b = vec![0u64; self.words];
            for j in 0..nprimal {
                set_bit(&mut b, j);
            }
            b
        };
        let mut rows = Vec::with_capacity(self.size());
        let mut bits = Vec::with_capacity(self.size());
        for mut l in self.lines {
            normalize_sign(&mut l);
            rows.push(l);
            bits.push(full.clone());
        }
        rows.extend(self.rays);
        bits.extend(self.sat);
        Conversion {
            dual: Matrix::from_rows(self.width, rows),
            sat: SatMatrix::from_rows(bits, nprimal),
            dual_lines,
        }
    }
}

impl Chernikova {
    fn run(&self, mut cone: Cone, primal: &Matrix, start: usize, budget: &Budget) -> Result<Conversion, PolyError> {
        for k in start..primal.nrows() {
            cone.add_row(primal.row(k), k, budget)?;
            budget.check_rows(cone.size())?;
            budget.check_time()?;
            trace!(
                row = k,
                lines = cone.lines.len(),
                rays = cone.rays.len(),
                "chernikova step"
            );
        }
        Ok(cone.finish(primal.nrows()))
    }
}

impl ConversionEngine for Chernikova {
    fn name(&self) -> &'static str {
        "chernikova"
    }

    fn convert(&self, layout: &Layout, primal: &Matrix, budget: &Budget) -> Result<Conversion, PolyError> {
        debug_assert_eq!(primal.width(), layout.width());
        let cone = Cone::whole_space(layout.width(), primal.nrows());
        self.run(cone, primal, 0, budget)
    }

    fn extend(
        &self,
        layout: &Layout,
        primal: &Matrix,
        start: usize,
        prev: Conversion,
        budget: &Budget,
    ) -> Result<Conversion, PolyError> {
        debug_assert_eq!(primal.width(), layout.width());
        debug_assert_eq!(prev.sat.ncols(), start);
        let cone = Cone::from_conversion(prev, primal.nrows());
        self.run(cone, primal, start, budget)
    }
}
