//! Saturation matrix: one bit per (dual row, primal row) pair.
//!
//! A set bit means the dot product of the two rows is zero, i.e. the
//! generator lies on the boundary of the constraint. Rows are bitstrings of
//! 64-bit words; bits past `ncols` are always clear.

use std::cmp::Ordering;

use super::row::dot;
use super::Matrix;

const WORD: usize = 64;

/// Number of words in a row of `ncols` bits.
#[inline]
pub fn words_for(ncols: usize) -> usize {
    ncols.div_ceil(WORD)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SatMatrix {
    rows: Vec<Vec<u64>>,
    ncols: usize,
}

impl SatMatrix {
    /// All-zero matrix.
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            rows: vec![vec![0; words_for(ncols)]; nrows],
            ncols,
        }
    }

    /// From raw bit rows, each `words_for(ncols)` words long.
    pub fn from_rows(rows: Vec<Vec<u64>>, ncols: usize) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == words_for(ncols)));
        Self { rows, ncols }
    }

    pub fn into_rows(self) -> Vec<Vec<u64>> {
        self.rows
    }

    /// Saturation of every `dual` row against every `primal` row, from scratch.
    pub fn compute(dual: &Matrix, primal: &Matrix) -> Self {
        let mut sat = Self::new(dual.nrows(), primal.nrows());
        for (i, d) in dual.iter().enumerate() {
            for (j, p) in primal.iter().enumerate() {
                if num_traits::Zero::is_zero(&dot(d, p)) {
                    sat.set(i, j, true);
                }
            }
        }
        sat
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        debug_assert!(j < self.ncols);
        (self.rows[i][j / WORD] >> (j % WORD)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        debug_assert!(j < self.ncols);
        let mask = 1u64 << (j % WORD);
        if value {
            self.rows[i][j / WORD] |= mask;
        } else {
            self.rows[i][j / WORD] &= !mask;
        }
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[u64] {
        &self.rows[i]
    }

    pub fn push_row(&mut self, bits: Vec<u64>) {
        debug_assert_eq!(bits.len(), words_for(self.ncols));
        self.rows.push(bits);
    }

    /// Row with every column set.
    pub fn full_row(&self) -> Vec<u64> {
        let mut bits = vec![u64::MAX; words_for(self.ncols)];
        let tail = self.ncols % WORD;
        if tail != 0 {
            if let Some(last) = bits.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        bits
    }

    pub fn exchange_rows(&mut self, i: usize, j: usize) {
        self.rows.swap(i, j);
    }

    /// Keep rows whose flag is true, preserving order.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.rows.len());
        let mut it = keep.iter();
        self.rows.retain(|_| *it.next().unwrap_or(&true));
    }

    /// Reorder rows: new row `i` is old row `order[i]`.
    pub fn reorder_rows(&mut self, order: &[usize]) {
        let mut old = std::mem::take(&mut self.rows);
        self.rows = order.iter().map(|&i| std::mem::take(&mut old[i])).collect();
    }

    /// Append `k` columns, all set to `value`.
    pub fn extend_columns(&mut self, k: usize, value: bool) {
        let old = self.ncols;
        self.ncols += k;
        let words = words_for(self.ncols);
        for r in &mut self.rows {
            r.resize(words, 0);
        }
        if value {
            for i in 0..self.rows.len() {
                for j in old..self.ncols {
                    self.set(i, j, true);
                }
            }
        }
    }

    /// Keep columns whose flag is true, compacting to the left.
    pub fn retain_columns(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.ncols);
        let order: Vec<usize> = (0..self.ncols).filter(|&j| keep[j]).collect();
        self.select_columns(&order);
    }

    /// New column `j` is old column `order[j]`.
    pub fn select_columns(&mut self, order: &[usize]) {
        let mut out = SatMatrix::new(self.rows.len(), order.len());
        for i in 0..self.rows.len() {
            for (j, &src) in order.iter().enumerate() {
                if self.get(i, src) {
                    out.set(i, j, true);
                }
            }
        }
        *self = out;
    }

    pub fn transpose(&self) -> SatMatrix {
        let mut t = SatMatrix::new(self.ncols, self.rows.len());
        for i in 0..self.rows.len() {
            for j in 0..self.ncols {
                if self.get(i, j) {
                    t.set(j, i, true);
                }
            }
        }
        t
    }

    /// Sort rows as bitstrings; enables `contains_row`.
    pub fn sort_rows(&mut self) {
        self.rows.sort_unstable_by(|a, b| cmp_bits(a, b));
    }

    /// Binary-search membership; rows must be sorted.
    pub fn contains_row(&self, bits: &[u64]) -> bool {
        self.rows
            .binary_search_by(|r| cmp_bits(r, bits))
            .is_ok()
    }

    /// Number of set bits in row `i`.
    pub fn count_row(&self, i: usize) -> usize {
        popcount(&self.rows[i])
    }
}

fn cmp_bits(a: &[u64], b: &[u64]) -> Ordering {
    a.cmp(b)
}

pub fn and_bits(a: &[u64], b: &[u64]) -> Vec<u64> {
    a.iter().zip(b.iter()).map(|(x, y)| x & y).collect()
}

/// `a ⊆ b` as bit sets.
pub fn is_subset(a: &[u64], b: &[u64]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x & !y == 0)
}

pub fn popcount(a: &[u64]) -> usize {
    a.iter().map(|w| w.count_ones() as usize).sum()
}

#[inline]
pub fn set_bit(bits: &mut [u64], j: usize) {
    bits[j / WORD] |= 1u64 << (j % WORD);
}

#[inline]
pub fn test_bit(bits: &[u64], j: usize) -> bool {
    (bits[j / WORD] >> (j % WORD)) & 1 == 1
}
