//! Exact row matrices and saturation bit matrices.
//!
//! Purpose
//! - Hold constraint and generator systems as homogeneous `BigInt` rows.
//! - Provide the row-level growth, sorting and column surgery that the
//!   conversion engine and the domain operations are built from.
//!
//! Assumptions and conventions
//! - Every row of a matrix has the same width (asserted in debug builds).
//! - `sorted` is a cache of "rows are in lexicographic order without
//!   duplicates"; any mutation that may break it clears the flag.

mod row;
mod sat;

pub use row::{
    compare, dot, dot_without_eps, eliminate, is_equality, is_zero_vector, lin_comb, max_bits,
    normalize, normalize_epsilon, normalize_sign, tighten_integer, Layout, Row, EPS, MARKER, XI,
};
pub use sat::{and_bits, is_subset, popcount, set_bit, test_bit, words_for, SatMatrix};

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::Zero;

/// Ordered sequence of rows sharing one width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: Vec<Row>,
    width: usize,
    sorted: bool,
}

impl Matrix {
    pub fn new(width: usize) -> Self {
        Self {
            rows: Vec::new(),
            width,
            sorted: true,
        }
    }

    pub fn with_capacity(width: usize, capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            width,
            sorted: true,
        }
    }

    pub fn from_rows(width: usize, rows: Vec<Row>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == width));
        let sorted = rows.len() <= 1;
        Self {
            rows,
            width,
            sorted,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    #[inline]
    pub fn row(&self, i: usize) -> &Row {
        &self.rows[i]
    }

    /// Mutable access; the matrix is no longer considered sorted.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut Row {
        self.sorted = false;
        &mut self.rows[i]
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Rows with marker 0 (equalities or lines).
    pub fn count_equalities(&self) -> usize {
        self.rows.iter().filter(|r| is_equality(r)).count()
    }

    pub fn push(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.width);
        if self.sorted {
            if let Some(last) = self.rows.last() {
                self.sorted = compare(last, &row) == Ordering::Less;
            }
        }
        self.rows.push(row);
    }

    pub fn append(&mut self, other: &Matrix) {
        debug_assert_eq!(other.width, self.width);
        self.reserve(other.nrows());
        for r in other.iter() {
            self.push(r.clone());
        }
    }

    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.rows.reserve(additional);
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.rows.shrink_to_fit();
    }

    pub fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
    }

    pub fn exchange_rows(&mut self, i: usize, j: usize) {
        if i != j {
            self.rows.swap(i, j);
            self.sorted = false;
        }
    }

    /// Keep rows whose flag is true, preserving order (sortedness survives).
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.rows.len());
        let mut it = keep.iter();
        self.rows.retain(|_| *it.next().unwrap_or(&true));
    }

    /// Reorder rows: new row `i` is old row `order[i]`.
    pub fn reorder_rows(&mut self, order: &[usize]) {
        let mut old = std::mem::take(&mut self.rows);
        self.rows = order.iter().map(|&i| std::mem::take(&mut old[i])).collect();
        self.sorted = false;
    }

    /// Sort rows lexicographically and return the permutation applied
    /// (`order[new] = old`). Duplicates are kept.
    pub fn sort(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| compare(&self.rows[a], &self.rows[b]));
        self.reorder_rows(&order);
        self.sorted = self
            .rows
            .windows(2)
            .all(|w| compare(&w[0], &w[1]) == Ordering::Less);
        order
    }

    /// Sort and drop exact duplicates.
    pub fn sort_dedup(&mut self) {
        if self.sorted {
            return;
        }
        self.rows.sort_by(compare);
        self.rows.dedup();
        self.sorted = true;
    }

    /// Merge two sorted matrices, dropping rows present in both.
    pub fn merge_sorted(&self, other: &Matrix) -> Matrix {
        debug_assert!(self.sorted && other.sorted);
        debug_assert_eq!(self.width, other.width);
        let mut out = Matrix::with_capacity(self.width, self.nrows() + other.nrows());
        let (mut i, mut j) = (0, 0);
        while i < self.nrows() && j < other.nrows() {
            match compare(&self.rows[i], &other.rows[j]) {
                Ordering::Less => {
                    out.rows.push(self.rows[i].clone());
                    i += 1;
                }
                Ordering::Greater => {
                    out.rows.push(other.rows[j].clone());
                    j += 1;
                }
                Ordering::Equal => {
                    out.rows.push(self.rows[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        out.rows.extend(self.rows[i..].iter().cloned());
        out.rows.extend(other.rows[j..].iter().cloned());
        out.sorted = true;
        out
    }

    /// Binary-search membership; requires a sorted matrix.
    pub fn contains_sorted(&self, row: &Row) -> bool {
        debug_assert!(self.sorted);
        self.rows.binary_search_by(|r| compare(r, row)).is_ok()
    }

    /// Insert zero columns. `at` lists positions in the old column numbering,
    /// non-decreasing; a repeated position inserts several adjacent columns.
    pub fn insert_columns(&mut self, at: &[usize]) {
        debug_assert!(at.windows(2).all(|w| w[0] <= w[1]));
        let new_width = self.width + at.len();
        for r in &mut self.rows {
            let mut out = Vec::with_capacity(new_width);
            let mut k = 0;
            for (c, x) in r.drain(..).enumerate() {
                while k < at.len() && at[k] == c {
                    out.push(BigInt::zero());
                    k += 1;
                }
                out.push(x);
            }
            while k < at.len() {
                out.push(BigInt::zero());
                k += 1;
            }
            *r = out;
        }
        self.width = new_width;
        self.sorted = false;
    }

    /// Drop the columns whose flag is false.
    pub fn retain_columns(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.width);
        for r in &mut self.rows {
            let mut it = keep.iter();
            r.retain(|_| *it.next().unwrap_or(&true));
        }
        self.width = keep.iter().filter(|k| **k).count();
        self.sorted = false;
    }

    /// Column permutation: old column `c` moves to `perm[c]`.
    pub fn permute_columns(&mut self, perm: &[usize]) {
        debug_assert_eq!(perm.len(), self.width);
        for r in &mut self.rows {
            let mut out = vec![BigInt::zero(); self.width];
            for (c, x) in r.drain(..).enumerate() {
                out[perm[c]] = x;
            }
            *r = out;
        }
        self.sorted = false;
    }

    /// Largest coefficient bit size over all rows.
    pub fn max_bits(&self) -> u64 {
        self.rows.iter().map(max_bits).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Matrix {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests;
