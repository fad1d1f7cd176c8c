//! Sparse matrix storage restricted to a [`SparseMask`].

use super::{DenseArray, SparseMask};

/// Values stored only at the positions of a mask.
///
/// Invariant: `mask.len() == values.len()`, with `values[k]` belonging to
/// `mask.indices()[k]`. Positions outside the mask are implicitly zero and are
/// never touched by in-place operations.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray {
    mask: SparseMask,
    values: Vec<f64>,
}

impl SparseArray {
    /// Sparse array with no active entries.
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            mask: SparseMask::empty(rows, columns),
            values: Vec::new(),
        }
    }

    /// Builds a sparse array from `((row, column), value)` entries.
    ///
    /// Entries sharing a position are summed.
    ///
    /// # Panics
    ///
    /// Panics if an index is outside the shape.
    pub fn from_entries(rows: usize, columns: usize, mut entries: Vec<((usize, usize), f64)>) -> Self {
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut indices: Vec<(usize, usize)> = Vec::with_capacity(entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(entries.len());
        for (index, value) in entries {
            if indices.last() == Some(&index) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
            } else {
                indices.push(index);
                values.push(value);
            }
        }

        Self {
            mask: SparseMask::new(rows, columns, indices),
            values,
        }
    }

    /// Builds a sparse array from a mask and one value per masked position.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn with_mask(mask: SparseMask, values: Vec<f64>) -> Self {
        assert_eq!(
            mask.len(),
            values.len(),
            "Sparse values must have one entry per mask index"
        );
        Self { mask, values }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.mask.shape()
    }

    pub fn mask(&self) -> &SparseMask {
        &self.mask
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Iterates `((row, column), value)` pairs in mask order.
    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &f64)> {
        self.mask.indices().iter().zip(self.values.iter())
    }

    /// Value at a position, or zero if it is not active.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.mask
            .indices()
            .binary_search(&(row, column))
            .map(|k| self.values[k])
            .unwrap_or(0.0)
    }

    /// Drops every active entry.
    pub fn zero_fill(&mut self) {
        self.mask.clear();
        self.values.clear();
    }

    /// Replaces mask and values with a copy of `other`, reusing the buffers.
    pub fn assign(&mut self, other: &SparseArray) {
        self.check_shape(other);
        self.mask.clone_from(&other.mask);
        self.values.clone_from(&other.values);
    }

    /// `self += other`, keeping entries unique to either side.
    pub fn accumulate(&mut self, other: &SparseArray) {
        self.check_shape(other);

        let (a_idx, b_idx) = (self.mask.indices(), other.mask.indices());
        let mut merged = Vec::with_capacity(a_idx.len() + b_idx.len());
        let (mut i, mut j) = (0, 0);
        while i < a_idx.len() && j < b_idx.len() {
            if a_idx[i] < b_idx[j] {
                merged.push(self.values[i]);
                i += 1;
            } else if b_idx[j] < a_idx[i] {
                merged.push(other.values[j]);
                j += 1;
            } else {
                merged.push(self.values[i] + other.values[j]);
                i += 1;
                j += 1;
            }
        }
        merged.extend_from_slice(&self.values[i..]);
        merged.extend_from_slice(&other.values[j..]);

        self.mask = self.mask.union(&other.mask);
        self.values = merged;
    }

    pub fn scale(&mut self, factor: f64) {
        self.values.iter_mut().for_each(|v| *v *= factor);
    }

    /// Dense copy with zeros outside the mask.
    pub fn to_dense(&self) -> DenseArray {
        let (rows, columns) = self.shape();
        let mut dense = DenseArray::zeros(rows, columns);
        self.add_to(&mut dense);
        dense
    }

    /// Adds the active entries into `target`, leaving other positions untouched.
    pub fn add_to(&self, target: &mut DenseArray) {
        assert_eq!(
            target.shape(),
            self.shape(),
            "Arrays must have the same shape"
        );
        for (&(r, c), &v) in self.iter() {
            let k = target.offset(r, c);
            target.values_mut()[k] += v;
        }
    }

    /// Subtracts the active entries from `target`, leaving other positions untouched.
    pub fn sub_from(&self, target: &mut DenseArray) {
        assert_eq!(
            target.shape(),
            self.shape(),
            "Arrays must have the same shape"
        );
        for (&(r, c), &v) in self.iter() {
            let k = target.offset(r, c);
            target.values_mut()[k] -= v;
        }
    }

    fn check_shape(&self, other: &SparseArray) {
        assert_eq!(
            self.shape(),
            other.shape(),
            "Arrays must have the same shape"
        );
    }
}
