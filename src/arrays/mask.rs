//! Ordered set of active `(row, column)` positions of a matrix.

/// Sorted, de-duplicated list of active positions within a `rows × columns` shape.
///
/// A mask is the index half of a [`SparseArray`](super::SparseArray): every
/// in-place operation on sparse data is restricted to the positions listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseMask {
    rows: usize,
    columns: usize,
    indices: Vec<(usize, usize)>,
}

impl SparseMask {
    /// Empty mask over the given shape.
    pub fn empty(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            indices: Vec::new(),
        }
    }

    /// Builds a mask from arbitrary indices, sorting them and dropping duplicates.
    ///
    /// # Panics
    ///
    /// Panics if any index falls outside `rows × columns`.
    pub fn new(rows: usize, columns: usize, mut indices: Vec<(usize, usize)>) -> Self {
        for &(r, c) in &indices {
            assert!(
                r < rows && c < columns,
                "Mask index ({}, {}) out of range for shape {}x{}",
                r,
                c,
                rows,
                columns
            );
        }
        indices.sort_unstable();
        indices.dedup();
        Self {
            rows,
            columns,
            indices,
        }
    }

    /// Mask covering every row for the given columns, as produced by a weight
    /// matrix fed by a set of active input features.
    pub fn from_columns(rows: usize, columns: usize, active: &[usize]) -> Self {
        let mut cols = active.to_vec();
        cols.sort_unstable();
        cols.dedup();
        let indices = (0..rows)
            .flat_map(|r| cols.iter().map(move |&c| (r, c)))
            .collect();
        Self::new(rows, columns, indices)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[(usize, usize)] {
        &self.indices
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        self.indices.binary_search(&(row, column)).is_ok()
    }

    /// Union of two masks over the same shape, preserving order.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn union(&self, other: &SparseMask) -> SparseMask {
        assert_eq!(
            self.shape(),
            other.shape(),
            "Masks must have the same shape"
        );

        let mut merged = Vec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            let (a, b) = (self.indices[i], other.indices[j]);
            if a < b {
                merged.push(a);
                i += 1;
            } else if b < a {
                merged.push(b);
                j += 1;
            } else {
                merged.push(a);
                i += 1;
                j += 1;
            }
        }
        merged.extend_from_slice(&self.indices[i..]);
        merged.extend_from_slice(&other.indices[j..]);

        SparseMask {
            rows: self.rows,
            columns: self.columns,
            indices: merged,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.indices.clear();
    }
}
