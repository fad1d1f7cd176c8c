//! Dense row-major matrix storage.
//!
//! Every parameter tensor and every dense gradient is backed by a `DenseArray`.
//! Vectors are represented as `n × 1` matrices.

use serde::{Deserialize, Serialize};

/// Row-major `rows × columns` matrix of `f64`.
///
/// # Example
///
/// ```
/// use neural_core::arrays::DenseArray;
///
/// let m = DenseArray::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
/// let x = DenseArray::column(vec![1.0, 1.0]);
/// let mut y = DenseArray::zeros(2, 1);
/// m.dot_into(&x, &mut y);
/// assert_eq!(y.values(), &[3.0, 7.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDenseArray")]
pub struct DenseArray {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

/// Unchecked wire form of a [`DenseArray`].
#[derive(Deserialize)]
struct RawDenseArray {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl TryFrom<RawDenseArray> for DenseArray {
    type Error = String;

    fn try_from(raw: RawDenseArray) -> Result<Self, Self::Error> {
        if raw.values.len() != raw.rows * raw.columns {
            return Err(format!(
                "Array of shape {}x{} holds {} values",
                raw.rows,
                raw.columns,
                raw.values.len()
            ));
        }
        Ok(Self {
            rows: raw.rows,
            columns: raw.columns,
            values: raw.values,
        })
    }
}

impl DenseArray {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            values: vec![0.0; rows * columns],
        }
    }

    /// Wraps existing row-major values.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != rows * columns`.
    pub fn from_vec(rows: usize, columns: usize, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            rows * columns,
            "Values length does not match shape {}x{}",
            rows,
            columns
        );
        Self {
            rows,
            columns,
            values,
        }
    }

    /// Column vector holding `values`.
    pub fn column(values: Vec<f64>) -> Self {
        let rows = values.len();
        Self::from_vec(rows, 1, values)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[self.offset(row, column)]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        let i = self.offset(row, column);
        self.values[i] = value;
    }

    pub(crate) fn offset(&self, row: usize, column: usize) -> usize {
        assert!(
            row < self.rows && column < self.columns,
            "Index ({}, {}) out of range for shape {}x{}",
            row,
            column,
            self.rows,
            self.columns
        );
        row * self.columns + column
    }

    pub fn zero_fill(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Copies the values of `other` into `self` without reallocating.
    pub fn assign(&mut self, other: &DenseArray) {
        self.check_shape(other);
        self.values.copy_from_slice(&other.values);
    }

    /// Element-wise `self += other`.
    pub fn accumulate(&mut self, other: &DenseArray) {
        self.check_shape(other);
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a += b;
        }
    }

    /// Element-wise `self -= other`.
    pub fn sub_assign(&mut self, other: &DenseArray) {
        self.check_shape(other);
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a -= b;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        self.values.iter_mut().for_each(|v| *v *= factor);
    }

    /// Euclidean norm over all entries.
    pub fn norm2(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// `out = self · vector`, where `vector` is a column of length `columns`.
    pub fn dot_into(&self, vector: &DenseArray, out: &mut DenseArray) {
        assert_eq!(
            vector.len(),
            self.columns,
            "Vector length must match matrix columns"
        );
        assert_eq!(out.len(), self.rows, "Output length must match matrix rows");
        assert_eq!(
            self.values.len(),
            self.rows * self.columns,
            "Values length does not match shape {}x{}",
            self.rows,
            self.columns
        );

        for (r, row) in self.values.chunks_exact(self.columns.max(1)).enumerate().take(self.rows) {
            out.values[r] = row.iter().zip(&vector.values).map(|(w, x)| w * x).sum();
        }
    }

    /// `out = selfᵀ · vector`, where `vector` is a column of length `rows`.
    pub fn t_dot_into(&self, vector: &DenseArray, out: &mut DenseArray) {
        assert_eq!(vector.len(), self.rows, "Vector length must match matrix rows");
        assert_eq!(
            out.len(),
            self.columns,
            "Output length must match matrix columns"
        );

        out.zero_fill();
        for r in 0..self.rows {
            let g = vector.values[r];
            if g == 0.0 {
                continue;
            }
            let row = &self.values[r * self.columns..(r + 1) * self.columns];
            for (o, w) in out.values.iter_mut().zip(row) {
                *o += w * g;
            }
        }
    }

    /// Outer product `a ⊗ b` of two vectors: an `a.len() × b.len()` matrix.
    pub fn outer(a: &DenseArray, b: &DenseArray) -> DenseArray {
        let mut values = Vec::with_capacity(a.len() * b.len());
        for &x in &a.values {
            values.extend(b.values.iter().map(|&y| x * y));
        }
        DenseArray::from_vec(a.len(), b.len(), values)
    }

    fn check_shape(&self, other: &DenseArray) {
        assert_eq!(
            self.shape(),
            other.shape(),
            "Arrays must have the same shape"
        );
    }
}
