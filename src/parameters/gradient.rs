//! Dense or sparse gradient of one parameter tensor.

use crate::arrays::{DenseArray, SparseArray};

/// Which representation a tensor's gradients take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GradientKind {
    Dense,
    Sparse,
}

/// Delta produced by one backward pass for one parameter tensor.
///
/// A sparse gradient carries its own mask: every in-place operation on it is
/// restricted to the masked positions.
#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    Dense(DenseArray),
    Sparse(SparseArray),
}

impl Gradient {
    /// Zero gradient of the given kind and shape.
    pub fn zeros(kind: GradientKind, rows: usize, columns: usize) -> Self {
        match kind {
            GradientKind::Dense => Gradient::Dense(DenseArray::zeros(rows, columns)),
            GradientKind::Sparse => Gradient::Sparse(SparseArray::zeros(rows, columns)),
        }
    }

    pub fn kind(&self) -> GradientKind {
        match self {
            Gradient::Dense(_) => GradientKind::Dense,
            Gradient::Sparse(_) => GradientKind::Sparse,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            Gradient::Dense(d) => d.shape(),
            Gradient::Sparse(s) => s.shape(),
        }
    }

    /// Dense view, materialising a sparse gradient.
    pub fn to_dense(&self) -> DenseArray {
        match self {
            Gradient::Dense(d) => d.clone(),
            Gradient::Sparse(s) => s.to_dense(),
        }
    }

    pub fn zero_fill(&mut self) {
        match self {
            Gradient::Dense(d) => d.zero_fill(),
            Gradient::Sparse(s) => s.zero_fill(),
        }
    }

    /// Copies `other` into `self`, reusing storage when both have the same kind.
    pub fn assign(&mut self, other: &Gradient) {
        self.check_shape(other);
        match (&mut *self, other) {
            (Gradient::Dense(a), Gradient::Dense(b)) => a.assign(b),
            (Gradient::Sparse(a), Gradient::Sparse(b)) => a.assign(b),
            (this, _) => *this = other.clone(),
        }
    }

    /// `self += other`.
    ///
    /// Sparse into dense adds only at the mask; dense into sparse converts the
    /// storage to dense; sparse into sparse keeps the union of both masks.
    pub fn accumulate(&mut self, other: &Gradient) {
        self.check_shape(other);
        match (&mut *self, other) {
            (Gradient::Dense(a), Gradient::Dense(b)) => a.accumulate(b),
            (Gradient::Dense(a), Gradient::Sparse(b)) => b.add_to(a),
            (Gradient::Sparse(a), Gradient::Sparse(b)) => a.accumulate(b),
            (Gradient::Sparse(a), Gradient::Dense(b)) => {
                let mut dense = b.clone();
                a.add_to(&mut dense);
                *self = Gradient::Dense(dense);
            }
        }
    }

    pub fn scale(&mut self, factor: f64) {
        match self {
            Gradient::Dense(d) => d.scale(factor),
            Gradient::Sparse(s) => s.scale(factor),
        }
    }

    fn check_shape(&self, other: &Gradient) {
        assert_eq!(
            self.shape(),
            other.shape(),
            "Gradients must have the same shape"
        );
    }
}
