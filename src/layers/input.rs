//! Dense or active-feature input shared by the layer implementations.

use crate::arrays::{DenseArray, SparseArray, SparseMask};
use crate::parameters::{Gradient, GradientKind};

#[derive(Debug, Clone)]
pub(crate) enum LayerInput {
    Dense(DenseArray),
    /// Sorted, deduplicated indices of the features whose value is 1.
    Sparse(Vec<usize>),
}

impl LayerInput {
    pub(crate) fn zeros(size: usize) -> Self {
        LayerInput::Dense(DenseArray::zeros(size, 1))
    }

    pub(crate) fn set_dense(&mut self, input: &DenseArray, size: usize) {
        assert_eq!(
            input.len(),
            size,
            "Input length must match the layer input size"
        );
        match self {
            LayerInput::Dense(current) if current.shape() == input.shape() => current.assign(input),
            _ => *self = LayerInput::Dense(input.clone()),
        }
    }

    pub(crate) fn set_sparse(&mut self, active_features: &[usize], size: usize) {
        for &feature in active_features {
            assert!(
                feature < size,
                "Active feature {} out of range for input size {}",
                feature,
                size
            );
        }
        let mut features = match std::mem::replace(self, LayerInput::Sparse(Vec::new())) {
            LayerInput::Sparse(mut buffer) => {
                buffer.clear();
                buffer
            }
            LayerInput::Dense(_) => Vec::with_capacity(active_features.len()),
        };
        features.extend_from_slice(active_features);
        features.sort_unstable();
        features.dedup();
        *self = LayerInput::Sparse(features);
    }

    pub(crate) fn is_dense(&self) -> bool {
        matches!(self, LayerInput::Dense(_))
    }

    /// `out = weights · input`.
    pub(crate) fn dot_into(&self, weights: &DenseArray, out: &mut DenseArray) {
        match self {
            LayerInput::Dense(x) => weights.dot_into(x, out),
            LayerInput::Sparse(features) => {
                let columns = weights.columns();
                for (r, o) in out.values_mut().iter_mut().enumerate() {
                    let row = &weights.values()[r * columns..(r + 1) * columns];
                    *o = features.iter().map(|&c| row[c]).sum();
                }
            }
        }
    }

    /// Gradient of the weights fed by this input: `delta ⊗ input`.
    ///
    /// With a sparse input and a sparse-gradient tensor only the active
    /// columns are represented.
    pub(crate) fn weight_gradient(
        &self,
        delta: &DenseArray,
        input_size: usize,
        kind: GradientKind,
    ) -> Gradient {
        match self {
            LayerInput::Dense(x) => Gradient::Dense(DenseArray::outer(delta, x)),
            LayerInput::Sparse(features) => {
                let mask = SparseMask::from_columns(delta.len(), input_size, features);
                let values = mask.indices().iter().map(|&(r, _)| delta.values()[r]).collect();
                let sparse = SparseArray::with_mask(mask, values);
                match kind {
                    GradientKind::Sparse => Gradient::Sparse(sparse),
                    GradientKind::Dense => Gradient::Dense(sparse.to_dense()),
                }
            }
        }
    }
}
