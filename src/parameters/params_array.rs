//! A single trainable parameter tensor.

use serde::{Deserialize, Serialize};

use super::gradient::{Gradient, GradientKind};
use crate::arrays::DenseArray;
use crate::error::{NeuralError, Result};
use crate::optimizers::{SupportStructure, SupportStructureKind};
use crate::utils::initializers::Initializer;

/// One named, mutable numeric array of a trainable model.
///
/// The values are always stored densely. `gradient_kind` tells which
/// representation its gradients take: tensors fed by a set of active features
/// (embedding-style inputs) receive sparse gradients.
///
/// The optimizer state ("support structure") is attached lazily by the first
/// update method that touches the tensor and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsArray {
    id: usize,
    values: DenseArray,
    gradient_kind: GradientKind,
    #[serde(skip)]
    support_structure: Option<SupportStructure>,
}

impl ParamsArray {
    pub fn new(id: usize, rows: usize, columns: usize, gradient_kind: GradientKind) -> Self {
        Self {
            id,
            values: DenseArray::zeros(rows, columns),
            gradient_kind,
            support_structure: None,
        }
    }

    /// Position within the owning bundle.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.shape()
    }

    pub fn gradient_kind(&self) -> GradientKind {
        self.gradient_kind
    }

    pub fn values(&self) -> &DenseArray {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut DenseArray {
        &mut self.values
    }

    pub fn zero_fill(&mut self) {
        self.values.zero_fill();
    }

    /// Copies the values of another tensor of the same shape.
    pub fn assign(&mut self, other: &ParamsArray) {
        self.values.assign(&other.values);
    }

    pub fn initialize(&mut self, initializer: &mut dyn Initializer) {
        initializer.initialize(&mut self.values);
    }

    /// Fills every value with a constant.
    pub fn fill(&mut self, value: f64) {
        self.values.values_mut().iter_mut().for_each(|v| *v = value);
    }

    /// Zero-filled tensor of the same shape, id and gradient kind.
    pub fn copy(&self) -> ParamsArray {
        let (rows, columns) = self.shape();
        ParamsArray::new(self.id, rows, columns, self.gradient_kind)
    }

    /// Zero gradient matching this tensor.
    pub fn errors_like(&self) -> Gradient {
        let (rows, columns) = self.shape();
        Gradient::zeros(self.gradient_kind, rows, columns)
    }

    pub fn support_structure_kind(&self) -> Option<SupportStructureKind> {
        self.support_structure.as_ref().map(|s| s.kind())
    }

    /// Fails if a support structure of a different kind is already attached.
    pub fn check_support_structure(&self, kind: SupportStructureKind) -> Result<()> {
        match self.support_structure_kind() {
            Some(attached) if attached != kind => Err(NeuralError::IncompatibleSupportStructure {
                params_id: self.id,
                attached,
                requested: kind,
            }),
            _ => Ok(()),
        }
    }

    /// Returns the attached support structure, creating one of `kind` on first request.
    pub fn support_structure(&mut self, kind: SupportStructureKind) -> Result<&mut SupportStructure> {
        self.check_support_structure(kind)?;
        let (rows, columns) = self.shape();
        Ok(self
            .support_structure
            .get_or_insert_with(|| SupportStructure::new(kind, rows, columns)))
    }

    /// Subtracts a delta: everywhere if dense, only at the mask if sparse.
    ///
    /// # Panics
    ///
    /// Panics if the delta shape differs from the tensor shape.
    pub fn apply_delta(&mut self, delta: &Gradient) {
        match delta {
            Gradient::Dense(d) => self.values.sub_assign(d),
            Gradient::Sparse(s) => s.sub_from(&mut self.values),
        }
    }
}
