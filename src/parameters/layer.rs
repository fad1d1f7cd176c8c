//! Weight and bias tensors of one layer transition, and the matching errors bundle.

use serde::{Deserialize, Serialize};

use super::gradient::{Gradient, GradientKind};
use super::params_array::ParamsArray;
use crate::error::{NeuralError, Result};
use crate::utils::initializers::Initializer;

/// Ordered bundle of the weight and bias tensors of one layer transition.
///
/// The order of the tensors is part of the layer's contract: a layer reads
/// `weights[k]` and produces `LayerErrors::weights[k]` for the same role, which
/// keeps live parameters and errors aligned index by index.
///
/// # Example
///
/// ```
/// use neural_core::parameters::LayerParameters;
///
/// let params = LayerParameters::simple_recurrent(4, 3, false);
/// assert_eq!(params.weights().len(), 2);
/// assert_eq!(params.biases().len(), 1);
/// assert_eq!(params.params_count(), 4 * 3 + 3 * 3 + 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerParameters {
    input_size: usize,
    output_size: usize,
    weights: Vec<ParamsArray>,
    biases: Vec<ParamsArray>,
}

impl LayerParameters {
    /// Builds a bundle from explicit weight and bias shapes.
    ///
    /// Ids are assigned in order, weights first.
    pub fn new(
        input_size: usize,
        output_size: usize,
        weights: &[(usize, usize, GradientKind)],
        biases: &[(usize, usize)],
    ) -> Self {
        let weights: Vec<ParamsArray> = weights
            .iter()
            .enumerate()
            .map(|(id, &(rows, columns, kind))| ParamsArray::new(id, rows, columns, kind))
            .collect();
        let offset = weights.len();
        let biases = biases
            .iter()
            .enumerate()
            .map(|(k, &(rows, columns))| {
                ParamsArray::new(offset + k, rows, columns, GradientKind::Dense)
            })
            .collect();

        Self {
            input_size,
            output_size,
            weights,
            biases,
        }
    }

    /// `W` (output × input) and `b` (output × 1).
    ///
    /// With `sparse_input` the weights receive sparse gradients covering only
    /// the columns of the active input features.
    pub fn feedforward(input_size: usize, output_size: usize, sparse_input: bool) -> Self {
        Self::new(
            input_size,
            output_size,
            &[(output_size, input_size, Self::input_gradient_kind(sparse_input))],
            &[(output_size, 1)],
        )
    }

    /// `W` (output × input), recurrent `R` (output × output) and `b` (output × 1).
    ///
    /// `sparse_input` only affects `W`; `R` always receives dense gradients.
    pub fn simple_recurrent(input_size: usize, output_size: usize, sparse_input: bool) -> Self {
        Self::new(
            input_size,
            output_size,
            &[
                (output_size, input_size, Self::input_gradient_kind(sparse_input)),
                (output_size, output_size, GradientKind::Dense),
            ],
            &[(output_size, 1)],
        )
    }

    fn input_gradient_kind(sparse_input: bool) -> GradientKind {
        if sparse_input {
            GradientKind::Sparse
        } else {
            GradientKind::Dense
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn weights(&self) -> &[ParamsArray] {
        &self.weights
    }

    pub fn biases(&self) -> &[ParamsArray] {
        &self.biases
    }

    /// Weights followed by biases.
    pub fn iter(&self) -> impl Iterator<Item = &ParamsArray> {
        self.weights.iter().chain(self.biases.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParamsArray> {
        self.weights.iter_mut().chain(self.biases.iter_mut())
    }

    pub fn params_count(&self) -> usize {
        self.iter().map(|p| p.values().len()).sum()
    }

    /// Fills the weights from `initializer` and every bias with `bias_init`.
    pub fn initialize(&mut self, initializer: &mut dyn Initializer, bias_init: f64) {
        for w in &mut self.weights {
            w.initialize(initializer);
        }
        for b in &mut self.biases {
            b.fill(bias_init);
        }
    }

    /// Zero-filled bundle of the same shape.
    pub fn copy(&self) -> LayerParameters {
        LayerParameters {
            input_size: self.input_size,
            output_size: self.output_size,
            weights: self.weights.iter().map(ParamsArray::copy).collect(),
            biases: self.biases.iter().map(ParamsArray::copy).collect(),
        }
    }

    /// Zero errors bundle mirroring this one.
    pub fn errors_like(&self) -> LayerErrors {
        LayerErrors {
            weights: self.weights.iter().map(ParamsArray::errors_like).collect(),
            biases: self.biases.iter().map(ParamsArray::errors_like).collect(),
        }
    }

    /// Copies the values of a bundle of identical shape.
    pub fn assign_values(&mut self, other: &LayerParameters) {
        self.check_same_layout(other.weights.len(), other.biases.len());
        for (a, b) in self.iter_mut().zip(other.iter()) {
            a.assign(b);
        }
    }

    /// Element-wise `self += other` over every tensor.
    pub fn assign_sum(&mut self, other: &LayerParameters) {
        self.check_same_layout(other.weights.len(), other.biases.len());
        for (a, b) in self.iter_mut().zip(other.iter()) {
            a.values_mut().accumulate(b.values());
        }
    }

    /// Divides every value by `n`.
    pub fn assign_div(&mut self, n: usize) {
        assert!(n > 0, "Cannot divide parameters by zero");
        let factor = 1.0 / n as f64;
        self.iter_mut().for_each(|p| p.values_mut().scale(factor));
    }

    /// Checks tensor shapes and ids against the declared layer sizes.
    ///
    /// `weights[0]` maps the input, any further weight tensor is recurrent.
    pub fn validate(&self) -> Result<()> {
        if self.weights.is_empty() {
            return Err(NeuralError::config("Layer must have at least one weight tensor"));
        }
        let expected = self
            .weights
            .iter()
            .enumerate()
            .map(|(k, _)| {
                let columns = if k == 0 { self.input_size } else { self.output_size };
                (self.output_size, columns)
            })
            .chain(self.biases.iter().map(|_| (self.output_size, 1)));

        for (position, (params, shape)) in self.iter().zip(expected).enumerate() {
            if params.shape() != shape {
                return Err(NeuralError::config(format!(
                    "Tensor {} has shape {:?}, expected {:?} for a {} -> {} layer",
                    position,
                    params.shape(),
                    shape,
                    self.input_size,
                    self.output_size
                )));
            }
            if params.id() != position {
                return Err(NeuralError::config(format!(
                    "Tensor {} carries id {}",
                    position,
                    params.id()
                )));
            }
        }
        Ok(())
    }

    fn check_same_layout(&self, weights: usize, biases: usize) {
        assert!(
            self.weights.len() == weights && self.biases.len() == biases,
            "Layer bundles must have the same layout"
        );
    }
}

/// Gradients for every tensor of a [`LayerParameters`], in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerErrors {
    pub weights: Vec<Gradient>,
    pub biases: Vec<Gradient>,
}

impl LayerErrors {
    pub fn iter(&self) -> impl Iterator<Item = &Gradient> {
        self.weights.iter().chain(self.biases.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Gradient> {
        self.weights.iter_mut().chain(self.biases.iter_mut())
    }

    pub fn zero_fill(&mut self) {
        self.iter_mut().for_each(Gradient::zero_fill);
    }

    pub fn assign_values(&mut self, other: &LayerErrors) {
        self.check_same_layout(other);
        for (a, b) in self.iter_mut().zip(other.iter()) {
            a.assign(b);
        }
    }

    pub fn assign_sum(&mut self, other: &LayerErrors) {
        self.check_same_layout(other);
        for (a, b) in self.iter_mut().zip(other.iter()) {
            a.accumulate(b);
        }
    }

    pub fn assign_div(&mut self, n: usize) {
        let factor = 1.0 / n as f64;
        self.iter_mut().for_each(|g| g.scale(factor));
    }

    fn check_same_layout(&self, other: &LayerErrors) {
        assert!(
            self.weights.len() == other.weights.len() && self.biases.len() == other.biases.len(),
            "Layer bundles must have the same layout"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::initializers::GlorotInitializer;

    #[test]
    fn test_validate_constructed_layers() {
        assert!(LayerParameters::feedforward(5, 3, true).validate().is_ok());
        assert!(LayerParameters::simple_recurrent(5, 3, false).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_recurrent_shape() {
        let params = LayerParameters::new(
            4,
            3,
            &[(3, 4, GradientKind::Dense), (3, 4, GradientKind::Dense)],
            &[(3, 1)],
        );
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("Tensor 1 has shape (3, 4)"));
    }

    #[test]
    fn test_parameter_sum_and_div() {
        let mut a = LayerParameters::feedforward(2, 1, false);
        a.iter_mut().for_each(|p| p.fill(1.0));
        let mut b = LayerParameters::feedforward(2, 1, false);
        b.iter_mut().for_each(|p| p.fill(3.0));

        a.assign_sum(&b);
        a.assign_div(2);
        assert!(a.iter().all(|p| p.values().values().iter().all(|&v| v == 2.0)));
    }

    #[test]
    fn test_feedforward_layout() {
        let params = LayerParameters::feedforward(5, 3, false);
        assert_eq!(params.weights()[0].shape(), (3, 5));
        assert_eq!(params.biases()[0].shape(), (3, 1));
        assert_eq!(params.biases()[0].id(), 1);
    }

    #[test]
    fn test_initialize_fills_biases_with_constant() {
        let mut params = LayerParameters::feedforward(10, 4, false);
        let mut init = GlorotInitializer::new(42, 1.0);
        params.initialize(&mut init, 0.1);

        assert!(params.weights()[0].values().values().iter().any(|&v| v != 0.0));
        assert!(params.biases()[0]
            .values()
            .values()
            .iter()
            .all(|&v| v == 0.1));
    }

    #[test]
    fn test_errors_like_is_zero_and_same_shape() {
        let params = LayerParameters::feedforward(6, 2, true);
        let errors = params.errors_like();
        assert_eq!(errors.weights[0].kind(), GradientKind::Sparse);
        assert_eq!(errors.biases[0].kind(), GradientKind::Dense);
        assert!(errors.biases[0].to_dense().values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_copy_is_zero_filled() {
        let mut params = LayerParameters::simple_recurrent(2, 2, false);
        let mut init = GlorotInitializer::new(7, 1.0);
        params.initialize(&mut init, 1.0);

        let copy = params.copy();
        assert!(copy.iter().all(|p| p.values().values().iter().all(|&v| v == 0.0)));
        assert_eq!(copy.params_count(), params.params_count());
    }
}
