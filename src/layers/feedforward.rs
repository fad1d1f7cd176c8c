//! Feed-forward (fully connected) layer implementation
//!
//! This module provides a FeedforwardLayer that performs the transformation
//! `y = f(W·x + b)` on a dense or active-feature input.

use super::context_window::ContextWindow;
use super::input::LayerInput;
use super::r#trait::Layer;
use crate::arrays::DenseArray;
use crate::parameters::{Gradient, LayerErrors, LayerParameters};
use crate::utils::Activation;

/// Fully connected layer.
///
/// Reads `params.weights()[0]` as `W` (output_size × input_size) and
/// `params.biases()[0]` as `b` (output_size × 1), the layout built by
/// [`LayerParameters::feedforward`].
///
/// With a sparse input only the columns of the active features take part in
/// the product and, if the weights were declared with sparse gradients, the
/// weight gradient only covers those columns.
///
/// # Example
///
/// ```
/// use neural_core::arrays::DenseArray;
/// use neural_core::layers::{ContextWindow, FeedforwardLayer, Layer};
/// use neural_core::parameters::LayerParameters;
/// use neural_core::utils::Activation;
///
/// let mut params = LayerParameters::feedforward(2, 1, false);
/// params.iter_mut().for_each(|p| p.fill(1.0));
///
/// let mut layer = FeedforwardLayer::new(2, 1, Activation::Identity);
/// layer.set_input(&DenseArray::column(vec![1.0, 2.0]));
/// layer.forward(&params, &ContextWindow::none());
/// assert_eq!(layer.output().values(), &[4.0]);
/// ```
#[derive(Debug, Clone)]
pub struct FeedforwardLayer {
    input_size: usize,
    output_size: usize,
    activation: Activation,
    input: LayerInput,
    output: DenseArray,
    output_errors: DenseArray,
    input_errors: DenseArray,
    has_input_errors: bool,
    errors: Option<LayerErrors>,
}

impl FeedforwardLayer {
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Self {
            input_size,
            output_size,
            activation,
            input: LayerInput::zeros(input_size),
            output: DenseArray::zeros(output_size, 1),
            output_errors: DenseArray::zeros(output_size, 1),
            input_errors: DenseArray::zeros(input_size, 1),
            has_input_errors: false,
            errors: None,
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl Layer for FeedforwardLayer {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn set_input(&mut self, input: &DenseArray) {
        self.input.set_dense(input, self.input_size);
    }

    fn set_sparse_input(&mut self, active_features: &[usize]) {
        self.input.set_sparse(active_features, self.input_size);
    }

    fn forward(&mut self, params: &LayerParameters, _window: &ContextWindow<'_>) {
        let weights = params.weights()[0].values();
        let biases = params.biases()[0].values();

        self.input.dot_into(weights, &mut self.output);
        self.output.accumulate(biases);
        self.activation.apply(&mut self.output);
    }

    fn backward(
        &mut self,
        params: &LayerParameters,
        _window: &ContextWindow<'_>,
        propagate_to_input: bool,
    ) -> &LayerErrors {
        let mut delta = self.output_errors.clone();
        self.activation.backprop(&self.output, &mut delta);

        let weights = &params.weights()[0];
        let errors = self.errors.get_or_insert_with(|| params.errors_like());
        errors.weights[0] =
            self.input
                .weight_gradient(&delta, self.input_size, weights.gradient_kind());

        self.has_input_errors = propagate_to_input && self.input.is_dense();
        if self.has_input_errors {
            weights.values().t_dot_into(&delta, &mut self.input_errors);
        }

        errors.biases[0] = Gradient::Dense(delta);
        errors
    }

    fn output(&self) -> &DenseArray {
        &self.output
    }

    fn set_output_errors(&mut self, errors: &DenseArray) {
        assert_eq!(
            errors.len(),
            self.output_size,
            "Output errors length must match the layer output size"
        );
        self.output_errors.values_mut().copy_from_slice(errors.values());
    }

    fn input_errors(&self) -> Option<&DenseArray> {
        self.has_input_errors.then_some(&self.input_errors)
    }
}
