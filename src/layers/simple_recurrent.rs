//! Elman-style recurrent layer.

use super::context_window::ContextWindow;
use super::input::LayerInput;
use super::r#trait::Layer;
use crate::arrays::DenseArray;
use crate::parameters::{Gradient, LayerErrors, LayerParameters};
use crate::utils::Activation;

/// Recurrent layer computing `y_t = f(W·x_t + R·y_{t-1} + b)`.
///
/// Reads `weights()[0]` as `W`, `weights()[1]` as `R` and `biases()[0]` as
/// `b`, the layout built by [`LayerParameters::simple_recurrent`].
///
/// `y_{t-1}` comes from the context window. When the window has no previous
/// state the recurrent product is not computed at all, the gradient of `R`
/// is zero and no recurrent errors are produced.
#[derive(Debug, Clone)]
pub struct SimpleRecurrentLayer {
    input_size: usize,
    output_size: usize,
    activation: Activation,
    input: LayerInput,
    output: DenseArray,
    output_errors: DenseArray,
    input_errors: DenseArray,
    has_input_errors: bool,
    recurrent_errors: DenseArray,
    has_recurrent_errors: bool,
    scratch: DenseArray,
    errors: Option<LayerErrors>,
}

impl SimpleRecurrentLayer {
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
            recurrent_errors: DenseArray::zeros(output_size, 1),
            has_recurrent_errors: false,
            scratch: DenseArray::zeros(output_size, 1),
            errors: None,
        }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl Layer for SimpleRecurrentLayer {
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

    fn forward(&mut self, params: &LayerParameters, window: &ContextWindow<'_>) {
        let weights = params.weights()[0].values();
        let recurrent = params.weights()[1].values();

        self.input.dot_into(weights, &mut self.output);
        if let Some(prev) = window.prev_output() {
            recurrent.dot_into(prev, &mut self.scratch);
            self.output.accumulate(&self.scratch);
        }
        self.output.accumulate(params.biases()[0].values());
        self.activation.apply(&mut self.output);
    }

    fn backward(
        &mut self,
        params: &LayerParameters,
        window: &ContextWindow<'_>,
        propagate_to_input: bool,
    ) -> &LayerErrors {
        let mut delta = self.output_errors.clone();
        if let Some(next_errors) = window.next_recurrent_errors() {
            delta.accumulate(next_errors);
        }
        self.activation.backprop(&self.output, &mut delta);

        let weights = &params.weights()[0];
        let recurrent = &params.weights()[1];
        let errors = self.errors.get_or_insert_with(|| params.errors_like());

        errors.weights[0] =
            self.input
                .weight_gradient(&delta, self.input_size, weights.gradient_kind());

        match window.prev_output() {
            Some(prev) => {
                errors.weights[1] = Gradient::Dense(DenseArray::outer(&delta, prev));
                recurrent
                    .values()
                    .t_dot_into(&delta, &mut self.recurrent_errors);
                self.has_recurrent_errors = true;
            }
            None => {
                errors.weights[1].zero_fill();
                self.has_recurrent_errors = false;
            }
        }

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

    fn recurrent_errors(&self) -> Option<&DenseArray> {
        self.has_recurrent_errors.then_some(&self.recurrent_errors)
    }
}
