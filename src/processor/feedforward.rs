//! Single-example processing through a stack of layers.

use crate::arrays::DenseArray;
use crate::layers::{ContextWindow, Layer};
use crate::parameters::{StackedErrors, StackedParameters};

/// Runs one example at a time through a stack of layers, bottom to top.
///
/// The layers are built once and reused for every example.
pub struct FeedforwardProcessor {
    layers: Vec<Box<dyn Layer>>,
    params_errors: Option<StackedErrors>,
}

impl FeedforwardProcessor {
    /// # Panics
    ///
    /// Panics if `layers` is empty.
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Self {
        assert!(!layers.is_empty(), "A processor needs at least one layer");
        Self {
            layers,
            params_errors: None,
        }
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Output of the top layer after the last forward pass.
    pub fn output(&self) -> &DenseArray {
        self.top().output()
    }

    /// Errors with respect to the input, if the last backward pass propagated them.
    pub fn input_errors(&self) -> Option<&DenseArray> {
        self.layers[0].input_errors()
    }

    pub fn forward_dense(&mut self, params: &StackedParameters, input: &DenseArray) -> &DenseArray {
        self.layers[0].set_input(input);
        self.run_forward(params)
    }

    /// Forward pass over the indices of the active input features.
    pub fn forward_sparse(&mut self, params: &StackedParameters, active_features: &[usize]) -> &DenseArray {
        self.layers[0].set_sparse_input(active_features);
        self.run_forward(params)
    }

    fn run_forward(&mut self, params: &StackedParameters) -> &DenseArray {
        assert_eq!(
            self.layers.len(),
            params.len(),
            "Processor must have one layer per parameter layer"
        );
        let window = ContextWindow::none();
        for i in 0..self.layers.len() {
            if i > 0 {
                let (below, rest) = self.layers.split_at_mut(i);
                rest[0].set_input(below[i - 1].output());
            }
            self.layers[i].forward(params.layer(i), &window);
        }
        self.output()
    }

    /// Backward pass for the last forward pass, given the errors with respect
    /// to the top-layer output.
    pub fn backward(
        &mut self,
        params: &StackedParameters,
        output_errors: &DenseArray,
        propagate_to_input: bool,
    ) -> &StackedErrors {
        let errors = self.params_errors.get_or_insert_with(|| params.errors_like());
        let window = ContextWindow::none();
        let top = self.layers.len() - 1;
        self.layers[top].set_output_errors(output_errors);

        for i in (0..self.layers.len()).rev() {
            if i < top {
                let (below, above) = self.layers.split_at_mut(i + 1);
                match above[0].input_errors() {
                    Some(e) => below[i].set_output_errors(e),
                    None => panic!("Layer {} did not propagate errors to its input", i + 1),
                }
            }
            let propagate = i > 0 || propagate_to_input;
            let layer_errors = self.layers[i].backward(params.layer(i), &window, propagate);
            errors.layer_mut(i).assign_values(layer_errors);
        }
        errors
    }

    fn top(&self) -> &dyn Layer {
        self.layers[self.layers.len() - 1].as_ref()
    }
}
