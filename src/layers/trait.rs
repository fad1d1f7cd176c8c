//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait that all layer types must implement.
//! A layer owns its transient buffers (input, output, errors) but never its
//! parameters: those are passed in on every call so that one
//! [`StackedParameters`](crate::parameters::StackedParameters) can be shared by
//! every layer instance of every time step.

use super::context_window::ContextWindow;
use crate::arrays::DenseArray;
use crate::parameters::{LayerErrors, LayerParameters};

/// Core trait for neural network layers.
///
/// All layer types implement this trait to provide a uniform interface for
/// forward and backward propagation inside a processor.
///
/// # Reuse
///
/// Layer instances are pooled and reused across examples. Every call to
/// [`forward`](Self::forward) and [`backward`](Self::backward) must overwrite
/// the transient state it reads later instead of relying on leftover values.
///
/// # Example
///
/// ```ignore
/// layer.set_input(&features);
/// layer.forward(&params, &ContextWindow::none());
///
/// layer.set_output_errors(&gold_errors);
/// let errors = layer.backward(&params, &ContextWindow::none(), false);
/// ```
pub trait Layer {
    /// Get the input size of the layer.
    fn input_size(&self) -> usize;

    /// Get the output size of the layer.
    fn output_size(&self) -> usize;

    /// Sets a dense input column of length `input_size`.
    ///
    /// # Panics
    ///
    /// Panics if the input length differs from the layer's input size.
    fn set_input(&mut self, input: &DenseArray);

    /// Sets a sparse input made of the indices of the active (value 1) features.
    ///
    /// # Panics
    ///
    /// Panics if a feature index is not below the layer's input size.
    fn set_sparse_input(&mut self, active_features: &[usize]);

    /// Forward propagation through the layer.
    ///
    /// Recurrent layers read the previous time step through `window`;
    /// feed-forward layers ignore it.
    fn forward(&mut self, params: &LayerParameters, window: &ContextWindow<'_>);

    /// Backward propagation through the layer.
    ///
    /// Must be called after [`set_output_errors`](Self::set_output_errors).
    /// Returns the gradients of every tensor of `params`, in the same order.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameters used in the matching forward pass
    /// * `window` - Temporal neighbours; the next step must already have run
    ///   its backward pass
    /// * `propagate_to_input` - Whether to compute [`input_errors`](Self::input_errors)
    fn backward(
        &mut self,
        params: &LayerParameters,
        window: &ContextWindow<'_>,
        propagate_to_input: bool,
    ) -> &LayerErrors;

    /// Activated output of the last forward pass.
    fn output(&self) -> &DenseArray;

    /// Sets the errors with respect to the output (length `output_size`).
    fn set_output_errors(&mut self, errors: &DenseArray);

    /// Errors with respect to the dense input, if the last backward pass
    /// propagated them.
    fn input_errors(&self) -> Option<&DenseArray>;

    /// Errors with respect to the previous time step's output, if the last
    /// backward pass had a previous state to propagate them to.
    fn recurrent_errors(&self) -> Option<&DenseArray> {
        None
    }
}
