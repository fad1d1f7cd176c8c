//! Whole-model parameter and errors containers.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::gradient::Gradient;
use super::layer::{LayerErrors, LayerParameters};
use super::params_array::ParamsArray;
use crate::error::{NeuralError, Result};
use crate::utils::initializers::Initializer;

/// One [`LayerParameters`] per adjacent layer pair of a topology.
///
/// This is the long-lived model: it is read by every forward/backward pass and
/// mutated in place only by the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackedParameters {
    layers: Vec<LayerParameters>,
}

impl StackedParameters {
    pub fn new(layers: Vec<LayerParameters>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[LayerParameters] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> &LayerParameters {
        &self.layers[index]
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Every tensor, layer by layer, weights before biases.
    pub fn iter(&self) -> impl Iterator<Item = &ParamsArray> {
        self.layers.iter().flat_map(|l| l.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParamsArray> {
        self.layers.iter_mut().flat_map(|l| l.iter_mut())
    }

    pub fn params_count(&self) -> usize {
        self.layers.iter().map(LayerParameters::params_count).sum()
    }

    pub fn initialize(&mut self, initializer: &mut dyn Initializer, bias_init: f64) {
        for layer in &mut self.layers {
            layer.initialize(initializer, bias_init);
        }
    }

    /// Zero-filled parameters of the same shape.
    pub fn copy(&self) -> StackedParameters {
        StackedParameters {
            layers: self.layers.iter().map(LayerParameters::copy).collect(),
        }
    }

    /// Zero errors bundle with one gradient per tensor.
    pub fn errors_like(&self) -> StackedErrors {
        StackedErrors {
            layers: self.layers.iter().map(LayerParameters::errors_like).collect(),
        }
    }

    /// Applies `f` to corresponding tensors of two stacks of identical shape.
    ///
    /// # Panics
    ///
    /// Panics if the stacks differ in layer count, tensor count or tensor shape.
    pub fn zip<F>(&mut self, other: &StackedParameters, mut f: F)
    where
        F: FnMut(&mut ParamsArray, &ParamsArray),
    {
        assert_eq!(
            self.len(),
            other.len(),
            "Stacked parameters must have the same number of layers"
        );
        for (a, b) in self.layers.iter_mut().zip(&other.layers) {
            assert_eq!(
                a.iter().count(),
                b.iter().count(),
                "Layer bundles must have the same layout"
            );
            for (pa, pb) in a.iter_mut().zip(b.iter()) {
                assert_eq!(pa.shape(), pb.shape(), "Arrays must have the same shape");
                f(pa, pb);
            }
        }
    }

    /// Applies `f` to each tensor together with its gradient.
    ///
    /// # Panics
    ///
    /// Panics if `errors` does not mirror this stack.
    pub fn zip_errors<F>(&mut self, errors: &StackedErrors, mut f: F)
    where
        F: FnMut(&mut ParamsArray, &Gradient),
    {
        assert_eq!(
            self.len(),
            errors.len(),
            "Errors must have the same number of layers as the parameters"
        );
        for (params, layer_errors) in self.layers.iter_mut().zip(&errors.layers) {
            assert_eq!(
                params.iter().count(),
                layer_errors.iter().count(),
                "Layer bundles must have the same layout"
            );
            for (p, g) in params.iter_mut().zip(layer_errors.iter()) {
                assert_eq!(p.shape(), g.shape(), "Arrays must have the same shape");
                f(p, g);
            }
        }
    }

    /// Copies the values of another stack of identical shape.
    pub fn assign_values(&mut self, other: &StackedParameters) {
        self.zip(other, |a, b| a.assign(b));
    }

    /// Element-wise `self += other` over every tensor.
    pub fn assign_sum(&mut self, other: &StackedParameters) {
        self.zip(other, |a, b| a.values_mut().accumulate(b.values()));
    }

    /// Divides every value by `n`.
    pub fn assign_div(&mut self, n: usize) {
        for layer in &mut self.layers {
            layer.assign_div(n);
        }
    }

    /// Writes the whole parameter object as JSON.
    pub fn dump<W: Write>(&self, sink: W) -> Result<()> {
        serde_json::to_writer(sink, self)?;
        Ok(())
    }

    /// Reads a parameter object previously written by [`dump`](Self::dump).
    ///
    /// Tensor shapes are checked against each layer's sizes; a mismatch is a
    /// [`NeuralError::Config`].
    pub fn load<R: Read>(source: R) -> Result<Self> {
        let params: StackedParameters = serde_json::from_reader(source)?;
        for (index, layer) in params.layers.iter().enumerate() {
            layer.validate().map_err(|e| match e {
                NeuralError::Config(message) => {
                    NeuralError::config(format!("Layer {}: {}", index, message))
                }
                other => other,
            })?;
        }
        Ok(params)
    }
}

/// One [`LayerErrors`] per layer, mirroring a [`StackedParameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct StackedErrors {
    layers: Vec<LayerErrors>,
}

impl StackedErrors {
    pub fn new(layers: Vec<LayerErrors>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[LayerErrors] {
        &self.layers
    }

    pub fn layer_mut(&mut self, index: usize) -> &mut LayerErrors {
        &mut self.layers[index]
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gradient> {
        self.layers.iter().flat_map(|l| l.iter())
    }

    pub fn zero_fill(&mut self) {
        self.layers.iter_mut().for_each(LayerErrors::zero_fill);
    }

    /// Applies `f` to corresponding gradients of two bundles of identical shape.
    pub fn zip<F>(&mut self, other: &StackedErrors, mut f: F)
    where
        F: FnMut(&mut Gradient, &Gradient),
    {
        assert_eq!(
            self.len(),
            other.len(),
            "Stacked errors must have the same number of layers"
        );
        for (a, b) in self.layers.iter_mut().zip(&other.layers) {
            assert_eq!(
                a.iter().count(),
                b.iter().count(),
                "Layer bundles must have the same layout"
            );
            for (ga, gb) in a.iter_mut().zip(b.iter()) {
                f(ga, gb);
            }
        }
    }

    pub fn assign_values(&mut self, other: &StackedErrors) {
        self.zip(other, |a, b| a.assign(b));
    }

    pub fn assign_sum(&mut self, other: &StackedErrors) {
        self.zip(other, |a, b| a.accumulate(b));
    }

    pub fn assign_div(&mut self, n: usize) {
        for layer in &mut self.layers {
            layer.assign_div(n);
        }
    }
}
