//! Architecture configuration structures
//!
//! This module provides configuration structures for defining layer stacks via
//! JSON configuration files, and builds the matching parameters, layers and
//! processors from them. This enables architecture experimentation without
//! code changes.

use std::fs;

use serde::Deserialize;
use tracing::info;

use crate::error::{NeuralError, Result};
use crate::layers::{FeedforwardLayer, Layer, SimpleRecurrentLayer};
use crate::parameters::{LayerParameters, StackedParameters};
use crate::processor::{FeedforwardProcessor, SequenceProcessor};
use crate::utils::initializers::GlorotInitializer;
use crate::utils::Activation;

/// How a layer connects its input (and, for recurrent layers, its own past
/// output) to its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    /// `y = f(W·x + b)`
    Feedforward,
    /// `y_t = f(W·x_t + R·y_{t-1} + b)`
    SimpleRecurrent,
}

/// Configuration for a single layer in the stack.
///
/// # Examples
///
/// ```json
/// {
///   "connection": "simple_recurrent",
///   "input_size": 100,
///   "output_size": 32,
///   "activation": "tanh",
///   "sparse_input": true
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    /// "feedforward" or "simple_recurrent"
    pub connection: Connection,

    /// Number of input features
    pub input_size: usize,

    /// Number of output features
    pub output_size: usize,

    /// "identity" (default), "sigmoid", "tanh" or "relu"
    #[serde(default)]
    pub activation: Activation,

    /// Whether the layer reads active-feature indices instead of a dense
    /// vector. Only allowed on the first layer.
    #[serde(default)]
    pub sparse_input: bool,
}

impl LayerConfig {
    fn build_parameters(&self) -> LayerParameters {
        match self.connection {
            Connection::Feedforward => {
                LayerParameters::feedforward(self.input_size, self.output_size, self.sparse_input)
            }
            Connection::SimpleRecurrent => LayerParameters::simple_recurrent(
                self.input_size,
                self.output_size,
                self.sparse_input,
            ),
        }
    }

    fn build_layer(&self) -> Box<dyn Layer> {
        match self.connection {
            Connection::Feedforward => Box::new(FeedforwardLayer::new(
                self.input_size,
                self.output_size,
                self.activation,
            )),
            Connection::SimpleRecurrent => Box::new(SimpleRecurrentLayer::new(
                self.input_size,
                self.output_size,
                self.activation,
            )),
        }
    }
}

/// Configuration for the entire layer stack.
///
/// Layers are applied in the order they appear in the configuration.
///
/// # Example
///
/// ```json
/// {
///   "seed": 42,
///   "layers": [
///     { "connection": "simple_recurrent", "input_size": 100, "output_size": 32,
///       "activation": "tanh", "sparse_input": true },
///     { "connection": "feedforward", "input_size": 32, "output_size": 5 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureConfig {
    /// Sequence of layer configurations defining the network structure
    pub layers: Vec<LayerConfig>,

    /// Seed of the weight initializer (default 42)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Glorot gain applied to every weight tensor (default 1.0)
    #[serde(default = "default_gain")]
    pub init_gain: f64,

    /// Initial value of every bias (default 0.0)
    #[serde(default)]
    pub bias_init: f64,
}

fn default_seed() -> u64 {
    42
}

fn default_gain() -> f64 {
    1.0
}

/// Loads an architecture configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into an
/// `ArchitectureConfig` and validates the layer connections.
///
/// # Examples
///
/// ```no_run
/// use neural_core::architecture::load_architecture;
///
/// let arch = load_architecture("config/architecture_rnn.json").unwrap();
/// assert!(!arch.layers.is_empty());
/// ```
pub fn load_architecture(path: &str) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    info!(path, layers = config.layers.len(), "Loaded architecture");
    Ok(config)
}

/// Validates an architecture configuration.
///
/// Checks that:
/// - Architecture has at least one layer
/// - Every size is positive
/// - Only the first layer reads a sparse input
/// - Layer connections are valid (output size of layer i matches input size of layer i+1)
///
/// # Errors
///
/// Returns [`NeuralError::Config`] with a descriptive message if validation fails.
pub fn validate_architecture(config: &ArchitectureConfig) -> Result<()> {
    if config.layers.is_empty() {
        return Err(NeuralError::config(
            "Architecture must have at least one layer",
        ));
    }

    for (i, layer) in config.layers.iter().enumerate() {
        if layer.input_size == 0 {
            return Err(NeuralError::config(format!(
                "Layer {}: input_size must be greater than 0",
                i
            )));
        }
        if layer.output_size == 0 {
            return Err(NeuralError::config(format!(
                "Layer {}: output_size must be greater than 0",
                i
            )));
        }
        if i > 0 && layer.sparse_input {
            return Err(NeuralError::config(format!(
                "Layer {}: only the first layer can read a sparse input",
                i
            )));
        }
    }

    for (i, pair) in config.layers.windows(2).enumerate() {
        if pair[0].output_size != pair[1].input_size {
            return Err(NeuralError::config(format!(
                "Layer connection mismatch: Layer {} output size ({}) does not match Layer {} input size ({})",
                i,
                pair[0].output_size,
                i + 1,
                pair[1].input_size
            )));
        }
    }

    Ok(())
}

/// Builds Glorot-initialized parameters for every layer of the architecture.
pub fn build_parameters(config: &ArchitectureConfig) -> Result<StackedParameters> {
    validate_architecture(config)?;
    let mut params = StackedParameters::new(
        config
            .layers
            .iter()
            .map(LayerConfig::build_parameters)
            .collect(),
    );
    let mut initializer = GlorotInitializer::new(config.seed, config.init_gain);
    params.initialize(&mut initializer, config.bias_init);
    Ok(params)
}

/// Builds one layer instance per layer configuration, bottom to top.
pub fn build_layers(config: &ArchitectureConfig) -> Result<Vec<Box<dyn Layer>>> {
    validate_architecture(config)?;
    Ok(config.layers.iter().map(LayerConfig::build_layer).collect())
}

/// Builds a processor running the architecture over one example at a time.
pub fn build_feedforward_processor(config: &ArchitectureConfig) -> Result<FeedforwardProcessor> {
    Ok(FeedforwardProcessor::new(build_layers(config)?))
}

/// Builds a processor running the architecture over sequences.
pub fn build_sequence_processor(config: &ArchitectureConfig) -> Result<SequenceProcessor> {
    validate_architecture(config)?;
    let layers = config.layers.clone();
    Ok(SequenceProcessor::new(move || {
        layers.iter().map(LayerConfig::build_layer).collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ArchitectureConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parameters_follow_layers() {
        let config = parse(
            r#"{ "layers": [
                { "connection": "simple_recurrent", "input_size": 4, "output_size": 3, "sparse_input": true },
                { "connection": "feedforward", "input_size": 3, "output_size": 2, "activation": "sigmoid" }
            ] }"#,
        );
        let params = build_parameters(&config).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.params_count(), (12 + 9 + 3) + (6 + 2));
        assert!(params.layer(0).biases()[0].values().values().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_connection_mismatch() {
        let config = parse(
            r#"{ "layers": [
                { "connection": "feedforward", "input_size": 4, "output_size": 3 },
                { "connection": "feedforward", "input_size": 2, "output_size": 1 }
            ] }"#,
        );
        let err = validate_architecture(&config).unwrap_err();
        assert!(err.to_string().contains("Layer connection mismatch"));
    }

    #[test]
    fn test_sparse_input_only_first() {
        let config = parse(
            r#"{ "layers": [
                { "connection": "feedforward", "input_size": 4, "output_size": 3 },
                { "connection": "feedforward", "input_size": 3, "output_size": 1, "sparse_input": true }
            ] }"#,
        );
        assert!(validate_architecture(&config).is_err());
    }
}
