//! Neural network training core
//!
//! This library provides the substrate shared by neural network models:
//! parameter tensors with dense or sparse gradients, layer and stacked
//! parameter containers, gradient-to-delta update methods with per-tensor
//! optimizer state, mini-batch error accumulation, and processors that run
//! layer stacks over single examples or whole sequences.
//!
//! # Modules
//!
//! - `arrays`: Dense and sparse numeric arrays
//! - `parameters`: Parameter tensors, gradients, layer and stacked containers
//! - `layers`: Layer trait, context window and implementations (feed-forward, simple recurrent)
//! - `processor`: Structure pool and feed-forward / sequence processors
//! - `optimizers`: Update methods, learning rate decay, accumulator and optimizer
//! - `utils`: Shared utilities (RNG, initializers, activation functions)
//! - `config`: Training configuration structures
//! - `architecture`: Architecture configuration and model building
//! - `error`: Crate error type

pub mod architecture;
pub mod arrays;
pub mod config;
pub mod error;
pub mod layers;
pub mod optimizers;
pub mod parameters;
pub mod processor;
pub mod utils;

pub use error::{NeuralError, Result};
