//! Shared utilities
//!
//! Random number generation, weight initializers and activation functions used
//! by the layers.

pub mod activations;
pub mod initializers;
pub mod rng;

pub use activations::Activation;
pub use rng::SimpleRng;
