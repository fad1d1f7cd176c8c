//! Parameter tensors, gradients and the containers that group them
//!
//! - [`ParamsArray`]: one trainable tensor with its lazily-attached optimizer state
//! - [`Gradient`]: dense or sparse delta for one tensor
//! - [`LayerParameters`] / [`LayerErrors`]: the tensors of one layer transition
//! - [`StackedParameters`] / [`StackedErrors`]: one bundle per layer of a topology

pub mod gradient;
pub mod layer;
pub mod params_array;
pub mod stacked;

pub use gradient::{Gradient, GradientKind};
pub use layer::{LayerErrors, LayerParameters};
pub use params_array::ParamsArray;
pub use stacked::{StackedErrors, StackedParameters};
