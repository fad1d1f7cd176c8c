//! Layer abstractions for neural networks
//!
//! This module provides the Layer trait, the context window through which a
//! layer instance sees its temporal neighbours, and the concrete layer types.

mod r#trait;
pub mod context_window;
pub mod feedforward;
mod input;
pub mod simple_recurrent;

// Re-export the Layer trait for convenience
pub use context_window::{ContextWindow, InitHidden, PrevState};
pub use feedforward::FeedforwardLayer;
pub use r#trait::Layer;
pub use simple_recurrent::SimpleRecurrentLayer;
