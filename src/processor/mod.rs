//! Processors drive layer stacks through forward and backward passes.
//!
//! - [`FeedforwardProcessor`]: one example, one set of layer instances
//! - [`SequenceProcessor`]: one layer stack per time step, pooled and linked
//!   through context windows for backpropagation through time

pub mod feedforward;
pub mod pool;
pub mod sequence;

pub use feedforward::FeedforwardProcessor;
pub use pool::StructurePool;
pub use sequence::{SequenceProcessor, StepStructure};
