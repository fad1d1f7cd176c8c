//! Update methods and the optimizer that drives them
//!
//! An update method turns the gradient of one parameter tensor into the delta
//! subtracted from its values. Methods that keep state per tensor (velocity,
//! moment estimates) store it in the tensor's support structure, which is
//! created lazily and type-checked on every request.
//!
//! # Available Update Methods
//!
//! - [`LearningRateMethod`]: plain gradient descent with optional epoch decay
//! - [`MomentumMethod`] / [`NesterovMomentumMethod`]
//! - [`AdaGradMethod`] / [`RmsPropMethod`]
//! - [`AdamMethod`] / [`RAdamMethod`]
//!
//! [`ParamsOptimizer`] couples one update method with an
//! [`ErrorsAccumulator`] and applies averaged errors to a
//! [`StackedParameters`](crate::parameters::StackedParameters).
//!
//! # Example
//!
//! ```ignore
//! use neural_core::optimizers::{AdamMethod, ParamsOptimizer};
//!
//! let mut optimizer = ParamsOptimizer::new(Box::new(AdamMethod::default()), &params, 1);
//!
//! for (features, gold) in examples {
//!     optimizer.new_example();
//!     let errors = processor.backward(&params, &gold_errors(features, gold), false);
//!     optimizer.accumulate(errors);
//!     optimizer.update(&mut params)?;
//! }
//! ```

pub mod accumulator;
pub mod adagrad;
pub mod adam;
pub mod decay;
pub mod learning_rate;
pub mod momentum;
pub mod params_optimizer;
pub mod radam;
pub mod regularization;
pub mod rmsprop;
pub mod support;

pub use accumulator::ErrorsAccumulator;
pub use adagrad::AdaGradMethod;
pub use adam::AdamMethod;
pub use decay::{ExponentialDecay, HyperbolicDecay, LearningRateDecay};
pub use learning_rate::{LearningRateMethod, ScheduledRate};
pub use momentum::{MomentumMethod, NesterovMomentumMethod};
pub use params_optimizer::ParamsOptimizer;
pub use radam::RAdamMethod;
pub use regularization::Regularization;
pub use rmsprop::RmsPropMethod;
pub use support::{SupportStructure, SupportStructureKind};

use crate::arrays::{DenseArray, SparseArray};
use crate::error::Result;
use crate::parameters::{Gradient, ParamsArray};

/// Reacts to the start of every processed example.
pub trait ExampleScheduling {
    fn new_example(&mut self);
}

/// Reacts to the start of every mini-batch.
pub trait BatchScheduling {
    fn new_batch(&mut self);
}

/// Reacts to the start of every epoch.
pub trait EpochScheduling {
    fn new_epoch(&mut self);
}

/// Core trait for gradient-to-delta conversion strategies.
///
/// Scheduling hooks are opt-in: a method exposes the granularities it cares
/// about through the `as_*_scheduling` queries and the optimizer only forwards
/// notifications to methods that answer with `Some`.
pub trait UpdateMethod {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Kind of support structure this method attaches to tensors.
    fn kind(&self) -> SupportStructureKind;

    /// Converts a gradient into the delta to subtract from the tensor.
    ///
    /// The delta has the same representation as the gradient. For a sparse
    /// gradient only the masked positions of `support` are read or written.
    ///
    /// # Panics
    ///
    /// Panics if `support` is not of [`kind`](Self::kind).
    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient;

    fn regularization(&self) -> Option<&Regularization> {
        None
    }

    fn as_example_scheduling(&mut self) -> Option<&mut dyn ExampleScheduling> {
        None
    }

    fn as_batch_scheduling(&mut self) -> Option<&mut dyn BatchScheduling> {
        None
    }

    fn as_epoch_scheduling(&mut self) -> Option<&mut dyn EpochScheduling> {
        None
    }

    /// Applies one update to `params`: computes the delta, regularizes the
    /// current values and subtracts the delta.
    ///
    /// # Errors
    ///
    /// Fails without touching `params` if a support structure of another kind
    /// is already attached to it.
    ///
    /// # Panics
    ///
    /// Panics if the gradient and the tensor have different shapes.
    fn update(&mut self, params: &mut ParamsArray, gradient: &Gradient) -> Result<()> {
        assert_eq!(
            params.shape(),
            gradient.shape(),
            "Parameters and gradients must have the same shape"
        );

        let kind = self.kind();
        let delta = {
            let support = params.support_structure(kind)?;
            self.apply(gradient, support)
        };

        if let Some(regularization) = self.regularization() {
            regularization.apply(params.values_mut(), gradient);
        }
        params.apply_delta(&delta);

        Ok(())
    }
}

/// Builds a delta of the same representation as `gradient`, calling `f` with
/// the flat buffer offset and the gradient value of every active position.
///
/// Dense gradients visit every position; sparse gradients only their mask.
pub(crate) fn elementwise_delta<F>(gradient: &Gradient, mut f: F) -> Gradient
where
    F: FnMut(usize, f64) -> f64,
{
    match gradient {
        Gradient::Dense(g) => {
            let (rows, columns) = g.shape();
            let values = g
                .values()
                .iter()
                .enumerate()
                .map(|(k, &v)| f(k, v))
                .collect();
            Gradient::Dense(DenseArray::from_vec(rows, columns, values))
        }
        Gradient::Sparse(g) => {
            let columns = g.shape().1;
            let values = g
                .iter()
                .map(|(&(r, c), &v)| f(r * columns + c, v))
                .collect();
            Gradient::Sparse(SparseArray::with_mask(g.mask().clone(), values))
        }
    }
}

pub(crate) fn unexpected_structure(method: &str, support: &SupportStructure) -> ! {
    panic!(
        "{} cannot use a {:?} support structure",
        method,
        support.kind()
    )
}
