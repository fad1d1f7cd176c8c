//! Mini-batch driver coupling an update method with an errors accumulator.

use tracing::debug;

use super::accumulator::ErrorsAccumulator;
use super::UpdateMethod;
use crate::error::{NeuralError, Result};
use crate::parameters::{StackedErrors, StackedParameters};

/// Accumulates per-example errors and applies their average once enough of
/// them have been collected.
pub struct ParamsOptimizer {
    method: Box<dyn UpdateMethod>,
    accumulator: ErrorsAccumulator,
    min_accumulations_to_update: usize,
}

impl ParamsOptimizer {
    /// Creates an optimizer for parameters shaped like `params`.
    ///
    /// # Arguments
    ///
    /// * `method` - Update method applied to every tensor
    /// * `params` - Parameters whose shape sizes the accumulator
    /// * `min_accumulations_to_update` - Errors bundles required before an
    ///   update is applied (mini-batch size); `0` behaves like `1`
    pub fn new(
        method: Box<dyn UpdateMethod>,
        params: &StackedParameters,
        min_accumulations_to_update: usize,
    ) -> Self {
        Self {
            method,
            accumulator: ErrorsAccumulator::new(params),
            min_accumulations_to_update: min_accumulations_to_update.max(1),
        }
    }

    pub fn method(&self) -> &dyn UpdateMethod {
        self.method.as_ref()
    }

    pub fn method_mut(&mut self) -> &mut dyn UpdateMethod {
        self.method.as_mut()
    }

    pub fn min_accumulations_to_update(&self) -> usize {
        self.min_accumulations_to_update
    }

    /// Errors bundles waiting for the next update.
    pub fn pending(&self) -> usize {
        self.accumulator.count()
    }

    pub fn accumulate(&mut self, errors: &StackedErrors) {
        self.accumulator.accumulate(errors);
    }

    /// Applies the averaged errors to `params` if enough have been accumulated.
    ///
    /// Returns `Ok(true)` when an update was applied and the accumulator reset,
    /// `Ok(false)` when fewer than the minimum number of bundles are pending.
    ///
    /// # Errors
    ///
    /// * [`NeuralError::NothingAccumulated`] if no errors were accumulated
    /// * [`NeuralError::IncompatibleSupportStructure`] if a tensor carries a
    ///   support structure of another method; no tensor is modified in that case
    pub fn update(&mut self, params: &mut StackedParameters) -> Result<bool> {
        let count = self.accumulator.count();
        if count == 0 {
            return Err(NeuralError::NothingAccumulated);
        }
        if count < self.min_accumulations_to_update {
            return Ok(false);
        }

        let kind = self.method.kind();
        for tensor in params.iter() {
            tensor.check_support_structure(kind)?;
        }

        self.accumulator.average_errors();

        let method = self.method.as_mut();
        let mut outcome = Ok(());
        params.zip_errors(self.accumulator.errors(), |tensor, gradient| {
            if outcome.is_ok() {
                outcome = method.update(tensor, gradient);
            }
        });
        outcome?;

        debug!(
            method = self.method.name(),
            accumulated = count,
            "Applied parameter update"
        );
        self.accumulator.reset();
        Ok(true)
    }

    /// Notifies the update method that a new example starts.
    pub fn new_example(&mut self) {
        if let Some(scheduling) = self.method.as_example_scheduling() {
            scheduling.new_example();
        }
    }

    pub fn new_batch(&mut self) {
        if let Some(scheduling) = self.method.as_batch_scheduling() {
            scheduling.new_batch();
        }
    }

    pub fn new_epoch(&mut self) {
        if let Some(scheduling) = self.method.as_epoch_scheduling() {
            scheduling.new_epoch();
        }
    }
}
