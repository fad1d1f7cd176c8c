//! Running sum and average of errors across a mini-batch.

use crate::parameters::{StackedErrors, StackedParameters};

/// Sums the errors of repeated backward passes and yields their average.
///
/// The storage is built once from the parameters' shape and reused across
/// batches: [`reset`](Self::reset) zero-fills it in place.
#[derive(Debug, Clone)]
pub struct ErrorsAccumulator {
    errors: StackedErrors,
    count: usize,
    averaged: bool,
}

impl ErrorsAccumulator {
    pub fn new(params: &StackedParameters) -> Self {
        Self {
            errors: params.errors_like(),
            count: 0,
            averaged: false,
        }
    }

    /// Number of errors bundles accumulated since the last reset.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Adds an errors bundle. The first bundle after a reset is copied.
    ///
    /// # Panics
    ///
    /// Panics if `errors` does not have the shape the accumulator was built for.
    pub fn accumulate(&mut self, errors: &StackedErrors) {
        if self.count == 0 {
            self.errors.assign_values(errors);
        } else {
            assert!(
                !self.averaged,
                "Cannot accumulate into errors that have already been averaged"
            );
            self.errors.assign_sum(errors);
        }
        self.count += 1;
    }

    /// Divides the accumulated errors by their count (no-op for a single bundle).
    ///
    /// Calling it again before the next reset has no further effect.
    pub fn average_errors(&mut self) {
        if self.count > 1 && !self.averaged {
            self.errors.assign_div(self.count);
        }
        self.averaged = self.count > 0;
    }

    /// Accumulated errors: zero if nothing was accumulated, otherwise the sum
    /// (or the average once [`average_errors`](Self::average_errors) was called).
    pub fn errors(&self) -> &StackedErrors {
        &self.errors
    }

    pub fn reset(&mut self) {
        self.errors.zero_fill();
        self.count = 0;
        self.averaged = false;
    }
}
