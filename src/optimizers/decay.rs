//! Learning rate decay functions
//!
//! A decay function maps the current learning rate and the 1-based index of
//! the epoch that just started to the learning rate for that epoch. Both
//! decays are a no-op on the first epoch and once the final learning rate has
//! been reached.

use std::fmt::Debug;

/// Core trait for learning rate decay.
///
/// # Example
///
/// ```ignore
/// let decay = HyperbolicDecay::new(0.5, 0.01, 0.001);
/// let mut lr = 0.01;
/// for epoch in 1..=num_epochs {
///     lr = decay.update(lr, epoch);
///     // ... train one epoch with `lr` ...
/// }
/// ```
pub trait LearningRateDecay: Debug {
    /// Learning rate to use at `time_step`, given the current one.
    fn update(&self, learning_rate: f64, time_step: usize) -> f64;
}

/// Exponential decay that reaches `final_learning_rate` after `total_iterations` epochs.
///
/// Formula:
/// `lr' = exp(((T - t) * ln(lr) + ln(final)) / (T - t + 1))`
///
/// Each step moves `ln(lr)` an equal fraction of the way towards `ln(final)`,
/// so the rate lands exactly on `final` at `t = T`.
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    initial_learning_rate: f64,
    final_learning_rate: f64,
    total_iterations: usize,
}

impl ExponentialDecay {
    /// # Panics
    ///
    /// Panics if `initial < final` or `total_iterations == 0`.
    pub fn new(initial_learning_rate: f64, final_learning_rate: f64, total_iterations: usize) -> Self {
        assert!(
            initial_learning_rate >= final_learning_rate,
            "The initial learning rate must be >= the final one"
        );
        assert!(total_iterations > 0, "Total iterations must be > 0");
        Self {
            initial_learning_rate,
            final_learning_rate,
            total_iterations,
        }
    }

    pub fn initial_learning_rate(&self) -> f64 {
        self.initial_learning_rate
    }
}

impl LearningRateDecay for ExponentialDecay {
    fn update(&self, learning_rate: f64, time_step: usize) -> f64 {
        if time_step <= 1 || learning_rate <= self.final_learning_rate {
            return learning_rate;
        }
        if time_step >= self.total_iterations {
            return self.final_learning_rate;
        }

        let remaining = (self.total_iterations - time_step) as f64;
        ((remaining * learning_rate.ln() + self.final_learning_rate.ln()) / (remaining + 1.0)).exp()
    }
}

/// Hyperbolic decay: `lr' = initial / (1 + decay * t)`.
#[derive(Debug, Clone)]
pub struct HyperbolicDecay {
    decay_rate: f64,
    initial_learning_rate: f64,
    final_learning_rate: f64,
}

impl HyperbolicDecay {
    /// # Panics
    ///
    /// Panics if `initial < final` or `decay_rate` is negative.
    pub fn new(decay_rate: f64, initial_learning_rate: f64, final_learning_rate: f64) -> Self {
        assert!(
            initial_learning_rate >= final_learning_rate,
            "The initial learning rate must be >= the final one"
        );
        assert!(decay_rate >= 0.0, "The decay rate must be non-negative");
        Self {
            decay_rate,
            initial_learning_rate,
            final_learning_rate,
        }
    }

    pub fn initial_learning_rate(&self) -> f64 {
        self.initial_learning_rate
    }
}

impl LearningRateDecay for HyperbolicDecay {
    fn update(&self, learning_rate: f64, time_step: usize) -> f64 {
        if time_step <= 1 || learning_rate <= self.final_learning_rate {
            return learning_rate;
        }
        self.initial_learning_rate / (1.0 + self.decay_rate * time_step as f64)
    }
}
