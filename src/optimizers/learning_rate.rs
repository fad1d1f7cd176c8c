//! Plain gradient descent with an optionally decaying learning rate
//!
//! This module provides the learning rate method, `delta = alpha * gradient`,
//! and the [`ScheduledRate`] shared by every method whose step size decays
//! once per epoch.

use tracing::info;

use super::decay::LearningRateDecay;
use super::regularization::Regularization;
use super::support::{SupportStructure, SupportStructureKind};
use super::{elementwise_delta, unexpected_structure, EpochScheduling, UpdateMethod};
use crate::parameters::Gradient;

/// Learning rate that may decay at every new epoch.
///
/// The first epoch keeps the initial rate; from the second one on the decay
/// function (if any) is applied to the current rate.
#[derive(Debug)]
pub struct ScheduledRate {
    initial: f64,
    current: f64,
    decay: Option<Box<dyn LearningRateDecay>>,
    epoch_count: usize,
}

impl ScheduledRate {
    pub fn new(learning_rate: f64, decay: Option<Box<dyn LearningRateDecay>>) -> Self {
        Self {
            initial: learning_rate,
            current: learning_rate,
            decay,
            epoch_count: 0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    pub fn epoch_count(&self) -> usize {
        self.epoch_count
    }

    pub fn set(&mut self, learning_rate: f64) {
        self.current = learning_rate;
    }

    pub fn new_epoch(&mut self) {
        self.epoch_count += 1;

        if let Some(decay) = &self.decay {
            let updated = decay.update(self.current, self.epoch_count);
            if updated != self.current {
                info!(
                    epoch = self.epoch_count,
                    from = self.current,
                    to = updated,
                    "learning rate decayed"
                );
            }
            self.current = updated;
        }
    }
}

/// Plain gradient descent.
///
/// Implements `w = w - alpha * ∇L/∂w` where `alpha` follows a [`ScheduledRate`].
///
/// # Example
///
/// ```
/// use neural_core::arrays::DenseArray;
/// use neural_core::optimizers::{LearningRateMethod, UpdateMethod};
/// use neural_core::parameters::{Gradient, GradientKind, ParamsArray};
///
/// let mut method = LearningRateMethod::new(0.1);
/// let mut params = ParamsArray::new(0, 1, 3, GradientKind::Dense);
/// params.fill(1.0);
/// let grads = Gradient::Dense(DenseArray::from_vec(1, 3, vec![0.1, 0.2, 0.3]));
///
/// method.update(&mut params, &grads).unwrap();
/// assert!((params.values().values()[0] - 0.99).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct LearningRateMethod {
    rate: ScheduledRate,
    regularization: Option<Regularization>,
}

impl LearningRateMethod {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            rate: ScheduledRate::new(learning_rate, None),
            regularization: None,
        }
    }

    pub fn with_decay(learning_rate: f64, decay: Box<dyn LearningRateDecay>) -> Self {
        Self {
            rate: ScheduledRate::new(learning_rate, Some(decay)),
            regularization: None,
        }
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }

    pub fn learning_rate(&self) -> f64 {
        self.rate.current()
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.rate.set(learning_rate);
    }
}

impl UpdateMethod for LearningRateMethod {
    fn name(&self) -> &'static str {
        "learning_rate"
    }

    fn kind(&self) -> SupportStructureKind {
        SupportStructureKind::LearningRate
    }

    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient {
        if !matches!(support, SupportStructure::LearningRate) {
            unexpected_structure(self.name(), support);
        }
        let alpha = self.rate.current();
        elementwise_delta(gradient, |_, g| alpha * g)
    }

    fn regularization(&self) -> Option<&Regularization> {
        self.regularization.as_ref()
    }

    fn as_epoch_scheduling(&mut self) -> Option<&mut dyn EpochScheduling> {
        Some(self)
    }
}

impl EpochScheduling for LearningRateMethod {
    fn new_epoch(&mut self) {
        self.rate.new_epoch();
    }
}
