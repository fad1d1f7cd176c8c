//! Adam (Adaptive Moment Estimation) update method
//!
//! This module provides the Adam method, which combines momentum and
//! adaptive learning rates with bias correction for improved convergence.

use super::regularization::Regularization;
use super::support::{SupportStructure, SupportStructureKind};
use super::{elementwise_delta, unexpected_structure, ExampleScheduling, UpdateMethod};
use crate::parameters::Gradient;

/// Adam (Adaptive Moment Estimation) update method.
///
/// Adam maintains two moving averages for each parameter in the tensor's
/// support structure:
///
/// 1. First moment (mean) of gradients (momentum)
/// 2. Second moment (uncentered variance) of gradients (adaptive learning rate)
///
/// The update rule is:
///
/// ```text
/// v_t = β1 * v_{t-1} + (1 - β1) * gradient
/// m_t = β2 * m_{t-1} + (1 - β2) * gradient²
/// α_t = α * sqrt(1 - β2^t) / (1 - β1^t)
/// delta = α_t * v_t / (√m_t + ε)
/// ```
///
/// The bias-corrected step size `α_t` is shared by every tensor and is
/// recomputed once per processed example, which is why this method reacts to
/// [`ExampleScheduling::new_example`] rather than counting its own updates.
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic optimization.
/// arXiv preprint arXiv:1412.6980.
#[derive(Debug, Clone)]
pub struct AdamMethod {
    step_size: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    /// Bias-corrected step size for the current example
    alpha: f64,
    /// Examples seen so far
    time_step: u32,
    regularization: Option<Regularization>,
}

impl AdamMethod {
    /// Creates a new Adam method with the specified hyperparameters.
    ///
    /// # Typical Values
    ///
    /// The original Adam paper recommends:
    /// - step_size: 0.001
    /// - beta1: 0.9
    /// - beta2: 0.999
    /// - epsilon: 1e-8
    pub fn new(step_size: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            step_size,
            beta1,
            beta2,
            epsilon,
            alpha: step_size,
            time_step: 0,
            regularization: None,
        }
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }

    /// Current bias-corrected step size.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn time_step(&self) -> u32 {
        self.time_step
    }

    pub(crate) fn moments_delta(
        gradient: &Gradient,
        support: &mut SupportStructure,
        name: &str,
        (beta1, beta2): (f64, f64),
        mut step: impl FnMut(f64, f64) -> f64,
    ) -> Gradient {
        let (v, m) = match support {
            SupportStructure::Adam {
                first_moments,
                second_moments,
            } => (first_moments.values_mut(), second_moments.values_mut()),
            other => unexpected_structure(name, other),
        };

        elementwise_delta(gradient, |k, g| {
            v[k] = beta1 * v[k] + (1.0 - beta1) * g;
            m[k] = beta2 * m[k] + (1.0 - beta2) * g * g;
            step(v[k], m[k])
        })
    }
}

impl Default for AdamMethod {
    fn default() -> Self {
        Self::new(0.001, 0.9, 0.999, 1e-8)
    }
}

impl UpdateMethod for AdamMethod {
    fn name(&self) -> &'static str {
        "adam"
    }

    fn kind(&self) -> SupportStructureKind {
        SupportStructureKind::Adam
    }

    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient {
        let (alpha, epsilon) = (self.alpha, self.epsilon);
        Self::moments_delta(
            gradient,
            support,
            self.name(),
            (self.beta1, self.beta2),
            |v, m| v / (m.sqrt() + epsilon) * alpha,
        )
    }

    fn regularization(&self) -> Option<&Regularization> {
        self.regularization.as_ref()
    }

    fn as_example_scheduling(&mut self) -> Option<&mut dyn ExampleScheduling> {
        Some(self)
    }
}

impl ExampleScheduling for AdamMethod {
    fn new_example(&mut self) {
        self.time_step += 1;
        let t = self.time_step as i32;
        let bias_correction1 = 1.0 - self.beta1.powi(t);
        let bias_correction2 = 1.0 - self.beta2.powi(t);
        self.alpha = self.step_size * bias_correction2.sqrt() / bias_correction1;
    }
}
