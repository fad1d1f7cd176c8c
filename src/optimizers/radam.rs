//! Rectified Adam update method.

use super::adam::AdamMethod;
use super::regularization::Regularization;
use super::support::{SupportStructure, SupportStructureKind};
use super::{ExampleScheduling, UpdateMethod};
use crate::parameters::Gradient;

/// Length of the approximated SMA above which the adaptive step is used.
const RECTIFICATION_THRESHOLD: f64 = 4.0;

/// Rectified Adam (R-Adam).
///
/// Shares Adam's moment estimates but rectifies the adaptive step size by the
/// variance of the approximated simple moving average:
///
/// ```text
/// ρ∞ = 2 / (1 - β2) - 1
/// ρ_t = ρ∞ - 2t β2^t / (1 - β2^t)
/// ```
///
/// While `ρ_t <= 4` the variance is intractable and the step falls back to
/// bias-corrected momentum `α / (1 - β1^t) * v_t`. Afterwards
///
/// ```text
/// r_t = sqrt((ρ_t - 4)(ρ_t - 2)ρ∞ / ((ρ∞ - 4)(ρ∞ - 2)ρ_t))
/// α_t = α * r_t * sqrt(1 - β2^t) / (1 - β1^t)
/// delta = α_t * v_t / (√m_t + ε)
/// ```
///
/// # Reference
///
/// Liu, L. et al. (2019). On the Variance of the Adaptive Learning Rate and Beyond.
/// arXiv preprint arXiv:1908.03265.
#[derive(Debug, Clone)]
pub struct RAdamMethod {
    step_size: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    rho_inf: f64,
    alpha: f64,
    rectified: bool,
    time_step: u32,
    regularization: Option<Regularization>,
}

impl RAdamMethod {
    pub fn new(step_size: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            step_size,
            beta1,
            beta2,
            epsilon,
            rho_inf: 2.0 / (1.0 - beta2) - 1.0,
            alpha: step_size,
            rectified: false,
            time_step: 0,
            regularization: None,
        }
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether the current example uses the rectified adaptive step.
    pub fn is_rectified(&self) -> bool {
        self.rectified
    }
}

impl Default for RAdamMethod {
    fn default() -> Self {
        Self::new(0.001, 0.9, 0.999, 1e-8)
    }
}

impl UpdateMethod for RAdamMethod {
    fn name(&self) -> &'static str {
        "radam"
    }

    fn kind(&self) -> SupportStructureKind {
        SupportStructureKind::Adam
    }

    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient {
        let (alpha, epsilon, rectified) = (self.alpha, self.epsilon, self.rectified);
        AdamMethod::moments_delta(
            gradient,
            support,
            self.name(),
            (self.beta1, self.beta2),
            |v, m| {
                if rectified {
                    v / (m.sqrt() + epsilon) * alpha
                } else {
                    v * alpha
                }
            },
        )
    }

    fn regularization(&self) -> Option<&Regularization> {
        self.regularization.as_ref()
    }

    fn as_example_scheduling(&mut self) -> Option<&mut dyn ExampleScheduling> {
        Some(self)
    }
}

impl ExampleScheduling for RAdamMethod {
    fn new_example(&mut self) {
        self.time_step += 1;
        let t = self.time_step as i32;
        let beta1_t = self.beta1.powi(t);
        let beta2_t = self.beta2.powi(t);
        let rho_t = self.rho_inf - 2.0 * f64::from(self.time_step) * beta2_t / (1.0 - beta2_t);

        self.rectified = rho_t > RECTIFICATION_THRESHOLD;
        self.alpha = if self.rectified {
            let r_t = ((rho_t - 4.0) * (rho_t - 2.0) * self.rho_inf
                / ((self.rho_inf - 4.0) * (self.rho_inf - 2.0) * rho_t))
                .sqrt();
            self.step_size * r_t * (1.0 - beta2_t).sqrt() / (1.0 - beta1_t)
        } else {
            self.step_size / (1.0 - beta1_t)
        };
    }
}
