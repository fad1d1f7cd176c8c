//! AdaGrad update method.

use super::regularization::Regularization;
use super::support::{SupportStructure, SupportStructureKind};
use super::{elementwise_delta, unexpected_structure, UpdateMethod};
use crate::parameters::Gradient;

/// AdaGrad: per-parameter step sizes shrinking with the accumulated squared gradients.
///
/// ```text
/// m' = m + gradient²
/// delta = alpha * gradient / (sqrt(m') + epsilon)
/// ```
///
/// Because `m` only grows, a constant gradient produces strictly decreasing
/// deltas.
#[derive(Debug, Clone)]
pub struct AdaGradMethod {
    learning_rate: f64,
    epsilon: f64,
    regularization: Option<Regularization>,
}

impl AdaGradMethod {
    pub fn new(learning_rate: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            epsilon,
            regularization: None,
        }
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }
}

impl Default for AdaGradMethod {
    fn default() -> Self {
        Self::new(0.01, 1e-8)
    }
}

impl UpdateMethod for AdaGradMethod {
    fn name(&self) -> &'static str {
        "adagrad"
    }

    fn kind(&self) -> SupportStructureKind {
        SupportStructureKind::AdaGrad
    }

    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient {
        let m = match support {
            SupportStructure::AdaGrad { second_moments } => second_moments.values_mut(),
            other => unexpected_structure(self.name(), other),
        };
        let (alpha, epsilon) = (self.learning_rate, self.epsilon);

        elementwise_delta(gradient, |k, g| {
            m[k] += g * g;
            alpha * g / (m[k].sqrt() + epsilon)
        })
    }

    fn regularization(&self) -> Option<&Regularization> {
        self.regularization.as_ref()
    }
}
