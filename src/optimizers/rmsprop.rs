//! RMSProp update method.

use super::regularization::Regularization;
use super::support::{SupportStructure, SupportStructureKind};
use super::{elementwise_delta, unexpected_structure, UpdateMethod};
use crate::parameters::Gradient;

/// RMSProp: AdaGrad with an exponentially decaying second moment.
///
/// ```text
/// m' = decay * m + (1 - decay) * gradient²
/// delta = alpha * gradient / (sqrt(m') + epsilon)
/// ```
#[derive(Debug, Clone)]
pub struct RmsPropMethod {
    learning_rate: f64,
    epsilon: f64,
    decay: f64,
    regularization: Option<Regularization>,
}

impl RmsPropMethod {
    pub fn new(learning_rate: f64, epsilon: f64, decay: f64) -> Self {
        Self {
            learning_rate,
            epsilon,
            decay,
            regularization: None,
        }
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }
}

impl Default for RmsPropMethod {
    fn default() -> Self {
        Self::new(0.001, 1e-8, 0.95)
    }
}

impl UpdateMethod for RmsPropMethod {
    fn name(&self) -> &'static str {
        "rmsprop"
    }

    fn kind(&self) -> SupportStructureKind {
        SupportStructureKind::RmsProp
    }

    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient {
        let m = match support {
            SupportStructure::RmsProp { second_moments } => second_moments.values_mut(),
            other => unexpected_structure(self.name(), other),
        };
        let (alpha, epsilon, decay) = (self.learning_rate, self.epsilon, self.decay);

        elementwise_delta(gradient, |k, g| {
            m[k] = decay * m[k] + (1.0 - decay) * g * g;
            alpha * g / (m[k].sqrt() + epsilon)
        })
    }

    fn regularization(&self) -> Option<&Regularization> {
        self.regularization.as_ref()
    }
}
