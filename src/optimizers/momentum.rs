//! Momentum and Nesterov momentum update methods.

use super::decay::LearningRateDecay;
use super::learning_rate::ScheduledRate;
use super::regularization::Regularization;
use super::support::{SupportStructure, SupportStructureKind};
use super::{elementwise_delta, unexpected_structure, EpochScheduling, UpdateMethod};
use crate::parameters::Gradient;

/// Classical momentum.
///
/// ```text
/// v' = momentum * v + alpha * gradient
/// delta = v'
/// ```
#[derive(Debug)]
pub struct MomentumMethod {
    rate: ScheduledRate,
    momentum: f64,
    regularization: Option<Regularization>,
}

impl MomentumMethod {
    pub fn new(learning_rate: f64, momentum: f64) -> Self {
        Self {
            rate: ScheduledRate::new(learning_rate, None),
            momentum,
            regularization: None,
        }
    }

    pub fn with_decay(mut self, decay: Box<dyn LearningRateDecay>) -> Self {
        self.rate = ScheduledRate::new(self.rate.initial(), Some(decay));
        self
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }

    pub fn learning_rate(&self) -> f64 {
        self.rate.current()
    }
}

impl UpdateMethod for MomentumMethod {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn kind(&self) -> SupportStructureKind {
        SupportStructureKind::Momentum
    }

    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient {
        let velocity = match support {
            SupportStructure::Momentum { velocity } => velocity.values_mut(),
            other => unexpected_structure(self.name(), other),
        };
        let (alpha, momentum) = (self.rate.current(), self.momentum);

        elementwise_delta(gradient, |k, g| {
            velocity[k] = momentum * velocity[k] + alpha * g;
            velocity[k]
        })
    }

    fn regularization(&self) -> Option<&Regularization> {
        self.regularization.as_ref()
    }

    fn as_epoch_scheduling(&mut self) -> Option<&mut dyn EpochScheduling> {
        Some(self)
    }
}

impl EpochScheduling for MomentumMethod {
    fn new_epoch(&mut self) {
        self.rate.new_epoch();
    }
}

/// Nesterov accelerated momentum.
///
/// ```text
/// v_prev = v
/// v' = momentum * v + alpha * gradient
/// delta = (1 + momentum) * v' - momentum * v_prev
/// ```
#[derive(Debug)]
pub struct NesterovMomentumMethod {
    rate: ScheduledRate,
    momentum: f64,
    regularization: Option<Regularization>,
}

impl NesterovMomentumMethod {
    pub fn new(learning_rate: f64, momentum: f64) -> Self {
        Self {
            rate: ScheduledRate::new(learning_rate, None),
            momentum,
            regularization: None,
        }
    }

    pub fn with_decay(mut self, decay: Box<dyn LearningRateDecay>) -> Self {
        self.rate = ScheduledRate::new(self.rate.initial(), Some(decay));
        self
    }

    pub fn with_regularization(mut self, regularization: Regularization) -> Self {
        self.regularization = Some(regularization);
        self
    }

    pub fn learning_rate(&self) -> f64 {
        self.rate.current()
    }
}

impl UpdateMethod for NesterovMomentumMethod {
    fn name(&self) -> &'static str {
        "nesterov_momentum"
    }

    fn kind(&self) -> SupportStructureKind {
        SupportStructureKind::NesterovMomentum
    }

    fn apply(&mut self, gradient: &Gradient, support: &mut SupportStructure) -> Gradient {
        let (velocity, prev_velocity) = match support {
            SupportStructure::NesterovMomentum {
                velocity,
                prev_velocity,
            } => (velocity.values_mut(), prev_velocity.values_mut()),
            other => unexpected_structure(self.name(), other),
        };
        let (alpha, momentum) = (self.rate.current(), self.momentum);

        elementwise_delta(gradient, |k, g| {
            prev_velocity[k] = velocity[k];
            velocity[k] = momentum * velocity[k] + alpha * g;
            (1.0 + momentum) * velocity[k] - momentum * prev_velocity[k]
        })
    }

    fn regularization(&self) -> Option<&Regularization> {
        self.regularization.as_ref()
    }

    fn as_epoch_scheduling(&mut self) -> Option<&mut dyn EpochScheduling> {
        Some(self)
    }
}

impl EpochScheduling for NesterovMomentumMethod {
    fn new_epoch(&mut self) {
        self.rate.new_epoch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::{DenseArray, SparseArray};

    fn dense(values: Vec<f64>) -> Gradient {
        let n = values.len();
        Gradient::Dense(DenseArray::from_vec(1, n, values))
    }

    #[test]
    fn test_momentum_accumulates_velocity() {
        let mut method = MomentumMethod::new(0.1, 0.9);
        let mut support = SupportStructure::new(SupportStructureKind::Momentum, 1, 2);

        let d1 = method.apply(&dense(vec![1.0, -1.0]), &mut support).to_dense();
        assert!((d1.values()[0] - 0.1).abs() < 1e-12);

        // v = 0.9 * 0.1 + 0.1 * 1.0
        let d2 = method.apply(&dense(vec![1.0, -1.0]), &mut support).to_dense();
        assert!((d2.values()[0] - 0.19).abs() < 1e-12);
        assert!((d2.values()[1] + 0.19).abs() < 1e-12);
    }

    #[test]
    fn test_nesterov_delta() {
        let mut method = NesterovMomentumMethod::new(0.1, 0.9);
        let mut support = SupportStructure::new(SupportStructureKind::NesterovMomentum, 1, 1);

        // v_prev = 0, v = 0.1 -> delta = 1.9 * 0.1
        let d1 = method.apply(&dense(vec![1.0]), &mut support).to_dense();
        assert!((d1.values()[0] - 0.19).abs() < 1e-12);

        // v_prev = 0.1, v = 0.19 -> delta = 1.9 * 0.19 - 0.9 * 0.1
        let d2 = method.apply(&dense(vec![1.0]), &mut support).to_dense();
        assert!((d2.values()[0] - (1.9 * 0.19 - 0.09)).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_gradient_leaves_unmasked_velocity() {
        let mut method = MomentumMethod::new(0.1, 0.9);
        let mut support = SupportStructure::new(SupportStructureKind::Momentum, 2, 2);

        method.apply(&dense_2x2(1.0), &mut support);
        let g = Gradient::Sparse(SparseArray::from_entries(2, 2, vec![((1, 0), 1.0)]));
        method.apply(&g, &mut support);

        match support {
            SupportStructure::Momentum { velocity } => {
                assert!((velocity.get(0, 0) - 0.1).abs() < 1e-12);
                assert!((velocity.get(1, 0) - 0.19).abs() < 1e-12);
            }
            other => panic!("unexpected structure {:?}", other),
        }
    }

    fn dense_2x2(value: f64) -> Gradient {
        Gradient::Dense(DenseArray::from_vec(2, 2, vec![value; 4]))
    }

    #[test]
    #[should_panic(expected = "cannot use a")]
    fn test_wrong_structure_panics() {
        let mut method = MomentumMethod::new(0.1, 0.9);
        let mut support = SupportStructure::new(SupportStructureKind::AdaGrad, 1, 1);
        method.apply(&dense(vec![1.0]), &mut support);
    }
}
