//! Tests for learning rate decay
//!
//! This file tests both decay functions:
//! - ExponentialDecay: geometric interpolation towards the final rate
//! - HyperbolicDecay: initial / (1 + decay * t)

use approx::assert_relative_eq;
use neural_core::optimizers::{
    EpochScheduling, ExponentialDecay, HyperbolicDecay, LearningRateDecay, LearningRateMethod,
};

// ============================================================================
// ExponentialDecay Tests
// ============================================================================

mod exponential_decay_tests {
    use super::*;

    fn decay() -> ExponentialDecay {
        ExponentialDecay::new(0.01, 0.001, 10)
    }

    #[test]
    fn test_first_epoch_keeps_rate() {
        assert_eq!(decay().update(0.01, 1), 0.01);
    }

    #[test]
    fn test_intermediate_epochs() {
        let decay = decay();
        assert_relative_eq!(decay.update(0.01, 2), 0.0077426368, epsilon = 1e-8);
        assert_relative_eq!(decay.update(0.0077426368, 3), 0.0059948425, epsilon = 1e-8);
    }

    #[test]
    fn test_final_rate_is_stable() {
        assert_eq!(decay().update(0.001, 10), 0.001);
    }

    #[test]
    fn test_reaches_final_rate_at_total_iterations() {
        let decay = decay();
        let mut lr = 0.01;
        for t in 1..=10 {
            lr = decay.update(lr, t);
        }
        assert_relative_eq!(lr, 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_monotonic_decrease() {
        let decay = decay();
        let mut lr = 0.01;
        for t in 2..=10 {
            let next = decay.update(lr, t);
            assert!(next < lr, "epoch {}: {} should be below {}", t, next, lr);
            lr = next;
        }
    }

    #[test]
    #[should_panic(expected = "initial learning rate")]
    fn test_initial_below_final() {
        ExponentialDecay::new(0.001, 0.01, 10);
    }
}

// ============================================================================
// HyperbolicDecay Tests
// ============================================================================

mod hyperbolic_decay_tests {
    use super::*;

    fn decay() -> HyperbolicDecay {
        HyperbolicDecay::new(0.5, 0.01, 0.001)
    }

    #[test]
    fn test_reference_values() {
        let decay = decay();
        assert_eq!(decay.update(0.01, 1), 0.01);
        assert_eq!(decay.update(0.01, 2), 0.005);
        assert_eq!(decay.update(0.0077426368, 3), 0.004);
        assert_eq!(decay.update(0.001, 10), 0.001);
    }

    #[test]
    fn test_depends_only_on_epoch_once_started() {
        let decay = decay();
        assert_eq!(decay.update(0.009, 4), decay.update(0.002, 4));
    }
}

// ============================================================================
// Scheduled learning rate Tests
// ============================================================================

mod scheduled_rate_tests {
    use super::*;

    #[test]
    fn test_method_follows_epochs() {
        let mut method = LearningRateMethod::with_decay(0.01, Box::new(HyperbolicDecay::new(0.5, 0.01, 0.001)));
        method.new_epoch();
        assert_eq!(method.learning_rate(), 0.01);
        method.new_epoch();
        assert_eq!(method.learning_rate(), 0.005);
        method.new_epoch();
        assert_eq!(method.learning_rate(), 0.004);
    }

    #[test]
    fn test_without_decay_rate_is_constant() {
        let mut method = LearningRateMethod::new(0.05);
        for _ in 0..5 {
            method.new_epoch();
        }
        assert_eq!(method.learning_rate(), 0.05);
    }
}
