//! Configuration structures for training
//!
//! This module provides the training configuration read from JSON files: which
//! update method to use, its hyperparameters, an optional learning rate decay,
//! an optional weight regularization and the mini-batch size.

use std::fs;

use serde::Deserialize;
use tracing::info;

use crate::error::{NeuralError, Result};
use crate::optimizers::{
    AdaGradMethod, AdamMethod, ExponentialDecay, HyperbolicDecay, LearningRateDecay,
    LearningRateMethod, MomentumMethod, NesterovMomentumMethod, ParamsOptimizer, RAdamMethod,
    Regularization, RmsPropMethod, UpdateMethod,
};
use crate::parameters::StackedParameters;

const UPDATE_METHODS: [&str; 7] = [
    "learning_rate",
    "momentum",
    "nesterov_momentum",
    "adagrad",
    "rmsprop",
    "adam",
    "radam",
];

/// Methods whose learning rate follows a per-epoch decay.
const DECAYING_METHODS: [&str; 3] = ["learning_rate", "momentum", "nesterov_momentum"];

/// Configuration for training: update method, decay, regularization and batching
///
/// Different update methods read different optional fields; missing ones take
/// the method's defaults:
///
/// - **learning_rate**: `learning_rate` (default 0.01)
/// - **momentum** / **nesterov_momentum**: `learning_rate` (0.01), `momentum` (0.9)
/// - **adagrad**: `learning_rate` (0.01), `epsilon` (1e-8)
/// - **rmsprop**: `learning_rate` (0.001), `epsilon` (1e-8), `rms_decay` (0.95)
/// - **adam** / **radam**: `learning_rate` (0.001), `beta1` (0.9), `beta2` (0.999), `epsilon` (1e-8)
///
/// Learning rate decay (`decay_type`) is only accepted by the first three:
///
/// - **exponential**: Requires `final_learning_rate` and `total_iterations`
/// - **hyperbolic**: Requires `final_learning_rate` and `decay_rate`
///
/// # Example
///
/// ```json
/// {
///   "update_method": "momentum",
///   "learning_rate": 0.01,
///   "momentum": 0.9,
///   "decay_type": "exponential",
///   "final_learning_rate": 0.001,
///   "total_iterations": 10,
///   "regularization": "l2",
///   "regularization_strength": 0.0001,
///   "min_accumulations_to_update": 32
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// "learning_rate", "momentum", "nesterov_momentum", "adagrad", "rmsprop", "adam" or "radam"
    pub update_method: String,

    /// Initial learning rate (step size for Adam and R-Adam)
    pub learning_rate: Option<f64>,

    /// Velocity decay for the momentum methods
    pub momentum: Option<f64>,

    /// Numerical stability term of the adaptive methods
    pub epsilon: Option<f64>,

    /// Second-moment decay for RMSProp
    pub rms_decay: Option<f64>,

    /// First-moment decay for Adam and R-Adam
    pub beta1: Option<f64>,

    /// Second-moment decay for Adam and R-Adam
    pub beta2: Option<f64>,

    /// Learning rate decay: "exponential" or "hyperbolic"
    pub decay_type: Option<String>,

    /// Lower bound of the decayed learning rate
    pub final_learning_rate: Option<f64>,

    /// Epochs over which exponential decay reaches `final_learning_rate`
    pub total_iterations: Option<usize>,

    /// Rate of hyperbolic decay
    pub decay_rate: Option<f64>,

    /// Weight regularization: "l1", "l2" or "max_norm"
    pub regularization: Option<String>,

    /// Lambda for L1/L2, maximum norm for max_norm
    pub regularization_strength: Option<f64>,

    /// Errors bundles accumulated before each update (default 1)
    #[serde(default = "default_min_accumulations")]
    pub min_accumulations_to_update: usize,
}

fn default_min_accumulations() -> usize {
    1
}

impl TrainingConfig {
    /// Builds the configured update method.
    ///
    /// # Errors
    ///
    /// Returns [`NeuralError::Config`] if the configuration is invalid.
    pub fn build_update_method(&self) -> Result<Box<dyn UpdateMethod>> {
        validate_config(self)?;

        let decay = self.build_decay();
        let regularization = self.build_regularization();
        let lr = self.learning_rate;

        let method: Box<dyn UpdateMethod> = match self.update_method.as_str() {
            "learning_rate" => {
                let lr = lr.unwrap_or(0.01);
                let mut method = match decay {
                    Some(decay) => LearningRateMethod::with_decay(lr, decay),
                    None => LearningRateMethod::new(lr),
                };
                if let Some(r) = regularization {
                    method = method.with_regularization(r);
                }
                Box::new(method)
            }
            "momentum" => {
                let mut method = MomentumMethod::new(lr.unwrap_or(0.01), self.momentum.unwrap_or(0.9));
                if let Some(decay) = decay {
                    method = method.with_decay(decay);
                }
                if let Some(r) = regularization {
                    method = method.with_regularization(r);
                }
                Box::new(method)
            }
            "nesterov_momentum" => {
                let mut method =
                    NesterovMomentumMethod::new(lr.unwrap_or(0.01), self.momentum.unwrap_or(0.9));
                if let Some(decay) = decay {
                    method = method.with_decay(decay);
                }
                if let Some(r) = regularization {
                    method = method.with_regularization(r);
                }
                Box::new(method)
            }
            "adagrad" => {
                let mut method = AdaGradMethod::new(lr.unwrap_or(0.01), self.epsilon.unwrap_or(1e-8));
                if let Some(r) = regularization {
                    method = method.with_regularization(r);
                }
                Box::new(method)
            }
            "rmsprop" => {
                let mut method = RmsPropMethod::new(
                    lr.unwrap_or(0.001),
                    self.epsilon.unwrap_or(1e-8),
                    self.rms_decay.unwrap_or(0.95),
                );
                if let Some(r) = regularization {
                    method = method.with_regularization(r);
                }
                Box::new(method)
            }
            "adam" => {
                let (step, beta1, beta2, eps) = self.adam_hyperparameters();
                let mut method = AdamMethod::new(step, beta1, beta2, eps);
                if let Some(r) = regularization {
                    method = method.with_regularization(r);
                }
                Box::new(method)
            }
            "radam" => {
                let (step, beta1, beta2, eps) = self.adam_hyperparameters();
                let mut method = RAdamMethod::new(step, beta1, beta2, eps);
                if let Some(r) = regularization {
                    method = method.with_regularization(r);
                }
                Box::new(method)
            }
            other => {
                return Err(NeuralError::config(format!(
                    "Unknown update method '{}'",
                    other
                )))
            }
        };

        Ok(method)
    }

    /// Builds an optimizer for `params` with the configured update method and
    /// mini-batch size.
    pub fn build_optimizer(&self, params: &StackedParameters) -> Result<ParamsOptimizer> {
        let method = self.build_update_method()?;
        Ok(ParamsOptimizer::new(
            method,
            params,
            self.min_accumulations_to_update,
        ))
    }

    fn adam_hyperparameters(&self) -> (f64, f64, f64, f64) {
        (
            self.learning_rate.unwrap_or(0.001),
            self.beta1.unwrap_or(0.9),
            self.beta2.unwrap_or(0.999),
            self.epsilon.unwrap_or(1e-8),
        )
    }

    fn build_decay(&self) -> Option<Box<dyn LearningRateDecay>> {
        let initial = self.learning_rate.unwrap_or(0.01);
        let final_lr = self.final_learning_rate.unwrap_or(initial);
        match self.decay_type.as_deref()? {
            "exponential" => Some(Box::new(ExponentialDecay::new(
                initial,
                final_lr,
                self.total_iterations.unwrap_or(1),
            ))),
            "hyperbolic" => Some(Box::new(HyperbolicDecay::new(
                self.decay_rate.unwrap_or(0.0),
                initial,
                final_lr,
            ))),
            _ => None,
        }
    }

    fn build_regularization(&self) -> Option<Regularization> {
        let strength = self.regularization_strength.unwrap_or(0.0);
        match self.regularization.as_deref()? {
            "l1" => Some(Regularization::L1 { lambda: strength }),
            "l2" => Some(Regularization::L2 { lambda: strength }),
            "max_norm" => Some(Regularization::MaxNorm { max_norm: strength }),
            _ => None,
        }
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into a
/// `TrainingConfig` and validates it.
///
/// # Returns
///
/// `Ok(TrainingConfig)` on success, or an error if the file cannot be read,
/// the JSON is invalid or a value is out of range.
///
/// # Examples
///
/// ```no_run
/// use neural_core::config::load_config;
///
/// let cfg = load_config("config/training_adam.json").unwrap();
/// assert_eq!(cfg.update_method, "adam");
/// ```
pub fn load_config(path: &str) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    info!(
        path,
        update_method = %config.update_method,
        min_accumulations = config.min_accumulations_to_update,
        "Loaded training configuration"
    );
    Ok(config)
}

/// Validates a training configuration.
///
/// # Errors
///
/// Returns [`NeuralError::Config`] describing the first invalid field.
pub fn validate_config(config: &TrainingConfig) -> Result<()> {
    let method = config.update_method.as_str();
    if !UPDATE_METHODS.contains(&method) {
        return Err(NeuralError::config(format!(
            "Invalid update method '{}'. Must be one of: {}",
            method,
            UPDATE_METHODS.join(", ")
        )));
    }

    if let Some(lr) = config.learning_rate {
        if lr <= 0.0 {
            return Err(NeuralError::config("learning_rate must be positive"));
        }
    }

    if let Some(epsilon) = config.epsilon {
        if epsilon < 0.0 {
            return Err(NeuralError::config("epsilon must be non-negative"));
        }
    }

    for (name, value) in [
        ("momentum", config.momentum),
        ("rms_decay", config.rms_decay),
        ("beta1", config.beta1),
        ("beta2", config.beta2),
    ] {
        if let Some(v) = value {
            if !(0.0..1.0).contains(&v) {
                return Err(NeuralError::config(format!("{} must be in [0, 1)", name)));
            }
        }
    }

    if let Some(ref decay_type) = config.decay_type {
        validate_decay(config, decay_type)?;
    }

    if let Some(ref regularization) = config.regularization {
        let strength = config.regularization_strength.ok_or_else(|| {
            NeuralError::config("regularization requires 'regularization_strength'")
        })?;
        match regularization.as_str() {
            "l1" | "l2" if strength < 0.0 => {
                return Err(NeuralError::config(
                    "regularization_strength must be non-negative",
                ))
            }
            "max_norm" if strength <= 0.0 => {
                return Err(NeuralError::config(
                    "regularization_strength must be positive for max_norm",
                ))
            }
            "l1" | "l2" | "max_norm" => {}
            other => {
                return Err(NeuralError::config(format!(
                    "Invalid regularization '{}'. Must be one of: l1, l2, max_norm",
                    other
                )))
            }
        }
    }

    if config.min_accumulations_to_update == 0 {
        return Err(NeuralError::config(
            "min_accumulations_to_update must be at least 1",
        ));
    }

    Ok(())
}

fn validate_decay(config: &TrainingConfig, decay_type: &str) -> Result<()> {
    if !DECAYING_METHODS.contains(&config.update_method.as_str()) {
        return Err(NeuralError::config(format!(
            "decay_type is only supported by: {}",
            DECAYING_METHODS.join(", ")
        )));
    }

    let initial = config.learning_rate.unwrap_or(0.01);
    let final_lr = config
        .final_learning_rate
        .ok_or_else(|| NeuralError::config("decay_type requires 'final_learning_rate'"))?;
    if final_lr <= 0.0 || final_lr > initial {
        return Err(NeuralError::config(
            "final_learning_rate must be positive and not above learning_rate",
        ));
    }

    match decay_type {
        "exponential" => match config.total_iterations {
            Some(n) if n > 0 => Ok(()),
            _ => Err(NeuralError::config(
                "exponential decay requires a positive 'total_iterations'",
            )),
        },
        "hyperbolic" => match config.decay_rate {
            Some(rate) if rate >= 0.0 => Ok(()),
            _ => Err(NeuralError::config(
                "hyperbolic decay requires a non-negative 'decay_rate'",
            )),
        },
        other => Err(NeuralError::config(format!(
            "Invalid decay_type '{}'. Must be one of: exponential, hyperbolic",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TrainingConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(r#"{ "update_method": "adam" }"#);
        assert_eq!(config.min_accumulations_to_update, 1);
        let method = config.build_update_method().unwrap();
        assert_eq!(method.name(), "adam");
    }

    #[test]
    fn test_decay_rejected_for_adaptive_methods() {
        let config = parse(
            r#"{ "update_method": "adagrad", "decay_type": "hyperbolic",
                 "final_learning_rate": 0.001, "decay_rate": 0.5 }"#,
        );
        assert!(matches!(validate_config(&config), Err(NeuralError::Config(_))));
    }

    #[test]
    fn test_every_method_builds() {
        for name in UPDATE_METHODS {
            let config = parse(&format!(r#"{{ "update_method": "{}" }}"#, name));
            assert_eq!(config.build_update_method().unwrap().name(), name);
        }
    }
}
