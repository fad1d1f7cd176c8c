//! Activation functions for neural networks
//!
//! Derivatives are computed from the activated output rather than from the
//! pre-activation, so layers only keep their output between forward and backward.

use serde::{Deserialize, Serialize};

use crate::arrays::DenseArray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Identity,
    Sigmoid,
    Tanh,
    Relu,
}

impl Activation {
    pub fn f(self, x: f64) -> f64 {
        match self {
            Activation::Identity => x,
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
        }
    }

    /// Derivative expressed in terms of `y = f(x)`.
    pub fn df_from_output(self, y: f64) -> f64 {
        match self {
            Activation::Identity => 1.0,
            Activation::Sigmoid => y * (1.0 - y),
            Activation::Tanh => 1.0 - y * y,
            Activation::Relu => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Applies the function in place.
    pub fn apply(self, values: &mut DenseArray) {
        if self == Activation::Identity {
            return;
        }
        values.values_mut().iter_mut().for_each(|v| *v = self.f(*v));
    }

    /// `errors *= f'(output)` element-wise.
    pub fn backprop(self, output: &DenseArray, errors: &mut DenseArray) {
        assert_eq!(
            output.shape(),
            errors.shape(),
            "Arrays must have the same shape"
        );
        for (e, &y) in errors.values_mut().iter_mut().zip(output.values()) {
            *e *= self.df_from_output(y);
        }
    }
}
