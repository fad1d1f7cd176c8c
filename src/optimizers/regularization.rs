//! Weight regularization applied to tensor values right before an update.

use crate::arrays::DenseArray;
use crate::parameters::Gradient;

/// Shrinks a tensor's own values (not its gradient).
///
/// With a sparse gradient L1 and L2 touch only the masked positions, so
/// inactive entries stay exactly as they were. MaxNorm is a constraint on the
/// whole tensor and always rescales every entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regularization {
    /// `w -= lambda * sign(w)`
    L1 { lambda: f64 },
    /// `w *= 1 - lambda`
    L2 { lambda: f64 },
    /// Rescales the tensor so that its euclidean norm does not exceed `max_norm`.
    MaxNorm { max_norm: f64 },
}

impl Regularization {
    pub fn apply(&self, values: &mut DenseArray, gradient: &Gradient) {
        match *self {
            Regularization::L1 { lambda } => {
                Self::for_active(values, gradient, |w| w - lambda * sign(w));
            }
            Regularization::L2 { lambda } => {
                Self::for_active(values, gradient, |w| w * (1.0 - lambda));
            }
            Regularization::MaxNorm { max_norm } => {
                let norm = values.norm2();
                if norm > max_norm {
                    values.scale(max_norm / norm);
                }
            }
        }
    }

    fn for_active<F: Fn(f64) -> f64>(values: &mut DenseArray, gradient: &Gradient, f: F) {
        match gradient {
            Gradient::Dense(_) => values.values_mut().iter_mut().for_each(|w| *w = f(*w)),
            Gradient::Sparse(s) => {
                let columns = values.columns();
                let data = values.values_mut();
                for &(r, c) in s.mask().indices() {
                    let k = r * columns + c;
                    data[k] = f(data[k]);
                }
            }
        }
    }
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
