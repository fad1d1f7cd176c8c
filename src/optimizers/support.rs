//! Per-tensor optimizer state.

use crate::arrays::DenseArray;

/// Which update method family owns a support structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportStructureKind {
    LearningRate,
    Momentum,
    NesterovMomentum,
    AdaGrad,
    RmsProp,
    Adam,
}

/// State kept by an update method for one parameter tensor.
///
/// Buffers have the tensor's shape. Sparse gradients only ever touch the
/// buffer positions listed in their mask.
#[derive(Debug, Clone, PartialEq)]
pub enum SupportStructure {
    LearningRate,
    Momentum { velocity: DenseArray },
    NesterovMomentum {
        velocity: DenseArray,
        prev_velocity: DenseArray,
    },
    AdaGrad { second_moments: DenseArray },
    RmsProp { second_moments: DenseArray },
    Adam {
        first_moments: DenseArray,
        second_moments: DenseArray,
    },
}

impl SupportStructure {
    /// Zero-initialized structure of the given kind and shape.
    pub fn new(kind: SupportStructureKind, rows: usize, columns: usize) -> Self {
        let zeros = || DenseArray::zeros(rows, columns);
        match kind {
            SupportStructureKind::LearningRate => SupportStructure::LearningRate,
            SupportStructureKind::Momentum => SupportStructure::Momentum { velocity: zeros() },
            SupportStructureKind::NesterovMomentum => SupportStructure::NesterovMomentum {
                velocity: zeros(),
                prev_velocity: zeros(),
            },
            SupportStructureKind::AdaGrad => SupportStructure::AdaGrad {
                second_moments: zeros(),
            },
            SupportStructureKind::RmsProp => SupportStructure::RmsProp {
                second_moments: zeros(),
            },
            SupportStructureKind::Adam => SupportStructure::Adam {
                first_moments: zeros(),
                second_moments: zeros(),
            },
        }
    }

    pub fn kind(&self) -> SupportStructureKind {
        match self {
            SupportStructure::LearningRate => SupportStructureKind::LearningRate,
            SupportStructure::Momentum { .. } => SupportStructureKind::Momentum,
            SupportStructure::NesterovMomentum { .. } => SupportStructureKind::NesterovMomentum,
            SupportStructure::AdaGrad { .. } => SupportStructureKind::AdaGrad,
            SupportStructure::RmsProp { .. } => SupportStructureKind::RmsProp,
            SupportStructure::Adam { .. } => SupportStructureKind::Adam,
        }
    }
}
