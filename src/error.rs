//! Error types for the crate
//!
//! Shape mismatches and out-of-range indices are programmer errors and panic at
//! the call site. Everything that depends on how the components were wired
//! together (configuration files, update method / support structure pairing,
//! optimizer sequencing) is reported through [`NeuralError`].

use crate::optimizers::SupportStructureKind;

#[derive(Debug, thiserror::Error)]
pub enum NeuralError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(
        "Incompatible support structure on params {params_id}: attached {attached:?}, requested {requested:?}"
    )]
    IncompatibleSupportStructure {
        params_id: usize,
        attached: SupportStructureKind,
        requested: SupportStructureKind,
    },

    #[error("Cannot update parameters: no errors have been accumulated")]
    NothingAccumulated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NeuralError>;

impl NeuralError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        NeuralError::Config(message.into())
    }
}
