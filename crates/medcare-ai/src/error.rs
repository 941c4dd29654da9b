use medcare_core::{ModelId, SchemaError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The artifact could not be loaded or does not fit its schema. Fatal at startup.
    #[error("{model} model unavailable ({path}): {reason}")]
    ModelUnavailable {
        model: ModelId,
        path: String,
        reason: String,
    },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaError),

    #[error("{model} model returned class {value}, expected 0, 1 or 2")]
    InvalidOutput { model: ModelId, value: i64 },

    #[error("{model} model failed: {reason}")]
    Inference { model: ModelId, reason: String },
}

impl GatewayError {
    pub(crate) fn unavailable(model: ModelId, path: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModelUnavailable {
            model,
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
