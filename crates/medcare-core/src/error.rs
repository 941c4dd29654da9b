use thiserror::Error;

use crate::schema::ModelId;

/// A user input rejected by a form. The previous value is kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("{field}: '{raw}' is not a number")]
    NotANumber { field: &'static str, raw: String },

    #[error("{field}: {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field}: {value} must be a whole number")]
    NotInteger { field: &'static str, value: f64 },
}

/// A feature vector that does not fit the schema of the model it was sent to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("vector assembled for the {found} model was sent to the {expected} model")]
    WrongModel { expected: ModelId, found: ModelId },

    #[error("{model} model expects {expected} features, got {found}")]
    Arity {
        model: ModelId,
        expected: usize,
        found: usize,
    },

    #[error("{model} feature '{field}' is not a finite number")]
    NonFinite { model: ModelId, field: &'static str },
}
