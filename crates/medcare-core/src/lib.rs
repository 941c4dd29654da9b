pub mod dashboard;
pub mod error;
pub mod features;
pub mod outcome;
pub mod schema;

pub use error::{InputError, SchemaError};
pub use features::{FeatureVector, FetalFeatures, MaternalFeatures};
pub use outcome::{PredictionResult, Severity};
pub use schema::{FieldSpec, ModelId};
