//! Model gateway: loads the maternal and fetal classifiers once and serves predictions.

pub mod artifact;
pub mod classifier;
mod error;
mod gateway;
#[cfg(feature = "onnx")]
mod onnx;

pub use artifact::load_artifact;
pub use classifier::{Classifier, ModelInfo};
pub use error::GatewayError;
pub use gateway::{GatewayConfig, ModelGateway, ModelSummary};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
