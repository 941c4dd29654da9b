//! ONNX Runtime back end for classifiers exported with skl2onnx.
//!
//! The exported graph takes one `float_input` tensor of shape
//! `[batch, n_features]` and emits the predicted label as its first output
//! (`output_label`, int64).

use std::path::Path;
use std::sync::Mutex;

use medcare_core::ModelId;
use ort::session::Session;
use ort::value::Tensor;

use crate::classifier::{Classifier, ModelInfo};

/// A classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so the session sits behind a
/// mutex; predictions are short and never overlap in practice.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    n_features: usize,
}

impl OnnxClassifier {
    /// Load a model file and check its input width against `model`'s schema.
    pub fn load(path: &Path, model: ModelId) -> anyhow::Result<Self> {
        let session = Session::builder()?.commit_from_file(path)?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| anyhow::anyhow!("model has no inputs"))?;
        let input_name = input.name().to_string();

        let n_features = model.arity();
        if let Some(width) = infer_width(input.dtype()) {
            anyhow::ensure!(
                width == n_features,
                "model input '{input_name}' takes {width} features, {model} schema has {n_features}"
            );
        }

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            n_features,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f64]) -> anyhow::Result<i64> {
        anyhow::ensure!(
            features.len() == self.n_features,
            "expected {} features, got {}",
            self.n_features,
            features.len()
        );
        let row: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let shape = [1i64, row.len() as i64];
        let tensor = Tensor::from_array((shape, row.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("onnx session lock poisoned"))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;

        let (_, labels) = outputs[0].try_extract_tensor::<i64>()?;
        labels
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("model returned an empty label tensor"))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            format: "onnx",
            detail: format!("input '{}', {} features", self.input_name, self.n_features),
        }
    }
}

/// Last dimension of a `[batch, width]` input, when the graph fixes it.
fn infer_width(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
