//! Model artifact loading.
//!
//! JSON artifacts carry the exported parameters of a scikit-learn style
//! classifier plus the column order it was trained on:
//!
//! ```json
//! {
//!   "kind": "forest",
//!   "n_features": 5,
//!   "feature_names": ["Age", "DiastolicBP", "BS", "BodyTemp", "HeartRate"],
//!   "classes": [0, 1, 2],
//!   "trees": [{ "nodes": [ ... ] }]
//! }
//! ```
//!
//! `.onnx` files are handed to ONNX Runtime when the `onnx` feature is on.

use std::path::Path;
use std::sync::Arc;

use medcare_core::ModelId;
use medcare_core::outcome::CATEGORY_COUNT;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::{Classifier, LogisticModel, Tree, TreeEnsemble};
use crate::error::GatewayError;

/// On-disk JSON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub n_features: usize,
    /// Training-time column order, when the exporter recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub classes: Vec<i64>,
    #[serde(flatten)]
    pub params: ModelParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParams {
    Forest {
        trees: Vec<Tree>,
    },
    Logistic {
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

impl ArtifactFile {
    /// Check the artifact's declared inputs and outputs against `model`'s schema.
    pub fn check_schema(&self, model: ModelId) -> Result<(), String> {
        let expected = model.field_names();
        if self.n_features != expected.len() {
            return Err(format!(
                "artifact takes {} features, {model} schema has {}",
                self.n_features,
                expected.len()
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != expected.len() {
                return Err(format!(
                    "artifact lists {} feature names, {model} schema has {}",
                    names.len(),
                    expected.len()
                ));
            }
            if let Some((i, (got, want))) = names
                .iter()
                .zip(expected)
                .enumerate()
                .find(|(_, (got, want))| got.as_str() != **want)
            {
                return Err(format!(
                    "feature {i} is '{got}' in the artifact but '{want}' in the {model} schema"
                ));
            }
        }
        check_classes(&self.classes)
    }

    /// Build the classifier described by this artifact.
    pub fn into_classifier(self) -> Result<Arc<dyn Classifier>, String> {
        let n_features = self.n_features;
        Ok(match self.params {
            ModelParams::Forest { trees } => {
                Arc::new(TreeEnsemble::new(trees, self.classes, n_features)?)
            }
            ModelParams::Logistic { coef, intercept } => Arc::new(LogisticModel::new(
                coef,
                intercept,
                self.classes,
                n_features,
            )?),
        })
    }
}

/// Every class label must be a category index the outcome tables know.
fn check_classes(classes: &[i64]) -> Result<(), String> {
    if classes.is_empty() {
        return Err("artifact lists no classes".into());
    }
    if let Some(c) = classes
        .iter()
        .find(|c| !(0..i64::from(CATEGORY_COUNT)).contains(*c))
    {
        return Err(format!("class label {c} is not a known category"));
    }
    Ok(())
}

/// Load and validate the artifact for `model` from `path`.
///
/// Format is chosen by extension: `.json` for the pure-Rust back ends,
/// `.onnx` for ONNX Runtime.
pub fn load_artifact(path: &Path, model: ModelId) -> Result<Arc<dyn Classifier>, GatewayError> {
    let shown = path.display().to_string();
    let unavailable = |reason: String| GatewayError::unavailable(model, shown.as_str(), reason);

    if !path.exists() {
        return Err(unavailable("file not found".into()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let classifier = match extension.as_deref() {
        Some("json") => load_json(path, model).map_err(unavailable)?,
        #[cfg(feature = "onnx")]
        Some("onnx") => crate::onnx::OnnxClassifier::load(path, model)
            .map(|c| Arc::new(c) as Arc<dyn Classifier>)
            .map_err(|e| unavailable(format!("{e:#}")))?,
        #[cfg(not(feature = "onnx"))]
        Some("onnx") => {
            return Err(unavailable(
                "ONNX artifacts need the `onnx` feature".into(),
            ));
        }
        other => {
            return Err(unavailable(format!(
                "unsupported artifact type {:?}",
                other.unwrap_or("")
            )));
        }
    };

    let info = classifier.info();
    info!(%model, path = %shown, format = info.format, detail = %info.detail, "loaded model artifact");
    Ok(classifier)
}

fn load_json(path: &Path, model: ModelId) -> Result<Arc<dyn Classifier>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("read: {e}"))?;
    let artifact: ArtifactFile =
        serde_json::from_str(&text).map_err(|e| format!("parse: {e}"))?;
    artifact.check_schema(model)?;
    artifact.into_classifier()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MATERNAL_FOREST: &str = r#"{
        "kind": "forest",
        "n_features": 5,
        "feature_names": ["Age", "DiastolicBP", "BS", "BodyTemp", "HeartRate"],
        "classes": [0, 1, 2],
        "trees": [
            { "nodes": [
                { "feature": 2, "threshold": 7.5, "left": 1, "right": 2 },
                { "value": [9, 1, 0] },
                { "value": [0, 2, 8] }
            ] }
        ]
    }"#;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_forest_json() {
        let file = write_temp(".json", MATERNAL_FOREST);
        let clf = load_artifact(file.path(), ModelId::Maternal).unwrap();
        assert_eq!(clf.n_features(), 5);
        assert_eq!(clf.predict(&[30.0, 80.0, 5.0, 37.0, 75.0]).unwrap(), 0);
        assert_eq!(clf.predict(&[30.0, 80.0, 12.0, 37.0, 75.0]).unwrap(), 2);
    }

    #[test]
    fn loads_logistic_json() {
        let body = r#"{
            "kind": "logistic",
            "n_features": 5,
            "classes": [0, 1, 2],
            "coef": [[0,0,-1,0,0],[0,0,0,0,0],[0,0,1,0,0]],
            "intercept": [5.0, 0.0, -5.0]
        }"#;
        let file = write_temp(".json", body);
        let clf = load_artifact(file.path(), ModelId::Maternal).unwrap();
        assert_eq!(clf.info().format, "logistic");
        assert_eq!(clf.predict(&[0.0, 0.0, 1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(clf.predict(&[0.0, 0.0, 9.0, 0.0, 0.0]).unwrap(), 2);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = load_artifact(Path::new("/nonexistent/maternal.json"), ModelId::Maternal)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            GatewayError::ModelUnavailable {
                model: ModelId::Maternal,
                ..
            }
        ));
    }

    #[test]
    fn corrupt_json_is_unavailable() {
        let file = write_temp(".json", "{ not json");
        let err = load_artifact(file.path(), ModelId::Maternal).err().unwrap();
        assert!(err.to_string().contains("parse"), "{err}");
    }

    #[test]
    fn arity_mismatch_is_unavailable() {
        // A maternal artifact offered as the fetal model.
        let file = write_temp(".json", MATERNAL_FOREST);
        let err = load_artifact(file.path(), ModelId::Fetal).err().unwrap();
        assert!(matches!(err, GatewayError::ModelUnavailable { .. }));
        assert!(err.to_string().contains("21"), "{err}");
    }

    #[test]
    fn reordered_feature_names_rejected() {
        let body = MATERNAL_FOREST.replace(
            r#"["Age", "DiastolicBP", "BS", "BodyTemp", "HeartRate"]"#,
            r#"["Age", "BS", "DiastolicBP", "BodyTemp", "HeartRate"]"#,
        );
        let file = write_temp(".json", &body);
        let err = load_artifact(file.path(), ModelId::Maternal).err().unwrap();
        assert!(err.to_string().contains("feature 1 is 'BS'"), "{err}");
    }

    #[test]
    fn unknown_class_label_rejected() {
        let body = MATERNAL_FOREST.replace("\"classes\": [0, 1, 2]", "\"classes\": [0, 1, 5]");
        let file = write_temp(".json", &body);
        let err = load_artifact(file.path(), ModelId::Maternal).err().unwrap();
        assert!(err.to_string().contains("class label 5"), "{err}");
    }

    #[test]
    fn unsupported_extension_rejected() {
        let file = write_temp(".sav", MATERNAL_FOREST);
        let err = load_artifact(file.path(), ModelId::Maternal).err().unwrap();
        assert!(err.to_string().contains("unsupported"), "{err}");
    }

    #[test]
    fn artifact_without_feature_names_accepted() {
        let artifact: ArtifactFile = serde_json::from_str(
            r#"{"kind": "forest", "n_features": 5, "classes": [0, 1, 2],
                "trees": [{"nodes": [{"value": [1, 0, 0]}]}]}"#,
        )
        .unwrap();
        assert!(artifact.feature_names.is_none());
        assert!(artifact.check_schema(ModelId::Maternal).is_ok());
    }
}
