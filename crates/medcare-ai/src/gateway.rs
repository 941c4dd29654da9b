//! The model gateway: both classifiers behind one `predict` contract.

use std::path::PathBuf;
use std::sync::Arc;

use medcare_core::outcome::CATEGORY_COUNT;
use medcare_core::{FeatureVector, FetalFeatures, MaternalFeatures, ModelId, PredictionResult};
use tracing::debug;

use crate::artifact::load_artifact;
use crate::classifier::{Classifier, ModelInfo};
use crate::error::GatewayError;

/// Where to load the two model artifacts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub maternal_path: PathBuf,
    pub fetal_path: PathBuf,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            maternal_path: PathBuf::from("models/maternal_model.json"),
            fetal_path: PathBuf::from("models/fetal_health_classifier.json"),
        }
    }
}

#[derive(Clone)]
struct LoadedModel {
    classifier: Arc<dyn Classifier>,
    source: String,
}

/// Loaded model description, as shown by `medcare models`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub model: ModelId,
    pub source: String,
    pub n_features: usize,
    pub info: ModelInfo,
}

/// Both trained classifiers, loaded once and shared read-only.
///
/// Cloning is cheap: clones share the same loaded models.
#[derive(Clone)]
pub struct ModelGateway {
    maternal: LoadedModel,
    fetal: LoadedModel,
}

impl ModelGateway {
    /// Load both artifacts. Any failure is [`GatewayError::ModelUnavailable`].
    pub fn load(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let maternal = LoadedModel {
            classifier: load_artifact(&config.maternal_path, ModelId::Maternal)?,
            source: config.maternal_path.display().to_string(),
        };
        let fetal = LoadedModel {
            classifier: load_artifact(&config.fetal_path, ModelId::Fetal)?,
            source: config.fetal_path.display().to_string(),
        };
        Ok(Self { maternal, fetal })
    }

    /// Wrap already-built classifiers, checking their widths.
    pub fn from_classifiers(
        maternal: Arc<dyn Classifier>,
        fetal: Arc<dyn Classifier>,
    ) -> Result<Self, GatewayError> {
        for (model, clf) in [(ModelId::Maternal, &maternal), (ModelId::Fetal, &fetal)] {
            if clf.n_features() != model.arity() {
                return Err(GatewayError::unavailable(
                    model,
                    "<memory>",
                    format!(
                        "classifier takes {} features, {model} schema has {}",
                        clf.n_features(),
                        model.arity()
                    ),
                ));
            }
        }
        Ok(Self {
            maternal: LoadedModel {
                classifier: maternal,
                source: "<memory>".into(),
            },
            fetal: LoadedModel {
                classifier: fetal,
                source: "<memory>".into(),
            },
        })
    }

    fn slot(&self, model: ModelId) -> &LoadedModel {
        match model {
            ModelId::Maternal => &self.maternal,
            ModelId::Fetal => &self.fetal,
        }
    }

    /// Run `model` on `vector` and return its category index (0, 1 or 2).
    ///
    /// The vector is checked against the model's schema first; a mismatch is
    /// rejected without invoking the model.
    pub fn predict(&self, model: ModelId, vector: &FeatureVector) -> Result<u8, GatewayError> {
        vector.validate_for(model)?;

        let raw = self
            .slot(model)
            .classifier
            .predict(vector.values())
            .map_err(|e| GatewayError::Inference {
                model,
                reason: format!("{e:#}"),
            })?;

        let category = u8::try_from(raw)
            .ok()
            .filter(|c| *c < CATEGORY_COUNT)
            .ok_or(GatewayError::InvalidOutput { model, value: raw })?;

        debug!(%model, category, "prediction");
        Ok(category)
    }

    /// Predict and attach the label and colour for the category.
    pub fn predict_result(
        &self,
        model: ModelId,
        vector: &FeatureVector,
    ) -> Result<PredictionResult, GatewayError> {
        let category = self.predict(model, vector)?;
        PredictionResult::from_category(model, category).ok_or(GatewayError::InvalidOutput {
            model,
            value: i64::from(category),
        })
    }

    pub fn predict_maternal(
        &self,
        features: &MaternalFeatures,
    ) -> Result<PredictionResult, GatewayError> {
        self.predict_result(ModelId::Maternal, &features.to_vector())
    }

    pub fn predict_fetal(&self, features: &FetalFeatures) -> Result<PredictionResult, GatewayError> {
        self.predict_result(ModelId::Fetal, &features.to_vector())
    }

    /// Where `model` was loaded from and what it is.
    pub fn describe(&self, model: ModelId) -> ModelSummary {
        let slot = self.slot(model);
        ModelSummary {
            model,
            source: slot.source.clone(),
            n_features: slot.classifier.n_features(),
            info: slot.classifier.info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{LogisticModel, Tree, TreeEnsemble};
    use medcare_core::SchemaError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Always returns a fixed label and counts calls.
    struct Fixed {
        label: i64,
        width: usize,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(label: i64, width: usize) -> Arc<Self> {
            Arc::new(Self {
                label,
                width,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Classifier for Fixed {
        fn predict(&self, _features: &[f64]) -> anyhow::Result<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label)
        }

        fn n_features(&self) -> usize {
            self.width
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                format: "fixed",
                detail: format!("always {}", self.label),
            }
        }
    }

    /// Maternal: blood glucose above 7.5 is high risk, diastolic BP above 90 medium.
    fn maternal_forest() -> Arc<dyn Classifier> {
        let tree: Tree = serde_json::from_str(
            r#"{"nodes": [
                {"feature": 2, "threshold": 7.5, "left": 1, "right": 4},
                {"feature": 1, "threshold": 90, "left": 2, "right": 3},
                {"value": [1, 0, 0]},
                {"value": [0, 1, 0]},
                {"value": [0, 0, 1]}
            ]}"#,
        )
        .unwrap();
        Arc::new(TreeEnsemble::new(vec![tree], vec![0, 1, 2], 5).unwrap())
    }

    /// Fetal: prolongued decelerations drive the pathological score.
    fn fetal_logistic() -> Arc<dyn Classifier> {
        let mut coef = vec![vec![0.0; 21]; 3];
        coef[2][6] = 1000.0;
        Arc::new(LogisticModel::new(coef, vec![1.0, 0.0, 0.0], vec![0, 1, 2], 21).unwrap())
    }

    fn gateway() -> ModelGateway {
        ModelGateway::from_classifiers(maternal_forest(), fetal_logistic()).unwrap()
    }

    #[test]
    fn default_maternal_scenario() {
        let result = gateway()
            .predict_maternal(&MaternalFeatures {
                age: 30.0,
                diastolic_bp: 80.0,
                blood_glucose: 5.0,
                body_temp: 37.0,
                heart_rate: 75.0,
            })
            .unwrap();
        assert_eq!(result.category, 0);
        assert_eq!(result.label, "Low Risk");
        assert_eq!(result.progress(), 0.0);
    }

    #[test]
    fn maternal_categories_map_to_labels() {
        let gw = gateway();
        let mut f = MaternalFeatures::default();
        f.diastolic_bp = 95.0;
        assert_eq!(gw.predict_maternal(&f).unwrap().label, "Medium Risk");
        f.blood_glucose = 12.0;
        let high = gw.predict_maternal(&f).unwrap();
        assert_eq!(high.label, "High Risk");
        assert_eq!(high.progress(), 1.0);
    }

    #[test]
    fn fetal_prediction() {
        let gw = gateway();
        assert_eq!(gw.predict_fetal(&FetalFeatures::default()).unwrap().label, "Normal");
        let mut f = FetalFeatures::default();
        f.prolongued_decelerations = 0.005;
        let result = gw.predict_fetal(&f).unwrap();
        assert_eq!(result.category, 2);
        assert_eq!(result.label, "Pathological");
    }

    #[test]
    fn predict_is_idempotent() {
        let gw = gateway();
        let v = MaternalFeatures::default().to_vector();
        let first = gw.predict(ModelId::Maternal, &v).unwrap();
        for _ in 0..10 {
            assert_eq!(gw.predict(ModelId::Maternal, &v).unwrap(), first);
        }
    }

    #[test]
    fn every_category_in_range_across_inputs() {
        let gw = gateway();
        for age in [0.0, 50.0, 100.0] {
            for dbp in [0.0, 90.0, 200.0] {
                for bs in [0.0, 7.5, 20.0] {
                    let f = MaternalFeatures {
                        age,
                        diastolic_bp: dbp,
                        blood_glucose: bs,
                        body_temp: 37.0,
                        heart_rate: 75.0,
                    };
                    let r = gw.predict_maternal(&f).unwrap();
                    assert!(r.category < 3);
                    assert_eq!(r.progress(), f64::from(r.category) / 2.0);
                }
            }
        }
    }

    #[test]
    fn wrong_arity_rejected_before_model_call() {
        let fixed = Fixed::new(0, 5);
        let gw = ModelGateway::from_classifiers(fixed.clone(), Fixed::new(0, 21)).unwrap();

        let short = FeatureVector::new(ModelId::Maternal, vec![30.0, 80.0, 5.0]);
        let err = gw.predict(ModelId::Maternal, &short).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::SchemaMismatch(SchemaError::Arity { found: 3, .. })
        ));
        assert_eq!(fixed.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn vector_for_other_model_rejected() {
        let gw = gateway();
        let fetal = FetalFeatures::default().to_vector();
        let err = gw.predict(ModelId::Maternal, &fetal).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::SchemaMismatch(SchemaError::WrongModel { .. })
        ));
    }

    #[test]
    fn out_of_table_output_is_an_error() {
        let gw = ModelGateway::from_classifiers(Fixed::new(7, 5), Fixed::new(-1, 21)).unwrap();
        let err = gw
            .predict(ModelId::Maternal, &MaternalFeatures::default().to_vector())
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidOutput { value: 7, .. }));
        let err = gw.predict_fetal(&FetalFeatures::default()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidOutput { value: -1, .. }));
    }

    #[test]
    fn from_classifiers_checks_width() {
        let err = ModelGateway::from_classifiers(Fixed::new(0, 6), Fixed::new(0, 21))
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
    fn load_fails_fast_on_missing_artifact() {
        let config = GatewayConfig {
            maternal_path: PathBuf::from("/nonexistent/maternal_model.json"),
            fetal_path: PathBuf::from("/nonexistent/fetal_health_classifier.json"),
        };
        let err = ModelGateway::load(&config).err().unwrap();
        assert!(err.to_string().contains("maternal model unavailable"), "{err}");
    }

    #[test]
    fn describe_reports_source() {
        let summary = gateway().describe(ModelId::Fetal);
        assert_eq!(summary.source, "<memory>");
        assert_eq!(summary.n_features, 21);
        assert_eq!(summary.info.format, "logistic");
    }

    fn bundled_models() -> GatewayConfig {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        GatewayConfig {
            maternal_path: root.join("models").join("maternal_model.json"),
            fetal_path: root.join("models").join("fetal_health_classifier.json"),
        }
    }

    #[test]
    fn bundled_artifacts_load_and_predict() {
        let gw = ModelGateway::load(&bundled_models()).unwrap();
        let maternal = gw.predict_maternal(&MaternalFeatures::default()).unwrap();
        assert_eq!(maternal.label, "Low Risk");
        let fetal = gw.predict_fetal(&FetalFeatures::default()).unwrap();
        assert!(fetal.category < 3);
        assert_eq!(gw.describe(ModelId::Maternal).info.format, "forest");
    }
}
