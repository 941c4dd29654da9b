//! Typed feature structs and the ordered vectors built from them.
//!
//! `MaternalFeatures` and `FetalFeatures` name every input explicitly;
//! their `to_vector()` methods are the only place the model column order
//! is spelled out in code, so a reordering shows up in one diff.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::{FETAL_CONSTANTS, FETAL_INPUT_FIELDS, MATERNAL_FIELDS, ModelId, tables};

/// An ordered sequence of numeric features tagged with its target model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    model: ModelId,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values without checking them. Use [`FeatureVector::validate_for`]
    /// before handing the vector to a model.
    pub fn new(model: ModelId, values: Vec<f64>) -> Self {
        Self { model, values }
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check schema tag, arity, and finiteness against `model`.
    pub fn validate_for(&self, model: ModelId) -> Result<(), SchemaError> {
        if self.model != model {
            return Err(SchemaError::WrongModel {
                expected: model,
                found: self.model,
            });
        }
        let names = model.field_names();
        if self.values.len() != names.len() {
            return Err(SchemaError::Arity {
                model,
                expected: names.len(),
                found: self.values.len(),
            });
        }
        if let Some((name, _)) = names
            .iter()
            .zip(&self.values)
            .find(|(_, v)| !v.is_finite())
        {
            return Err(SchemaError::NonFinite { model, field: *name });
        }
        Ok(())
    }

    /// Single-row Arrow batch with one column per feature.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        self.validate_for(self.model)
            .map_err(|e| ArrowError::InvalidArgumentError(e.to_string()))?;
        let columns: Vec<ArrayRef> = self
            .values
            .iter()
            .map(|&v| Arc::new(Float64Array::from(vec![v])) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(tables::feature_schema(self.model)), columns)
    }
}

/// Maternal inputs for the pregnancy-risk model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaternalFeatures {
    pub age: f64,
    pub diastolic_bp: f64,
    /// Blood glucose, mmol/L.
    pub blood_glucose: f64,
    /// Body temperature, °C.
    pub body_temp: f64,
    pub heart_rate: f64,
}

impl Default for MaternalFeatures {
    fn default() -> Self {
        let [age, diastolic_bp, blood_glucose, body_temp, heart_rate] =
            MATERNAL_FIELDS.map(|f| f.default);
        Self {
            age,
            diastolic_bp,
            blood_glucose,
            body_temp,
            heart_rate,
        }
    }
}

impl MaternalFeatures {
    /// Values in model order: age, diastolic BP, blood glucose, body temp, heart rate.
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::new(
            ModelId::Maternal,
            vec![
                self.age,
                self.diastolic_bp,
                self.blood_glucose,
                self.body_temp,
                self.heart_rate,
            ],
        )
    }

    /// Mutable access by column name (see [`MATERNAL_FIELDS`]).
    pub fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "Age" => Some(&mut self.age),
            "DiastolicBP" => Some(&mut self.diastolic_bp),
            "BS" => Some(&mut self.blood_glucose),
            "BodyTemp" => Some(&mut self.body_temp),
            "HeartRate" => Some(&mut self.heart_rate),
            _ => None,
        }
    }
}

/// The ten user-entered cardiotocogram metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FetalFeatures {
    pub baseline_value: f64,
    pub accelerations: f64,
    pub fetal_movement: f64,
    pub uterine_contractions: f64,
    pub light_decelerations: f64,
    pub severe_decelerations: f64,
    pub prolongued_decelerations: f64,
    pub abnormal_short_term_variability: f64,
    pub mean_value_of_short_term_variability: f64,
    pub percentage_of_time_with_abnormal_long_term_variability: f64,
}

impl Default for FetalFeatures {
    fn default() -> Self {
        let [
            baseline_value,
            accelerations,
            fetal_movement,
            uterine_contractions,
            light_decelerations,
            severe_decelerations,
            prolongued_decelerations,
            abnormal_short_term_variability,
            mean_value_of_short_term_variability,
            percentage_of_time_with_abnormal_long_term_variability,
        ] = FETAL_INPUT_FIELDS.map(|f| f.default);
        Self {
            baseline_value,
            accelerations,
            fetal_movement,
            uterine_contractions,
            light_decelerations,
            severe_decelerations,
            prolongued_decelerations,
            abnormal_short_term_variability,
            mean_value_of_short_term_variability,
            percentage_of_time_with_abnormal_long_term_variability,
        }
    }
}

impl FetalFeatures {
    /// The ten inputs followed by the eleven histogram constants.
    pub fn to_vector(&self) -> FeatureVector {
        let mut values = Vec::with_capacity(ModelId::Fetal.arity());
        values.extend([
            self.baseline_value,
            self.accelerations,
            self.fetal_movement,
            self.uterine_contractions,
            self.light_decelerations,
            self.severe_decelerations,
            self.prolongued_decelerations,
            self.abnormal_short_term_variability,
            self.mean_value_of_short_term_variability,
            self.percentage_of_time_with_abnormal_long_term_variability,
        ]);
        values.extend(FETAL_CONSTANTS.iter().map(|(_, v)| *v));
        FeatureVector::new(ModelId::Fetal, values)
    }

    /// Mutable access by column name (see [`FETAL_INPUT_FIELDS`]).
    pub fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "baseline_value" => Some(&mut self.baseline_value),
            "accelerations" => Some(&mut self.accelerations),
            "fetal_movement" => Some(&mut self.fetal_movement),
            "uterine_contractions" => Some(&mut self.uterine_contractions),
            "light_decelerations" => Some(&mut self.light_decelerations),
            "severe_decelerations" => Some(&mut self.severe_decelerations),
            "prolongued_decelerations" => Some(&mut self.prolongued_decelerations),
            "abnormal_short_term_variability" => Some(&mut self.abnormal_short_term_variability),
            "mean_value_of_short_term_variability" => {
                Some(&mut self.mean_value_of_short_term_variability)
            }
            "percentage_of_time_with_abnormal_long_term_variability" => {
                Some(&mut self.percentage_of_time_with_abnormal_long_term_variability)
            }
            _ => None,
        }
    }
}
