//! Feature schemas for the two classifiers.
//!
//! Each trained model expects its inputs in one fixed column order. The
//! order is recorded here once, as static field tables, and every other
//! piece of the pipeline (typed feature structs, Arrow schemas, artifact
//! validation) derives from these tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Which trained classifier a feature vector is assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    /// Pregnancy-risk model (5 features).
    Maternal,
    /// Cardiotocogram fetal-health model (21 features).
    Fetal,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::Maternal, ModelId::Fetal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maternal => "maternal",
            Self::Fetal => "fetal",
        }
    }

    /// Column names in the order the trained model expects them.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Maternal => &MATERNAL_FIELD_NAMES,
            Self::Fetal => &FETAL_FIELD_NAMES,
        }
    }

    /// Number of values in a complete feature vector.
    pub fn arity(&self) -> usize {
        self.field_names().len()
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a user-entered value is constrained beyond its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole numbers only.
    Integer,
    Decimal,
}

/// A user-editable numeric input with its documented bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Column name, matching [`ModelId::field_names`].
    pub name: &'static str,
    /// Human-readable label shown next to the input.
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Parse and range-check raw user text for this field.
    pub fn parse(&self, raw: &str) -> Result<f64, InputError> {
        let value: f64 = raw.trim().parse().map_err(|_| InputError::NotANumber {
            field: self.name,
            raw: raw.trim().to_string(),
        })?;
        self.check(value)
    }

    /// Range-check a value for this field. NaN is always out of range.
    pub fn check(&self, value: f64) -> Result<f64, InputError> {
        if !(self.min..=self.max).contains(&value) {
            tracing::debug!(field = self.name, value, "input out of range");
            return Err(InputError::OutOfRange {
                field: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        if self.kind == FieldKind::Integer && value.fract() != 0.0 {
            return Err(InputError::NotInteger {
                field: self.name,
                value,
            });
        }
        Ok(value)
    }

    /// Format a value with at least the precision implied by `step`.
    ///
    /// Values finer than the step keep all their digits, so the shown input
    /// is exactly the value sent to the model.
    pub fn format(&self, value: f64) -> String {
        match self.kind {
            FieldKind::Integer => format!("{value:.0}"),
            FieldKind::Decimal => {
                let step_decimals = (-self.step.log10()).round().max(1.0) as usize;
                let shortest = value.to_string();
                let exact_decimals = shortest.split_once('.').map_or(0, |(_, frac)| frac.len());
                let decimals = step_decimals.max(exact_decimals);
                format!("{value:.decimals$}")
            }
        }
    }
}

const fn integer(name: &'static str, label: &'static str, min: f64, max: f64, default: f64) -> FieldSpec {
    FieldSpec {
        name,
        label,
        min,
        max,
        default,
        step: 1.0,
        kind: FieldKind::Integer,
    }
}

const fn decimal(
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    default: f64,
    step: f64,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        min,
        max,
        default,
        step,
        kind: FieldKind::Decimal,
    }
}

// ── Maternal ──

pub const MATERNAL_FIELD_NAMES: [&str; 5] = ["Age", "DiastolicBP", "BS", "BodyTemp", "HeartRate"];

/// The five maternal inputs, all user-editable, in model order.
pub const MATERNAL_FIELDS: [FieldSpec; 5] = [
    integer("Age", "Age", 0.0, 100.0, 30.0),
    integer("DiastolicBP", "Diastolic BP (mmHg)", 0.0, 200.0, 80.0),
    decimal("BS", "Blood glucose (mmol/L)", 0.0, 20.0, 5.0, 0.1),
    decimal("BodyTemp", "Body Temperature (°C)", 35.0, 42.0, 37.0, 0.1),
    integer("HeartRate", "Heart rate (bpm)", 40.0, 200.0, 75.0),
];

// ── Fetal ──

pub const FETAL_FIELD_NAMES: [&str; 21] = [
    "baseline_value",
    "accelerations",
    "fetal_movement",
    "uterine_contractions",
    "light_decelerations",
    "severe_decelerations",
    "prolongued_decelerations",
    "abnormal_short_term_variability",
    "mean_value_of_short_term_variability",
    "percentage_of_time_with_abnormal_long_term_variability",
    "mean_value_of_long_term_variability",
    "histogram_width",
    "histogram_min",
    "histogram_max",
    "histogram_number_of_peaks",
    "histogram_number_of_zeroes",
    "histogram_mode",
    "histogram_mean",
    "histogram_median",
    "histogram_variance",
    "histogram_tendency",
];

/// The ten user-editable CTG inputs, in model order.
pub const FETAL_INPUT_FIELDS: [FieldSpec; 10] = [
    decimal("baseline_value", "Baseline Value", 50.0, 250.0, 120.0, 0.1),
    decimal("accelerations", "Accelerations", 0.0, 1.0, 0.0, 0.001),
    decimal("fetal_movement", "Fetal Movement", 0.0, 1.0, 0.0, 0.001),
    decimal("uterine_contractions", "Uterine Contractions", 0.0, 1.0, 0.0, 0.001),
    decimal("light_decelerations", "Light Decelerations", 0.0, 1.0, 0.0, 0.001),
    decimal("severe_decelerations", "Severe Decelerations", 0.0, 1.0, 0.0, 0.001),
    decimal("prolongued_decelerations", "Prolongued Decelerations", 0.0, 1.0, 0.0, 0.001),
    decimal(
        "abnormal_short_term_variability",
        "Abnormal Short Term Variability",
        0.0,
        100.0,
        73.0,
        0.1,
    ),
    decimal(
        "mean_value_of_short_term_variability",
        "Mean Value Of Short Term Variability",
        0.0,
        10.0,
        0.5,
        0.1,
    ),
    decimal(
        "percentage_of_time_with_abnormal_long_term_variability",
        "Percentage Of Time With ALTV",
        0.0,
        100.0,
        43.0,
        0.1,
    ),
];

/// Histogram statistics appended after the CTG inputs. Not user-editable.
pub const FETAL_CONSTANTS: [(&str, f64); 11] = [
    ("mean_value_of_long_term_variability", 10.0),
    ("histogram_width", 64.0),
    ("histogram_min", 62.0),
    ("histogram_max", 126.0),
    ("histogram_number_of_peaks", 2.0),
    ("histogram_number_of_zeroes", 0.0),
    ("histogram_mode", 120.0),
    ("histogram_mean", 137.0),
    ("histogram_median", 121.0),
    ("histogram_variance", 73.0),
    ("histogram_tendency", 1.0),
];

/// Look up an input field by column name or label, case-insensitively.
pub fn find_field<'a>(fields: &'a [FieldSpec], key: &str) -> Option<&'a FieldSpec> {
    let key = key.trim();
    fields
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(key) || f.label.eq_ignore_ascii_case(key))
}

/// Arrow schema definitions for feature vectors and dashboard data.
pub mod tables {
    use arrow::datatypes::{DataType, Field, Schema};

    use super::ModelId;

    /// One Float64 column per feature, in model order.
    pub fn feature_schema(model: ModelId) -> Schema {
        Schema::new(
            model
                .field_names()
                .iter()
                .map(|name| Field::new(*name, DataType::Float64, false))
                .collect::<Vec<_>>(),
        )
    }

    /// Schema for the static risk-distribution table shown on the dashboard.
    pub fn risk_distribution_schema() -> Schema {
        Schema::new(vec![
            Field::new("Age Group", DataType::Utf8, false),
            Field::new("Low Risk", DataType::UInt32, false),
            Field::new("Medium Risk", DataType::UInt32, false),
            Field::new("High Risk", DataType::UInt32, false),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_tables_follow_model_order() {
        let maternal: Vec<&str> = MATERNAL_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(maternal, MATERNAL_FIELD_NAMES);

        let fetal: Vec<&str> = FETAL_INPUT_FIELDS
            .iter()
            .map(|f| f.name)
            .chain(FETAL_CONSTANTS.iter().map(|(name, _)| *name))
            .collect();
        assert_eq!(fetal, FETAL_FIELD_NAMES);
    }

    #[test]
    fn arity_per_model() {
        assert_eq!(ModelId::Maternal.arity(), 5);
        assert_eq!(ModelId::Fetal.arity(), 21);
    }

    #[test]
    fn defaults_lie_within_bounds() {
        for f in MATERNAL_FIELDS.iter().chain(FETAL_INPUT_FIELDS.iter()) {
            assert!(f.check(f.default).is_ok(), "{} default out of bounds", f.name);
        }
    }

    #[test]
    fn parse_rejects_out_of_range() {
        let age = &MATERNAL_FIELDS[0];
        assert_eq!(age.parse(" 45 ").unwrap(), 45.0);
        assert!(matches!(
            age.parse("101"),
            Err(InputError::OutOfRange { field: "Age", .. })
        ));
        assert!(matches!(age.parse("-1"), Err(InputError::OutOfRange { .. })));
    }

    #[test]
    fn parse_rejects_garbage_and_nan() {
        let bs = &MATERNAL_FIELDS[2];
        assert!(matches!(bs.parse("abc"), Err(InputError::NotANumber { .. })));
        assert!(matches!(bs.parse("NaN"), Err(InputError::OutOfRange { .. })));
        assert!(matches!(bs.parse("inf"), Err(InputError::OutOfRange { .. })));
    }

    #[test]
    fn integer_fields_reject_fractions() {
        let heart_rate = &MATERNAL_FIELDS[4];
        assert!(matches!(
            heart_rate.parse("72.5"),
            Err(InputError::NotInteger { field: "HeartRate", .. })
        ));
        // Decimal fields accept them.
        assert_eq!(MATERNAL_FIELDS[3].parse("36.6").unwrap(), 36.6);
    }

    #[test]
    fn find_field_by_name_or_label() {
        assert_eq!(find_field(&MATERNAL_FIELDS, "bs").unwrap().name, "BS");
        assert_eq!(
            find_field(&MATERNAL_FIELDS, "Heart rate (bpm)").unwrap().name,
            "HeartRate"
        );
        assert!(find_field(&MATERNAL_FIELDS, "SystolicBP").is_none());
    }

    #[test]
    fn format_uses_step_precision() {
        assert_eq!(MATERNAL_FIELDS[0].format(30.0), "30");
        assert_eq!(MATERNAL_FIELDS[2].format(5.0), "5.0");
        assert_eq!(FETAL_INPUT_FIELDS[1].format(0.004), "0.004");
        assert_eq!(FETAL_INPUT_FIELDS[1].format(0.0), "0.000");
    }

    #[test]
    fn format_keeps_digits_finer_than_step() {
        let bs = &MATERNAL_FIELDS[2];
        let value = bs.parse("5.06").unwrap();
        assert_eq!(bs.format(value), "5.06");
        assert_eq!(bs.format(value).parse::<f64>().unwrap(), value);
        assert_eq!(FETAL_INPUT_FIELDS[0].format(120.125), "120.125");
    }

    #[test]
    fn feature_schema_matches_field_names() {
        let schema = tables::feature_schema(ModelId::Fetal);
        assert_eq!(schema.fields().len(), 21);
        assert_eq!(schema.field(0).name(), "baseline_value");
        assert_eq!(schema.field(20).name(), "histogram_tendency");
    }

    #[test]
    fn model_id_serde_names() {
        let json = serde_json::to_string(&ModelId::Maternal).unwrap();
        assert_eq!(json, "\"maternal\"");
        let parsed: ModelId = serde_json::from_str("\"fetal\"").unwrap();
        assert_eq!(parsed, ModelId::Fetal);
    }
}
