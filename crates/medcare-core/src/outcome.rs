//! Fixed category tables: what each model's output index means.

use std::fmt;

use serde::Serialize;

use crate::schema::ModelId;

/// Number of categories both classifiers emit.
pub const CATEGORY_COUNT: u8 = 3;

/// Presentation colour attached to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Green,
    Orange,
    Red,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SEVERITIES: [Severity; 3] = [Severity::Green, Severity::Orange, Severity::Red];
const MATERNAL_LABELS: [&str; 3] = ["Low Risk", "Medium Risk", "High Risk"];
const FETAL_LABELS: [&str; 3] = ["Normal", "Suspect", "Pathological"];

/// Label and colour for `category` under `model`, or `None` past the table.
pub fn lookup(model: ModelId, category: u8) -> Option<(&'static str, Severity)> {
    let idx = category as usize;
    let labels = match model {
        ModelId::Maternal => &MATERNAL_LABELS,
        ModelId::Fetal => &FETAL_LABELS,
    };
    Some((*labels.get(idx)?, SEVERITIES[idx]))
}

/// A classifier's category index with its derived label and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    pub model: ModelId,
    pub category: u8,
    pub label: &'static str,
    pub severity: Severity,
}

impl PredictionResult {
    pub fn from_category(model: ModelId, category: u8) -> Option<Self> {
        let (label, severity) = lookup(model, category)?;
        Some(Self {
            model,
            category,
            label,
            severity,
        })
    }

    /// Fill fraction for the risk progress bar: 0, 0.5, or 1.0.
    pub fn progress(&self) -> f64 {
        f64::from(self.category) / f64::from(CATEGORY_COUNT - 1)
    }

    /// "Risk Level: …" or "Fetal Health Status: …".
    pub fn headline(&self) -> String {
        match self.model {
            ModelId::Maternal => format!("Risk Level: {}", self.label),
            ModelId::Fetal => format!("Fetal Health Status: {}", self.label),
        }
    }
}
