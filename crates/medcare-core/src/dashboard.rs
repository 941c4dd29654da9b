//! Static sample data for the maternal health dashboard.
//!
//! Illustrative only: nothing here is derived from predictions.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt32Array};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::outcome::Severity;
use crate::schema::tables;

pub const CHART_TITLE: &str = "Pregnancy Risk Distribution by Age Group";
pub const X_LABEL: &str = "Age Group";
pub const Y_LABEL: &str = "Number of Pregnancies";
pub const LEGEND_TITLE: &str = "Risk Level";

pub const AGE_GROUPS: [&str; 4] = ["18-25", "26-35", "36-45", "46+"];

/// One stacked series of the risk-distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskSeries {
    pub name: &'static str,
    pub severity: Severity,
    /// One count per entry in [`AGE_GROUPS`].
    pub values: [u32; 4],
}

/// Series in stacking order, bottom first.
pub const RISK_SERIES: [RiskSeries; 3] = [
    RiskSeries {
        name: "Low Risk",
        severity: Severity::Green,
        values: [30, 40, 20, 10],
    },
    RiskSeries {
        name: "Medium Risk",
        severity: Severity::Orange,
        values: [15, 25, 30, 20],
    },
    RiskSeries {
        name: "High Risk",
        severity: Severity::Red,
        values: [5, 10, 15, 25],
    },
];

/// Stacked total per age group.
pub fn group_totals() -> [u32; 4] {
    let mut totals = [0u32; 4];
    for series in &RISK_SERIES {
        for (t, v) in totals.iter_mut().zip(series.values) {
            *t += v;
        }
    }
    totals
}

/// The sample table as an Arrow batch, one row per age group.
pub fn risk_distribution_batch() -> Result<RecordBatch, ArrowError> {
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(AGE_GROUPS.to_vec()))];
    columns.extend(
        RISK_SERIES
            .iter()
            .map(|s| Arc::new(UInt32Array::from(s.values.to_vec())) as ArrayRef),
    );
    RecordBatch::try_new(Arc::new(tables::risk_distribution_schema()), columns)
}
