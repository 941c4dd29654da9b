//! Text rendering for the four views.
//!
//! Every renderer returns a `String` so views can be checked in tests and
//! written to any terminal. Colour is optional ANSI on top of plain text.

use std::fmt::Write;

use arrow::util::pretty::pretty_format_batches;
use medcare_assets::Animation;
use medcare_core::dashboard::{
    self, AGE_GROUPS, CHART_TITLE, LEGEND_TITLE, RISK_SERIES, X_LABEL, Y_LABEL,
};
use medcare_ai::ModelSummary;
use medcare_core::{FeatureVector, ModelId, PredictionResult, Severity};
use owo_colors::OwoColorize;

use crate::views::{FeatureSet, Form, MenuItem, Outcome, View};

const PROGRESS_WIDTH: usize = 40;
const CHART_WIDTH: usize = 50;
const RULE: &str = "---";
const FOOTER: &str = "© 2024 MedCare. All rights reserved.";

const MISSION: &str = "At MedCare, our mission is to revolutionize healthcare by offering \
innovative solutions through predictive analysis. Our platform is specifically designed to \
address the intricate aspects of maternal and fetal health, providing accurate predictions and \
proactive risk management.";

const FEATURES: [(&str, &str); 2] = [
    (
        "1. Pregnancy Risk Prediction",
        "Analyze various parameters to predict potential risks during pregnancy.",
    ),
    (
        "2. Fetal Health Prediction",
        "Assess fetal health status using advanced algorithms and comprehensive data analysis.",
    ),
];

/// Rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    pub color: bool,
}

impl Style {
    fn paint(&self, text: &str, severity: Severity) -> String {
        if self.color {
            let (r, g, b) = rgb(severity);
            text.truecolor(r, g, b).to_string()
        } else {
            text.to_string()
        }
    }
}

fn rgb(severity: Severity) -> (u8, u8, u8) {
    match severity {
        Severity::Green => (0, 175, 0),
        Severity::Orange => (255, 135, 0),
        Severity::Red => (255, 0, 0),
    }
}

// ── Public API ──

/// Render the sidebar menu with the current selection marked.
pub fn render_sidebar(selected: MenuItem) -> String {
    let mut out = String::new();
    writeln!(out, "MedPredict").unwrap();
    writeln!(out, "Welcome to MedCare").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "Menu").unwrap();
    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let marker = if *item == selected { '>' } else { ' ' };
        writeln!(out, " {marker} {}. {}", i + 1, item.title()).unwrap();
    }
    out
}

/// Render a full view followed by the footer.
pub fn render_view(view: &View, animation: Option<&Animation>, style: Style) -> String {
    let mut out = match view {
        View::AboutUs => render_about(animation),
        View::PregnancyRisk(form) => render_form(
            "Pregnancy Risk Prediction",
            "Predict pregnancy risks by analyzing parameters such as age, blood sugar levels, \
             and blood pressure.",
            "Predict Pregnancy Risk",
            form,
            style,
        ),
        View::FetalHealth(form) => render_form(
            "Fetal Health Prediction",
            "Predict fetal health using Cardiotocogram (CTG) data.",
            "Predict Fetal Health",
            form,
            style,
        ),
        View::Dashboard => render_dashboard(style),
    };
    writeln!(out, "{RULE}").unwrap();
    writeln!(out, "{FOOTER}").unwrap();
    out
}

/// About page. Without an animation the slot is simply left out.
pub fn render_about(animation: Option<&Animation>) -> String {
    let mut out = String::new();
    writeln!(out, "Welcome to MedCare").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "{MISSION}").unwrap();
    if let Some(anim) = animation {
        writeln!(out).unwrap();
        writeln!(out, "  [animation: {}]", anim.summary()).unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out, "Our Features").unwrap();
    for (title, text) in FEATURES {
        writeln!(out).unwrap();
        writeln!(out, "  {title}").unwrap();
        writeln!(out, "    {text}").unwrap();
    }
    writeln!(out).unwrap();
    out
}

/// Prediction view: inputs, action hint, and the last outcome if any.
fn render_form<F: FeatureSet>(
    title: &str,
    info: &str,
    action: &str,
    form: &Form<F>,
    style: Style,
) -> String {
    let mut out = String::new();
    writeln!(out, "{title}").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "  i  {info}").unwrap();
    writeln!(out).unwrap();
    for (spec, value) in form.inputs() {
        writeln!(
            out,
            "  {:<40} {:>10}   [{} .. {}]",
            spec.label,
            spec.format(value),
            spec.format(spec.min),
            spec.format(spec.max)
        )
        .unwrap();
    }
    writeln!(out).unwrap();
    writeln!(out, "  ({action}: `predict`)").unwrap();

    match form.outcome() {
        Some(Outcome::Predicted(result)) => {
            writeln!(out).unwrap();
            out.push_str(&render_result(result, style));
        }
        Some(Outcome::Failed(reason)) => {
            writeln!(out).unwrap();
            writeln!(out, "  Prediction failed: {reason}").unwrap();
        }
        None => {}
    }
    writeln!(out).unwrap();
    out
}

/// Headline in the severity colour plus the model-specific visual.
pub fn render_result(result: &PredictionResult, style: Style) -> String {
    let mut out = String::new();
    let headline = result.headline();
    let painted = style.paint(&headline, result.severity);
    // Escape codes take no columns, so widen the field by their length.
    let overhead = painted.len() - headline.len();
    writeln!(out, "{painted:^width$}", width = PROGRESS_WIDTH + 8 + overhead).unwrap();
    writeln!(out, "{:^width$}", format!("({})", result.severity), width = PROGRESS_WIDTH + 8)
        .unwrap();
    match result.model {
        ModelId::Maternal => {
            writeln!(out, "{}", progress_bar(result.progress(), PROGRESS_WIDTH)).unwrap();
        }
        ModelId::Fetal => {
            out.push_str(&donut(result.label, result.severity, style));
        }
    }
    out
}

/// `[####################....................]  50%`
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        (fraction * 100.0).round() as u32
    )
}

/// A ring with the label in its hole.
pub fn donut(label: &str, severity: Severity, style: Style) -> String {
    let inner = label.chars().count() + 6;
    let width = inner + 2;
    let rows = [
        format!("  .{}.", "-".repeat(width - 6)),
        format!(" /{}\\", " ".repeat(width - 4)),
        format!("|{label:^inner$}|"),
        format!(" \\{}/", " ".repeat(width - 4)),
        format!("  '{}'", "-".repeat(width - 6)),
    ];
    let mut out = String::new();
    for row in &rows {
        writeln!(out, "    {}", style.paint(row, severity)).unwrap();
    }
    out
}

/// The current inputs as the full model vector, one column per feature.
pub fn render_features(vector: &FeatureVector) -> String {
    let table = vector
        .to_record_batch()
        .and_then(|batch| pretty_format_batches(&[batch]).map(|t| t.to_string()));
    match table {
        Ok(table) => format!("{table}\n"),
        Err(e) => format!("(feature table unavailable: {e})\n"),
    }
}

/// Loaded model listing for `medcare models`.
pub fn render_models(models: &[ModelSummary]) -> String {
    let mut out = String::new();
    for m in models {
        writeln!(
            out,
            "{:<9} {:<9} {:>2} features  {}",
            m.model.as_str(),
            m.info.format,
            m.n_features,
            m.source
        )
        .unwrap();
        if !m.info.detail.is_empty() {
            writeln!(out, "          {}", m.info.detail).unwrap();
        }
    }
    out
}

/// Dashboard: stacked horizontal bars plus the underlying table.
pub fn render_dashboard(style: Style) -> String {
    let mut out = String::new();
    writeln!(out, "Maternal Health Dashboard").unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "This dashboard provides an overview of maternal health statistics."
    )
    .unwrap();
    writeln!(out).unwrap();
    out.push_str(&stacked_bar_chart(style));
    writeln!(out).unwrap();
    let table = dashboard::risk_distribution_batch()
        .and_then(|batch| pretty_format_batches(&[batch]).map(|t| t.to_string()));
    match table {
        Ok(table) => writeln!(out, "{table}").unwrap(),
        Err(e) => writeln!(out, "(table unavailable: {e})").unwrap(),
    }
    out
}

/// One bar per age group, segments stacked Low → Medium → High.
pub fn stacked_bar_chart(style: Style) -> String {
    let totals = dashboard::group_totals();
    let max_total = totals.iter().copied().max().unwrap_or(1).max(1);
    let scale = CHART_WIDTH as f64 / f64::from(max_total);

    let mut out = String::new();
    writeln!(out, "{CHART_TITLE}").unwrap();
    writeln!(out, "  x: {X_LABEL}   y: {Y_LABEL}").unwrap();
    writeln!(out).unwrap();
    for (g, group) in AGE_GROUPS.iter().enumerate() {
        let mut bar = String::new();
        let mut stacked = 0u32;
        for series in &RISK_SERIES {
            // Round cumulative ends so segments add up to the scaled total.
            let start = (f64::from(stacked) * scale).round() as usize;
            stacked += series.values[g];
            let len = (f64::from(stacked) * scale).round() as usize - start;
            let segment = series_glyph(series.severity).to_string().repeat(len);
            bar.push_str(&style.paint(&segment, series.severity));
        }
        writeln!(out, "  {group:<6} {bar} {}", totals[g]).unwrap();
    }
    writeln!(out).unwrap();
    let legend: Vec<String> = RISK_SERIES
        .iter()
        .map(|s| {
            format!(
                "{} {} ({})",
                style.paint(&series_glyph(s.severity).to_string(), s.severity),
                s.name,
                s.severity
            )
        })
        .collect();
    writeln!(out, "  {LEGEND_TITLE}: {}", legend.join("   ")).unwrap();
    out
}

fn series_glyph(severity: Severity) -> char {
    match severity {
        Severity::Green => '=',
        Severity::Orange => '+',
        Severity::Red => '#',
    }
}
