//! Navigation state machine and prediction forms.
//!
//! The menu selection is the only way between views. Every selection builds
//! a fresh view, so prediction inputs reset to their defaults on re-entry.

use medcare_ai::{GatewayError, ModelGateway};
use medcare_core::schema::{FETAL_INPUT_FIELDS, MATERNAL_FIELDS, find_field};
use medcare_core::{
    FeatureVector, FetalFeatures, FieldSpec, InputError, MaternalFeatures, ModelId,
    PredictionResult,
};

/// Sidebar menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AboutUs,
    PregnancyRisk,
    FetalHealth,
    Dashboard,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::AboutUs,
        MenuItem::PregnancyRisk,
        MenuItem::FetalHealth,
        MenuItem::Dashboard,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::AboutUs => "About us",
            Self::PregnancyRisk => "Pregnancy Risk Prediction",
            Self::FetalHealth => "Fetal Health Prediction",
            Self::Dashboard => "Dashboard",
        }
    }

    /// Accepts a 1-based menu number, the full title, or a short alias.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|item| item.title().eq_ignore_ascii_case(&lower))
            .or(match lower.as_str() {
                "about" => Some(Self::AboutUs),
                "pregnancy" | "maternal" => Some(Self::PregnancyRisk),
                "fetal" => Some(Self::FetalHealth),
                "dashboard" => Some(Self::Dashboard),
                _ => None,
            })
    }
}

/// A typed feature struct that a form can edit field by field.
pub trait FeatureSet: Default + Copy {
    const MODEL: ModelId;

    /// User-editable inputs, in model order.
    fn fields() -> &'static [FieldSpec];

    fn field_mut(&mut self, name: &str) -> Option<&mut f64>;

    fn to_vector(&self) -> FeatureVector;
}

impl FeatureSet for MaternalFeatures {
    const MODEL: ModelId = ModelId::Maternal;

    fn fields() -> &'static [FieldSpec] {
        &MATERNAL_FIELDS
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        MaternalFeatures::field_mut(self, name)
    }

    fn to_vector(&self) -> FeatureVector {
        MaternalFeatures::to_vector(self)
    }
}

impl FeatureSet for FetalFeatures {
    const MODEL: ModelId = ModelId::Fetal;

    fn fields() -> &'static [FieldSpec] {
        &FETAL_INPUT_FIELDS
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut f64> {
        FetalFeatures::field_mut(self, name)
    }

    fn to_vector(&self) -> FeatureVector {
        FetalFeatures::to_vector(self)
    }
}

/// Inputs plus the outcome of the last predict action.
#[derive(Debug, Clone, Default)]
pub struct Form<F: FeatureSet> {
    features: F,
    outcome: Option<Outcome>,
}

/// What the last predict action produced, shown under the inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Predicted(PredictionResult),
    Failed(String),
}

impl<F: FeatureSet> Form<F> {
    pub fn features(&self) -> &F {
        &self.features
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Current `(field, value)` for every editable input.
    pub fn inputs(&self) -> Vec<(&'static FieldSpec, f64)> {
        F::fields()
            .iter()
            .zip(self.features.to_vector().values().iter().copied())
            .collect()
    }

    /// Parse and store one input. On error the previous value is kept.
    ///
    /// Editing an input clears the last result, as it no longer matches.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<f64, InputError> {
        let spec = find_field(F::fields(), key)
            .ok_or_else(|| InputError::UnknownField(key.trim().to_string()))?;
        let value = spec.parse(raw)?;
        self.store(spec, value);
        Ok(value)
    }

    /// Range-check and store an already-numeric input.
    pub fn set_value(&mut self, key: &str, value: f64) -> Result<f64, InputError> {
        let spec = find_field(F::fields(), key)
            .ok_or_else(|| InputError::UnknownField(key.trim().to_string()))?;
        let value = spec.check(value)?;
        self.store(spec, value);
        Ok(value)
    }

    fn store(&mut self, spec: &FieldSpec, value: f64) {
        if let Some(slot) = self.features.field_mut(spec.name) {
            *slot = value;
            self.outcome = None;
        }
    }

    /// Run the model on the current inputs and keep the outcome for rendering.
    ///
    /// Gateway errors are kept in the form as well as returned, so the view
    /// can show them without ending the session.
    pub fn predict(&mut self, gateway: &ModelGateway) -> Result<PredictionResult, GatewayError> {
        match gateway.predict_result(F::MODEL, &self.features.to_vector()) {
            Ok(result) => {
                self.outcome = Some(Outcome::Predicted(result));
                Ok(result)
            }
            Err(e) => {
                self.outcome = Some(Outcome::Failed(e.to_string()));
                Err(e)
            }
        }
    }
}

/// The four views. Each variant carries only its own state.
#[derive(Debug, Clone)]
pub enum View {
    AboutUs,
    PregnancyRisk(Form<MaternalFeatures>),
    FetalHealth(Form<FetalFeatures>),
    Dashboard,
}

impl Default for View {
    fn default() -> Self {
        Self::select(MenuItem::AboutUs)
    }
}

impl View {
    /// Enter the view for `item` with all inputs at their defaults.
    pub fn select(item: MenuItem) -> Self {
        match item {
            MenuItem::AboutUs => Self::AboutUs,
            MenuItem::PregnancyRisk => Self::PregnancyRisk(Form::default()),
            MenuItem::FetalHealth => Self::FetalHealth(Form::default()),
            MenuItem::Dashboard => Self::Dashboard,
        }
    }

    pub fn item(&self) -> MenuItem {
        match self {
            Self::AboutUs => MenuItem::AboutUs,
            Self::PregnancyRisk(_) => MenuItem::PregnancyRisk,
            Self::FetalHealth(_) => MenuItem::FetalHealth,
            Self::Dashboard => MenuItem::Dashboard,
        }
    }
}
