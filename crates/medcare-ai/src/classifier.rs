//! Pure-Rust classifier back ends.
//!
//! Two model families cover what the trained artifacts use: averaged
//! decision-tree ensembles (random forests, single trees) and multinomial
//! logistic regression. Both are immutable once built and evaluate a row
//! without allocation beyond one score buffer.

use serde::{Deserialize, Serialize};

/// A trained classifier over one fixed-width feature row.
///
/// Implementations must be deterministic: the same row always yields the
/// same label.
pub trait Classifier: Send + Sync {
    /// Predict the class label for one row. A row whose width differs from
    /// `n_features()` is an error.
    fn predict(&self, features: &[f64]) -> anyhow::Result<i64>;

    /// Width of the feature row the model was trained on.
    fn n_features(&self) -> usize;

    /// Short description for `medcare models`.
    fn info(&self) -> ModelInfo;
}

/// Human-readable summary of a loaded model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub format: &'static str,
    pub detail: String,
}

// ── Decision-tree ensembles ──

/// One node of a flattened decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Rows with `x[feature] <= threshold` go `left`, others go `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (sample counts or probabilities).
    Leaf { value: Vec<f64> },
}

/// A decision tree stored as a node array with node 0 as root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Check structure against the ensemble's widths.
    ///
    /// Children must come after their parent in the array, so every walk
    /// terminates.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {i}: feature {feature} >= {n_features}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i}: threshold is not finite"));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= len {
                            return Err(format!("node {i}: child {child} out of order"));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "node {i}: leaf has {} weights, expected {n_classes}",
                            value.len()
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("node {i}: leaf weights must be finite and >= 0"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its weights.
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { value } => return value,
            }
        }
    }
}

/// Averaged ensemble of decision trees.
///
/// Each tree's leaf weights are normalised to a distribution; the ensemble
/// averages them and predicts the class with the highest mean.
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    classes: Vec<i64>,
    n_features: usize,
}

impl TreeEnsemble {
    pub fn new(trees: Vec<Tree>, classes: Vec<i64>, n_features: usize) -> Result<Self, String> {
        if trees.is_empty() {
            return Err("ensemble has no trees".into());
        }
        if classes.is_empty() {
            return Err("ensemble has no classes".into());
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(n_features, classes.len())
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(Self {
            trees,
            classes,
            n_features,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean per-class distribution across trees.
    ///
    /// Panics if `features` is shorter than `n_features`; [`Classifier::predict`]
    /// checks the width first.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let weights = tree.leaf(features);
            let total: f64 = weights.iter().sum();
            if total > 0.0 {
                for (p, w) in proba.iter_mut().zip(weights) {
                    *p += w / total;
                }
            }
        }
        let n = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n;
        }
        proba
    }
}

impl Classifier for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> anyhow::Result<i64> {
        check_width(features, self.n_features)?;
        let proba = self.predict_proba(features);
        tracing::trace!(?proba, "tree ensemble distribution");
        Ok(self.classes[argmax(&proba)])
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn info(&self) -> ModelInfo {
        let nodes: usize = self.trees.iter().map(|t| t.nodes.len()).sum();
        ModelInfo {
            format: "forest",
            detail: format!(
                "{} trees, {nodes} nodes, {} features, classes {:?}",
                self.n_trees(),
                self.n_features,
                self.classes
            ),
        }
    }
}

// ── Logistic regression ──

/// Multinomial logistic regression: one weight row and intercept per class.
///
/// The predicted class maximises the linear score, which is also the
/// softmax argmax, so no exponentials are evaluated.
pub struct LogisticModel {
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    classes: Vec<i64>,
    n_features: usize,
}

impl LogisticModel {
    pub fn new(
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
        classes: Vec<i64>,
        n_features: usize,
    ) -> Result<Self, String> {
        if classes.is_empty() {
            return Err("model has no classes".into());
        }
        if coef.len() != classes.len() || intercept.len() != classes.len() {
            return Err(format!(
                "expected {} coefficient rows and intercepts, got {} and {}",
                classes.len(),
                coef.len(),
                intercept.len()
            ));
        }
        if let Some((i, row)) = coef.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(format!("coefficient row {i} has {} values, expected {n_features}", row.len()));
        }
        if coef.iter().flatten().chain(&intercept).any(|w| !w.is_finite()) {
            return Err("coefficients must be finite".into());
        }
        Ok(Self {
            coef,
            intercept,
            classes,
            n_features,
        })
    }

    /// Linear score per class.
    pub fn decision_function(&self, features: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, features: &[f64]) -> anyhow::Result<i64> {
        check_width(features, self.n_features)?;
        let scores = self.decision_function(features);
        tracing::trace!(?scores, "logistic scores");
        Ok(self.classes[argmax(&scores)])
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            format: "logistic",
            detail: format!(
                "{} classes, {} features, classes {:?}",
                self.classes.len(),
                self.n_features,
                self.classes
            ),
        }
    }
}

fn check_width(features: &[f64], n_features: usize) -> anyhow::Result<()> {
    anyhow::ensure!(
        features.len() == n_features,
        "expected {n_features} features, got {}",
        features.len()
    );
    Ok(())
}

/// Index of the largest value; ties go to the lowest index.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
