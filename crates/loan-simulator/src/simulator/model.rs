//! Frozen binary classifiers deserialized from the training export.

use serde::{Deserialize, Serialize};

use super::domain::LoanDecision;
use super::features::ModelRow;

/// `[p_reject, p_approve]` for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    pub reject: f64,
    pub approve: f64,
}

impl ClassProbabilities {
    /// Ties resolve to the first class, so an even split is a rejection.
    pub fn decision(&self) -> LoanDecision {
        if self.approve > self.reject {
            LoanDecision::Approved
        } else {
            LoanDecision::Rejected
        }
    }

    fn checked(reject: f64, approve: f64) -> Result<Self, PredictionError> {
        let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_unit(reject) || !in_unit(approve) {
            return Err(PredictionError::Malformed(format!(
                "class probabilities [{reject}, {approve}] are outside [0, 1]"
            )));
        }
        Ok(Self { reject, approve })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("feature names should match those passed during fit: expected {expected:?}, got {actual:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("row has {found} features, but the classifier expects {expected}")]
    FeatureCount { expected: usize, found: usize },
    #[error("input value for {column} is not finite")]
    NonFiniteInput { column: String },
    #[error("classifier produced a malformed prediction: {0}")]
    Malformed(String),
}

/// A frozen two-class model.
pub trait BinaryClassifier: Send + Sync {
    fn kind(&self) -> &'static str;
    fn n_features(&self) -> usize;
    fn feature_names(&self) -> Option<&[String]>;
    fn predict_proba(&self, row: &ModelRow) -> Result<ClassProbabilities, PredictionError>;

    fn predict(&self, row: &ModelRow) -> Result<LoanDecision, PredictionError> {
        Ok(self.predict_proba(row)?.decision())
    }
}

fn check_row(
    row: &ModelRow,
    n_features: usize,
    feature_names: Option<&[String]>,
) -> Result<(), PredictionError> {
    if let Some(expected) = feature_names {
        if expected != row.columns() {
            return Err(PredictionError::ColumnMismatch {
                expected: expected.to_vec(),
                actual: row.columns().to_vec(),
            });
        }
    }
    if row.len() != n_features {
        return Err(PredictionError::FeatureCount {
            expected: n_features,
            found: row.len(),
        });
    }
    if let Some(index) = row.values().iter().position(|value| !value.is_finite()) {
        return Err(PredictionError::NonFiniteInput {
            column: row.columns()[index].clone(),
        });
    }
    Ok(())
}

/// Serialized classifier, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl Classifier {
    pub fn consistency_problem(&self) -> Option<String> {
        match self {
            Classifier::LogisticRegression(model) => model.consistency_problem(),
            Classifier::RandomForest(model) => model.consistency_problem(),
        }
    }
}

impl BinaryClassifier for Classifier {
    fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression(_) => "logistic_regression",
            Classifier::RandomForest(_) => "random_forest",
        }
    }

    fn n_features(&self) -> usize {
        match self {
            Classifier::LogisticRegression(model) => model.coefficients.len(),
            Classifier::RandomForest(model) => model.n_features,
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            Classifier::LogisticRegression(model) => model.feature_names.as_deref(),
            Classifier::RandomForest(model) => model.feature_names.as_deref(),
        }
    }

    fn predict_proba(&self, row: &ModelRow) -> Result<ClassProbabilities, PredictionError> {
        check_row(row, self.n_features(), self.feature_names())?;
        match self {
            Classifier::LogisticRegression(model) => model.probabilities(row.values()),
            Classifier::RandomForest(model) => model.probabilities(row.values()),
        }
    }
}

/// `p_approve = sigmoid(coefficients · x + intercept)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn consistency_problem(&self) -> Option<String> {
        if self.coefficients.is_empty() {
            return Some("coefficients are empty".to_string());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Some(format!(
                    "{} feature names for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                ));
            }
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Some("parameters contain non-finite values".to_string());
        }
        None
    }

    fn probabilities(&self, values: &[f64]) -> Result<ClassProbabilities, PredictionError> {
        let margin = self
            .coefficients
            .iter()
            .zip(values)
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;

        let approve = sigmoid(margin);
        ClassProbabilities::checked(1.0 - approve, approve)
    }
}

fn sigmoid(margin: f64) -> f64 {
    if margin >= 0.0 {
        1.0 / (1.0 + (-margin).exp())
    } else {
        let e = margin.exp();
        e / (1.0 + e)
    }
}

/// Bagged decision trees; the probability is the mean of per-tree leaf distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn consistency_problem(&self) -> Option<String> {
        if self.n_features == 0 {
            return Some("n_features is zero".to_string());
        }
        if self.trees.is_empty() {
            return Some("forest has no trees".to_string());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Some(format!(
                    "{} feature names for n_features = {}",
                    names.len(),
                    self.n_features
                ));
            }
        }
        self.trees
            .iter()
            .enumerate()
            .find_map(|(index, tree)| {
                tree.consistency_problem(self.n_features)
                    .map(|problem| format!("tree {index}: {problem}"))
            })
    }

    fn probabilities(&self, values: &[f64]) -> Result<ClassProbabilities, PredictionError> {
        let mut reject = 0.0;
        let mut approve = 0.0;
        for tree in &self.trees {
            let [r, a] = tree.leaf_distribution(values)?;
            reject += r;
            approve += a;
        }
        let count = self.trees.len() as f64;
        ClassProbabilities::checked(reject / count, approve / count)
    }
}

/// One tree in flat node-array layout. A child index of `-1` marks a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights `[reject, approve]`.
    pub value: Vec<[f64; 2]>,
}

const LEAF: i64 = -1;

impl DecisionTree {
    fn consistency_problem(&self, n_features: usize) -> Option<String> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Some("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != nodes)
        {
            return Some("node arrays have different lengths".to_string());
        }

        let in_bounds = |child: i64| child == LEAF || (child > 0 && (child as usize) < nodes);
        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if !in_bounds(left) || !in_bounds(right) || ((left == LEAF) != (right == LEAF)) {
                return Some(format!("node {node} has invalid children"));
            }
            if left != LEAF {
                let feature = self.feature[node];
                if feature < 0 || feature as usize >= n_features {
                    return Some(format!("node {node} splits on unknown feature {feature}"));
                }
            } else if self.value[node].iter().sum::<f64>() <= 0.0 {
                return Some(format!("leaf {node} has no class weight"));
            }
        }
        None
    }

    fn leaf_distribution(&self, values: &[f64]) -> Result<[f64; 2], PredictionError> {
        let mut node = 0usize;
        // a well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.children_left.len() {
            let left = self.children_left[node];
            if left == LEAF {
                let [reject, approve] = self.value[node];
                let total = reject + approve;
                return Ok([reject / total, approve / total]);
            }
            let value = usize::try_from(self.feature[node])
                .ok()
                .and_then(|feature| values.get(feature))
                .ok_or_else(|| {
                    PredictionError::Malformed(format!("node {node} splits on a missing feature"))
                })?;
            node = if *value <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Err(PredictionError::Malformed(
            "decision path does not terminate".to_string(),
        ))
    }
}
