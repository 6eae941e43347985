//! Frozen numeric scalers fitted offline on the continuous features.

use serde::{Deserialize, Serialize};

/// Applies a pre-fitted column-wise transform to one row.
pub trait FeatureScaler: Send + Sync {
    fn kind(&self) -> &'static str;
    fn width(&self) -> usize;
    fn feature_names(&self) -> Option<&[String]>;
    fn transform(&self, columns: &[String], values: &[f64]) -> Result<Vec<f64>, ScalerError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalerError {
    #[error("scaler expects {expected} values, received {found}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("scaler was fitted on columns {expected:?}, received {found:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("value for {column} is not finite")]
    NonFinite { column: String },
}

/// Serialized scaler, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

/// `(x - mean) / scale`, with a zero scale treated as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// `x * scale + min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    /// Structural problems that make the artifact unusable.
    pub fn consistency_problem(&self) -> Option<String> {
        let (names, first, second, labels) = match self {
            Scaler::Standard(inner) => (
                inner.feature_names.as_ref(),
                inner.mean.len(),
                inner.scale.len(),
                ("mean", "scale"),
            ),
            Scaler::MinMax(inner) => (
                inner.feature_names.as_ref(),
                inner.min.len(),
                inner.scale.len(),
                ("min", "scale"),
            ),
        };

        if first == 0 {
            return Some(format!("{} is empty", labels.0));
        }
        if first != second {
            return Some(format!(
                "{} has {} entries but {} has {}",
                labels.0, first, labels.1, second
            ));
        }
        if let Some(names) = names {
            if names.len() != first {
                return Some(format!(
                    "feature_names has {} entries but the scaler is {} wide",
                    names.len(),
                    first
                ));
            }
        }
        let mut params = match self {
            Scaler::Standard(inner) => inner.mean.iter().chain(&inner.scale),
            Scaler::MinMax(inner) => inner.min.iter().chain(&inner.scale),
        };
        if params.any(|value| !value.is_finite()) {
            return Some("parameters contain non-finite values".to_string());
        }
        None
    }

    fn check_input(&self, columns: &[String], values: &[f64]) -> Result<(), ScalerError> {
        let width = self.width();
        if values.len() != width || columns.len() != width {
            return Err(ScalerError::WidthMismatch {
                expected: width,
                found: values.len().max(columns.len()),
            });
        }
        if let Some(expected) = self.feature_names() {
            if expected != columns {
                return Err(ScalerError::ColumnMismatch {
                    expected: expected.to_vec(),
                    found: columns.to_vec(),
                });
            }
        }
        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(ScalerError::NonFinite {
                column: columns[index].clone(),
            });
        }
        Ok(())
    }
}

impl FeatureScaler for Scaler {
    fn kind(&self) -> &'static str {
        match self {
            Scaler::Standard(_) => "standard",
            Scaler::MinMax(_) => "min_max",
        }
    }

    fn width(&self) -> usize {
        match self {
            Scaler::Standard(inner) => inner.mean.len(),
            Scaler::MinMax(inner) => inner.min.len(),
        }
    }

    fn feature_names(&self) -> Option<&[String]> {
        match self {
            Scaler::Standard(inner) => inner.feature_names.as_deref(),
            Scaler::MinMax(inner) => inner.feature_names.as_deref(),
        }
    }

    fn transform(&self, columns: &[String], values: &[f64]) -> Result<Vec<f64>, ScalerError> {
        self.check_input(columns, values)?;

        let scaled = match self {
            Scaler::Standard(inner) => values
                .iter()
                .zip(inner.mean.iter().zip(&inner.scale))
                .map(|(value, (mean, scale))| {
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    (value - mean) / scale
                })
                .collect(),
            Scaler::MinMax(inner) => values
                .iter()
                .zip(inner.min.iter().zip(&inner.scale))
                .map(|(value, (min, scale))| value * scale + min)
                .collect(),
        };
        Ok(scaled)
    }
}
