use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::model::{BinaryClassifier, Classifier};
use super::scaler::{FeatureScaler, Scaler};
use crate::config::ArtifactConfig;

/// The four files a simulator needs before it can serve a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Classifier,
    Scaler,
    ModelColumns,
    ScaledColumns,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Classifier,
        ArtifactKind::Scaler,
        ArtifactKind::ModelColumns,
        ArtifactKind::ScaledColumns,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ArtifactKind::Classifier => "classifier",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::ModelColumns => "model column list",
            ArtifactKind::ScaledColumns => "scaled column list",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("required {kind} file not found: {}", path.display())]
    Missing { kind: ArtifactKind, path: PathBuf },
    #[error("unable to read {kind} file {}: {source}", path.display())]
    Unreadable {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} file {} is malformed: {source}", path.display())]
    Malformed {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} file {} is inconsistent: {detail}", path.display())]
    Inconsistent {
        kind: ArtifactKind,
        path: PathBuf,
        detail: String,
    },
}

impl ArtifactError {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactError::Missing { kind, .. }
            | ArtifactError::Unreadable { kind, .. }
            | ArtifactError::Malformed { kind, .. }
            | ArtifactError::Inconsistent { kind, .. } => *kind,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ArtifactError::Missing { path, .. }
            | ArtifactError::Unreadable { path, .. }
            | ArtifactError::Malformed { path, .. }
            | ArtifactError::Inconsistent { path, .. } => path,
        }
    }
}

/// The ordered column lists exported next to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    pub model_columns: Vec<String>,
    pub scaled_columns: Vec<String>,
}

/// Frozen classifier, scaler and column lists, loaded once per process.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub classifier: Classifier,
    pub scaler: Scaler,
    pub columns: ColumnLayout,
}

/// Short description of a loaded bundle for logs and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub classifier_kind: &'static str,
    pub classifier_features: usize,
    pub scaler_kind: &'static str,
    pub scaler_width: usize,
    pub model_columns: Vec<String>,
    pub scaled_columns: Vec<String>,
}

impl ArtifactBundle {
    /// Read every artifact, failing on the first one that is missing or unusable.
    pub fn load(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        for kind in ArtifactKind::ALL {
            let path = config.path(kind);
            if !path.is_file() {
                return Err(ArtifactError::Missing { kind, path });
            }
        }

        let classifier_path = config.path(ArtifactKind::Classifier);
        let classifier: Classifier = read_json(ArtifactKind::Classifier, &classifier_path)?;
        if let Some(detail) = classifier.consistency_problem() {
            return Err(ArtifactError::Inconsistent {
                kind: ArtifactKind::Classifier,
                path: classifier_path,
                detail,
            });
        }

        let scaler_path = config.path(ArtifactKind::Scaler);
        let scaler: Scaler = read_json(ArtifactKind::Scaler, &scaler_path)?;
        if let Some(detail) = scaler.consistency_problem() {
            return Err(ArtifactError::Inconsistent {
                kind: ArtifactKind::Scaler,
                path: scaler_path,
                detail,
            });
        }

        let model_columns = read_columns(config, ArtifactKind::ModelColumns)?;
        let scaled_columns = read_columns(config, ArtifactKind::ScaledColumns)?;

        if scaler.width() != scaled_columns.len() {
            return Err(ArtifactError::Inconsistent {
                kind: ArtifactKind::Scaler,
                path: scaler_path,
                detail: format!(
                    "scaler is {} wide but {} scaled columns are listed",
                    scaler.width(),
                    scaled_columns.len()
                ),
            });
        }

        if let Some(names) = classifier.feature_names() {
            if names != model_columns.as_slice() {
                warn!(
                    classifier_columns = ?names,
                    model_columns = ?model_columns,
                    "classifier feature names differ from the model column list; predictions will fail"
                );
            }
        }

        let bundle = Self {
            classifier,
            scaler,
            columns: ColumnLayout {
                model_columns,
                scaled_columns,
            },
        };

        info!(
            directory = %config.directory.display(),
            classifier = bundle.classifier.kind(),
            features = bundle.classifier.n_features(),
            scaler = bundle.scaler.kind(),
            "model artifacts loaded"
        );

        Ok(bundle)
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            classifier_kind: self.classifier.kind(),
            classifier_features: self.classifier.n_features(),
            scaler_kind: self.scaler.kind(),
            scaler_width: self.scaler.width(),
            model_columns: self.columns.model_columns.clone(),
            scaled_columns: self.columns.scaled_columns.clone(),
        }
    }
}

fn read_json<T: DeserializeOwned>(kind: ArtifactKind, path: &Path) -> Result<T, ArtifactError> {
    debug!(%kind, path = %path.display(), "reading artifact");
    let raw = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ArtifactError::Missing {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Unreadable {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&raw).map_err(|source| ArtifactError::Malformed {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn read_columns(config: &ArtifactConfig, kind: ArtifactKind) -> Result<Vec<String>, ArtifactError> {
    let path = config.path(kind);
    let columns: Vec<String> = read_json(kind, &path)?;

    if columns.is_empty() {
        return Err(ArtifactError::Inconsistent {
            kind,
            path,
            detail: "column list is empty".to_string(),
        });
    }

    let mut seen: BTreeSet<&String> = BTreeSet::new();
    if let Some(duplicate) = columns.iter().find(|name| !seen.insert(*name)) {
        return Err(ArtifactError::Inconsistent {
            kind,
            detail: format!("column {duplicate} is listed twice"),
            path,
        });
    }

    Ok(columns)
}
