use std::sync::Arc;

use tracing::{debug, warn};

use super::artifacts::{ArtifactBundle, ColumnLayout};
use super::domain::{
    ApplicationEcho, LoanApplication, PredictionResult, SimulationOutcome, ValidatedApplication,
};
use super::features::{self, ColumnDiagnostics, FeatureError, PreparedFeatures};
use super::model::{BinaryClassifier, Classifier, PredictionError};
use super::scaler::{FeatureScaler, Scaler};
use super::validation::{validate, ValidationError};

/// Service composing validation, the feature pipeline and the frozen classifier.
pub struct LoanSimulator<C, S> {
    classifier: Arc<C>,
    scaler: Arc<S>,
    columns: Arc<ColumnLayout>,
}

impl<C, S> Clone for LoanSimulator<C, S> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
            scaler: Arc::clone(&self.scaler),
            columns: Arc::clone(&self.columns),
        }
    }
}

impl LoanSimulator<Classifier, Scaler> {
    pub fn from_artifacts(bundle: ArtifactBundle) -> Self {
        Self::new(
            Arc::new(bundle.classifier),
            Arc::new(bundle.scaler),
            bundle.columns,
        )
    }
}

impl<C, S> LoanSimulator<C, S>
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    pub fn new(classifier: Arc<C>, scaler: Arc<S>, columns: ColumnLayout) -> Self {
        Self {
            classifier,
            scaler,
            columns: Arc::new(columns),
        }
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.columns
    }

    /// Run the feature pipeline without calling the classifier.
    pub fn prepare(
        &self,
        application: &ValidatedApplication,
    ) -> Result<PreparedFeatures, FeatureError> {
        features::prepare(
            application,
            self.scaler.as_ref(),
            &self.columns.scaled_columns,
            &self.columns.model_columns,
        )
    }

    /// Validate, derive features and classify one application.
    pub fn simulate(
        &self,
        application: LoanApplication,
    ) -> Result<SimulationOutcome, SimulationError> {
        let validated = validate(application)?;
        let prepared = self.prepare(&validated)?;

        let probabilities = self
            .classifier
            .predict_proba(&prepared.row)
            .map_err(|err| classifier_error(err, &prepared))?;
        let decision = self
            .classifier
            .predict(&prepared.row)
            .map_err(|err| classifier_error(err, &prepared))?;

        debug!(
            decision = decision.label(),
            approval_probability = probabilities.approve,
            "simulation scored"
        );

        Ok(SimulationOutcome {
            echo: ApplicationEcho::from(validated.application()),
            prediction: PredictionResult {
                decision,
                approval_probability: probabilities.approve,
            },
        })
    }
}

fn classifier_error(err: PredictionError, prepared: &PreparedFeatures) -> SimulationError {
    match err {
        PredictionError::ColumnMismatch { expected, actual } => {
            warn!(?expected, ?actual, "classifier rejected feature columns");
            SimulationError::ColumnMismatch(ColumnDiagnostics {
                expected_columns: expected,
                actual_columns: actual,
                row: prepared.row.entries(),
                note: None,
            })
        }
        PredictionError::FeatureCount { expected, found } => {
            warn!(expected, found, "classifier rejected feature count");
            // An unnamed classifier only knows its width.
            SimulationError::ColumnMismatch(ColumnDiagnostics {
                expected_columns: Vec::new(),
                actual_columns: prepared.row.columns().to_vec(),
                row: prepared.row.entries(),
                note: Some(format!(
                    "classifier expects {expected} features, row has {found}"
                )),
            })
        }
        other => SimulationError::Inference(other.to_string()),
    }
}

/// Error raised by a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("feature columns do not match the classifier: {0}")]
    ColumnMismatch(ColumnDiagnostics),
    #[error("inference failed: {0}")]
    Inference(String),
}

impl SimulationError {
    /// Column listing for the mismatch path, if this is one.
    pub fn diagnostics(&self) -> Option<&ColumnDiagnostics> {
        match self {
            SimulationError::ColumnMismatch(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}

impl From<FeatureError> for SimulationError {
    fn from(value: FeatureError) -> Self {
        match value {
            FeatureError::ColumnMismatch(diagnostics) => {
                warn!(
                    expected = ?diagnostics.expected_columns,
                    actual = ?diagnostics.actual_columns,
                    "model column list does not match the assembled features"
                );
                SimulationError::ColumnMismatch(diagnostics)
            }
            other => SimulationError::Inference(other.to_string()),
        }
    }
}
