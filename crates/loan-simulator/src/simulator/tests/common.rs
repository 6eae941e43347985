use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::simulator::artifacts::ColumnLayout;
use crate::simulator::domain::LoanApplication;
use crate::simulator::features::ModelRow;
use crate::simulator::model::{
    BinaryClassifier, ClassProbabilities, Classifier, LogisticRegression, PredictionError,
};
use crate::simulator::scaler::{Scaler, StandardScaler};
use crate::simulator::service::LoanSimulator;
use crate::simulator::{simulation_router, SimulatorState};

pub(super) fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|name| name.to_string()).collect()
}

pub(super) fn model_columns() -> Vec<String> {
    names(&[
        "Gender",
        "Married",
        "Dependents",
        "Education",
        "Self_Employed",
        "Credit_History",
        "Property_Area",
        "TotalIncome",
        "LoanAmount",
        "Loan_Amount_Term",
    ])
}

pub(super) fn scaled_columns() -> Vec<String> {
    names(&["TotalIncome", "LoanAmount", "Loan_Amount_Term"])
}

pub(super) fn layout() -> ColumnLayout {
    ColumnLayout {
        model_columns: model_columns(),
        scaled_columns: scaled_columns(),
    }
}

/// Scaler that passes values through, so rows expose the raw derived features.
pub(super) fn identity_scaler() -> Scaler {
    Scaler::Standard(StandardScaler {
        feature_names: Some(scaled_columns()),
        mean: vec![0.0; 3],
        scale: vec![1.0; 3],
    })
}

pub(super) fn fitted_scaler() -> Scaler {
    Scaler::Standard(StandardScaler {
        feature_names: Some(scaled_columns()),
        mean: vec![8.6, 4.8, 342.0],
        scale: vec![0.55, 0.5, 65.0],
    })
}

/// Logistic model where a clean credit history is the deciding factor.
pub(super) fn credit_weighted_classifier() -> Classifier {
    let mut coefficients = vec![0.0; 10];
    coefficients[5] = 4.0;
    coefficients[7] = 0.3;
    Classifier::LogisticRegression(LogisticRegression {
        feature_names: Some(model_columns()),
        coefficients,
        intercept: -2.0,
    })
}

pub(super) fn applicant() -> LoanApplication {
    LoanApplication {
        name: "Ana Souza".to_string(),
        ..LoanApplication::default()
    }
}

pub(super) fn build_simulator() -> LoanSimulator<Classifier, Scaler> {
    LoanSimulator::new(
        Arc::new(credit_weighted_classifier()),
        Arc::new(fitted_scaler()),
        layout(),
    )
}

pub(super) fn stub_simulator<C>(classifier: C) -> (LoanSimulator<C, Scaler>, Arc<C>)
where
    C: BinaryClassifier + 'static,
{
    let classifier = Arc::new(classifier);
    let simulator = LoanSimulator::new(classifier.clone(), Arc::new(identity_scaler()), layout());
    (simulator, classifier)
}

/// Returns a fixed probability and keeps every row it was asked to score.
pub(super) struct RecordingClassifier {
    approve: f64,
    rows: Mutex<Vec<ModelRow>>,
}

impl RecordingClassifier {
    pub(super) fn approving(approve: f64) -> Self {
        Self {
            approve,
            rows: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn rows(&self) -> Vec<ModelRow> {
        self.rows.lock().expect("rows poisoned").clone()
    }
}

impl BinaryClassifier for RecordingClassifier {
    fn kind(&self) -> &'static str {
        "recording"
    }

    fn n_features(&self) -> usize {
        10
    }

    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn predict_proba(&self, row: &ModelRow) -> Result<ClassProbabilities, PredictionError> {
        self.rows.lock().expect("rows poisoned").push(row.clone());
        Ok(ClassProbabilities {
            reject: 1.0 - self.approve,
            approve: self.approve,
        })
    }
}

/// Fitted on a different column order than the pipeline produces.
pub(super) struct MismatchedClassifier;

impl BinaryClassifier for MismatchedClassifier {
    fn kind(&self) -> &'static str {
        "mismatched"
    }

    fn n_features(&self) -> usize {
        10
    }

    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn predict_proba(&self, row: &ModelRow) -> Result<ClassProbabilities, PredictionError> {
        let mut expected = row.columns().to_vec();
        expected.reverse();
        Err(PredictionError::ColumnMismatch {
            expected,
            actual: row.columns().to_vec(),
        })
    }
}

pub(super) struct BrokenClassifier;

impl BinaryClassifier for BrokenClassifier {
    fn kind(&self) -> &'static str {
        "broken"
    }

    fn n_features(&self) -> usize {
        10
    }

    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn predict_proba(&self, _row: &ModelRow) -> Result<ClassProbabilities, PredictionError> {
        Err(PredictionError::Malformed("probabilities missing".to_string()))
    }
}

pub(super) fn router_with<C>(simulator: LoanSimulator<C, Scaler>) -> axum::Router
where
    C: BinaryClassifier + 'static,
{
    simulation_router(Arc::new(SimulatorState::new(simulator)))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
