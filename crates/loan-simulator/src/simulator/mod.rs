//! Loan approval simulation.
//!
//! An application is validated, turned into the exact numeric row the frozen classifier was
//! trained on, and scored. The classifier, the scaler and both column lists are read from
//! the artifact directory once at startup and shared read-only afterwards.

pub mod artifacts;
pub mod domain;
pub mod features;
pub mod model;
pub mod router;
pub mod scaler;
pub mod service;
pub mod session;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactBundle, ArtifactError, ArtifactKind, ArtifactSummary, ColumnLayout};
pub use domain::{
    ApplicationEcho, Dependents, Education, Gender, LoanApplication, LoanDecision,
    PredictionResult, PropertyArea, SimulationOutcome, ValidatedApplication,
};
pub use features::{ColumnDiagnostics, FeatureColumn, FeatureError, ModelRow, PreparedFeatures};
pub use model::{BinaryClassifier, ClassProbabilities, Classifier, PredictionError};
pub use router::{simulation_router, SimulatorState};
pub use scaler::{FeatureScaler, Scaler, ScalerError};
pub use service::{LoanSimulator, SimulationError};
pub use session::{SessionState, ShownResult, SimulationSession};
pub use validation::{validate, ValidationError};
pub use views::{render_text, ApprovalOutlook, SessionView, SimulationView};
