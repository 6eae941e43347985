use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::domain::{LoanApplication, SimulationOutcome};
use super::model::BinaryClassifier;
use super::scaler::FeatureScaler;
use super::service::{LoanSimulator, SimulationError};

/// Last successful simulation, as shown below the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShownResult {
    pub outcome: SimulationOutcome,
    pub simulated_at: DateTime<Utc>,
}

/// Whether the page is showing the form alone or the form plus a verdict.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    ResultShown(ShownResult),
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::ResultShown(_) => "result_shown",
        }
    }
}

/// The single interactive session: current form values plus the page state.
#[derive(Debug, Clone, Default)]
pub struct SimulationSession {
    form: LoanApplication,
    state: SessionState,
}

impl SimulationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &LoanApplication {
        &self.form
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn result(&self) -> Option<&ShownResult> {
        match &self.state {
            SessionState::ResultShown(result) => Some(result),
            SessionState::Idle => None,
        }
    }

    /// Replace the form values, as the widgets do on every interaction.
    pub fn update_form(&mut self, form: LoanApplication) {
        self.form = form;
    }

    /// Simulate the current form.
    ///
    /// Validation errors leave the state untouched. Any inference failure marks the
    /// simulation inactive by returning to idle.
    pub fn submit<C, S>(
        &mut self,
        simulator: &LoanSimulator<C, S>,
    ) -> Result<ShownResult, SimulationError>
    where
        C: BinaryClassifier + 'static,
        S: FeatureScaler + 'static,
    {
        match simulator.simulate(self.form.clone()) {
            Ok(outcome) => {
                info!(
                    decision = outcome.prediction.decision.label(),
                    approval_probability = outcome.prediction.approval_probability,
                    "simulation completed"
                );
                let result = ShownResult {
                    outcome,
                    simulated_at: Utc::now(),
                };
                self.state = SessionState::ResultShown(result.clone());
                Ok(result)
            }
            Err(SimulationError::Validation(err)) => {
                info!(field = err.field(), %err, "submission blocked by validation");
                Err(SimulationError::Validation(err))
            }
            Err(err) => {
                self.state = SessionState::Idle;
                Err(err)
            }
        }
    }

    /// Start a new simulation: clear the result and restore the form defaults.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.form = LoanApplication::default();
    }
}
