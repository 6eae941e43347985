use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use super::domain::LoanApplication;
use super::model::BinaryClassifier;
use super::scaler::FeatureScaler;
use super::service::LoanSimulator;
use super::session::SimulationSession;
use super::views::{SessionView, SimulationView};
use crate::error::AppError;

/// Shared state behind the form endpoints: the frozen simulator and the one session.
pub struct SimulatorState<C, S> {
    simulator: LoanSimulator<C, S>,
    session: Mutex<SimulationSession>,
}

impl<C, S> SimulatorState<C, S>
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    pub fn new(simulator: LoanSimulator<C, S>) -> Self {
        Self {
            simulator,
            session: Mutex::new(SimulationSession::new()),
        }
    }

    pub fn simulator(&self) -> &LoanSimulator<C, S> {
        &self.simulator
    }

    pub fn session(&self) -> MutexGuard<'_, SimulationSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Router builder exposing the endpoints behind the simulation form.
pub fn simulation_router<C, S>(state: Arc<SimulatorState<C, S>>) -> Router
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    Router::new()
        .route("/api/v1/simulations", post(simulate_handler::<C, S>))
        .route("/api/v1/simulations/defaults", get(defaults_handler))
        .route("/api/v1/session", get(session_handler::<C, S>))
        .route("/api/v1/session/submit", post(submit_handler::<C, S>))
        .route("/api/v1/session/reset", post(reset_handler::<C, S>))
        .with_state(state)
}

pub(crate) async fn simulate_handler<C, S>(
    State(state): State<Arc<SimulatorState<C, S>>>,
    Json(application): Json<LoanApplication>,
) -> Result<Json<SimulationView>, AppError>
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    let outcome = state.simulator().simulate(application)?;
    Ok(Json(SimulationView::from(&outcome)))
}

pub(crate) async fn defaults_handler() -> Json<LoanApplication> {
    Json(LoanApplication::default())
}

pub(crate) async fn session_handler<C, S>(
    State(state): State<Arc<SimulatorState<C, S>>>,
) -> Json<SessionView>
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    let session = state.session();
    Json(SessionView::from(&*session))
}

pub(crate) async fn submit_handler<C, S>(
    State(state): State<Arc<SimulatorState<C, S>>>,
    Json(form): Json<LoanApplication>,
) -> Result<Json<SessionView>, AppError>
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    let mut session = state.session();
    session.update_form(form);
    session.submit(state.simulator())?;
    Ok(Json(SessionView::from(&*session)))
}

pub(crate) async fn reset_handler<C, S>(
    State(state): State<Arc<SimulatorState<C, S>>>,
) -> Json<SessionView>
where
    C: BinaryClassifier + 'static,
    S: FeatureScaler + 'static,
{
    let mut session = state.session();
    session.reset();
    Json(SessionView::from(&*session))
}
