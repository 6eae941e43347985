use crate::cli::ServeArgs;
use crate::infra::{load_config, AppState};
use crate::routes::with_simulation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_simulator::error::AppError;
use loan_simulator::simulator::{ArtifactBundle, LoanSimulator, SimulatorState};
use loan_simulator::telemetry::{self, LogSink};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = load_config(args.artifact_dir.take())?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogSink::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let bundle = ArtifactBundle::load(&config.artifacts).map_err(|err| {
        error!(artifact = %err.kind(), path = %err.path().display(), %err, "failed to load model artifacts");
        err
    })?;
    let simulator = LoanSimulator::from_artifacts(bundle);
    let simulator_state = Arc::new(SimulatorState::new(simulator));

    let app = with_simulation_routes(simulator_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "loan approval simulator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
