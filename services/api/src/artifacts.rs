use crate::infra::load_config;
use clap::Args;
use loan_simulator::error::AppError;
use loan_simulator::simulator::{ArtifactBundle, ArtifactKind};
use loan_simulator::telemetry::{self, LogSink};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ArtifactCheckArgs {
    /// Override the directory holding the model artifacts
    #[arg(long)]
    pub(crate) artifact_dir: Option<PathBuf>,
}

pub(crate) fn run_artifact_check(args: ArtifactCheckArgs) -> Result<(), AppError> {
    let config = load_config(args.artifact_dir)?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    for kind in ArtifactKind::ALL {
        println!("{:<20} {}", kind.label(), config.artifacts.path(kind).display());
    }

    let summary = ArtifactBundle::load(&config.artifacts)?.summary();
    println!();
    println!(
        "classifier: {} ({} features)",
        summary.classifier_kind, summary.classifier_features
    );
    println!(
        "scaler: {} ({} columns)",
        summary.scaler_kind, summary.scaler_width
    );
    println!("model columns: {}", summary.model_columns.join(", "));
    println!("scaled columns: {}", summary.scaled_columns.join(", "));
    Ok(())
}
