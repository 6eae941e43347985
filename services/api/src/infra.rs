use loan_simulator::config::{AppConfig, ArtifactConfig};
use loan_simulator::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load configuration, pointing the artifact lookup at `artifact_dir` when given.
pub(crate) fn load_config(artifact_dir: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(directory) = artifact_dir {
        config.artifacts = with_directory(&config.artifacts, directory);
    }
    Ok(config)
}

fn with_directory(artifacts: &ArtifactConfig, directory: PathBuf) -> ArtifactConfig {
    ArtifactConfig {
        directory,
        ..artifacts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_override_keeps_file_names() {
        let configured = ArtifactConfig {
            classifier_file: "loan_model.json".to_string(),
            ..ArtifactConfig::in_dir("artifacts")
        };

        let moved = with_directory(&configured, PathBuf::from("/srv/model"));

        assert_eq!(moved.directory, PathBuf::from("/srv/model"));
        assert_eq!(moved.classifier_file, "loan_model.json");
        assert_eq!(moved.scaler_file, "scaler.json");
    }
}
