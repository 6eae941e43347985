use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::simulator::ArtifactKind;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub artifacts: ArtifactConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let directory = env::var("APP_ARTIFACT_DIR").unwrap_or_else(|_| "artifacts".to_string());
        if directory.trim().is_empty() {
            return Err(ConfigError::EmptyArtifactPath {
                variable: "APP_ARTIFACT_DIR",
            });
        }

        let defaults = ArtifactConfig::in_dir(directory);
        let artifacts = ArtifactConfig {
            classifier_file: file_var("APP_CLASSIFIER_FILE", defaults.classifier_file)?,
            scaler_file: file_var("APP_SCALER_FILE", defaults.scaler_file)?,
            model_columns_file: file_var("APP_MODEL_COLUMNS_FILE", defaults.model_columns_file)?,
            scaled_columns_file: file_var(
                "APP_SCALED_COLUMNS_FILE",
                defaults.scaled_columns_file,
            )?,
            directory: defaults.directory,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            artifacts,
        })
    }
}

fn file_var(variable: &'static str, default: String) -> Result<String, ConfigError> {
    match env::var(variable) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyArtifactPath { variable }),
        Ok(value) => Ok(value.trim().to_string()),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the frozen model artifacts read at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub directory: PathBuf,
    pub classifier_file: String,
    pub scaler_file: String,
    pub model_columns_file: String,
    pub scaled_columns_file: String,
}

impl ArtifactConfig {
    /// Default file names rooted at `directory`.
    pub fn in_dir(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            classifier_file: "classifier.json".to_string(),
            scaler_file: "scaler.json".to_string(),
            model_columns_file: "model_columns_ordered.json".to_string(),
            scaled_columns_file: "scaled_columns.json".to_string(),
        }
    }

    pub fn file_name(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Classifier => &self.classifier_file,
            ArtifactKind::Scaler => &self.scaler_file,
            ArtifactKind::ModelColumns => &self.model_columns_file,
            ArtifactKind::ScaledColumns => &self.scaled_columns_file,
        }
    }

    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        resolve(&self.directory, self.file_name(kind))
    }
}

fn resolve(directory: &Path, file: &str) -> PathBuf {
    let file = Path::new(file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        directory.join(file)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    EmptyArtifactPath { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::EmptyArtifactPath { variable } => {
                write!(f, "{variable} must not be empty when set")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::EmptyArtifactPath { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for variable in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_ARTIFACT_DIR",
            "APP_CLASSIFIER_FILE",
            "APP_SCALER_FILE",
            "APP_MODEL_COLUMNS_FILE",
            "APP_SCALED_COLUMNS_FILE",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.artifacts, ArtifactConfig::in_dir("artifacts"));
        assert_eq!(
            config.artifacts.path(ArtifactKind::Classifier),
            PathBuf::from("artifacts").join("classifier.json")
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn artifact_overrides_are_applied() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ARTIFACT_DIR", "/srv/models");
        env::set_var("APP_SCALER_FILE", "scaler-v2.json");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.artifacts.path(ArtifactKind::Scaler),
            PathBuf::from("/srv/models/scaler-v2.json")
        );
        assert_eq!(config.artifacts.model_columns_file, "model_columns_ordered.json");
        reset_env();
    }

    #[test]
    fn rejects_blank_artifact_file() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_CLASSIFIER_FILE", "  ");
        let err = AppConfig::load().expect_err("blank file rejected");
        assert!(matches!(
            err,
            ConfigError::EmptyArtifactPath {
                variable: "APP_CLASSIFIER_FILE"
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "eighty");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        reset_env();
    }
}
