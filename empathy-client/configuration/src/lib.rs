use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use validator::{Validate, ValidationErrors};

pub type AppConfig = ClientConfig;

const ENV_PREFIX: &str = "EMPATHY_CLIENT";
const CONFIG_DIR: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value `{value}` for {key}")]
    InvalidOverride { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,
    #[serde(default)]
    #[validate(nested)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    #[validate(length(min = 1))]
    pub level: String,
    #[serde(default)]
    pub with_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_ms")]
    #[validate(range(min = 1, max = 600_000))]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    #[validate(range(min = 1, max = 600_000))]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            with_target: false,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

impl ServiceConfig {
    /// Base address without a trailing `/`, ready for path concatenation.
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

impl ClientConfig {
    /// Applies `EMPATHY_CLIENT_<SECTION>_<FIELD>` overrides.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));

        if let Some(value) = var("SERVICE_BASE_URL") {
            self.service.base_url = value;
        }
        if let Some(value) = var("SERVICE_CONNECT_TIMEOUT_MS") {
            self.service.connect_timeout_ms = parse_override("SERVICE_CONNECT_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("SERVICE_REQUEST_TIMEOUT_MS") {
            self.service.request_timeout_ms = parse_override("SERVICE_REQUEST_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = var("LOGGING_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = var("LOGGING_WITH_TARGET") {
            self.logging.with_target = parse_override("LOGGING_WITH_TARGET", &value)?;
        }
        if let Some(value) = var("EXPORT_DIRECTORY") {
            self.export.directory = PathBuf::from(value);
        }
        Ok(())
    }
}

/// Loads `config/{RUN_ENV}.toml` when present, then environment overrides, then validates.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());
    let path = Path::new(CONFIG_DIR).join(format!("{run_env}.toml"));
    let env: HashMap<String, String> = std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();
    load_config_from(Some(&path), |key| env.get(key).cloned())
}

pub fn load_config_from(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, ConfigError> {
    let mut config = match path {
        Some(path) if path.is_file() => read_config_file(path)?,
        _ => ClientConfig::default(),
    };
    config.apply_overrides(lookup)?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ClientConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
        key: format!("{ENV_PREFIX}_{key}"),
        value: value.to_string(),
    })
}

/// Installs the global fmt subscriber on stderr. `RUST_LOG` takes precedence over the
/// configured level. Calling it twice is harmless.
pub fn setup_logging(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new(default_log_level()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.logging.with_target)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_ok() {
        tracing::debug!(level = %config.logging.level, "logging initialised");
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    3_000
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_export_directory() -> PathBuf {
    PathBuf::from(".")
}
