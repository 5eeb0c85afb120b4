//! Desk configuration: backend location, navigation state file and log filter

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::types::{DeskError, DeskResult};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/bizdesk.toml";

const ENV_PREFIX: &str = "BIZDESK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// No timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Absolute URL for an API path such as `/api/leads/`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from(".bizdesk/navigation.json")
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DeskConfig {
    /// Load from `config/bizdesk.toml` (optional) layered with `BIZDESK__*`
    /// environment variables
    pub fn load() -> DeskResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from the given TOML file (optional) layered with `BIZDESK__*`
    /// environment variables.
    ///
    /// A file that exists but cannot be read or parsed is logged and skipped,
    /// leaving environment variables and defaults.
    pub fn load_from(path: impl AsRef<Path>) -> DeskResult<Self> {
        let path = path.as_ref();
        let settings = match Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(env_source())
            .build()
        {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load config file, falling back to env");
                Config::builder()
                    .add_source(env_source())
                    .build()
                    .map_err(|env_err| {
                        DeskError::Config(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        settings
            .try_deserialize::<DeskConfig>()
            .map_err(|e| DeskError::Config(e.to_string()))
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
