//! Centralized CLI configuration.
//!
//! Loaded via the `config` crate from `TASKLOG__*` environment variables,
//! with `__` separating nested keys (`TASKLOG__SESSION__STORE_PATH`).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TASKLOG";

/// CLI configuration.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    /// URL of the remote task-log endpoint.
    pub endpoint_url: String,

    /// Session storage configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP client configuration.
    #[serde(default)]
    pub http: HttpConfig,

    /// Task form configuration.
    #[serde(default)]
    pub form: FormConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Where the session record is persisted.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Seconds to wait before signing out after a permission failure.
    #[serde(default = "default_logout_delay_seconds")]
    pub logout_delay_seconds: u64,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".tasklog/session.json")
}

fn default_logout_delay_seconds() -> u64 {
    3
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            logout_delay_seconds: default_logout_delay_seconds(),
        }
    }
}

impl SessionConfig {
    /// Returns the forced-logout delay.
    #[must_use]
    pub fn logout_delay(&self) -> Duration {
        Duration::from_secs(self.logout_delay_seconds)
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl HttpConfig {
    /// Returns the request timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Task form configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormConfig {
    /// Comma-separated task names offered by the form.
    #[serde(default)]
    pub tasks: String,
}

impl FormConfig {
    /// Returns the configured task names, trimmed, without empty entries.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        self.tasks
            .split(',')
            .map(str::trim)
            .filter(|task| !task.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

impl CliConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(environment())
    }

    fn from_source(env: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).separator("__")
}
