//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe database and logging settings consumed by core bootstrap.
//! - Load settings from environment or from a caller-owned config document.
//!
//! # Invariants
//! - Every field has a default, so partial documents deserialize.
//! - `busy_timeout_ms` is strictly positive.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Default wait for the SQLite writer lock.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub const ENV_DB_PATH: &str = "BACKLOG_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BACKLOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BACKLOG_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "BACKLOG_BUSY_TIMEOUT_MS";

/// Errors produced while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable holds a value that cannot be parsed.
    InvalidValue { key: &'static str, value: String },
    /// `busy_timeout_ms` was zero.
    ZeroBusyTimeout,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
            Self::ZeroBusyTimeout => write!(f, "busy_timeout_ms must be greater than zero"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for database bootstrap and logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Database file. `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Milliseconds to wait for the writer lock before failing.
    pub busy_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl CoreConfig {
    /// Builds configuration from `BACKLOG_*` environment variables.
    ///
    /// Unset or blank variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = read(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: value.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks field-level constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::ZeroBusyTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_BUSY_TIMEOUT_MS, ENV_BUSY_TIMEOUT_MS};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = CoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn lookup_overrides_fields_and_ignores_blank_values() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            ("BACKLOG_DB_PATH", "/tmp/backlog.sqlite3"),
            ("BACKLOG_LOG_LEVEL", "  "),
            ("BACKLOG_BUSY_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/backlog.sqlite3")));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn unparsable_timeout_is_rejected() {
        let err =
            CoreConfig::from_lookup(lookup_from(&[("BACKLOG_BUSY_TIMEOUT_MS", "soon")]))
                .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: "soon".to_string(),
            }
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[("BACKLOG_BUSY_TIMEOUT_MS", "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroBusyTimeout);
    }

    #[test]
    fn partial_document_deserializes_with_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{ "log_level": "warn", "busy_timeout_ms": 900 }"#).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.busy_timeout_ms, 900);
        assert!(config.db_path.is_none());
        assert!(config.log_dir.is_none());
    }
}
