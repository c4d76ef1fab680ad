//! Host-provided configuration.
//!
//! Values come from the environment; the CLI loads a `.env` file first and
//! lets explicit flags override what is read here.

use crate::logging::default_log_level;
use crate::throttle::ThrottleConfig;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names.
pub mod env_vars {
    pub const DB_PATH: &str = "ADMINNOTES_DB_PATH";
    pub const LOG_LEVEL: &str = "ADMINNOTES_LOG_LEVEL";
    pub const LOG_DIR: &str = "ADMINNOTES_LOG_DIR";
    pub const SITE_NAME: &str = "ADMINNOTES_SITE_NAME";
    pub const SAVE_MAX_ATTEMPTS: &str = "ADMINNOTES_SAVE_MAX_ATTEMPTS";
    pub const SAVE_WINDOW_SECS: &str = "ADMINNOTES_SAVE_WINDOW_SECS";
}

/// Default values.
pub mod defaults {
    pub const DB_PATH: &str = "./adminnotes.sqlite3";
    pub const SITE_NAME: &str = "Administrator";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub site_name: String,
    pub throttle: ThrottleConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(defaults::DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            site_name: defaults::SITE_NAME.to_string(),
            throttle: ThrottleConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; unset or blank values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(env_vars::DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = value(env_vars::LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = value(env_vars::LOG_DIR).map(PathBuf::from);
        if let Some(site_name) = value(env_vars::SITE_NAME) {
            config.site_name = site_name;
        }
        if let Some(raw) = value(env_vars::SAVE_MAX_ATTEMPTS) {
            config.throttle.max_attempts = parse_positive(env_vars::SAVE_MAX_ATTEMPTS, &raw)?;
        }
        if let Some(raw) = value(env_vars::SAVE_WINDOW_SECS) {
            let secs = parse_positive(env_vars::SAVE_WINDOW_SECS, &raw)?;
            config.throttle.window = Duration::from_secs(secs as u64);
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive integer, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

fn parse_positive(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{env_vars, ConfigError, CoreConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).expect("defaults");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.throttle.max_attempts, 10);
        assert_eq!(config.throttle.window, Duration::from_secs(60));
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let config = config_from(&[
            (env_vars::DB_PATH, "/var/lib/adminnotes.db"),
            (env_vars::SITE_NAME, "  "),
            (env_vars::LOG_DIR, "/var/log/adminnotes"),
            (env_vars::SAVE_MAX_ATTEMPTS, "3"),
            (env_vars::SAVE_WINDOW_SECS, "30"),
        ])
        .expect("overrides");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/adminnotes.db"));
        assert_eq!(config.site_name, "Administrator");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/adminnotes")));
        assert_eq!(config.throttle.max_attempts, 3);
        assert_eq!(config.throttle.window, Duration::from_secs(30));
    }

    #[test]
    fn rejects_invalid_throttle_numbers() {
        let err = config_from(&[(env_vars::SAVE_MAX_ATTEMPTS, "0")]).expect_err("zero");
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                key: env_vars::SAVE_MAX_ATTEMPTS,
                value: "0".to_string()
            }
        );
        assert!(config_from(&[(env_vars::SAVE_WINDOW_SECS, "soon")]).is_err());
    }
}
