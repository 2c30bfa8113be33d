use crate::timers::{
    DEFAULT_CRITICAL_THRESHOLD_SECS, DEFAULT_TICK_INTERVAL, DEFAULT_WARNING_THRESHOLD_SECS,
    RegistrySettings, Thresholds,
};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub warning_threshold_secs: i64,
    pub critical_threshold_secs: i64,
    pub tick_interval_ms: u64,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warning_threshold_secs: DEFAULT_WARNING_THRESHOLD_SECS,
            critical_threshold_secs: DEFAULT_CRITICAL_THRESHOLD_SECS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            log_filter: "info".to_owned(),
        }
    }
}

impl Config {
    /// Loads the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
                        path: path.to_owned(),
                        source,
                    })?;
                toml::from_str::<Config>(&contents).map_err(|source| ConfigError::ParseToml {
                    path: path.to_owned(),
                    source,
                })?
            }
            None => Config::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.critical_threshold_secs < 0 {
            return Err(ConfigError::Invalid(
                "critical_threshold_secs must not be negative".to_owned(),
            ));
        }
        if self.critical_threshold_secs >= self.warning_threshold_secs {
            return Err(ConfigError::Invalid(format!(
                "critical_threshold_secs ({}) must be below warning_threshold_secs ({})",
                self.critical_threshold_secs, self.warning_threshold_secs
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            thresholds: Thresholds::new(self.warning_threshold_secs, self.critical_threshold_secs),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        }
    }
}
