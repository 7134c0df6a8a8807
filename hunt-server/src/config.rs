use hunt_core::{EngineConfig, PROXIMITY_THRESHOLD_METERS};
use hunt_persistence::connection::DEFAULT_DATABASE_URL;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
    #[error("{name} must be positive")]
    NotPositive { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub proximity_threshold_meters: f64,
    pub storage_timeout_ms: u64,
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_var(&lookup, "PORT", "8080")?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            proximity_threshold_meters: parse_var(&lookup, "PROXIMITY_THRESHOLD_METERS", "50")?,
            storage_timeout_ms: parse_var(&lookup, "STORAGE_TIMEOUT_MS", "5000")?,
        };

        let threshold = config.proximity_threshold_meters;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ConfigError::NotPositive {
                name: "PROXIMITY_THRESHOLD_METERS",
            });
        }
        if config.storage_timeout_ms == 0 {
            return Err(ConfigError::NotPositive {
                name: "STORAGE_TIMEOUT_MS",
            });
        }

        Ok(config)
    }

    /// True when the check-in radius differs from the 50m the game is tuned for.
    pub fn threshold_overridden(&self) -> bool {
        self.proximity_threshold_meters != PROXIMITY_THRESHOLD_METERS
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            proximity_threshold_meters: self.proximity_threshold_meters,
            storage_timeout: Duration::from_millis(self.storage_timeout_ms),
        }
    }
}
