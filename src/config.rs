use crate::constants::DEFAULT_DAILY_HOURS;
use crate::validation;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const HTTP_ADDR_ENV: &str = "STUDY_PLANNER_HTTP_ADDR";
pub const DB_PATH_ENV: &str = "STUDY_PLANNER_DB";
pub const LOG_SPEC_ENV: &str = "STUDY_PLANNER_LOG";
pub const DAILY_HOURS_ENV: &str = "STUDY_PLANNER_DAILY_HOURS";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{var}: invalid socket address '{value}'")]
    InvalidAddr { var: &'static str, value: String },
    #[error("{var}: invalid daily hours '{value}': {reason}")]
    InvalidDailyHours {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub http_addr: SocketAddr,
    /// SQLite file to load from and save to. `None` keeps state in memory only.
    pub db_path: Option<PathBuf>,
    pub log_spec: String,
    /// Budget for a planner that has no stored state yet.
    pub daily_hours: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            db_path: None,
            log_spec: "info".to_string(),
            daily_hours: DEFAULT_DAILY_HOURS,
        }
    }
}

impl PlannerConfig {
    /// Defaults overlaid with the `STUDY_PLANNER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(HTTP_ADDR_ENV) {
            config.http_addr = value.trim().parse().map_err(|_| ConfigError::InvalidAddr {
                var: HTTP_ADDR_ENV,
                value: value.clone(),
            })?;
        }

        if let Some(value) = lookup(DB_PATH_ENV) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                config.db_path = Some(PathBuf::from(trimmed));
            }
        }

        if let Some(value) = lookup(LOG_SPEC_ENV).or_else(|| lookup("RUST_LOG")) {
            if !value.trim().is_empty() {
                config.log_spec = value.trim().to_string();
            }
        }

        if let Some(value) = lookup(DAILY_HOURS_ENV) {
            let invalid = |reason: String| ConfigError::InvalidDailyHours {
                var: DAILY_HOURS_ENV,
                value: value.clone(),
                reason,
            };
            let hours: f64 = value
                .trim()
                .parse()
                .map_err(|err: std::num::ParseFloatError| invalid(err.to_string()))?;
            validation::validate_daily_budget(hours).map_err(|err| invalid(err.to_string()))?;
            config.daily_hours = hours;
        }

        Ok(config)
    }
}
