//! Environment-driven configuration for the CLI

use crate::ingest::ProfileDefaults;
use chrono::{DateTime, Utc};
use std::env;
use thiserror::Error;

pub const AS_OF_VAR: &str = "TRAINING_REPORT_AS_OF";
pub const DEFAULT_FTP_VAR: &str = "TRAINING_REPORT_DEFAULT_FTP";
pub const DEFAULT_MAX_HR_VAR: &str = "TRAINING_REPORT_DEFAULT_MAX_HR";
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
  /// Fixed as-of instant; None leaves the choice to the caller
  pub as_of: Option<DateTime<Utc>>,
  pub defaults: ProfileDefaults,
  pub log_filter: String,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      as_of: None,
      defaults: ProfileDefaults::default(),
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl AnalysisConfig {
  /// Load `.env` if present, then read the process environment
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_vars()
  }

  /// Read the process environment only
  pub fn from_vars() -> Result<Self, ConfigError> {
    let defaults = ProfileDefaults::default();

    let as_of = match read_var(AS_OF_VAR) {
      Some(raw) => Some(
        DateTime::parse_from_rfc3339(&raw)
          .map(|dt| dt.with_timezone(&Utc))
          .map_err(|_| invalid(AS_OF_VAR, &raw))?,
      ),
      None => None,
    };

    Ok(Self {
      as_of,
      defaults: ProfileDefaults {
        ftp: positive_var(DEFAULT_FTP_VAR)?.unwrap_or(defaults.ftp),
        max_hr: positive_var(DEFAULT_MAX_HR_VAR)?.unwrap_or(defaults.max_hr),
      },
      log_filter: read_var(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
    })
  }
}

/// Set and non-blank
fn read_var(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

fn positive_var(key: &str) -> Result<Option<i64>, ConfigError> {
  match read_var(key) {
    Some(raw) => match raw.parse::<i64>() {
      Ok(v) if v > 0 => Ok(Some(v)),
      _ => Err(invalid(key, &raw)),
    },
    None => Ok(None),
  }
}

fn invalid(key: &str, value: &str) -> ConfigError {
  ConfigError::Invalid {
    key: key.to_string(),
    value: value.to_string(),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
