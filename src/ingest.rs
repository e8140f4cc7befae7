//! Stream-batch ingest
//!
//! The activity store exports one row per ride (joined with the athlete and
//! the stored streams). This module turns that JSON into `ActivityRecord`s and
//! an `AthleteProfile`.

use crate::models::activity::{DEFAULT_FTP, DEFAULT_MAX_HR};
use crate::models::{ActivityRecord, AthleteProfile};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// ---------------------------------------------------------------------------
/// Batch Data Structures
/// ---------------------------------------------------------------------------

/// Fallbacks for athlete values the batch leaves out (or sends as 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileDefaults {
  pub ftp: i64,
  pub max_hr: i64,
}

impl Default for ProfileDefaults {
  fn default() -> Self {
    Self {
      ftp: DEFAULT_FTP,
      max_hr: DEFAULT_MAX_HR,
    }
  }
}

/// Parsed batch, records in input order
#[derive(Debug, Clone)]
pub struct Batch {
  pub athlete: AthleteProfile,
  pub activities: Vec<ActivityRecord>,
}

/// One exported row
#[derive(Debug, Clone, Deserialize)]
struct BatchRow {
  activity_id: i64,
  #[serde(default)]
  name: Option<String>,
  #[serde(default)]
  start_date: Option<String>,
  #[serde(default)]
  created_at: Option<String>,
  #[serde(default)]
  moving_time: Option<f64>,
  #[serde(default)]
  distance: Option<f64>,
  #[serde(default)]
  streams: Option<Vec<BatchStream>>,
  #[serde(default)]
  ftp: Option<f64>,
  #[serde(default)]
  max_heartrate: Option<f64>,
  #[serde(default)]
  firstname: Option<String>,
  #[serde(default)]
  lastname: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchStream {
  #[serde(rename = "type")]
  stream_type: String,
  #[serde(default)]
  data: Vec<serde_json::Value>,
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IngestError {
  #[error("Invalid batch JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Activity {activity_id} has no start_date or created_at")]
  MissingTimestamp { activity_id: i64 },

  #[error("Activity {activity_id} has an unreadable timestamp: {value}")]
  InvalidTimestamp { activity_id: i64, value: String },
}

/// ---------------------------------------------------------------------------
/// Parsing
/// ---------------------------------------------------------------------------

/// Parse an exported batch. The athlete comes from the first row.
pub fn parse_batch(json: &str, defaults: &ProfileDefaults) -> Result<Batch, IngestError> {
  let rows: Vec<BatchRow> = serde_json::from_str(json)?;

  let athlete = rows
    .first()
    .map(|row| athlete_from_row(row, defaults))
    .unwrap_or_else(|| AthleteProfile {
      ftp: defaults.ftp,
      max_hr: defaults.max_hr,
      ..AthleteProfile::default()
    });

  let activities = rows
    .into_iter()
    .map(record_from_row)
    .collect::<Result<Vec<_>, _>>()?;

  tracing::debug!(activities = activities.len(), athlete = %athlete.name, "batch parsed");

  Ok(Batch { athlete, activities })
}

fn athlete_from_row(row: &BatchRow, defaults: &ProfileDefaults) -> AthleteProfile {
  let full_name = format!(
    "{} {}",
    row.firstname.as_deref().unwrap_or(""),
    row.lastname.as_deref().unwrap_or("")
  );
  let name = match full_name.trim() {
    "" => AthleteProfile::default().name,
    trimmed => trimmed.to_string(),
  };

  AthleteProfile {
    name,
    ftp: positive_or(row.ftp, defaults.ftp),
    max_hr: positive_or(row.max_heartrate, defaults.max_hr),
  }
}

fn record_from_row(row: BatchRow) -> Result<ActivityRecord, IngestError> {
  let raw = row
    .start_date
    .as_deref()
    .or(row.created_at.as_deref())
    .ok_or(IngestError::MissingTimestamp {
      activity_id: row.activity_id,
    })?;
  let started_at = parse_timestamp(raw).ok_or_else(|| IngestError::InvalidTimestamp {
    activity_id: row.activity_id,
    value: raw.to_string(),
  })?;

  let streams = row.streams.unwrap_or_default();

  Ok(ActivityRecord {
    id: row.activity_id,
    name: row.name,
    started_at,
    moving_time_seconds: row.moving_time.unwrap_or(0.0).round() as i64,
    distance_meters: row.distance.unwrap_or(0.0),
    watts: stream_samples(&streams, "watts"),
    heartrate: stream_samples(&streams, "heartrate"),
    recorded_ftp: row.ftp.map(|ftp| ftp.round() as i64).filter(|ftp| *ftp > 0),
  })
}

/// Samples of the named stream; null or non-numeric entries read as 0
fn stream_samples(streams: &[BatchStream], stream_type: &str) -> Vec<f64> {
  streams
    .iter()
    .find(|s| s.stream_type == stream_type)
    .map(|s| s.data.iter().map(|v| v.as_f64().unwrap_or(0.0)).collect())
    .unwrap_or_default()
}

fn positive_or(value: Option<f64>, fallback: i64) -> i64 {
  match value.map(|v| v.round() as i64) {
    Some(v) if v > 0 => v,
    _ => fallback,
  }
}

/// RFC 3339, or a naive date-time read as UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NAIVE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|naive| naive.and_utc())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
