//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - A fixed as-of instant so windows never depend on the wall clock
//! - Mock data factories
//! - Power stream builders

use crate::analysis::ActivityMetrics;
use crate::models::{ActivityRecord, AthleteProfile};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Fixed "now" for every test: 2026-10-14 18:00 UTC
pub fn as_of() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 10, 14, 18, 0, 0).unwrap()
}

/// Same time of day, `days` calendar days before `as_of()`
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  as_of() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_athlete(ftp: i64) -> AthleteProfile {
  AthleteProfile {
    name: "Test Rider".to_string(),
    ftp,
    max_hr: 190,
  }
}

/// A ride `days_ago` days before `as_of()` whose moving time equals the sample count
pub fn mock_activity(id: i64, days_ago: i64, watts: Vec<f64>) -> ActivityRecord {
  ActivityRecord {
    id,
    name: Some(format!("Ride {}", id)),
    started_at: datetime_days_ago(days_ago),
    moving_time_seconds: watts.len() as i64,
    distance_meters: 30000.0,
    watts,
    heartrate: vec![],
    recorded_ftp: None,
  }
}

/// Pre-computed metrics for aggregation tests: one hour, given TSS
pub fn mock_metrics(id: i64, days_ago: i64, tss: f64) -> ActivityMetrics {
  ActivityMetrics {
    id,
    date: datetime_days_ago(days_ago).date_naive(),
    name: format!("Ride {}", id),
    duration_seconds: 3600,
    distance_meters: 30000.0,
    np: 200,
    tss,
    intensity_factor: 1.0,
    avg_power: 190,
    max_power: 450.0,
    variability_index: 1.05,
    kilojoules: 684,
  }
}

/// ---------------------------------------------------------------------------
/// Power Streams
/// ---------------------------------------------------------------------------

pub fn constant_power(watts: f64, seconds: usize) -> Vec<f64> {
  vec![watts; seconds]
}

/// `seconds` of `watts`, then `seconds` of recovery at half that, repeated `sets` times
pub fn interval_power(watts: f64, seconds: usize, sets: usize) -> Vec<f64> {
  (0..sets)
    .flat_map(|_| {
      let mut set = vec![watts; seconds];
      set.extend(vec![watts / 2.0; seconds]);
      set
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mock_factories_create_valid_data() {
    let record = mock_activity(7, 2, constant_power(180.0, 600));
    assert_eq!(record.moving_time_seconds, 600);
    assert!(record.has_power());
    assert_eq!(record.date(), as_of().date_naive() - Duration::days(2));

    let athlete = mock_athlete(250);
    assert_eq!(athlete.ftp, 250);
  }

  #[test]
  fn test_interval_power_shape() {
    let watts = interval_power(300.0, 60, 3);
    assert_eq!(watts.len(), 360);
    assert_eq!(watts[0], 300.0);
    assert_eq!(watts[60], 150.0);
    assert_eq!(watts[120], 300.0);
  }
}
