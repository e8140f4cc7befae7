use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Threshold power used when the batch carries none
pub const DEFAULT_FTP: i64 = 200;

/// Max heart rate used when the batch carries none
pub const DEFAULT_MAX_HR: i64 = 185;

/// One completed ride, as handed over by the activity/stream store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
  pub id: i64,
  pub name: Option<String>,
  pub started_at: DateTime<Utc>,
  pub moving_time_seconds: i64,
  pub distance_meters: f64,

  /// 1 Hz power samples in watts (empty when the ride has no power meter)
  pub watts: Vec<f64>,

  /// 1 Hz heart-rate samples in bpm
  #[serde(default)]
  pub heartrate: Vec<f64>,

  /// FTP stored with the streams at recording time
  #[serde(default)]
  pub recorded_ftp: Option<i64>,
}

impl ActivityRecord {
  /// UTC calendar day the ride belongs to
  pub fn date(&self) -> NaiveDate {
    self.started_at.date_naive()
  }

  pub fn has_power(&self) -> bool {
    !self.watts.is_empty()
  }

  /// FTP for this ride's IF/TSS: the recorded one if positive, else the athlete's
  pub fn effective_ftp(&self, athlete: &AthleteProfile) -> i64 {
    self.recorded_ftp
      .filter(|ftp| *ftp > 0)
      .unwrap_or(athlete.ftp)
  }

  pub fn display_name(&self) -> String {
    match self.name.as_deref().map(str::trim) {
      Some(name) if !name.is_empty() => name.to_string(),
      _ => format!("Activity {}", self.id),
    }
  }
}

/// Athlete reference values for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
  pub name: String,
  /// Functional threshold power in watts. Non-positive values disable all FTP ratios.
  pub ftp: i64,
  pub max_hr: i64,
}

impl Default for AthleteProfile {
  fn default() -> Self {
    Self {
      name: "Athlete".to_string(),
      ftp: DEFAULT_FTP,
      max_hr: DEFAULT_MAX_HR,
    }
  }
}
