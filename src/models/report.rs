use crate::analysis::{ActivityMetrics, WeeklyTrend};
use crate::zones::{HrZoneDistribution, ZoneDistribution, ZoneTime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The complete 42-day report handed to the renderer / AI prompt filler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
  pub athlete: AthleteInfo,
  pub period: Period,
  pub summary: Summary,

  /// Six 7-day buckets, earliest first
  pub weekly_trend: Vec<WeeklyTrend>,

  /// Share of all power samples per zone, sums to 100 when there is data
  pub zone_distribution: ZoneDistribution,

  /// Seconds and mean watts per zone
  pub zone_times: Vec<ZoneTime>,

  pub hr_zone_distribution: HrZoneDistribution,

  pub highlights: Highlights,

  /// At most 10, in input order
  pub recent_activities: Vec<ActivityMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteInfo {
  pub name: String,
  pub ftp: i64,
  #[serde(rename = "maxHR")]
  pub max_hr: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
  pub start_date: NaiveDate,
  pub end_date: NaiveDate,
  pub total_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub total_activities: usize,
  #[serde(rename = "totalTSS")]
  pub total_tss: i64,
  #[serde(rename = "avgDailyTSS")]
  pub avg_daily_tss: i64,
  pub ctl: i64,
  pub atl: i64,
  pub tsb: i64,
  /// Seconds
  pub total_duration: i64,
  /// Kilometres
  pub total_distance: i64,
  /// TSS over the trailing 7 days
  #[serde(rename = "weeklyTSS")]
  pub weekly_tss: i64,
  /// TSS over the trailing 30 days
  #[serde(rename = "monthlyTSS")]
  pub monthly_tss: i64,
  pub form_status: FormStatus,
}

/// TSB band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
  Recovered,   // > 25
  Fresh,       // > 5
  Neutral,     // > -10
  Fatigued,    // > -30
  Overreached, // <= -30
}

impl FormStatus {
  pub fn from_tsb(tsb: i64) -> Self {
    match tsb {
      t if t > 25 => FormStatus::Recovered,
      t if t > 5 => FormStatus::Fresh,
      t if t > -10 => FormStatus::Neutral,
      t if t > -30 => FormStatus::Fatigued,
      _ => FormStatus::Overreached,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlights {
  #[serde(rename = "bestTSSDay")]
  pub best_tss_day: Option<TssHighlight>,
  pub longest_ride: Option<DurationHighlight>,
  #[serde(rename = "highestIF")]
  pub highest_if: Option<IntensityHighlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TssHighlight {
  pub date: NaiveDate,
  pub tss: f64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationHighlight {
  pub date: NaiveDate,
  /// Seconds
  pub duration: i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityHighlight {
  pub date: NaiveDate,
  #[serde(rename = "if")]
  pub intensity_factor: f64,
  pub name: String,
}
