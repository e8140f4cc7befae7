//! Deterministic analysis layer for ride power metrics
//!
//! This module turns raw power streams into training-load numbers.
//! The AI coach interprets these pre-computed figures rather than doing math itself.
//!
//! All windows are UTC calendar days, anchored on an explicit as-of instant.

use crate::models::{ActivityRecord, AthleteProfile};
use crate::power::{self, round_to};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Length of the analysis period (and CTL window) in days
pub const PERIOD_DAYS: i64 = 42;

/// ATL window in days
pub const ACUTE_DAYS: i64 = 7;

/// Window for the monthly TSS total
pub const MONTH_DAYS: i64 = 30;

/// Weekly buckets tiling the period
pub const WEEKS_IN_PERIOD: i64 = PERIOD_DAYS / 7;

/// ---------------------------------------------------------------------------
/// Tier 1: Per-Activity Computed Metrics
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetrics {
  pub id: i64,

  /// UTC calendar day of the ride start
  pub date: NaiveDate,

  pub name: String,

  /// Moving time in seconds (sample count when the record has none)
  #[serde(rename = "duration")]
  pub duration_seconds: i64,

  #[serde(rename = "distance")]
  pub distance_meters: f64,

  /// Normalized Power (W)
  pub np: u32,

  /// Training Stress Score, 1 decimal
  pub tss: f64,

  /// NP / FTP, 2 decimals
  pub intensity_factor: f64,

  pub avg_power: u32,

  pub max_power: f64,

  /// NP / average power, 2 decimals
  pub variability_index: f64,

  pub kilojoules: i64,
}

impl ActivityMetrics {
  /// Compute metrics for one ride. Rides without power samples yield None.
  pub fn compute(record: &ActivityRecord, athlete: &AthleteProfile) -> Option<Self> {
    if !record.has_power() {
      return None;
    }

    let ftp = record.effective_ftp(athlete);
    let duration_seconds = if record.moving_time_seconds > 0 {
      record.moving_time_seconds
    } else {
      record.watts.len() as i64
    };

    let np = power::normalized_power(&record.watts);
    let avg_power = power::average_power(&record.watts);

    Some(Self {
      id: record.id,
      date: record.date(),
      name: record.display_name(),
      duration_seconds,
      distance_meters: record.distance_meters,
      np,
      tss: training_stress_score(np, ftp, duration_seconds),
      intensity_factor: intensity_factor(np, ftp),
      avg_power,
      max_power: power::max_power(&record.watts),
      variability_index: power::variability_index(np, avg_power),
      kilojoules: power::kilojoules(avg_power, duration_seconds),
    })
  }

  pub fn hours(&self) -> f64 {
    self.duration_seconds as f64 / 3600.0
  }
}

/// IF = NP / FTP, 2 decimals. 0 when FTP is not positive.
pub fn intensity_factor(np: u32, ftp: i64) -> f64 {
  if ftp <= 0 {
    return 0.0;
  }
  round_to(np as f64 / ftp as f64, 2)
}

/// TSS = duration × NP × IF / (FTP × 3600) × 100, 1 decimal.
///
/// Uses the unrounded IF. 0 when FTP or NP is not positive.
pub fn training_stress_score(np: u32, ftp: i64, duration_seconds: i64) -> f64 {
  if ftp <= 0 || np == 0 {
    return 0.0;
  }
  let np = np as f64;
  let ftp = ftp as f64;
  let intensity = np / ftp;
  round_to(duration_seconds as f64 * np * intensity / (ftp * 3600.0) * 100.0, 1)
}

/// ---------------------------------------------------------------------------
/// Tier 2: Rolling Context Metrics
/// ---------------------------------------------------------------------------

/// The 42 calendar days ending on the as-of day, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
  pub as_of: DateTime<Utc>,
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl AnalysisWindow {
  pub fn ending_at(as_of: DateTime<Utc>) -> Self {
    let end = as_of.date_naive();
    Self {
      as_of,
      start: end - Duration::days(PERIOD_DAYS - 1),
      end,
    }
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date >= self.start && date <= self.end
  }

  /// First day of the trailing span of `days` days that ends on `end`
  pub fn trailing_start(&self, days: i64) -> NaiveDate {
    self.end - Duration::days(days - 1)
  }

  /// Start of weekly bucket `k` (0-based)
  pub fn week_start(&self, k: i64) -> NaiveDate {
    self.start + Duration::days(7 * k)
  }
}

/// Summed TSS per calendar day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyLoad(BTreeMap<NaiveDate, f64>);

impl DailyLoad {
  pub fn from_metrics(metrics: &[ActivityMetrics]) -> Self {
    let mut days = BTreeMap::new();
    for m in metrics {
      *days.entry(m.date).or_insert(0.0) += m.tss;
    }
    Self(days)
  }

  pub fn get(&self, date: NaiveDate) -> f64 {
    self.0.get(&date).copied().unwrap_or(0.0)
  }

  /// Sum over `from..=to`
  pub fn sum_between(&self, from: NaiveDate, to: NaiveDate) -> f64 {
    if from > to {
      return 0.0;
    }
    self.0.range(from..=to).map(|(_, tss)| tss).sum()
  }

  pub fn total(&self) -> f64 {
    self.0.values().sum()
  }

  pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    self.0.iter().map(|(date, tss)| (*date, *tss))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Chronic/acute load as fixed-window daily averages (not exponentially weighted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrainingLoadSummary {
  /// Chronic Training Load: 42-day TSS sum / 42
  pub ctl: i64,

  /// Acute Training Load: 7-day TSS sum / 7
  pub atl: i64,

  /// Training Stress Balance: CTL - ATL (form indicator)
  pub tsb: i64,
}

impl TrainingLoadSummary {
  pub fn compute(daily: &DailyLoad, window: &AnalysisWindow) -> Self {
    let chronic = daily.sum_between(window.start, window.end);
    let acute = daily.sum_between(window.trailing_start(ACUTE_DAYS), window.end);

    let ctl = (chronic / PERIOD_DAYS as f64).round() as i64;
    let atl = (acute / ACUTE_DAYS as f64).round() as i64;

    Self {
      ctl,
      atl,
      tsb: ctl - atl,
    }
  }
}

/// One 7-day bucket of the period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrend {
  /// 1-based, earliest week first
  pub week: u32,
  pub start_date: NaiveDate,
  pub tss: i64,
  /// 1 decimal
  pub hours: f64,
  pub activities: usize,
}

impl WeeklyTrend {
  /// Six buckets `[start + 7k, start + 7k + 7)` tiling the window
  pub fn compute(metrics: &[ActivityMetrics], window: &AnalysisWindow) -> Vec<Self> {
    (0..WEEKS_IN_PERIOD)
      .map(|k| {
        let start = window.week_start(k);
        let end = start + Duration::days(7);
        let in_week: Vec<&ActivityMetrics> = metrics
          .iter()
          .filter(|m| m.date >= start && m.date < end)
          .collect();

        let tss: f64 = in_week.iter().map(|m| m.tss).sum();
        let hours: f64 = in_week.iter().map(|m| m.hours()).sum();

        Self {
          week: k as u32 + 1,
          start_date: start,
          tss: tss.round() as i64,
          hours: round_to(hours, 1),
          activities: in_week.len(),
        }
      })
      .collect()
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{as_of, constant_power, mock_activity, mock_athlete, mock_metrics};

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_one_hour_at_ftp() {
    // Arrange: FTP 200, 3600 s at a constant 200 W
    let athlete = mock_athlete(200);
    let record = mock_activity(1, 0, constant_power(200.0, 3600));

    // Act
    let metrics = ActivityMetrics::compute(&record, &athlete).unwrap();

    // Assert
    assert_eq!(metrics.np, 200);
    assert_eq!(metrics.intensity_factor, 1.0);
    assert_eq!(metrics.tss, 100.0);
    assert_eq!(metrics.avg_power, 200);
    assert_eq!(metrics.max_power, 200.0);
    assert_eq!(metrics.variability_index, 1.0);
    assert_eq!(metrics.kilojoules, 720);
  }

  #[test]
  fn test_half_hour_at_tempo() {
    // 1800 s at 180 W, FTP 240: IF 0.75, TSS = 0.5 h × 0.75² × 100 = 28.125
    let athlete = mock_athlete(240);
    let record = mock_activity(1, 0, constant_power(180.0, 1800));

    let metrics = ActivityMetrics::compute(&record, &athlete).unwrap();

    assert_eq!(metrics.intensity_factor, 0.75);
    assert_eq!(metrics.tss, 28.1);
  }

  #[test]
  fn test_non_positive_ftp_zeroes_ratios() {
    for ftp in [0, -100] {
      let athlete = mock_athlete(ftp);
      let record = mock_activity(1, 0, constant_power(250.0, 3600));

      let metrics = ActivityMetrics::compute(&record, &athlete).unwrap();

      assert_eq!(metrics.np, 250);
      assert_eq!(metrics.intensity_factor, 0.0);
      assert_eq!(metrics.tss, 0.0);
    }
  }

  #[test]
  fn test_zero_np_gives_zero_tss() {
    assert_eq!(training_stress_score(0, 200, 3600), 0.0);
  }

  #[test]
  fn test_activity_without_power_is_skipped() {
    let athlete = mock_athlete(200);
    let record = mock_activity(1, 0, vec![]);
    assert!(ActivityMetrics::compute(&record, &athlete).is_none());
  }

  #[test]
  fn test_duration_falls_back_to_sample_count() {
    let athlete = mock_athlete(200);
    let mut record = mock_activity(1, 0, constant_power(200.0, 1800));
    record.moving_time_seconds = 0;

    let metrics = ActivityMetrics::compute(&record, &athlete).unwrap();

    assert_eq!(metrics.duration_seconds, 1800);
    assert_eq!(metrics.tss, 50.0);
  }

  #[test]
  fn test_recorded_ftp_overrides_profile() {
    let athlete = mock_athlete(200);
    let mut record = mock_activity(1, 0, constant_power(200.0, 3600));
    record.recorded_ftp = Some(250);

    let metrics = ActivityMetrics::compute(&record, &athlete).unwrap();

    assert_eq!(metrics.intensity_factor, 0.8);
    assert_eq!(metrics.tss, 64.0);
  }

  #[test]
  fn test_window_bounds() {
    // as_of() is 2026-10-14 18:00 UTC
    let window = AnalysisWindow::ending_at(as_of());

    assert_eq!(window.end, date(2026, 10, 14));
    assert_eq!(window.start, date(2026, 9, 3));
    assert_eq!((window.end - window.start).num_days() + 1, PERIOD_DAYS);
    assert_eq!(window.trailing_start(ACUTE_DAYS), date(2026, 10, 8));
    assert_eq!(window.week_start(5), date(2026, 10, 8));

    assert!(window.contains(date(2026, 9, 3)));
    assert!(window.contains(date(2026, 10, 14)));
    assert!(!window.contains(date(2026, 9, 2)));
    assert!(!window.contains(date(2026, 10, 15)));
  }

  #[test]
  fn test_daily_load_sums_same_day() {
    let metrics = vec![mock_metrics(1, 3, 50.0), mock_metrics(2, 3, 70.0), mock_metrics(3, 4, 20.0)];

    let daily = DailyLoad::from_metrics(&metrics);
    let day = as_of().date_naive() - Duration::days(3);

    assert_eq!(daily.len(), 2);
    assert_eq!(daily.get(day), 120.0);
    assert_eq!(daily.get(day - Duration::days(1)), 20.0);
    assert_eq!(daily.get(day + Duration::days(1)), 0.0);
    assert_eq!(daily.total(), 140.0);
  }

  #[test]
  fn test_daily_load_reversed_range_is_zero() {
    let daily = DailyLoad::from_metrics(&[mock_metrics(1, 0, 50.0)]);
    let today = as_of().date_naive();
    assert_eq!(daily.sum_between(today, today - Duration::days(1)), 0.0);
  }

  #[test]
  fn test_training_load_fixed_windows() {
    // Arrange: 70 TSS every day for the last 7 days, plus 100 TSS 20 days ago
    let mut metrics: Vec<ActivityMetrics> = (0..7).map(|d| mock_metrics(d, d, 70.0)).collect();
    metrics.push(mock_metrics(99, 20, 100.0));
    let window = AnalysisWindow::ending_at(as_of());

    // Act
    let load = TrainingLoadSummary::compute(&DailyLoad::from_metrics(&metrics), &window);

    // Assert: CTL = 590 / 42 = 14.05, ATL = 490 / 7 = 70
    assert_eq!(load.ctl, 14);
    assert_eq!(load.atl, 70);
    assert_eq!(load.tsb, -56);
  }

  #[test]
  fn test_training_load_ignores_days_outside_window() {
    let metrics = vec![mock_metrics(1, 42, 420.0), mock_metrics(2, 7, 70.0)];
    let window = AnalysisWindow::ending_at(as_of());

    let load = TrainingLoadSummary::compute(&DailyLoad::from_metrics(&metrics), &window);

    // 42 days ago is outside the 42-day window, 7 days ago is outside the 7-day one
    assert_eq!(load.ctl, 2);
    assert_eq!(load.atl, 0);
    assert_eq!(load.tsb, 2);
  }

  #[test]
  fn test_training_load_empty() {
    let window = AnalysisWindow::ending_at(as_of());
    let load = TrainingLoadSummary::compute(&DailyLoad::default(), &window);
    assert_eq!(load, TrainingLoadSummary::default());
  }

  #[test]
  fn test_weekly_trend_tiles_period() {
    let window = AnalysisWindow::ending_at(as_of());
    let mut metrics = vec![
      mock_metrics(1, 0, 80.0),  // today -> week 6
      mock_metrics(2, 6, 40.4),  // week 6
      mock_metrics(3, 7, 55.0),  // week 5
      mock_metrics(4, 41, 30.0), // first day -> week 1
    ];
    metrics[1].duration_seconds = 5400;

    let trend = WeeklyTrend::compute(&metrics, &window);

    assert_eq!(trend.len(), 6);
    assert_eq!(trend[0].start_date, window.start);
    assert_eq!(trend[5].start_date, window.start + Duration::days(35));
    for (k, week) in trend.iter().enumerate() {
      assert_eq!(week.week, k as u32 + 1);
    }

    assert_eq!(trend[0].activities, 1);
    assert_eq!(trend[0].tss, 30);
    assert_eq!(trend[4].activities, 1);
    assert_eq!(trend[5].activities, 2);
    assert_eq!(trend[5].tss, 120); // 120.4
    assert_eq!(trend[5].hours, 2.5);
    assert_eq!(trend[1].activities + trend[2].activities + trend[3].activities, 0);
  }

  #[test]
  fn test_weekly_trend_empty() {
    let window = AnalysisWindow::ending_at(as_of());
    let trend = WeeklyTrend::compute(&[], &window);

    assert_eq!(trend.len(), 6);
    assert!(trend.iter().all(|w| w.tss == 0 && w.hours == 0.0 && w.activities == 0));
  }
}
