//! Report assembly: one pass from raw ride records to the AnalysisReport

use crate::analysis::{
  ActivityMetrics, AnalysisWindow, DailyLoad, TrainingLoadSummary, WeeklyTrend, ACUTE_DAYS,
  MONTH_DAYS, PERIOD_DAYS,
};
use crate::models::report::{DurationHighlight, IntensityHighlight, TssHighlight};
use crate::models::{
  ActivityRecord, AnalysisReport, AthleteInfo, AthleteProfile, FormStatus, Highlights, Period,
  Summary,
};
use crate::zones::{self, HrZoneDistribution, ZoneDistribution};
use chrono::{DateTime, Utc};

/// Maximum entries in `recent_activities`
pub const RECENT_ACTIVITIES_LIMIT: usize = 10;

impl AnalysisReport {
  /// Build the report for `records` as of the given instant.
  ///
  /// Rides dated outside the 42-day window are ignored. Rides without power
  /// samples contribute nothing. Identical inputs give identical reports.
  pub fn build(records: &[ActivityRecord], athlete: &AthleteProfile, as_of: DateTime<Utc>) -> Self {
    let window = AnalysisWindow::ending_at(as_of);

    let in_window: Vec<&ActivityRecord> = records
      .iter()
      .filter(|r| {
        let inside = window.contains(r.date());
        if !inside {
          tracing::debug!(activity_id = r.id, date = %r.date(), "activity outside analysis window");
        }
        inside
      })
      .collect();

    let metrics: Vec<ActivityMetrics> = in_window
      .iter()
      .filter_map(|r| {
        let m = ActivityMetrics::compute(r, athlete);
        if m.is_none() {
          tracing::debug!(activity_id = r.id, "activity has no power stream, skipped");
        }
        m
      })
      .collect();

    let daily = DailyLoad::from_metrics(&metrics);
    let load = TrainingLoadSummary::compute(&daily, &window);
    let weekly_trend = WeeklyTrend::compute(&metrics, &window);

    let all_watts = || in_window.iter().flat_map(|r| r.watts.iter());
    let zone_distribution = ZoneDistribution::compute(all_watts(), athlete.ftp);
    let zone_times = zones::zone_times(all_watts(), athlete.ftp);
    let hr_zone_distribution =
      HrZoneDistribution::compute(in_window.iter().flat_map(|r| r.heartrate.iter()), athlete.max_hr);

    let summary = Self::build_summary(&metrics, &daily, &window, load);
    let highlights = Highlights::select(&metrics);

    tracing::info!(
      athlete = %athlete.name,
      activities = summary.total_activities,
      ctl = load.ctl,
      atl = load.atl,
      tsb = load.tsb,
      "analysis report assembled"
    );

    Self {
      athlete: AthleteInfo {
        name: athlete.name.clone(),
        ftp: athlete.ftp,
        max_hr: athlete.max_hr,
      },
      period: Period {
        start_date: window.start,
        end_date: window.end,
        total_days: PERIOD_DAYS,
      },
      summary,
      weekly_trend,
      zone_distribution,
      zone_times,
      hr_zone_distribution,
      highlights,
      recent_activities: metrics.into_iter().take(RECENT_ACTIVITIES_LIMIT).collect(),
    }
  }

  fn build_summary(
    metrics: &[ActivityMetrics],
    daily: &DailyLoad,
    window: &AnalysisWindow,
    load: TrainingLoadSummary,
  ) -> Summary {
    let total_tss = daily.total();
    let total_duration: i64 = metrics.iter().map(|m| m.duration_seconds).sum();
    let total_distance_m: f64 = metrics.iter().map(|m| m.distance_meters).sum();

    Summary {
      total_activities: metrics.len(),
      total_tss: total_tss.round() as i64,
      avg_daily_tss: (total_tss / PERIOD_DAYS as f64).round() as i64,
      ctl: load.ctl,
      atl: load.atl,
      tsb: load.tsb,
      total_duration,
      total_distance: (total_distance_m / 1000.0).round() as i64,
      weekly_tss: daily
        .sum_between(window.trailing_start(ACUTE_DAYS), window.end)
        .round() as i64,
      monthly_tss: daily
        .sum_between(window.trailing_start(MONTH_DAYS), window.end)
        .round() as i64,
      form_status: FormStatus::from_tsb(load.tsb),
    }
  }

  /// Serialize to JSON for the AI prompt
  pub fn to_json(&self) -> String {
    serde_json::to_string_pretty(self).unwrap_or_default()
  }
}

impl Highlights {
  /// Highest TSS, longest duration and highest IF in one pass.
  ///
  /// Only a strictly greater value replaces the current pick, so ties keep
  /// the earliest activity in input order.
  pub fn select(metrics: &[ActivityMetrics]) -> Self {
    let mut best_tss: Option<&ActivityMetrics> = None;
    let mut longest: Option<&ActivityMetrics> = None;
    let mut highest_if: Option<&ActivityMetrics> = None;

    for m in metrics {
      if best_tss.map_or(true, |b| m.tss > b.tss) {
        best_tss = Some(m);
      }
      if longest.map_or(true, |b| m.duration_seconds > b.duration_seconds) {
        longest = Some(m);
      }
      if highest_if.map_or(true, |b| m.intensity_factor > b.intensity_factor) {
        highest_if = Some(m);
      }
    }

    Self {
      best_tss_day: best_tss.map(|m| TssHighlight {
        date: m.date,
        tss: m.tss,
        name: m.name.clone(),
      }),
      longest_ride: longest.map(|m| DurationHighlight {
        date: m.date,
        duration: m.duration_seconds,
        name: m.name.clone(),
      }),
      highest_if: highest_if.map(|m| IntensityHighlight {
        date: m.date,
        intensity_factor: m.intensity_factor,
        name: m.name.clone(),
      }),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
