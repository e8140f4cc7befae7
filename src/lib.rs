//! Training-load analytics for power-meter rides.
//!
//! Raw activity/stream records go in, one deterministic `AnalysisReport`
//! comes out: Normalized Power, TSS and IF per ride, CTL/ATL/TSB over a
//! 42-day window, zone distribution, weekly trend and highlights.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod models;
pub mod power;
pub mod report;
pub mod zones;

#[cfg(test)]
mod test_utils;

use chrono::{DateTime, Utc};

pub use config::{AnalysisConfig, ConfigError};
pub use ingest::{parse_batch, Batch, IngestError, ProfileDefaults};
pub use models::{ActivityRecord, AnalysisReport, AthleteProfile};

/// Parse a stream batch and build its report as of the given instant
pub fn run(
  batch_json: &str,
  defaults: &ProfileDefaults,
  as_of: DateTime<Utc>,
) -> Result<AnalysisReport, IngestError> {
  let batch = parse_batch(batch_json, defaults)?;
  Ok(AnalysisReport::build(&batch.activities, &batch.athlete, as_of))
}
