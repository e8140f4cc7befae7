//! training-report - reads a stream batch, prints the 42-day analysis report
//!
//! Usage: `training-report <batch.json | ->`

use chrono::Utc;
use std::error::Error;
use std::io::Read;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use training_report_lib::AnalysisConfig;

fn main() -> ExitCode {
  match run_cli() {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {}", e);
      ExitCode::FAILURE
    }
  }
}

fn run_cli() -> Result<(), Box<dyn Error>> {
  let config = AnalysisConfig::from_env()?;

  // Logs go to stderr so stdout stays pure JSON
  tracing_subscriber::registry()
    .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let path = std::env::args()
    .nth(1)
    .ok_or("usage: training-report <batch.json | ->")?;

  let input = if path == "-" {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    buf
  } else {
    std::fs::read_to_string(&path)?
  };

  let as_of = config.as_of.unwrap_or_else(Utc::now);
  tracing::info!(source = %path, %as_of, "building training report");

  let report = training_report_lib::run(&input, &config.defaults, as_of)?;

  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}
