//! Power stream reductions
//!
//! All functions take 1 Hz power samples in watts and never fail: empty input
//! reduces to zero.

/// Rolling window (samples) for Normalized Power
pub const NP_WINDOW: usize = 30;

/// Round to `dp` decimal places, half away from zero
pub fn round_to(value: f64, dp: u32) -> f64 {
  if dp == 0 {
    return value.round();
  }
  let factor = 10_f64.powi(dp as i32);
  (value * factor).round() / factor
}

/// Arithmetic mean, rounded to whole watts. 0 for an empty stream.
pub fn average_power(watts: &[f64]) -> u32 {
  if watts.is_empty() {
    return 0;
  }
  let mean = watts.iter().sum::<f64>() / watts.len() as f64;
  mean.round().max(0.0) as u32
}

/// Highest sample. 0 for an empty stream.
pub fn max_power(watts: &[f64]) -> f64 {
  watts.iter().copied().fold(0.0, f64::max)
}

/// Normalized Power in whole watts.
///
/// 1. 30-sample trailing rolling average, sliding one sample at a time
/// 2. fourth power of each average, then their mean
/// 3. fourth root
///
/// Streams shorter than the window fall back to the rounded mean.
pub fn normalized_power(watts: &[f64]) -> u32 {
  if watts.len() < NP_WINDOW {
    return average_power(watts);
  }

  let mut fourth_power_sum = 0.0f64;
  let mut count = 0usize;
  let mut window_sum: f64 = watts[..NP_WINDOW - 1].iter().sum();

  for i in (NP_WINDOW - 1)..watts.len() {
    window_sum += watts[i];
    let rolling = window_sum / NP_WINDOW as f64;
    fourth_power_sum += rolling.powi(4);
    count += 1;
    window_sum -= watts[i + 1 - NP_WINDOW];
  }

  let np = (fourth_power_sum / count as f64).powf(0.25);
  np.round().max(0.0) as u32
}

/// VI = NP / average power, 2 decimals. 0 without average power.
pub fn variability_index(np: u32, avg_power: u32) -> f64 {
  if avg_power == 0 {
    return 0.0;
  }
  round_to(np as f64 / avg_power as f64, 2)
}

/// Mechanical work in kJ from average power and duration
pub fn kilojoules(avg_power: u32, duration_seconds: i64) -> i64 {
  (avg_power as f64 * duration_seconds.max(0) as f64 / 1000.0).round() as i64
}
