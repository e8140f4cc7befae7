//! Power and heart-rate zone classification
//!
//! Zone bounds are whole watts (or bpm): `round(reference × pct / 100)`.
//! Adjacent rounded ranges can leave a gap (e.g. FTP 200: Z1 ends at 110, Z2
//! starts at 112) or touch. A reading belongs to the lowest zone whose upper
//! bound it does not exceed, so gaps fold upward and shared boundaries go to
//! the lower zone. A 111 W sample at FTP 200 therefore counts as Z2; a plain
//! `min <= w <= max` range test would leave it in no zone at all.
//!
//! Distribution percentages are apportioned so they sum to exactly 100. A
//! single zone can therefore sit one point away from its nearest-integer
//! share: seven equal shares of 14.29% come out as 15, 15, 14, 14, 14, 14, 14.

use crate::power::round_to;
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Power Zones (Coggan, % of FTP)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerZone {
  Z1, // Active recovery: 0-55%
  Z2, // Endurance: 56-75%
  Z3, // Tempo: 76-90%
  Z4, // Threshold: 91-105%
  Z5, // VO2max: 106-120%
  Z6, // Anaerobic: 121-150%
  Z7, // Neuromuscular: > 150%
}

impl PowerZone {
  pub const ALL: [PowerZone; 7] = [
    PowerZone::Z1,
    PowerZone::Z2,
    PowerZone::Z3,
    PowerZone::Z4,
    PowerZone::Z5,
    PowerZone::Z6,
    PowerZone::Z7,
  ];

  pub fn number(self) -> u8 {
    self as u8 + 1
  }

  pub fn name(self) -> &'static str {
    match self {
      PowerZone::Z1 => "Active Recovery",
      PowerZone::Z2 => "Endurance",
      PowerZone::Z3 => "Tempo",
      PowerZone::Z4 => "Threshold",
      PowerZone::Z5 => "VO2max",
      PowerZone::Z6 => "Anaerobic",
      PowerZone::Z7 => "Neuromuscular",
    }
  }

  /// (lower %, upper %) of FTP; zone 7 is open-ended
  fn pct_band(self) -> (i64, Option<i64>) {
    match self {
      PowerZone::Z1 => (0, Some(55)),
      PowerZone::Z2 => (56, Some(75)),
      PowerZone::Z3 => (76, Some(90)),
      PowerZone::Z4 => (91, Some(105)),
      PowerZone::Z5 => (106, Some(120)),
      PowerZone::Z6 => (121, Some(150)),
      PowerZone::Z7 => (151, None),
    }
  }

  /// Rounded watt bounds for this zone, both inclusive
  pub fn bounds(self, ftp: i64) -> (i64, Option<i64>) {
    let (lower, upper) = self.pct_band();
    (pct_of(ftp, lower), upper.map(|u| pct_of(ftp, u)))
  }

  /// Zone for one power sample. None when FTP is not positive.
  pub fn classify(watts: f64, ftp: i64) -> Option<Self> {
    if ftp <= 0 {
      return None;
    }
    let zone = Self::ALL
      .into_iter()
      .find(|zone| match zone.bounds(ftp).1 {
        Some(upper) => watts <= upper as f64,
        None => true,
      })
      .unwrap_or(PowerZone::Z7);
    Some(zone)
  }
}

fn pct_of(reference: i64, pct: i64) -> i64 {
  (reference as f64 * pct as f64 / 100.0).round() as i64
}

/// One row of the zone table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBound {
  pub zone: u8,
  pub name: String,
  pub min_power: i64,
  /// None = no upper limit
  pub max_power: Option<i64>,
}

/// The seven power zones for an FTP
pub fn power_zone_table(ftp: i64) -> Vec<ZoneBound> {
  PowerZone::ALL
    .into_iter()
    .map(|zone| {
      let (min_power, max_power) = zone.bounds(ftp);
      ZoneBound {
        zone: zone.number(),
        name: zone.name().to_string(),
        min_power,
        max_power,
      }
    })
    .collect()
}

/// Share of samples per power zone, whole percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneDistribution {
  pub zone1: u32,
  pub zone2: u32,
  pub zone3: u32,
  pub zone4: u32,
  pub zone5: u32,
  pub zone6: u32,
  pub zone7: u32,
}

impl ZoneDistribution {
  /// Percentages over all samples. All zeros for an empty batch or FTP <= 0.
  pub fn compute<'a, I>(watts: I, ftp: i64) -> Self
  where
    I: IntoIterator<Item = &'a f64>,
  {
    let mut counts = [0usize; 7];
    let mut total = 0usize;
    for &w in watts {
      if let Some(zone) = PowerZone::classify(w, ftp) {
        counts[zone as usize] += 1;
        total += 1;
      }
    }

    let [zone1, zone2, zone3, zone4, zone5, zone6, zone7] = apportion(&counts, total);
    Self {
      zone1,
      zone2,
      zone3,
      zone4,
      zone5,
      zone6,
      zone7,
    }
  }

  pub fn as_array(&self) -> [u32; 7] {
    [
      self.zone1, self.zone2, self.zone3, self.zone4, self.zone5, self.zone6, self.zone7,
    ]
  }

  pub fn total(&self) -> u32 {
    self.as_array().iter().sum()
  }
}

/// Time spent in one power zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneTime {
  #[serde(flatten)]
  pub bound: ZoneBound,
  /// 1 Hz samples, so seconds
  pub seconds: usize,
  /// Mean watts of the samples in this zone
  pub avg_power: i64,
  /// Share of all samples, 1 decimal
  pub percentage: f64,
}

/// Seconds, mean watts and share of time per power zone
pub fn zone_times<'a, I>(watts: I, ftp: i64) -> Vec<ZoneTime>
where
  I: IntoIterator<Item = &'a f64>,
{
  let mut seconds = [0usize; 7];
  let mut sums = [0.0f64; 7];
  let mut total = 0usize;

  for &w in watts {
    total += 1;
    if let Some(zone) = PowerZone::classify(w, ftp) {
      seconds[zone as usize] += 1;
      sums[zone as usize] += w;
    }
  }

  power_zone_table(ftp)
    .into_iter()
    .enumerate()
    .map(|(i, bound)| ZoneTime {
      bound,
      seconds: seconds[i],
      avg_power: if seconds[i] > 0 {
        (sums[i] / seconds[i] as f64).round() as i64
      } else {
        0
      },
      percentage: if total > 0 {
        round_to(seconds[i] as f64 / total as f64 * 100.0, 1)
      } else {
        0.0
      },
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// HR Zones (% of max HR)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HrZone {
  Z1, // Recovery: 50-60% max
  Z2, // Aerobic: 60-70% max
  Z3, // Tempo: 70-80% max
  Z4, // Threshold: 80-90% max
  Z5, // Anaerobic: 90-100% max
}

impl HrZone {
  pub const ALL: [HrZone; 5] = [HrZone::Z1, HrZone::Z2, HrZone::Z3, HrZone::Z4, HrZone::Z5];

  /// Lowest classified reading, % of max HR
  const FLOOR_PCT: i64 = 50;

  fn upper_pct(self) -> Option<i64> {
    match self {
      HrZone::Z1 => Some(60),
      HrZone::Z2 => Some(70),
      HrZone::Z3 => Some(80),
      HrZone::Z4 => Some(90),
      HrZone::Z5 => None,
    }
  }

  /// Zone for one heart-rate reading. Readings under 50% of max are unclassified.
  pub fn from_hr(bpm: f64, max_hr: i64) -> Option<Self> {
    if max_hr <= 0 || bpm < pct_of(max_hr, Self::FLOOR_PCT) as f64 {
      return None;
    }
    let zone = Self::ALL
      .into_iter()
      .find(|zone| match zone.upper_pct() {
        Some(upper) => bpm <= pct_of(max_hr, upper) as f64,
        None => true,
      })
      .unwrap_or(HrZone::Z5);
    Some(zone)
  }
}

/// Share of classified heart-rate readings per zone, whole percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HrZoneDistribution {
  pub zone1: u32,
  pub zone2: u32,
  pub zone3: u32,
  pub zone4: u32,
  pub zone5: u32,
}

impl HrZoneDistribution {
  pub fn compute<'a, I>(heartrate: I, max_hr: i64) -> Self
  where
    I: IntoIterator<Item = &'a f64>,
  {
    let mut counts = [0usize; 5];
    let mut total = 0usize;
    for &bpm in heartrate {
      if let Some(zone) = HrZone::from_hr(bpm, max_hr) {
        counts[zone as usize] += 1;
        total += 1;
      }
    }

    let [zone1, zone2, zone3, zone4, zone5] = apportion(&counts, total);
    Self {
      zone1,
      zone2,
      zone3,
      zone4,
      zone5,
    }
  }
}

/// Whole-percent shares that sum to exactly 100 (largest remainder).
///
/// Each share is the floor or ceiling of its exact percentage. Leftover points
/// go to the largest remainders; equal remainders favour the lower zone.
fn apportion<const N: usize>(counts: &[usize; N], total: usize) -> [u32; N] {
  let mut pct = [0u32; N];
  if total == 0 {
    return pct;
  }

  let mut remainders = Vec::with_capacity(N);
  let mut assigned = 0u32;
  for (i, &count) in counts.iter().enumerate() {
    let scaled = count * 100;
    pct[i] = (scaled / total) as u32;
    assigned += pct[i];
    remainders.push((scaled % total, i));
  }

  remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
  let leftover = 100u32.saturating_sub(assigned) as usize;
  for &(_, i) in remainders.iter().take(leftover) {
    pct[i] += 1;
  }

  pct
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
