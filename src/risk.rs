//! Fire-risk classifier.
//!
//! Each channel is scored independently against a (warn, risk) threshold
//! pair, both inclusive:
//!
//! | Channel     | warn (+1) | risk (+2) |
//! |-------------|-----------|-----------|
//! | temperature | 45.0 °C   | 60.0 °C   |
//! | smoke       | 300 ppm   | 500 ppm   |
//! | gas         | 400 ppm   | 700 ppm   |
//!
//! The summed score (0..=6) maps onto a level: `0..=1` LOW, `2..=3` MEDIUM,
//! `>= 4` HIGH.  A single saturated channel contributes at most 2, so HIGH
//! always needs at least two channels above warn.
//!
//! [`classify`] is pure and total.  Raising any one channel can only raise
//! or hold the level.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::context::SensorReading;

// ───────────────────────────────────────────────────────────────
// Risk level
// ───────────────────────────────────────────────────────────────

/// Three-level risk verdict.  Serialises as `"LOW"`, `"MEDIUM"`, `"HIGH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Wire/display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Numeric code used by the collector (`risk_code`).
    pub const fn code(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Map a summed channel score onto a level.
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=1 => Self::Low,
            2..=3 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying one reading.  Recomputed every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskVerdict {
    pub score: u8,
    pub level: RiskLevel,
}

// ───────────────────────────────────────────────────────────────
// Thresholds
// ───────────────────────────────────────────────────────────────

/// Warn/risk threshold pairs for the three channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub temperature_warn_c: f32,
    pub temperature_risk_c: f32,
    pub smoke_warn_ppm: u16,
    pub smoke_risk_ppm: u16,
    pub gas_warn_ppm: u16,
    pub gas_risk_ppm: u16,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            temperature_warn_c: 45.0,
            temperature_risk_c: 60.0,
            smoke_warn_ppm: 300,
            smoke_risk_ppm: 500,
            gas_warn_ppm: 400,
            gas_risk_ppm: 700,
        }
    }
}

impl RiskThresholds {
    /// Every warn threshold must sit strictly below its risk threshold.
    pub fn is_ordered(&self) -> bool {
        self.temperature_warn_c < self.temperature_risk_c
            && self.smoke_warn_ppm < self.smoke_risk_ppm
            && self.gas_warn_ppm < self.gas_risk_ppm
    }
}

// ───────────────────────────────────────────────────────────────
// Classification
// ───────────────────────────────────────────────────────────────

/// Score one channel: 2 at or above `risk`, 1 at or above `warn`, else 0.
fn channel_score<T: PartialOrd>(value: T, warn: T, risk: T) -> u8 {
    if value >= risk {
        2
    } else if value >= warn {
        1
    } else {
        0
    }
}

/// Classify a reading.  Never fails.
///
/// A NaN temperature compares false against both thresholds and scores 0;
/// acquisition never stores one.
pub fn classify(reading: &SensorReading, thresholds: &RiskThresholds) -> RiskVerdict {
    let score = channel_score(
        reading.temperature_c,
        thresholds.temperature_warn_c,
        thresholds.temperature_risk_c,
    ) + channel_score(reading.smoke_ppm, thresholds.smoke_warn_ppm, thresholds.smoke_risk_ppm)
        + channel_score(reading.gas_ppm, thresholds.gas_warn_ppm, thresholds.gas_risk_ppm);

    RiskVerdict {
        score,
        level: RiskLevel::from_score(score),
    }
}
