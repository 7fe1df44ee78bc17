//! Sensor subsystem — individual drivers and the [`Acquisition`] stage.
//!
//! Drivers (`temperature`, `gas`) return raw values through
//! [`SensorPort`](crate::app::ports::SensorPort).  `Acquisition` turns
//! those into a calibrated [`SensorReading`]:
//!
//! - temperature: a failed read keeps the last known-good value, any number
//!   of times in a row, and is never surfaced as a fault;
//! - smoke / gas: raw `0..=adc_full_scale` mapped linearly onto
//!   `0..=ppm_full_scale`, no filtering.

pub mod gas;
pub mod temperature;

use log::debug;

use crate::app::ports::SensorPort;
use crate::config::SystemConfig;
use crate::context::SensorReading;

/// Linear rescale of a raw ADC code, integer arithmetic, truncating.
/// Codes above `adc_full_scale` clamp to `ppm_full_scale`.
pub fn scale_to_ppm(raw: u16, adc_full_scale: u16, ppm_full_scale: u16) -> u16 {
    if adc_full_scale == 0 {
        return 0;
    }
    let raw = raw.min(adc_full_scale) as u32;
    (raw * ppm_full_scale as u32 / adc_full_scale as u32) as u16
}

/// Calibrated sample of one acquisition pass, plus fault bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub reading: SensorReading,
    /// The temperature field is a held value, not a fresh read.
    pub temperature_held: bool,
}

/// Owns the last known-good values and produces one reading per call.
pub struct Acquisition {
    adc_full_scale: u16,
    ppm_full_scale: u16,
    last_temperature_c: f32,
    last_smoke_ppm: u16,
    last_gas_ppm: u16,
    consecutive_temperature_faults: u32,
}

impl Acquisition {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            adc_full_scale: config.adc_full_scale,
            ppm_full_scale: config.ppm_full_scale,
            last_temperature_c: 0.0,
            last_smoke_ppm: 0,
            last_gas_ppm: 0,
            consecutive_temperature_faults: 0,
        }
    }

    /// Read every channel and return a calibrated sample.
    ///
    /// Individual read failures keep the previous good value; a single
    /// flaky sensor must not stall or fault the loop.
    pub fn sample(&mut self, sensors: &mut impl SensorPort, now_ms: u64) -> Sample {
        let temperature_held = match sensors.read_temperature_c() {
            Ok(t) if t.is_finite() => {
                self.last_temperature_c = t;
                self.consecutive_temperature_faults = 0;
                false
            }
            Ok(_) => {
                self.note_temperature_fault("non-finite value");
                true
            }
            Err(e) => {
                self.note_temperature_fault(e);
                true
            }
        };

        match sensors.read_smoke_raw() {
            Ok(raw) => {
                self.last_smoke_ppm = scale_to_ppm(raw, self.adc_full_scale, self.ppm_full_scale);
            }
            Err(e) => debug!("Acquisition: smoke read failed ({}), holding {}ppm", e, self.last_smoke_ppm),
        }

        match sensors.read_gas_raw() {
            Ok(raw) => {
                self.last_gas_ppm = scale_to_ppm(raw, self.adc_full_scale, self.ppm_full_scale);
            }
            Err(e) => debug!("Acquisition: gas read failed ({}), holding {}ppm", e, self.last_gas_ppm),
        }

        Sample {
            reading: SensorReading {
                temperature_c: self.last_temperature_c,
                smoke_ppm: self.last_smoke_ppm,
                gas_ppm: self.last_gas_ppm,
                taken_at_ms: now_ms,
            },
            temperature_held,
        }
    }

    /// Temperature read failures since the last good read.
    pub fn consecutive_temperature_faults(&self) -> u32 {
        self.consecutive_temperature_faults
    }

    fn note_temperature_fault(&mut self, reason: impl core::fmt::Display) {
        self.consecutive_temperature_faults = self.consecutive_temperature_faults.saturating_add(1);
        debug!(
            "Acquisition: temperature read failed ({}), holding {:.1}\u{00b0}C ({} in a row)",
            reason, self.last_temperature_c, self.consecutive_temperature_faults
        );
    }
}
