//! Passive piezo buzzer on an LEDC PWM channel.
//!
//! A tone is a 50 % duty square wave at the requested frequency; silence
//! is 0 % duty.  The LEDC timer is retuned only when the frequency
//! changes.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel configured by hw_init.
//! On host/test: tracks state in-memory only.

use log::warn;

use crate::drivers::hw_init;
use crate::error::ActuatorError;

/// 8-bit duty for a square wave.
const SQUARE_DUTY: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuzzerState {
    Silent,
    Sounding { frequency_hz: u32 },
}

pub struct Buzzer {
    state: BuzzerState,
    write_failures: u32,
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buzzer {
    pub fn new() -> Self {
        Self {
            state: BuzzerState::Silent,
            write_failures: 0,
        }
    }

    pub fn tone(&mut self, frequency_hz: u32) {
        if self.state == (BuzzerState::Sounding { frequency_hz }) {
            return;
        }
        match Self::write(frequency_hz, SQUARE_DUTY) {
            Ok(()) => self.state = BuzzerState::Sounding { frequency_hz },
            Err(e) => self.note_failure(e),
        }
    }

    pub fn silence(&mut self) {
        // Always written: silence is the safe state and must not be skipped.
        match Self::write(0, 0) {
            Ok(()) => self.state = BuzzerState::Silent,
            Err(e) => self.note_failure(e),
        }
    }

    pub fn state(&self) -> BuzzerState {
        self.state
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    fn write(frequency_hz: u32, duty: u8) -> Result<(), ActuatorError> {
        if hw_init::ledc_set_tone(frequency_hz, duty) {
            Ok(())
        } else {
            Err(ActuatorError::PwmWriteFailed)
        }
    }

    fn note_failure(&mut self, e: ActuatorError) {
        self.write_failures = self.write_failures.saturating_add(1);
        warn!("Buzzer: {} ({} total)", e, self.write_failures);
    }
}
