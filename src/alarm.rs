//! Alarm actuator: indicators and buzzer driven from the risk level.
//!
//! | Level  | safe | danger | buzzer                          |
//! |--------|------|--------|---------------------------------|
//! | LOW    | on   | off    | silent                          |
//! | MEDIUM | off  | on     | one low-tone pulse, then silent |
//! | HIGH   | off  | on     | continuous high tone            |
//!
//! Outputs are a pure function of the level passed in; there is no
//! hysteresis and every level is reachable from every other one.  The
//! whole row is re-applied each sense cycle.
//!
//! The MEDIUM pulse is non-blocking: [`AlarmActuator::apply`] starts the
//! tone and records its deadline, and [`AlarmActuator::poll`] silences it
//! once the scheduler clock passes that deadline.  Steps that block the
//! loop must not outlive a pulse: backoff sleeps go through
//! [`PulseGuard`], and [`AlarmActuator::finish_pulse`] runs before an
//! upload.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{ActuatorPort, TimePort};
use crate::config::SystemConfig;
use crate::risk::RiskLevel;

/// Buzzer action for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneCommand {
    Off,
    Pulse { frequency_hz: u32, duration_ms: u32 },
    Continuous { frequency_hz: u32 },
}

/// Full output row for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmOutputs {
    pub safe_indicator: bool,
    pub danger_indicator: bool,
    pub tone: ToneCommand,
}

/// Tone settings lifted from [`SystemConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmTones {
    pub medium_hz: u32,
    pub medium_pulse_ms: u32,
    pub high_hz: u32,
}

impl AlarmTones {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            medium_hz: config.medium_tone_hz,
            medium_pulse_ms: config.medium_pulse_ms,
            high_hz: config.high_tone_hz,
        }
    }
}

impl AlarmOutputs {
    pub fn for_level(level: RiskLevel, tones: &AlarmTones) -> Self {
        match level {
            RiskLevel::Low => Self {
                safe_indicator: true,
                danger_indicator: false,
                tone: ToneCommand::Off,
            },
            RiskLevel::Medium => Self {
                safe_indicator: false,
                danger_indicator: true,
                tone: ToneCommand::Pulse {
                    frequency_hz: tones.medium_hz,
                    duration_ms: tones.medium_pulse_ms,
                },
            },
            RiskLevel::High => Self {
                safe_indicator: false,
                danger_indicator: true,
                tone: ToneCommand::Continuous {
                    frequency_hz: tones.high_hz,
                },
            },
        }
    }
}

pub struct AlarmActuator {
    tones: AlarmTones,
    /// Deadline (ms) of a running MEDIUM pulse.
    pulse_ends_at: Option<u64>,
}

impl AlarmActuator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            tones: AlarmTones::from_config(config),
            pulse_ends_at: None,
        }
    }

    /// Drive every output for `level`.  Returns the row that was applied.
    pub fn apply(&mut self, level: RiskLevel, now_ms: u64, hw: &mut impl ActuatorPort) -> AlarmOutputs {
        let out = AlarmOutputs::for_level(level, &self.tones);
        hw.set_safe_indicator(out.safe_indicator);
        hw.set_danger_indicator(out.danger_indicator);

        match out.tone {
            ToneCommand::Off => {
                hw.tone_off();
                self.pulse_ends_at = None;
            }
            ToneCommand::Pulse {
                frequency_hz,
                duration_ms,
            } => {
                hw.tone_on(frequency_hz);
                self.pulse_ends_at = Some(now_ms.saturating_add(u64::from(duration_ms)));
            }
            ToneCommand::Continuous { frequency_hz } => {
                hw.tone_on(frequency_hz);
                self.pulse_ends_at = None;
            }
        }
        out
    }

    /// End a MEDIUM pulse whose deadline has passed.  Cheap when idle;
    /// called every scheduler iteration.
    pub fn poll(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) {
        if self.pulse_ends_at.is_some_and(|deadline| now_ms >= deadline) {
            hw.tone_off();
            self.pulse_ends_at = None;
        }
    }

    pub fn pulse_active(&self) -> bool {
        self.pulse_ends_at.is_some()
    }

    /// When the running pulse ends, if any.
    pub fn pulse_deadline(&self) -> Option<u64> {
        self.pulse_ends_at
    }

    /// Block until a running pulse has ended, then silence it.  Returns
    /// at once when no pulse is running.
    pub fn finish_pulse(&mut self, time: &mut impl TimePort, hw: &mut impl ActuatorPort) {
        if let Some(deadline) = self.pulse_ends_at {
            let remaining = deadline.saturating_sub(time.now_ms());
            if remaining > 0 {
                time.delay_ms(remaining.min(u64::from(u32::MAX)) as u32);
            }
            self.poll(time.now_ms().max(deadline), hw);
        }
    }
}

/// Blocking delay that keeps servicing the pulse deadline.
///
/// Long sleeps are cut at the deadline so the buzzer goes quiet on time
/// even while the loop is stuck in a wait.
pub struct PulseGuard<'a, T, A> {
    time: &'a mut T,
    alarm: &'a mut AlarmActuator,
    hw: &'a mut A,
}

impl<'a, T: TimePort, A: ActuatorPort> PulseGuard<'a, T, A> {
    pub fn new(time: &'a mut T, alarm: &'a mut AlarmActuator, hw: &'a mut A) -> Self {
        Self { time, alarm, hw }
    }
}

impl<T: TimePort, A: ActuatorPort> DelayNs for PulseGuard<'_, T, A> {
    fn delay_ns(&mut self, ns: u32) {
        self.time.delay_ns(ns);
        let now = self.time.now_ms();
        self.alarm.poll(now, &mut *self.hw);
    }

    fn delay_ms(&mut self, ms: u32) {
        let mut remaining = ms;
        while remaining > 0 {
            let slice = match self.alarm.pulse_deadline() {
                Some(deadline) => {
                    deadline.saturating_sub(self.time.now_ms()).clamp(1, u64::from(remaining)) as u32
                }
                None => remaining,
            };
            self.time.delay_ms(slice);
            remaining -= slice;
            let now = self.time.now_ms();
            self.alarm.poll(now, &mut *self.hw);
        }
    }
}
