//! Controller state threaded through every component call.
//!
//! `ControllerState` is the one mutable record the loop owns: the current
//! classified sample, the link state and the alarm level last applied.
//! Components receive it by reference; nothing else holds a copy.
//!
//! The reading and its verdict live together in [`Classified`] and are only
//! ever replaced as a pair, so a consumer can never observe a fresh reading
//! next to a stale verdict.

use core::fmt;

use crate::risk::{RiskLevel, RiskVerdict};

// ---------------------------------------------------------------------------
// Sensor reading
// ---------------------------------------------------------------------------

/// One calibrated sample of all three channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Air temperature (°C).  Holds the last good value across read faults.
    pub temperature_c: f32,
    /// Smoke concentration (ppm, 0..=full scale).
    pub smoke_ppm: u16,
    /// Combustible gas concentration (ppm, 0..=full scale).
    pub gas_ppm: u16,
    /// Monotonic time the sample was taken (ms since boot).
    pub taken_at_ms: u64,
}

/// A reading together with the verdict computed from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified {
    pub reading: SensorReading,
    pub verdict: RiskVerdict,
}

// ---------------------------------------------------------------------------
// Connection state
// ---------------------------------------------------------------------------

/// Network link state, written only by the connectivity manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("DISCONNECTED"),
            Self::Connecting => f.write_str("CONNECTING"),
            Self::Connected => f.write_str("CONNECTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Device identity
// ---------------------------------------------------------------------------

/// Maximum device identity length.
pub const DEVICE_ID_CAP: usize = 32;

/// Immutable identity string included in every telemetry message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity(heapless::String<DEVICE_ID_CAP>);

impl DeviceIdentity {
    /// Build an identity, truncating to [`DEVICE_ID_CAP`] bytes on a char
    /// boundary.
    pub fn new(id: &str) -> Self {
        Self(crate::config::bounded(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ControllerState
// ---------------------------------------------------------------------------

/// The shared state owned by the controller loop.
#[derive(Debug, Default)]
pub struct ControllerState {
    /// Latest reading and its verdict, `None` until the first sense cycle.
    pub current: Option<Classified>,
    /// Link state as last observed by the connectivity manager.
    pub connection: ConnectionState,
    /// Alarm level last applied to the actuators.
    pub alarm_level: Option<RiskLevel>,
    /// Completed sense-and-alert cycles.
    pub sense_cycles: u64,
    /// Report cycles that came due (sent or skipped).
    pub report_cycles: u64,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current reading and verdict in one step.
    pub fn publish(&mut self, classified: Classified) {
        self.current = Some(classified);
    }

    pub fn latest_reading(&self) -> Option<&SensorReading> {
        self.current.as_ref().map(|c| &c.reading)
    }

    pub fn latest_level(&self) -> Option<RiskLevel> {
        self.current.as_ref().map(|c| c.verdict.level)
    }

    pub fn is_online(&self) -> bool {
        self.connection == ConnectionState::Connected
    }
}
