//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, display, link, collector, clock,
//! event sinks) implement these traits.  The
//! [`Controller`](super::service::Controller) consumes them via generics,
//! so the domain core never touches hardware or sockets directly.
//!
//! Every port call is synchronous.  The ones that may block (link backoff
//! through [`TimePort`], the collector request) are bounded by their
//! adapters' timeouts.

use embedded_hal::delay::DelayNs;

use crate::error::{CommsError, DisplayError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw transducer reads.  Calibration and fault holding happen in
/// [`Acquisition`](crate::sensors::Acquisition), not in the adapter.
pub trait SensorPort {
    /// Temperature in °C, or an error when the sensor returned no data.
    fn read_temperature_c(&mut self) -> Result<f32, SensorError>;

    /// Raw smoke-sensor ADC code (0..=ADC full scale).
    fn read_smoke_raw(&mut self) -> Result<u16, SensorError>;

    /// Raw gas-sensor ADC code (0..=ADC full scale).
    fn read_gas_raw(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Local safety outputs: two indicators and one tone-capable buzzer.
pub trait ActuatorPort {
    /// Drive the "safe" (green) indicator.
    fn set_safe_indicator(&mut self, on: bool);

    /// Drive the "danger" (red) indicator.
    fn set_danger_indicator(&mut self, on: bool);

    /// Start (or retune) the buzzer at `frequency_hz`.
    fn tone_on(&mut self, frequency_hz: u32);

    /// Silence the buzzer.
    fn tone_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Two fixed-width text lines.  Failures are reported, never fatal.
pub trait DisplayPort {
    fn show(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Network ports
// ───────────────────────────────────────────────────────────────

/// The network link as seen by the connectivity manager.
pub trait LinkPort {
    /// Kick off association with the configured network.  Must not block
    /// for longer than the platform's own call latency; the manager polls
    /// [`is_up`](Self::is_up) afterwards.
    fn start_connect(&mut self) -> Result<(), CommsError>;

    /// Whether the link is currently associated and has an address.
    fn is_up(&mut self) -> bool;
}

/// Status line and body of a collector response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorResponse {
    pub status: u16,
    /// Body, truncated at [`RESPONSE_BODY_CAP`] bytes.
    pub body: heapless::Vec<u8, RESPONSE_BODY_CAP>,
}

/// Largest collector response body kept for parsing.
pub const RESPONSE_BODY_CAP: usize = 512;

impl CollectorResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One synchronous request to the fixed collector endpoint.
pub trait CollectorPort {
    /// POST `body` as `application/json`.  Returns the response for any
    /// HTTP status; `Err` only for transport failures.
    fn post_json(&mut self, body: &[u8]) -> Result<CollectorResponse, CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus blocking delay.
pub trait TimePort: DelayNs {
    /// Milliseconds since boot.  Never decreases.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → diagnostic log)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Absent adapters
// ───────────────────────────────────────────────────────────────

// A peripheral that failed to come up at boot is passed in as `None`.
// It then behaves like the hardware being missing, which the controller
// already degrades around.

impl<T: DisplayPort> DisplayPort for Option<T> {
    fn show(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        match self {
            Some(display) => display.show(line1, line2),
            None => Err(DisplayError::NotPresent),
        }
    }
}

impl<T: LinkPort> LinkPort for Option<T> {
    fn start_connect(&mut self) -> Result<(), CommsError> {
        match self {
            Some(link) => link.start_connect(),
            None => Err(CommsError::WifiConnectFailed),
        }
    }

    fn is_up(&mut self) -> bool {
        self.as_mut().is_some_and(|link| link.is_up())
    }
}

impl<T: CollectorPort> CollectorPort for Option<T> {
    fn post_json(&mut self, body: &[u8]) -> Result<CollectorResponse, CommsError> {
        match self {
            Some(collector) => collector.post_json(body),
            None => Err(CommsError::InvalidUrl),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Configuration problems found by
/// [`SystemConfig::validate`](crate::config::SystemConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
