//! System configuration parameters
//!
//! All tunable parameters for the FireSense node.  Values are compiled in:
//! network credentials, collector URL and device identity come from
//! build-time environment variables, everything else from [`Default`].
//! The controller receives the config at construction and never mutates it.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::risk::RiskThresholds;

pub type SsidString = heapless::String<32>;
pub type PasswordString = heapless::String<64>;
pub type UrlString = heapless::String<128>;
pub type DeviceIdString = heapless::String<{ crate::context::DEVICE_ID_CAP }>;

const DEFAULT_COLLECTOR_URL: &str = "http://192.168.1.100:5000/api/sensor-data";

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity / network ---
    /// Device identity; empty means "derive from factory MAC".
    pub device_id: DeviceIdString,
    pub wifi_ssid: SsidString,
    pub wifi_password: PasswordString,
    /// Collector endpoint, `http://host[:port]/path`.
    pub collector_url: UrlString,

    // --- Risk ---
    pub thresholds: RiskThresholds,

    // --- Acquisition ---
    /// Highest raw ADC code (12-bit ADC = 4095).
    pub adc_full_scale: u16,
    /// Calibrated ppm value mapped to `adc_full_scale`.
    pub ppm_full_scale: u16,

    // --- Alarm ---
    /// Tone frequency of the MEDIUM pulse (Hz)
    pub medium_tone_hz: u32,
    /// Length of the MEDIUM pulse (milliseconds)
    pub medium_pulse_ms: u32,
    /// Tone frequency of the continuous HIGH alarm (Hz)
    pub high_tone_hz: u32,

    // --- Timing ---
    /// Sense-and-alert period (milliseconds)
    pub sense_interval_ms: u32,
    /// Telemetry report period (milliseconds)
    pub report_interval_ms: u32,
    /// Link checks per connection attempt before giving up
    pub wifi_max_attempts: u8,
    /// Delay between link checks (milliseconds)
    pub wifi_retry_backoff_ms: u32,
    /// Upper bound on one telemetry request (milliseconds)
    pub http_timeout_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Identity / network
            device_id: bounded(option_env!("FIRESENSE_DEVICE_ID").unwrap_or("")),
            wifi_ssid: bounded(option_env!("FIRESENSE_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("FIRESENSE_WIFI_PASSWORD").unwrap_or("")),
            collector_url: bounded(
                option_env!("FIRESENSE_COLLECTOR_URL").unwrap_or(DEFAULT_COLLECTOR_URL),
            ),

            // Risk
            thresholds: RiskThresholds::default(),

            // Acquisition
            adc_full_scale: 4095,
            ppm_full_scale: 1000,

            // Alarm
            medium_tone_hz: 1000,
            medium_pulse_ms: 200,
            high_tone_hz: 2000,

            // Timing
            sense_interval_ms: 2_000,     // 0.5 Hz
            report_interval_ms: 10_000,   // every 10 s
            wifi_max_attempts: 20,
            wifi_retry_backoff_ms: 500,   // 20 × 500 ms = 10 s worst case
            http_timeout_ms: 5_000,
            watchdog_timeout_ms: 30_000,
        }
    }
}

impl SystemConfig {
    /// Check internal consistency.  Credentials are validated separately by
    /// the WiFi adapter since an empty SSID is a legal "offline" build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.thresholds.is_ordered() {
            return Err(ConfigError::ValidationFailed(
                "every warn threshold must be below its risk threshold",
            ));
        }
        if self.sense_interval_ms == 0 || self.report_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("periods must be non-zero"));
        }
        if self.sense_interval_ms >= self.report_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "sense period must be shorter than report period",
            ));
        }
        if self.wifi_max_attempts == 0 {
            return Err(ConfigError::ValidationFailed("wifi_max_attempts must be >= 1"));
        }
        if self.adc_full_scale == 0 {
            return Err(ConfigError::ValidationFailed("adc_full_scale must be non-zero"));
        }
        if self.medium_pulse_ms >= self.sense_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "MEDIUM pulse must end within one sense period",
            ));
        }
        if self.collector_url.is_empty() {
            return Err(ConfigError::ValidationFailed("collector_url is empty"));
        }
        let worst_block_ms = u32::from(self.wifi_max_attempts)
            .saturating_mul(self.wifi_retry_backoff_ms)
            .saturating_add(self.http_timeout_ms);
        if self.watchdog_timeout_ms <= worst_block_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog timeout must exceed connect backoff plus HTTP timeout",
            ));
        }
        Ok(())
    }
}

impl SystemConfig {
    /// Return a config that passes [`validate`](Self::validate).
    ///
    /// Identity and credentials are kept.  If validation fails, every
    /// threshold and timing field is reset to its default, and an empty
    /// collector URL is replaced by the default endpoint.  The original
    /// validation error is returned alongside for logging.
    pub fn sanitized(self) -> (Self, Option<ConfigError>) {
        let Err(e) = self.validate() else {
            return (self, None);
        };
        let defaults = Self::default();
        let collector_url = if self.collector_url.is_empty() {
            bounded(DEFAULT_COLLECTOR_URL)
        } else {
            self.collector_url
        };
        let fixed = Self {
            device_id: self.device_id,
            wifi_ssid: self.wifi_ssid,
            wifi_password: self.wifi_password,
            collector_url,
            ..defaults
        };
        (fixed, Some(e))
    }
}

/// Copy `s` into a fixed-capacity string, truncating on a char boundary.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
