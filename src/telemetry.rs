//! Telemetry upload to the remote collector.
//!
//! One report cycle builds a [`TelemetryMessage`] from the current
//! classified sample, POSTs it once and records what happened.  Nothing
//! is queued: an offline cycle is skipped and a failed request is logged
//! and dropped.
//!
//! Wire format (JSON, field order as sent):
//!
//! ```json
//! {"device_id":"ESP32_001","temperature":30.0,"smoke":50,"gas":50,"risk_level":"LOW"}
//! ```
//!
//! The collector answers `{"status":"ok","risk_level":"…","risk_code":n}`
//! and may add `probabilities`.  Its verdict is logged next to the local
//! one and never fed back into the alarm path.

use serde::{Deserialize, Serialize};

use crate::app::events::{AppEvent, SkipReason, UploadOutcome};
use crate::app::ports::{CollectorPort, EventSink};
use crate::context::{Classified, ControllerState, DeviceIdentity};
use crate::risk::RiskLevel;

// ───────────────────────────────────────────────────────────────
// Wire types
// ───────────────────────────────────────────────────────────────

/// Outbound message, built fresh for every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryMessage<'a> {
    pub device_id: &'a str,
    pub temperature: f32,
    pub smoke: u16,
    pub gas: u16,
    pub risk_level: RiskLevel,
}

impl<'a> TelemetryMessage<'a> {
    pub fn new(device: &'a DeviceIdentity, classified: &Classified) -> Self {
        Self {
            device_id: device.as_str(),
            temperature: classified.reading.temperature_c,
            smoke: classified.reading.smoke_ppm,
            gas: classified.reading.gas_ppm,
            risk_level: classified.verdict.level,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Collector acknowledgement.  Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectorAck {
    #[serde(default)]
    pub status: heapless::String<16>,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_code: Option<u8>,
}

impl CollectorAck {
    /// Parse a 2xx response body.  `None` for anything that is not a
    /// well-formed acknowledgement.
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

// ───────────────────────────────────────────────────────────────
// Reporter
// ───────────────────────────────────────────────────────────────

/// Outcome counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryStats {
    pub delivered: u32,
    pub rejected: u32,
    pub failed: u32,
    pub skipped: u32,
}

#[derive(Default)]
pub struct TelemetryReporter {
    stats: TelemetryStats,
}

impl TelemetryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one report cycle against the current state.
    pub fn report(
        &mut self,
        state: &ControllerState,
        device: &DeviceIdentity,
        collector: &mut impl CollectorPort,
        sink: &mut impl EventSink,
    ) -> UploadOutcome {
        let outcome = Self::attempt(state, device, collector);

        let counter = match &outcome {
            UploadOutcome::Delivered { .. } => &mut self.stats.delivered,
            UploadOutcome::Rejected { .. } => &mut self.stats.rejected,
            UploadOutcome::Failed(_) => &mut self.stats.failed,
            UploadOutcome::Skipped(_) => &mut self.stats.skipped,
        };
        *counter = counter.saturating_add(1);

        sink.emit(&AppEvent::Upload(outcome.clone()));
        outcome
    }

    pub fn stats(&self) -> TelemetryStats {
        self.stats
    }

    fn attempt(
        state: &ControllerState,
        device: &DeviceIdentity,
        collector: &mut impl CollectorPort,
    ) -> UploadOutcome {
        if !state.is_online() {
            return UploadOutcome::Skipped(SkipReason::Offline);
        }
        let Some(current) = state.current.as_ref() else {
            return UploadOutcome::Skipped(SkipReason::NoReading);
        };

        let message = TelemetryMessage::new(device, current);
        let body = match message.to_json() {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Telemetry: encode failed: {}", e);
                return UploadOutcome::Skipped(SkipReason::Encode);
            }
        };

        match collector.post_json(&body) {
            Ok(resp) if resp.is_success() => UploadOutcome::Delivered {
                status: resp.status,
                local: message.risk_level,
                remote: CollectorAck::parse(&resp.body).map(|ack| ack.risk_level),
            },
            Ok(resp) => UploadOutcome::Rejected { status: resp.status },
            Err(e) => UploadOutcome::Failed(e),
        }
    }
}
