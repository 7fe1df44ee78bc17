//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per application event to
//! the logger (UART / USB-CDC in production).  This is the node's
//! diagnostic output; nothing parses it.

use log::{info, warn};

use crate::app::events::{AppEvent, SkipReason, UploadOutcome};
use crate::app::ports::EventSink;
use crate::context::ConnectionState;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle {
                reading,
                verdict,
                temperature_held,
            } => {
                info!(
                    "CYCLE | T={:.1}\u{00b0}C{} | smoke={}ppm | gas={}ppm | score={} | risk={}",
                    reading.temperature_c,
                    if *temperature_held { " (held)" } else { "" },
                    reading.smoke_ppm,
                    reading.gas_ppm,
                    verdict.score,
                    verdict.level,
                );
            }
            AppEvent::AlarmChanged { from, to } => match from {
                Some(from) => warn!("ALARM | {} -> {}", from, to),
                None => info!("ALARM | initial level {}", to),
            },
            AppEvent::Connectivity {
                from,
                to: to @ ConnectionState::Connecting,
                ..
            } => warn!("NET | {} -> {} (link lost)", from, to),
            AppEvent::Connectivity { from, to, attempts } => {
                info!("NET | {} -> {} after {} check(s)", from, to, attempts);
            }
            AppEvent::Upload(outcome) => match outcome {
                UploadOutcome::Delivered {
                    status,
                    local,
                    remote: Some(remote),
                } => info!("UPLOAD | HTTP {} | local={} remote={}", status, local, remote),
                UploadOutcome::Delivered {
                    status,
                    local,
                    remote: None,
                } => info!("UPLOAD | HTTP {} | local={} (no verdict in reply)", status, local),
                UploadOutcome::Rejected { status } => {
                    warn!("UPLOAD | collector answered HTTP {}, reading dropped", status);
                }
                UploadOutcome::Failed(e) => warn!("UPLOAD | {}, reading dropped", e),
                UploadOutcome::Skipped(SkipReason::Offline) => info!("UPLOAD | skipped (offline)"),
                UploadOutcome::Skipped(SkipReason::NoReading) => info!("UPLOAD | skipped (no reading yet)"),
                UploadOutcome::Skipped(SkipReason::Encode) => warn!("UPLOAD | skipped (encode failed)"),
            },
            AppEvent::DisplayUnavailable => {
                warn!("DISPLAY | unavailable, continuing without it");
            }
            AppEvent::DisplayRecovered => {
                info!("DISPLAY | recovered");
            }
            AppEvent::Started {
                device_id,
                connection,
            } => {
                info!("START | device={} | link={}", device_id, connection);
            }
        }
    }
}
