//! Outbound application events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  They form the diagnostic
//! output: one event per sense cycle, alarm change, link change and upload
//! outcome.  Nothing inside the firmware consumes them.

use crate::context::{ConnectionState, DeviceIdentity, SensorReading};
use crate::error::CommsError;
use crate::risk::{RiskLevel, RiskVerdict};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller finished boot (carries identity and link state).
    Started {
        device_id: DeviceIdentity,
        connection: ConnectionState,
    },

    /// A sense-and-alert cycle completed.
    Cycle {
        reading: SensorReading,
        verdict: RiskVerdict,
        /// True when the temperature channel was held from a previous cycle.
        temperature_held: bool,
    },

    /// The alarm switched level.
    AlarmChanged {
        from: Option<RiskLevel>,
        to: RiskLevel,
    },

    /// The link changed state.
    Connectivity {
        from: ConnectionState,
        to: ConnectionState,
        /// Link checks spent in this attempt (0 when no attempt was made).
        attempts: u8,
    },

    /// A report cycle ended with the given outcome.
    Upload(UploadOutcome),

    /// The display rejected a frame.  Emitted once per outage.
    DisplayUnavailable,

    /// The display accepted a frame again after an outage.
    DisplayRecovered,
}

/// What happened to one report cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Collector answered 2xx.
    Delivered {
        status: u16,
        local: RiskLevel,
        /// Richer verdict from the collector, when its body parsed.
        remote: Option<RiskLevel>,
    },
    /// Collector answered with a non-2xx status.
    Rejected { status: u16 },
    /// Transport failure before a status was received.
    Failed(CommsError),
    /// Not attempted this cycle.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Link not connected (offline mode).
    Offline,
    /// No sense cycle has completed yet.
    NoReading,
    /// Serialising the message failed.
    Encode,
}
