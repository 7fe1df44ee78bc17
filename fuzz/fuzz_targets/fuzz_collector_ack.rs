//! Fuzz target: collector acknowledgement decoding
//!
//! Feeds arbitrary bytes to `CollectorAck::parse`, which sees whatever a
//! 2xx reply body holds.  It must never panic, and an accepted ack must
//! re-encode its level to one of the three collector labels.
//!
//! cargo fuzz run fuzz_collector_ack

#![no_main]

use firesense::telemetry::CollectorAck;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(ack) = CollectorAck::parse(data) {
        assert!(matches!(ack.risk_level.label(), "LOW" | "MEDIUM" | "HIGH"));
        assert!(ack.status.len() <= 16);
    }
});
