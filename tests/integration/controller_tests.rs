//! End-to-end controller scenarios: sensing, classification, alarm
//! outputs, display and report scheduling, driven tick by tick.

use firesense::app::events::{AppEvent, SkipReason, UploadOutcome};
use firesense::app::service::Controller;
use firesense::config::SystemConfig;
use firesense::context::{ConnectionState, DeviceIdentity};
use firesense::error::CommsError;
use firesense::risk::RiskLevel;

use crate::mock_hw::{
    ActuatorCall, CollectorReply, ManualClock, MockCollector, MockHardware, MockLink, RecordingSink,
};

// ── Harness ───────────────────────────────────────────────────

struct Rig {
    ctrl: Controller,
    hw: MockHardware,
    link: MockLink,
    collector: MockCollector,
    clock: ManualClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(link: MockLink) -> Self {
        Self::with_config(SystemConfig::default(), link)
    }

    fn with_config(cfg: SystemConfig, link: MockLink) -> Self {
        let mut rig = Self {
            ctrl: Controller::new(&cfg, DeviceIdentity::new("ESP32_001")),
            hw: MockHardware::new(),
            link,
            collector: MockCollector::ok(),
            clock: ManualClock::at(1_000),
            sink: RecordingSink::default(),
        };
        rig.hw.clock = Some(rig.clock.handle());
        rig.collector.clock = Some(rig.clock.handle());
        rig.ctrl.start(&mut rig.link, &mut rig.clock, &mut rig.sink);
        rig
    }

    fn tick(&mut self) -> firesense::app::service::TickSummary {
        self.ctrl.tick(
            &mut self.hw,
            &mut self.link,
            &mut self.collector,
            &mut self.clock,
            &mut self.sink,
        )
    }

    /// Advance in `step` increments for `total` ms, ticking each step.
    fn run_for(&mut self, total: u64, step: u64) {
        let end = self.clock.now() + total;
        while self.clock.now() < end {
            self.clock.advance(step);
            self.tick();
        }
    }

    /// Tick `n` times, sleeping between ticks the way the firmware loop does.
    fn run_loop(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
            let idle = self.ctrl.idle_budget_ms(self.clock.now()).clamp(1, 20);
            self.clock.advance(idle);
        }
    }
}

// ── Alarm scenarios ───────────────────────────────────────────

#[test]
fn quiet_room_is_low_with_safe_light() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.temperature_c = Some(30.0);
    rig.hw.set_ppm(50, 50);

    let summary = rig.tick();
    assert!(summary.sensed);
    assert_eq!(rig.ctrl.state().latest_level(), Some(RiskLevel::Low));
    assert!(rig.hw.safe_on());
    assert!(!rig.hw.danger_on());
    assert_eq!(rig.hw.tone(), None);
    assert_eq!(rig.hw.last_frame(), Some(("T:30.0C S:50", "G:50 R:LOW")));
}

#[test]
fn medium_risk_pulses_once_then_silences() {
    let mut rig = Rig::new(MockLink::online());
    // Quiet first tick takes the first report out of the way.
    rig.tick();
    rig.clock.advance(2_000);
    rig.hw.set_medium();

    rig.tick();
    assert_eq!(rig.ctrl.state().latest_level(), Some(RiskLevel::Medium));
    assert!(rig.hw.danger_on());
    assert!(!rig.hw.safe_on());
    assert_eq!(rig.hw.tone(), Some(1000));
    assert!(rig.ctrl.pulse_active());

    // Sense is not due again for 2 s; the pulse ends on its own.
    rig.clock.advance(199);
    rig.tick();
    assert_eq!(rig.hw.tone(), Some(1000));
    rig.clock.advance(1);
    rig.tick();
    assert_eq!(rig.hw.tone(), None);
    assert!(!rig.ctrl.pulse_active());
}

#[test]
fn medium_pulse_repeats_every_sense_cycle() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.set_medium();

    rig.run_for(6_000, 100);
    // Sense at 1100, 3100 and 5100; the run ends before 7100.
    assert_eq!(rig.hw.tone_starts(1000), 3);
    assert!(rig.hw.longest_tone_ms(1000, rig.clock.now()) <= 200);
}

#[test]
fn medium_pulse_stays_short_while_offline() {
    for (attempts, backoff_ms) in [(20, 500), (4, 500)] {
        let mut cfg = SystemConfig::default();
        cfg.wifi_max_attempts = attempts;
        cfg.wifi_retry_backoff_ms = backoff_ms;
        let mut rig = Rig::with_config(cfg, MockLink::unreachable());
        rig.hw.set_medium();

        // Every tick blocks in reconnection for attempts * backoff.
        rig.run_loop(5);

        assert_eq!(rig.hw.tone_starts(1000), 5, "attempts {attempts}");
        assert!(
            rig.hw.longest_tone_ms(1000, rig.clock.now()) <= 200,
            "attempts {attempts}: {:?}",
            rig.hw.tone_log
        );
        assert!(!rig.ctrl.state().is_online());
    }
}

#[test]
fn report_waits_for_medium_pulse_to_end() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.set_medium();
    let start = rig.clock.now();

    // Sense and report both fall due on the first tick.
    let summary = rig.tick();
    assert!(summary.sensed);
    assert!(matches!(summary.report, Some(UploadOutcome::Delivered { .. })));

    assert_eq!(rig.hw.tone(), None);
    assert_eq!(rig.hw.longest_tone_ms(1000, rig.clock.now()), 200);
    assert_eq!(rig.collector.post_times, vec![start + 200]);
    assert_eq!(rig.clock.now(), start + 200);
}

#[test]
fn high_risk_sounds_continuously() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.temperature_c = Some(65.0);
    rig.hw.set_ppm(600, 800);

    rig.tick();
    assert_eq!(rig.ctrl.state().latest_level(), Some(RiskLevel::High));
    assert!(rig.hw.danger_on());
    assert_eq!(rig.hw.tone(), Some(2000));
    assert!(!rig.ctrl.pulse_active());

    rig.run_for(5_000, 250);
    assert_eq!(rig.hw.tone(), Some(2000));
    assert!(!rig.hw.calls.contains(&ActuatorCall::ToneOff));
}

#[test]
fn falling_back_to_low_silences_buzzer() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.temperature_c = Some(65.0);
    rig.hw.set_ppm(600, 800);
    rig.tick();
    assert_eq!(rig.hw.tone(), Some(2000));

    rig.hw.temperature_c = Some(25.0);
    rig.hw.set_ppm(0, 0);
    rig.clock.advance(2_000);
    rig.tick();
    assert_eq!(rig.hw.tone(), None);
    assert!(rig.hw.safe_on());
    assert!(!rig.hw.danger_on());

    let changes: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::AlarmChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![(None, RiskLevel::High), (Some(RiskLevel::High), RiskLevel::Low)]
    );
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn temperature_fault_holds_last_value() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.temperature_c = Some(47.5);
    rig.tick();

    rig.hw.temperature_c = None;
    for _ in 0..3 {
        rig.clock.advance(2_000);
        rig.tick();
    }
    let reading = rig.ctrl.state().latest_reading().copied().unwrap();
    assert!((reading.temperature_c - 47.5).abs() < f32::EPSILON);
    assert_eq!(rig.ctrl.consecutive_temperature_faults(), 3);
    assert_eq!(rig.ctrl.state().sense_cycles, 4);
}

#[test]
fn first_read_failing_reports_zero_degrees() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.temperature_c = None;
    rig.tick();
    let reading = rig.ctrl.state().latest_reading().copied().unwrap();
    assert_eq!(reading.temperature_c, 0.0);
}

// ── Display ───────────────────────────────────────────────────

#[test]
fn missing_display_does_not_stop_the_loop() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.display_fails = true;
    rig.hw.temperature_c = Some(65.0);
    rig.hw.set_ppm(600, 800);

    rig.run_for(6_000, 500);
    assert!(!rig.ctrl.display_available());
    assert_eq!(rig.hw.tone(), Some(2000));
    assert!(rig.ctrl.state().sense_cycles >= 3);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::DisplayUnavailable)), 1);

    rig.hw.display_fails = false;
    rig.clock.advance(2_000);
    rig.tick();
    assert!(rig.ctrl.display_available());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::DisplayRecovered)), 1);
}

// ── Scheduling ────────────────────────────────────────────────

#[test]
fn sense_and_report_run_at_their_own_periods() {
    let mut rig = Rig::new(MockLink::online());
    rig.run_for(20_000, 100);

    // 20 s / 2 s, plus the immediate first run.
    assert_eq!(rig.ctrl.state().sense_cycles, 10);
    // 20 s / 10 s: first tick, then +10 s; the third run lands at +20 s.
    assert_eq!(rig.ctrl.state().report_cycles, 2);
    assert_eq!(rig.collector.bodies.len(), 2);
}

#[test]
fn late_iteration_drifts_instead_of_catching_up() {
    let mut rig = Rig::new(MockLink::online());
    rig.tick();
    // Loop stalls for 5 s, two and a half sense periods.
    rig.clock.advance(5_000);
    assert!(rig.tick().sensed);
    // No burst of catch-up runs.
    rig.clock.advance(10);
    assert!(!rig.tick().sensed);
    rig.clock.advance(1_990);
    assert!(rig.tick().sensed);
    assert_eq!(rig.ctrl.state().sense_cycles, 3);
}

#[test]
fn idle_budget_respects_pulse_deadline() {
    let mut rig = Rig::new(MockLink::online());
    rig.tick();
    rig.clock.advance(2_000);
    rig.hw.set_medium();
    rig.tick();
    let now = rig.clock.now();
    assert_eq!(rig.ctrl.idle_budget_ms(now), 200);
}

// ── Reporting ─────────────────────────────────────────────────

#[test]
fn report_carries_latest_classification() {
    let mut rig = Rig::new(MockLink::online());
    rig.hw.set_medium();

    let summary = rig.tick();
    assert!(matches!(
        summary.report,
        Some(UploadOutcome::Delivered { status: 200, local: RiskLevel::Medium, .. })
    ));
    let json = rig.collector.last_json().unwrap();
    assert_eq!(json["device_id"], "ESP32_001");
    assert_eq!(json["temperature"], 50.0);
    assert_eq!(json["smoke"], 350);
    assert_eq!(json["gas"], 200);
    assert_eq!(json["risk_level"], "MEDIUM");
}

#[test]
fn offline_node_keeps_sensing_and_skips_reports() {
    let mut cfg = SystemConfig::default();
    cfg.wifi_max_attempts = 3;
    cfg.wifi_retry_backoff_ms = 100;
    let mut rig = Rig::with_config(cfg, MockLink::unreachable());
    assert_eq!(rig.ctrl.state().connection, ConnectionState::Disconnected);

    rig.hw.temperature_c = Some(65.0);
    rig.hw.set_ppm(600, 800);
    let summary = rig.tick();

    assert!(summary.sensed);
    assert_eq!(summary.report, Some(UploadOutcome::Skipped(SkipReason::Offline)));
    assert!(rig.collector.bodies.is_empty());
    assert_eq!(rig.hw.tone(), Some(2000));
    // Boot plus one retry per tick.
    assert_eq!(rig.link.connect_calls, 2);
}

#[test]
fn link_recovers_on_later_iteration() {
    let mut cfg = SystemConfig::default();
    cfg.wifi_max_attempts = 2;
    cfg.wifi_retry_backoff_ms = 50;
    let mut rig = Rig::with_config(cfg, MockLink::unreachable());
    rig.tick();
    assert!(!rig.ctrl.state().is_online());

    rig.link.reachable = true;
    rig.clock.advance(10_000);
    let summary = rig.tick();
    assert!(rig.ctrl.state().is_online());
    assert!(matches!(summary.report, Some(UploadOutcome::Delivered { .. })));
}

#[test]
fn failed_upload_is_dropped_not_retried() {
    let mut rig = Rig::new(MockLink::online());
    rig.collector = MockCollector::replying(CollectorReply::Transport(CommsError::HttpTimeout));

    let summary = rig.tick();
    assert_eq!(summary.report, Some(UploadOutcome::Failed(CommsError::HttpTimeout)));
    assert_eq!(rig.collector.bodies.len(), 1);

    // Nothing is resent before the next report period.
    rig.run_for(9_000, 500);
    assert_eq!(rig.collector.bodies.len(), 1);
    assert_eq!(rig.ctrl.telemetry_stats().failed, 1);
}

#[test]
fn rejected_upload_is_counted() {
    let mut rig = Rig::new(MockLink::online());
    rig.collector = MockCollector::replying(CollectorReply::Status(400, r#"{"error":"Missing field"}"#));
    let summary = rig.tick();
    assert_eq!(summary.report, Some(UploadOutcome::Rejected { status: 400 }));
    assert_eq!(rig.ctrl.telemetry_stats().rejected, 1);
}

#[test]
fn started_event_carries_identity_and_link() {
    let rig = Rig::new(MockLink::online());
    let started = rig.sink.events.iter().find_map(|e| match e {
        AppEvent::Started { device_id, connection } => Some((device_id.clone(), *connection)),
        _ => None,
    });
    assert_eq!(
        started,
        Some((DeviceIdentity::new("ESP32_001"), ConnectionState::Connected))
    );
}
