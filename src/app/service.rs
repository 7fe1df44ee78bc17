//! Application service — the hexagonal core.
//!
//! [`Controller`] owns the scheduler, the controller state and every
//! domain component.  All I/O flows through port traits injected at call
//! sites, so the whole loop runs against mock adapters in tests.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//! ActuatorPort ◀──│          Controller          │
//!  DisplayPort ◀──│ acquire · classify · alarm   │──▶ CollectorPort
//!     LinkPort ◀─▶│ display · link · telemetry   │◀── TimePort
//!                 └──────────────────────────────┘
//! ```
//!
//! One [`tick`](Controller::tick) is one scheduler iteration:
//!
//! 1. link supervision (constant time when up, bounded backoff when down);
//! 2. end an expired MEDIUM pulse;
//! 3. sense-and-alert, if due: acquire → classify → publish → alarm → display;
//! 4. report, if due: a running MEDIUM pulse is let finish first.
//!
//! The clock is re-read after every step that may block, so a long
//! connect or upload cannot make a later step run against a stale time.
//! No blocking step outlives a MEDIUM pulse.

use log::info;

use crate::alarm::{AlarmActuator, PulseGuard};
use crate::config::SystemConfig;
use crate::connectivity::ConnectivityManager;
use crate::context::{Classified, ConnectionState, ControllerState, DeviceIdentity};
use crate::risk::{self, RiskThresholds};
use crate::scheduler::{Activity, Scheduler};
use crate::sensors::Acquisition;
use crate::status::StatusRenderer;
use crate::telemetry::{TelemetryReporter, TelemetryStats};

use super::events::{AppEvent, UploadOutcome};
use super::ports::{
    ActuatorPort, CollectorPort, DisplayPort, EventSink, LinkPort, SensorPort, TimePort,
};

/// What one [`Controller::tick`] did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickSummary {
    /// A sense-and-alert cycle ran.
    pub sensed: bool,
    /// A report cycle came due, with its outcome.
    pub report: Option<UploadOutcome>,
}

pub struct Controller {
    device_id: DeviceIdentity,
    thresholds: RiskThresholds,
    state: ControllerState,
    scheduler: Scheduler,
    acquisition: Acquisition,
    alarm: AlarmActuator,
    status: StatusRenderer,
    connectivity: ConnectivityManager,
    telemetry: TelemetryReporter,
}

impl Controller {
    /// Build the controller.  The config is copied in and never changes.
    pub fn new(config: &SystemConfig, device_id: DeviceIdentity) -> Self {
        Self {
            device_id,
            thresholds: config.thresholds,
            state: ControllerState::new(),
            scheduler: Scheduler::new(config),
            acquisition: Acquisition::new(config),
            alarm: AlarmActuator::new(config),
            status: StatusRenderer::new(),
            connectivity: ConnectivityManager::new(config),
            telemetry: TelemetryReporter::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot-time connection attempt.  Returns the resulting link state;
    /// DISCONNECTED is not an error, the loop simply starts offline.
    pub fn start(
        &mut self,
        link: &mut impl LinkPort,
        time: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> ConnectionState {
        let connection = self.connectivity.ensure_connected(&mut self.state, link, time, sink);
        sink.emit(&AppEvent::Started {
            device_id: self.device_id.clone(),
            connection,
        });
        info!("Controller started as {} ({})", self.device_id, connection);
        connection
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one scheduler iteration.  Never fails: every fault is absorbed
    /// by its component and shows up only as an event.
    ///
    /// `hw` is one adapter behind three ports, borrowed once per tick.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort + DisplayPort),
        link: &mut impl LinkPort,
        collector: &mut impl CollectorPort,
        time: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> TickSummary {
        let mut summary = TickSummary::default();

        // 1. Link supervision, every iteration.  Backoff sleeps keep
        //    ending a running pulse on time.
        {
            let mut wait = PulseGuard::new(&mut *time, &mut self.alarm, &mut *hw);
            self.connectivity.ensure_connected(&mut self.state, link, &mut wait, sink);
        }

        // 2. Pulse generator.
        let now = time.now_ms();
        self.alarm.poll(now, hw);

        // 3. Sense-and-alert.
        if self.scheduler.fire(Activity::Sense, now) {
            self.sense_and_alert(hw, now, sink);
            summary.sensed = true;
        }

        // 4. Report.
        let now = time.now_ms();
        if self.scheduler.fire(Activity::Report, now) {
            // The request blocks for up to the HTTP timeout.
            self.alarm.finish_pulse(time, hw);
            self.state.report_cycles = self.state.report_cycles.saturating_add(1);
            let outcome = self.telemetry.report(&self.state, &self.device_id, collector, sink);
            summary.report = Some(outcome);
        }

        summary
    }

    fn sense_and_alert(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort + DisplayPort),
        now: u64,
        sink: &mut impl EventSink,
    ) {
        let sample = self.acquisition.sample(hw, now);
        let verdict = risk::classify(&sample.reading, &self.thresholds);

        // Reading and verdict are published together before any consumer runs.
        self.state.publish(Classified {
            reading: sample.reading,
            verdict,
        });
        self.state.sense_cycles = self.state.sense_cycles.saturating_add(1);

        let previous = self.state.alarm_level.replace(verdict.level);
        self.alarm.apply(verdict.level, now, hw);
        if previous != Some(verdict.level) {
            sink.emit(&AppEvent::AlarmChanged {
                from: previous,
                to: verdict.level,
            });
        }

        self.status.render_to(&sample.reading, verdict.level, hw, sink);

        sink.emit(&AppEvent::Cycle {
            reading: sample.reading,
            verdict,
            temperature_held: sample.temperature_held,
        });
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn device_id(&self) -> &DeviceIdentity {
        &self.device_id
    }

    pub fn telemetry_stats(&self) -> TelemetryStats {
        self.telemetry.stats()
    }

    /// Whether a MEDIUM pulse is still sounding.
    pub fn pulse_active(&self) -> bool {
        self.alarm.pulse_active()
    }

    /// How long the loop may idle before the next tick has work to do.
    /// Accounts for a running MEDIUM pulse.
    pub fn idle_budget_ms(&self, now_ms: u64) -> u64 {
        let scheduled = self.scheduler.idle_budget_ms(now_ms);
        match self.alarm.pulse_deadline() {
            Some(deadline) => scheduled.min(deadline.saturating_sub(now_ms)),
            None => scheduled,
        }
    }

    pub fn display_available(&self) -> bool {
        self.status.is_available()
    }

    pub fn consecutive_temperature_faults(&self) -> u32 {
        self.acquisition.consecutive_temperature_faults()
    }
}
