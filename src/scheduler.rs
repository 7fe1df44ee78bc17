//! Cooperative two-activity scheduler.
//!
//! ```text
//!   loop ─▶ Scheduler::fire(Sense, now)  ─▶ acquire → classify → alarm → display
//!        └▶ Scheduler::fire(Report, now) ─▶ telemetry upload
//! ```
//!
//! Each activity fires when `now - last_run >= period`, then records
//! `last_run = now`.  The timestamp is the tick it actually ran at, not
//! `last_run + period`: a late activity drifts instead of firing a burst
//! of catch-up runs.  An activity that has never run fires on the first
//! check.
//!
//! The scheduler owns no clock.  The controller passes in the monotonic
//! time each call, so tests drive it with plain integers.

use log::debug;

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Sample, classify, drive alarm and display.
    Sense,
    /// Upload the latest classified sample.
    Report,
}

impl Activity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sense => "sense",
            Self::Report => "report",
        }
    }
}

/// Bookkeeping for one periodic activity.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicActivity {
    pub period_ms: u64,
    last_run_ms: Option<u64>,
    runs: u64,
}

impl PeriodicActivity {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_run_ms: None,
            runs: 0,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_run_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.period_ms,
        }
    }

    pub fn last_run_ms(&self) -> Option<u64> {
        self.last_run_ms
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    fn mark_run(&mut self, now_ms: u64) {
        self.last_run_ms = Some(now_ms);
        self.runs = self.runs.saturating_add(1);
    }
}

pub struct Scheduler {
    sense: PeriodicActivity,
    report: PeriodicActivity,
}

impl Scheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self::with_periods(u64::from(config.sense_interval_ms), u64::from(config.report_interval_ms))
    }

    pub fn with_periods(sense_ms: u64, report_ms: u64) -> Self {
        Self {
            sense: PeriodicActivity::new(sense_ms),
            report: PeriodicActivity::new(report_ms),
        }
    }

    /// If `activity` is due at `now_ms`, mark it run and return `true`.
    /// The caller must then run it to completion.
    pub fn fire(&mut self, activity: Activity, now_ms: u64) -> bool {
        let slot = self.slot_mut(activity);
        if !slot.is_due(now_ms) {
            return false;
        }
        if let Some(last) = slot.last_run_ms {
            let late = now_ms.saturating_sub(last).saturating_sub(slot.period_ms);
            if late > slot.period_ms {
                debug!("Scheduler: {} ran {} ms late", activity.label(), late);
            }
        }
        slot.mark_run(now_ms);
        true
    }

    /// Milliseconds until the earlier of the two activities is due.
    pub fn idle_budget_ms(&self, now_ms: u64) -> u64 {
        [self.sense, self.report]
            .iter()
            .map(|a| match a.last_run_ms {
                None => 0,
                Some(last) => (last + a.period_ms).saturating_sub(now_ms),
            })
            .min()
            .unwrap_or(0)
    }

    pub fn activity(&self, activity: Activity) -> &PeriodicActivity {
        match activity {
            Activity::Sense => &self.sense,
            Activity::Report => &self.report,
        }
    }

    fn slot_mut(&mut self, activity: Activity) -> &mut PeriodicActivity {
        match activity {
            Activity::Sense => &mut self.sense,
            Activity::Report => &mut self.report,
        }
    }
}
