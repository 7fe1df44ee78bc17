//! Mock adapters for integration tests.
//!
//! Every mock records what the controller asked of it so tests can
//! assert on the full call history without touching real GPIO, I2C or
//! sockets.  The clock is manual: blocking delays advance it.

use firesense::app::events::AppEvent;
use firesense::app::ports::{
    ActuatorPort, CollectorPort, CollectorResponse, DisplayPort, EventSink, LinkPort, SensorPort,
    TimePort,
};
use firesense::error::{CommsError, DisplayError, SensorError};

use std::cell::Cell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Safe(bool),
    Danger(bool),
    ToneOn(u32),
    ToneOff,
}

// ── MockHardware ──────────────────────────────────────────────

/// Sensor inputs are plain fields; set them between ticks.
pub struct MockHardware {
    /// `None` reads as the sensor's "no data" failure.
    pub temperature_c: Option<f32>,
    pub smoke_raw: u16,
    pub gas_raw: u16,
    pub display_fails: bool,

    pub calls: Vec<ActuatorCall>,
    pub frames: Vec<(String, String)>,
    pub sensor_reads: u32,

    /// Shared clock used to stamp buzzer changes; `0` when unset.
    pub clock: Option<Rc<Cell<u64>>>,
    /// `(time, frequency)` for tone-on, `(time, None)` for tone-off.
    pub tone_log: Vec<(u64, Option<u32>)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            temperature_c: Some(25.0),
            smoke_raw: 0,
            gas_raw: 0,
            display_fails: false,
            calls: Vec::new(),
            frames: Vec::new(),
            sensor_reads: 0,
            clock: None,
            tone_log: Vec::new(),
        }
    }

    /// Inputs that classify as MEDIUM (50.0 °C, 350 ppm smoke, 200 ppm gas).
    pub fn set_medium(&mut self) {
        self.temperature_c = Some(50.0);
        self.set_ppm(350, 200);
    }

    /// Number of times a tone at `frequency_hz` was started.
    pub fn tone_starts(&self, frequency_hz: u32) -> usize {
        self.tone_log
            .iter()
            .filter(|(_, f)| *f == Some(frequency_hz))
            .count()
    }

    /// Longest uninterrupted stretch the buzzer sounded at `frequency_hz`.
    /// A tone still on is measured up to `until`.
    pub fn longest_tone_ms(&self, frequency_hz: u32, until: u64) -> u64 {
        let mut longest = 0;
        let mut since: Option<u64> = None;
        for (at, freq) in &self.tone_log {
            match (*freq, since) {
                (Some(f), None) if f == frequency_hz => since = Some(*at),
                (Some(f), Some(_)) if f == frequency_hz => {}
                (_, Some(start)) => {
                    longest = longest.max(at - start);
                    since = None;
                }
                _ => {}
            }
        }
        if let Some(start) = since {
            longest = longest.max(until - start);
        }
        longest
    }

    fn stamp(&self) -> u64 {
        self.clock.as_ref().map_or(0, |c| c.get())
    }

    /// Inputs expressed in ppm on the default 0..=4095 → 0..=1000 scale.
    /// `ppm * 4095 / 1000` rounded up maps back to exactly `ppm`.
    pub fn set_ppm(&mut self, smoke_ppm: u16, gas_ppm: u16) {
        self.smoke_raw = ppm_to_raw(smoke_ppm);
        self.gas_raw = ppm_to_raw(gas_ppm);
    }

    pub fn safe_on(&self) -> bool {
        self.last_indicator(true)
    }

    pub fn danger_on(&self) -> bool {
        self.last_indicator(false)
    }

    /// Current buzzer frequency, `None` when silent.
    pub fn tone(&self) -> Option<u32> {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::ToneOn(hz) => Some(Some(*hz)),
                ActuatorCall::ToneOff => Some(None),
                _ => None,
            })
            .flatten()
    }

    pub fn last_frame(&self) -> Option<(&str, &str)> {
        self.frames.last().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    fn last_indicator(&self, safe: bool) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match (c, safe) {
                (ActuatorCall::Safe(on), true) | (ActuatorCall::Danger(on), false) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

pub fn ppm_to_raw(ppm: u16) -> u16 {
    ((u32::from(ppm) * 4095).div_ceil(1000)) as u16
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_temperature_c(&mut self) -> Result<f32, SensorError> {
        self.sensor_reads += 1;
        self.temperature_c.ok_or(SensorError::NoData)
    }

    fn read_smoke_raw(&mut self) -> Result<u16, SensorError> {
        Ok(self.smoke_raw)
    }

    fn read_gas_raw(&mut self) -> Result<u16, SensorError> {
        Ok(self.gas_raw)
    }
}

impl ActuatorPort for MockHardware {
    fn set_safe_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Safe(on));
    }

    fn set_danger_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Danger(on));
    }

    fn tone_on(&mut self, frequency_hz: u32) {
        self.calls.push(ActuatorCall::ToneOn(frequency_hz));
        self.tone_log.push((self.stamp(), Some(frequency_hz)));
    }

    fn tone_off(&mut self) {
        self.calls.push(ActuatorCall::ToneOff);
        self.tone_log.push((self.stamp(), None));
    }
}

impl DisplayPort for MockHardware {
    fn show(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        if self.display_fails {
            return Err(DisplayError::NotPresent);
        }
        self.frames.push((line1.to_owned(), line2.to_owned()));
        Ok(())
    }
}

// ── MockLink ──────────────────────────────────────────────────

/// Link that comes up on `start_connect` when `reachable`.
#[derive(Default)]
pub struct MockLink {
    pub reachable: bool,
    pub up: bool,
    pub connect_calls: u32,
    pub status_queries: u32,
}

#[allow(dead_code)]
impl MockLink {
    pub fn online() -> Self {
        Self {
            reachable: true,
            up: true,
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }
}

impl LinkPort for MockLink {
    fn start_connect(&mut self) -> Result<(), CommsError> {
        self.connect_calls += 1;
        if self.reachable {
            self.up = true;
        }
        Ok(())
    }

    fn is_up(&mut self) -> bool {
        self.status_queries += 1;
        self.up
    }
}

// ── MockCollector ─────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum CollectorReply {
    Status(u16, &'static str),
    Transport(CommsError),
}

pub struct MockCollector {
    pub reply: CollectorReply,
    pub bodies: Vec<String>,
    pub clock: Option<Rc<Cell<u64>>>,
    /// Clock reading at each request.
    pub post_times: Vec<u64>,
}

#[allow(dead_code)]
impl MockCollector {
    pub fn ok() -> Self {
        Self::replying(CollectorReply::Status(
            200,
            r#"{"status":"ok","risk_level":"LOW","risk_code":0}"#,
        ))
    }

    pub fn replying(reply: CollectorReply) -> Self {
        Self {
            reply,
            bodies: Vec::new(),
            clock: None,
            post_times: Vec::new(),
        }
    }

    pub fn last_json(&self) -> Option<serde_json::Value> {
        self.bodies.last().and_then(|b| serde_json::from_str(b).ok())
    }
}

impl CollectorPort for MockCollector {
    fn post_json(&mut self, body: &[u8]) -> Result<CollectorResponse, CommsError> {
        self.bodies.push(String::from_utf8_lossy(body).into_owned());
        self.post_times.push(self.clock.as_ref().map_or(0, |c| c.get()));
        match &self.reply {
            CollectorReply::Status(status, text) => {
                let mut body = heapless::Vec::new();
                body.extend_from_slice(text.as_bytes()).unwrap();
                Ok(CollectorResponse {
                    status: *status,
                    body,
                })
            }
            CollectorReply::Transport(e) => Err(*e),
        }
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Monotonic clock that only moves when told to or when a delay runs.
/// The time lives in a shared cell so other mocks can stamp their calls.
#[derive(Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
    pub slept_ms: u64,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(now_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(now_ms)),
            slept_ms: 0,
        }
    }

    pub fn now(&self) -> u64 {
        self.now.get()
    }

    pub fn advance(&mut self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn handle(&self) -> Rc<Cell<u64>> {
        Rc::clone(&self.now)
    }

    fn sleep(&mut self, ms: u64) {
        self.advance(ms);
        self.slept_ms += ms;
    }
}

impl DelayNs for ManualClock {
    fn delay_ns(&mut self, ns: u32) {
        self.sleep(u64::from(ns).div_ceil(1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleep(u64::from(ms));
    }
}

impl TimePort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
