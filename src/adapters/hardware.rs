//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the sensor and actuator drivers plus the display, exposing them
//! through [`SensorPort`], [`ActuatorPort`] and [`DisplayPort`].  On
//! non-espidf targets the underlying drivers use cfg-gated simulation
//! stubs, so this adapter also runs in host tests.

use crate::app::ports::{ActuatorPort, DisplayPort, SensorPort};
use crate::drivers::buzzer::Buzzer;
use crate::drivers::indicator::Indicator;
use crate::error::{DisplayError, SensorError};
use crate::pins;
use crate::sensors::gas::{AnalogGasSensor, GasKind};
use crate::sensors::temperature::Dht22;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D> {
    dht: Dht22,
    smoke: AnalogGasSensor,
    gas: AnalogGasSensor,
    safe_led: Indicator,
    danger_led: Indicator,
    buzzer: Buzzer,
    display: D,
}

impl<D: DisplayPort> HardwareAdapter<D> {
    /// Wire every driver to its board pin.
    pub fn new(display: D) -> Self {
        Self {
            dht: Dht22::new(pins::DHT_DATA_GPIO),
            smoke: AnalogGasSensor::new(GasKind::Smoke, pins::SMOKE_ADC_GPIO),
            gas: AnalogGasSensor::new(GasKind::Combustible, pins::GAS_ADC_GPIO),
            safe_led: Indicator::new(pins::SAFE_LED_GPIO),
            danger_led: Indicator::new(pins::DANGER_LED_GPIO),
            buzzer: Buzzer::new(),
            display,
        }
    }

    pub fn buzzer(&self) -> &Buzzer {
        &self.buzzer
    }

    pub fn indicators(&self) -> (bool, bool) {
        (self.safe_led.is_lit(), self.danger_led.is_lit())
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D> SensorPort for HardwareAdapter<D> {
    fn read_temperature_c(&mut self) -> Result<f32, SensorError> {
        self.dht.read_celsius()
    }

    fn read_smoke_raw(&mut self) -> Result<u16, SensorError> {
        self.smoke.read_raw()
    }

    fn read_gas_raw(&mut self) -> Result<u16, SensorError> {
        self.gas.read_raw()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D> ActuatorPort for HardwareAdapter<D> {
    fn set_safe_indicator(&mut self, on: bool) {
        self.safe_led.set(on);
    }

    fn set_danger_indicator(&mut self, on: bool) {
        self.danger_led.set(on);
    }

    fn tone_on(&mut self, frequency_hz: u32) {
        self.buzzer.tone(frequency_hz);
    }

    fn tone_off(&mut self) {
        self.buzzer.silence();
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<D: DisplayPort> DisplayPort for HardwareAdapter<D> {
    fn show(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        self.display.show(line1, line2)
    }
}
