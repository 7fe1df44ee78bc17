//! MQ-series analog gas sensors (MQ-2 smoke, MQ-135 air quality).
//!
//! Both modules expose a load-resistor voltage that rises with
//! concentration.  The driver only returns the raw 12-bit ADC code;
//! [`scale_to_ppm`](super::scale_to_ppm) maps it onto ppm.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static `AtomicU16`s for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_SMOKE_ADC: AtomicU16 = AtomicU16::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_GAS_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_smoke_adc(raw: u16) {
    SIM_SMOKE_ADC.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: u16) {
    SIM_GAS_ADC.store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasKind {
    /// MQ-2 on ADC1_CH6.
    Smoke,
    /// MQ-135 on ADC1_CH7.
    Combustible,
}

impl GasKind {
    #[cfg(target_os = "espidf")]
    const fn adc_channel(self) -> u32 {
        match self {
            Self::Smoke => hw_init::ADC1_CH_SMOKE,
            Self::Combustible => hw_init::ADC1_CH_GAS,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn sim_cell(self) -> &'static AtomicU16 {
        match self {
            Self::Smoke => &SIM_SMOKE_ADC,
            Self::Combustible => &SIM_GAS_ADC,
        }
    }
}

pub struct AnalogGasSensor {
    kind: GasKind,
    _adc_gpio: i32,
}

impl AnalogGasSensor {
    pub fn new(kind: GasKind, adc_gpio: i32) -> Self {
        Self {
            kind,
            _adc_gpio: adc_gpio,
        }
    }

    pub fn kind(&self) -> GasKind {
        self.kind
    }

    #[cfg(target_os = "espidf")]
    pub fn read_raw(&mut self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.kind.adc_channel()).ok_or(SensorError::AdcReadFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_raw(&mut self) -> Result<u16, SensorError> {
        Ok(self.kind.sim_cell().load(Ordering::Relaxed))
    }
}
