//! DHT22 (AM2302) single-wire temperature sensor.
//!
//! The sensor answers a host start pulse with a 40-bit frame:
//! humidity (16 bit), temperature (16 bit, sign-magnitude, tenths of °C)
//! and an 8-bit additive checksum.  Only the temperature half is used.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the open-drain data line configured by hw_init,
//! timing edges against `esp_timer_get_time`.
//! On host/test: returns the value injected through [`sim_set_temperature`];
//! NaN (the default) reads as "no data".

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMPERATURE_BITS: AtomicU32 = AtomicU32::new(0x7FC0_0000); // f32::NAN

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temperature(celsius: f32) {
    SIM_TEMPERATURE_BITS.store(celsius.to_bits(), Ordering::Relaxed);
}

/// Bytes in one DHT22 frame.
pub const FRAME_LEN: usize = 5;

/// Decode a raw frame into °C.
///
/// Byte 4 must equal the low byte of the sum of bytes 0..=3.  The
/// temperature word is sign-magnitude: bit 15 set means below zero.
pub fn decode_frame(frame: &[u8; FRAME_LEN]) -> Result<f32, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }
    if frame.iter().all(|b| *b == 0) {
        // Line stuck low reads as an all-zero frame with a valid checksum.
        return Err(SensorError::NoData);
    }

    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let celsius = f32::from(magnitude) / 10.0;
    Ok(if frame[2] & 0x80 != 0 { -celsius } else { celsius })
}

pub struct Dht22 {
    _data_gpio: i32,
}

impl Dht22 {
    pub fn new(data_gpio: i32) -> Self {
        Self { _data_gpio: data_gpio }
    }

    /// One blocking transfer (about 5 ms on hardware).
    pub fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let frame = self.read_frame()?;
        decode_frame(&frame)
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        use esp_idf_svc::sys::{esp_rom_delay_us, esp_timer_get_time};

        let pin = self._data_gpio;

        // Wait while the line sits at `level`; returns the time spent (µs).
        let wait_while = |level: bool, timeout_us: i64| -> Result<i64, SensorError> {
            // SAFETY: esp_timer_get_time is a read of the system timer.
            let start = unsafe { esp_timer_get_time() };
            loop {
                let now = unsafe { esp_timer_get_time() };
                if hw_init::gpio_read(pin) != level {
                    return Ok(now - start);
                }
                if now - start > timeout_us {
                    return Err(SensorError::Timeout);
                }
            }
        };

        // Start pulse: >= 1 ms low, then release to the pull-up.
        hw_init::gpio_write(pin, false);
        // SAFETY: busy-wait ROM helper.
        unsafe { esp_rom_delay_us(1_100) };
        hw_init::gpio_write(pin, true);

        // Response: ~20-40 µs high, 80 µs low, 80 µs high.
        wait_while(true, 100)?;
        wait_while(false, 100)?;
        wait_while(true, 100)?;

        let mut frame = [0u8; FRAME_LEN];
        for bit in 0..FRAME_LEN * 8 {
            wait_while(false, 80)?;
            // 26-28 µs high is a zero, 70 µs is a one.
            let high_us = wait_while(true, 100)?;
            if high_us > 40 {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], SensorError> {
        let celsius = f32::from_bits(SIM_TEMPERATURE_BITS.load(Ordering::Relaxed));
        if !celsius.is_finite() {
            return Err(SensorError::NoData);
        }
        Ok(encode_sim_frame(celsius))
    }
}

/// Build the frame the sensor would send for `celsius` (humidity 50.0 %).
#[cfg(not(target_os = "espidf"))]
fn encode_sim_frame(celsius: f32) -> [u8; FRAME_LEN] {
    let tenths = (celsius.abs() * 10.0).round().min(f32::from(0x7FFF_u16)) as u16;
    let [t_hi, t_lo] = tenths.to_be_bytes();
    let t_hi = if celsius < 0.0 { t_hi | 0x80 } else { t_hi };
    let [h_hi, h_lo] = 500u16.to_be_bytes();
    let checksum = h_hi.wrapping_add(h_lo).wrapping_add(t_hi).wrapping_add(t_lo);
    [h_hi, h_lo, t_hi, t_lo, checksum]
}
