//! 16×2 HD44780 character LCD behind a PCF8574 I2C backpack.
//!
//! The expander drives the panel in 4-bit mode.  Each expander byte is
//! `D7 D6 D5 D4 | BL EN RW RS`; a nibble is latched on the falling edge
//! of EN.  The driver is generic over `embedded_hal` I2C and delay so it
//! runs against the ESP-IDF I2C driver on target and a recording bus in
//! tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::DisplayPort;
use crate::error::DisplayError;

/// Visible columns per row.
pub const LCD_COLS: usize = 16;

const BACKLIGHT: u8 = 0x08;
const ENABLE: u8 = 0x04;
const RS_DATA: u8 = 0x01;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    ready: bool,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    /// The panel is not touched until [`init`](Self::init) is called.
    pub fn new(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            ready: false,
        }
    }

    /// Run the HD44780 4-bit wake-up sequence.
    ///
    /// A NACK here means no backpack on the bus; the panel stays
    /// unavailable and every later write returns `NotPresent`.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);
        match self.wake() {
            Ok(()) => {
                self.ready = true;
                info!("LCD: ready at 0x{:02X}", self.address);
                Ok(())
            }
            Err(DisplayError::BusError) => {
                warn!("LCD: no response at 0x{:02X}, display disabled", self.address);
                Err(DisplayError::NotPresent)
            }
            Err(e) => Err(e),
        }
    }

    fn wake(&mut self) -> Result<(), DisplayError> {
        // 0x33 / 0x32 resync from any interface state into 4-bit mode.
        self.command(0x33)?;
        self.delay.delay_ms(5);
        self.command(0x32)?;
        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_ENTRY_INCREMENT)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Overwrite one row, space-padded to the full width.
    pub fn write_row(&mut self, row: usize, text: &str) -> Result<(), DisplayError> {
        if !self.ready {
            return Err(DisplayError::NotPresent);
        }
        let offset = ROW_OFFSETS.get(row).copied().unwrap_or(ROW_OFFSETS[0]);
        self.command(CMD_SET_DDRAM | offset)?;

        let mut chars = text.chars();
        for _ in 0..LCD_COLS {
            let c = chars.next().unwrap_or(' ');
            // The ROM's upper half is not Latin-1; anything non-ASCII shows as '?'.
            let byte = if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' };
            self.data(byte)?;
        }
        Ok(())
    }

    /// Release the bus and delay provider.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, RS_DATA)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble((byte & 0xF0) | mode)?;
        self.write_nibble(((byte << 4) & 0xF0) | mode)
    }

    fn write_nibble(&mut self, bits: u8) -> Result<(), DisplayError> {
        let bits = bits | BACKLIGHT;
        self.i2c
            .write(self.address, &[bits | ENABLE, bits])
            .map_err(|_| DisplayError::BusError)?;
        // Commands need 37 µs to execute; clear/home are covered by init.
        self.delay.delay_us(50);
        Ok(())
    }
}

impl<I: I2c, D: DelayNs> DisplayPort for Lcd1602<I, D> {
    fn show(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        self.write_row(0, line1)?;
        self.write_row(1, line2)
    }
}
