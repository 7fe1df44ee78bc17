//! Single-colour indicator LED on a push-pull GPIO (active HIGH).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the pin configured by hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct Indicator {
    gpio: i32,
    lit: bool,
}

impl Indicator {
    /// Wrap an output pin.  The pin starts dark.
    pub fn new(gpio: i32) -> Self {
        Self { gpio, lit: false }
    }

    /// Drive the pin.  Writes every call so a glitched output recovers on
    /// the next cycle.
    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.lit = on;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
