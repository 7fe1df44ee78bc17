//! Actuator and display drivers, hardware initialisation, and the watchdog.

pub mod buzzer;
pub mod hw_init;
pub mod indicator;
pub mod lcd;
pub mod watchdog;
