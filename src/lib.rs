//! FireSense firmware library.
//!
//! Exposes the control loop and its components for integration testing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; on any other target the drivers fall back to
//! simulation stubs.

#![deny(unused_must_use)]

pub mod alarm;
pub mod app;
pub mod config;
pub mod connectivity;
pub mod context;
pub mod error;
pub mod risk;
pub mod scheduler;
pub mod status;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
pub mod pins;
pub mod sensors;
