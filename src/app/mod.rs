//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the controller loop for the FireSense node:
//! acquisition, classification, alarm and display, link supervision and
//! telemetry.  All interaction with hardware and the network happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
