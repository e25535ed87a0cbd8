//! Application core — pure domain logic, zero I/O.
//!
//! Owns the sensor pipeline, both FSMs, and the readiness/command-dispatch
//! state (§2, §4.G). All interaction with hardware happens through the
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod ports;
pub mod service;
