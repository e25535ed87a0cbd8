//! Runtime configuration.
//!
//! Every magic number named in the component design lives here as a
//! documented field instead of a literal scattered across the FSMs. Nothing
//! in this module is persisted — there is no NVS/flash layer in this system,
//! only an in-memory `RuntimeConfig` built once at boot (see
//! [`RuntimeConfig::default`]). Kept `serde`-derivable purely so tests and
//! diagnostics can serialise a config snapshot for inspection.

use serde::{Deserialize, Serialize};

/// The four threshold values that gate the threshold and auto-recovery FSMs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub water_min: f32,
    pub water_max: f32,
    pub ec_min: f32,
    pub ec_max: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            water_min: 10.0,
            water_max: 60.0,
            ec_min: 700.0,
            ec_max: 2000.0,
        }
    }
}

/// Full runtime configuration for the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub thresholds: Thresholds,

    // --- Auto-recovery timing (§4.F) ---
    /// Dwell in `WATER_PUMP_ON` before the pump is shut off (ms).
    pub water_pump_on_ms: u32,
    /// Dwell in `WATER_SETTLE` before re-sampling (ms).
    pub water_settle_ms: u32,
    /// Number of rapid samples averaged in `WATER_CHECK`.
    pub water_check_samples: u8,
    /// Spacing between `WATER_CHECK` samples (ms).
    pub water_check_sample_spacing_ms: u32,
    /// Dwell in `EC_PUMP_ON` before the pump is shut off (ms).
    pub ec_pump_on_ms: u32,
    /// Dwell in `EC_WAIT` before re-sampling (ms).
    pub ec_wait_ms: u32,
    /// Maximum EC pump pulses before giving up.
    pub ec_retry_limit: u8,

    // --- Sensor pipeline timing (§4.D) ---
    /// Delay after starting an ADS1115 single-shot conversion (ms).
    pub adc_conversion_delay_ms: u32,
    /// Consecutive I²C faults before the bus is reinitialised.
    pub i2c_fault_threshold: u8,

    // --- Main loop cadence (§5) ---
    /// Period between periodic sensor-sample-and-threshold-check passes (ms).
    pub control_loop_period_ms: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),

            water_pump_on_ms: 4_000,
            water_settle_ms: 3_000,
            water_check_samples: 5,
            water_check_sample_spacing_ms: 30,

            ec_pump_on_ms: 700,
            ec_wait_ms: 30_000,
            ec_retry_limit: 5,

            adc_conversion_delay_ms: 10,
            i2c_fault_threshold: 3,

            control_loop_period_ms: 1_000,
        }
    }
}
