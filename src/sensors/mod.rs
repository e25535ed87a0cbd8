//! Sensor acquisition and signal-conditioning pipeline (§4.D).
//!
//! [`SensorHub`] is the single entry point (`sample_all`) invoked either by
//! the periodic control loop or by the auto-recovery FSM's own averaging
//! passes. It owns the per-channel filter state and the I²C fault counter;
//! individual driver failures are absorbed here and never propagate past
//! this module.

pub mod ads1115;
pub mod aht20;
pub mod filters;

use log::warn;

use crate::app::ports::{ClockPort, I2cPort};
use crate::config::RuntimeConfig;
use filters::{EcEmaFilter, WaterRingFilter};

const WATER_CHANNEL: u8 = 0;
const EC_CHANNEL: u8 = 1;
const SUPPLY_VOLTS: f32 = 3.3;

/// Most recent fully converted, filtered set of physical readings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorSnapshot {
    pub temperature: f32,
    pub humidity: f32,
    pub water_level: f32,
    pub ec: f32,
}

/// Owns the filter state, cached raw ADC values, and the I²C fault counter.
pub struct SensorHub {
    snapshot: SensorSnapshot,
    water_filter: WaterRingFilter,
    ec_filter: EcEmaFilter,
    last_water_raw: i16,
    last_ec_raw: i16,
    i2c_fail_count: u8,
    warmup_count: u8,
}

impl SensorHub {
    pub fn new() -> Self {
        Self {
            snapshot: SensorSnapshot::default(),
            water_filter: WaterRingFilter::default(),
            ec_filter: EcEmaFilter::default(),
            last_water_raw: 0,
            last_ec_raw: 0,
            i2c_fail_count: 0,
            warmup_count: 0,
        }
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        self.snapshot
    }

    pub fn warmup_count(&self) -> u8 {
        self.warmup_count
    }

    /// Reset filter state and fault counters, e.g. on `reset_fsm()`.
    pub fn reset_filters(&mut self) {
        self.water_filter.reset();
        self.ec_filter.reset();
        self.warmup_count = 0;
    }

    /// Sample both peripherals, run the filters, and return the updated
    /// snapshot. Any single driver failure retains the previous reading
    /// for that signal rather than propagating an error.
    pub fn sample_all<P: I2cPort + ClockPort>(
        &mut self,
        platform: &mut P,
        config: &RuntimeConfig,
    ) -> SensorSnapshot {
        match aht20::read(platform) {
            Ok(reading) => {
                self.snapshot.temperature = reading.temperature;
                self.snapshot.humidity = reading.humidity;
            }
            Err(e) => warn!("sensors: AHT20 read failed ({e}), retaining previous values"),
        }

        let water_raw = ads1115::read_channel(platform, WATER_CHANNEL, config.adc_conversion_delay_ms);
        let ec_raw = ads1115::read_channel(platform, EC_CHANNEL, config.adc_conversion_delay_ms);

        if let (Ok(w), Ok(e)) = (water_raw, ec_raw) {
            self.last_water_raw = w;
            self.last_ec_raw = e;
            self.i2c_fail_count = 0;
        } else {
            self.i2c_fail_count = self.i2c_fail_count.saturating_add(1);
            warn!(
                "sensors: ADC read failed, retaining previous raws (fail_count={})",
                self.i2c_fail_count
            );
            if self.i2c_fail_count >= config.i2c_fault_threshold {
                warn!("sensors: I2C fault threshold reached, reinitializing bus");
                if let Err(e) = platform.reinit() {
                    warn!("sensors: I2C reinit failed ({e})");
                }
                self.i2c_fail_count = 0;
            }
        }

        let water_volts = ads1115::raw_to_volts(self.last_water_raw);
        let ec_volts = ads1115::raw_to_volts(self.last_ec_raw);

        let water_percent = (water_volts / SUPPLY_VOLTS) * 100.0;
        let ec_ppm = ec_volts * 1000.0;

        self.snapshot.water_level = self.water_filter.push(water_percent);
        self.snapshot.ec = self.ec_filter.push(ec_ppm);

        self.warmup_count = self.warmup_count.saturating_add(1);
        self.snapshot
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockPlatform;

    #[test]
    fn three_consecutive_i2c_faults_trigger_one_reinit() {
        let mut hub = SensorHub::new();
        let mut platform = MockPlatform::new();
        let config = RuntimeConfig::default();
        platform.force_i2c_fail = true;

        for _ in 0..config.i2c_fault_threshold {
            hub.sample_all(&mut platform, &config);
        }
        assert_eq!(platform.reinit_count, 1);

        platform.force_i2c_fail = false;
        platform.set_water_percent(42.0);
        hub.reset_filters();
        let snapshot = hub.sample_all(&mut platform, &config);
        assert!((snapshot.water_level - 42.0).abs() < 0.5);
    }
}
