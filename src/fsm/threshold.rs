//! Threshold FSM (§4.E) — per-signal NORMAL/LOW tracking and the active
//! anomaly mask auto-recovery consumes.
//!
//! Only `NORMAL`/`LOW` transitions are exercised in this revision; `HIGH`
//! is reserved in the wire protocol (see [`crate::protocol::types::EVENT_WATER_HIGH`])
//! but this FSM never asserts it.

use log::info;

use crate::config::Thresholds;
use crate::sensors::SensorSnapshot;

pub const ANOMALY_WATER: u8 = 0x01;
pub const ANOMALY_EC: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Normal,
    Low,
    High,
}

/// Events E asks the caller to turn into outbound `EVENT` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdEvent {
    WaterLow,
    EcLow,
    WaterRecoveryDone,
    NutriRecoveryDone,
}

pub struct ThresholdFsm {
    water_state: SignalState,
    ec_state: SignalState,
    anomaly_mask: u8,
    force_initial_check: bool,
}

impl ThresholdFsm {
    pub fn new() -> Self {
        Self {
            water_state: SignalState::Normal,
            ec_state: SignalState::Normal,
            anomaly_mask: 0,
            force_initial_check: true,
        }
    }

    pub fn anomaly_mask(&self) -> u8 {
        self.anomaly_mask
    }

    /// Arm the one-shot initial-check flag (§4.G: on every `REQ_SENSOR`).
    pub fn arm_initial_check(&mut self) {
        self.force_initial_check = true;
    }

    /// Return both signals to normal, clear the mask, and re-arm the
    /// initial-check flag. Does not touch filter state — callers reset the
    /// sensor hub's filters separately.
    pub fn reset(&mut self) {
        self.water_state = SignalState::Normal;
        self.ec_state = SignalState::Normal;
        self.anomaly_mask = 0;
        self.force_initial_check = true;
    }

    /// Evaluate the latest snapshot against `thresholds`. No-ops entirely
    /// while `recovery_active` (§4.F suspends E for water recovery; EC
    /// recovery does not suspend E, so this flag reflects only the water
    /// branch — see the recovery FSM for how it's threaded through).
    pub fn evaluate(
        &mut self,
        snapshot: &SensorSnapshot,
        thresholds: &Thresholds,
        recovery_active: bool,
    ) -> heapless::Vec<ThresholdEvent, 2> {
        let mut events = heapless::Vec::new();
        if recovery_active {
            return events;
        }

        if self.force_initial_check {
            self.force_initial_check = false;
            if snapshot.water_level < thresholds.water_min {
                self.water_state = SignalState::Low;
                self.anomaly_mask |= ANOMALY_WATER;
                info!("threshold: initial check, water below minimum -> LOW");
                let _ = events.push(ThresholdEvent::WaterLow);
            }
            if snapshot.ec < thresholds.ec_min {
                self.ec_state = SignalState::Low;
                self.anomaly_mask |= ANOMALY_EC;
                info!("threshold: initial check, ec below minimum -> LOW");
                let _ = events.push(ThresholdEvent::EcLow);
            }
            return events;
        }

        if let Some(event) = self.evaluate_water(snapshot.water_level, thresholds) {
            let _ = events.push(event);
        }
        if let Some(event) = self.evaluate_ec(snapshot.ec, thresholds) {
            let _ = events.push(event);
        }
        events
    }

    fn evaluate_water(&mut self, level: f32, thresholds: &Thresholds) -> Option<ThresholdEvent> {
        match self.water_state {
            SignalState::Normal if level < thresholds.water_min => {
                self.water_state = SignalState::Low;
                self.anomaly_mask |= ANOMALY_WATER;
                info!("threshold: water {level:.1} < {:.1} -> LOW", thresholds.water_min);
                Some(ThresholdEvent::WaterLow)
            }
            SignalState::Low if level >= thresholds.water_min && level <= thresholds.water_max => {
                self.water_state = SignalState::Normal;
                self.anomaly_mask &= !ANOMALY_WATER;
                info!("threshold: water {level:.1} back in band -> NORMAL");
                Some(ThresholdEvent::WaterRecoveryDone)
            }
            _ => None,
        }
    }

    fn evaluate_ec(&mut self, ec: f32, thresholds: &Thresholds) -> Option<ThresholdEvent> {
        match self.ec_state {
            SignalState::Normal if ec < thresholds.ec_min => {
                self.ec_state = SignalState::Low;
                self.anomaly_mask |= ANOMALY_EC;
                info!("threshold: ec {ec:.1} < {:.1} -> LOW", thresholds.ec_min);
                Some(ThresholdEvent::EcLow)
            }
            SignalState::Low if ec >= thresholds.ec_min && ec <= thresholds.ec_max => {
                self.ec_state = SignalState::Normal;
                self.anomaly_mask &= !ANOMALY_EC;
                info!("threshold: ec {ec:.1} back in band -> NORMAL");
                Some(ThresholdEvent::NutriRecoveryDone)
            }
            _ => None,
        }
    }
}

impl Default for ThresholdFsm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    fn snapshot(water: f32, ec: f32) -> SensorSnapshot {
        SensorSnapshot { temperature: 25.0, humidity: 40.0, water_level: water, ec }
    }

    #[test]
    fn initial_check_transitions_directly_to_low() {
        let mut fsm = ThresholdFsm::new();
        let events = fsm.evaluate(&snapshot(5.0, 300.0), &thresholds(), false);
        assert_eq!(fsm.anomaly_mask(), ANOMALY_WATER | ANOMALY_EC);
        assert!(events.contains(&ThresholdEvent::WaterLow));
        assert!(events.contains(&ThresholdEvent::EcLow));
    }

    #[test]
    fn normal_mode_detects_low_then_recovery() {
        let mut fsm = ThresholdFsm::new();
        fsm.evaluate(&snapshot(50.0, 1000.0), &thresholds(), false); // arms + passes initial check
        assert_eq!(fsm.anomaly_mask(), 0);

        let events = fsm.evaluate(&snapshot(5.0, 1000.0), &thresholds(), false);
        assert_eq!(events.as_slice(), &[ThresholdEvent::WaterLow]);
        assert_eq!(fsm.anomaly_mask(), ANOMALY_WATER);

        let events = fsm.evaluate(&snapshot(50.0, 1000.0), &thresholds(), false);
        assert_eq!(events.as_slice(), &[ThresholdEvent::WaterRecoveryDone]);
        assert_eq!(fsm.anomaly_mask(), 0);
    }

    #[test]
    fn suspended_during_recovery_is_a_no_op() {
        let mut fsm = ThresholdFsm::new();
        fsm.evaluate(&snapshot(50.0, 1000.0), &thresholds(), false);
        let events = fsm.evaluate(&snapshot(1.0, 1.0), &thresholds(), true);
        assert!(events.is_empty());
        assert_eq!(fsm.anomaly_mask(), 0);
    }

    #[test]
    fn reset_rearms_initial_check_and_clears_mask() {
        let mut fsm = ThresholdFsm::new();
        fsm.evaluate(&snapshot(5.0, 5.0), &thresholds(), false);
        assert_ne!(fsm.anomaly_mask(), 0);
        fsm.reset();
        assert_eq!(fsm.anomaly_mask(), 0);
        let events = fsm.evaluate(&snapshot(5.0, 5.0), &thresholds(), false);
        assert!(!events.is_empty());
    }
}
