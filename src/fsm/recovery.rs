//! Auto-recovery FSM (§4.F) — timed, multi-phase pump sequences with retry
//! and (partial) mutual exclusion against the threshold FSM.
//!
//! ```text
//!        ┌─────────────────────────── water branch ───────────────────────────┐
//!        │                                                                    │
//!  IDLE ─┴─▶ WATER_PUMP_ON(4s) ─▶ WATER_SETTLE(3s) ─▶ WATER_CHECK ─▶ IDLE      │
//!        │                                                                    │
//!        └─────────────────────────── ec branch ─────────────────────────────┐│
//!                                                                            ││
//!  IDLE ──▶ EC_PUMP_ON(700ms) ─▶ EC_WAIT(30s) ─▶ EC_CHECK ─┬─▶ IDLE           ││
//!                   ▲                                      │                 ││
//!                   └───────────── retry (< limit) ────────┘                 ││
//! ```
//!
//! Water takes priority when both signals are pending. The EC branch does
//! **not** suspend the threshold FSM — an intentionally preserved quirk of
//! the source design (see DESIGN.md) — so [`RecoveryFsm::threshold_suspended`]
//! is `true` only while the water branch is running.

use log::{info, warn};

use crate::app::ports::{ActuatorPin, Platform};
use crate::config::{RuntimeConfig, Thresholds};
use crate::fsm::threshold::{ANOMALY_EC, ANOMALY_WATER};
use crate::sensors::SensorHub;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Idle,
    WaterPumpOn,
    WaterSettle,
    WaterCheck,
    EcPumpOn,
    EcWait,
    EcCheck,
}

/// Outcome events a phase completion hands back to the caller. The caller
/// (the command handler) combines the carried value with the rest of the
/// current sensor snapshot to build the outbound `EVENT` frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryEvent {
    WaterActionSuccess { water: f32 },
    WaterPumpFail { water: f32 },
    NutriActionSuccess,
    NutriPumpFail,
}

pub struct RecoveryFsm {
    state: RecoveryState,
    pending_mask: u8,
    running_mask: u8,
    phase_entry_tick: u32,
    ec_retry_count: u8,
    threshold_suspended: bool,
}

impl RecoveryFsm {
    pub fn new() -> Self {
        Self {
            state: RecoveryState::Idle,
            pending_mask: 0,
            running_mask: 0,
            phase_entry_tick: 0,
            ec_retry_count: 0,
            threshold_suspended: false,
        }
    }

    pub fn active(&self) -> bool {
        self.state != RecoveryState::Idle
    }

    pub fn running_mask(&self) -> u8 {
        self.running_mask
    }

    pub fn pending_mask(&self) -> u8 {
        self.pending_mask
    }

    /// Whether the threshold FSM should currently skip its own evaluation.
    /// Only the water branch suspends it; see the module doc.
    pub fn threshold_suspended(&self) -> bool {
        self.threshold_suspended
    }

    /// Request recovery for the signals set in `mask`. Bits already pending
    /// or already running are ignored. Attempts an immediate start if idle.
    pub fn request<P: Platform>(
        &mut self,
        mask: u8,
        platform: &mut P,
        hub: &SensorHub,
        thresholds: &Thresholds,
        now_ms: u32,
    ) {
        let new_bits = mask & !self.pending_mask & !self.running_mask;
        self.pending_mask |= new_bits;
        if self.state == RecoveryState::Idle {
            self.try_start(platform, &hub.snapshot(), thresholds, now_ms);
        }
    }

    /// Force an immediate, unconditional stop (the `CLOSE` command).
    pub fn force_stop<P: Platform>(&mut self, platform: &mut P) {
        platform.set(ActuatorPin::WaterPump, false);
        platform.set(ActuatorPin::NutriPump, false);
        self.pending_mask = 0;
        self.running_mask = 0;
        self.ec_retry_count = 0;
        self.state = RecoveryState::Idle;
        self.threshold_suspended = false;
        info!("auto-recovery: force-stopped");
    }

    /// Advance at most one phase, based on `now_ms`. Returns any outcome
    /// events produced this call (at most one: `WATER_CHECK`/`EC_CHECK`
    /// complete in a single invocation once their dwell has elapsed).
    pub fn tick<P: Platform>(
        &mut self,
        now_ms: u32,
        platform: &mut P,
        hub: &mut SensorHub,
        config: &RuntimeConfig,
        thresholds: &Thresholds,
    ) -> heapless::Vec<RecoveryEvent, 1> {
        let mut events = heapless::Vec::new();
        let elapsed = now_ms.wrapping_sub(self.phase_entry_tick);

        match self.state {
            RecoveryState::Idle => {}

            RecoveryState::WaterPumpOn => {
                if elapsed >= config.water_pump_on_ms {
                    platform.set(ActuatorPin::WaterPump, false);
                    self.enter(RecoveryState::WaterSettle, now_ms);
                }
            }

            RecoveryState::WaterSettle => {
                if elapsed >= config.water_settle_ms {
                    self.enter(RecoveryState::WaterCheck, now_ms);
                }
            }

            RecoveryState::WaterCheck => {
                let mut sum = 0.0f32;
                for _ in 0..config.water_check_samples {
                    sum += hub.sample_all(platform, config).water_level;
                    platform.delay_ms(config.water_check_sample_spacing_ms);
                }
                let avg = sum / config.water_check_samples as f32;
                if avg >= thresholds.water_min {
                    info!("auto-recovery: WATER_CHECK avg={avg:.1} -> success");
                    let _ = events.push(RecoveryEvent::WaterActionSuccess { water: avg });
                } else {
                    warn!("auto-recovery: WATER_CHECK avg={avg:.1} -> pump fail");
                    let _ = events.push(RecoveryEvent::WaterPumpFail { water: avg });
                }
                self.finish(platform, now_ms);
            }

            RecoveryState::EcPumpOn => {
                if elapsed >= config.ec_pump_on_ms {
                    platform.set(ActuatorPin::NutriPump, false);
                    self.enter(RecoveryState::EcWait, now_ms);
                }
            }

            RecoveryState::EcWait => {
                if elapsed >= config.ec_wait_ms {
                    self.enter(RecoveryState::EcCheck, now_ms);
                }
            }

            RecoveryState::EcCheck => {
                let ec = hub.sample_all(platform, config).ec;
                if ec >= thresholds.ec_min {
                    info!("auto-recovery: EC_CHECK ec={ec:.1} -> success");
                    let _ = events.push(RecoveryEvent::NutriActionSuccess);
                    self.finish(platform, now_ms);
                } else {
                    self.ec_retry_count += 1;
                    if self.ec_retry_count >= config.ec_retry_limit {
                        warn!("auto-recovery: EC_CHECK ec={ec:.1} -> retries exhausted");
                        let _ = events.push(RecoveryEvent::NutriPumpFail);
                        self.finish(platform, now_ms);
                    } else {
                        info!(
                            "auto-recovery: EC_CHECK ec={ec:.1} -> retry {}/{}",
                            self.ec_retry_count, config.ec_retry_limit
                        );
                        platform.set(ActuatorPin::NutriPump, true);
                        self.enter(RecoveryState::EcPumpOn, now_ms);
                    }
                }
            }
        }

        if self.state == RecoveryState::Idle && self.pending_mask != 0 {
            self.try_start(platform, &hub.snapshot(), thresholds, now_ms);
        }

        events
    }

    fn try_start<P: Platform>(
        &mut self,
        platform: &mut P,
        snapshot: &crate::sensors::SensorSnapshot,
        thresholds: &Thresholds,
        now_ms: u32,
    ) {
        if self.pending_mask & ANOMALY_WATER != 0 && snapshot.water_level < thresholds.water_min {
            self.pending_mask &= !ANOMALY_WATER;
            self.running_mask = ANOMALY_WATER;
            self.threshold_suspended = true;
            platform.set(ActuatorPin::WaterPump, true);
            self.enter(RecoveryState::WaterPumpOn, now_ms);
        } else if self.pending_mask & ANOMALY_EC != 0 && snapshot.ec < thresholds.ec_min {
            self.pending_mask &= !ANOMALY_EC;
            self.running_mask = ANOMALY_EC;
            self.ec_retry_count = 0;
            platform.set(ActuatorPin::NutriPump, true);
            self.enter(RecoveryState::EcPumpOn, now_ms);
        } else {
            // Stale request: condition already cleared. Drop it silently.
            // Clears the whole mask, not just the stale bit.
            self.pending_mask = 0;
        }
    }

    fn finish<P: Platform>(&mut self, platform: &mut P, now_ms: u32) {
        platform.set(ActuatorPin::WaterPump, false);
        platform.set(ActuatorPin::NutriPump, false);
        self.state = RecoveryState::Idle;
        self.running_mask = 0;
        self.threshold_suspended = false;
        self.phase_entry_tick = now_ms;
        info!("auto-recovery: -> IDLE");
    }

    fn enter(&mut self, state: RecoveryState, now_ms: u32) {
        info!("auto-recovery: {:?} -> {:?}", self.state, state);
        self.state = state;
        self.phase_entry_tick = now_ms;
    }
}

impl Default for RecoveryFsm {
    fn default() -> Self {
        Self::new()
    }
}
