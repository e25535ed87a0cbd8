//! Application service — the hexagonal core (§2, §4.G, §5).
//!
//! [`Application`] owns the sensor pipeline (D), both FSMs (E, F), the
//! frame parser/sender (B, C), and the readiness gate (G). It is generic
//! over the four port traits via [`Platform`], so the whole stack runs
//! against a mock adapter under `cargo test` with no hardware attached.
//!
//! ```text
//!  UartPort ──▶ FrameParser ──▶ Application::dispatch ──▶ GpioPort / FSMs
//!                                      │
//!                                      ▼
//!                              FrameSender ──▶ UartPort
//! ```

use log::info;

use crate::app::commands::HostCommand;
use crate::app::ports::{ActuatorPin, Platform, UartPort};
use crate::config::RuntimeConfig;
use crate::fsm::recovery::{RecoveryEvent, RecoveryFsm};
use crate::fsm::threshold::{ThresholdEvent, ThresholdFsm};
use crate::protocol::codec::FrameSender;
use crate::protocol::parser::FrameParser;
use crate::protocol::types::{self, SensorPayload};
use crate::sensors::SensorHub;

pub struct Application {
    config: RuntimeConfig,
    sensors: SensorHub,
    threshold: ThresholdFsm,
    recovery: RecoveryFsm,
    parser: FrameParser,
    sender: FrameSender,
    ready: bool,
    last_sample_tick: u32,
    sampled_once: bool,
}

impl Application {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            sensors: SensorHub::new(),
            threshold: ThresholdFsm::new(),
            recovery: RecoveryFsm::new(),
            parser: FrameParser::new(),
            sender: FrameSender::new(),
            ready: false,
            last_sample_tick: 0,
            sampled_once: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn sensor_snapshot(&self) -> crate::sensors::SensorSnapshot {
        self.sensors.snapshot()
    }

    /// Run one full superloop iteration (§5): drain the UART RX queue,
    /// advance the recovery FSM by one phase, and — at the configured
    /// cadence — sample the sensors and evaluate the threshold FSM.
    pub fn run_iteration<P: Platform>(&mut self, platform: &mut P) {
        self.poll_uart(platform);
        self.tick_recovery(platform);
        self.tick_periodic(platform);
    }

    /// Drain every byte currently available from the UART and dispatch any
    /// frames the parser assembles.
    pub fn poll_uart<P: Platform>(&mut self, platform: &mut P) {
        while let Some(byte) = platform.try_read_byte() {
            if let Some(frame) = self.parser.feed(byte) {
                self.dispatch(&frame, platform);
            }
        }
    }

    /// Advance the auto-recovery FSM by at most one phase and emit any
    /// resulting outcome events.
    pub fn tick_recovery<P: Platform>(&mut self, platform: &mut P) {
        let now = platform.now_ms();
        let events = self.recovery.tick(
            now,
            platform,
            &mut self.sensors,
            &self.config,
            &self.config.thresholds,
        );
        for event in events {
            self.emit_recovery_event(event, platform);
        }
    }

    /// Sample the sensors and evaluate the threshold FSM, but only once the
    /// configured control loop period has elapsed since the last pass.
    pub fn tick_periodic<P: Platform>(&mut self, platform: &mut P) {
        let now = platform.now_ms();
        if self.sampled_once
            && now.wrapping_sub(self.last_sample_tick) < self.config.control_loop_period_ms
        {
            return;
        }
        self.last_sample_tick = now;
        self.sampled_once = true;

        let snapshot = self.sensors.sample_all(platform, &self.config);
        let suspended = self.recovery.threshold_suspended();
        let events = self
            .threshold
            .evaluate(&snapshot, &self.config.thresholds, suspended);
        for event in events {
            self.emit_threshold_event(event, platform);
        }
    }

    fn dispatch<P: Platform>(&mut self, frame: &types::Frame, platform: &mut P) {
        let Some(cmd) = HostCommand::from_frame(frame) else {
            return;
        };
        if cmd.is_gated() && !self.ready {
            return;
        }

        match cmd {
            HostCommand::Ready => {
                self.ready = true;
                info!("command: READY -> gate open");
            }
            HostCommand::Ping => {
                let _ = self.sender.send_pong(|buf| UartPort::write(platform, buf));
            }
            HostCommand::ReqSensor => {
                self.threshold.arm_initial_check();
                let snap = self.sensors.snapshot();
                let payload = SensorPayload::from_readings(
                    snap.temperature,
                    snap.humidity,
                    snap.ec,
                    snap.water_level,
                );
                let _ = self.sender.send_sensor_data(payload, |buf| UartPort::write(platform, buf));
            }
            HostCommand::LedOn => platform.set(ActuatorPin::Led, true),
            HostCommand::LedOff => platform.set(ActuatorPin::Led, false),
            HostCommand::PumpWater => platform.set(ActuatorPin::WaterPump, true),
            HostCommand::PumpWaterStop => platform.set(ActuatorPin::WaterPump, false),
            HostCommand::PumpNutri => platform.set(ActuatorPin::NutriPump, true),
            HostCommand::PumpNutriStop => platform.set(ActuatorPin::NutriPump, false),
            HostCommand::AutoRecovery => {
                let now = platform.now_ms();
                let mask = self.threshold.anomaly_mask();
                self.recovery.request(
                    mask,
                    platform,
                    &self.sensors,
                    &self.config.thresholds,
                    now,
                );
            }
            HostCommand::Close => {
                platform.set(ActuatorPin::WaterPump, false);
                platform.set(ActuatorPin::NutriPump, false);
                platform.set(ActuatorPin::Led, false);
                self.recovery.force_stop(platform);
                self.threshold.reset();
                self.sensors.reset_filters();
                self.ready = false;
                info!("command: CLOSE -> shutdown complete");
            }
        }
    }

    fn emit_threshold_event<P: Platform>(&mut self, event: ThresholdEvent, platform: &mut P) {
        let snap = self.sensors.snapshot();
        let payload =
            SensorPayload::from_readings(snap.temperature, snap.humidity, snap.ec, snap.water_level);
        let subtype = match event {
            ThresholdEvent::WaterLow => types::EVENT_WATER_LOW,
            ThresholdEvent::EcLow => types::EVENT_EC_LOW,
            ThresholdEvent::WaterRecoveryDone => types::EVENT_WATER_RECOVERY_DONE,
            ThresholdEvent::NutriRecoveryDone => types::EVENT_NUTRI_RECOVERY_DONE,
        };
        let _ = self
            .sender
            .send_event_sensor(subtype, payload, |buf| UartPort::write(platform, buf));
    }

    fn emit_recovery_event<P: Platform>(&mut self, event: RecoveryEvent, platform: &mut P) {
        let snap = self.sensors.snapshot();
        let (subtype, water) = match event {
            RecoveryEvent::WaterActionSuccess { water } => {
                (types::EVENT_WATER_ACTION_SUCCESS, water)
            }
            RecoveryEvent::WaterPumpFail { water } => (types::EVENT_WATER_PUMP_FAIL, water),
            RecoveryEvent::NutriActionSuccess => {
                (types::EVENT_NUTRI_ACTION_SUCCESS, snap.water_level)
            }
            RecoveryEvent::NutriPumpFail => (types::EVENT_NUTRI_PUMP_FAIL, snap.water_level),
        };
        let payload = SensorPayload::from_readings(snap.temperature, snap.humidity, snap.ec, water);
        let _ = self
            .sender
            .send_event_sensor(subtype, payload, |buf| UartPort::write(platform, buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockPlatform;

    fn ready_app() -> (Application, MockPlatform) {
        let mut app = Application::new(RuntimeConfig::default());
        let mut platform = MockPlatform::new();
        platform.push_rx(&[0xAA, 0x01, 0x01, 0x00, 0x00, 0x55]); // READY
        app.poll_uart(&mut platform);
        assert!(app.is_ready());
        platform.drain_tx();
        (app, platform)
    }

    #[test]
    fn ping_elicits_pong() {
        let (mut app, mut platform) = ready_app();
        platform.push_rx(&[0xAA, 0x01, 0x0C, 0x00, 0x0D, 0x55]); // PING
        app.poll_uart(&mut platform);
        let tx = platform.drain_tx();
        assert_eq!(tx, vec![0xAA, 0x01, 0x0D, 0x00, 0x0C, 0x55]);
    }

    #[test]
    fn commands_before_ready_are_dropped() {
        let mut app = Application::new(RuntimeConfig::default());
        let mut platform = MockPlatform::new();
        platform.push_rx(&[0xAA, 0x01, 0x0C, 0x00, 0x0D, 0x55]); // PING, no READY yet
        app.poll_uart(&mut platform);
        assert!(platform.drain_tx().is_empty());
        assert!(!app.is_ready());
    }

    #[test]
    fn malformed_frame_then_valid_ping_yields_single_pong() {
        let (mut app, mut platform) = ready_app();
        platform.push_rx(&[0xAA, 0x01, 0x0C, 0x00, 0xFF, 0x55]); // bad checksum
        platform.push_rx(&[0xAA, 0x01, 0x0C, 0x00, 0x0D, 0x55]); // valid PING
        app.poll_uart(&mut platform);
        let tx = platform.drain_tx();
        assert_eq!(tx, vec![0xAA, 0x01, 0x0D, 0x00, 0x0C, 0x55]);
    }

    #[test]
    fn req_sensor_reports_current_snapshot_and_arms_initial_check() {
        let (mut app, mut platform) = ready_app();
        platform.temperature = 25.3;
        platform.humidity = 40.0;
        platform.set_ec_ppm(800.0);
        platform.set_water_percent(55.0);
        app.tick_periodic(&mut platform);

        platform.push_rx(&[0xAA, 0x01, 0x02, 0x00, 0x03, 0x55]); // REQ_SENSOR
        app.poll_uart(&mut platform);
        let tx = platform.drain_tx();
        assert_eq!(tx[0], 0xAA);
        assert_eq!(tx[1], types::TYPE_DATA);
        assert_eq!(tx[2], types::DATA_SENSOR);
        let payload = types::SensorPayload::decode(&tx[4..12]).unwrap();
        assert_eq!(payload.temp_x10, 253);
        assert_eq!(payload.water, 55);
    }

    #[test]
    fn close_stops_pumps_and_resets_readiness() {
        let (mut app, mut platform) = ready_app();
        platform.push_rx(&[0xAA, 0x01, 0x07, 0x00, 0x06, 0x55]); // PUMP_WATER
        app.poll_uart(&mut platform);
        assert!(platform.gpio(ActuatorPin::WaterPump));

        platform.push_rx(&[0xAA, 0x01, 0x0F, 0x00, 0x0E, 0x55]); // CLOSE
        app.poll_uart(&mut platform);
        assert!(!platform.gpio(ActuatorPin::WaterPump));
        assert!(!app.is_ready());

        platform.push_rx(&[0xAA, 0x01, 0x0C, 0x00, 0x0D, 0x55]); // PING after CLOSE
        app.poll_uart(&mut platform);
        assert!(platform.drain_tx().is_empty());
    }

    #[test]
    fn water_recovery_end_to_end() {
        let (mut app, mut platform) = ready_app();
        platform.set_water_percent(5.0);
        platform.set_ec_ppm(1000.0);
        app.tick_periodic(&mut platform); // arms initial check -> WATER_LOW
        let tx = platform.drain_tx();
        assert_eq!(tx[2], types::EVENT_WATER_LOW);

        platform.push_rx(&[0xAA, 0x01, 0x0E, 0x00, 0x0F, 0x55]); // AUTO_RECOVERY
        app.poll_uart(&mut platform);
        platform.drain_tx();

        app.tick_recovery(&mut platform);
        platform.advance(app.config.water_pump_on_ms);
        app.tick_recovery(&mut platform); // -> WATER_SETTLE
        platform.advance(app.config.water_settle_ms);

        platform.set_water_percent(60.0);
        app.tick_recovery(&mut platform); // -> WATER_CHECK
        app.tick_recovery(&mut platform); // evaluates WATER_CHECK, samples & finishes
        let tx = platform.drain_tx();
        assert_eq!(tx[2], types::EVENT_WATER_ACTION_SUCCESS);
        assert!(!app.recovery.active());
    }
}
