//! Hydroponic node firmware — entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapter (outer ring)                      │
//! │                                                                │
//! │        MockPlatform (ClockPort+I2cPort+GpioPort+UartPort)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Application (pure logic)                  │    │
//! │  │  SensorHub · ThresholdFsm · RecoveryFsm · dispatch      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No concrete MCU HAL crate is wired in this revision — the real
//! peripheral adapter (ESP32 I²C/UART/GPIO driver) is out of scope here;
//! see [`hydro_node::testutil::MockPlatform`] for the reference adapter
//! the hexagonal boundary is built against. This binary drives the
//! `Application` against that adapter so the full control loop — sensor
//! sampling, threshold detection, auto-recovery, and the host protocol —
//! can be exercised end to end without hardware attached.

#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use hydro_node::app::service::Application;
use hydro_node::config::RuntimeConfig;
use hydro_node::testutil::MockPlatform;

fn main() -> Result<()> {
    env_logger::try_init()?;

    info!("hydro-node firmware starting");

    let config = RuntimeConfig::default();
    let tick_ms = config.control_loop_period_ms;

    let mut app = Application::new(config);
    let mut platform = MockPlatform::new();

    // Bring the host protocol up to the ready state, as the supervising
    // host would over the real UART link.
    platform.push_rx(&[0xAA, 0x01, 0x01, 0x00, 0x00, 0x55]); // CMD_READY

    loop {
        app.run_iteration(&mut platform);
        for byte in platform.drain_tx() {
            info!("uart tx: {byte:#04x}");
        }
        platform.advance(tick_ms);
    }
}
