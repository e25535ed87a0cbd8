//! Port traits — the hexagonal boundary between domain logic and hardware.
//!
//! ```text
//!   Adapter (HAL / mock) ──▶ Port trait ──▶ Application (domain)
//! ```
//!
//! The domain core (sensors, FSMs, command handler) never names a concrete
//! peripheral type. It is generic over these four traits the way the
//! reference design is generic over its own driven-adapter ports, so the
//! whole stack runs against a [`MockPlatform`] under `cargo test` with no
//! hardware attached.

use crate::error::{I2cError, UartError};

/// Monotonic millisecond tick and blocking delay.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
    fn delay_ms(&mut self, ms: u32);
}

/// I²C master transactions. `write_read` issues a write (typically a
/// register address) immediately followed by a read with a repeated start,
/// the shape every I²C sensor driver in this crate needs.
pub trait I2cPort {
    fn write(&mut self, addr: u8, buf: &[u8]) -> Result<(), I2cError>;
    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), I2cError>;
    fn write_read(&mut self, addr: u8, out: &[u8], dst: &mut [u8]) -> Result<(), I2cError>;
    /// Deinit and reinitialize the bus peripheral (recovery from a wedged bus).
    fn reinit(&mut self) -> Result<(), I2cError>;
}

/// The three GPIO-driven actuators this node commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorPin {
    WaterPump,
    NutriPump,
    Led,
}

/// Level-set GPIO. Callers pass the logical level they want; polarity
/// (active-low relays) is the adapter's concern, not the domain's.
pub trait GpioPort {
    fn set(&mut self, pin: ActuatorPin, level: bool);
}

/// Byte-oriented serial link to the supervising host.
pub trait UartPort {
    /// Non-blocking poll; `None` if no byte is currently available.
    fn try_read_byte(&mut self) -> Option<u8>;
    fn write(&mut self, buf: &[u8]) -> Result<(), UartError>;
}

/// Convenience supertrait so call sites can take one generic bound instead
/// of four. Blanket-implemented for anything satisfying all four ports.
pub trait Platform: ClockPort + I2cPort + GpioPort + UartPort {}
impl<T: ClockPort + I2cPort + GpioPort + UartPort> Platform for T {}
