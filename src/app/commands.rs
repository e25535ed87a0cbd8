//! Host commands — the decoded form of inbound `TYPE_CMD` frames.
//!
//! [`HostCommand::from_frame`] is the single place that maps wire subtypes
//! onto the domain's vocabulary; everything past that boundary works with
//! this enum, never with raw frame bytes.

use crate::protocol::types::{self, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Ready,
    Ping,
    ReqSensor,
    LedOn,
    LedOff,
    PumpWater,
    PumpWaterStop,
    PumpNutri,
    PumpNutriStop,
    AutoRecovery,
    Close,
}

impl HostCommand {
    /// Decode a validated frame into a command. Returns `None` for any
    /// `TYPE` other than `CMD` or any subtype this node doesn't recognize —
    /// both cases are silently dropped by the caller per the component design.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        if frame.r#type != types::TYPE_CMD {
            return None;
        }
        Some(match frame.subtype {
            types::CMD_READY => Self::Ready,
            types::CMD_PING => Self::Ping,
            types::CMD_REQ_SENSOR => Self::ReqSensor,
            types::CMD_LED_ON => Self::LedOn,
            types::CMD_LED_OFF => Self::LedOff,
            types::CMD_PUMP_WATER => Self::PumpWater,
            types::CMD_PUMP_WATER_STOP => Self::PumpWaterStop,
            types::CMD_PUMP_NUTRI => Self::PumpNutri,
            types::CMD_PUMP_NUTRI_STOP => Self::PumpNutriStop,
            types::CMD_AUTO_RECOVERY => Self::AutoRecovery,
            types::CMD_CLOSE => Self::Close,
            _ => return None,
        })
    }

    /// Whether `stm_ready` must be true for this command to be honored.
    /// `READY` is the sole exception — it's what sets the gate.
    pub fn is_gated(self) -> bool {
        !matches!(self, Self::Ready)
    }
}
