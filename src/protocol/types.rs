//! Wire constants and the sensor payload shared by `DATA_SENSOR` and every
//! sensor-bearing event frame.

/// Frame delimiters.
pub const STX: u8 = 0xAA;
pub const ETX: u8 = 0x55;

/// Maximum payload length a frame may carry.
pub const MAX_PAYLOAD: usize = 32;

/// Fixed framing overhead: `STX TYPE SUBTYPE LEN ... CHK ETX`.
pub const FRAME_OVERHEAD: usize = 6;

/// Largest possible frame on the wire (`MAX_PAYLOAD + FRAME_OVERHEAD`).
pub const MAX_FRAME_LEN: usize = MAX_PAYLOAD + FRAME_OVERHEAD;

// ── TYPE codes ───────────────────────────────────────────────

pub const TYPE_CMD: u8 = 0x01;
pub const TYPE_DATA: u8 = 0x02;
pub const TYPE_EVENT: u8 = 0x03;

// ── CMD subtypes (host → device) ────────────────────────────

pub const CMD_READY: u8 = 0x01;
pub const CMD_REQ_SENSOR: u8 = 0x02;
pub const CMD_LED_ON: u8 = 0x03;
pub const CMD_LED_OFF: u8 = 0x04;
pub const CMD_PUMP_WATER: u8 = 0x07;
pub const CMD_PUMP_NUTRI: u8 = 0x08;
pub const CMD_PUMP_WATER_STOP: u8 = 0x09;
pub const CMD_PUMP_NUTRI_STOP: u8 = 0x0A;
pub const CMD_PING: u8 = 0x0C;
pub const CMD_PONG: u8 = 0x0D;
pub const CMD_AUTO_RECOVERY: u8 = 0x0E;
pub const CMD_CLOSE: u8 = 0x0F;

// ── DATA subtypes (device → host) ───────────────────────────

pub const DATA_SENSOR: u8 = 0x01;

// ── EVENT subtypes (device → host) ──────────────────────────

pub const EVENT_WATER_LOW: u8 = 0x01;
pub const EVENT_EC_LOW: u8 = 0x02;
pub const EVENT_WATER_HIGH: u8 = 0x03;
pub const EVENT_EC_HIGH: u8 = 0x04;
pub const EVENT_WATER_RECOVERY_DONE: u8 = 0x05;
pub const EVENT_NUTRI_RECOVERY_DONE: u8 = 0x06;
pub const EVENT_SENSOR_FAIL: u8 = 0x07;
pub const EVENT_WATER_PUMP_FAIL: u8 = 0x08;
pub const EVENT_NUTRI_PUMP_FAIL: u8 = 0x09;
pub const EVENT_WATER_ACTION_SUCCESS: u8 = 0x0A;
pub const EVENT_NUTRI_ACTION_SUCCESS: u8 = 0x0B;

/// A validated, fully reassembled inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub r#type: u8,
    pub subtype: u8,
    pub payload: [u8; MAX_PAYLOAD],
    pub len: u8,
}

impl Frame {
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len as usize]
    }
}

/// The 8-byte sensor payload packed into `DATA_SENSOR` and every
/// sensor-bearing `EVENT` frame: `temp_x10 | humi_x10 | ec | water`, all
/// little-endian `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorPayload {
    pub temp_x10: u16,
    pub humi_x10: u16,
    pub ec: u16,
    pub water: u16,
}

impl SensorPayload {
    pub const LEN: usize = 8;

    pub fn encode(self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        buf[0..2].copy_from_slice(&self.temp_x10.to_le_bytes());
        buf[2..4].copy_from_slice(&self.humi_x10.to_le_bytes());
        buf[4..6].copy_from_slice(&self.ec.to_le_bytes());
        buf[6..8].copy_from_slice(&self.water.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(Self {
            temp_x10: u16::from_le_bytes([buf[0], buf[1]]),
            humi_x10: u16::from_le_bytes([buf[2], buf[3]]),
            ec: u16::from_le_bytes([buf[4], buf[5]]),
            water: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }

    /// Build the payload from engineering-unit readings the way the sensor
    /// pipeline reports them: temperature/humidity scaled by 10, EC/water
    /// rounded to the nearest integer unit.
    pub fn from_readings(temperature: f32, humidity: f32, ec: f32, water: f32) -> Self {
        Self {
            temp_x10: (temperature * 10.0).round() as u16,
            humi_x10: (humidity * 10.0).round() as u16,
            ec: ec.round() as u16,
            water: water.round() as u16,
        }
    }
}
