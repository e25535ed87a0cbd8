//! Frame assembly, checksum, and the `send_*` helpers (§4.B).
//!
//! Wire format:
//! ```text
//! ┌─────┬──────┬─────────┬─────┬─────────────┬─────┬─────┐
//! │ STX │ TYPE │ SUBTYPE │ LEN │ PAYLOAD[LEN]│ CHK │ ETX │
//! └─────┴──────┴─────────┴─────┴─────────────┴─────┴─────┘
//! ```
//! Checksum is a plain XOR of `TYPE`, `SUBTYPE`, `LEN`, and every payload
//! byte — no running CRC. All multi-byte fields are little-endian.

use super::types::{self, MAX_FRAME_LEN, MAX_PAYLOAD, STX};

/// XOR checksum over the header fields and payload.
pub fn checksum(r#type: u8, subtype: u8, len: u8, payload: &[u8]) -> u8 {
    let mut chk = r#type ^ subtype ^ len;
    for &b in payload {
        chk ^= b;
    }
    chk
}

/// Assemble a complete frame into `out`, returning the number of bytes
/// written. Returns `None` if `payload` exceeds [`types::MAX_PAYLOAD`] or
/// `out` is too small to hold the frame.
pub fn encode(r#type: u8, subtype: u8, payload: &[u8], out: &mut [u8]) -> Option<usize> {
    if payload.len() > MAX_PAYLOAD {
        return None;
    }
    let len = payload.len() as u8;
    let total = payload.len() + types::FRAME_OVERHEAD;
    if out.len() < total {
        return None;
    }

    out[0] = STX;
    out[1] = r#type;
    out[2] = subtype;
    out[3] = len;
    out[4..4 + payload.len()].copy_from_slice(payload);
    out[4 + payload.len()] = checksum(r#type, subtype, len, payload);
    out[5 + payload.len()] = types::ETX;

    Some(total)
}

/// A caller-facing assembler that owns its scratch buffer, mirroring the
/// `send(...)` family in the component design. Every method is a thin
/// wrapper around [`encode`] plus a platform UART write, so callers never
/// touch the wire format directly.
pub struct FrameSender {
    buf: [u8; MAX_FRAME_LEN],
}

impl Default for FrameSender {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSender {
    pub fn new() -> Self {
        Self {
            buf: [0; MAX_FRAME_LEN],
        }
    }

    /// Core assembler: encode a frame and hand it to `write`.
    pub fn send(
        &mut self,
        r#type: u8,
        subtype: u8,
        payload: &[u8],
        mut write: impl FnMut(&[u8]) -> crate::error::UartResult<()>,
    ) -> crate::error::UartResult<()> {
        let n = encode(r#type, subtype, payload, &mut self.buf)
            .expect("payload within MAX_PAYLOAD by construction");
        write(&self.buf[..n])
    }

    pub fn send_pong(
        &mut self,
        write: impl FnMut(&[u8]) -> crate::error::UartResult<()>,
    ) -> crate::error::UartResult<()> {
        self.send(types::TYPE_CMD, types::CMD_PONG, &[], write)
    }

    pub fn send_sensor_data(
        &mut self,
        payload: types::SensorPayload,
        write: impl FnMut(&[u8]) -> crate::error::UartResult<()>,
    ) -> crate::error::UartResult<()> {
        self.send(
            types::TYPE_DATA,
            types::DATA_SENSOR,
            &payload.encode(),
            write,
        )
    }

    pub fn send_event_sensor(
        &mut self,
        event_subtype: u8,
        payload: types::SensorPayload,
        write: impl FnMut(&[u8]) -> crate::error::UartResult<()>,
    ) -> crate::error::UartResult<()> {
        self.send(types::TYPE_EVENT, event_subtype, &payload.encode(), write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parser::FrameParser;

    #[test]
    fn roundtrip_empty_payload() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = encode(types::TYPE_CMD, types::CMD_PONG, &[], &mut buf).unwrap();
        assert_eq!(n, 6);

        let mut parser = FrameParser::new();
        let mut got = None;
        for &b in &buf[..n] {
            if let Some(f) = parser.feed(b) {
                got = Some(f);
            }
        }
        let f = got.unwrap();
        assert_eq!(f.r#type, types::TYPE_CMD);
        assert_eq!(f.subtype, types::CMD_PONG);
        assert_eq!(f.len, 0);
    }

    #[test]
    fn roundtrip_sensor_payload() {
        let payload = types::SensorPayload {
            temp_x10: 253,
            humi_x10: 400,
            ec: 800,
            water: 55,
        }
        .encode();
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = encode(types::TYPE_DATA, types::DATA_SENSOR, &payload, &mut buf).unwrap();

        let mut parser = FrameParser::new();
        let mut got = None;
        for &b in &buf[..n] {
            if let Some(f) = parser.feed(b) {
                got = Some(f);
            }
        }
        let f = got.unwrap();
        assert_eq!(f.payload(), &payload);
        let decoded = types::SensorPayload::decode(f.payload()).unwrap();
        assert_eq!(decoded.temp_x10, 253);
        assert_eq!(decoded.water, 55);
    }

    #[test]
    fn checksum_matches_transmitted_byte() {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let payload = [1u8, 2, 3, 4];
        let n = encode(types::TYPE_EVENT, types::EVENT_WATER_LOW, &payload, &mut buf).unwrap();
        let chk = buf[n - 2];
        assert_eq!(
            chk,
            checksum(types::TYPE_EVENT, types::EVENT_WATER_LOW, 4, &payload)
        );
    }

    #[test]
    fn rejects_oversized_payload() {
        let big = [0u8; MAX_PAYLOAD + 1];
        let mut buf = [0u8; MAX_FRAME_LEN + 8];
        assert!(encode(types::TYPE_DATA, types::DATA_SENSOR, &big, &mut buf).is_none());
    }
}
