//! Byte-at-a-time frame parser (§4.C).
//!
//! Fed one byte at a time from the platform's non-blocking UART poll.
//! Bytes before the first `STX` are discarded; once framing starts the
//! parser only resyncs by waiting for the next `STX` after a dispatch (or
//! a validation failure) — a corrupted `LEN` can leave it waiting
//! indefinitely for bytes that will never come, which is acceptable
//! because the host retransmits.

use super::types::{self, Frame, ETX, MAX_PAYLOAD, STX};

/// Large enough to hold any `u8`-valued `LEN` plus framing overhead, so a
/// corrupted length byte can never walk the write index past the buffer —
/// it just stalls waiting for more bytes, as the design intends.
const SCRATCH_LEN: usize = u8::MAX as usize + types::FRAME_OVERHEAD;

/// Streaming frame decoder. Owns its scratch buffer; no heap.
pub struct FrameParser {
    buf: [u8; SCRATCH_LEN],
    idx: usize,
    expected_len: usize,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            buf: [0; SCRATCH_LEN],
            idx: 0,
            expected_len: 0,
        }
    }

    /// Feed one byte. Returns `Some(frame)` when a complete, validated
    /// frame has just been assembled; `None` otherwise (including on a
    /// dropped/malformed frame).
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        if self.idx == 0 && byte != STX {
            return None;
        }

        self.buf[self.idx] = byte;
        self.idx += 1;

        if self.idx == 4 {
            self.expected_len = self.buf[3] as usize;
        }

        if self.idx >= 6 && self.idx == self.expected_len + 6 {
            let result = self.dispatch();
            self.idx = 0;
            return result;
        }

        None
    }

    /// Reset parser state (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.idx = 0;
    }

    fn dispatch(&self) -> Option<Frame> {
        let len = self.expected_len;
        if len > MAX_PAYLOAD {
            return None;
        }
        if self.buf[0] != STX {
            return None;
        }
        if self.buf[len + 5] != ETX {
            return None;
        }

        let r#type = self.buf[1];
        let subtype = self.buf[2];
        let payload = &self.buf[4..4 + len];
        let expected_chk = super::codec::checksum(r#type, subtype, len as u8, payload);
        if self.buf[4 + len] != expected_chk {
            return None;
        }

        let mut frame = Frame {
            r#type,
            subtype,
            payload: [0; MAX_PAYLOAD],
            len: len as u8,
        };
        frame.payload[..len].copy_from_slice(payload);
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::encode;

    fn feed_all(parser: &mut FrameParser, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&b| parser.feed(b)).collect()
    }

    #[test]
    fn discards_bytes_before_stx() {
        let mut parser = FrameParser::new();
        let mut buf = [0u8; 16];
        let n = encode(types::TYPE_CMD, types::CMD_PING, &[], &mut buf).unwrap();

        let mut noisy = vec![0x00u8, 0xFF, 0x12];
        noisy.extend_from_slice(&buf[..n]);
        let frames = feed_all(&mut parser, &noisy);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].subtype, types::CMD_PING);
    }

    #[test]
    fn bad_checksum_drops_frame() {
        let mut parser = FrameParser::new();
        // STX TYPE_CMD SUBTYPE(PING) LEN(0) CHK(wrong) ETX
        let bytes = [STX, types::TYPE_CMD, types::CMD_PING, 0x00, 0xFF, ETX];
        let frames = feed_all(&mut parser, &bytes);
        assert!(frames.is_empty());
    }

    #[test]
    fn missing_etx_drops_frame() {
        let mut parser = FrameParser::new();
        let chk = super::super::codec::checksum(types::TYPE_CMD, types::CMD_PING, 0, &[]);
        let bytes = [STX, types::TYPE_CMD, types::CMD_PING, 0x00, chk, 0x00];
        let frames = feed_all(&mut parser, &bytes);
        assert!(frames.is_empty());
    }

    #[test]
    fn recovers_after_dropped_frame() {
        let mut parser = FrameParser::new();
        let bad = [STX, types::TYPE_CMD, types::CMD_PING, 0x00, 0xFF, ETX];
        let frames = feed_all(&mut parser, &bad);
        assert!(frames.is_empty());

        let mut buf = [0u8; 16];
        let n = encode(types::TYPE_CMD, types::CMD_PONG, &[], &mut buf).unwrap();
        let frames = feed_all(&mut parser, &buf[..n]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].subtype, types::CMD_PONG);
    }

    #[test]
    fn one_frame_per_window_with_payload() {
        let mut parser = FrameParser::new();
        let payload = types::SensorPayload {
            temp_x10: 253,
            humi_x10: 400,
            ec: 800,
            water: 55,
        }
        .encode();
        let mut buf = [0u8; 32];
        let n = encode(types::TYPE_DATA, types::DATA_SENSOR, &payload, &mut buf).unwrap();
        let frames = feed_all(&mut parser, &buf[..n]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len, 8);
    }
}
