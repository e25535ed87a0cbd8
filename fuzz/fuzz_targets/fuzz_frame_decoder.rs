//! Fuzz target: `FrameParser::feed`
//!
//! Drives arbitrary byte sequences into the streaming frame parser and
//! asserts it never panics and never yields a payload longer than
//! `MAX_PAYLOAD`.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;

use hydro_node::protocol::parser::FrameParser;
use hydro_node::protocol::types::MAX_PAYLOAD;

fuzz_target!(|data: &[u8]| {
    let mut parser = FrameParser::new();
    for &byte in data {
        if let Some(frame) = parser.feed(byte) {
            assert!(frame.len as usize <= MAX_PAYLOAD, "payload exceeds MAX_PAYLOAD");
        }
    }

    // After a reset the parser must accept bytes cleanly again.
    parser.reset();
    for &byte in data {
        let _ = parser.feed(byte);
    }
});
