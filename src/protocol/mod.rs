//! Framed serial protocol to the supervising host.
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────────────────┐
//! │ UartPort │──▶│  Parser  │──▶│  Command handler (G)  │
//! │ (bytes)  │   │ (frames) │   │  → sensors / FSMs      │
//! └──────────┘   └──────────┘   └───────────────────────┘
//!      ▲                                    │
//!      │              ┌─────────────────────┘
//!      │              ▼
//! ┌──────────┐   ┌──────────┐
//! │ UartPort │◀──│  Codec   │   (telemetry / event frames)
//! │ (write)  │   │ (encode) │
//! └──────────┘   └──────────┘
//! ```
//!
//! Wire format: `STX | TYPE | SUBTYPE | LEN | PAYLOAD[LEN] | CHK | ETX`.
//! See [`codec`] for encode/checksum and [`parser`] for the byte-at-a-time
//! decoder. [`types`] holds the shared constants and the sensor payload.

pub mod codec;
pub mod parser;
pub mod types;
