//! Wire types for the remote-control dashboard WebSocket protocol.
//!
//! Every frame on the wire is a JSON object with a `type` discriminator
//! field. [`ServerMessage`] covers the server-to-client direction,
//! [`ClientMessage`] the client-to-server direction. Both serialize with
//! `#[serde(tag = "type", rename_all = "snake_case")]`, so the Rust variant
//! names map one-to-one onto the wire discriminators (`log_line`,
//! `execute_command`, ...).

pub mod message;

pub use message::{ClientMessage, ServerMessage};
