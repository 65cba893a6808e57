//! Dashboard client runtime - sessions, transport, and reconnection
//!
//! This crate provides the connection layer for the remote-control dashboard
//! client:
//!
//! - **Transport**: bidirectional WebSocket channels with an event-stream
//!   surface (open/message/error/close)
//! - **Sessions**: a named set of independent connections with typed inbound
//!   message routing
//! - **Reconnection**: per-session exponential backoff bounded by an attempt
//!   ceiling
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  rcdash-cli  │  Terminal sinks, subcommands
//! └──────┬───────┘
//!        │ injects Notifier + sinks
//! ┌──────▼────────┐
//! │ rcdash-runtime│  This crate
//! │  ┌──────────┐ │
//! │  │ Session  │ │  Named sessions, routing, backoff
//! │  └──────────┘ │
//! │  ┌──────────┐ │
//! │  │ Transport│ │  WebSocket duplex channel
//! │  └──────────┘ │
//! └───────────────┘
//! ```
//!
//! # Decoupling via sink traits
//!
//! The `SessionManager` reports everything through injected trait objects
//! ([`Notifier`], [`LogSink`], [`TerminalSink`]) and opens connections
//! through a [`TransportFactory`]. Nothing in this crate renders output or
//! holds process-global state, which is also what makes the session machine
//! testable against a scripted transport.

pub mod error;
pub mod notify;
pub mod render;
pub mod session;
pub mod transport;

// Re-export key types at crate root
pub use error::{Error, Result};
pub use notify::{Notifier, Severity};
pub use render::{LogSink, TerminalSink};
pub use session::{
	DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, Endpoint, ReconnectPolicy, SessionHooks,
	SessionManager,
};
pub use transport::{TransportEvent, TransportFactory, TransportHandle, WsTransportFactory};
