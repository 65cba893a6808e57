//! Error types for the dashboard client runtime.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the dashboard client runtime.
#[derive(Debug, Error)]
pub enum Error {
	/// Session names key the tracking table and are interpolated into the
	/// connection URL, so an empty name is rejected up front.
	#[error("Session name must not be empty")]
	EmptySessionName,

	/// Failed to construct a transport for the given URL.
	#[error("Failed to construct transport for {url}: {reason}")]
	ConnectionFailed { url: String, reason: String },

	/// Transport-level failure on an established connection.
	#[error("Transport error: {0}")]
	Transport(String),

	/// A send was attempted on a session with no live open handle.
	#[error("Not connected to {0}")]
	NotConnected(String),

	/// The transport task is gone and can no longer accept frames.
	#[error("Transport channel closed unexpectedly")]
	ChannelClosed,

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Returns true if this is a send-on-disconnected-session error.
	pub fn is_not_connected(&self) -> bool {
		matches!(self, Error::NotConnected(_))
	}
}
