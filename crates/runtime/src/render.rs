//! Render sinks for the two inbound message kinds that reach the UI.
//!
//! The session manager holds no rendering logic beyond selecting which sink
//! to call; everything visual lives behind these traits.

/// Receives rendered log lines from tailed remote files.
pub trait LogSink: Send + Sync {
	/// Called once per inbound `log_line` message. `rendered` is already
	/// prefixed with the client-side render timestamp.
	fn log_line(&self, rendered: &str);
}

/// Receives the output of remotely executed commands.
pub trait TerminalSink: Send + Sync {
	/// Called once per inbound `command_output` message.
	fn command_output(&self, command: &str, output: &str);
}
