//! Message types exchanged with the dashboard server over WebSocket.
//!
//! The protocol is deliberately small:
//!
//! 1. Client connects to `ws://<host>/ws/<server-name>`
//! 2. Client sends [`ClientMessage::StartLogTail`] and/or
//!    [`ClientMessage::ExecuteCommand`]
//! 3. Server streams [`ServerMessage::LogLine`] / answers with
//!    [`ServerMessage::CommandOutput`], reporting failures via
//!    [`ServerMessage::Error`]
//!
//! # Main Types
//!
//! - [`ServerMessage`] - Messages from the dashboard server to the client
//! - [`ClientMessage`] - Messages from the client to the dashboard server

use serde::{Deserialize, Serialize};

/// Message sent from the dashboard server to a connected client.
///
/// Unknown discriminators are possible on the wire (newer servers may add
/// message kinds); callers that need to tolerate them should first decode to
/// `serde_json::Value` and treat a failed typed parse as diagnostic-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
	/// One line emitted by a tailed remote log file.
	LogLine {
		/// Name of the remote server the line came from.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		server: Option<String>,
		/// Path of the tailed file on the remote host.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		file: Option<String>,
		/// The log line itself, already stripped of its trailing newline.
		line: String,
	},
	/// Output of a remotely executed command.
	CommandOutput {
		/// The command that was executed.
		command: String,
		/// Combined output of the command.
		output: String,
	},
	/// Acknowledgement that a log tail was started.
	LogStarted {
		/// Path of the file now being tailed.
		file_path: String,
	},
	/// Acknowledgement that a log tail was stopped.
	LogStopped {
		/// Path of the file no longer tailed.
		file_path: String,
	},
	/// Server-reported error (failed tail, failed command, ...).
	Error {
		/// Human-readable description of what went wrong.
		message: String,
	},
}

/// Message sent from the client to the dashboard server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
	/// Ask the server to start tailing a log file on the remote host.
	StartLogTail {
		/// Path of the file to tail.
		file_path: String,
	},
	/// Ask the server to stop a previously started log tail.
	StopLogTail {
		/// Path of the file to stop tailing.
		file_path: String,
	},
	/// Ask the server to run a command on the remote host.
	ExecuteCommand {
		/// The command line to execute.
		command: String,
	},
}
