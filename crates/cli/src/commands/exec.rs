//! `rcdash exec` - run one command on a remote server.

use std::sync::Arc;
use std::time::Duration;

use rcdash_protocol::{ClientMessage, ServerMessage};
use rcdash_runtime::{Endpoint, SessionHooks};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{RcError, Result};

pub async fn run(
	endpoint: Endpoint,
	server: String,
	command: String,
	timeout_ms: u64,
) -> Result<()> {
	let manager = super::console_manager(endpoint);

	let (done_tx, mut done_rx) = mpsc::unbounded_channel();

	let send_command = {
		let weak = Arc::downgrade(&manager);
		let name = server.clone();
		let command = command.clone();
		move || {
			let Some(manager) = weak.upgrade() else {
				return;
			};
			let request = ClientMessage::ExecuteCommand {
				command: command.clone(),
			};
			if let Err(err) = manager.send(&name, &request) {
				debug!(target: "rcdash.cli", session = %name, error = %err, "command dispatch failed");
			}
		}
	};

	let hooks = SessionHooks::new().on_open(send_command).on_message(move |value| {
		match serde_json::from_value::<ServerMessage>(value.clone()) {
			Ok(ServerMessage::CommandOutput { .. }) => {
				let _ = done_tx.send(Ok(()));
			}
			Ok(ServerMessage::Error { message }) => {
				let _ = done_tx.send(Err(message));
			}
			_ => {}
		}
	});

	manager.connect(&server, hooks)?;

	// The output itself is rendered by the terminal sink; this only waits
	// for the session to produce a verdict.
	let outcome = tokio::time::timeout(Duration::from_millis(timeout_ms), done_rx.recv()).await;
	manager.disconnect(&server);

	match outcome {
		Ok(Some(Ok(()))) => Ok(()),
		Ok(Some(Err(message))) => Err(RcError::Remote(message)),
		Ok(None) => Err(RcError::Remote(
			"session closed before the command completed".to_string(),
		)),
		Err(_) => Err(RcError::Timeout {
			ms: timeout_ms,
			condition: format!("output of '{command}'"),
		}),
	}
}
