//! `rcdash watch` - stream log lines and events from named servers.

use std::sync::Arc;

use rcdash_protocol::ClientMessage;
use rcdash_runtime::{Endpoint, SessionHooks};
use tracing::debug;

use crate::error::Result;

pub async fn run(endpoint: Endpoint, servers: Vec<String>, log: Option<String>) -> Result<()> {
	let manager = super::console_manager(endpoint);

	for server in &servers {
		let mut hooks = SessionHooks::new();
		if let Some(path) = &log {
			// Re-requested on every open, so the tail survives reconnects.
			let weak = Arc::downgrade(&manager);
			let name = server.clone();
			let file_path = path.clone();
			hooks = hooks.on_open(move || {
				let Some(manager) = weak.upgrade() else {
					return;
				};
				let request = ClientMessage::StartLogTail {
					file_path: file_path.clone(),
				};
				if let Err(err) = manager.send(&name, &request) {
					debug!(target: "rcdash.cli", session = %name, error = %err, "log tail request failed");
				}
			});
		}
		manager.connect(server, hooks)?;
	}

	// Stream until interrupted.
	tokio::signal::ctrl_c().await?;
	for server in &servers {
		manager.disconnect(server);
	}
	Ok(())
}
