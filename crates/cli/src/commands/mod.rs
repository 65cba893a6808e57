//! Subcommand dispatch and shared wiring.

mod exec;
mod watch;

use std::sync::Arc;

use rcdash_runtime::{Endpoint, SessionManager, WsTransportFactory};

use crate::cli::{Cli, Command};
use crate::console::{ConsoleLogSink, ConsoleNotifier, ConsoleTerminalSink};
use crate::error::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let endpoint = endpoint_from(&cli);
	match cli.command {
		Command::Watch { servers, log } => watch::run(endpoint, servers, log).await,
		Command::Exec {
			server,
			command,
			timeout_ms,
		} => exec::run(endpoint, server, command.join(" "), timeout_ms).await,
	}
}

fn endpoint_from(cli: &Cli) -> Endpoint {
	let endpoint = Endpoint::new(cli.host.clone());
	if cli.tls {
		endpoint.with_scheme("wss")
	} else {
		endpoint
	}
}

/// Builds a session manager wired to the terminal sinks.
fn console_manager(endpoint: Endpoint) -> Arc<SessionManager> {
	Arc::new(SessionManager::new(
		endpoint,
		Arc::new(WsTransportFactory::new()),
		Arc::new(ConsoleNotifier),
		Arc::new(ConsoleLogSink),
		Arc::new(ConsoleTerminalSink),
	))
}
