//! Command-line interface definition.

use clap::{ArgAction, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
	name = "rcdash",
	version,
	about = "Terminal dashboard client for remote-control servers"
)]
pub struct Cli {
	/// Dashboard server address as host:port.
	#[arg(
		long,
		global = true,
		env = "RCDASH_HOST",
		default_value = "127.0.0.1:8000"
	)]
	pub host: String,

	/// Connect over TLS (wss:// instead of ws://).
	#[arg(long, global = true)]
	pub tls: bool,

	/// Increase log verbosity (-v info, -vv debug).
	#[arg(short, long, global = true, action = ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Stream live log lines and events from one or more servers.
	Watch {
		/// Server names as configured on the dashboard server.
		#[arg(required = true)]
		servers: Vec<String>,

		/// Remote log file to tail on every watched server.
		#[arg(long)]
		log: Option<String>,
	},

	/// Execute a command on a server and print its output.
	Exec {
		/// Server name as configured on the dashboard server.
		server: String,

		/// Command line to run on the remote host.
		#[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
		command: Vec<String>,

		/// How long to wait for the command output, in milliseconds.
		#[arg(long, default_value_t = 30_000)]
		timeout_ms: u64,
	},
}
