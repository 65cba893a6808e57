//! Terminal implementations of the runtime's sink traits.
//!
//! The rendering mirrors the dashboard: log lines go to stdout as-is (they
//! already carry their render timestamp), command output echoes the command
//! first, and notifications get a colored severity prefix on stderr.

use std::time::Duration;

use colored::Colorize;

use rcdash_runtime::{LogSink, Notifier, Severity, TerminalSink};

/// Prints notifications to stderr with a colored severity prefix.
///
/// A terminal line is not transient, so the display-duration hint is ignored.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
	fn notify(&self, severity: Severity, message: &str, _duration: Option<Duration>) {
		let prefix = match severity {
			Severity::Success => "ok".green().bold(),
			Severity::Error => "error".red().bold(),
			Severity::Warning => "warning".yellow().bold(),
			Severity::Info => "info".blue().bold(),
		};
		eprintln!("{prefix}: {message}");
	}
}

/// Prints rendered log lines to stdout.
pub struct ConsoleLogSink;

impl LogSink for ConsoleLogSink {
	fn log_line(&self, rendered: &str) {
		println!("{rendered}");
	}
}

/// Prints command output to stdout, echoing the command line first.
pub struct ConsoleTerminalSink;

impl TerminalSink for ConsoleTerminalSink {
	fn command_output(&self, command: &str, output: &str) {
		println!("{} {}", "$".blue(), command.blue());
		println!("{output}");
	}
}
