//! Session layer for the dashboard client.
//!
//! This module implements the named-session manager on top of the transport:
//! it owns one connection per session name, routes inbound messages by their
//! `type` discriminator, and autonomously recovers from disconnection with
//! exponential backoff.
//!
//! # Session Flow
//!
//! 1. Caller invokes [`SessionManager::connect`] with a name and hooks
//! 2. The manager derives `ws://<host>/ws/<name>` and opens a transport
//! 3. A pump task consumes the connection's event stream
//! 4. `Opened` resets the backoff counter and fires `on_open`
//! 5. `Message` frames are decoded, routed to the sinks, and handed to
//!    `on_message`
//! 6. `Closed` fires `on_close` and enters the reconnect procedure, which
//!    doubles its delay on every attempt until the ceiling is hit
//!
//! Every pump task and reconnect timer carries the generation it was
//! scheduled under; an intervening `disconnect` or `connect` for the same
//! name changes the entry's generation and turns the stale actor into a
//! no-op, so a cancelled session can never be resurrected by a late timer.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use rcdash_protocol::ServerMessage;

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::render::{LogSink, TerminalSink};
use crate::transport::{TransportEvent, TransportFactory, TransportHandle};

/// Default ceiling on automatic reconnection attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before the first reconnection attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(3000);

/// Where the dashboard server lives; sessions connect to
/// `<scheme>://<host>/ws/<name>`.
#[derive(Debug, Clone)]
pub struct Endpoint {
	scheme: String,
	host: String,
}

impl Endpoint {
	/// Creates a plain-WebSocket endpoint for `host` (a `host:port` string).
	pub fn new(host: impl Into<String>) -> Self {
		Self {
			scheme: "ws".to_string(),
			host: host.into(),
		}
	}

	/// Overrides the transport scheme (e.g. `wss`).
	pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.scheme = scheme.into();
		self
	}

	/// Connection URL for a named session.
	///
	/// The name is interpolated into the path verbatim, with no escaping;
	/// callers must use URL-path-safe session names.
	pub fn session_url(&self, name: &str) -> String {
		format!("{}://{}/ws/{}", self.scheme, self.host, name)
	}
}

/// Reconnection policy applied independently to every session.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
	/// Automatic attempts before the session is abandoned.
	pub max_attempts: u32,
	/// Delay before the first attempt; doubles on each subsequent one.
	pub base_delay: Duration,
	/// Optional cap on the per-attempt delay. `None` leaves the doubling
	/// uncapped.
	pub max_delay: Option<Duration>,
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			base_delay: DEFAULT_BASE_DELAY,
			max_delay: None,
		}
	}
}

impl ReconnectPolicy {
	/// Delay before the zero-based `attempt`: `base_delay * 2^attempt`,
	/// clamped to `max_delay` when one is set.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		let delay = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));
		match self.max_delay {
			Some(cap) => delay.min(cap),
			None => delay,
		}
	}
}

type OpenHook = Box<dyn Fn() + Send + Sync>;
type MessageHook = Box<dyn Fn(&Value) + Send + Sync>;
type CloseHook = Box<dyn Fn() + Send + Sync>;
type ErrorHook = Box<dyn Fn(&str) + Send + Sync>;

/// Per-session lifecycle hooks, each independently optional.
///
/// Hooks are held for the lifetime of the session, including across
/// reconnect attempts: the manager re-connects with the original set.
#[derive(Default)]
pub struct SessionHooks {
	on_open: Option<OpenHook>,
	on_message: Option<MessageHook>,
	on_close: Option<CloseHook>,
	on_error: Option<ErrorHook>,
}

impl SessionHooks {
	pub fn new() -> Self {
		Self::default()
	}

	/// Called after every successful open, initial or reconnect.
	pub fn on_open(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
		self.on_open = Some(Box::new(hook));
		self
	}

	/// Called with every decoded inbound message, after type routing.
	pub fn on_message(mut self, hook: impl Fn(&Value) + Send + Sync + 'static) -> Self {
		self.on_message = Some(Box::new(hook));
		self
	}

	/// Called when the connection drops, before any reconnect is scheduled.
	pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
		self.on_close = Some(Box::new(hook));
		self
	}

	/// Called on transport-level errors. These are not terminal by
	/// themselves; termination arrives as a separate close.
	pub fn on_error(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
		self.on_error = Some(Box::new(hook));
		self
	}

	fn emit_open(&self) {
		if let Some(hook) = &self.on_open {
			hook();
		}
	}

	fn emit_message(&self, value: &Value) {
		if let Some(hook) = &self.on_message {
			hook(value);
		}
	}

	fn emit_close(&self) {
		if let Some(hook) = &self.on_close {
			hook();
		}
	}

	fn emit_error(&self, reason: &str) {
		if let Some(hook) = &self.on_error {
			hook(reason);
		}
	}
}

/// State tracked per session name.
struct SessionEntry {
	/// Changes on every connect; stale pumps and timers check it and bail.
	generation: u64,
	/// Exclusively owned while the connection is up; `None` after close.
	handle: Option<Box<dyn TransportHandle>>,
	/// Reconnects scheduled since the last successful open.
	attempts: u32,
	/// Hook set supplied on the original connect.
	hooks: Arc<SessionHooks>,
}

/// Manager for a named set of auto-reconnecting dashboard sessions.
///
/// All collaborators are injected at construction; the manager holds no
/// process-global state and no rendering logic beyond selecting which sink
/// to call.
pub struct SessionManager {
	endpoint: Endpoint,
	factory: Arc<dyn TransportFactory>,
	notifier: Arc<dyn Notifier>,
	log_sink: Arc<dyn LogSink>,
	terminal_sink: Arc<dyn TerminalSink>,
	policy: ReconnectPolicy,
	sessions: Mutex<HashMap<String, SessionEntry>>,
	next_generation: AtomicU64,
}

impl SessionManager {
	/// Creates a manager with the default reconnect policy.
	pub fn new(
		endpoint: Endpoint,
		factory: Arc<dyn TransportFactory>,
		notifier: Arc<dyn Notifier>,
		log_sink: Arc<dyn LogSink>,
		terminal_sink: Arc<dyn TerminalSink>,
	) -> Self {
		Self {
			endpoint,
			factory,
			notifier,
			log_sink,
			terminal_sink,
			policy: ReconnectPolicy::default(),
			sessions: Mutex::new(HashMap::new()),
			next_generation: AtomicU64::new(0),
		}
	}

	/// Overrides the reconnect policy.
	pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Opens a session to `ws://<host>/ws/<name>`.
	///
	/// Connecting a name that is already open closes the previous handle and
	/// replaces it. A synchronous transport-construction failure is surfaced
	/// as a `Failed to connect` notification and returned; it never schedules
	/// a reconnect.
	pub fn connect(self: &Arc<Self>, name: &str, hooks: SessionHooks) -> Result<()> {
		self.connect_inner(name, Arc::new(hooks))
	}

	fn connect_inner(self: &Arc<Self>, name: &str, hooks: Arc<SessionHooks>) -> Result<()> {
		if name.is_empty() {
			return Err(Error::EmptySessionName);
		}
		let url = self.endpoint.session_url(name);

		let (handle, events) = match self.factory.open(&url) {
			Ok(parts) => parts,
			Err(e) => {
				tracing::error!(
					target: "rcdash.session",
					session = %name,
					error = %e,
					"failed to create connection"
				);
				self.notifier.error(&format!("Failed to connect to {name}"), None);
				// Construction failures leave the name untracked; an entry
				// with no live handle (a reconnect that failed to construct)
				// is torn down rather than left dangling.
				let mut sessions = self.sessions.lock();
				if sessions.get(name).is_some_and(|entry| entry.handle.is_none()) {
					sessions.remove(name);
				}
				return Err(e);
			}
		};

		let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
		let replaced = {
			let mut sessions = self.sessions.lock();
			let entry = sessions
				.entry(name.to_string())
				.or_insert_with(|| SessionEntry {
					generation,
					handle: None,
					attempts: 0,
					hooks: Arc::clone(&hooks),
				});
			entry.generation = generation;
			entry.hooks = Arc::clone(&hooks);
			entry.handle.replace(handle)
		};
		if let Some(old) = replaced {
			tracing::debug!(target: "rcdash.session", session = %name, "replacing existing connection");
			old.close();
		}

		let manager = Arc::clone(self);
		let pump_name = name.to_string();
		tokio::spawn(async move {
			manager.pump_events(pump_name, generation, hooks, events).await;
		});
		Ok(())
	}

	/// Closes a session and removes it from tracking immediately.
	///
	/// Removal happens before the transport's close event can be observed,
	/// so an explicit disconnect never triggers reconnection. No-op for
	/// unknown names.
	pub fn disconnect(&self, name: &str) {
		match self.sessions.lock().remove(name) {
			Some(entry) => {
				tracing::info!(target: "rcdash.session", session = %name, "disconnecting");
				if let Some(handle) = entry.handle {
					handle.close();
				}
			}
			None => {
				tracing::debug!(target: "rcdash.session", session = %name, "disconnect for unknown session; ignoring");
			}
		}
	}

	/// Serializes `payload` and transmits it on the named session.
	///
	/// Requires a live, open connection: otherwise the payload is dropped
	/// (never queued), a `Not connected` notification is emitted, and
	/// [`Error::NotConnected`] is returned.
	pub fn send<T: Serialize + ?Sized>(&self, name: &str, payload: &T) -> Result<()> {
		let text = serde_json::to_string(payload)?;
		{
			let sessions = self.sessions.lock();
			if let Some(handle) = sessions.get(name).and_then(|entry| entry.handle.as_ref()) {
				if handle.is_open() {
					return handle.send(text);
				}
			}
		}
		tracing::warn!(
			target: "rcdash.session",
			session = %name,
			"send on session with no open connection; dropping payload"
		);
		self.notifier.error(&format!("Not connected to {name}"), None);
		Err(Error::NotConnected(name.to_string()))
	}

	/// True while the named session has an open connection.
	pub fn is_connected(&self, name: &str) -> bool {
		self.sessions
			.lock()
			.get(name)
			.and_then(|entry| entry.handle.as_ref())
			.is_some_and(|handle| handle.is_open())
	}

	/// Reconnects scheduled for `name` since its last successful open.
	/// Zero for untracked names.
	pub fn reconnect_attempts(&self, name: &str) -> u32 {
		self.sessions.lock().get(name).map_or(0, |entry| entry.attempts)
	}

	fn is_current(&self, name: &str, generation: u64) -> bool {
		self.sessions
			.lock()
			.get(name)
			.is_some_and(|entry| entry.generation == generation)
	}

	/// Consumes one connection's event stream until it closes or goes stale.
	async fn pump_events(
		self: Arc<Self>,
		name: String,
		generation: u64,
		hooks: Arc<SessionHooks>,
		mut events: mpsc::UnboundedReceiver<TransportEvent>,
	) {
		while let Some(event) = events.recv().await {
			match event {
				TransportEvent::Opened => {
					{
						let mut sessions = self.sessions.lock();
						match sessions.get_mut(&name) {
							Some(entry) if entry.generation == generation => entry.attempts = 0,
							_ => break,
						}
					}
					tracing::info!(target: "rcdash.session", session = %name, "connected");
					self.notifier.success(&format!("Connected to {name}"), None);
					hooks.emit_open();
				}
				TransportEvent::Message(text) => {
					if !self.is_current(&name, generation) {
						break;
					}
					match serde_json::from_str::<Value>(&text) {
						Ok(value) => {
							self.route_message(&name, &value);
							hooks.emit_message(&value);
						}
						Err(e) => {
							tracing::error!(
								target: "rcdash.session",
								session = %name,
								error = %e,
								"error parsing message"
							);
						}
					}
				}
				TransportEvent::Error(reason) => {
					if !self.is_current(&name, generation) {
						break;
					}
					tracing::warn!(
						target: "rcdash.session",
						session = %name,
						error = %reason,
						"transport error"
					);
					hooks.emit_error(&reason);
				}
				TransportEvent::Closed => {
					{
						let mut sessions = self.sessions.lock();
						match sessions.get_mut(&name) {
							Some(entry) if entry.generation == generation => entry.handle = None,
							_ => break,
						}
					}
					tracing::info!(target: "rcdash.session", session = %name, "disconnected");
					hooks.emit_close();
					self.schedule_reconnect(&name, generation, Arc::clone(&hooks));
					break;
				}
			}
		}
	}

	/// Routes one decoded inbound message by its `type` discriminator.
	fn route_message(&self, name: &str, value: &Value) {
		match serde_json::from_value::<ServerMessage>(value.clone()) {
			Ok(ServerMessage::LogLine { line, .. }) => {
				// Client-side render time, not the event's origin time.
				let rendered = format!("[{}] {}", Local::now().format("%H:%M:%S"), line);
				self.log_sink.log_line(&rendered);
			}
			Ok(ServerMessage::CommandOutput { command, output }) => {
				self.terminal_sink.command_output(&command, &output);
			}
			Ok(ServerMessage::Error { message }) => {
				self.notifier.error(&message, None);
			}
			Ok(ServerMessage::LogStarted { file_path }) => {
				tracing::debug!(target: "rcdash.session", session = %name, file = %file_path, "log tail started");
			}
			Ok(ServerMessage::LogStopped { file_path }) => {
				tracing::debug!(target: "rcdash.session", session = %name, file = %file_path, "log tail stopped");
			}
			Err(_) => {
				tracing::debug!(target: "rcdash.session", session = %name, message = %value, "unrecognized message");
			}
		}
	}

	/// Enters the reconnect procedure after a non-explicit close.
	fn schedule_reconnect(self: &Arc<Self>, name: &str, generation: u64, hooks: Arc<SessionHooks>) {
		let attempts = {
			let mut sessions = self.sessions.lock();
			let Some(entry) = sessions.get_mut(name) else {
				return;
			};
			if entry.generation != generation {
				return;
			}
			let attempts = entry.attempts;
			if attempts >= self.policy.max_attempts {
				// Terminal: the entry is removed so a dangling counter can
				// never imply a live session. Only a fresh explicit connect
				// revives the name.
				sessions.remove(name);
				drop(sessions);
				tracing::error!(
					target: "rcdash.session",
					session = %name,
					"max reconnection attempts reached"
				);
				self.notifier.error(&format!("Lost connection to {name}"), None);
				return;
			}
			// Counts attempts scheduled, not completed: incremented before
			// the delay elapses.
			entry.attempts = attempts + 1;
			attempts
		};

		let delay = self.policy.delay_for(attempts);
		let manager = Arc::clone(self);
		let name = name.to_string();
		tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			// Re-validate: an intervening disconnect removed the entry, an
			// intervening connect changed its generation or gave it a live
			// handle. Either way this timer is stale.
			let expected = {
				let sessions = manager.sessions.lock();
				sessions
					.get(&name)
					.is_some_and(|entry| entry.generation == generation && entry.handle.is_none())
			};
			if !expected {
				tracing::debug!(target: "rcdash.session", session = %name, "reconnect timer is stale; ignoring");
				return;
			}
			tracing::info!(
				target: "rcdash.session",
				session = %name,
				attempt = attempts + 1,
				"attempting to reconnect"
			);
			let _ = manager.connect_inner(&name, hooks);
		});
	}
}
