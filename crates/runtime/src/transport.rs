//! WebSocket transport layer.
//!
//! A [`TransportFactory`] opens one duplex text-message channel per session.
//! Construction is synchronous (mirroring `new WebSocket(url)`); the
//! handshake and all subsequent traffic are reported through an event
//! channel. The session layer never touches the socket directly — it only
//! sees a [`TransportHandle`] and a stream of [`TransportEvent`]s, which is
//! also the seam the tests substitute.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use crate::error::{Error, Result};

/// Event emitted by a transport connection.
///
/// For a single connection, events arrive in transport order: `Opened`,
/// then interleaved `Message`/`Error`, terminated by exactly one `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
	/// The handshake completed; the handle is now open.
	Opened,
	/// A text frame arrived from the remote endpoint.
	Message(String),
	/// A transport-level error. Not terminal by itself; termination is
	/// signaled separately by `Closed`.
	Error(String),
	/// The connection is gone (remote close, network failure, or local
	/// close). Always the last event for a connection.
	Closed,
}

/// Live duplex channel for one open session.
pub trait TransportHandle: Send + Sync {
	/// Queues a text frame for transmission.
	fn send(&self, text: String) -> Result<()>;

	/// Readiness predicate gating send: true between `Opened` and `Closed`.
	fn is_open(&self) -> bool;

	/// Requests closure of the connection. The matching `Closed` event is
	/// still delivered asynchronously.
	fn close(&self);
}

/// Opens duplex message channels to a URL.
pub trait TransportFactory: Send + Sync {
	/// Opens a transport to `url`.
	///
	/// An `Err` is a synchronous construction failure (e.g. a malformed
	/// URL); no events are ever delivered for it. Failures of the
	/// asynchronous handshake instead surface on the event channel as
	/// `Error` followed by `Closed`, so the caller's reconnect machinery
	/// treats them like any other connection drop.
	fn open(
		&self,
		url: &str,
	) -> Result<(Box<dyn TransportHandle>, mpsc::UnboundedReceiver<TransportEvent>)>;
}

/// Production [`TransportFactory`] over `tokio-tungstenite`.
#[derive(Debug, Default)]
pub struct WsTransportFactory;

impl WsTransportFactory {
	pub fn new() -> Self {
		Self
	}
}

impl TransportFactory for WsTransportFactory {
	fn open(
		&self,
		url: &str,
	) -> Result<(Box<dyn TransportHandle>, mpsc::UnboundedReceiver<TransportEvent>)> {
		// Synchronous URL validation; everything past this point reports
		// through the event channel.
		let request = url
			.into_client_request()
			.map_err(|e| Error::ConnectionFailed {
				url: url.to_string(),
				reason: e.to_string(),
			})?;

		let (event_tx, event_rx) = mpsc::unbounded_channel();
		let (command_tx, command_rx) = mpsc::unbounded_channel();
		let open = Arc::new(AtomicBool::new(false));

		tokio::spawn(run_socket(
			request,
			event_tx,
			command_rx,
			Arc::clone(&open),
		));

		let handle = WsHandle {
			command_tx,
			open,
		};
		Ok((Box::new(handle), event_rx))
	}
}

enum WsCommand {
	Send(String),
	Close,
}

struct WsHandle {
	command_tx: mpsc::UnboundedSender<WsCommand>,
	open: Arc<AtomicBool>,
}

impl TransportHandle for WsHandle {
	fn send(&self, text: String) -> Result<()> {
		self.command_tx
			.send(WsCommand::Send(text))
			.map_err(|_| Error::ChannelClosed)
	}

	fn is_open(&self) -> bool {
		self.open.load(Ordering::SeqCst)
	}

	fn close(&self) {
		self.open.store(false, Ordering::SeqCst);
		let _ = self.command_tx.send(WsCommand::Close);
	}
}

/// Drives one WebSocket connection: handshake, then a select loop pumping
/// inbound frames to the event channel and outbound commands to the sink.
async fn run_socket(
	request: tokio_tungstenite::tungstenite::handshake::client::Request,
	events: mpsc::UnboundedSender<TransportEvent>,
	mut commands: mpsc::UnboundedReceiver<WsCommand>,
	open: Arc<AtomicBool>,
) {
	let uri = request.uri().clone();
	let stream = match connect_async(request).await {
		Ok((stream, _response)) => stream,
		Err(e) => {
			tracing::debug!(target: "rcdash.transport", %uri, error = %e, "handshake failed");
			let _ = events.send(TransportEvent::Error(e.to_string()));
			let _ = events.send(TransportEvent::Closed);
			return;
		}
	};

	open.store(true, Ordering::SeqCst);
	if events.send(TransportEvent::Opened).is_err() {
		return;
	}
	tracing::debug!(target: "rcdash.transport", %uri, "connected");

	let (mut sink, mut source) = stream.split();

	loop {
		tokio::select! {
			frame = source.next() => match frame {
				Some(Ok(Message::Text(text))) => {
					if events.send(TransportEvent::Message(text)).is_err() {
						break;
					}
				}
				Some(Ok(Message::Close(_))) | None => break,
				// Ping/pong are answered by tungstenite; binary frames are
				// not part of the dashboard protocol.
				Some(Ok(other)) => {
					tracing::trace!(target: "rcdash.transport", %uri, ?other, "ignoring non-text frame");
				}
				Some(Err(e)) => {
					let _ = events.send(TransportEvent::Error(e.to_string()));
					break;
				}
			},
			command = commands.recv() => match command {
				Some(WsCommand::Send(text)) => {
					if let Err(e) = sink.send(Message::Text(text)).await {
						let _ = events.send(TransportEvent::Error(e.to_string()));
						break;
					}
				}
				// Close on request, and also when the handle is dropped.
				Some(WsCommand::Close) | None => {
					let _ = sink.send(Message::Close(None)).await;
					break;
				}
			},
		}
	}

	open.store(false, Ordering::SeqCst);
	let _ = events.send(TransportEvent::Closed);
	tracing::debug!(target: "rcdash.transport", %uri, "closed");
}
