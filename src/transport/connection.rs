//! WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to the inspector endpoint,
//! including command/reply correlation and event routing.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming frames from the runtime (replies, events)
//! - Outgoing command frames from the client API
//! - Command/reply correlation by sequence id
//! - Event forwarding to the session's event channel

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::CommandId;
use crate::protocol::{CommandFrame, Event, IncomingMessage, Reply};

// ============================================================================
// Constants
// ============================================================================

/// Maximum pending commands before rejecting new ones.
const MAX_PENDING_COMMANDS: usize = 64;

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream type.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map of command IDs to reply channels.
type CorrelationMap = FxHashMap<CommandId, oneshot::Sender<Result<Reply>>>;

/// Receiving half of the event channel.
///
/// Every event the runtime pushes is delivered here in arrival order.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a command frame and wait for its reply.
    Send {
        frame: CommandFrame,
        reply_tx: oneshot::Sender<Result<Reply>>,
    },
    /// Shutdown the connection.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to an inspector endpoint.
///
/// Handles command/reply correlation and event routing.
/// The connection spawns an internal event loop task.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync` and can be shared across tasks.
/// Dropping a `Connection` does not close the socket; cloned handles share
/// the underlying loop and [`Connection::shutdown`] ends it explicitly.
#[derive(Clone)]
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
}

impl Connection {
    /// Dials the WebSocket endpoint and spawns the event loop task.
    ///
    /// Returns the connection handle together with the receiving half of
    /// the event channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`] if the TCP connect or WebSocket
    /// handshake fails.
    pub async fn connect(endpoint: &Url) -> Result<(Self, EventReceiver)> {
        let (ws_stream, _) = connect_async(endpoint.as_str()).await?;
        debug!(%endpoint, "WebSocket connection established");

        Ok(Self::new(ws_stream))
    }

    /// Creates a connection from an established WebSocket stream.
    fn new(ws_stream: WsStream) -> (Self, EventReceiver) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));

        // Spawn event loop task
        let correlation_clone = Arc::clone(&correlation);

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            correlation_clone,
            event_tx,
        ));

        (
            Self {
                command_tx,
                correlation,
            },
            event_rx,
        )
    }

    /// Sends a command frame and waits for the matching reply.
    ///
    /// The reply is matched to this call by the frame's sequence id, so
    /// concurrent callers each receive their own reply regardless of the
    /// order the runtime answers in.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection closes before the
    ///   reply arrives
    /// - [`Error::Protocol`] if too many commands are already pending
    pub async fn send(&self, frame: CommandFrame) -> Result<Reply> {
        // Check pending command limit
        {
            let correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_COMMANDS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_COMMANDS,
                    "Too many pending commands"
                );
                return Err(Error::protocol(format!(
                    "Too many pending commands: {}/{}",
                    correlation.len(),
                    MAX_PENDING_COMMANDS
                )));
            }
        }

        // Create reply channel
        let (reply_tx, reply_rx) = oneshot::channel();

        // Send command to event loop
        self.command_tx
            .send(ConnectionCommand::Send { frame, reply_tx })
            .map_err(|_| Error::ConnectionClosed)?;

        // Wait for the reply; a dropped sender means the loop terminated
        match reply_rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::ConnectionClosed),
        }
    }

    /// Returns the number of commands awaiting a reply.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Shuts down the connection gracefully.
    ///
    /// Pending commands fail with [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
        event_tx: mpsc::UnboundedSender<Event>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from the runtime
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_frame(&text, &correlation, &event_tx);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the client API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { frame, reply_tx }) => {
                            Self::handle_send_command(
                                frame,
                                reply_tx,
                                &mut ws_write,
                                &correlation,
                            ).await;
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Fail all pending commands on shutdown
        Self::fail_pending_commands(&correlation);

        debug!("Event loop terminated");
    }

    /// Handles an incoming text frame from the runtime.
    fn handle_incoming_frame(
        text: &str,
        correlation: &Arc<Mutex<CorrelationMap>>,
        event_tx: &mpsc::UnboundedSender<Event>,
    ) {
        match from_str::<IncomingMessage>(text) {
            Ok(IncomingMessage::Reply(reply)) => {
                let tx = correlation.lock().remove(&reply.id);

                if let Some(tx) = tx {
                    let _ = tx.send(Ok(reply));
                } else {
                    warn!(id = %reply.id, "Reply for unknown command");
                }
            }

            Ok(IncomingMessage::Event(event)) => {
                trace!(method = %event.method, "Event received");
                if event_tx.send(event).is_err() {
                    debug!("Event receiver dropped; discarding event");
                }
            }

            Err(e) => {
                warn!(error = %e, text = %text, "Failed to parse incoming frame");
            }
        }
    }

    /// Handles a send command from the client API.
    async fn handle_send_command(
        frame: CommandFrame,
        reply_tx: oneshot::Sender<Result<Reply>>,
        ws_write: &mut futures_util::stream::SplitSink<WsStream, Message>,
        correlation: &Arc<Mutex<CorrelationMap>>,
    ) {
        let command_id = frame.id;

        // Serialize frame
        let json = match to_string(&frame) {
            Ok(j) => j,
            Err(e) => {
                let _ = reply_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Store correlation before sending
        correlation.lock().insert(command_id, reply_tx);

        // Send over WebSocket
        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            // Remove correlation and notify caller
            if let Some(tx) = correlation.lock().remove(&command_id) {
                let _ = tx.send(Err(Error::connection(e.to_string())));
            }
            return;
        }

        trace!(%command_id, "Command sent");
    }

    /// Fails all pending commands with ConnectionClosed error.
    fn fail_pending_commands(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending commands on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
