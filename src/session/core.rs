//! Debugging session over an inspector connection.
//!
//! The [`Session`] struct owns the attach workflow end to end: endpoint
//! discovery, the WebSocket connection, the enable choreography, and the
//! event task that keeps the script registry current and reacts to pauses.
//!
//! # Example
//!
//! ```no_run
//! use ndb::{Session, SessionOptions};
//!
//! # async fn example() -> ndb::Result<()> {
//! let session = Session::attach("127.0.0.1", 9229, SessionOptions::default()).await?;
//! session.list_source("main.js", 13).await?;
//! session.close();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::discovery;
use crate::error::{Error, Result};
use crate::identifiers::CommandId;
use crate::protocol::{
    Command, CommandFrame, DebuggerCommand, Location, ParsedEvent, Reply, RuntimeCommand,
    ScriptInfo,
};
use crate::transport::{Connection, EventReceiver};

use super::listing;
use super::policy::{PauseAction, PausePolicy};
use super::registry::ScriptRegistry;

// ============================================================================
// SessionState
// ============================================================================

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Socket open, enable choreography in progress.
    Enabling,
    /// Choreography acknowledged; commands and events flow freely.
    Ready,
    /// Connection gone; no further commands will succeed.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Enabling => "enabling",
            Self::Ready => "ready",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SessionOptions
// ============================================================================

/// Configuration for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Actions to run when the runtime pauses.
    pub policy: PausePolicy,

    /// Colorize terminal output.
    pub color: bool,
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the session.
struct SessionInner {
    /// Transport handle shared with the event task.
    connection: Connection,

    /// Next command sequence id, monotonically increasing from 0.
    next_id: AtomicU64,

    /// Scripts announced by the runtime.
    registry: ScriptRegistry,

    /// Actions to run when the runtime pauses.
    policy: PausePolicy,

    /// Colorize terminal output.
    color: bool,

    /// Current lifecycle state.
    state: Mutex<SessionState>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        // Last handle gone: the connection loop and socket must not
        // outlive the session.
        self.connection.shutdown();
    }
}

// ============================================================================
// Session
// ============================================================================

/// Debugging session attached to a remote runtime.
///
/// The session is responsible for:
/// - Assigning sequence ids to outgoing commands
/// - Running the enable choreography on attach
/// - Tracking announced scripts in the registry
/// - Reacting to pauses per the configured [`PausePolicy`]
///
/// Cloning is cheap; clones share the same underlying session. The
/// connection shuts down when the last clone is dropped, or earlier
/// via [`Session::close`].
#[derive(Clone)]
pub struct Session {
    /// Shared inner state.
    inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("script_count", &self.script_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Session - Public API
// ============================================================================

impl Session {
    /// Discovers the runtime at `host:port` and attaches to it.
    ///
    /// Combines [`discovery::resolve`] with [`Session::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if no debuggable target is advertised,
    /// or any error [`Session::connect`] can produce.
    pub async fn attach(host: &str, port: u16, options: SessionOptions) -> Result<Self> {
        let endpoint = discovery::resolve(host, port).await?;
        Self::connect(&endpoint, options).await
    }

    /// Attaches to a known WebSocket endpoint.
    ///
    /// Establishes the connection, spawns the event task, then runs the
    /// enable choreography: `Runtime.enable`, `Debugger.enable`, and
    /// `Runtime.runIfWaitingForDebugger`, each acknowledged before the
    /// next is sent. Script announcements replayed during the
    /// choreography may still be in flight when this returns; they are
    /// recorded in arrival order, always ahead of any later pause
    /// event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`] if the connection fails, or
    /// [`Error::Protocol`] if the runtime rejects an enable command.
    pub async fn connect(endpoint: &Url, options: SessionOptions) -> Result<Self> {
        info!(%endpoint, "Attaching to inspector endpoint");

        let (connection, events) = Connection::connect(endpoint).await?;

        let inner = Arc::new(SessionInner {
            connection,
            next_id: AtomicU64::new(0),
            registry: ScriptRegistry::new(),
            policy: options.policy,
            color: options.color,
            state: Mutex::new(SessionState::Enabling),
        });
        let session = Self { inner };

        // The runtime starts replaying scriptParsed notifications while
        // the enable replies are still in flight, so the event task must
        // be consuming before the choreography starts.
        tokio::spawn(Self::run_event_task(Arc::downgrade(&session.inner), events));

        if let Err(e) = session.enable().await {
            session.close();
            return Err(e);
        }

        session.set_state(SessionState::Ready);
        info!("Session ready");
        Ok(session)
    }

    /// Shows the source window around `filename:line`.
    ///
    /// Resolves the script by URL suffix, fetches its source with
    /// `Debugger.getScriptSource`, and prints the context window to
    /// stdout.
    ///
    /// # Errors
    ///
    /// - [`Error::ScriptNotFound`] if no registered script matches
    /// - [`Error::Protocol`] if the reply fails or lacks the source text
    pub async fn list_source(&self, filename: &str, line: usize) -> Result<()> {
        let Some(script) = self.inner.registry.find_by_url_suffix(filename) else {
            warn!(filename, "No registered script matches");
            return Err(Error::script_not_found(filename));
        };

        let reply = self
            .execute(Command::Debugger(DebuggerCommand::GetScriptSource {
                script_id: script.script_id.clone(),
            }))
            .await?;
        let result = reply.into_result()?;

        let Some(source) = result.get("scriptSource").and_then(Value::as_str) else {
            return Err(Error::protocol("getScriptSource reply lacks scriptSource"));
        };

        let window = listing::window(source, line);
        print!("{}", listing::render(&window, &script.url, self.inner.color));
        Ok(())
    }

    /// Sets a breakpoint at `filename:line`.
    ///
    /// Resolves the script by URL suffix and sends
    /// `Debugger.setBreakpoint`. The line number is passed to the runtime
    /// verbatim.
    ///
    /// # Errors
    ///
    /// - [`Error::ScriptNotFound`] if no registered script matches
    /// - [`Error::Protocol`] if `line` does not fit the wire format or
    ///   the runtime rejects the breakpoint
    pub async fn set_breakpoint(&self, filename: &str, line: usize) -> Result<()> {
        let Ok(line_number) = u32::try_from(line) else {
            return Err(Error::protocol(format!(
                "line {line} exceeds the protocol's line number range"
            )));
        };

        let Some(script) = self.inner.registry.find_by_url_suffix(filename) else {
            warn!(filename, "No registered script matches");
            return Err(Error::script_not_found(filename));
        };

        let reply = self
            .execute(Command::Debugger(DebuggerCommand::SetBreakpoint {
                location: Location::new(script.script_id.clone(), line_number),
            }))
            .await?;
        let result = reply.into_result()?;

        let breakpoint_id = result
            .get("breakpointId")
            .and_then(Value::as_str)
            .unwrap_or_default();
        info!(breakpoint_id, filename, line, "Breakpoint set");
        Ok(())
    }

    /// Returns all announced scripts in arrival order.
    #[must_use]
    pub fn scripts(&self) -> Vec<ScriptInfo> {
        self.inner.registry.snapshot()
    }

    /// Returns the number of announced scripts.
    #[inline]
    #[must_use]
    pub fn script_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.inner.state.lock()
    }

    /// Closes the session.
    ///
    /// Pending commands fail with [`Error::ConnectionClosed`].
    pub fn close(&self) {
        self.set_state(SessionState::Closed);
        self.inner.connection.shutdown();
    }
}

// ============================================================================
// Session - Internal API
// ============================================================================

impl Session {
    /// Runs the enable choreography, one acknowledged command at a time.
    async fn enable(&self) -> Result<()> {
        debug!("Starting enable choreography");

        self.execute(Command::Runtime(RuntimeCommand::Enable))
            .await?
            .into_result()?;
        self.execute(Command::Debugger(DebuggerCommand::Enable))
            .await?
            .into_result()?;
        self.execute(Command::Runtime(RuntimeCommand::RunIfWaitingForDebugger))
            .await?
            .into_result()?;

        Ok(())
    }

    /// Sends a command under a fresh sequence id and returns its reply.
    ///
    /// Verifies that the reply carries the command's id.
    async fn execute(&self, command: Command) -> Result<Reply> {
        let id = CommandId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let method = command.method();
        debug!(%id, method, "Sending command");

        let reply = self
            .inner
            .connection
            .send(CommandFrame::new(id, command))
            .await?;

        if reply.id != id {
            return Err(Error::protocol(format!(
                "reply id {} does not match command id {id}",
                reply.id
            )));
        }

        Ok(reply)
    }

    /// Consumes runtime events until the connection ends.
    ///
    /// Holds the session weakly: once the last [`Session`] handle is
    /// dropped, the task stops instead of keeping the connection alive.
    async fn run_event_task(inner: Weak<SessionInner>, mut events: EventReceiver) {
        while let Some(event) = events.recv().await {
            let Some(session) = inner.upgrade().map(|strong| Session { inner: strong }) else {
                debug!("Session dropped; event task exiting");
                return;
            };

            match event.parse() {
                ParsedEvent::ScriptParsed(info) => {
                    debug!(script_id = %info.script_id, url = %info.url, "Script parsed");
                    session.inner.registry.append(info);
                }

                ParsedEvent::Paused { reason } => {
                    info!(reason, "Execution paused");
                    session.run_pause_policy().await;
                }

                ParsedEvent::Resumed => {
                    debug!("Execution resumed");
                }

                ParsedEvent::Unknown { method, .. } => {
                    debug!(method, "Ignoring unhandled event");
                }
            }
        }

        if let Some(session) = inner.upgrade().map(|strong| Session { inner: strong }) {
            session.set_state(SessionState::Closed);
        }
        debug!("Event task terminated");
    }

    /// Works through the pause policy, echoing each action at the prompt.
    ///
    /// A failed action aborts the remaining ones; pause handling must
    /// never take the session down.
    async fn run_pause_policy(&self) {
        for action in self.inner.policy.actions() {
            println!("{}{action}", listing::prompt(self.inner.color));

            let outcome = match action {
                PauseAction::ListSource { filename, line } => {
                    self.list_source(filename, *line).await
                }
                PauseAction::SetBreakpoint { filename, line } => {
                    self.set_breakpoint(filename, *line).await
                }
            };

            if let Err(e) = outcome {
                warn!(error = %e, %action, "Pause action failed; skipping remaining actions");
                break;
            }
        }
    }

    /// Records a lifecycle state change.
    fn set_state(&self, state: SessionState) {
        *self.inner.state.lock() = state;
        debug!(%state, "Session state changed");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use serde_json::json;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::time::timeout;
    use tokio_tungstenite::WebSocketStream;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message;

    async fn bind_server() -> (TcpListener, Url) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind server");
        let addr = listener.local_addr().expect("local addr");
        let url = Url::parse(&format!("ws://{addr}")).expect("server url");
        (listener, url)
    }

    async fn accept_ws(listener: TcpListener) -> WebSocketStream<TcpStream> {
        let (stream, _) = listener.accept().await.expect("accept");
        accept_async(stream).await.expect("websocket handshake")
    }

    async fn read_frame(ws: &mut WebSocketStream<TcpStream>) -> Value {
        loop {
            match ws.next().await.expect("stream open").expect("frame") {
                Message::Text(text) => return serde_json::from_str(&text).expect("frame json"),
                Message::Close(_) => panic!("connection closed while expecting a frame"),
                _ => {}
            }
        }
    }

    async fn send_json(ws: &mut WebSocketStream<TcpStream>, value: Value) {
        ws.send(Message::Text(value.to_string().into()))
            .await
            .expect("send frame");
    }

    /// Acknowledges the three enable commands, returning their methods
    /// and ids in arrival order.
    async fn ack_enable_choreography(
        ws: &mut WebSocketStream<TcpStream>,
    ) -> (Vec<String>, Vec<u64>) {
        let mut methods = Vec::new();
        let mut ids = Vec::new();

        for _ in 0..3 {
            let frame = read_frame(ws).await;
            let id = frame["id"].as_u64().expect("integer id");
            methods.push(frame["method"].as_str().expect("method").to_string());
            ids.push(id);
            send_json(ws, json!({ "id": id, "result": {} })).await;
        }

        (methods, ids)
    }

    #[tokio::test]
    async fn test_connect_runs_enable_choreography_in_order() {
        let (listener, url) = bind_server().await;
        let server = tokio::spawn(async move {
            let mut ws = accept_ws(listener).await;

            let (methods, ids) = ack_enable_choreography(&mut ws).await;
            assert_eq!(
                methods,
                [
                    "Runtime.enable",
                    "Debugger.enable",
                    "Runtime.runIfWaitingForDebugger",
                ]
            );
            assert_eq!(ids, [0, 1, 2]);

            // Hold the socket open until the client closes it, so the
            // session stays in Ready for the assertion below.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let session = Session::connect(&url, SessionOptions::default())
            .await
            .expect("connect");
        assert_eq!(session.state(), SessionState::Ready);

        session.close();
        server.await.expect("server task");
    }

    #[tokio::test]
    async fn test_connect_fails_when_enable_is_rejected() {
        let (listener, url) = bind_server().await;
        let server = tokio::spawn(async move {
            let mut ws = accept_ws(listener).await;

            let frame = read_frame(&mut ws).await;
            let id = frame["id"].as_u64().expect("id");
            send_json(
                &mut ws,
                json!({
                    "id": id,
                    "error": { "code": -32000, "message": "enable refused" }
                }),
            )
            .await;

            // Client closes the socket after the failure.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let err = Session::connect(&url, SessionOptions::default())
            .await
            .expect_err("connect should fail");
        assert!(err.is_protocol_error());
        assert!(err.to_string().contains("enable refused"));

        server.await.expect("server task");
    }

    #[tokio::test]
    async fn test_pause_policy_round_trips_in_order() {
        let source = (1..=30)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");

        let (listener, url) = bind_server().await;
        let server = tokio::spawn(async move {
            let mut ws = accept_ws(listener).await;
            ack_enable_choreography(&mut ws).await;

            // Announce a script, then pause.
            send_json(
                &mut ws,
                json!({
                    "method": "Debugger.scriptParsed",
                    "params": { "scriptId": "7", "url": "file:///app/main.js" }
                }),
            )
            .await;
            send_json(
                &mut ws,
                json!({
                    "method": "Debugger.paused",
                    "params": { "reason": "Break on start", "callFrames": [] }
                }),
            )
            .await;

            // First policy round-trip: the source fetch.
            let frame = read_frame(&mut ws).await;
            assert_eq!(frame["method"], "Debugger.getScriptSource");
            assert_eq!(frame["params"]["scriptId"], "7");
            let source_id = frame["id"].as_u64().expect("id");

            // The breakpoint command must wait for this reply.
            let probe = timeout(Duration::from_millis(200), ws.next()).await;
            assert!(
                probe.is_err(),
                "setBreakpoint was sent before the getScriptSource reply"
            );

            send_json(
                &mut ws,
                json!({ "id": source_id, "result": { "scriptSource": source } }),
            )
            .await;

            // Second round-trip: the breakpoint.
            let frame = read_frame(&mut ws).await;
            assert_eq!(frame["method"], "Debugger.setBreakpoint");
            assert_eq!(frame["params"]["location"]["scriptId"], "7");
            assert_eq!(frame["params"]["location"]["lineNumber"], 13);
            let breakpoint_id = frame["id"].as_u64().expect("id");

            send_json(
                &mut ws,
                json!({
                    "id": breakpoint_id,
                    "result": {
                        "breakpointId": "4:13:0:7",
                        "actualLocation": { "scriptId": "7", "lineNumber": 13 }
                    }
                }),
            )
            .await;
        });

        let session = Session::connect(&url, SessionOptions::default())
            .await
            .expect("connect");

        // The server task completes once the whole pause flow ran.
        server.await.expect("server task");

        let scripts = session.scripts();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].script_id.as_str(), "7");
        assert_eq!(scripts[0].url, "file:///app/main.js");

        session.close();
    }

    #[tokio::test]
    async fn test_pause_with_unknown_script_sends_nothing() {
        let (listener, url) = bind_server().await;
        let server = tokio::spawn(async move {
            let mut ws = accept_ws(listener).await;
            ack_enable_choreography(&mut ws).await;

            // Pause without any script announcement: the policy targets
            // main.js, which cannot be resolved, so nothing may be sent.
            send_json(
                &mut ws,
                json!({ "method": "Debugger.paused", "params": { "reason": "other" } }),
            )
            .await;

            let probe = timeout(Duration::from_millis(300), ws.next()).await;
            assert!(probe.is_err(), "no command should follow a failed lookup");
        });

        let session = Session::connect(&url, SessionOptions::default())
            .await
            .expect("connect");
        server.await.expect("server task");

        // The lookup failure surfaces on the API as well.
        let err = session
            .list_source("main.js", 13)
            .await
            .expect_err("lookup should fail");
        assert!(matches!(err, Error::ScriptNotFound { .. }));

        // Server dropped the socket; the session winds down.
        for _ in 0..50 {
            if session.state() == SessionState::Closed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_ignore_policy_lets_pauses_pass() {
        let (listener, url) = bind_server().await;
        let server = tokio::spawn(async move {
            let mut ws = accept_ws(listener).await;
            ack_enable_choreography(&mut ws).await;

            send_json(
                &mut ws,
                json!({
                    "method": "Debugger.scriptParsed",
                    "params": { "scriptId": "7", "url": "file:///app/main.js" }
                }),
            )
            .await;
            send_json(
                &mut ws,
                json!({ "method": "Debugger.paused", "params": { "reason": "other" } }),
            )
            .await;

            let probe = timeout(Duration::from_millis(300), ws.next()).await;
            assert!(probe.is_err(), "an empty policy must not send commands");
        });

        let options = SessionOptions {
            policy: PausePolicy::ignore(),
            color: false,
        };
        let session = Session::connect(&url, options).await.expect("connect");
        server.await.expect("server task");

        assert_eq!(session.script_count(), 1);
        session.close();
    }

    #[tokio::test]
    async fn test_dropping_last_handle_closes_the_connection() {
        let (listener, url) = bind_server().await;
        let server = tokio::spawn(async move {
            let mut ws = accept_ws(listener).await;
            ack_enable_choreography(&mut ws).await;

            // The socket must wind down once the last handle is gone,
            // with no explicit close() call.
            let teardown = timeout(Duration::from_secs(1), async {
                while let Some(Ok(message)) = ws.next().await {
                    if matches!(message, Message::Close(_)) {
                        break;
                    }
                }
            })
            .await;
            assert!(
                teardown.is_ok(),
                "socket stayed open after the session was dropped"
            );
        });

        let session = Session::connect(&url, SessionOptions::default())
            .await
            .expect("connect");
        assert_eq!(session.state(), SessionState::Ready);
        drop(session);

        server.await.expect("server task");
    }

    #[tokio::test]
    async fn test_break_rejects_line_beyond_wire_range() {
        let (listener, url) = bind_server().await;
        let server = tokio::spawn(async move {
            let mut ws = accept_ws(listener).await;
            ack_enable_choreography(&mut ws).await;

            // The bad line is rejected client-side, before the lookup.
            let probe = timeout(Duration::from_millis(200), ws.next()).await;
            assert!(probe.is_err(), "an out-of-range line must not reach the wire");
        });

        let session = Session::connect(&url, SessionOptions::default())
            .await
            .expect("connect");

        let err = session
            .set_breakpoint("main.js", usize::MAX)
            .await
            .expect_err("line should be rejected");
        assert!(err.is_protocol_error());
        assert!(err.to_string().contains("line"));

        server.await.expect("server task");
        session.close();
    }

    #[test]
    fn test_session_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<Session>();
    }

    #[test]
    fn test_session_is_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<Session>();
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Enabling.to_string(), "enabling");
        assert_eq!(SessionState::Ready.to_string(), "ready");
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }
}
