//! Wire message types for command frames and replies.
//!
//! Defines the JSON message format exchanged with the inspector endpoint:
//! outbound command frames, inbound replies, and the union of everything
//! the endpoint may push at us.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::CommandId;

use super::{Command, Event};

// ============================================================================
// CommandFrame
// ============================================================================

/// An outbound command frame.
///
/// # Format
///
/// ```json
/// {
///   "id": 3,
///   "method": "Debugger.getScriptSource",
///   "params": { "scriptId": "7" }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CommandFrame {
    /// Sequence identifier for reply correlation.
    pub id: CommandId,

    /// Command with method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl CommandFrame {
    /// Creates a new frame carrying `command` under sequence id `id`.
    #[inline]
    #[must_use]
    pub fn new(id: CommandId, command: Command) -> Self {
        Self { id, command }
    }
}

// ============================================================================
// Reply
// ============================================================================

/// An inbound reply to a previously sent command.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 3, "result": { "scriptSource": "..." } }
/// ```
///
/// Error:
/// ```json
/// { "id": 3, "error": { "code": -32601, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    /// Matches the `id` of the command this answers.
    pub id: CommandId,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error object (if failure).
    #[serde(default)]
    pub error: Option<ReplyError>,
}

impl Reply {
    /// Returns `true` if this reply carries no error object.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns `true` if this reply carries an error object.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning an error if the reply was one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the reply carried an error object.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            None => Ok(self.result.unwrap_or(Value::Null)),
            Some(err) => Err(Error::protocol(err.to_string())),
        }
    }

    /// Gets a string value from the result.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a u64 value from the result.
    ///
    /// Returns 0 if key not found or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_u64())
            .unwrap_or_default()
    }
}

// ============================================================================
// ReplyError
// ============================================================================

/// Error object carried by a failed reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyError {
    /// JSON-RPC style error code.
    pub code: i64,

    /// Human-readable error message.
    pub message: String,

    /// Optional extra error data.
    #[serde(default)]
    pub data: Option<Value>,
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

// ============================================================================
// IncomingMessage
// ============================================================================

/// Everything the endpoint may send us on the socket.
///
/// Replies carry an `id` matching a command we sent; events carry a
/// `method` and no `id`. The presence of `id` discriminates the two, so
/// the [`Reply`] arm must be tried first.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IncomingMessage {
    /// Reply to a command we sent.
    Reply(Reply),
    /// Unsolicited notification.
    Event(Event),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DebuggerCommand, Location, RuntimeCommand};

    #[test]
    fn test_frame_serialization_without_params() {
        let frame = CommandFrame::new(CommandId::new(0), Command::Runtime(RuntimeCommand::Enable));
        let json = serde_json::to_string(&frame).expect("serialize");
        assert_eq!(json, r#"{"id":0,"method":"Runtime.enable"}"#);
    }

    #[test]
    fn test_frame_serialization_with_params() {
        let frame = CommandFrame::new(
            CommandId::new(4),
            Command::Debugger(DebuggerCommand::SetBreakpoint {
                location: Location::new("7".into(), 13),
            }),
        );
        let json = serde_json::to_value(&frame).expect("serialize");

        assert_eq!(json["id"], 4);
        assert_eq!(json["method"], "Debugger.setBreakpoint");
        assert_eq!(json["params"]["location"]["scriptId"], "7");
        assert_eq!(json["params"]["location"]["lineNumber"], 13);
    }

    #[test]
    fn test_success_reply() {
        let json_str = r#"{"id": 3, "result": {"scriptSource": "const x = 1;\n"}}"#;

        let reply: Reply = serde_json::from_str(json_str).expect("parse");
        assert!(reply.is_success());
        assert!(!reply.is_error());
        assert_eq!(reply.id, CommandId::new(3));
        assert_eq!(reply.get_string("scriptSource"), "const x = 1;\n");
    }

    #[test]
    fn test_error_reply() {
        let json_str = r#"{"id": 5, "error": {"code": -32601, "message": "Method not found"}}"#;

        let reply: Reply = serde_json::from_str(json_str).expect("parse");
        assert!(reply.is_error());

        let err = reply.into_result().expect_err("should be an error");
        assert!(err.to_string().contains("Method not found"));
        assert!(err.to_string().contains("-32601"));
    }

    #[test]
    fn test_into_result_defaults_to_null() {
        let json_str = r#"{"id": 1}"#;

        let reply: Reply = serde_json::from_str(json_str).expect("parse");
        let value = reply.into_result().expect("should succeed");
        assert!(value.is_null());
    }

    #[test]
    fn test_incoming_reply_discrimination() {
        let json_str = r#"{"id": 2, "result": {}}"#;

        let message: IncomingMessage = serde_json::from_str(json_str).expect("parse");
        match message {
            IncomingMessage::Reply(reply) => assert_eq!(reply.id, CommandId::new(2)),
            IncomingMessage::Event(_) => panic!("expected a reply"),
        }
    }

    #[test]
    fn test_incoming_event_discrimination() {
        let json_str = r#"{
            "method": "Debugger.scriptParsed",
            "params": {"scriptId": "7", "url": "file:///app/main.js"}
        }"#;

        let message: IncomingMessage = serde_json::from_str(json_str).expect("parse");
        match message {
            IncomingMessage::Event(event) => assert_eq!(event.method, "Debugger.scriptParsed"),
            IncomingMessage::Reply(_) => panic!("expected an event"),
        }
    }

    #[test]
    fn test_reply_get_u64() {
        let json_str = r#"{"id": 9, "result": {"lineNumber": 12}}"#;

        let reply: Reply = serde_json::from_str(json_str).expect("parse");
        assert_eq!(reply.get_u64("lineNumber"), 12);
        assert_eq!(reply.get_u64("missing"), 0);
    }
}
