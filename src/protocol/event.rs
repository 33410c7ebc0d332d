//! Event message types.
//!
//! Events are unsolicited notifications pushed by the runtime when
//! debugger activity occurs. They carry no `id` and never expect a reply.
//!
//! # Event Types
//!
//! | Domain | Events |
//! |--------|--------|
//! | `Debugger` | `scriptParsed`, `paused`, `resumed` |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::ScriptId;

// ============================================================================
// Event
// ============================================================================

/// An event notification from the runtime.
///
/// # Format
///
/// ```json
/// {
///   "method": "Debugger.scriptParsed",
///   "params": { "scriptId": "7", "url": "file:///app/main.js" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Returns the domain name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event { method: "Debugger.paused".into(), .. };
    /// assert_eq!(event.domain(), "Debugger");
    /// ```
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }

    /// Returns the event name from the method.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let event = Event { method: "Debugger.paused".into(), .. };
    /// assert_eq!(event.event_name(), "paused");
    /// ```
    #[inline]
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        self.parse_internal()
    }
}

// ============================================================================
// ScriptInfo
// ============================================================================

/// Metadata of a compiled script, as reported by `Debugger.scriptParsed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInfo {
    /// Runtime-assigned script identifier.
    pub script_id: ScriptId,

    /// Source URL of the script. May be empty for anonymous scripts.
    pub url: String,
}

impl ScriptInfo {
    /// Creates a new script record.
    #[inline]
    #[must_use]
    pub fn new(script_id: ScriptId, url: impl Into<String>) -> Self {
        Self {
            script_id,
            url: url.into(),
        }
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone)]
pub enum ParsedEvent {
    /// The runtime compiled a script.
    ScriptParsed(ScriptInfo),

    /// Execution paused (breakpoint, `--inspect-brk` start, debugger statement).
    Paused {
        /// Pause reason reported by the runtime.
        reason: String,
    },

    /// Execution resumed.
    Resumed,

    /// Unknown event type.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Event Parsing Implementation
// ============================================================================

impl Event {
    /// Internal parsing implementation.
    fn parse_internal(&self) -> ParsedEvent {
        match self.method.as_str() {
            "Debugger.scriptParsed" => ParsedEvent::ScriptParsed(ScriptInfo {
                script_id: ScriptId::new(self.get_string("scriptId")),
                url: self.get_string("url"),
            }),

            "Debugger.paused" => ParsedEvent::Paused {
                reason: self.get_string_or("reason", "other"),
            },

            "Debugger.resumed" => ParsedEvent::Resumed,

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
                params: self.params.clone(),
            },
        }
    }

    /// Gets a string from params.
    #[inline]
    fn get_string(&self, key: &str) -> String {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a string from params with default.
    #[inline]
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.params
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
            .to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_parsed_parsing() {
        let json_str = r#"{
            "method": "Debugger.scriptParsed",
            "params": {
                "scriptId": "7",
                "url": "file:///app/main.js",
                "startLine": 0,
                "endLine": 41
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        assert_eq!(event.domain(), "Debugger");
        assert_eq!(event.event_name(), "scriptParsed");

        match event.parse() {
            ParsedEvent::ScriptParsed(info) => {
                assert_eq!(info.script_id.as_str(), "7");
                assert_eq!(info.url, "file:///app/main.js");
            }
            _ => panic!("unexpected parsed event type"),
        }
    }

    #[test]
    fn test_paused_parsing() {
        let json_str = r#"{
            "method": "Debugger.paused",
            "params": {
                "reason": "Break on start",
                "callFrames": []
            }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::Paused { reason } => assert_eq!(reason, "Break on start"),
            _ => panic!("unexpected parsed event type"),
        }
    }

    #[test]
    fn test_paused_without_reason_defaults() {
        let json_str = r#"{"method": "Debugger.paused", "params": {}}"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::Paused { reason } => assert_eq!(reason, "other"),
            _ => panic!("unexpected parsed event type"),
        }
    }

    #[test]
    fn test_resumed_parsing() {
        let json_str = r#"{"method": "Debugger.resumed"}"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        assert!(matches!(event.parse(), ParsedEvent::Resumed));
    }

    #[test]
    fn test_unknown_event() {
        let json_str = r#"{
            "method": "Runtime.consoleAPICalled",
            "params": { "type": "log" }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::Unknown { method, .. } => {
                assert_eq!(method, "Runtime.consoleAPICalled");
            }
            _ => panic!("expected Unknown variant"),
        }
    }

    #[test]
    fn test_anonymous_script_has_empty_url() {
        let json_str = r#"{
            "method": "Debugger.scriptParsed",
            "params": { "scriptId": "12" }
        }"#;

        let event: Event = serde_json::from_str(json_str).expect("parse event");
        match event.parse() {
            ParsedEvent::ScriptParsed(info) => {
                assert_eq!(info.script_id.as_str(), "12");
                assert!(info.url.is_empty());
            }
            _ => panic!("unexpected parsed event type"),
        }
    }
}
