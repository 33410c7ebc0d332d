//! Inspector protocol message types.
//!
//! This module defines the JSON message format spoken over the WebSocket
//! between this client and the remote runtime.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`CommandFrame`] | Client → Runtime | Command request |
//! | [`Reply`] | Runtime → Client | Command reply, correlated by `id` |
//! | [`Event`] | Runtime → Client | Unsolicited notification |
//!
//! # Command Naming
//!
//! Commands and events follow the `Domain.methodName` format:
//!
//! - `Runtime.enable`
//! - `Debugger.getScriptSource`
//! - `Debugger.scriptParsed`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions by domain |
//! | `event` | Event types and typed parsing |
//! | `message` | Frame, reply, and incoming-union types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by domain.
pub mod command;

/// Event message types.
pub mod event;

/// Wire message types for command frames and replies.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, DebuggerCommand, Location, RuntimeCommand};
pub use event::{Event, ParsedEvent, ScriptInfo};
pub use message::{CommandFrame, IncomingMessage, Reply, ReplyError};
