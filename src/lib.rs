//! ndb - Minimal debugging client for V8 inspector endpoints.
//!
//! This library attaches to a JavaScript runtime started with
//! `--inspect` or `--inspect-brk` and drives it over the inspector's
//! WebSocket protocol.
//!
//! # Architecture
//!
//! The client follows the inspector's two-channel model:
//!
//! - **Commands (Rust)**: Sent with a sequence id, correlated with their
//!   reply by that id
//! - **Events (Runtime)**: Unsolicited notifications pushed by the
//!   runtime, dispatched to the session
//!
//! Key design principles:
//!
//! - One [`Session`] owns: discovery + WebSocket connection + event task
//! - Protocol uses `Domain.methodName` format (`Runtime.enable`)
//! - Scripts are tracked in a registry and resolved by URL suffix
//! - Pause reactions are data ([`PausePolicy`]), not hardwired behavior
//!
//! # Quick Start
//!
//! ```no_run
//! use ndb::{Result, Session, SessionOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Discover the runtime advertised on the inspector port.
//!     let session = Session::attach("127.0.0.1", 9229, SessionOptions::default()).await?;
//!
//!     // Scripts announced by the runtime land in the registry.
//!     for script in session.scripts() {
//!         println!("{:>6}: {}", script.script_id, script.url);
//!     }
//!
//!     // Show source context and plant a breakpoint.
//!     session.list_source("main.js", 13).await?;
//!     session.set_breakpoint("main.js", 13).await?;
//!
//!     session.close();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`discovery`] | HTTP metadata endpoint resolution |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Inspector message types |
//! | [`session`] | Session lifecycle: [`Session`], [`PausePolicy`] |
//! | [`transport`] | WebSocket transport layer (internal) |
//!
//! # Features
//!
//! - **Discovery**: Resolves the WebSocket endpoint from the `/json`
//!   metadata list
//! - **Correlation**: Replies matched to commands by id, out of order
//! - **Pause policies**: Configurable reactions when execution stops
//! - **Source windows**: Context listings around a target line

// ============================================================================
// Modules
// ============================================================================

/// HTTP metadata endpoint resolution.
///
/// Queries `http://host:port/json` and picks the first debuggable target.
pub mod discovery;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for protocol entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Inspector protocol message types.
///
/// Commands, replies, and events exchanged over the WebSocket.
pub mod protocol;

/// Session lifecycle and debugging workflow.
///
/// Use [`Session::attach`] to discover and attach in one step.
pub mod session;

/// WebSocket transport layer.
///
/// Internal module handling connection management and correlation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Session types
pub use session::{PauseAction, PausePolicy, ScriptRegistry, Session, SessionOptions, SessionState};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CommandId, ScriptId};

// Protocol types
pub use protocol::ScriptInfo;
