//! Debugging session module.
//!
//! This module provides the main entry point for driving a remote
//! JavaScript runtime through its inspector endpoint.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Session`] | Attached debugging session |
//! | [`SessionOptions`] | Attach-time configuration |
//! | [`SessionState`] | Session lifecycle state |
//! | [`PausePolicy`] | Reactions to execution pauses |
//! | [`ScriptRegistry`] | Announced-script lookup table |
//!
//! # Example
//!
//! ```no_run
//! use ndb::{Session, SessionOptions};
//!
//! # async fn example() -> ndb::Result<()> {
//! let session = Session::attach("127.0.0.1", 9229, SessionOptions::default()).await?;
//!
//! for script in session.scripts() {
//!     println!("{}: {}", script.script_id, script.url);
//! }
//!
//! session.set_breakpoint("main.js", 13).await?;
//! session.close();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Core session implementation.
pub mod core;

/// Source windows, script listings, and prompt formatting.
pub mod listing;

/// Pause reaction policies.
pub mod policy;

/// Registry of scripts announced by the runtime.
pub mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{Session, SessionOptions, SessionState};
pub use policy::{PauseAction, PausePolicy};
pub use registry::ScriptRegistry;
