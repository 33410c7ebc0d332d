//! Type-safe identifiers for protocol entities.
//!
//! Newtype wrappers prevent mixing incompatible IDs at compile time.
//!
//! | Type | Wire representation | Assigned by |
//! |------|---------------------|-------------|
//! | [`CommandId`] | integer | the session, monotonically from 0 |
//! | [`ScriptId`] | string | the runtime (opaque to us) |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// CommandId
// ============================================================================

/// Sequence identifier of an outbound command.
///
/// Assigned by the session counter, monotonically increasing from 0,
/// unique for the lifetime of the session, never reused. Inbound replies
/// carry the id of the command they answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    /// Wraps a raw sequence number.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw sequence number.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// ScriptId
// ============================================================================

/// Opaque identifier of a parsed script, as reported by the runtime.
///
/// The protocol sends these as strings (e.g. `"7"`); the client never
/// interprets their content, only passes them back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(String);

impl ScriptId {
    /// Wraps a raw script identifier.
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw identifier.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for ScriptId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for ScriptId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

// ============================================================================
// Tests
// ============================================================================
