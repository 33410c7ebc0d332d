//! Pause reaction policy.
//!
//! When the runtime reports `Debugger.paused`, the session works through
//! a configured sequence of actions, one blocking round-trip at a time.
//! The default policy reproduces the classic first-pause workflow: show
//! the source around `main.js:13`, then pin a breakpoint there.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// File targeted by the default policy.
pub const DEFAULT_FILE: &str = "main.js";

/// Line targeted by the default policy.
pub const DEFAULT_LINE: usize = 13;

// ============================================================================
// PauseAction
// ============================================================================

/// One step of a pause policy.
///
/// Actions display as the prompt command they stand in for, so the
/// session can echo them as if a user had typed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseAction {
    /// Show the source window around `filename:line`.
    ListSource {
        /// File name, suffix-matched against script URLs.
        filename: String,
        /// Target line (1-indexed).
        line: usize,
    },

    /// Set a breakpoint at `filename:line`.
    SetBreakpoint {
        /// File name, suffix-matched against script URLs.
        filename: String,
        /// Breakpoint line, passed to the runtime verbatim.
        line: usize,
    },
}

impl PauseAction {
    /// Creates a source listing action.
    #[inline]
    #[must_use]
    pub fn list(filename: impl Into<String>, line: usize) -> Self {
        Self::ListSource {
            filename: filename.into(),
            line,
        }
    }

    /// Creates a breakpoint action.
    #[inline]
    #[must_use]
    pub fn breakpoint(filename: impl Into<String>, line: usize) -> Self {
        Self::SetBreakpoint {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for PauseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListSource { filename, line } => write!(f, "list {filename}:{line}"),
            Self::SetBreakpoint { filename, line } => write!(f, "breakpoint {filename}:{line}"),
        }
    }
}

// ============================================================================
// PausePolicy
// ============================================================================

/// Ordered actions to run when the runtime pauses.
///
/// An empty policy ignores pauses entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PausePolicy {
    /// Actions in execution order.
    actions: Vec<PauseAction>,
}

impl PausePolicy {
    /// Creates a policy from an action sequence.
    #[inline]
    #[must_use]
    pub fn new(actions: Vec<PauseAction>) -> Self {
        Self { actions }
    }

    /// Creates a policy that ignores pauses.
    #[inline]
    #[must_use]
    pub fn ignore() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the actions in execution order.
    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[PauseAction] {
        &self.actions
    }

    /// Returns `true` if the policy does nothing on pause.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for PausePolicy {
    /// List then break at `main.js:13`.
    fn default() -> Self {
        Self::new(vec![
            PauseAction::list(DEFAULT_FILE, DEFAULT_LINE),
            PauseAction::breakpoint(DEFAULT_FILE, DEFAULT_LINE),
        ])
    }
}

// ============================================================================
// Tests
// ============================================================================
