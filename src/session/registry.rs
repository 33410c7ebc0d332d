//! Script registry.
//!
//! Accumulates the scripts announced via `Debugger.scriptParsed` for the
//! lifetime of a session. The runtime replays already-compiled scripts
//! right after `Debugger.enable`, so the registry fills up during the
//! enable choreography and keeps growing as lazy compilation proceeds.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;

use crate::protocol::ScriptInfo;

// ============================================================================
// ScriptRegistry
// ============================================================================

/// Append-only store of announced scripts.
///
/// Scripts are kept in arrival order. Lookups scan that order and return
/// the first match, mirroring how the runtime announces its own entry
/// script before library code.
///
/// # Thread Safety
///
/// All methods take `&self`; the registry is shared between the session
/// API and the event task.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    /// Announced scripts in arrival order.
    scripts: Mutex<Vec<ScriptInfo>>,
}

impl ScriptRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a newly announced script.
    pub fn append(&self, info: ScriptInfo) {
        self.scripts.lock().push(info);
    }

    /// Finds the first script whose URL ends with `filename`.
    ///
    /// This is a plain suffix match: `"main.js"` matches
    /// `"file:///app/main.js"`, and also `"domain.js"`. Pass as much of
    /// the path as needed to disambiguate.
    #[must_use]
    pub fn find_by_url_suffix(&self, filename: &str) -> Option<ScriptInfo> {
        self.scripts
            .lock()
            .iter()
            .find(|script| script.url.ends_with(filename))
            .cloned()
    }

    /// Returns all announced scripts in arrival order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ScriptInfo> {
        self.scripts.lock().clone()
    }

    /// Returns the number of announced scripts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.lock().len()
    }

    /// Returns `true` if no script has been announced yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.lock().is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
