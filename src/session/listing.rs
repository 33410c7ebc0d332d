//! Source listing and terminal presentation.
//!
//! Computes the context window around a target line and renders it the
//! way the prompt shows source: a `Showing:` header, a ` -> ` marker on
//! the target line, and right-aligned line numbers.
//!
//! All line numbers here are 1-indexed, matching what users type at the
//! prompt.

// ============================================================================
// Imports
// ============================================================================

use crate::protocol::ScriptInfo;

// ============================================================================
// Constants
// ============================================================================

/// ANSI sequence coloring the prompt (cyan).
pub const COLOR_PROMPT: &str = "\x1b[0;36m";

/// ANSI sequence coloring line numbers and script ids (green).
pub const COLOR_NUMBER: &str = "\x1b[0;32m";

/// ANSI reset sequence.
pub const COLOR_RESET: &str = "\x1b[0m";

/// Context lines shown above the target line.
const CONTEXT_BEFORE: usize = 5;

/// Distance from the window's first line to its last (inclusive span).
const WINDOW_SPAN: usize = 10;

/// Script URLs with this prefix are hidden from listings by default.
const INTERNAL_PREFIX: &str = "node:internal";

// ============================================================================
// SourceWindow
// ============================================================================

/// A contiguous run of source lines around a target line.
///
/// The window covers lines `from..=to`. It is empty when the target lies
/// beyond the end of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWindow<'a> {
    /// First displayed line (1-indexed, inclusive).
    pub from: usize,

    /// Last displayed line (1-indexed, inclusive).
    pub to: usize,

    /// Line the marker points at.
    pub target: usize,

    /// Text of lines `from..=to`, in order.
    lines: Vec<&'a str>,
}

impl<'a> SourceWindow<'a> {
    /// Returns the displayed lines in order.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Returns the number of displayed lines.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the window shows no lines.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ============================================================================
// Window Computation
// ============================================================================

/// Computes the context window around `target_line`.
///
/// The window starts [`CONTEXT_BEFORE`] lines above the target (clamped
/// to line 1) and spans [`WINDOW_SPAN`] lines downward (clamped to the
/// end of the source), showing at most 11 lines.
#[must_use]
pub fn window(source: &str, target_line: usize) -> SourceWindow<'_> {
    let all: Vec<&str> = source.split('\n').collect();
    let total = all.len();

    let from = target_line.saturating_sub(CONTEXT_BEFORE).max(1);
    let to = (from + WINDOW_SPAN).min(total);

    let lines = if to >= from {
        all[from - 1..to].to_vec()
    } else {
        Vec::new()
    };

    SourceWindow {
        from,
        to,
        target: target_line,
        lines,
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Renders a source window for the terminal.
///
/// Output shape:
///
/// ```text
/// Showing: file:///app/main.js:13
///        8:   function compute(n) {
///  ->   13:     return n * 2;
/// ```
///
/// With `color`, line numbers are wrapped in [`COLOR_NUMBER`].
#[must_use]
pub fn render(window: &SourceWindow<'_>, url: &str, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("Showing: {url}:{}\n", window.target));

    for (offset, text) in window.lines.iter().enumerate() {
        let line_number = window.from + offset;
        let marker = if line_number == window.target {
            " -> "
        } else {
            "    "
        };

        let number = format!("{line_number:>4}");
        if color {
            out.push_str(&format!(
                "{marker}{COLOR_NUMBER}{number}{COLOR_RESET}:   {text}\n"
            ));
        } else {
            out.push_str(&format!("{marker}{number}:   {text}\n"));
        }
    }

    out
}

/// Renders the script registry listing for the `sources` command.
///
/// Scripts whose URL starts with `node:internal` are hidden unless
/// `show_all` is set. Ids are right-aligned in a 6-column field.
#[must_use]
pub fn render_script_list(scripts: &[ScriptInfo], show_all: bool, color: bool) -> String {
    let mut out = String::new();

    for script in scripts {
        if !show_all && script.url.starts_with(INTERNAL_PREFIX) {
            continue;
        }

        let id = format!("{:>6}", script.script_id.as_str());
        if color {
            out.push_str(&format!("{COLOR_NUMBER}{id}: {COLOR_RESET}{}\n", script.url));
        } else {
            out.push_str(&format!("{id}: {}\n", script.url));
        }
    }

    out
}

/// Formats the interactive prompt.
#[must_use]
pub fn prompt(color: bool) -> String {
    if color {
        format!("{COLOR_PROMPT}(ndb){COLOR_RESET} ")
    } else {
        "(ndb) ".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
