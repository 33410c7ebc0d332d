//! Command definitions organized by protocol domain.
//!
//! Commands follow the `Domain.methodName` format of the V8 Inspector
//! protocol and serialize as `{"method": ..., "params": ...}` objects.
//! Parameterless commands omit the `params` key entirely.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Runtime` | `enable`, `runIfWaitingForDebugger` |
//! | `Debugger` | `enable`, `getScriptSource`, `setBreakpoint` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::ScriptId;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
    /// Debugger domain commands.
    Debugger(DebuggerCommand),
}

impl Command {
    /// Returns the wire method name of this command.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Runtime(RuntimeCommand::Enable) => "Runtime.enable",
            Self::Runtime(RuntimeCommand::RunIfWaitingForDebugger) => {
                "Runtime.runIfWaitingForDebugger"
            }
            Self::Debugger(DebuggerCommand::Enable) => "Debugger.enable",
            Self::Debugger(DebuggerCommand::GetScriptSource { .. }) => "Debugger.getScriptSource",
            Self::Debugger(DebuggerCommand::SetBreakpoint { .. }) => "Debugger.setBreakpoint",
        }
    }
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Runtime domain commands for execution control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Enable Runtime domain notifications.
    #[serde(rename = "Runtime.enable")]
    Enable,

    /// Release a runtime started with `--inspect-brk` from its initial pause.
    #[serde(rename = "Runtime.runIfWaitingForDebugger")]
    RunIfWaitingForDebugger,
}

// ============================================================================
// Debugger Commands
// ============================================================================

/// Debugger domain commands for source inspection and breakpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum DebuggerCommand {
    /// Enable Debugger domain notifications.
    ///
    /// The runtime replays `Debugger.scriptParsed` for every script it has
    /// already compiled once this command is acknowledged.
    #[serde(rename = "Debugger.enable")]
    Enable,

    /// Fetch the full source text of a parsed script.
    #[serde(rename = "Debugger.getScriptSource")]
    GetScriptSource {
        /// Script to fetch.
        #[serde(rename = "scriptId")]
        script_id: ScriptId,
    },

    /// Set a breakpoint at a script location.
    #[serde(rename = "Debugger.setBreakpoint")]
    SetBreakpoint {
        /// Where to place the breakpoint.
        location: Location,
    },
}

// ============================================================================
// Location
// ============================================================================

/// A position inside a parsed script, used for breakpoint placement.
///
/// Line numbers are passed to the runtime verbatim; callers decide the
/// indexing convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Script containing the location.
    #[serde(rename = "scriptId")]
    pub script_id: ScriptId,

    /// Line number within the script.
    #[serde(rename = "lineNumber")]
    pub line_number: u32,
}

impl Location {
    /// Creates a new location.
    #[inline]
    #[must_use]
    pub fn new(script_id: ScriptId, line_number: u32) -> Self {
        Self {
            script_id,
            line_number,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_enable_omits_params() {
        let cmd = RuntimeCommand::Enable;
        let json = serde_json::to_string(&cmd).expect("serialize");
        assert_eq!(json, r#"{"method":"Runtime.enable"}"#);
    }

    #[test]
    fn test_run_if_waiting_for_debugger() {
        let cmd = Command::Runtime(RuntimeCommand::RunIfWaitingForDebugger);
        let json = serde_json::to_string(&cmd).expect("serialize");
        assert_eq!(json, r#"{"method":"Runtime.runIfWaitingForDebugger"}"#);
    }

    #[test]
    fn test_get_script_source() {
        let cmd = DebuggerCommand::GetScriptSource {
            script_id: ScriptId::from("7"),
        };
        let json = serde_json::to_string(&cmd).expect("serialize");
        assert_eq!(
            json,
            r#"{"method":"Debugger.getScriptSource","params":{"scriptId":"7"}}"#
        );
    }

    #[test]
    fn test_set_breakpoint_location_shape() {
        let cmd = DebuggerCommand::SetBreakpoint {
            location: Location::new(ScriptId::from("7"), 13),
        };
        let json = serde_json::to_value(&cmd).expect("serialize");

        assert_eq!(json["method"], "Debugger.setBreakpoint");
        assert_eq!(json["params"]["location"]["scriptId"], "7");
        assert_eq!(json["params"]["location"]["lineNumber"], 13);
    }

    #[test]
    fn test_command_method_names() {
        let cmd = Command::Debugger(DebuggerCommand::Enable);
        assert_eq!(cmd.method(), "Debugger.enable");

        let cmd = Command::Debugger(DebuggerCommand::SetBreakpoint {
            location: Location::new(ScriptId::from("1"), 0),
        });
        assert_eq!(cmd.method(), "Debugger.setBreakpoint");
    }
}
