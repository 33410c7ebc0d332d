//! Endpoint discovery over the HTTP metadata API.
//!
//! A debuggable runtime serves target metadata as a JSON array at
//! `http://{host}:{port}/json`. Each entry describes one debuggable
//! target; its `webSocketDebuggerUrl` field is the WebSocket endpoint
//! this client attaches to.
//!
//! Discovery selects the first advertised target. Runtimes expose one
//! target per process, so ordering ambiguity does not arise in practice.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Timeout for the metadata HTTP request.
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// TargetDescriptor
// ============================================================================

/// One entry of the `/json` target list.
///
/// Only the fields this client reads are modeled; the runtime sends
/// several more (`description`, `devtoolsFrontendUrl`, ...) which are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetDescriptor {
    /// Human-readable target title.
    #[serde(default)]
    pub title: String,

    /// URL of the target's main script or page.
    #[serde(default)]
    pub url: String,

    /// Target kind, e.g. `"node"` or `"page"`.
    #[serde(rename = "type", default)]
    pub target_type: String,

    /// WebSocket endpoint for attaching a debugger.
    ///
    /// Absent when another debugger is already attached.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

// ============================================================================
// Discovery
// ============================================================================

/// Resolves the WebSocket debugger endpoint of the runtime at `host:port`.
///
/// Fetches the target list from the `/json` metadata endpoint and returns
/// the first target's `webSocketDebuggerUrl`, parsed and validated.
///
/// # Errors
///
/// Returns [`Error::Discovery`] when the metadata endpoint is unreachable,
/// answers with a non-success status or malformed JSON, advertises no
/// targets, or the first target carries no usable WebSocket URL.
pub async fn resolve(host: &str, port: u16) -> Result<Url> {
    let metadata_url = format!("http://{host}:{port}/json");

    let client = reqwest::Client::builder()
        .timeout(DISCOVERY_TIMEOUT)
        .build()
        .map_err(|e| Error::discovery(format!("failed to create HTTP client: {e}")))?;

    let response = client
        .get(&metadata_url)
        .send()
        .await
        .map_err(|e| Error::discovery(format!("failed to reach {metadata_url}: {e}")))?;

    if !response.status().is_success() {
        return Err(Error::discovery(format!(
            "unexpected status {} from {metadata_url}",
            response.status()
        )));
    }

    let targets: Vec<TargetDescriptor> = response
        .json()
        .await
        .map_err(|e| Error::discovery(format!("malformed target list from {metadata_url}: {e}")))?;

    debug!(count = targets.len(), "Fetched target list");

    let Some(target) = targets.into_iter().next() else {
        return Err(Error::discovery(format!(
            "no debuggable targets advertised by {metadata_url}"
        )));
    };

    let Some(raw_url) = target.web_socket_debugger_url else {
        return Err(Error::discovery(format!(
            "first target {:?} has no webSocketDebuggerUrl (another debugger may be attached)",
            target.title
        )));
    };

    let endpoint = Url::parse(&raw_url)
        .map_err(|e| Error::discovery(format!("invalid WebSocket URL {raw_url:?}: {e}")))?;

    info!(%endpoint, target_type = %target.target_type, "Resolved debugger endpoint");
    Ok(endpoint)
}

// ============================================================================
// Tests
// ============================================================================
