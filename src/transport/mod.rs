//! WebSocket transport layer.
//!
//! This module handles communication between this client and the remote
//! runtime's inspector endpoint via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  Runtime        │
//! │                 │         WebSocket            │  (Inspector)    │
//! │  Connection     │◄────────────────────────────►│                 │
//! │  + event loop   │      ws://host:port/...      │  WebSocket      │
//! │                 │                              │  Server         │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. Discover the endpoint via the `/json` metadata API
//! 2. `Connection::connect` - Dial the endpoint and spawn the event loop
//! 3. `Connection::send` - Send commands, receive correlated replies
//! 4. [`EventReceiver`] - Consume events pushed by the runtime
//! 5. `Connection::shutdown` - Close the connection
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventReceiver};
