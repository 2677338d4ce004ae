//! WebSocket session visualizer core.
//!
//! This library manages the lifecycle of a single outbound WebSocket
//! connection and maintains an ordered, append-only transcript of sent and
//! received messages for a view layer to render as a chat-like log.
//!
//! # Architecture
//!
//! One [`Session`] owns at most one live connection at a time:
//!
//! - **Control surface**: `connect` / `disconnect` / `send` / `clear`
//! - **View surface**: current [`ConnectionState`], latest error message,
//!   transcript snapshots, and a `watch` channel for state transitions
//! - **Transport**: an injected [`Transport`] capability; the bundled
//!   [`WsTransport`] speaks WebSocket via tokio-tungstenite, and tests
//!   substitute an in-memory fake
//!
//! Failures surface as a state transition to `Errored` plus a one-line
//! message; nothing is retried automatically and nothing is fatal — the
//! operator can always attempt `connect` again.
//!
//! # Quick Start
//!
//! ```no_run
//! use ws_visualizer::{ConnectionState, Result, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let session = Session::websocket();
//!
//!     session.connect("wss://echo.websocket.org")?;
//!
//!     let mut state = session.subscribe_state();
//!     state
//!         .wait_for(|s| *s == ConnectionState::Connected)
//!         .await
//!         .expect("session gone");
//!
//!     session.send("hello");
//!
//!     for entry in session.transcript() {
//!         println!("[{}] {}", entry.direction, entry.payload);
//!     }
//!
//!     session.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`session`] | Connection lifecycle and state machine |
//! | [`transcript`] | Ordered message log |
//! | [`transport`] | Transport capability and WebSocket implementation |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for transcript entries.
pub mod identifiers;

/// Connection lifecycle and state machine.
///
/// [`Session`] is the crate's main entry point.
pub mod session;

/// Ordered message transcript consumed by the view layer.
pub mod transcript;

/// Transport capability and implementations.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Session types
pub use session::{ConnectionState, Session};

// Transcript types
pub use transcript::{Direction, Transcript, TranscriptEntry};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::EntryId;

// Transport types
pub use transport::{LinkCommand, Transport, TransportEvent, TransportLink, WsTransport};
