//! Transport layer for outbound WebSocket connections.
//!
//! The session never touches a socket directly; it is handed a [`Transport`]
//! capability and speaks to whatever link the transport produces. This keeps
//! the session testable against an in-memory fake and the real WebSocket
//! implementation swappable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Session        │      LinkCommand (mpsc)      │  Transport link │
//! │                 │─────────────────────────────►│  (pump task)    │
//! │  state machine  │                              │                 │
//! │  + transcript   │◄─────────────────────────────│  WebSocket      │
//! │                 │      TransportEvent (mpsc)   │  stream         │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Contract
//!
//! A transport exposes one async operation, `connect`, which resolves once
//! the handshake completes — resolution is the "open" notification. The
//! returned [`TransportLink`] carries the remaining surface: one outbound
//! command channel ([`LinkCommand`]) and one inbound event channel
//! ([`TransportEvent`]) delivering message, error, and close notifications.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `ws` | tokio-tungstenite implementation |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket transport implementation.
pub mod ws;

#[cfg(test)]
pub(crate) mod fake;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::sync::mpsc;
use url::Url;

use crate::error::Result;

// ============================================================================
// Re-exports
// ============================================================================

pub use ws::WsTransport;

// ============================================================================
// LinkCommand
// ============================================================================

/// Commands the session issues to a live link.
#[derive(Debug)]
pub enum LinkCommand {
    /// Transmit a text payload.
    Send(String),
    /// Close the link gracefully.
    Close,
}

// ============================================================================
// TransportEvent
// ============================================================================

/// Asynchronous notifications delivered by a live link.
///
/// Together with [`Transport::connect`] resolving (the "open" notification),
/// these cover the full event surface of a platform WebSocket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text message arrived. Payload is delivered verbatim.
    Message(String),
    /// The link failed. Carries a one-line description.
    Error(String),
    /// The remote end closed the link, or the stream ended.
    Closed,
}

// ============================================================================
// TransportLink
// ============================================================================

/// Channel pair representing one live connection.
///
/// Dropping the `outbound` sender tears the link down; the link's pump task
/// exits once its command channel closes.
pub struct TransportLink {
    /// Outbound commands to the link's pump task.
    pub outbound: mpsc::UnboundedSender<LinkCommand>,
    /// Inbound events from the link.
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

// ============================================================================
// Transport
// ============================================================================

/// Capability for dialing outbound streaming connections.
///
/// Implementations must resolve `connect` only after the handshake has
/// completed, so a successful return means the link is ready for traffic.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dials `url` and returns a live link.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the endpoint is unreachable or the
    /// handshake is rejected. No retries are performed.
    async fn connect(&self, url: &Url) -> Result<TransportLink>;
}
