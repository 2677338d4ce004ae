//! Error types for the WebSocket session visualizer.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use ws_visualizer::{Session, Result};
//!
//! fn example(session: &Session) -> Result<()> {
//!     session.connect("wss://echo.websocket.org")?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Target | [`Error::InvalidTarget`] |
//! | Lifecycle | [`Error::AlreadyActive`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | External | [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::session::ConnectionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant carries a one-line, user-presentable message. The session
/// stores the rendered message alongside the `Errored` state for the view
/// layer to display.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Target Errors
    // ========================================================================
    /// Target address is not a connectable WebSocket endpoint.
    ///
    /// Returned before any connection attempt is made.
    #[error("Invalid target: {message}")]
    InvalidTarget {
        /// Description of what is wrong with the target.
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// A connection attempt or live connection already exists.
    ///
    /// Returned by `connect` while the session is `Connecting` or `Connected`.
    #[error("Connection already active (state: {state})")]
    AlreadyActive {
        /// State the session was in when `connect` was rejected.
        state: ConnectionState,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Handshake or transport failure.
    ///
    /// Returned when the connection cannot be established or breaks.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection closed while an operation was in flight.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// WebSocket protocol error from the underlying transport.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an invalid target error.
    #[inline]
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget {
            message: message.into(),
        }
    }

    /// Creates an already-active error.
    #[inline]
    pub fn already_active(state: ConnectionState) -> Self {
        Self::AlreadyActive { state }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a target validation error.
    #[inline]
    #[must_use]
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, Self::InvalidTarget { .. })
    }

    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionClosed | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the operator may retry `connect` after this error.
    ///
    /// Everything except an active-connection rejection is retryable; the
    /// session never retries on its own.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AlreadyActive { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
