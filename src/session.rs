//! Session lifecycle and state machine.
//!
//! A [`Session`] owns at most one live connection at a time, drives the
//! connection state machine, and produces the ordered transcript the view
//! layer renders.
//!
//! # State Machine
//!
//! ```text
//!                 connect()              handshake ok
//! Disconnected ──────────────► Connecting ──────────► Connected
//!      ▲  ▲                        │                      │ │
//!      │  │                        │ handshake failed     │ │ transport error
//!      │  │    disconnect()        ▼                      │ ▼
//!      │  └──────────────────── Errored ◄─────────────────┘
//!      │                           │
//!      └───────────────────────────┘ (disconnect() from any state)
//! ```
//!
//! Initial state is `Disconnected`; there is no terminal state. Failures are
//! never retried — the operator re-invokes `connect` explicitly.
//!
//! # Event Loop
//!
//! `connect` returns immediately after validation; the handshake and the
//! inbound event pump run on spawned tokio tasks. A per-attempt generation
//! counter lets `disconnect` cancel an outstanding handshake safely: a stale
//! completion is discarded and its link closed.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::transcript::{Direction, Transcript, TranscriptEntry};
use crate::transport::{LinkCommand, Transport, TransportEvent, WsTransport};

// ============================================================================
// Constants
// ============================================================================

/// Synthetic notice appended when a connection is established.
const CONNECTED_NOTICE: &str = "Connected to WebSocket server";

/// Synthetic notice appended when a connection ends.
const DISCONNECTED_NOTICE: &str = "Disconnected from server";

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of the session's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection and no attempt in flight.
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Live connection; sends are permitted.
    Connected,
    /// Last attempt or live connection failed; error message is set.
    Errored,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Errored => f.write_str("errored"),
        }
    }
}

// ============================================================================
// Inner
// ============================================================================

/// State shared between the public API and the spawned tasks.
struct Inner {
    /// Current lifecycle state.
    state: ConnectionState,
    /// Broadcasts state transitions to subscribers.
    state_tx: watch::Sender<ConnectionState>,
    /// Target of the active or most recent connection attempt.
    target: Option<Url>,
    /// One-line message for the latest failure, if any.
    last_error: Option<String>,
    /// Ordered message log.
    transcript: Transcript,
    /// Outbound command channel of the live link.
    outbound: Option<mpsc::UnboundedSender<LinkCommand>>,
    /// Attempt counter; bumping it invalidates in-flight handshakes and pumps.
    generation: u64,
}

impl Inner {
    /// Transitions to `state` and notifies subscribers.
    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "Connection state changed");
            self.state = state;
            self.state_tx.send_replace(state);
        }
    }

    /// Closes and forgets the live link, if any.
    fn drop_link(&mut self) {
        if let Some(outbound) = self.outbound.take() {
            let _ = outbound.send(LinkCommand::Close);
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Manager for a single bidirectional streaming connection.
///
/// Exposes `connect` / `disconnect` / `send` / `clear` to the control
/// surface and the current state, latest error, and transcript snapshot to
/// the view layer. All operations are non-blocking; `connect` completion is
/// observed through [`Session::subscribe_state`] or [`Session::state`].
///
/// # Thread Safety
///
/// `Session` is `Send + Sync` and cheap to clone; clones share the same
/// connection and transcript.
///
/// # Teardown
///
/// Dropping a `Session` does not close the live connection (clones may still
/// hold it). Call [`Session::disconnect`] when the enclosing view goes away.
pub struct Session {
    /// Injected dial capability.
    transport: Arc<dyn Transport>,
    /// Shared state (also held by spawned tasks).
    inner: Arc<Mutex<Inner>>,
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::websocket()
    }
}

// ============================================================================
// Session - Constructors
// ============================================================================

impl Session {
    /// Creates a session over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (state_tx, _state_rx) = watch::channel(ConnectionState::Disconnected);

        Self {
            transport,
            inner: Arc::new(Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                state_tx,
                target: None,
                last_error: None,
                transcript: Transcript::new(),
                outbound: None,
                generation: 0,
            })),
        }
    }

    /// Creates a session over the standard WebSocket transport.
    #[inline]
    #[must_use]
    pub fn websocket() -> Self {
        Self::new(Arc::new(WsTransport::new()))
    }
}

// ============================================================================
// Session - Operations
// ============================================================================

impl Session {
    /// Starts a connection attempt to `target`.
    ///
    /// Returns as soon as the attempt is underway; the handshake completes
    /// asynchronously. On success the state becomes [`ConnectionState::Connected`]
    /// and one synthetic `Received` notice is appended to the transcript. On
    /// failure the state becomes [`ConnectionState::Errored`] with a one-line
    /// message and the transcript is untouched. No retries are performed.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyActive`] if a connection or attempt already exists
    /// - [`Error::InvalidTarget`] if `target` is empty, unparsable, or not a
    ///   `ws`/`wss` endpoint — surfaced immediately, no connection attempted
    pub fn connect(&self, target: &str) -> Result<()> {
        let (url, generation) = {
            let mut inner = self.inner.lock();

            match inner.state {
                ConnectionState::Disconnected | ConnectionState::Errored => {}
                state => return Err(Error::already_active(state)),
            }

            let url = match parse_target(target) {
                Ok(url) => url,
                Err(e) => {
                    inner.last_error = Some(e.to_string());
                    inner.set_state(ConnectionState::Errored);
                    return Err(e);
                }
            };

            inner.generation += 1;
            inner.last_error = None;
            inner.target = Some(url.clone());
            inner.set_state(ConnectionState::Connecting);

            (url, inner.generation)
        };

        let transport = Arc::clone(&self.transport);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            Self::run_attempt(transport, inner, url, generation).await;
        });

        Ok(())
    }

    /// Ends the connection, if any.
    ///
    /// Safe to call in every state, including while a handshake is in flight
    /// (the late completion is discarded and its link closed). When the
    /// session is not already disconnected this appends one synthetic
    /// `Received` notice, clears any error, and transitions to
    /// [`ConnectionState::Disconnected`]. Already disconnected is a pure
    /// no-op — no duplicate notice.
    pub fn disconnect(&self) {
        let mut inner = self.inner.lock();

        inner.drop_link();

        if inner.state == ConnectionState::Disconnected {
            return;
        }

        inner.generation += 1;
        inner.last_error = None;
        inner.set_state(ConnectionState::Disconnected);
        inner
            .transcript
            .append(Direction::Received, DISCONNECTED_NOTICE);
    }

    /// Submits an outbound message.
    ///
    /// Silent no-op unless the session is [`ConnectionState::Connected`] and
    /// `payload` is non-blank — the control surface gates this action, so a
    /// rejected call is not an error. On success the payload is handed to
    /// the transport first, then a `Sent` entry is appended.
    pub fn send(&self, payload: &str) {
        let mut inner = self.inner.lock();

        if inner.state != ConnectionState::Connected {
            trace!(state = %inner.state, "Send ignored: not connected");
            return;
        }

        if payload.trim().is_empty() {
            trace!("Send ignored: blank payload");
            return;
        }

        let Some(outbound) = inner.outbound.as_ref() else {
            return;
        };

        if outbound.send(LinkCommand::Send(payload.to_owned())).is_err() {
            // Link pump already gone; its Closed/Error event updates state.
            warn!("Send dropped: link is gone");
            return;
        }

        inner.transcript.append(Direction::Sent, payload);
    }

    /// Empties the transcript.
    ///
    /// Allowed in every state; connection state is unaffected.
    pub fn clear(&self) {
        self.inner.lock().transcript.clear();
    }
}

// ============================================================================
// Session - View Surface
// ============================================================================

impl Session {
    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    /// Returns the latest one-line error message, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Returns the target of the active or most recent connection attempt.
    #[must_use]
    pub fn target(&self) -> Option<Url> {
        self.inner.lock().target.clone()
    }

    /// Returns a read-only snapshot of the transcript in display order.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.inner.lock().transcript.snapshot()
    }

    /// Returns the number of transcript entries.
    #[inline]
    #[must_use]
    pub fn transcript_len(&self) -> usize {
        self.inner.lock().transcript.len()
    }

    /// Subscribes to connection state transitions.
    ///
    /// The receiver observes the current state immediately and every
    /// transition afterwards; the view layer awaits this instead of polling.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.lock().state_tx.subscribe()
    }
}

// ============================================================================
// Session - Attempt & Event Pump
// ============================================================================

impl Session {
    /// Runs one connection attempt to completion.
    async fn run_attempt(
        transport: Arc<dyn Transport>,
        inner: Arc<Mutex<Inner>>,
        url: Url,
        generation: u64,
    ) {
        match transport.connect(&url).await {
            Ok(link) => {
                let mut events = link.events;

                {
                    let mut guard = inner.lock();

                    if guard.generation != generation {
                        // disconnect() won the race; close the fresh link.
                        let _ = link.outbound.send(LinkCommand::Close);
                        debug!(url = %url, "Stale handshake discarded");
                        return;
                    }

                    guard.outbound = Some(link.outbound);
                    guard.set_state(ConnectionState::Connected);
                    guard.transcript.append(Direction::Received, CONNECTED_NOTICE);
                }

                Self::pump_events(&inner, generation, &mut events).await;
            }

            Err(e) => {
                let mut guard = inner.lock();

                if guard.generation == generation {
                    warn!(url = %url, error = %e, "Handshake failed");
                    guard.last_error = Some(e.to_string());
                    guard.set_state(ConnectionState::Errored);
                }
            }
        }
    }

    /// Forwards link events into the shared state.
    ///
    /// Appends happen under the one mutex in event-arrival order, so the
    /// transcript is never reordered.
    async fn pump_events(
        inner: &Arc<Mutex<Inner>>,
        generation: u64,
        events: &mut mpsc::UnboundedReceiver<TransportEvent>,
    ) {
        while let Some(event) = events.recv().await {
            let mut guard = inner.lock();

            if guard.generation != generation {
                break;
            }

            match event {
                TransportEvent::Message(payload) => {
                    guard.transcript.append(Direction::Received, payload);
                }

                TransportEvent::Error(message) => {
                    warn!(error = %message, "Transport error");
                    guard.generation += 1;
                    guard.drop_link();
                    guard.last_error = Some(message);
                    guard.set_state(ConnectionState::Errored);
                    break;
                }

                TransportEvent::Closed => {
                    guard.generation += 1;
                    guard.outbound = None;
                    guard.set_state(ConnectionState::Disconnected);
                    guard
                        .transcript
                        .append(Direction::Received, DISCONNECTED_NOTICE);
                    break;
                }
            }
        }

        debug!("Event pump terminated");
    }
}

// ============================================================================
// Target Validation
// ============================================================================

/// Validates a user-supplied target address.
fn parse_target(target: &str) -> Result<Url> {
    let target = target.trim();

    if target.is_empty() {
        return Err(Error::invalid_target("target address is empty"));
    }

    let url = Url::parse(target).map_err(|e| Error::invalid_target(e.to_string()))?;

    match url.scheme() {
        "ws" | "wss" => {}
        scheme => {
            return Err(Error::invalid_target(format!(
                "unsupported scheme: {scheme}"
            )));
        }
    }

    if url.host_str().is_none() {
        return Err(Error::invalid_target("target has no host"));
    }

    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
