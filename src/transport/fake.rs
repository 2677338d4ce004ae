//! In-memory transport fake for session tests.
//!
//! Each `connect` hands the test a [`FakeRemote`] — the far end of the link —
//! so tests can inject inbound events and observe outbound commands without
//! touching a socket.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Semaphore, mpsc};
use url::Url;

use crate::error::{Error, Result};

use super::{LinkCommand, Transport, TransportEvent, TransportLink};

/// Far end of a fake link, driven by the test.
pub(crate) struct FakeRemote {
    commands: mpsc::UnboundedReceiver<LinkCommand>,
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl FakeRemote {
    /// Delivers an inbound text message to the session.
    pub(crate) fn push_message(&self, text: &str) {
        let _ = self.events.send(TransportEvent::Message(text.to_owned()));
    }

    /// Delivers a transport error to the session.
    pub(crate) fn push_error(&self, message: &str) {
        let _ = self.events.send(TransportEvent::Error(message.to_owned()));
    }

    /// Delivers a remote-initiated close to the session.
    pub(crate) fn push_closed(&self) {
        let _ = self.events.send(TransportEvent::Closed);
    }

    /// Awaits the next outbound command from the session.
    pub(crate) async fn next_command(&mut self) -> Option<LinkCommand> {
        self.commands.recv().await
    }
}

/// Scriptable [`Transport`] that produces in-memory links.
pub(crate) struct FakeTransport {
    fail_with: Option<String>,
    gate: Option<Arc<Semaphore>>,
    remote_tx: Mutex<mpsc::UnboundedSender<FakeRemote>>,
}

impl FakeTransport {
    /// Creates a transport whose links succeed.
    ///
    /// The returned receiver yields one [`FakeRemote`] per successful dial.
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<FakeRemote>) {
        let (remote_tx, remote_rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            fail_with: None,
            gate: None,
            remote_tx: Mutex::new(remote_tx),
        });
        (transport, remote_rx)
    }

    /// Creates a transport that rejects every dial with `message`.
    pub(crate) fn failing(message: &str) -> Arc<Self> {
        let (remote_tx, _remote_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            fail_with: Some(message.to_owned()),
            gate: None,
            remote_tx: Mutex::new(remote_tx),
        })
    }

    /// Creates a transport whose handshake parks until the gate gains a
    /// permit, so tests can interleave operations mid-handshake.
    pub(crate) fn gated() -> (Arc<Self>, Arc<Semaphore>, mpsc::UnboundedReceiver<FakeRemote>) {
        let (remote_tx, remote_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let transport = Arc::new(Self {
            fail_with: None,
            gate: Some(Arc::clone(&gate)),
            remote_tx: Mutex::new(remote_tx),
        });
        (transport, gate, remote_rx)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn connect(&self, _url: &Url) -> Result<TransportLink> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| Error::connection("handshake gate closed"))?;
            permit.forget();
        }

        if let Some(message) = &self.fail_with {
            return Err(Error::connection(message.clone()));
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let remote = FakeRemote {
            commands: command_rx,
            events: event_tx,
        };
        let _ = self.remote_tx.lock().send(remote);

        Ok(TransportLink {
            outbound: command_tx,
            events: event_rx,
        })
    }
}
