//! WebSocket transport over tokio-tungstenite.
//!
//! Each successful dial spawns a pump task that owns the socket and runs a
//! `tokio::select!` loop over the outbound command channel and the inbound
//! frame stream. The pump exits on close, stream end, error, or when the
//! session drops its command sender.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::{LinkCommand, Transport, TransportEvent, TransportLink};

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream, plain or TLS.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// WsTransport
// ============================================================================

/// [`Transport`] implementation over tokio-tungstenite.
///
/// Stateless; one instance can dial any number of links over its lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsTransport;

impl WsTransport {
    /// Creates a new WebSocket transport.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &Url) -> Result<TransportLink> {
        let (ws_stream, _response) = connect_async(url.as_str()).await.map_err(Error::from)?;

        debug!(url = %url, "WebSocket handshake completed");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_link(ws_stream, command_rx, event_tx));

        Ok(TransportLink {
            outbound: command_tx,
            events: event_rx,
        })
    }
}

// ============================================================================
// Link Pump
// ============================================================================

/// Pump task that owns the socket for one link.
async fn run_link(
    ws_stream: WsStream,
    mut command_rx: mpsc::UnboundedReceiver<LinkCommand>,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut ws_write, mut ws_read) = ws_stream.split();

    loop {
        tokio::select! {
            // Inbound frames from the remote end
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        trace!(len = text.len(), "Text frame received");
                        let _ = event_tx.send(TransportEvent::Message(text.to_string()));
                    }

                    Some(Ok(Message::Binary(bytes))) => {
                        // Arbitrary text contract: binary frames are displayed
                        // lossy rather than dropped.
                        let _ = event_tx.send(TransportEvent::Message(
                            String::from_utf8_lossy(&bytes).into_owned(),
                        ));
                    }

                    Some(Ok(Message::Close(_))) => {
                        debug!("WebSocket closed by remote");
                        let _ = event_tx.send(TransportEvent::Closed);
                        break;
                    }

                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                        break;
                    }

                    None => {
                        debug!("WebSocket stream ended");
                        let _ = event_tx.send(TransportEvent::Closed);
                        break;
                    }

                    // Ping/Pong handled by tungstenite, Frame never surfaces
                    _ => {}
                }
            }

            // Outbound commands from the session
            command = command_rx.recv() => {
                match command {
                    Some(LinkCommand::Send(text)) => {
                        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                            warn!(error = %e, "Outbound send failed");
                            let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                            break;
                        }
                        trace!("Text frame sent");
                    }

                    Some(LinkCommand::Close) => {
                        debug!("Close command received");
                        let _ = ws_write.close().await;
                        break;
                    }

                    None => {
                        // Session dropped the link handle
                        debug!("Command channel closed");
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }

    debug!("Link pump terminated");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    /// Starts a localhost echo server and returns its ws:// URL.
    ///
    /// Echoes text frames back verbatim and exits after the first connection
    /// closes.
    async fn spawn_echo_server() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        tokio::spawn(async move {
            let (stream, _addr) = listener.accept().await.expect("accept");
            let ws_stream = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");
            let (mut write, mut read) = ws_stream.split();

            while let Some(Ok(message)) = read.next().await {
                match message {
                    Message::Text(text) => {
                        if write.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        Url::parse(&format!("ws://127.0.0.1:{port}")).expect("url")
    }

    #[tokio::test]
    async fn test_connect_send_and_echo() {
        let url = spawn_echo_server().await;
        let transport = WsTransport::new();

        let mut link = transport.connect(&url).await.expect("connect");

        link.outbound
            .send(LinkCommand::Send("hello".into()))
            .expect("queue send");

        let event = link.events.recv().await.expect("event");
        assert_eq!(event, TransportEvent::Message("hello".into()));
    }

    #[tokio::test]
    async fn test_close_command_ends_link() {
        let url = spawn_echo_server().await;
        let transport = WsTransport::new();

        let mut link = transport.connect(&url).await.expect("connect");

        link.outbound.send(LinkCommand::Close).expect("queue close");

        // Pump exits without emitting events; channel drains to None.
        assert!(link.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_outbound_ends_link() {
        let url = spawn_echo_server().await;
        let transport = WsTransport::new();

        let mut link = transport.connect(&url).await.expect("connect");

        drop(link.outbound);
        assert!(link.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to obtain a port with no listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let url = Url::parse(&format!("ws://127.0.0.1:{port}")).expect("url");
        let result = WsTransport::new().connect(&url).await;

        let err = result.err().expect("refused");
        assert!(err.is_connection_error());
    }

    #[tokio::test]
    async fn test_remote_close_emits_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();

        // Server closes immediately after the handshake.
        tokio::spawn(async move {
            let (stream, _addr) = listener.accept().await.expect("accept");
            let mut ws_stream = tokio_tungstenite::accept_async(stream)
                .await
                .expect("upgrade");
            ws_stream.close(None).await.expect("close");
        });

        let url = Url::parse(&format!("ws://127.0.0.1:{port}")).expect("url");
        let mut link = WsTransport::new().connect(&url).await.expect("connect");

        let event = link.events.recv().await.expect("event");
        assert_eq!(event, TransportEvent::Closed);
    }
}
