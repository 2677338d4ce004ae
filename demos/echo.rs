//! Connects to a public echo endpoint, sends a couple of messages, and
//! prints the resulting transcript.
//!
//! ```sh
//! cargo run --example echo
//! cargo run --example echo -- wss://echo.websocket.org
//! ```

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ws_visualizer::{ConnectionState, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wss://echo.websocket.org".to_owned());

    let session = Session::websocket();
    session.connect(&target)?;

    let mut state = session.subscribe_state();
    state
        .wait_for(|s| *s != ConnectionState::Connecting)
        .await
        .context("session gone")?;

    if session.state() == ConnectionState::Errored {
        anyhow::bail!(
            "connection failed: {}",
            session.last_error().unwrap_or_default()
        );
    }

    session.send("hello");
    session.send("world");

    // Give the echo a moment to come back.
    tokio::time::sleep(Duration::from_secs(2)).await;

    for entry in session.transcript() {
        println!("[{:>8}] {}", entry.direction.to_string(), entry.payload);
    }

    session.disconnect();
    Ok(())
}
