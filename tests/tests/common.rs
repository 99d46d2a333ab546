use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::Level;

use flowlens::{AppState, Store};

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init(); }

/// A minimal in-process stand-in for the engine's websocket endpoint: binds
/// an ephemeral port and hands each accepted stream to the test.
#[allow(unused)]
pub struct MockEngine {
    listener: TcpListener,
    pub url: String,
}

#[allow(unused)]
impl MockEngine {
    pub async fn bind() -> Result<Self> {
        Self::bind_at("127.0.0.1:0").await
    }

    /// Bind a specific address, for tests that take an endpoint down and
    /// bring it back on the same port.
    pub async fn bind_at(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let url = format!("ws://{}", listener.local_addr()?);
        Ok(Self { listener, url })
    }

    pub async fn accept(&self) -> Result<WebSocketStream<TcpStream>> {
        let (stream, _) = self.listener.accept().await?;
        Ok(accept_async(stream).await?)
    }
}

#[allow(unused)]
pub async fn send_event(ws: &mut WebSocketStream<TcpStream>, json: &str) -> Result<()> {
    ws.send(Message::Text(json.to_string().into())).await?;
    Ok(())
}

/// Read frames until a text frame arrives, answering pings along the way.
#[allow(unused)]
pub async fn recv_text(ws: &mut WebSocketStream<TcpStream>) -> Result<String> {
    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Text(text) => return Ok(text.to_string()),
            Message::Ping(data) => ws.send(Message::Pong(data)).await?,
            _ => {}
        }
    }
    anyhow::bail!("stream closed before a text frame arrived")
}

/// Poll the store until `predicate` holds or the deadline passes. The event
/// pump has no completion signal to await, so tests poll.
#[allow(unused)]
pub async fn wait_for(store: &Store, predicate: impl Fn(&AppState) -> bool) -> Result<()> {
    for _ in 0..200 {
        if store.read(&predicate) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    anyhow::bail!("condition not reached within 2s")
}
