use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::{select, sync::Notify, task::JoinHandle, time::sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use flowlens_core::{CommandSink, EngineTransport, SendError, Store, TransportError};
use flowlens_proto::{ClientCommand, EngineConfig, EngineEvent, StartRequest};

use crate::api::{ApiError, EngineApi};
use crate::sender::CommandSender;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

struct Inner {
    store: Store,
    ws_url: String,
    sender: CommandSender,
    outgoing_rx: tokio::sync::Mutex<tokio::sync::mpsc::UnboundedReceiver<ClientCommand>>,
    connected: Arc<AtomicBool>,
    connected_changed: Notify,
    attempt: AtomicU32,
    retry: Notify,
    shutdown: Notify,
    shutdown_requested: AtomicBool,
}

/// Connection manager for the engine's event stream. Owns the websocket
/// lifecycle: connect, detect close/error, reconnect with exponential
/// backoff, and drain the outbound command queue. Inbound frames are parsed
/// and fed to the store in delivery order; malformed frames are logged and
/// dropped without touching state.
pub struct EngineClient {
    inner: Arc<Inner>,
    api: EngineApi,
    task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl EngineClient {
    /// Create the client and start connecting. `server_url` is the engine's
    /// base URL (`http://host:port` or `ws://host:port`); the event stream
    /// lives at `/ws` and the request channel at the HTTP root.
    pub fn new(store: Store, server_url: &str) -> Self {
        let ws_url = Self::ws_url(server_url);
        let http_url = Self::http_url(server_url);
        info!("Creating engine client for {}", ws_url);

        let connected = Arc::new(AtomicBool::new(false));
        let (sender, outgoing_rx) = CommandSender::new(connected.clone());

        let inner = Arc::new(Inner {
            store,
            ws_url,
            sender,
            outgoing_rx: tokio::sync::Mutex::new(outgoing_rx),
            connected,
            connected_changed: Notify::new(),
            attempt: AtomicU32::new(0),
            retry: Notify::new(),
            shutdown: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
        });

        let task = tokio::spawn(Self::run_connection_loop(inner.clone()));
        Self { inner, api: EngineApi::new(http_url), task: std::sync::Mutex::new(Some(task)) }
    }

    fn ws_url(url: &str) -> String {
        match url.trim_end_matches('/') {
            u if u.starts_with("ws://") || u.starts_with("wss://") => format!("{}/ws", u),
            u if u.starts_with("http://") => format!("ws://{}/ws", &u[7..]),
            u if u.starts_with("https://") => format!("wss://{}/ws", &u[8..]),
            u => format!("ws://{}/ws", u),
        }
    }

    fn http_url(url: &str) -> String {
        match url.trim_end_matches('/') {
            u if u.starts_with("http://") || u.starts_with("https://") => u.to_string(),
            u if u.starts_with("ws://") => format!("http://{}", &u[5..]),
            u if u.starts_with("wss://") => format!("https://{}", &u[6..]),
            u => format!("http://{}", u),
        }
    }

    /// The HTTP side of the engine (start requests, config query).
    pub fn api(&self) -> &EngineApi { &self.api }

    /// A cloneable handle for queuing commands onto the stream.
    pub fn sender(&self) -> CommandSender { self.inner.sender.clone() }

    /// Check if currently connected to the engine.
    pub fn is_connected(&self) -> bool { self.inner.connected.load(Ordering::Acquire) }

    /// Wait until the connection is established.
    pub async fn wait_connected(&self) -> Result<(), TransportError> {
        let wait = async {
            loop {
                let notified = self.inner.connected_changed.notified();
                tokio::pin!(notified);
                // Register before checking so a notify between the check and
                // the await cannot be lost
                notified.as_mut().enable();
                if self.is_connected() {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(CONNECT_TIMEOUT, wait)
            .await
            .map_err(|_| TransportError::ConnectFailed(format!("timed out connecting to {}", self.inner.ws_url)))
    }

    /// Manual reconnect: resets the retry budget and wakes the connection
    /// task, whether it is backing off or parked after exhausting retries.
    pub fn reconnect(&self) {
        self.inner.attempt.store(0, Ordering::Release);
        self.inner.retry.notify_waiters();
    }

    /// Gracefully shut down the connection.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!("Shutting down engine client");
        if let Some(task) = self.task.lock().unwrap().take() {
            self.inner.shutdown_requested.store(true, Ordering::Release);
            self.inner.shutdown.notify_waiters();
            match task.await {
                Ok(()) => info!("Engine client shutdown completed"),
                Err(e) => warn!("Connection task join error during shutdown: {}", e),
            }
        }
        Ok(())
    }

    /// Main connection loop with automatic reconnection.
    async fn run_connection_loop(inner: Arc<Inner>) {
        info!("Starting connection loop to {}", inner.ws_url);

        loop {
            let attempt = inner.attempt.load(Ordering::Acquire);
            inner.store.set_connecting(attempt);

            let result = select! {
                _ = inner.shutdown.notified() => break,
                result = Self::connect_once(&inner) => result,
            };

            inner.connected.store(false, Ordering::Release);
            inner.connected_changed.notify_waiters();
            inner.store.set_disconnected();
            // A drop mid-run means the event stream is gone; leave the UI in
            // a stopped state rather than a stale "running"
            inner.store.force_idle();

            if inner.shutdown_requested.load(Ordering::Acquire) {
                break;
            }

            let delay = match result {
                Ok(()) => {
                    info!("Connection to {} closed", inner.ws_url);
                    INITIAL_BACKOFF
                }
                Err(e) => {
                    error!("Connection to {} failed: {}", inner.ws_url, e);
                    let prior = inner.attempt.fetch_add(1, Ordering::AcqRel);
                    if prior + 1 >= MAX_RECONNECT_ATTEMPTS {
                        info!("Retry budget exhausted after {} attempts; waiting for manual reconnect", prior + 1);
                        select! {
                            _ = inner.shutdown.notified() => break,
                            _ = inner.retry.notified() => continue,
                        }
                    }
                    Self::backoff_delay(prior)
                }
            };

            info!("Retrying connection in {:?}", delay);
            select! {
                _ = inner.shutdown.notified() => break,
                _ = inner.retry.notified() => {}
                _ = sleep(delay) => {}
            }
        }

        inner.connected.store(false, Ordering::Release);
        inner.store.set_disconnected();
    }

    fn backoff_delay(attempt: u32) -> Duration {
        INITIAL_BACKOFF.saturating_mul(2u32.saturating_pow(attempt)).min(MAX_BACKOFF)
    }

    /// Attempt a single connection and pump it until it closes.
    async fn connect_once(inner: &Arc<Inner>) -> anyhow::Result<()> {
        debug!("Attempting to connect to {}", inner.ws_url);
        let (ws_stream, _) = connect_async(inner.ws_url.as_str()).await?;
        info!("WebSocket handshake completed with {}", inner.ws_url);

        let (mut sink, mut stream) = ws_stream.split();

        inner.connected.store(true, Ordering::Release);
        inner.connected_changed.notify_waiters();
        // A completed handshake restores the full retry budget, so a later
        // drop of this connection backs off from scratch
        inner.attempt.store(0, Ordering::Release);
        inner.store.set_connected();

        let mut outgoing_rx = inner.outgoing_rx.lock().await;

        loop {
            select! {
                _ = inner.shutdown.notified() => {
                    debug!("Connection received shutdown signal");
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                command = outgoing_rx.recv() => {
                    // The sender half lives in Inner, so the channel never closes
                    if let Some(command) = command {
                        debug!("Sending {} command", command);
                        sink.send(Message::Text(command.to_json().into())).await?;
                    }
                }
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => Self::handle_frame(inner, &text),
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            sink.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Pong(_))) => debug!("Received pong"),
                        Some(Ok(Message::Close(_))) => {
                            info!("Connection closed by engine");
                            break;
                        }
                        Some(Ok(other)) => debug!("Ignoring unexpected frame: {:?}", other),
                        Some(Err(e)) => {
                            error!("WebSocket error: {}", e);
                            return Err(e.into());
                        }
                        None => {
                            info!("Event stream ended");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Parse one text frame and feed it to the store. Parse failures are
    /// dropped here so they can never reach (or crash) the reducer.
    fn handle_frame(inner: &Arc<Inner>, text: &str) {
        match EngineEvent::parse(text) {
            Ok(EngineEvent::Unknown) => debug!("Unhandled event type in frame: {}", text),
            Ok(event) => inner.store.apply(&event),
            Err(e) => warn!("Dropping malformed event frame: {}", e),
        }
    }
}

impl CommandSink for EngineClient {
    fn send_command(&self, command: ClientCommand) -> Result<(), SendError> { self.inner.sender.send_command(command) }
}

#[async_trait]
impl EngineTransport for EngineClient {
    fn is_connected(&self) -> bool { EngineClient::is_connected(self) }

    async fn connect(&self) -> Result<(), TransportError> {
        self.reconnect();
        self.wait_connected().await
    }

    async fn start_run(&self, request: &StartRequest) -> Result<(), TransportError> {
        match self.api.start(request).await {
            Ok(_) => Ok(()),
            Err(ApiError::Rejected { detail, .. }) => Err(TransportError::Rejected(detail)),
            Err(e) => Err(TransportError::Other(e.into())),
        }
    }

    async fn fetch_config(&self) -> Result<EngineConfig, TransportError> {
        self.api.fetch_config().await.map_err(|e| TransportError::Other(e.into()))
    }
}

impl Drop for EngineClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            debug!("Engine client dropped, requesting shutdown");
            self.inner.shutdown_requested.store(true, Ordering::Release);
            self.inner.shutdown.notify_waiters();
            task.abort();
        }
    }
}
