use async_trait::async_trait;

use flowlens_proto::{ClientCommand, EngineConfig, StartRequest};

/// Queue a command onto the streaming connection. Implemented by the
/// websocket connector; the dispatcher only sees this seam.
pub trait CommandSink: Send + Sync {
    fn send_command(&self, command: ClientCommand) -> Result<(), SendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Could not connect: {0}")]
    ConnectFailed(String),
    #[error("Engine rejected the request: {0}")]
    Rejected(String),
    #[error("Transport error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Everything the command dispatcher needs from the outside world: the
/// streaming connection plus the request/response channel for start and
/// config. One composition-root-owned object implements both halves.
#[async_trait]
pub trait EngineTransport: CommandSink {
    fn is_connected(&self) -> bool;

    /// Establish (or re-establish) the streaming connection and wait until it
    /// is up, resetting any exhausted retry budget.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Submit a start request over the request/response channel.
    async fn start_run(&self, request: &StartRequest) -> Result<(), TransportError>;

    /// Fetch the selectable options, once at startup.
    async fn fetch_config(&self) -> Result<EngineConfig, TransportError>;
}
