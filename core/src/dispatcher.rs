use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use flowlens_proto::{ClientCommand, EngineConfig, StartRequest};

use crate::connector::{EngineTransport, SendError, TransportError};
use crate::state::RunStatus;
use crate::store::Store;

#[derive(Debug, Clone, Copy)]
pub struct DispatcherTimings {
    /// Stop fallback when the connection was already up.
    pub stop_fallback_connected: Duration,
    /// Stop fallback when a reconnect had to happen first.
    pub stop_fallback_reconnect: Duration,
}

impl Default for DispatcherTimings {
    fn default() -> Self {
        Self { stop_fallback_connected: Duration::from_millis(1000), stop_fallback_reconnect: Duration::from_millis(500) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Not connected: {0}")]
    Connect(TransportError),
    #[error("Start failed: {0}")]
    Start(TransportError),
    #[error("Stop failed: {0}")]
    Send(#[from] SendError),
    #[error("Config fetch failed: {0}")]
    Config(TransportError),
}

/// Translates user intents into outbound requests. Failures never report
/// success silently: the local run state is rolled back to a non-running
/// value and the error is returned to the caller.
pub struct Dispatcher<T: EngineTransport> {
    store: Store,
    transport: Arc<T>,
    timings: DispatcherTimings,
}

impl<T: EngineTransport + 'static> Dispatcher<T> {
    pub fn new(store: Store, transport: Arc<T>) -> Self { Self::with_timings(store, transport, DispatcherTimings::default()) }

    pub fn with_timings(store: Store, transport: Arc<T>, timings: DispatcherTimings) -> Self { Self { store, transport, timings } }

    /// Start a run. Connects first if necessary; the speed multiplier is
    /// normalized to one decimal place before hitting the wire.
    pub async fn start(&self, mut request: StartRequest) -> Result<(), DispatchError> {
        request.speed = (request.speed * 10.0).round() / 10.0;

        if !self.transport.is_connected() {
            self.store.set_status(RunStatus::Connecting);
            if let Err(e) = self.transport.connect().await {
                warn!("start aborted, could not connect: {}", e);
                self.store.set_status(RunStatus::Idle);
                return Err(DispatchError::Connect(e));
            }
        }

        match self.transport.start_run(&request).await {
            Ok(()) => {
                info!("run started: {} on {}", request.algorithm, request.graph_file);
                self.store.begin_run(&request);
                Ok(())
            }
            Err(e) => {
                warn!("start rejected: {}", e);
                self.store.set_status(RunStatus::Idle);
                Err(DispatchError::Start(e))
            }
        }
    }

    /// Stop the current run. A fallback timer is always armed, so the UI
    /// leaves `Running` even if the engine never acknowledges: the remote
    /// stop is best-effort, the local reset is not.
    pub async fn stop(&self) -> Result<(), DispatchError> {
        if self.transport.is_connected() {
            self.arm_stop_fallback(self.timings.stop_fallback_connected);
            self.transport.send_command(ClientCommand::Stop)?;
            Ok(())
        } else {
            self.arm_stop_fallback(self.timings.stop_fallback_reconnect);
            match self.transport.connect().await {
                Ok(()) => {
                    self.transport.send_command(ClientCommand::Stop)?;
                    Ok(())
                }
                Err(e) => {
                    warn!("stop could not reach the engine: {}", e);
                    Err(DispatchError::Connect(e))
                }
            }
        }
    }

    pub async fn config(&self) -> Result<EngineConfig, DispatchError> {
        self.transport.fetch_config().await.map_err(DispatchError::Config)
    }

    fn arm_stop_fallback(&self, after: Duration) {
        let store = self.store.clone();
        tokio::spawn(async move {
            sleep(after).await;
            store.force_idle();
        });
    }
}
