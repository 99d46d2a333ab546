use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use flowlens_core::{CommandSink, SendError};
use flowlens_proto::ClientCommand;

/// CommandSink implementation for the websocket connection. Commands are
/// queued onto an unbounded channel drained by the connection task; sending
/// while disconnected fails fast instead of queueing into the void.
#[derive(Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<ClientCommand>,
    connected: Arc<AtomicBool>,
}

impl CommandSender {
    pub fn new(connected: Arc<AtomicBool>) -> (Self, mpsc::UnboundedReceiver<ClientCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, connected }, rx)
    }
}

impl CommandSink for CommandSender {
    fn send_command(&self, command: ClientCommand) -> Result<(), SendError> {
        if !self.connected.load(Ordering::Acquire) {
            warn!("dropping {} command - not connected", command);
            return Err(SendError::ConnectionClosed);
        }
        debug!("queuing {} command", command);
        self.tx.send(command).map_err(|_| SendError::ConnectionClosed)
    }
}
