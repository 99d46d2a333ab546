use std::sync::{Arc, RwLock};

use tracing::debug;

use flowlens_proto::{EngineEvent, StartRequest};

use crate::broadcast::{Broadcast, SubscriptionGuard};
use crate::reducer::reduce;
use crate::state::{AppState, ConnectionStatus, Phase, RunStatus};

/// What kind of mutation a notification describes, so subscribers can skip
/// recomputation they do not care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// An engine event went through the reducer.
    Event,
    /// Connection status moved.
    Connection,
    /// A local command transition (optimistic start, forced stop, error).
    Command,
}

#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Bound the dead-end history like the frontier cap; `None` keeps the
    /// original unbounded-within-a-run behavior.
    pub rejected_path_cap: Option<usize>,
}

/// Owns the snapshot. All mutation funnels through here: engine events via
/// the reducer, connection transitions via the connection manager, command
/// transitions via the dispatcher. Mutations commit under the write lock and
/// subscribers are notified after the lock is released, so an observed
/// snapshot is always internally consistent.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<AppState>,
    options: StoreOptions,
    changes: Broadcast<StateChange>,
}

impl Default for Store {
    fn default() -> Self { Self::new(StoreOptions::default()) }
}

impl Store {
    pub fn new(options: StoreOptions) -> Self {
        Self { inner: Arc::new(StoreInner { state: RwLock::new(AppState::default()), options, changes: Broadcast::new() }) }
    }

    /// Apply one engine event in delivery order.
    pub fn apply(&self, event: &EngineEvent) {
        debug!("applying {}", event);
        {
            let mut state = self.inner.state.write().unwrap();
            reduce(&mut state, event, self.inner.options.rejected_path_cap);
        }
        self.inner.changes.send(&StateChange::Event);
    }

    /// Run a closure against the current snapshot under the read guard.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R { f(&self.inner.state.read().unwrap()) }

    /// Clone of the full snapshot.
    pub fn snapshot(&self) -> AppState { self.inner.state.read().unwrap().clone() }

    pub fn subscribe(&self, listener: impl Fn(&StateChange) + Send + Sync + 'static) -> SubscriptionGuard<StateChange> {
        self.inner.changes.subscribe(listener)
    }

    // Connection transitions, driven by the connection manager.

    pub fn set_connecting(&self, attempt: u32) {
        self.mutate(StateChange::Connection, |state| {
            state.connection.status = ConnectionStatus::Connecting;
            state.connection.reconnect_attempt = attempt;
        });
    }

    pub fn set_connected(&self) {
        self.mutate(StateChange::Connection, |state| {
            state.connection.status = ConnectionStatus::Connected;
            state.connection.reconnect_attempt = 0;
        });
    }

    pub fn set_disconnected(&self) {
        self.mutate(StateChange::Connection, |state| {
            state.connection.status = ConnectionStatus::Disconnected;
        });
    }

    // Command transitions, driven by the dispatcher.

    pub fn set_status(&self, status: RunStatus) {
        self.mutate(StateChange::Command, |state| state.execution.status = status);
    }

    /// Optimistic local bookkeeping once a start request is accepted.
    pub fn begin_run(&self, request: &StartRequest) {
        self.mutate(StateChange::Command, |state| {
            state.execution.status = RunStatus::Running;
            state.execution.source = Some(request.source);
            state.execution.sink = request.sink;
            state.execution.last_error = None;
            state.traversal.visited.clear();
            state.traversal.current_path.clear();
        });
    }

    /// Stop-fallback: force a still-running UI out of `Running` when no
    /// server acknowledgment arrived. Terminal states are left alone.
    pub fn force_idle(&self) {
        self.mutate(StateChange::Command, |state| {
            if state.execution.status == RunStatus::Running || state.execution.status == RunStatus::Connecting {
                state.execution.status = RunStatus::Idle;
                state.execution.phase = Phase::None;
            }
        });
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.mutate(StateChange::Command, |state| {
            state.execution.status = RunStatus::Error;
            state.execution.last_error = Some(message.into());
        });
    }

    fn mutate(&self, change: StateChange, f: impl FnOnce(&mut AppState)) {
        {
            let mut state = self.inner.state.write().unwrap();
            f(&mut state);
        }
        self.inner.changes.send(&change);
    }
}
