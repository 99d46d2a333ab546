use std::collections::{BTreeMap, BTreeSet, VecDeque};

use strum::Display;

use flowlens_proto::{GraphNode, NodeId};

/// Frontier history kept per run; oldest evicted first.
pub const FRONTIER_CAP: usize = 10;

/// Mutable per-edge state, keyed by `(source, target)` in the snapshot.
/// `capacity` is informational for rendering; `flow` is whatever the engine
/// last reported and is not clamped to it.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeState {
    pub capacity: f64,
    pub flow: f64,
    /// At most one edge is examining at any moment.
    pub examining: bool,
    pub examined: bool,
}

/// The graph as reconstructed from the event stream. Nodes and edge keys are
/// fixed at `init`; only per-edge flow/examination marks change afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeId, GraphNode>,
    pub edges: BTreeMap<(NodeId, NodeId), EdgeState>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Connecting,
    Running,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    None,
    Bfs,
    Dfs,
}

/// Where the algorithm currently is, run-wide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionState {
    pub status: RunStatus,
    pub phase: Phase,
    pub iteration: u64,
    pub current_flow: f64,
    pub max_flow: Option<f64>,
    pub execution_time_ms: Option<u64>,
    pub source: Option<NodeId>,
    pub sink: Option<NodeId>,
    pub last_error: Option<String>,
}

/// Traversal bookkeeping within the current iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversalState {
    pub visited: BTreeSet<NodeId>,
    /// The most recently reported augmenting path attempt.
    pub current_path: Vec<NodeId>,
    /// Paths being tried concurrently this iteration, in discovery order.
    pub parallel_paths: Vec<Vec<NodeId>>,
    /// Dead ends, in rejection order, across the whole run.
    pub rejected_paths: Vec<Vec<NodeId>>,
    /// BFS frontier history, newest last, capped at [`FRONTIER_CAP`].
    pub frontiers: VecDeque<Vec<NodeId>>,
    pub active_bfs: BTreeSet<NodeId>,
    pub current_bfs_node: Option<NodeId>,
    pub active_dfs: BTreeSet<NodeId>,
    pub current_dfs_node: Option<NodeId>,
    pub last_rejected_node: Option<NodeId>,
}

impl TraversalState {
    /// Reset at `iteration_start`: drop everything tied to the previous
    /// iteration, but keep `rejected_paths` (run-scoped history).
    pub(crate) fn reset_iteration(&mut self) {
        self.visited.clear();
        self.current_path.clear();
        self.parallel_paths.clear();
        self.active_bfs.clear();
        self.current_bfs_node = None;
        self.active_dfs.clear();
        self.current_dfs_node = None;
        self.frontiers.clear();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Streaming-transport health, maintained by the connection manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionState {
    pub status: ConnectionStatus,
    /// Consecutive failed attempts; reset to 0 on a successful connect.
    pub reconnect_attempt: u32,
}

/// The full reducer-owned aggregate. Exclusively owned and mutated by the
/// [`Store`](crate::store::Store); everything else reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub graph: GraphSnapshot,
    pub execution: ExecutionState,
    pub traversal: TraversalState,
    pub connection: ConnectionState,
}

impl AppState {
    pub fn is_running(&self) -> bool { self.execution.status == RunStatus::Running }
}
