use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{GraphEdge, GraphNode, NodeId};

/// One message of the engine's streaming event protocol. Each websocket text
/// frame carries a single JSON object discriminated by a `type` tag.
///
/// The envelope is deliberately total: event types this client does not know
/// about deserialize to [`EngineEvent::Unknown`] instead of failing, so a
/// newer engine never breaks the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Full graph definition at the start of a run.
    Init {
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
    },
    NodeVisited {
        node_id: NodeId,
    },
    /// An edge is under active examination by the DFS.
    EdgeExamined {
        source: NodeId,
        target: NodeId,
        flow: f64,
    },
    EdgeExplored {
        source: NodeId,
        target: NodeId,
        flow: f64,
    },
    EdgeUpdated {
        source: NodeId,
        target: NodeId,
        flow: f64,
    },
    BfsStart,
    BfsComplete,
    /// Nodes reached at the current BFS depth, in arrival order.
    BfsFrontier {
        frontier: Vec<NodeId>,
    },
    DfsStart,
    DfsComplete,
    DfsVisit {
        #[serde(default)]
        path: Vec<NodeId>,
    },
    PathFound {
        path: Vec<NodeId>,
    },
    /// A path explored and abandoned because it could not reach the sink.
    PathRejected {
        rejected_path: Vec<NodeId>,
    },
    /// Same transition as `path_rejected`; the engine emits both names.
    Backtrack {
        path: Vec<NodeId>,
    },
    IterationStart {
        iteration: u64,
    },
    FlowUpdate {
        current_flow: f64,
    },
    AlgorithmComplete {
        #[serde(default)]
        max_flow: Option<f64>,
        #[serde(default)]
        execution_time_ms: Option<u64>,
    },
    AlgorithmStopped {
        #[serde(default)]
        max_flow: Option<f64>,
    },
    /// Engine is ready; reports the source/sink it resolved for the run.
    Ready {
        source: NodeId,
        sink: NodeId,
    },
    Error {
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl EngineEvent {
    /// Parse one text frame of the event stream.
    pub fn parse(text: &str) -> Result<Self, EventParseError> {
        serde_json::from_str(text).map_err(EventParseError::Json)
    }

    /// The wire tag for this event, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::Init { .. } => "init",
            EngineEvent::NodeVisited { .. } => "node_visited",
            EngineEvent::EdgeExamined { .. } => "edge_examined",
            EngineEvent::EdgeExplored { .. } => "edge_explored",
            EngineEvent::EdgeUpdated { .. } => "edge_updated",
            EngineEvent::BfsStart => "bfs_start",
            EngineEvent::BfsComplete => "bfs_complete",
            EngineEvent::BfsFrontier { .. } => "bfs_frontier",
            EngineEvent::DfsStart => "dfs_start",
            EngineEvent::DfsComplete => "dfs_complete",
            EngineEvent::DfsVisit { .. } => "dfs_visit",
            EngineEvent::PathFound { .. } => "path_found",
            EngineEvent::PathRejected { .. } => "path_rejected",
            EngineEvent::Backtrack { .. } => "backtrack",
            EngineEvent::IterationStart { .. } => "iteration_start",
            EngineEvent::FlowUpdate { .. } => "flow_update",
            EngineEvent::AlgorithmComplete { .. } => "algorithm_complete",
            EngineEvent::AlgorithmStopped { .. } => "algorithm_stopped",
            EngineEvent::Ready { .. } => "ready",
            EngineEvent::Error { .. } => "error",
            EngineEvent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.kind()) }
}

#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("malformed event frame: {0}")]
    Json(#[from] serde_json::Error),
}
