use tracing::{debug, warn};

use flowlens_proto::{EngineEvent, NodeId};

use crate::state::{AppState, EdgeState, Phase, RunStatus, FRONTIER_CAP};

/// Fold one engine event into the state. Deterministic and total: every
/// recognized event type has defined behavior, unrecognized types are a
/// logged no-op, and nothing here performs I/O. Events are applied strictly
/// in delivery order; the store is the only caller.
///
/// `rejected_path_cap` bounds the dead-end history when set (oldest evicted),
/// mirroring the frontier cap; `None` keeps the history unbounded within a
/// run.
pub fn reduce(state: &mut AppState, event: &EngineEvent, rejected_path_cap: Option<usize>) {
    match event {
        EngineEvent::Init { nodes, edges } => {
            state.graph.nodes = nodes.iter().map(|n| (n.id, n.clone())).collect();
            state.graph.edges = edges
                .iter()
                .map(|e| ((e.source, e.target), EdgeState { capacity: e.capacity, flow: e.flow, examining: false, examined: false }))
                .collect();

            state.traversal = Default::default();

            let exec = &mut state.execution;
            exec.status = RunStatus::Running;
            exec.phase = Phase::None;
            exec.iteration = 0;
            exec.current_flow = 0.0;
            exec.max_flow = None;
            exec.execution_time_ms = None;
            exec.last_error = None;
        }

        EngineEvent::NodeVisited { node_id } => {
            state.traversal.visited.insert(*node_id);
            if state.execution.phase == Phase::Bfs {
                state.traversal.active_bfs.insert(*node_id);
                state.traversal.current_bfs_node = Some(*node_id);
            }
        }

        EngineEvent::EdgeExamined { source, target, flow } => {
            // One edge examining at a time
            for edge in state.graph.edges.values_mut() {
                edge.examining = false;
            }
            match state.graph.edges.get_mut(&(*source, *target)) {
                Some(edge) => {
                    edge.examining = true;
                    edge.examined = true;
                    edge.flow = *flow;
                }
                None => warn!("edge_examined for unknown edge {} -> {}", source, target),
            }
            state.traversal.active_dfs.insert(*target);
            state.traversal.current_dfs_node = Some(*target);
            state.execution.phase = Phase::Dfs;
        }

        EngineEvent::EdgeExplored { source, target, flow } => {
            update_edge_flow(state, *source, *target, *flow, false);
        }

        EngineEvent::EdgeUpdated { source, target, flow } => {
            update_edge_flow(state, *source, *target, *flow, true);
        }

        EngineEvent::BfsStart => {
            state.execution.phase = Phase::Bfs;
            let t = &mut state.traversal;
            t.current_path.clear();
            t.active_bfs.clear();
            t.current_bfs_node = None;
            t.frontiers.clear();
            t.current_dfs_node = None;
        }

        EngineEvent::BfsFrontier { frontier } => {
            if frontier.is_empty() {
                return;
            }
            let t = &mut state.traversal;
            if t.frontiers.len() == FRONTIER_CAP {
                t.frontiers.pop_front();
            }
            t.frontiers.push_back(frontier.clone());
            t.active_bfs = frontier.iter().copied().collect();
        }

        // Deliberately non-clearing: the completed phase stays on screen
        // until the next phase-start event supersedes it.
        EngineEvent::BfsComplete | EngineEvent::DfsComplete => {}

        EngineEvent::DfsStart => {
            state.execution.phase = Phase::Dfs;
            let t = &mut state.traversal;
            t.active_bfs.clear();
            t.current_bfs_node = None;
            t.frontiers.clear();
            t.current_path.clear();
            t.parallel_paths.clear();
        }

        EngineEvent::DfsVisit { path } => {
            let t = &mut state.traversal;
            if let Some(&terminal) = path.last() {
                if !t.parallel_paths.iter().any(|p| p.last() == Some(&terminal)) {
                    t.parallel_paths.push(path.clone());
                }
                t.active_dfs.insert(terminal);
            }
            t.current_path = path.clone();
        }

        EngineEvent::PathFound { path } => {
            let t = &mut state.traversal;
            if !t.parallel_paths.iter().any(|p| p == path) {
                t.parallel_paths.push(path.clone());
            }
            t.current_path = path.clone();
            if let Some(&terminal) = path.last() {
                t.current_dfs_node = Some(terminal);
            }
        }

        EngineEvent::PathRejected { rejected_path: path } | EngineEvent::Backtrack { path } => {
            record_dead_end(state, path, rejected_path_cap);
        }

        EngineEvent::IterationStart { iteration } => {
            state.execution.iteration = *iteration;
            state.traversal.reset_iteration();
        }

        EngineEvent::FlowUpdate { current_flow } => {
            state.execution.current_flow = *current_flow;
        }

        EngineEvent::AlgorithmComplete { max_flow, execution_time_ms } => {
            finish_run(state, *max_flow);
            if execution_time_ms.is_some() {
                state.execution.execution_time_ms = *execution_time_ms;
            }
        }

        EngineEvent::AlgorithmStopped { max_flow } => {
            finish_run(state, *max_flow);
        }

        EngineEvent::Ready { source, sink } => {
            state.execution.source = Some(*source);
            state.execution.sink = Some(*sink);
        }

        EngineEvent::Error { message } => {
            warn!("engine error: {}", message);
            state.execution.status = RunStatus::Error;
            state.execution.phase = Phase::None;
            state.execution.last_error = Some(message.clone());
        }

        EngineEvent::Unknown => {
            debug!("unhandled event type");
        }
    }
}

fn update_edge_flow(state: &mut AppState, source: NodeId, target: NodeId, flow: f64, clear_examining: bool) {
    match state.graph.edges.get_mut(&(source, target)) {
        Some(edge) => {
            edge.flow = flow;
            if clear_examining {
                edge.examining = false;
            }
        }
        None => warn!("flow update for unknown edge {} -> {}", source, target),
    }
}

fn record_dead_end(state: &mut AppState, path: &[NodeId], cap: Option<usize>) {
    let t = &mut state.traversal;
    if let Some(cap) = cap {
        while t.rejected_paths.len() >= cap.max(1) {
            t.rejected_paths.remove(0);
        }
    }
    t.rejected_paths.push(path.to_vec());
    if let Some(&terminal) = path.last() {
        t.last_rejected_node = Some(terminal);
        t.current_dfs_node = Some(terminal);
    }
}

/// Shared tail of `algorithm_complete` / `algorithm_stopped`. Completion keeps
/// the final augmenting path highlighted: DFS focus is preserved (or recovered
/// from the current path) while the BFS focus is dropped.
fn finish_run(state: &mut AppState, max_flow: Option<f64>) {
    let exec = &mut state.execution;
    exec.status = RunStatus::Complete;
    exec.max_flow = Some(max_flow.unwrap_or(exec.current_flow));
    exec.phase = Phase::None;

    let t = &mut state.traversal;
    t.current_bfs_node = None;
    if t.current_dfs_node.is_none() {
        t.current_dfs_node = t.current_path.last().copied();
    }
}
