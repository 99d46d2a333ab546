//! Presentation-only projections recomputed from the snapshot on every
//! change. Nothing here mutates state.

use std::collections::{BTreeMap, BTreeSet};

use flowlens_proto::NodeId;

use crate::state::AppState;

fn collect_pairs(path: &[NodeId], out: &mut BTreeSet<(NodeId, NodeId)>) {
    for pair in path.windows(2) {
        out.insert((pair[0], pair[1]));
    }
}

/// Edges on the current path or any parallel path this iteration; used to
/// highlight active augmenting edges.
pub fn path_edges(state: &AppState) -> BTreeSet<(NodeId, NodeId)> {
    let mut edges = BTreeSet::new();
    collect_pairs(&state.traversal.current_path, &mut edges);
    for path in &state.traversal.parallel_paths {
        collect_pairs(path, &mut edges);
    }
    edges
}

/// Edges on any rejected (dead-end) path.
pub fn rejected_edges(state: &AppState) -> BTreeSet<(NodeId, NodeId)> {
    let mut edges = BTreeSet::new();
    for path in &state.traversal.rejected_paths {
        collect_pairs(path, &mut edges);
    }
    edges
}

/// Heuristic BFS depth per node, reconstructed from partial information.
/// Assignment order: the head of the current path is level 0; frontier `i`
/// members get level `i + 1`; remaining visited nodes inherit
/// `level(predecessor) + 1` from the first incoming edge whose source is
/// already assigned; anything left defaults to 0. Nodes that never appear in
/// a frontier are tolerated by construction.
pub fn traversal_levels(state: &AppState) -> BTreeMap<NodeId, u32> {
    let mut levels = BTreeMap::new();

    if let Some(&head) = state.traversal.current_path.first() {
        levels.insert(head, 0);
    }

    for (i, frontier) in state.traversal.frontiers.iter().enumerate() {
        for &node in frontier {
            levels.entry(node).or_insert(i as u32 + 1);
        }
    }

    for &node in &state.traversal.visited {
        if levels.contains_key(&node) {
            continue;
        }
        let inherited = state
            .graph
            .edges
            .keys()
            .filter(|(_, target)| *target == node)
            .find_map(|(source, _)| levels.get(source).map(|l| l + 1));
        levels.insert(node, inherited.unwrap_or(0));
    }

    levels
}

/// Minimum residual capacity along the current path; this is how much flow
/// the path can still push. Zero when no edge of the path exists in the
/// snapshot. Negative residuals (engine reporting flow above capacity) are
/// treated as exhausted.
pub fn bottleneck(state: &AppState) -> f64 {
    let mut min: Option<f64> = None;
    for pair in state.traversal.current_path.windows(2) {
        if let Some(edge) = state.graph.edges.get(&(pair[0], pair[1])) {
            let residual = (edge.capacity - edge.flow).max(0.0);
            min = Some(match min {
                Some(m) => m.min(residual),
                None => residual,
            });
        }
    }
    min.unwrap_or(0.0)
}

/// Fraction of graph nodes visited this iteration, for progress displays.
pub fn visited_fraction(state: &AppState) -> f64 {
    let total = state.graph.nodes.len();
    if total == 0 {
        return 0.0;
    }
    state.traversal.visited.len() as f64 / total as f64
}
