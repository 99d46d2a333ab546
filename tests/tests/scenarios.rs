//! End-to-end reducer scenarios run through the store, matching the event
//! sequences a real engine emits.

use flowlens::proto::{EngineEvent, GraphEdge, GraphNode};
use flowlens::{views, Phase, RunStatus, Store};

mod common;

fn apply_json(store: &Store, json: &str) {
    store.apply(&EngineEvent::parse(json).unwrap());
}

#[test]
fn full_run_from_init_to_completion() {
    let store = Store::default();

    store.apply(&EngineEvent::Init {
        nodes: (0..3).map(|id| GraphNode { id, x: id as f64 * 100.0, y: 0.0, label: None }).collect(),
        edges: vec![
            GraphEdge { source: 0, target: 1, capacity: 5.0, flow: 0.0 },
            GraphEdge { source: 1, target: 2, capacity: 3.0, flow: 0.0 },
        ],
    });
    assert_eq!(store.read(|s| s.execution.status), RunStatus::Running);

    apply_json(&store, r#"{"type":"node_visited","node_id":1}"#);
    apply_json(&store, r#"{"type":"edge_examined","source":0,"target":1,"flow":3}"#);
    apply_json(&store, r#"{"type":"flow_update","current_flow":3}"#);
    apply_json(&store, r#"{"type":"algorithm_complete","max_flow":3}"#);

    let state = store.snapshot();
    assert_eq!(state.traversal.visited, [1].into());
    let edge = &state.graph.edges[&(0, 1)];
    assert_eq!(edge.flow, 3.0);
    assert!(edge.examined);
    assert_eq!(state.execution.current_flow, 3.0);
    assert_eq!(state.execution.max_flow, Some(3.0));
    assert_eq!(state.execution.status, RunStatus::Complete);
}

#[test]
fn bfs_frontiers_assign_traversal_levels() {
    let store = Store::default();
    apply_json(&store, r#"{"type":"bfs_start"}"#);
    apply_json(&store, r#"{"type":"bfs_frontier","frontier":[1,2]}"#);
    apply_json(&store, r#"{"type":"bfs_frontier","frontier":[3]}"#);

    let state = store.snapshot();
    assert_eq!(state.execution.phase, Phase::Bfs);
    assert_eq!(state.traversal.active_bfs, [3].into());

    let levels = views::traversal_levels(&state);
    assert_eq!(levels.get(&1), Some(&1));
    assert_eq!(levels.get(&2), Some(&1));
    assert_eq!(levels.get(&3), Some(&2));
}

#[test]
fn iteration_boundary_keeps_rejected_history() {
    let store = Store::default();
    apply_json(&store, r#"{"type":"iteration_start","iteration":1}"#);
    apply_json(&store, r#"{"type":"path_found","path":[0,1,2]}"#);
    apply_json(&store, r#"{"type":"path_rejected","rejected_path":[0,3]}"#);
    apply_json(&store, r#"{"type":"iteration_start","iteration":2}"#);

    let state = store.snapshot();
    assert_eq!(state.execution.iteration, 2);
    assert!(state.traversal.current_path.is_empty());
    assert!(state.traversal.parallel_paths.is_empty());
    // dead ends are run-scoped, not iteration-scoped
    assert_eq!(state.traversal.rejected_paths, vec![vec![0, 3]]);
}

#[test]
fn phase_flow_across_a_whole_iteration() {
    let store = Store::default();
    apply_json(&store, r#"{"type":"bfs_start"}"#);
    apply_json(&store, r#"{"type":"bfs_frontier","frontier":[1]}"#);
    apply_json(&store, r#"{"type":"bfs_complete"}"#);

    // bfs_complete leaves the frontier view intact until dfs_start
    let state = store.snapshot();
    assert_eq!(state.execution.phase, Phase::Bfs);
    assert_eq!(state.traversal.frontiers.len(), 1);

    apply_json(&store, r#"{"type":"dfs_start"}"#);
    apply_json(&store, r#"{"type":"dfs_visit","path":[0,1]}"#);
    apply_json(&store, r#"{"type":"dfs_complete"}"#);

    let state = store.snapshot();
    assert_eq!(state.execution.phase, Phase::Dfs);
    assert!(state.traversal.frontiers.is_empty());
    assert_eq!(state.traversal.current_path, vec![0, 1]);
    // dfs_complete preserves the highlight
    assert_eq!(state.traversal.parallel_paths, vec![vec![0, 1]]);
}

#[test]
fn ready_records_source_and_sink() {
    let store = Store::default();
    apply_json(&store, r#"{"type":"ready","source":0,"sink":5}"#);
    let state = store.snapshot();
    assert_eq!(state.execution.source, Some(0));
    assert_eq!(state.execution.sink, Some(5));
}
