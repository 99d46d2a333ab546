use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;
use tracing::info;

use flowlens::{ConnectionStatus, Dispatcher, EngineClient, Phase, RunStatus, Store};

mod common;
use common::*;

#[tokio::test]
async fn event_stream_drives_the_store() -> Result<()> {
    let engine = MockEngine::bind().await?;
    let store = Store::default();
    let client = EngineClient::new(store.clone(), &engine.url);

    let mut ws = engine.accept().await?;
    client.wait_connected().await?;
    assert_eq!(store.read(|s| s.connection.status), ConnectionStatus::Connected);

    send_event(
        &mut ws,
        r#"{"type":"init","nodes":[{"id":0,"x":0,"y":0},{"id":1,"x":100,"y":0}],"edges":[{"source":0,"target":1,"capacity":4}]}"#,
    )
    .await?;
    send_event(&mut ws, r#"{"type":"bfs_start"}"#).await?;
    send_event(&mut ws, r#"{"type":"node_visited","node_id":1}"#).await?;
    send_event(&mut ws, r#"{"type":"flow_update","current_flow":2}"#).await?;

    wait_for(&store, |s| s.execution.current_flow == 2.0).await?;
    let state = store.snapshot();
    assert_eq!(state.graph.nodes.len(), 2);
    assert_eq!(state.execution.status, RunStatus::Running);
    assert_eq!(state.execution.phase, Phase::Bfs);
    assert!(state.traversal.visited.contains(&1));
    assert!(state.traversal.active_bfs.contains(&1));

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_disturbing_the_stream() -> Result<()> {
    let engine = MockEngine::bind().await?;
    let store = Store::default();
    let client = EngineClient::new(store.clone(), &engine.url);

    let mut ws = engine.accept().await?;
    client.wait_connected().await?;

    send_event(&mut ws, "this is not json").await?;
    send_event(&mut ws, r#"{"type":"node_visited"}"#).await?; // missing node_id
    send_event(&mut ws, r#"{"type":"some_future_event","x":1}"#).await?;
    send_event(&mut ws, r#"{"type":"flow_update","current_flow":7}"#).await?;

    wait_for(&store, |s| s.execution.current_flow == 7.0).await?;
    assert_eq!(store.read(|s| s.connection.status), ConnectionStatus::Connected);
    assert!(store.read(|s| s.traversal.visited.is_empty()));

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn stop_command_reaches_the_engine() -> Result<()> {
    let engine = MockEngine::bind().await?;
    let store = Store::default();
    let client = Arc::new(EngineClient::new(store.clone(), &engine.url));

    let mut ws = engine.accept().await?;
    client.wait_connected().await?;

    store.set_status(RunStatus::Running);
    let dispatcher = Dispatcher::new(store.clone(), client.clone());
    dispatcher.stop().await?;

    let frame = recv_text(&mut ws).await?;
    assert_eq!(frame, r#"{"command":"stop"}"#);

    // no acknowledgment is ever sent; the fallback timer resolves the UI
    wait_for(&store, |s| s.execution.status == RunStatus::Idle).await?;
    Ok(())
}

#[tokio::test]
async fn reconnects_after_engine_drops_the_connection() -> Result<()> {
    let engine = MockEngine::bind().await?;
    let store = Store::default();
    let client = EngineClient::new(store.clone(), &engine.url);

    let mut ws = engine.accept().await?;
    client.wait_connected().await?;

    send_event(&mut ws, r#"{"type":"flow_update","current_flow":1}"#).await?;
    wait_for(&store, |s| s.execution.current_flow == 1.0).await?;

    info!("dropping the connection server-side");
    ws.send(Message::Close(None)).await?;
    drop(ws);
    wait_for(&store, |s| s.connection.status != ConnectionStatus::Connected).await?;

    // backoff after a clean close is one second; accept the second connection
    let mut ws = engine.accept().await?;
    client.wait_connected().await?;

    send_event(&mut ws, r#"{"type":"flow_update","current_flow":9}"#).await?;
    wait_for(&store, |s| s.execution.current_flow == 9.0).await?;

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn successful_handshake_restores_the_retry_budget() -> Result<()> {
    let engine = MockEngine::bind().await?;
    let addr = engine.url.trim_start_matches("ws://").to_string();
    let url = engine.url.clone();
    drop(engine);

    let store = Store::default();
    let client = EngineClient::new(store.clone(), &url);

    // nothing is listening, so the first attempt is refused
    wait_for(&store, |s| s.connection.reconnect_attempt == 1).await?;

    let engine = MockEngine::bind_at(&addr).await?;
    let ws = engine.accept().await?;
    client.wait_connected().await?;
    assert_eq!(store.read(|s| s.connection.reconnect_attempt), 0);

    info!("killing the established connection without a close handshake");
    drop(ws);
    wait_for(&store, |s| s.connection.status == ConnectionStatus::Connecting).await?;

    // the refused pre-handshake attempt is forgotten: this is retry one, not two
    assert_eq!(store.read(|s| s.connection.reconnect_attempt), 1);

    let mut ws = engine.accept().await?;
    client.wait_connected().await?;
    send_event(&mut ws, r#"{"type":"flow_update","current_flow":3}"#).await?;
    wait_for(&store, |s| s.execution.current_flow == 3.0).await?;

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn engine_drop_mid_run_forces_idle() -> Result<()> {
    let engine = MockEngine::bind().await?;
    let store = Store::default();
    let client = EngineClient::new(store.clone(), &engine.url);

    let mut ws = engine.accept().await?;
    client.wait_connected().await?;

    send_event(
        &mut ws,
        r#"{"type":"init","nodes":[{"id":0,"x":0,"y":0}],"edges":[]}"#,
    )
    .await?;
    wait_for(&store, |s| s.execution.status == RunStatus::Running).await?;

    ws.send(Message::Close(None)).await?;
    drop(ws);

    // the event stream is gone, so the run cannot be observed any further
    wait_for(&store, |s| s.execution.status == RunStatus::Idle).await?;

    client.shutdown().await?;
    Ok(())
}
