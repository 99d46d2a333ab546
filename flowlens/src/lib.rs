//! # FlowLens
//!
//! FlowLens reconstructs, from a remote max-flow engine's partial and
//! incremental event stream, a single consistent in-memory model of where
//! the algorithm currently is - suitable for driving a graph renderer and
//! status displays.
//!
//! ## Core pieces
//!
//! - **Store** - owns the snapshot, applies the reducer atomically, notifies
//!   subscribers
//! - **Reducer** - pure fold of engine events into the snapshot
//! - **Views** - presentation projections (path edges, traversal levels)
//!   computed from the snapshot, never mutating it
//! - **EngineClient** - websocket connection manager with exponential-backoff
//!   reconnect
//! - **Dispatcher** - start/stop intents with optimistic local resolution
//!
//! ## Getting started
//!
//! ```rust,no_run
//! use flowlens::{Dispatcher, EngineClient, Store};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Store::default();
//!     let client = Arc::new(EngineClient::new(store.clone(), "http://localhost:8000"));
//!     client.wait_connected().await?;
//!
//!     let _guard = store.subscribe(|_change| {
//!         // re-render from store.snapshot()
//!     });
//!
//!     let dispatcher = Dispatcher::new(store, client);
//!     let config = dispatcher.config().await?;
//!     println!("available algorithms: {:?}", config.algorithms);
//!     Ok(())
//! }
//! ```

pub use flowlens_core::{
    broadcast, dispatcher, reducer, state, store, views, AppState, CommandSink, ConnectionStatus, DispatchError, Dispatcher,
    DispatcherTimings, EngineTransport, Phase, RunStatus, SendError, StateChange, Store, StoreOptions, TransportError,
};
pub use flowlens_proto as proto;
pub use flowlens_websocket_client::{ApiError, CommandSender, EngineApi, EngineClient};
