//! # FlowLens WebSocket Client
//!
//! Native connection manager for the max-flow engine's event stream.
//!
//! ## Automatic reconnection
//!
//! Reconnects with exponential backoff (1s doubling, capped at 30s) for up to
//! five consecutive failures, after which an explicit [`EngineClient::reconnect`]
//! is required.
//!
//! ## Two channels
//!
//! Events and the stop command travel over the websocket; the start request
//! and config query go over a plain HTTP request/response channel to the same
//! engine ([`EngineApi`]).
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! # use flowlens_core::{Store, Dispatcher};
//! # use flowlens_websocket_client::EngineClient;
//! # use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Store::default();
//!     let client = Arc::new(EngineClient::new(store.clone(), "http://localhost:8000"));
//!     client.wait_connected().await?;
//!
//!     let dispatcher = Dispatcher::new(store, client);
//!     let config = dispatcher.config().await?;
//!     println!("algorithms: {:?}", config.algorithms);
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod sender;

pub use api::{ApiError, EngineApi};
pub use client::EngineClient;
pub use sender::CommandSender;
