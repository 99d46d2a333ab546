pub mod broadcast;
pub mod connector;
pub mod dispatcher;
pub mod reducer;
pub mod state;
pub mod store;
pub mod views;

pub use connector::{CommandSink, EngineTransport, SendError, TransportError};
pub use dispatcher::{DispatchError, Dispatcher, DispatcherTimings};
pub use state::{AppState, ConnectionStatus, Phase, RunStatus};
pub use store::{StateChange, Store, StoreOptions};

pub use flowlens_proto as proto;
