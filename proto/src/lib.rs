pub mod command;
pub mod event;
pub mod graph;

pub use command::*;
pub use event::*;
pub use graph::*;
