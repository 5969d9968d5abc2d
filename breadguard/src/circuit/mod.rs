//! Circuit documents and the bus connectivity graph built from them.

pub mod graph;
pub mod schema;

pub use graph::{resolve_bus, BusGraph};
pub use schema::*;
