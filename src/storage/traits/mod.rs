//! Storage backend traits.

mod graph;

pub use graph::{GraphSnapshot, GraphStore, Neighborhood};
