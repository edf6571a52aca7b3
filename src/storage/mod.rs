//! Storage layer.
//!
//! The graph lives entirely in process memory. [`traits::GraphStore`] is the
//! store contract consumed by the services; [`graph::InMemoryGraphStore`] is
//! the session-scoped implementation.

// Allow significant_drop_tightening - lock guards are held for whole operations
// so each call sees one consistent graph state.
#![allow(clippy::significant_drop_tightening)]

pub mod graph;
pub mod traits;

pub use graph::InMemoryGraphStore;
pub use traits::{GraphSnapshot, GraphStore, Neighborhood};
