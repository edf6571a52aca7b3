//! Graph store implementations.
//!
//! # Available Stores
//!
//! | Store | Use Case | Features |
//! |-------|----------|----------|
//! | [`InMemoryGraphStore`] | Session-scoped graph | Adjacency index, `RwLock` serialization |

mod memory;

pub use memory::InMemoryGraphStore;

// Re-export trait for convenience
pub use crate::storage::traits::GraphStore;
