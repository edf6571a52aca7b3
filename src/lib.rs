//! # Rivalgraph
//!
//! An in-memory, typed knowledge graph for competitive-intelligence analysis.
//!
//! Rivalgraph stores companies, products, markets and people together with
//! typed, attributed relationships between them, and answers structural
//! questions over that graph: who competes with whom, which markets two
//! companies share, how two entities are indirectly connected.
//!
//! ## Features
//!
//! - Session-scoped graph with explicit `init` / `teardown` lifecycle
//! - Multi-graph storage with open-schema attributes
//! - Bounded breadth-first traversal, shortest relationship paths
//! - Keyword query classifier with data-driven intent routing
//! - Aggregate summaries and insertion-ordered export snapshots
//!
//! ## Example
//!
//! ```rust
//! use rivalgraph::models::graph::{Attributes, EntityType, RelationshipType};
//! use rivalgraph::services::GraphSession;
//! use rivalgraph::storage::GraphStore;
//!
//! let session = GraphSession::init();
//! let store = session.store();
//! store.add_entity("Acme", EntityType::Company, Attributes::new())?;
//! store.add_relationship("Acme", "Globex", RelationshipType::CompetesWith, Attributes::new())?;
//!
//! let competitors = session.traversal().get_competitors("globex")?;
//! assert_eq!(competitors[0].name, "Acme");
//! # Ok::<(), rivalgraph::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::GraphConfig;
pub use models::graph::{
    AttributeValue, Attributes, Entity, EntityId, EntityType, Relationship, RelationshipType,
};
pub use models::query::{QueryIntent, QueryMode, TraversalOperation};
pub use services::{
    GraphSession, IngestService, QueryRouter, SummaryService, TraversalService, classify,
    classify_question,
};
pub use storage::graph::{GraphStore, InMemoryGraphStore};

/// Error type for rivalgraph operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidArgument` | Zero depth, bounds above the ceiling, missing routing context |
/// | `TypeMismatch` | `add_entity` would retype an entity that already has a known type |
/// | `NotFound` | A caller demanded an entity that does not exist |
/// | `OperationFailed` | Poisoned locks, config I/O, serialization, logging init |
#[derive(Debug, ThisError)]
pub enum Error {
    /// A parameter was out of range or missing.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An entity already exists with a different known type.
    ///
    /// Signals an upstream data-integrity problem (for example an extractor
    /// labelling a product id as a company). The stored type is never
    /// overwritten.
    #[error("entity '{id}' has type {existing}, cannot store it as {requested}")]
    TypeMismatch {
        /// The conflicting entity id.
        id: String,
        /// The type already stored.
        existing: models::graph::EntityType,
        /// The type the caller asked for.
        requested: models::graph::EntityType,
    },

    /// A required entity was not found.
    ///
    /// Most lookups report absence through `Option` or an empty collection;
    /// this variant is for callers that need absence to be an error.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for rivalgraph operations.
pub type Result<T> = std::result::Result<T, Error>;
