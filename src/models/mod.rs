//! Data models for rivalgraph.
//!
//! This module contains the graph data structures and the query routing
//! vocabulary shared by the services.

pub mod graph;
pub mod query;

pub use graph::{
    AttributeValue, Attributes, Entity, EntityId, EntityType, Relationship, RelationshipId,
    RelationshipType,
};
pub use query::{QueryIntent, QueryMode, TraversalOperation};
