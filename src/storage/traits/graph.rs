//! Graph store trait for the knowledge graph.
//!
//! The store owns entities and relationships and enforces the identity and
//! typing invariants. Traversal, routing and export are built on top of it in
//! the service layer.
//!
//! # Guarantees
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `add_entity` | O(1) | Insert or attribute merge, never retypes a known type |
//! | `add_relationship` | O(1) | Always appends; creates `unknown` endpoints |
//! | `get_entity` | O(1) | By ID lookup |
//! | `query_entities_by_attribute` | O(n) | Exact match, insertion order |
//! | `incident_relationships` | O(k) | k = degree, insertion order |
//! | `snapshot` | O(n + m) | Entities and relationships under one read |
//! | `neighborhood` | O(visited) | Bounded BFS under one read |
//!
//! Entities are never deleted and relationships are never updated, so a
//! relationship always references stored entities.
//!
//! # Example
//!
//! ```rust
//! use rivalgraph::models::graph::{Attributes, AttributeValue, EntityType};
//! use rivalgraph::storage::{GraphStore, InMemoryGraphStore};
//!
//! let store = InMemoryGraphStore::new();
//! let mut attributes = Attributes::new();
//! attributes.insert("segment".to_string(), AttributeValue::from("enterprise"));
//! store.add_entity("Acme", EntityType::Company, attributes)?;
//!
//! let enterprise = store.query_entities_by_attribute(
//!     EntityType::Company,
//!     "segment",
//!     &AttributeValue::from("enterprise"),
//! )?;
//! assert_eq!(enterprise.len(), 1);
//! # Ok::<(), rivalgraph::Error>(())
//! ```

use crate::Result;
use crate::models::graph::{
    AttributeValue, Attributes, Entity, EntityId, EntityType, Relationship, RelationshipType,
};
use std::collections::HashMap;

/// Every entity and relationship, read under a single lock acquisition.
///
/// Every relationship's endpoints are among `entities`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    /// Entities in insertion order.
    pub entities: Vec<Entity>,
    /// Relationships in insertion order.
    pub relationships: Vec<Relationship>,
}

impl GraphSnapshot {
    /// Incident relationship count per entity, self-loops counted once.
    #[must_use]
    pub fn degrees(&self) -> HashMap<&EntityId, usize> {
        let mut degrees = HashMap::new();
        for rel in &self.relationships {
            *degrees.entry(&rel.source).or_insert(0) += 1;
            if !rel.is_self_loop() {
                *degrees.entry(&rel.target).or_insert(0) += 1;
            }
        }
        degrees
    }
}

/// Entities within a hop bound of a center, read under a single lock
/// acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    /// The entity the expansion started from.
    pub center: EntityId,
    /// Visited entities with their hop distance, in discovery order.
    pub entities: Vec<(Entity, u32)>,
    /// Relationships whose endpoints were both visited, in insertion order.
    pub relationships: Vec<Relationship>,
}

/// Trait for knowledge graph stores.
///
/// # Implementor Notes
///
/// - Methods use `&self` so a store can be shared via `Arc`
/// - Use interior mutability with a reader-writer discipline: mutations are
///   serialized, reads may run concurrently while no write is in flight
/// - Every method that takes an id must resolve it with [`GraphStore::resolve_id`]
/// - Iteration order is insertion order everywhere
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Identity
    // ========================================================================

    /// Maps a caller-supplied id or name to the stored [`EntityId`].
    fn resolve_id(&self, id: &str) -> EntityId;

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Creates an entity, or merges attributes into the existing one.
    ///
    /// An existing `unknown` placeholder takes the requested type. Requesting
    /// `unknown` for a known entity merges attributes without retyping.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TypeMismatch`] if the entity exists with a
    /// different known type, or an operation error if the store is unusable.
    fn add_entity(&self, id: &str, entity_type: EntityType, attributes: Attributes)
    -> Result<Entity>;

    /// Appends a relationship, creating absent endpoints as `unknown`.
    ///
    /// Duplicate edges are kept: two assertions of the same relation with
    /// different attributes are two edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn add_relationship(
        &self,
        source: &str,
        target: &str,
        relation_type: RelationshipType,
        attributes: Attributes,
    ) -> Result<Relationship>;

    /// Removes every entity and relationship.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn clear(&self) -> Result<()>;

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Retrieves an entity by ID. `None` means not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn get_entity(&self, id: &str) -> Result<Option<Entity>>;

    /// Returns entities of one type whose attribute equals `value` exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn query_entities_by_attribute(
        &self,
        entity_type: EntityType,
        attribute_name: &str,
        value: &AttributeValue,
    ) -> Result<Vec<Entity>>;

    /// Returns all entities in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn entities(&self) -> Result<Vec<Entity>>;

    /// Returns all relationships in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn relationships(&self) -> Result<Vec<Relationship>>;

    /// Returns relationships touching `id` in either direction, in insertion
    /// order. A self-loop appears once.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn incident_relationships(&self, id: &str) -> Result<Vec<Relationship>>;

    /// Returns entities and relationships as one consistent view.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn snapshot(&self) -> Result<GraphSnapshot>;

    /// Breadth-first expansion from `id` up to `depth` hops over any
    /// relationship in either direction, neighbors in edge insertion order.
    ///
    /// Returns `None` if `id` is not stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn neighborhood(&self, id: &str, depth: u32) -> Result<Option<Neighborhood>>;

    /// Returns the number of entities.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn entity_count(&self) -> Result<usize>;

    /// Returns the number of relationships.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn relationship_count(&self) -> Result<usize>;

    // ========================================================================
    // Derived
    // ========================================================================

    /// Returns true if an entity with this id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.get_entity(id)?.is_some())
    }

    /// Returns the number of relationships touching `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn degree(&self, id: &str) -> Result<usize> {
        Ok(self.incident_relationships(id)?.len())
    }

    /// Returns relationships leaving `id` with the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn outgoing(&self, id: &str, relation_type: &RelationshipType) -> Result<Vec<Relationship>> {
        let id = self.resolve_id(id);
        Ok(self
            .incident_relationships(id.as_str())?
            .into_iter()
            .filter(|r| r.source == id && r.relation_type == *relation_type)
            .collect())
    }

    /// Returns relationships arriving at `id` with the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    fn incoming(&self, id: &str, relation_type: &RelationshipType) -> Result<Vec<Relationship>> {
        let id = self.resolve_id(id);
        Ok(self
            .incident_relationships(id.as_str())?
            .into_iter()
            .filter(|r| r.target == id && r.relation_type == *relation_type)
            .collect())
    }
}
