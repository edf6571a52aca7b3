//! In-memory graph store.
//!
//! Session-scoped implementation of [`GraphStore`]. All state lives behind a
//! single `RwLock`, so mutations are serialized and readers share access.
//! Nothing is persisted.

use crate::models::graph::{
    AttributeValue, Attributes, Entity, EntityId, EntityType, Relationship, RelationshipId,
    RelationshipType,
};
use crate::storage::traits::{GraphSnapshot, GraphStore, Neighborhood};
use crate::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Entities, relationships and the adjacency index.
#[derive(Debug, Default)]
struct GraphState {
    /// Entities in insertion order.
    entities: Vec<Entity>,
    /// Entity id to position in `entities`.
    index: HashMap<EntityId, usize>,
    /// Relationships in insertion order; position equals sequence number.
    relationships: Vec<Relationship>,
    /// Entity id to positions of incident relationships, ascending.
    adjacency: HashMap<EntityId, Vec<usize>>,
}

impl GraphState {
    fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.index.get(id).map(|&pos| &self.entities[pos])
    }

    fn incident(&self, id: &EntityId) -> &[usize] {
        self.adjacency.get(id).map_or(&[][..], Vec::as_slice)
    }

    /// Bounded BFS from the entity at position `start`.
    fn neighborhood(&self, start: usize, depth: u32) -> Neighborhood {
        let mut distances: HashMap<usize, u32> = HashMap::from([(start, 0)]);
        let mut order = vec![start];
        let mut queue = VecDeque::from([(start, 0_u32)]);

        while let Some((pos, hops)) = queue.pop_front() {
            if hops >= depth {
                continue;
            }
            let id = &self.entities[pos].id;
            for &edge in self.incident(id) {
                let Some(next) = self.relationships[edge]
                    .other_end(id)
                    .and_then(|next| self.index.get(next))
                    .copied()
                else {
                    continue;
                };
                if distances.contains_key(&next) {
                    continue;
                }
                distances.insert(next, hops + 1);
                order.push(next);
                queue.push_back((next, hops + 1));
            }
        }

        let visited = |id: &EntityId| {
            self.index
                .get(id)
                .is_some_and(|pos| distances.contains_key(pos))
        };
        let mut edges: Vec<usize> = order
            .iter()
            .flat_map(|&pos| self.incident(&self.entities[pos].id).iter().copied())
            .filter(|&edge| {
                let rel = &self.relationships[edge];
                visited(&rel.source) && visited(&rel.target)
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();

        Neighborhood {
            center: self.entities[start].id.clone(),
            entities: order
                .iter()
                .map(|pos| {
                    let distance = distances.get(pos).copied().unwrap_or_default();
                    (self.entities[*pos].clone(), distance)
                })
                .collect(),
            relationships: edges
                .into_iter()
                .map(|edge| self.relationships[edge].clone())
                .collect(),
        }
    }

    /// Inserts an `unknown` placeholder unless the id is already stored.
    fn ensure_placeholder(&mut self, id: &EntityId, name: &str) {
        if self.index.contains_key(id) {
            return;
        }
        tracing::debug!(entity = %id, "creating placeholder entity for relationship endpoint");
        self.index.insert(id.clone(), self.entities.len());
        self.entities
            .push(Entity::new(id.clone(), name, EntityType::Unknown));
    }
}

/// In-memory graph store.
///
/// Uses `RwLock` for thread-safe access with reader-writer semantics.
///
/// # Example
///
/// ```rust
/// use rivalgraph::models::graph::{Attributes, EntityType, RelationshipType};
/// use rivalgraph::storage::{GraphStore, InMemoryGraphStore};
///
/// let store = InMemoryGraphStore::new();
/// store.add_relationship(
///     "Acme",
///     "Cloud Storage",
///     RelationshipType::OperatesIn,
///     Attributes::new(),
/// )?;
///
/// // The market was created implicitly and can be typed later.
/// let market = store.get_entity("cloud storage")?.unwrap();
/// assert_eq!(market.entity_type, EntityType::Unknown);
/// store.add_entity("Cloud Storage", EntityType::Market, Attributes::new())?;
/// # Ok::<(), rivalgraph::Error>(())
/// ```
#[derive(Debug)]
pub struct InMemoryGraphStore {
    state: RwLock<GraphState>,
    normalize_ids: bool,
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGraphStore {
    /// Creates a new empty store with case-normalized ids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_normalization(true)
    }

    /// Creates a new empty store, choosing whether ids are case-normalized.
    ///
    /// With normalization off, ids are only trimmed.
    #[must_use]
    pub fn with_normalization(normalize_ids: bool) -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
            normalize_ids,
        }
    }

    /// Returns true if ids are case-normalized.
    #[must_use]
    pub const fn normalizes_ids(&self) -> bool {
        self.normalize_ids
    }

    fn read_state(&self, operation: &str) -> Result<RwLockReadGuard<'_, GraphState>> {
        self.state.read().map_err(|_| Error::OperationFailed {
            operation: operation.to_string(),
            cause: "Lock poisoned".to_string(),
        })
    }

    fn write_state(&self, operation: &str) -> Result<RwLockWriteGuard<'_, GraphState>> {
        self.state.write().map_err(|_| Error::OperationFailed {
            operation: operation.to_string(),
            cause: "Lock poisoned".to_string(),
        })
    }

    /// Resolves an id, rejecting ids that are empty after trimming.
    fn checked_id(&self, id: &str, role: &str) -> Result<EntityId> {
        let resolved = self.resolve_id(id);
        if resolved.as_str().is_empty() {
            return Err(Error::InvalidArgument(format!("{role} id must not be empty")));
        }
        Ok(resolved)
    }
}

impl GraphStore for InMemoryGraphStore {
    fn resolve_id(&self, id: &str) -> EntityId {
        if self.normalize_ids {
            EntityId::normalized(id)
        } else {
            EntityId::new(id.trim())
        }
    }

    fn add_entity(
        &self,
        id: &str,
        entity_type: EntityType,
        attributes: Attributes,
    ) -> Result<Entity> {
        let entity_id = self.checked_id(id, "entity")?;
        let mut state = self.write_state("add_entity")?;

        if let Some(&pos) = state.index.get(&entity_id) {
            let existing = &mut state.entities[pos];

            if entity_type.is_known() && existing.entity_type != entity_type {
                if existing.entity_type.is_known() {
                    tracing::warn!(
                        entity = %entity_id,
                        existing = %existing.entity_type,
                        requested = %entity_type,
                        "refusing to retype entity"
                    );
                    return Err(Error::TypeMismatch {
                        id: entity_id.to_string(),
                        existing: existing.entity_type,
                        requested: entity_type,
                    });
                }
                tracing::debug!(
                    entity = %entity_id,
                    entity_type = %entity_type,
                    "typing placeholder entity"
                );
                existing.entity_type = entity_type;
            }

            if existing.merge_attributes(attributes) {
                tracing::debug!(entity = %entity_id, "merged entity attributes");
            }
            return Ok(existing.clone());
        }

        let entity =
            Entity::new(entity_id.clone(), id.trim(), entity_type).with_attributes(attributes);
        let pos = state.entities.len();
        state.index.insert(entity_id, pos);
        state.entities.push(entity.clone());
        Ok(entity)
    }

    fn add_relationship(
        &self,
        source: &str,
        target: &str,
        relation_type: RelationshipType,
        attributes: Attributes,
    ) -> Result<Relationship> {
        let source_id = self.checked_id(source, "source")?;
        let target_id = self.checked_id(target, "target")?;
        let mut state = self.write_state("add_relationship")?;

        state.ensure_placeholder(&source_id, source.trim());
        state.ensure_placeholder(&target_id, target.trim());

        let pos = state.relationships.len();
        let relationship = Relationship::new(
            RelationshipId::new(pos as u64),
            source_id.clone(),
            target_id.clone(),
            relation_type,
        )
        .with_attributes(attributes);

        state.relationships.push(relationship.clone());
        state.adjacency.entry(source_id.clone()).or_default().push(pos);
        if target_id != source_id {
            state.adjacency.entry(target_id).or_default().push(pos);
        }

        Ok(relationship)
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.write_state("clear")?;
        *state = GraphState::default();
        Ok(())
    }

    fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        let entity_id = self.resolve_id(id);
        let state = self.read_state("get_entity")?;
        Ok(state.entity(&entity_id).cloned())
    }

    fn query_entities_by_attribute(
        &self,
        entity_type: EntityType,
        attribute_name: &str,
        value: &AttributeValue,
    ) -> Result<Vec<Entity>> {
        let state = self.read_state("query_entities_by_attribute")?;
        Ok(state
            .entities
            .iter()
            .filter(|e| e.entity_type == entity_type && e.attribute(attribute_name) == Some(value))
            .cloned()
            .collect())
    }

    fn entities(&self) -> Result<Vec<Entity>> {
        let state = self.read_state("entities")?;
        Ok(state.entities.clone())
    }

    fn relationships(&self) -> Result<Vec<Relationship>> {
        let state = self.read_state("relationships")?;
        Ok(state.relationships.clone())
    }

    fn incident_relationships(&self, id: &str) -> Result<Vec<Relationship>> {
        let entity_id = self.resolve_id(id);
        let state = self.read_state("incident_relationships")?;
        Ok(state
            .incident(&entity_id)
            .iter()
            .map(|&pos| state.relationships[pos].clone())
            .collect())
    }

    fn snapshot(&self) -> Result<GraphSnapshot> {
        let state = self.read_state("snapshot")?;
        Ok(GraphSnapshot {
            entities: state.entities.clone(),
            relationships: state.relationships.clone(),
        })
    }

    fn neighborhood(&self, id: &str, depth: u32) -> Result<Option<Neighborhood>> {
        let entity_id = self.resolve_id(id);
        let state = self.read_state("neighborhood")?;
        Ok(state
            .index
            .get(&entity_id)
            .map(|&start| state.neighborhood(start, depth)))
    }

    fn entity_count(&self) -> Result<usize> {
        Ok(self.read_state("entity_count")?.entities.len())
    }

    fn relationship_count(&self) -> Result<usize> {
        Ok(self.read_state("relationship_count")?.relationships.len())
    }

    fn degree(&self, id: &str) -> Result<usize> {
        let entity_id = self.resolve_id(id);
        let state = self.read_state("degree")?;
        Ok(state.incident(&entity_id).len())
    }
}

#[cfg(test)]
#[allow(clippy::redundant_clone)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, AttributeValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_add_and_get_entity() {
        let store = InMemoryGraphStore::new();
        store
            .add_entity("Acme Corp", EntityType::Company, Attributes::new())
            .unwrap();

        let retrieved = store.get_entity("ACME CORP").unwrap();
        assert!(retrieved.is_some());
        let entity = retrieved.unwrap();
        assert_eq!(entity.id.as_str(), "acme corp");
        assert_eq!(entity.name, "Acme Corp");
        assert_eq!(entity.entity_type, EntityType::Company);
    }

    #[test]
    fn test_get_missing_entity() {
        let store = InMemoryGraphStore::new();
        assert!(store.get_entity("nobody").unwrap().is_none());
    }

    #[test]
    fn test_add_entity_idempotent() {
        let store = InMemoryGraphStore::new();
        let attributes = attrs(&[("hq", AttributeValue::from("Berlin"))]);

        let first = store
            .add_entity("Acme", EntityType::Company, attributes.clone())
            .unwrap();
        let second = store
            .add_entity("Acme", EntityType::Company, attributes)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.entity_count().unwrap(), 1);
    }

    #[test]
    fn test_add_entity_merges_attributes() {
        let store = InMemoryGraphStore::new();
        store
            .add_entity(
                "Acme",
                EntityType::Company,
                attrs(&[("hq", AttributeValue::from("Berlin"))]),
            )
            .unwrap();
        let merged = store
            .add_entity(
                "acme",
                EntityType::Company,
                attrs(&[
                    ("hq", AttributeValue::from("Paris")),
                    ("public", AttributeValue::from(true)),
                ]),
            )
            .unwrap();

        assert_eq!(merged.name, "Acme");
        assert_eq!(merged.attribute("hq"), Some(&AttributeValue::from("Paris")));
        assert_eq!(merged.attribute("public"), Some(&AttributeValue::from(true)));
        assert_eq!(store.entity_count().unwrap(), 1);
    }

    #[test]
    fn test_add_entity_type_mismatch() {
        let store = InMemoryGraphStore::new();
        store
            .add_entity("Widget", EntityType::Product, Attributes::new())
            .unwrap();

        let result = store.add_entity("Widget", EntityType::Company, Attributes::new());
        assert!(matches!(
            result,
            Err(Error::TypeMismatch {
                existing: EntityType::Product,
                requested: EntityType::Company,
                ..
            })
        ));

        let stored = store.get_entity("widget").unwrap().unwrap();
        assert_eq!(stored.entity_type, EntityType::Product);
    }

    #[test]
    fn test_add_entity_unknown_request_keeps_type() {
        let store = InMemoryGraphStore::new();
        store
            .add_entity("Widget", EntityType::Product, Attributes::new())
            .unwrap();

        let merged = store
            .add_entity(
                "Widget",
                EntityType::Unknown,
                attrs(&[("category", AttributeValue::from("tools"))]),
            )
            .unwrap();
        assert_eq!(merged.entity_type, EntityType::Product);
        assert!(merged.attribute("category").is_some());
    }

    #[test]
    fn test_empty_id_rejected() {
        let store = InMemoryGraphStore::new();
        let result = store.add_entity("   ", EntityType::Company, Attributes::new());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = store.add_relationship(
            "Acme",
            "",
            RelationshipType::CompetesWith,
            Attributes::new(),
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(store.entity_count().unwrap(), 0);
    }

    #[test]
    fn test_relationship_creates_placeholders() {
        let store = InMemoryGraphStore::new();
        store
            .add_relationship(
                "Acme",
                "Globex",
                RelationshipType::CompetesWith,
                Attributes::new(),
            )
            .unwrap();

        let globex = store.get_entity("globex").unwrap().unwrap();
        assert_eq!(globex.entity_type, EntityType::Unknown);
        assert_eq!(globex.name, "Globex");

        let typed = store
            .add_entity("Globex", EntityType::Company, Attributes::new())
            .unwrap();
        assert_eq!(typed.entity_type, EntityType::Company);
        assert_eq!(store.entity_count().unwrap(), 2);
    }

    #[test]
    fn test_relationship_multiplicity() {
        let store = InMemoryGraphStore::new();
        store
            .add_relationship(
                "Acme",
                "Globex",
                RelationshipType::CompetesWith,
                attrs(&[("since", AttributeValue::from("2019"))]),
            )
            .unwrap();
        store
            .add_relationship(
                "Acme",
                "Globex",
                RelationshipType::CompetesWith,
                attrs(&[("since", AttributeValue::from("2021"))]),
            )
            .unwrap();

        let rels = store.relationships().unwrap();
        assert_eq!(rels.len(), 2);
        assert_ne!(rels[0].id, rels[1].id);
        assert_ne!(rels[0].attributes, rels[1].attributes);
        assert_eq!(store.degree("acme").unwrap(), 2);
    }

    #[test]
    fn test_incident_relationships_order() {
        let store = InMemoryGraphStore::new();
        store
            .add_relationship("A", "B", RelationshipType::CompetesWith, Attributes::new())
            .unwrap();
        store
            .add_relationship("C", "A", RelationshipType::PartnersWith, Attributes::new())
            .unwrap();
        store
            .add_relationship("B", "C", RelationshipType::CompetesWith, Attributes::new())
            .unwrap();
        store
            .add_relationship(
                "A",
                "A",
                RelationshipType::Other("self_ref".into()),
                Attributes::new(),
            )
            .unwrap();

        let incident = store.incident_relationships("a").unwrap();
        let ids: Vec<u64> = incident.iter().map(|r| r.id.value()).collect();
        assert_eq!(ids, vec![0, 1, 3]);
    }

    #[test]
    fn test_outgoing_and_incoming() {
        let store = InMemoryGraphStore::new();
        store
            .add_relationship("Acme", "Cloud", RelationshipType::OperatesIn, Attributes::new())
            .unwrap();
        store
            .add_relationship("Jane", "Acme", RelationshipType::WorksAt, Attributes::new())
            .unwrap();

        let out = store.outgoing("Acme", &RelationshipType::OperatesIn).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].target.as_str(), "cloud");

        let inc = store.incoming("Acme", &RelationshipType::WorksAt).unwrap();
        assert_eq!(inc.len(), 1);
        assert_eq!(inc[0].source.as_str(), "jane");
        assert!(store.outgoing("Acme", &RelationshipType::WorksAt).unwrap().is_empty());
    }

    #[test]
    fn test_query_entities_by_attribute() {
        let store = InMemoryGraphStore::new();
        store
            .add_entity(
                "Acme",
                EntityType::Company,
                attrs(&[("public", AttributeValue::from(true))]),
            )
            .unwrap();
        store
            .add_entity(
                "Globex",
                EntityType::Company,
                attrs(&[("public", AttributeValue::from(false))]),
            )
            .unwrap();
        store
            .add_entity(
                "Widget",
                EntityType::Product,
                attrs(&[("public", AttributeValue::from(true))]),
            )
            .unwrap();

        let results = store
            .query_entities_by_attribute(EntityType::Company, "public", &AttributeValue::from(true))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Acme");

        let none = store
            .query_entities_by_attribute(EntityType::Market, "public", &AttributeValue::from(true))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_without_normalization() {
        let store = InMemoryGraphStore::with_normalization(false);
        store
            .add_entity("Acme", EntityType::Company, Attributes::new())
            .unwrap();
        store
            .add_entity("acme", EntityType::Product, Attributes::new())
            .unwrap();

        assert_eq!(store.entity_count().unwrap(), 2);
        assert!(!store.normalizes_ids());
    }

    #[test]
    fn test_snapshot_degrees() {
        let store = InMemoryGraphStore::new();
        store
            .add_relationship("A", "B", RelationshipType::CompetesWith, Attributes::new())
            .unwrap();
        store
            .add_relationship("A", "A", RelationshipType::PartnersWith, Attributes::new())
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.entities.len(), 2);
        assert_eq!(snapshot.relationships.len(), 2);
        let degrees = snapshot.degrees();
        assert_eq!(degrees.get(&EntityId::new("a")), Some(&2));
        assert_eq!(degrees.get(&EntityId::new("b")), Some(&1));
        assert_eq!(store.degree("a").unwrap(), 2);
    }

    #[test]
    fn test_neighborhood() {
        let store = InMemoryGraphStore::new();
        for (a, b) in [("A", "B"), ("B", "C"), ("C", "D"), ("A", "C")] {
            store
                .add_relationship(a, b, RelationshipType::PartnersWith, Attributes::new())
                .unwrap();
        }

        let hood = store.neighborhood("a", 1).unwrap().unwrap();
        assert_eq!(hood.center, EntityId::new("a"));
        let reached: Vec<(&str, u32)> = hood
            .entities
            .iter()
            .map(|(e, d)| (e.name.as_str(), *d))
            .collect();
        assert_eq!(reached, vec![("A", 0), ("B", 1), ("C", 1)]);
        let edges: Vec<u64> = hood.relationships.iter().map(|r| r.id.value()).collect();
        assert_eq!(edges, vec![0, 1, 3]);

        assert!(store.neighborhood("ghost", 2).unwrap().is_none());
    }

    #[test]
    fn test_snapshot_consistent_under_writes() {
        let store = std::sync::Arc::new(InMemoryGraphStore::new());
        let writer = {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..500 {
                    store
                        .add_relationship(
                            "Acme",
                            &format!("M{i}"),
                            RelationshipType::OperatesIn,
                            Attributes::new(),
                        )
                        .unwrap();
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.snapshot().unwrap();
            let ids: std::collections::HashSet<&EntityId> =
                snapshot.entities.iter().map(|e| &e.id).collect();
            assert!(
                snapshot
                    .relationships
                    .iter()
                    .all(|r| ids.contains(&r.source) && ids.contains(&r.target))
            );
            let degree_sum: usize = snapshot.degrees().values().sum();
            assert_eq!(degree_sum, snapshot.relationships.len() * 2);
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_clear() {
        let store = InMemoryGraphStore::new();
        store
            .add_relationship("A", "B", RelationshipType::CompetesWith, Attributes::new())
            .unwrap();

        store.clear().unwrap();
        assert_eq!(store.entity_count().unwrap(), 0);
        assert_eq!(store.relationship_count().unwrap(), 0);
        assert!(store.incident_relationships("a").unwrap().is_empty());
    }
}
