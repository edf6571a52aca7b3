//! Traversal engine for structural graph queries.
//!
//! Every query is read-only and bounded. Neighbors are always visited in
//! edge insertion order, which makes results deterministic: the first
//! discovered entity wins de-duplication, and among equal-length paths the
//! first discovered path is returned.
//!
//! # Operations
//!
//! | Operation | Direction | Depth |
//! |-----------|-----------|-------|
//! | `get_competitors` | both (`competes_with`) | 1 |
//! | `get_company_network` | both (any relation) | `depth` |
//! | `get_shared_markets` | outgoing (`operates_in`) | 1 |
//! | `get_relationship_path` | both (any relation) | `max_length` |
//! | `get_market_landscape` | incoming (`operates_in`) | 1 |
//!
//! # Example
//!
//! ```rust
//! use rivalgraph::models::graph::{Attributes, RelationshipType};
//! use rivalgraph::services::GraphSession;
//! use rivalgraph::storage::GraphStore;
//!
//! let session = GraphSession::init();
//! let store = session.store();
//! store.add_relationship("A", "B", RelationshipType::CompetesWith, Attributes::new())?;
//! store.add_relationship("B", "C", RelationshipType::OperatesIn, Attributes::new())?;
//!
//! let traversal = session.traversal();
//! let path = traversal.get_relationship_path("A", "C", 5)?.unwrap();
//! assert_eq!(path.len(), 2);
//! assert!(traversal.get_relationship_path("A", "C", 1)?.is_none());
//! # Ok::<(), rivalgraph::Error>(())
//! ```

use crate::config::GraphConfig;
use crate::models::graph::{
    AttributeValue, Entity, EntityId, EntityType, Relationship, RelationshipType,
};
use crate::storage::traits::GraphStore;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::instrument;

// ============================================================================
// Result Types
// ============================================================================

/// An entity reached during network expansion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEntity {
    /// The entity.
    pub entity: Entity,
    /// Hop distance from the center (center is 0).
    pub distance: u32,
}

/// Induced subgraph around a company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyNetwork {
    /// The company the expansion started from.
    pub center: EntityId,
    /// Depth the expansion was bounded by.
    pub depth: u32,
    /// Visited entities in discovery order.
    pub entities: Vec<NetworkEntity>,
    /// Every relationship whose endpoints were both visited, in insertion order.
    pub relationships: Vec<Relationship>,
}

impl CompanyNetwork {
    /// Returns true if the entity was visited.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.iter().any(|e| e.entity.id == *id)
    }

    /// Returns the hop distance of a visited entity.
    #[must_use]
    pub fn distance_of(&self, id: &EntityId) -> Option<u32> {
        self.entities
            .iter()
            .find(|e| e.entity.id == *id)
            .map(|e| e.distance)
    }

    /// Returns the visited entities of one type.
    #[must_use]
    pub fn entities_of_type(&self, entity_type: EntityType) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.entity.entity_type == entity_type)
            .map(|e| &e.entity)
            .collect()
    }

    /// Returns the visited entities at exactly `distance` hops.
    #[must_use]
    pub fn at_distance(&self, distance: u32) -> Vec<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.distance == distance)
            .map(|e| &e.entity)
            .collect()
    }

    /// Entities joined to the center by `competes_with`, either direction.
    #[must_use]
    pub fn competitors(&self) -> Vec<&Entity> {
        self.direct_neighbors(|rel, center| {
            rel.relation_type == RelationshipType::CompetesWith
                && !rel.is_self_loop()
                && rel.touches(center)
        })
    }

    /// Products the center `produces`.
    #[must_use]
    pub fn products(&self) -> Vec<&Entity> {
        self.direct_neighbors(|rel, center| {
            rel.relation_type == RelationshipType::Produces && rel.source == *center
        })
    }

    /// Markets the center `operates_in`.
    #[must_use]
    pub fn markets(&self) -> Vec<&Entity> {
        self.direct_neighbors(|rel, center| {
            rel.relation_type == RelationshipType::OperatesIn && rel.source == *center
        })
    }

    /// People who `works_at` the center.
    #[must_use]
    pub fn leadership(&self) -> Vec<&Entity> {
        let mut people = self.direct_neighbors(|rel, center| {
            rel.relation_type == RelationshipType::WorksAt && rel.target == *center
        });
        people.retain(|e| is_person(e.entity_type));
        people
    }

    fn direct_neighbors(&self, keep: impl Fn(&Relationship, &EntityId) -> bool) -> Vec<&Entity> {
        let mut seen = HashSet::new();
        self.relationships
            .iter()
            .filter(|rel| keep(rel, &self.center))
            .filter_map(|rel| rel.other_end(&self.center))
            .filter(|id| seen.insert((*id).clone()))
            .filter_map(|id| self.entities.iter().find(|e| e.entity.id == *id))
            .map(|e| &e.entity)
            .collect()
    }
}

/// One hop of a relationship path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    /// The relationship traversed, in its stored direction.
    pub relationship: Relationship,
    /// The entity reached by this hop.
    pub entity: Entity,
}

/// A path between two entities, ignoring edge direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipPath {
    /// The entity the path starts at.
    pub start: Entity,
    /// Hops in order; the last step's entity is the destination.
    pub steps: Vec<PathStep>,
}

impl RelationshipPath {
    /// Returns the number of edges in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true for the zero-edge path from an entity to itself.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the entity the path ends at.
    #[must_use]
    pub fn end(&self) -> &Entity {
        self.steps.last().map_or(&self.start, |s| &s.entity)
    }

    /// Returns every entity on the path, start first.
    #[must_use]
    pub fn entities(&self) -> Vec<&Entity> {
        std::iter::once(&self.start)
            .chain(self.steps.iter().map(|s| &s.entity))
            .collect()
    }

    /// Renders the path as `A -competes_with-> B <-operates_in- C`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.start.name.clone();
        let mut previous = &self.start.id;
        for step in &self.steps {
            let rel = &step.relationship;
            if rel.source == *previous {
                out.push_str(&format!(" -{}-> {}", rel.relation_type, step.entity.name));
            } else {
                out.push_str(&format!(" <-{}- {}", rel.relation_type, step.entity.name));
            }
            previous = &step.entity.id;
        }
        out
    }
}

/// Why two products were flagged as overlapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "basis", content = "value", rename_all = "snake_case")]
pub enum OverlapBasis {
    /// Both companies produce the very same product entity.
    SameProduct,
    /// The products share a `category` attribute value.
    SameCategory(AttributeValue),
}

/// A pair of products where two companies collide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductOverlap {
    /// Product of the user's company.
    pub user_product: Entity,
    /// Product of the competitor.
    pub competitor_product: Entity,
    /// Why the pair overlaps.
    pub basis: OverlapBasis,
}

/// Heuristic comparison of two companies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatAssessment {
    /// The user's company.
    pub user_company: EntityId,
    /// The competitor being assessed.
    pub competitor: EntityId,
    /// Markets both companies operate in.
    pub shared_markets: Vec<Entity>,
    /// Product pairs that compete.
    pub overlapping_products: Vec<ProductOverlap>,
    /// Whether a `competes_with` edge joins the two, either direction.
    pub direct_competition: bool,
    /// `strength` of the most recent direct `competes_with` edge carrying one.
    pub competition_strength: Option<AttributeValue>,
}

impl ThreatAssessment {
    /// Returns true if anything at all was flagged.
    #[must_use]
    pub fn has_overlap(&self) -> bool {
        self.direct_competition
            || !self.shared_markets.is_empty()
            || !self.overlapping_products.is_empty()
    }
}

/// A person linked to a company by `works_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadershipEntry {
    /// The person.
    pub person: Entity,
    /// Role from the edge, else the person, else `"Unknown"`.
    pub role: String,
}

/// A company in a market landscape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandscapeCompany {
    /// The company operating in the market.
    pub company: Entity,
    /// The company's products that also operate in the market.
    pub products_in_market: Vec<Entity>,
}

/// Everyone operating in a market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketLandscape {
    /// The market.
    pub market: Entity,
    /// Companies with an `operates_in` edge into the market.
    pub companies: Vec<LandscapeCompany>,
}

/// Entities that may hold a `works_at` role.
const fn is_person(entity_type: EntityType) -> bool {
    matches!(entity_type, EntityType::Person | EntityType::Unknown)
}

// ============================================================================
// Service
// ============================================================================

/// Read-only traversal queries over a [`GraphStore`].
///
/// # Thread Safety
///
/// The service holds a shared handle to the store and never mutates it, so
/// it can be cloned into any number of readers.
pub struct TraversalService<B: GraphStore> {
    backend: Arc<B>,
    max_depth: u32,
    max_paths: usize,
}

impl<B: GraphStore> Clone for TraversalService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            max_depth: self.max_depth,
            max_paths: self.max_paths,
        }
    }
}

impl<B: GraphStore> TraversalService<B> {
    /// Creates a traversal service over a shared store.
    #[must_use]
    pub fn new(backend: Arc<B>, config: &GraphConfig) -> Self {
        Self {
            backend,
            max_depth: config.max_traversal_depth,
            max_paths: config.max_enumerated_paths,
        }
    }

    /// Returns a reference to the underlying store.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the traversal ceiling.
    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn check_ceiling(&self, name: &str, value: u32) -> Result<()> {
        if value > self.max_depth {
            return Err(Error::InvalidArgument(format!(
                "{name} {value} exceeds the traversal ceiling of {}",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Looks up an entity that a stored relationship references.
    fn referenced_entity(&self, id: &EntityId) -> Result<Entity> {
        self.backend
            .get_entity(id.as_str())?
            .ok_or_else(|| Error::NotFound(format!("entity '{id}' referenced by a relationship")))
    }

    fn entities_for(&self, ids: &[EntityId]) -> Result<Vec<Entity>> {
        ids.iter().map(|id| self.referenced_entity(id)).collect()
    }

    /// Distinct far ends of `rels` as seen from `from`, in first-seen order.
    fn distinct_ends<'a>(
        from: &EntityId,
        rels: impl IntoIterator<Item = &'a Relationship>,
    ) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        rels.into_iter()
            .filter_map(|rel| rel.other_end(from))
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect()
    }

    // =========================================================================
    // Direct Neighborhood
    // =========================================================================

    /// Returns every entity joined to `company` by `competes_with`, in either
    /// direction, in order of first discovery.
    ///
    /// Unknown companies have no competitors.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    #[instrument(skip(self), fields(operation = "get_competitors"))]
    pub fn get_competitors(&self, company: &str) -> Result<Vec<Entity>> {
        let id = self.backend.resolve_id(company);
        let incident = self.backend.incident_relationships(id.as_str())?;
        let competing = incident.iter().filter(|rel| {
            rel.relation_type == RelationshipType::CompetesWith && !rel.is_self_loop()
        });
        self.entities_for(&Self::distinct_ends(&id, competing))
    }

    /// Returns the products `company` directly `produces`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    pub fn get_company_products(&self, company: &str) -> Result<Vec<Entity>> {
        let id = self.backend.resolve_id(company);
        let produces = self
            .backend
            .outgoing(id.as_str(), &RelationshipType::Produces)?;
        self.entities_for(&Self::distinct_ends(&id, &produces))
    }

    /// Returns the markets `company` directly `operates_in`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    pub fn get_company_markets(&self, company: &str) -> Result<Vec<Entity>> {
        let id = self.backend.resolve_id(company);
        let operates = self
            .backend
            .outgoing(id.as_str(), &RelationshipType::OperatesIn)?;
        self.entities_for(&Self::distinct_ends(&id, &operates))
    }

    /// Returns the people who `works_at` the company, with their roles.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    pub fn get_company_leadership(&self, company: &str) -> Result<Vec<LeadershipEntry>> {
        let id = self.backend.resolve_id(company);
        let works_at = self.backend.incoming(id.as_str(), &RelationshipType::WorksAt)?;

        let mut seen = HashSet::new();
        let mut leadership = Vec::new();
        for rel in works_at.iter().filter(|rel| !rel.is_self_loop()) {
            if !seen.insert(rel.source.clone()) {
                continue;
            }
            let person = self.referenced_entity(&rel.source)?;
            if !is_person(person.entity_type) {
                continue;
            }
            let role = rel
                .attributes
                .get("role")
                .or_else(|| person.attribute("role"))
                .map_or_else(|| "Unknown".to_string(), ToString::to_string);
            leadership.push(LeadershipEntry { person, role });
        }
        Ok(leadership)
    }

    /// Returns markets both companies directly `operates_in`, ordered by the
    /// first company's discovery order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    #[instrument(skip(self), fields(operation = "get_shared_markets"))]
    pub fn get_shared_markets(&self, company1: &str, company2: &str) -> Result<Vec<Entity>> {
        let first = self.get_company_markets(company1)?;
        let second: HashSet<EntityId> = self
            .get_company_markets(company2)?
            .into_iter()
            .map(|m| m.id)
            .collect();

        Ok(first
            .into_iter()
            .filter(|m| second.contains(&m.id))
            .collect())
    }

    /// Returns every company with an `operates_in` edge into `market`.
    ///
    /// Products operating in the market are left out; unknown placeholders
    /// are kept until they are typed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    #[instrument(skip(self), fields(operation = "get_market_landscape"))]
    pub fn get_market_landscape(&self, market: &str) -> Result<Vec<Entity>> {
        let id = self.backend.resolve_id(market);
        let operates = self
            .backend
            .incoming(id.as_str(), &RelationshipType::OperatesIn)?;
        let sources: Vec<&Relationship> = operates.iter().filter(|r| !r.is_self_loop()).collect();
        let mut companies = self.entities_for(&Self::distinct_ends(&id, sources))?;
        companies.retain(|e| matches!(e.entity_type, EntityType::Company | EntityType::Unknown));
        Ok(companies)
    }

    /// Returns the market together with each operating company's products
    /// that also operate in it. `None` if the market is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    pub fn get_market_landscape_detail(&self, market: &str) -> Result<Option<MarketLandscape>> {
        let Some(market_entity) = self.backend.get_entity(market)? else {
            return Ok(None);
        };

        let mut companies = Vec::new();
        for company in self.get_market_landscape(market)? {
            let mut products_in_market = Vec::new();
            for product in self.get_company_products(company.id.as_str())? {
                let in_market = self
                    .backend
                    .outgoing(product.id.as_str(), &RelationshipType::OperatesIn)?
                    .iter()
                    .any(|rel| rel.target == market_entity.id);
                if in_market {
                    products_in_market.push(product);
                }
            }
            companies.push(LandscapeCompany {
                company,
                products_in_market,
            });
        }

        Ok(Some(MarketLandscape {
            market: market_entity,
            companies,
        }))
    }

    /// Compares two companies: shared markets, overlapping products, and any
    /// direct competition edge with its strength.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    #[instrument(skip(self), fields(operation = "find_competitive_threats"))]
    pub fn find_competitive_threats(
        &self,
        user_company: &str,
        competitor: &str,
    ) -> Result<ThreatAssessment> {
        let user_id = self.backend.resolve_id(user_company);
        let competitor_id = self.backend.resolve_id(competitor);

        let shared_markets = self.get_shared_markets(user_company, competitor)?;
        let user_products = self.get_company_products(user_company)?;
        let competitor_products = self.get_company_products(competitor)?;

        let mut overlapping_products = Vec::new();
        for user_product in &user_products {
            for competitor_product in &competitor_products {
                let basis = if user_product.id == competitor_product.id {
                    Some(OverlapBasis::SameProduct)
                } else {
                    match (
                        user_product.attribute("category"),
                        competitor_product.attribute("category"),
                    ) {
                        (Some(a), Some(b)) if a == b => Some(OverlapBasis::SameCategory(a.clone())),
                        _ => None,
                    }
                };
                if let Some(basis) = basis {
                    overlapping_products.push(ProductOverlap {
                        user_product: user_product.clone(),
                        competitor_product: competitor_product.clone(),
                        basis,
                    });
                }
            }
        }

        let direct: Vec<Relationship> = self
            .backend
            .incident_relationships(user_id.as_str())?
            .into_iter()
            .filter(|rel| {
                rel.relation_type == RelationshipType::CompetesWith
                    && rel.other_end(&user_id) == Some(&competitor_id)
                    && user_id != competitor_id
            })
            .collect();
        let competition_strength = direct
            .iter()
            .rev()
            .find_map(|rel| rel.attributes.get("strength").cloned());

        tracing::debug!(
            shared_markets = shared_markets.len(),
            overlapping_products = overlapping_products.len(),
            direct_competition = !direct.is_empty(),
            "assessed competitive threats"
        );

        Ok(ThreatAssessment {
            user_company: user_id,
            competitor: competitor_id,
            shared_markets,
            overlapping_products,
            direct_competition: !direct.is_empty(),
            competition_strength,
        })
    }

    // =========================================================================
    // Multi-hop
    // =========================================================================

    /// Breadth-first expansion from `company` up to `depth` hops over any
    /// relationship in either direction.
    ///
    /// Returns `None` if the company is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `depth` is zero or above the
    /// traversal ceiling.
    #[instrument(skip(self), fields(operation = "get_company_network"))]
    pub fn get_company_network(&self, company: &str, depth: u32) -> Result<Option<CompanyNetwork>> {
        if depth == 0 {
            return Err(Error::InvalidArgument(
                "network depth must be a positive integer".to_string(),
            ));
        }
        self.check_ceiling("network depth", depth)?;

        let Some(neighborhood) = self.backend.neighborhood(company, depth)? else {
            return Ok(None);
        };
        let entities: Vec<NetworkEntity> = neighborhood
            .entities
            .into_iter()
            .map(|(entity, distance)| NetworkEntity { entity, distance })
            .collect();
        let relationships = neighborhood.relationships;

        tracing::debug!(
            entities = entities.len(),
            relationships = relationships.len(),
            "expanded company network"
        );

        Ok(Some(CompanyNetwork {
            center: neighborhood.center,
            depth,
            entities,
            relationships,
        }))
    }

    /// Shortest path (fewest edges) between two entities, ignoring direction.
    ///
    /// Returns `None` if either entity is unknown or no path exists within
    /// `max_length` hops.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `max_length` is above the
    /// traversal ceiling.
    #[instrument(skip(self), fields(operation = "get_relationship_path"))]
    pub fn get_relationship_path(
        &self,
        source: &str,
        target: &str,
        max_length: u32,
    ) -> Result<Option<RelationshipPath>> {
        self.check_ceiling("path length", max_length)?;

        let Some(start) = self.backend.get_entity(source)? else {
            return Ok(None);
        };
        let Some(goal) = self.backend.get_entity(target)? else {
            return Ok(None);
        };
        if start.id == goal.id {
            return Ok(Some(RelationshipPath {
                start,
                steps: Vec::new(),
            }));
        }

        // BFS to find shortest path
        let mut parents: HashMap<EntityId, (EntityId, Relationship)> = HashMap::new();
        let mut queue: VecDeque<(EntityId, u32)> = VecDeque::new();
        queue.push_back((start.id.clone(), 0));

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= max_length {
                continue;
            }
            for rel in self.backend.incident_relationships(current.as_str())? {
                let Some(next) = rel.other_end(&current).cloned() else {
                    continue;
                };
                if next == start.id || parents.contains_key(&next) {
                    continue;
                }
                parents.insert(next.clone(), (current.clone(), rel));
                if next == goal.id {
                    return self.reconstruct_path(start, &goal.id, &parents).map(Some);
                }
                queue.push_back((next, hops + 1));
            }
        }

        Ok(None)
    }

    fn reconstruct_path(
        &self,
        start: Entity,
        goal: &EntityId,
        parents: &HashMap<EntityId, (EntityId, Relationship)>,
    ) -> Result<RelationshipPath> {
        let mut steps = Vec::new();
        let mut current = goal.clone();
        while current != start.id {
            let Some((previous, rel)) = parents.get(&current) else {
                break;
            };
            steps.push(PathStep {
                relationship: rel.clone(),
                entity: self.referenced_entity(&current)?,
            });
            current = previous.clone();
        }
        steps.reverse();
        Ok(RelationshipPath { start, steps })
    }

    /// Every simple path (no repeated entity) between two entities with at
    /// most `max_length` edges, ignoring direction.
    ///
    /// Paths are found depth-first in edge insertion order and capped at
    /// `limit` (or the configured maximum, whichever is smaller).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `max_length` is above the
    /// traversal ceiling.
    #[instrument(skip(self), fields(operation = "get_all_relationship_paths"))]
    pub fn get_all_relationship_paths(
        &self,
        source: &str,
        target: &str,
        max_length: u32,
        limit: usize,
    ) -> Result<Vec<RelationshipPath>> {
        self.check_ceiling("path length", max_length)?;
        let limit = limit.min(self.max_paths);

        let Some(start) = self.backend.get_entity(source)? else {
            return Ok(Vec::new());
        };
        let Some(goal) = self.backend.get_entity(target)? else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }
        if start.id == goal.id {
            return Ok(vec![RelationshipPath {
                start,
                steps: Vec::new(),
            }]);
        }

        let max_edges = max_length as usize;
        let mut found: Vec<Vec<Relationship>> = Vec::new();
        let mut on_path: Vec<EntityId> = vec![start.id.clone()];
        let mut edges: Vec<Relationship> = Vec::new();
        let mut stack: Vec<(EntityId, Vec<Relationship>, usize)> = Vec::new();
        if max_edges > 0 {
            let first = self.backend.incident_relationships(start.id.as_str())?;
            stack.push((start.id.clone(), first, 0));
        }

        while found.len() < limit {
            let Some((node, incident, next_index)) = stack.last_mut() else {
                break;
            };
            if *next_index >= incident.len() {
                stack.pop();
                on_path.pop();
                edges.pop();
                continue;
            }
            let rel = incident[*next_index].clone();
            *next_index += 1;
            let Some(next) = rel.other_end(node).cloned() else {
                continue;
            };
            if on_path.contains(&next) {
                continue;
            }

            if next == goal.id {
                let mut path = edges.clone();
                path.push(rel);
                found.push(path);
                continue;
            }
            if edges.len() + 1 >= max_edges {
                continue;
            }

            let next_incident = self.backend.incident_relationships(next.as_str())?;
            on_path.push(next.clone());
            edges.push(rel);
            stack.push((next, next_incident, 0));
        }

        found
            .into_iter()
            .map(|rels| self.materialize_path(start.clone(), rels))
            .collect()
    }

    /// Builds a path from its start and the ordered relationships walked.
    fn materialize_path(&self, start: Entity, rels: Vec<Relationship>) -> Result<RelationshipPath> {
        let mut steps = Vec::with_capacity(rels.len());
        let mut current = start.id.clone();
        for relationship in rels {
            let next = relationship
                .other_end(&current)
                .cloned()
                .ok_or_else(|| Error::OperationFailed {
                    operation: "materialize_path".to_string(),
                    cause: format!("relationship {} does not touch '{current}'", relationship.id),
                })?;
            let entity = self.referenced_entity(&next)?;
            current = next;
            steps.push(PathStep {
                relationship,
                entity,
            });
        }
        Ok(RelationshipPath { start, steps })
    }
}
