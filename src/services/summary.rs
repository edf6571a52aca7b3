//! Graph summaries and export snapshots.
//!
//! Both views are computed on demand from the store and never cached, so they
//! always reflect the current state.

use crate::config::GraphConfig;
use crate::models::graph::{Attributes, EntityId, EntityType, RelationshipId, RelationshipType};
use crate::storage::traits::GraphStore;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A company ranked by its number of incident relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCompany {
    /// Company id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Incident relationship count, both directions.
    pub degree: usize,
}

/// Aggregate counts over the whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    /// Entities per type; only types that occur are present.
    pub entity_count_by_type: BTreeMap<EntityType, usize>,
    /// Relationships per relation type.
    pub relationship_count_by_type: BTreeMap<RelationshipType, usize>,
    /// Total number of entities.
    pub total_entities: usize,
    /// Total number of relationships.
    pub total_relationships: usize,
    /// Most connected companies, highest degree first.
    pub top_companies: Vec<RankedCompany>,
}

impl GraphSummary {
    /// Returns the number of entities of one type.
    #[must_use]
    pub fn entities_of(&self, entity_type: EntityType) -> usize {
        self.entity_count_by_type
            .get(&entity_type)
            .copied()
            .unwrap_or_default()
    }

    /// Returns the number of relationships of one type.
    #[must_use]
    pub fn relationships_of(&self, relation_type: &RelationshipType) -> usize {
        self.relationship_count_by_type
            .get(relation_type)
            .copied()
            .unwrap_or_default()
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**Knowledge Graph Summary**")?;
        writeln!(f)?;
        writeln!(f, "- Total Entities: {}", self.total_entities)?;
        writeln!(f, "- Total Relationships: {}", self.total_relationships)?;
        for (entity_type, count) in &self.entity_count_by_type {
            writeln!(f, "- {}: {count}", capitalize(entity_type.as_str()))?;
        }

        if !self.relationship_count_by_type.is_empty() {
            writeln!(f)?;
            writeln!(f, "**Relationships by Type:**")?;
            for (relation_type, count) in &self.relationship_count_by_type {
                writeln!(f, "- {relation_type}: {count}")?;
            }
        }

        if !self.top_companies.is_empty() {
            writeln!(f)?;
            writeln!(f, "**Top Companies by Connections:**")?;
            for company in &self.top_companies {
                writeln!(f, "- {}: {} connections", company.name, company.degree)?;
            }
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// A node in an export snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportNode {
    /// Entity id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Entity type.
    pub entity_type: EntityType,
    /// Attribute map.
    pub attributes: Attributes,
    /// Incident relationship count.
    pub degree: usize,
    /// Rendering color keyed by type.
    pub color: &'static str,
}

/// An edge in an export snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEdge {
    /// Relationship id.
    pub id: RelationshipId,
    /// Source entity id.
    pub source: EntityId,
    /// Target entity id.
    pub target: EntityId,
    /// Relation type.
    pub relation_type: RelationshipType,
    /// Attribute map.
    pub attributes: Attributes,
}

/// Headline counts carried with an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Number of nodes.
    pub total_nodes: usize,
    /// Number of edges.
    pub total_edges: usize,
    /// Number of companies.
    pub companies: usize,
    /// Number of products.
    pub products: usize,
    /// Number of markets.
    pub markets: usize,
    /// Number of people.
    pub people: usize,
}

/// Complete, insertion-ordered snapshot of the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExport {
    /// Every entity.
    pub nodes: Vec<ExportNode>,
    /// Every relationship.
    pub edges: Vec<ExportEdge>,
    /// Headline counts.
    pub stats: ExportStats,
}

impl GraphExport {
    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "export_graph_json".to_string(),
            cause: e.to_string(),
        })
    }
}

/// Computes summaries and export snapshots.
pub struct SummaryService<B: GraphStore> {
    backend: Arc<B>,
    top_companies: usize,
}

impl<B: GraphStore> SummaryService<B> {
    /// Creates a summary service over a shared store.
    #[must_use]
    pub fn new(backend: Arc<B>, config: &GraphConfig) -> Self {
        Self {
            backend,
            top_companies: config.summary_top_companies,
        }
    }

    /// Aggregate counts and the most connected companies.
    ///
    /// Computed from a single store snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    pub fn get_graph_summary(&self) -> Result<GraphSummary> {
        let snapshot = self.backend.snapshot()?;
        let degrees = snapshot.degrees();

        let mut entity_count_by_type = BTreeMap::new();
        for entity in &snapshot.entities {
            *entity_count_by_type.entry(entity.entity_type).or_insert(0) += 1;
        }

        let mut relationship_count_by_type = BTreeMap::new();
        for rel in &snapshot.relationships {
            *relationship_count_by_type
                .entry(rel.relation_type.clone())
                .or_insert(0) += 1;
        }

        let mut ranked: Vec<RankedCompany> = snapshot
            .entities
            .iter()
            .filter(|e| e.entity_type == EntityType::Company)
            .map(|e| RankedCompany {
                id: e.id.clone(),
                name: e.name.clone(),
                degree: degrees.get(&e.id).copied().unwrap_or_default(),
            })
            .collect();
        // Stable sort keeps insertion order among equal degrees.
        ranked.sort_by(|a, b| b.degree.cmp(&a.degree));
        ranked.truncate(self.top_companies);

        Ok(GraphSummary {
            entity_count_by_type,
            relationship_count_by_type,
            total_entities: snapshot.entities.len(),
            total_relationships: snapshot.relationships.len(),
            top_companies: ranked,
        })
    }

    /// Complete snapshot of every entity and relationship, in insertion order.
    ///
    /// Every edge references a node of the same export, and node degrees
    /// agree with the exported edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable.
    pub fn export_graph_data(&self) -> Result<GraphExport> {
        let snapshot = self.backend.snapshot()?;
        let degrees = snapshot.degrees();

        let nodes: Vec<ExportNode> = snapshot
            .entities
            .iter()
            .map(|entity| ExportNode {
                id: entity.id.clone(),
                name: entity.name.clone(),
                entity_type: entity.entity_type,
                attributes: entity.attributes.clone(),
                degree: degrees.get(&entity.id).copied().unwrap_or_default(),
                color: entity.entity_type.color(),
            })
            .collect();

        let count = |t: EntityType| nodes.iter().filter(|n| n.entity_type == t).count();
        let stats = ExportStats {
            total_nodes: nodes.len(),
            total_edges: snapshot.relationships.len(),
            companies: count(EntityType::Company),
            products: count(EntityType::Product),
            markets: count(EntityType::Market),
            people: count(EntityType::Person),
        };

        let edges = snapshot
            .relationships
            .iter()
            .map(|rel| ExportEdge {
                id: rel.id,
                source: rel.source.clone(),
                target: rel.target.clone(),
                relation_type: rel.relation_type.clone(),
                attributes: rel.attributes.clone(),
            })
            .collect();

        Ok(GraphExport {
            nodes,
            edges,
            stats,
        })
    }
}
