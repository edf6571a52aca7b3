//! Graph types for the competitive-intelligence knowledge graph.
//!
//! This module provides the entity and relationship model: identifiers,
//! closed type vocabularies, and open-schema attribute maps.
//!
//! # Entity Types
//!
//! | Type | Description | Examples |
//! |------|-------------|----------|
//! | `Company` | Organizations being analyzed | "Acme Corp", "Globex" |
//! | `Product` | Offerings produced by a company | "Acme Cloud", "Widget Pro" |
//! | `Market` | Industry segments companies operate in | "Cloud Storage", "EMEA Retail" |
//! | `Person` | Executives, founders, key staff | "Jane Doe" |
//! | `Unknown` | Placeholder for endpoints created by a relationship insert | |
//!
//! # Relationship Types
//!
//! - `CompetesWith` - Company → Company (discovered in both directions)
//! - `Produces` - Company → Product
//! - `OperatesIn` - Company/Product → Market
//! - `WorksAt` - Person → Company
//! - `PartnersWith` - Company → Company
//! - `Other` - extension vocabulary, stored verbatim
//!
//! # Example
//!
//! ```rust
//! use rivalgraph::models::graph::{AttributeValue, Attributes, EntityId, EntityType};
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("revenue".to_string(), AttributeValue::from(1.5e9));
//! attributes.insert("public".to_string(), AttributeValue::from(true));
//!
//! assert_eq!(EntityId::normalized("  Acme   Corp "), EntityId::new("acme corp"));
//! assert_eq!(EntityType::parse("Companies"), Some(EntityType::Company));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a graph entity.
///
/// Ids are unique across the whole graph regardless of entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an entity ID from a string, verbatim.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a case-normalized entity ID from a display name.
    ///
    /// Trims, collapses inner whitespace to a single space, and lowercases.
    #[must_use]
    pub fn normalized(name: &str) -> Self {
        let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self(collapsed.to_lowercase())
    }

    /// Returns the entity ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Type of entity in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A company under analysis.
    Company,
    /// A product or service offering.
    Product,
    /// A market, industry, or segment.
    Market,
    /// A named individual.
    Person,
    /// Placeholder for an endpoint created implicitly by a relationship.
    Unknown,
}

impl EntityType {
    /// Returns all entity type variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Company,
            Self::Product,
            Self::Market,
            Self::Person,
            Self::Unknown,
        ]
    }

    /// Returns the entity type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Product => "product",
            Self::Market => "market",
            Self::Person => "person",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true unless this is the `Unknown` placeholder.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Display color hint for visualization collaborators.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Company => "#1f77b4",
            Self::Product => "#ff7f0e",
            Self::Market => "#2ca02c",
            Self::Person => "#d62728",
            Self::Unknown => "#7f7f7f",
        }
    }

    /// Parses an entity type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "company" | "companies" | "organization" | "org" | "competitor" => Some(Self::Company),
            "product" | "products" | "service" | "offering" => Some(Self::Product),
            "market" | "markets" | "industry" | "segment" | "sector" => Some(Self::Market),
            "person" | "people" | "executive" | "founder" => Some(Self::Person),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown entity type: {s}"))
    }
}

/// Type of relationship between entities.
///
/// The five named variants are the known vocabulary; `Other` keeps the
/// vocabulary open for extension and is stored as its snake_case name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Two companies compete. Treated as bidirectional by competitor discovery.
    CompetesWith,
    /// A company produces a product.
    Produces,
    /// A company or product operates in a market.
    OperatesIn,
    /// A person works at a company.
    WorksAt,
    /// Two companies partner.
    PartnersWith,
    /// Any other relation name.
    Other(String),
}

impl RelationshipType {
    /// The known relationship type variants.
    pub const KNOWN: &'static [Self] = &[
        Self::CompetesWith,
        Self::Produces,
        Self::OperatesIn,
        Self::WorksAt,
        Self::PartnersWith,
    ];

    /// Returns the relationship type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CompetesWith => "competes_with",
            Self::Produces => "produces",
            Self::OperatesIn => "operates_in",
            Self::WorksAt => "works_at",
            Self::PartnersWith => "partners_with",
            Self::Other(name) => name,
        }
    }

    /// Returns true if the relation reads the same in both directions.
    #[must_use]
    pub const fn is_symmetric(&self) -> bool {
        matches!(self, Self::CompetesWith | Self::PartnersWith)
    }

    /// Parses a relationship type, mapping unrecognized names to `Other`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['-', ' '], "_");
        match normalized.as_str() {
            "competes_with" | "competes" | "competitor_of" | "rival_of" => Self::CompetesWith,
            "produces" | "makes" | "sells" | "offers" => Self::Produces,
            "operates_in" | "active_in" | "serves" => Self::OperatesIn,
            "works_at" | "employed_by" | "works_for" => Self::WorksAt,
            "partners_with" | "partner_of" | "partnered_with" => Self::PartnersWith,
            _ => Self::Other(normalized),
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for RelationshipType {
    /// Maps the exact snake_case name of a known type; anything else is kept
    /// verbatim as `Other`. Use [`RelationshipType::parse`] for loose input.
    fn from(s: String) -> Self {
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == s)
            .cloned()
            .unwrap_or(Self::Other(s))
    }
}

impl From<RelationshipType> for String {
    fn from(rt: RelationshipType) -> Self {
        rt.as_str().to_string()
    }
}

/// A single attribute value.
///
/// Attribute maps are open-schema, but values come from a small closed set
/// of kinds so comparisons and serialization stay well-defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean flag.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Free text.
    Text(String),
}

impl AttributeValue {
    /// Returns the text value, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Infers a value from raw extracted text.
    ///
    /// `true`/`false` become booleans, finite numbers become numbers,
    /// everything else stays text with surrounding quotes removed.
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {},
        }
        if let Ok(n) = trimmed.parse::<f64>()
            && n.is_finite()
        {
            return Self::Number(n);
        }
        Self::Text(trimmed.trim_matches(|c| c == '"' || c == '\'').to_string())
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for AttributeValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Open-schema attribute map, ordered by key.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// An entity in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Display name, the first spelling seen for this id.
    pub name: String,
    /// Type of entity.
    pub entity_type: EntityType,
    /// Open-schema attributes.
    pub attributes: Attributes,
    /// When this entity was first recorded.
    pub added_at: DateTime<Utc>,
}

impl Entity {
    /// Creates a new entity stamped with the current time.
    #[must_use]
    pub fn new(id: EntityId, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id,
            name: name.into(),
            entity_type,
            attributes: Attributes::new(),
            added_at: Utc::now(),
        }
    }

    /// Replaces the attribute map.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Adds a single attribute.
    #[must_use]
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Merges attributes into this entity, overwriting existing keys.
    ///
    /// Returns true if anything changed.
    pub fn merge_attributes(&mut self, attributes: Attributes) -> bool {
        let mut changed = false;
        for (key, value) in attributes {
            if self.attributes.get(&key) != Some(&value) {
                self.attributes.insert(key, value);
                changed = true;
            }
        }
        changed
    }
}

/// Sequence number of a relationship, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(u64);

impl RelationshipId {
    /// Creates a relationship id from a sequence number.
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Returns the sequence number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rel_{}", self.0)
    }
}

/// A directed, typed, attributed edge between two entities.
///
/// Several relationships may connect the same ordered pair, including
/// several of the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Insertion-order identifier.
    pub id: RelationshipId,
    /// Source entity ID.
    pub source: EntityId,
    /// Target entity ID.
    pub target: EntityId,
    /// Type of relationship.
    pub relation_type: RelationshipType,
    /// Edge metadata such as dates or strength scores.
    pub attributes: Attributes,
    /// When this relationship was recorded.
    pub added_at: DateTime<Utc>,
}

impl Relationship {
    /// Creates a new relationship stamped with the current time.
    #[must_use]
    pub fn new(
        id: RelationshipId,
        source: EntityId,
        target: EntityId,
        relation_type: RelationshipType,
    ) -> Self {
        Self {
            id,
            source,
            target,
            relation_type,
            attributes: Attributes::new(),
            added_at: Utc::now(),
        }
    }

    /// Replaces the attribute map.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns true if `id` is either endpoint.
    #[must_use]
    pub fn touches(&self, id: &EntityId) -> bool {
        self.source == *id || self.target == *id
    }

    /// Returns the endpoint opposite `id`, ignoring direction.
    ///
    /// Returns `None` if `id` is not an endpoint. A self-loop returns `id`.
    #[must_use]
    pub fn other_end(&self, id: &EntityId) -> Option<&EntityId> {
        if self.source == *id {
            Some(&self.target)
        } else if self.target == *id {
            Some(&self.source)
        } else {
            None
        }
    }

    /// Returns true if this is a self-loop.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
