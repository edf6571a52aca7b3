//! Graph population.
//!
//! Two ways in: seeding helpers for callers that already hold structured
//! facts, and a parser for the sectioned text produced by the upstream
//! entity-extraction step.
//!
//! # Extraction Format
//!
//! ```text
//! COMPANIES:
//! - Acme: industry=cloud, founded=1999
//! PRODUCTS:
//! - Acme Drive: company=Acme, category=storage
//! MARKETS:
//! - Cloud Storage: companies=[Acme, Globex], size=large
//! PEOPLE:
//! - Jane Doe: company=Acme, role=CEO
//! RELATIONSHIPS:
//! - Acme -> partners_with -> Initech: joint storage offering
//! ```
//!
//! Section markers are case-insensitive. Bullets may start with `-` or `*`.
//! Attribute lists are `key=value` pairs separated by commas; a bracketed
//! value keeps its commas. Text that is not part of a pair becomes the
//! `description` attribute. Lines that fit none of this are skipped.

use crate::models::graph::{
    AttributeValue, Attributes, Entity, EntityType, Relationship, RelationshipType,
};
use crate::storage::traits::GraphStore;
use crate::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};

/// Matches a section marker at the start of a line.
static SECTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(companies|products|markets|people|relationships)\s*:")
        .unwrap_or_else(|_| unreachable!())
});

/// Matches a bullet line and captures its body.
static BULLET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+(.+)$").unwrap_or_else(|_| unreachable!()));

/// Matches `name` or `name: attributes`.
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>[^:]+?)\s*(?::\s*(?P<attrs>.*))?$").unwrap_or_else(|_| unreachable!())
});

/// Matches `key=value` or `key=[a, b]`.
static PAIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<key>\w+)\s*=\s*(?P<value>\[[^\]]*\]|[^,]*)").unwrap_or_else(|_| unreachable!())
});

/// Matches `source -> relation -> target` with an optional `: description`.
static RELATIONSHIP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<source>[^>]+?)\s*->\s*(?P<relation>[^>]+?)\s*->\s*",
        r"(?P<target>[^:]+?)\s*(?::\s*(?P<description>.+))?$",
    ))
    .unwrap_or_else(|_| unreachable!())
});

// ============================================================================
// Parsed Output
// ============================================================================

/// Section of the extraction text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Companies,
    Products,
    Markets,
    People,
    Relationships,
}

impl Section {
    fn parse(marker: &str) -> Option<Self> {
        match marker.to_lowercase().as_str() {
            "companies" => Some(Self::Companies),
            "products" => Some(Self::Products),
            "markets" => Some(Self::Markets),
            "people" => Some(Self::People),
            "relationships" => Some(Self::Relationships),
            _ => None,
        }
    }
}

/// An entity bullet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedEntity {
    /// Entity name as written.
    pub name: String,
    /// Parsed attributes.
    pub attributes: Attributes,
}

/// A relationship bullet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRelationship {
    /// Source name.
    pub source: String,
    /// Relation type.
    pub relation_type: RelationshipType,
    /// Target name.
    pub target: String,
    /// Free-text description after the target.
    pub description: Option<String>,
}

/// Everything recognized in an extraction text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionOutput {
    /// `COMPANIES:` bullets.
    pub companies: Vec<ExtractedEntity>,
    /// `PRODUCTS:` bullets.
    pub products: Vec<ExtractedEntity>,
    /// `MARKETS:` bullets.
    pub markets: Vec<ExtractedEntity>,
    /// `PEOPLE:` bullets.
    pub people: Vec<ExtractedEntity>,
    /// `RELATIONSHIPS:` bullets.
    pub relationships: Vec<ExtractedRelationship>,
    /// Non-empty lines that were not understood.
    pub skipped_lines: usize,
}

impl ExtractionOutput {
    /// Returns true if nothing was recognized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
            && self.products.is_empty()
            && self.markets.is_empty()
            && self.people.is_empty()
            && self.relationships.is_empty()
    }
}

/// Parses `key=value` pairs; leftover text becomes `description`.
#[must_use]
pub fn parse_attributes(raw: &str) -> Attributes {
    let mut attributes = Attributes::new();
    let mut leftover = Vec::new();
    let mut cursor = 0;

    for caps in PAIR_PATTERN.captures_iter(raw) {
        let (Some(whole), Some(key), Some(value)) =
            (caps.get(0), caps.name("key"), caps.name("value"))
        else {
            continue;
        };
        leftover.push(&raw[cursor..whole.start()]);
        cursor = whole.end();

        let value = value.as_str().trim();
        let value = value
            .strip_prefix('[')
            .and_then(|v| v.strip_suffix(']'))
            .map_or_else(|| AttributeValue::infer(value), |list| {
                AttributeValue::Text(list.trim().to_string())
            });
        attributes.insert(key.as_str().to_lowercase(), value);
    }
    leftover.push(&raw[cursor..]);

    let description: Vec<&str> = leftover
        .iter()
        .flat_map(|gap| gap.split(','))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();
    if !description.is_empty() && !attributes.contains_key("description") {
        attributes.insert(
            "description".to_string(),
            AttributeValue::Text(description.join(", ")),
        );
    }
    attributes
}

fn parse_entity(body: &str) -> Option<ExtractedEntity> {
    let caps = ENTITY_PATTERN.captures(body)?;
    let name = caps.name("name")?.as_str().trim();
    if name.is_empty() {
        return None;
    }
    let attributes = caps
        .name("attrs")
        .map(|m| parse_attributes(m.as_str()))
        .unwrap_or_default();
    Some(ExtractedEntity {
        name: name.to_string(),
        attributes,
    })
}

fn parse_relationship(body: &str) -> Option<ExtractedRelationship> {
    let caps = RELATIONSHIP_PATTERN.captures(body)?;
    let source = caps.name("source")?.as_str().trim();
    let relation = caps.name("relation")?.as_str().trim();
    let target = caps.name("target")?.as_str().trim();
    if source.is_empty() || relation.is_empty() || target.is_empty() {
        return None;
    }
    Some(ExtractedRelationship {
        source: source.to_string(),
        relation_type: RelationshipType::parse(relation),
        target: target.to_string(),
        description: caps
            .name("description")
            .map(|m| m.as_str().trim().to_string())
            .filter(|d| !d.is_empty()),
    })
}

/// Parses the sectioned text produced by entity extraction.
///
/// Never fails: anything unrecognized is counted in
/// [`ExtractionOutput::skipped_lines`] and logged at debug level.
#[must_use]
pub fn parse_extraction_output(text: &str) -> ExtractionOutput {
    let mut output = ExtractionOutput::default();
    let mut section: Option<Section> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(marker) = SECTION_PATTERN.captures(line).and_then(|c| c.get(1)) {
            section = Section::parse(marker.as_str());
            continue;
        }

        let Some(current) = section else {
            tracing::debug!(line, "skipping line outside any section");
            output.skipped_lines += 1;
            continue;
        };
        let Some(body) = BULLET_PATTERN
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
        else {
            tracing::debug!(line, "skipping non-bullet line");
            output.skipped_lines += 1;
            continue;
        };

        let parsed = match current {
            Section::Relationships => parse_relationship(body)
                .map(|rel| output.relationships.push(rel))
                .is_some(),
            Section::Companies => parse_entity(body).map(|e| output.companies.push(e)).is_some(),
            Section::Products => parse_entity(body).map(|e| output.products.push(e)).is_some(),
            Section::Markets => parse_entity(body).map(|e| output.markets.push(e)).is_some(),
            Section::People => parse_entity(body).map(|e| output.people.push(e)).is_some(),
        };
        if !parsed {
            tracing::debug!(line, section = ?current, "skipping unparseable bullet");
            output.skipped_lines += 1;
        }
    }

    output
}

// ============================================================================
// Ingestion
// ============================================================================

/// Counts from one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Entities that did not exist before.
    pub entities_added: usize,
    /// Entities that already existed and were merged into.
    pub entities_merged: usize,
    /// Relationships appended.
    pub relationships_added: usize,
    /// Entities rejected because they already carry another type.
    pub type_conflicts: usize,
    /// Relationship bullets dropped because an endpoint does not exist.
    pub relationships_skipped: usize,
    /// Lines the parser did not understand.
    pub lines_skipped: usize,
}

/// Populates a graph store from structured facts or extraction output.
pub struct IngestService<B: GraphStore> {
    backend: Arc<B>,
}

impl<B: GraphStore> IngestService<B> {
    /// Creates an ingest service over a shared store.
    #[must_use]
    pub const fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Adds or merges a company.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the id already has another type.
    pub fn add_company(&self, name: &str, attributes: Attributes) -> Result<Entity> {
        self.backend.add_entity(name, EntityType::Company, attributes)
    }

    /// Adds or merges a market.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the id already has another type.
    pub fn add_market(&self, name: &str, attributes: Attributes) -> Result<Entity> {
        self.backend.add_entity(name, EntityType::Market, attributes)
    }

    /// Adds a product and a `produces` edge from its company.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the id already has another type;
    /// no edge is added in that case.
    pub fn add_product(&self, name: &str, company: &str, attributes: Attributes) -> Result<Entity> {
        let product = self.backend.add_entity(name, EntityType::Product, attributes)?;
        self.backend.add_relationship(
            company,
            name,
            RelationshipType::Produces,
            describe(format!("{} produces {}", company.trim(), product.name)),
        )?;
        Ok(product)
    }

    /// Adds a person with a `role` and a `works_at` edge to their company.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the id already has another type;
    /// no edge is added in that case.
    pub fn add_person(
        &self,
        name: &str,
        company: &str,
        role: &str,
        mut attributes: Attributes,
    ) -> Result<Entity> {
        attributes.insert("role".to_string(), AttributeValue::from(role));
        let person = self.backend.add_entity(name, EntityType::Person, attributes)?;

        let mut edge = Attributes::new();
        edge.insert("role".to_string(), AttributeValue::from(role));
        self.backend
            .add_relationship(name, company, RelationshipType::WorksAt, edge)?;
        Ok(person)
    }

    /// Links the user's company to each competitor with `competes_with`.
    ///
    /// Both sides are stored as companies. Pairs already joined by a
    /// `competes_with` edge in either direction are left alone, so seeding is
    /// repeatable. Returns the edges that were added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if a name already has another type.
    pub fn seed_competitors(
        &self,
        user_company: &str,
        competitors: &[&str],
    ) -> Result<Vec<Relationship>> {
        self.add_company(user_company, Attributes::new())?;
        let mut added = Vec::new();
        for competitor in competitors {
            self.add_company(competitor, Attributes::new())?;
            if let Some(rel) = self.ensure_competition(user_company, competitor)? {
                added.push(rel);
            }
        }
        Ok(added)
    }

    /// Adds `competes_with` from `user` to `competitor` unless one already
    /// joins them in either direction.
    fn ensure_competition(&self, user: &str, competitor: &str) -> Result<Option<Relationship>> {
        let user_id = self.backend.resolve_id(user);
        let competitor_id = self.backend.resolve_id(competitor);
        if user_id == competitor_id {
            return Ok(None);
        }
        let exists = self
            .backend
            .incident_relationships(user_id.as_str())?
            .iter()
            .any(|rel| {
                rel.relation_type == RelationshipType::CompetesWith
                    && rel.other_end(&user_id) == Some(&competitor_id)
            });
        if exists {
            return Ok(None);
        }
        self.backend
            .add_relationship(
                user,
                competitor,
                RelationshipType::CompetesWith,
                describe(format!("{} competes with {}", user.trim(), competitor.trim())),
            )
            .map(Some)
    }

    /// Parses extraction text and ingests it.
    ///
    /// # Errors
    ///
    /// See [`IngestService::ingest_extraction`].
    pub fn ingest_text(
        &self,
        text: &str,
        user_company: &str,
        competitor: &str,
    ) -> Result<IngestReport> {
        self.ingest_extraction(&parse_extraction_output(text), user_company, competitor)
    }

    /// Writes parsed extraction output into the store.
    ///
    /// Ensures both focus companies and the `competes_with` edge between
    /// them exist, then adds companies, products (linked to their `company`
    /// attribute, or to a focus company named in the bullet), markets (linked
    /// from their `companies` list, else from both focus companies), people
    /// and relationships whose endpoints already exist.
    ///
    /// Type conflicts are counted and logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unusable or a focus company already
    /// exists with another type.
    pub fn ingest_extraction(
        &self,
        output: &ExtractionOutput,
        user_company: &str,
        competitor: &str,
    ) -> Result<IngestReport> {
        let mut report = IngestReport {
            lines_skipped: output.skipped_lines,
            ..IngestReport::default()
        };

        let mut flag = Attributes::new();
        flag.insert("is_user_company".to_string(), AttributeValue::from(true));
        self.track(&mut report, user_company, |s| s.add_company(user_company, flag))?;
        let mut flag = Attributes::new();
        flag.insert("is_competitor".to_string(), AttributeValue::from(true));
        self.track(&mut report, competitor, |s| s.add_company(competitor, flag))?;
        if self.ensure_competition(user_company, competitor)?.is_some() {
            report.relationships_added += 1;
        }

        for company in &output.companies {
            self.tolerate(&mut report, &company.name, |s| {
                s.add_company(&company.name, company.attributes.clone())
            })?;
        }

        for product in &output.products {
            let mut attributes = product.attributes.clone();
            let owner = take_text(&mut attributes, "company")
                .or_else(|| infer_owner(&product.attributes, user_company, competitor));
            let added = match owner.as_deref() {
                Some(owner) => self.tolerate(&mut report, &product.name, |s| {
                    s.add_product(&product.name, owner, attributes)
                })?,
                None => self.tolerate(&mut report, &product.name, |s| {
                    s.backend.add_entity(&product.name, EntityType::Product, attributes)
                })?,
            };
            if added.is_some() && owner.is_some() {
                report.relationships_added += 1;
            }
        }

        for market in &output.markets {
            let mut attributes = market.attributes.clone();
            let listed = take_text(&mut attributes, "companies");
            if self
                .tolerate(&mut report, &market.name, |s| s.add_market(&market.name, attributes))?
                .is_none()
            {
                continue;
            }

            let companies: Vec<String> = match listed {
                Some(list) => list
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => vec![user_company.to_string(), competitor.to_string()],
            };
            for company in companies {
                if !self.backend.contains(&company)? {
                    tracing::debug!(
                        company = %company,
                        market = %market.name,
                        "skipping unknown market participant"
                    );
                    continue;
                }
                self.backend.add_relationship(
                    &company,
                    &market.name,
                    RelationshipType::OperatesIn,
                    Attributes::new(),
                )?;
                report.relationships_added += 1;
            }
        }

        for person in &output.people {
            let mut attributes = person.attributes.clone();
            let employer = take_text(&mut attributes, "company")
                .or_else(|| infer_owner(&person.attributes, user_company, competitor));
            let role = ["role", "position", "title"]
                .iter()
                .find_map(|key| take_text(&mut attributes, key))
                .unwrap_or_else(|| "Unknown".to_string());

            match employer {
                Some(employer) => {
                    if self
                        .tolerate(&mut report, &person.name, |s| {
                            s.add_person(&person.name, &employer, &role, attributes)
                        })?
                        .is_some()
                    {
                        report.relationships_added += 1;
                    }
                },
                None => {
                    attributes.insert("role".to_string(), AttributeValue::from(role.as_str()));
                    self.tolerate(&mut report, &person.name, |s| {
                        s.backend.add_entity(&person.name, EntityType::Person, attributes)
                    })?;
                },
            }
        }

        for rel in &output.relationships {
            if !self.backend.contains(&rel.source)? || !self.backend.contains(&rel.target)? {
                tracing::debug!(
                    source = %rel.source,
                    target = %rel.target,
                    "skipping relationship with unknown endpoint"
                );
                report.relationships_skipped += 1;
                continue;
            }
            let attributes = rel
                .description
                .as_ref()
                .map(|d| describe(d.clone()))
                .unwrap_or_default();
            self.backend
                .add_relationship(&rel.source, &rel.target, rel.relation_type.clone(), attributes)?;
            report.relationships_added += 1;
        }

        tracing::debug!(
            entities_added = report.entities_added,
            entities_merged = report.entities_merged,
            relationships_added = report.relationships_added,
            type_conflicts = report.type_conflicts,
            "ingested extraction output"
        );
        Ok(report)
    }

    /// Runs an entity write, counting it as added or merged.
    fn track<T>(
        &self,
        report: &mut IngestReport,
        name: &str,
        write: impl FnOnce(&Self) -> Result<T>,
    ) -> Result<T> {
        let existed = self.backend.contains(name)?;
        let value = write(self)?;
        if existed {
            report.entities_merged += 1;
        } else {
            report.entities_added += 1;
        }
        Ok(value)
    }

    /// Like [`Self::track`], but a type conflict is counted instead of returned.
    fn tolerate<T>(
        &self,
        report: &mut IngestReport,
        name: &str,
        write: impl FnOnce(&Self) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.track(report, name, write) {
            Ok(value) => Ok(Some(value)),
            Err(Error::TypeMismatch { .. }) => {
                report.type_conflicts += 1;
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }
}

fn describe(description: String) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("description".to_string(), AttributeValue::Text(description));
    attributes
}

/// Removes an attribute and returns it as non-empty text.
fn take_text(attributes: &mut Attributes, key: &str) -> Option<String> {
    attributes
        .remove(key)
        .map(|v| v.to_string().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Picks the focus company named anywhere in a bullet's attribute text.
fn infer_owner(attributes: &Attributes, user_company: &str, competitor: &str) -> Option<String> {
    let text = attributes
        .values()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    [competitor, user_company]
        .into_iter()
        .find(|company| {
            let company = company.trim().to_lowercase();
            !company.is_empty() && text.contains(&company)
        })
        .map(|company| company.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::graph::InMemoryGraphStore;

    const EXTRACTION: &str = "
Here is what I found.

COMPANIES:
- Initech: industry=software, founded=1988
PRODUCTS:
- Acme Drive: company=Acme, category=storage
- Globex Box: category=storage, sold by Globex
- Orphan Widget: category=misc
MARKETS:
- Cloud Storage: companies=[Acme, Globex, Nobody], size=large
- Enterprise Backup: growing segment
PEOPLE:
- Jane Doe: company=Acme, title=CEO
- John Roe: joined Globex in 2020
RELATIONSHIPS:
- Initech -> partners_with -> Acme: reseller agreement
- Acme -> acquired -> Ghost Corp
this line is not a bullet
";

    fn service() -> IngestService<InMemoryGraphStore> {
        IngestService::new(Arc::new(InMemoryGraphStore::new()))
    }

    #[test]
    fn test_parse_sections() {
        let output = parse_extraction_output(EXTRACTION);
        assert_eq!(output.companies.len(), 1);
        assert_eq!(output.products.len(), 3);
        assert_eq!(output.markets.len(), 2);
        assert_eq!(output.people.len(), 2);
        assert_eq!(output.relationships.len(), 2);
        assert_eq!(output.skipped_lines, 2);
        assert!(!output.is_empty());
    }

    #[test]
    fn test_parse_attributes() {
        let attributes =
            parse_attributes("companies=[Acme, Globex], size=large, founded=1999, fast");
        assert_eq!(
            attributes.get("companies"),
            Some(&AttributeValue::from("Acme, Globex"))
        );
        assert_eq!(attributes.get("size"), Some(&AttributeValue::from("large")));
        assert_eq!(attributes.get("founded"), Some(&AttributeValue::from(1999.0)));
        assert_eq!(attributes.get("description"), Some(&AttributeValue::from("fast")));
    }

    #[test]
    fn test_parse_relationship_line() {
        let output =
            parse_extraction_output("RELATIONSHIPS:\n* Initech -> Partners With -> Acme: resale\n");
        let rel = &output.relationships[0];
        assert_eq!(rel.source, "Initech");
        assert_eq!(rel.relation_type, RelationshipType::PartnersWith);
        assert_eq!(rel.target, "Acme");
        assert_eq!(rel.description.as_deref(), Some("resale"));
    }

    #[test]
    fn test_parse_empty_text() {
        let output = parse_extraction_output("");
        assert!(output.is_empty());
        assert_eq!(output.skipped_lines, 0);
    }

    #[test]
    fn test_add_product_and_person() {
        let svc = service();
        svc.add_company("Acme", Attributes::new()).unwrap();
        let product = svc.add_product("Acme Drive", "Acme", Attributes::new()).unwrap();
        assert_eq!(product.entity_type, EntityType::Product);

        let person = svc.add_person("Jane", "Acme", "CEO", Attributes::new()).unwrap();
        assert_eq!(person.attribute("role"), Some(&AttributeValue::from("CEO")));

        let rels = svc.backend.relationships().unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].relation_type, RelationshipType::Produces);
        assert_eq!(rels[1].relation_type, RelationshipType::WorksAt);
        assert_eq!(rels[1].attributes.get("role"), Some(&AttributeValue::from("CEO")));
    }

    #[test]
    fn test_seed_competitors_repeatable() {
        let svc = service();
        let added = svc.seed_competitors("Acme", &["Globex", "Initech"]).unwrap();
        assert_eq!(added.len(), 2);
        let again = svc.seed_competitors("Acme", &["Globex"]).unwrap();
        assert!(again.is_empty());
        assert_eq!(svc.backend.relationship_count().unwrap(), 2);
    }

    #[test]
    fn test_ingest_extraction() {
        let svc = service();
        let report = svc.ingest_text(EXTRACTION, "Acme", "Globex").unwrap();
        let store = &svc.backend;

        let acme = store.get_entity("acme").unwrap().unwrap();
        assert_eq!(acme.attribute("is_user_company"), Some(&AttributeValue::from(true)));
        assert_eq!(
            store.get_entity("initech").unwrap().unwrap().entity_type,
            EntityType::Company
        );

        let produces = store.outgoing("Globex", &RelationshipType::Produces).unwrap();
        assert_eq!(produces.len(), 1);
        assert_eq!(produces[0].target.as_str(), "globex box");
        assert_eq!(
            store.get_entity("orphan widget").unwrap().unwrap().entity_type,
            EntityType::Product
        );

        let cloud = store
            .incoming("Cloud Storage", &RelationshipType::OperatesIn)
            .unwrap();
        assert_eq!(cloud.len(), 2);
        assert!(!store.contains("Nobody").unwrap());
        let backup = store
            .incoming("Enterprise Backup", &RelationshipType::OperatesIn)
            .unwrap();
        assert_eq!(backup.len(), 2);

        let works_at = store.incoming("Globex", &RelationshipType::WorksAt).unwrap();
        assert_eq!(works_at[0].attributes.get("role"), Some(&AttributeValue::from("Unknown")));
        let jane = store.incoming("Acme", &RelationshipType::WorksAt).unwrap();
        assert_eq!(jane[0].attributes.get("role"), Some(&AttributeValue::from("CEO")));

        assert_eq!(report.relationships_skipped, 1);
        assert_eq!(report.lines_skipped, 2);
        assert_eq!(report.type_conflicts, 0);
        assert_eq!(report.relationships_added, store.relationship_count().unwrap());
    }

    #[test]
    fn test_ingest_counts_type_conflicts() {
        let svc = service();
        svc.backend
            .add_entity("Initech", EntityType::Market, Attributes::new())
            .unwrap();
        let output = parse_extraction_output("COMPANIES:\n- Initech\n");
        let report = svc.ingest_extraction(&output, "Acme", "Globex").unwrap();
        assert_eq!(report.type_conflicts, 1);
        assert_eq!(
            svc.backend.get_entity("initech").unwrap().unwrap().entity_type,
            EntityType::Market
        );
    }

    #[test]
    fn test_ingest_is_repeatable_for_focus_edge() {
        let svc = service();
        svc.ingest_text("", "Acme", "Globex").unwrap();
        let report = svc.ingest_text("", "Acme", "Globex").unwrap();
        assert_eq!(report.relationships_added, 0);
        assert_eq!(report.entities_merged, 2);
        assert_eq!(svc.backend.relationship_count().unwrap(), 1);
    }
}
