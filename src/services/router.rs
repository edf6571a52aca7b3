//! Query routing.
//!
//! Classifies a question and, for graph-mode questions, dispatches the
//! detected intent to a traversal operation through [`ROUTING_TABLE`].
//! Simple-mode questions are handed back untouched for the caller's own
//! single-entity lookup.
//!
//! # Example
//!
//! ```rust
//! use rivalgraph::models::graph::{Attributes, RelationshipType};
//! use rivalgraph::services::{GraphSession, QueryContext, QueryOutcome, RoutedQuery};
//! use rivalgraph::storage::GraphStore;
//!
//! let session = GraphSession::init();
//! let store = session.store();
//! store.add_relationship("Acme", "Cloud", RelationshipType::OperatesIn, Attributes::new())?;
//! store.add_relationship("Globex", "Cloud", RelationshipType::OperatesIn, Attributes::new())?;
//!
//! let routed = session
//!     .router()
//!     .route("Which markets do we share with Globex?", &QueryContext::new("Acme"))?;
//! match routed {
//!     RoutedQuery::Graph { outcome: QueryOutcome::SharedMarkets { markets, .. }, .. } => {
//!         assert_eq!(markets[0].name, "Cloud");
//!     },
//!     other => panic!("unexpected routing: {other:?}"),
//! }
//! # Ok::<(), rivalgraph::Error>(())
//! ```

use crate::config::GraphConfig;
use crate::models::graph::{Entity, EntityId, EntityType};
use crate::models::query::{QueryIntent, TraversalOperation};
use crate::services::classifier::{Classification, classify_question};
use crate::services::traversal::{
    CompanyNetwork, RelationshipPath, ThreatAssessment, TraversalService,
};
use crate::storage::traits::GraphStore;
use crate::{Error, Result};
use serde::Serialize;

/// Intent to traversal operation dispatch table.
pub const ROUTING_TABLE: &[(QueryIntent, TraversalOperation)] = &[
    (QueryIntent::CompetitorList, TraversalOperation::GetCompetitors),
    (
        QueryIntent::IndirectConnection,
        TraversalOperation::GetRelationshipPath,
    ),
    (QueryIntent::SharedMarkets, TraversalOperation::GetSharedMarkets),
    (
        QueryIntent::ThreatComparison,
        TraversalOperation::FindCompetitiveThreats,
    ),
    (
        QueryIntent::MarketLandscape,
        TraversalOperation::GetMarketLandscape,
    ),
    (QueryIntent::Network, TraversalOperation::GetCompanyNetwork),
];

/// Looks up the traversal operation for an intent.
#[must_use]
pub fn operation_for(intent: QueryIntent) -> TraversalOperation {
    ROUTING_TABLE
        .iter()
        .find(|(i, _)| *i == intent)
        .map_or(TraversalOperation::GetCompanyNetwork, |(_, op)| *op)
}

/// Caller-supplied context for routing a question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// The user's own company.
    pub user_company: String,
    /// Competitor for two-company operations.
    pub competitor: Option<String>,
    /// Market for landscape operations.
    pub market: Option<String>,
    /// Network depth; the configured default when absent.
    pub depth: Option<u32>,
    /// Path length bound; the configured default when absent.
    pub max_length: Option<u32>,
}

impl QueryContext {
    /// Creates a context for the user's company.
    #[must_use]
    pub fn new(user_company: impl Into<String>) -> Self {
        Self {
            user_company: user_company.into(),
            ..Self::default()
        }
    }

    /// Sets the competitor.
    #[must_use]
    pub fn with_competitor(mut self, competitor: impl Into<String>) -> Self {
        self.competitor = Some(competitor.into());
        self
    }

    /// Sets the market.
    #[must_use]
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Sets the network depth.
    #[must_use]
    pub const fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Sets the path length bound.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// Structured result of a routed graph query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Result of `get_competitors`.
    Competitors {
        /// The company asked about.
        company: EntityId,
        /// Its direct competitors.
        competitors: Vec<Entity>,
    },
    /// Result of `get_company_network`; `None` for an unknown company.
    Network {
        /// The network, if the company exists.
        network: Option<CompanyNetwork>,
    },
    /// Result of `get_shared_markets`.
    SharedMarkets {
        /// The user's company.
        company: EntityId,
        /// The competitor.
        competitor: EntityId,
        /// Markets both operate in.
        markets: Vec<Entity>,
    },
    /// Result of `get_relationship_path`.
    RelationshipPath {
        /// Path start.
        source: EntityId,
        /// Path end.
        target: EntityId,
        /// Shortest path, if one exists within the bound.
        path: Option<RelationshipPath>,
    },
    /// Result of `find_competitive_threats`.
    Threats {
        /// The assessment.
        assessment: ThreatAssessment,
    },
    /// Result of `get_market_landscape`.
    MarketLandscape {
        /// The market asked about.
        market: EntityId,
        /// Companies operating in it.
        companies: Vec<Entity>,
    },
}

/// A classified and, for graph mode, executed question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RoutedQuery {
    /// Answer from a single-entity lookup; the graph was not consulted.
    Simple,
    /// Answered by a traversal.
    Graph {
        /// Detected intent.
        intent: QueryIntent,
        /// Operation the intent dispatched to.
        operation: TraversalOperation,
        /// Structured result.
        outcome: QueryOutcome,
    },
}

/// Routes questions to traversal operations.
pub struct QueryRouter<B: GraphStore> {
    traversal: TraversalService<B>,
    default_depth: u32,
    default_max_length: u32,
}

impl<B: GraphStore> QueryRouter<B> {
    /// Creates a router over a traversal service.
    #[must_use]
    pub fn new(traversal: TraversalService<B>, config: &GraphConfig) -> Self {
        Self {
            traversal,
            default_depth: config.default_network_depth,
            default_max_length: config.default_max_path_length,
        }
    }

    /// Classifies `question` and executes the mapped traversal in graph mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the operation needs a competitor
    /// or market that is neither in `context` nor mentioned in the question,
    /// or if a traversal bound is out of range.
    pub fn route(&self, question: &str, context: &QueryContext) -> Result<RoutedQuery> {
        let Classification { intent, .. } = classify_question(question);
        let Some(intent) = intent else {
            return Ok(RoutedQuery::Simple);
        };

        let operation = operation_for(intent);
        tracing::debug!(intent = %intent, operation = %operation, "routing graph query");
        let outcome = self.execute(operation, question, context)?;

        Ok(RoutedQuery::Graph {
            intent,
            operation,
            outcome,
        })
    }

    /// Executes one operation with context resolved from the question.
    ///
    /// # Errors
    ///
    /// See [`QueryRouter::route`].
    pub fn execute(
        &self,
        operation: TraversalOperation,
        question: &str,
        context: &QueryContext,
    ) -> Result<QueryOutcome> {
        let store = self.traversal.backend();

        let outcome = match operation {
            TraversalOperation::GetCompetitors => {
                let company = user_company(context, operation)?;
                QueryOutcome::Competitors {
                    company: store.resolve_id(company),
                    competitors: self.traversal.get_competitors(company)?,
                }
            },
            TraversalOperation::GetCompanyNetwork => {
                let company = user_company(context, operation)?;
                let depth = context.depth.unwrap_or(self.default_depth);
                QueryOutcome::Network {
                    network: self.traversal.get_company_network(company, depth)?,
                }
            },
            TraversalOperation::GetSharedMarkets => {
                let company = user_company(context, operation)?;
                let competitor = self.resolve_competitor(question, context, false)?;
                QueryOutcome::SharedMarkets {
                    company: store.resolve_id(company),
                    competitor: store.resolve_id(&competitor),
                    markets: self.traversal.get_shared_markets(company, &competitor)?,
                }
            },
            TraversalOperation::GetRelationshipPath => {
                let company = user_company(context, operation)?;
                let target = self.resolve_competitor(question, context, true)?;
                let max_length = context.max_length.unwrap_or(self.default_max_length);
                QueryOutcome::RelationshipPath {
                    source: store.resolve_id(company),
                    target: store.resolve_id(&target),
                    path: self
                        .traversal
                        .get_relationship_path(company, &target, max_length)?,
                }
            },
            TraversalOperation::FindCompetitiveThreats => {
                let company = user_company(context, operation)?;
                let competitor = self.resolve_competitor(question, context, false)?;
                QueryOutcome::Threats {
                    assessment: self
                        .traversal
                        .find_competitive_threats(company, &competitor)?,
                }
            },
            TraversalOperation::GetMarketLandscape => {
                let market = self.resolve_market(question, context)?;
                QueryOutcome::MarketLandscape {
                    market: store.resolve_id(&market),
                    companies: self.traversal.get_market_landscape(&market)?,
                }
            },
        };

        Ok(outcome)
    }

    fn resolve_competitor(
        &self,
        question: &str,
        context: &QueryContext,
        any_type: bool,
    ) -> Result<String> {
        if let Some(competitor) = context.competitor.as_deref().filter(|c| !c.trim().is_empty()) {
            return Ok(competitor.to_string());
        }

        let exclude = self.traversal.backend().resolve_id(&context.user_company);
        let companies = [EntityType::Company, EntityType::Unknown];
        let mut found = self.mentioned_entity(question, &exclude, |t| companies.contains(&t))?;
        if found.is_none() && any_type {
            found = self.mentioned_entity(question, &exclude, |t| t != EntityType::Market)?;
        }

        found.map(|e| e.name).ok_or_else(|| {
            Error::InvalidArgument(
                "question needs a competitor and none was given or mentioned".to_string(),
            )
        })
    }

    fn resolve_market(&self, question: &str, context: &QueryContext) -> Result<String> {
        if let Some(market) = context.market.as_deref().filter(|m| !m.trim().is_empty()) {
            return Ok(market.to_string());
        }

        let exclude = self.traversal.backend().resolve_id(&context.user_company);
        self.mentioned_entity(question, &exclude, |t| t == EntityType::Market)?
            .map(|e| e.name)
            .ok_or_else(|| {
                Error::InvalidArgument(
                    "question needs a market and none was given or mentioned".to_string(),
                )
            })
    }

    /// Finds the longest entity name mentioned in the question as a whole word.
    fn mentioned_entity(
        &self,
        question: &str,
        exclude: &EntityId,
        accept: impl Fn(EntityType) -> bool,
    ) -> Result<Option<Entity>> {
        let lowered = question.to_lowercase();
        let mut candidates: Vec<Entity> = self
            .traversal
            .backend()
            .entities()?
            .into_iter()
            .filter(|e| e.id != *exclude && accept(e.entity_type))
            .filter(|e| mentions(&lowered, &e.name.to_lowercase()))
            .collect();

        // Stable sort keeps insertion order among equal lengths.
        candidates.sort_by_key(|e| std::cmp::Reverse(e.name.chars().count()));
        Ok(candidates.into_iter().next())
    }
}

/// Returns the trimmed user company, which every company-centred operation needs.
fn user_company(context: &QueryContext, operation: TraversalOperation) -> Result<&str> {
    let company = context.user_company.trim();
    if company.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "{operation} needs the user's company"
        )));
    }
    Ok(company)
}

/// Returns true if `needle` occurs in `haystack` bounded by non-alphanumerics.
fn mentions(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::models::graph::{Attributes, RelationshipType};
    use crate::storage::graph::InMemoryGraphStore;
    use std::sync::Arc;

    fn router() -> QueryRouter<InMemoryGraphStore> {
        let config = GraphConfig::default();
        let store = Arc::new(InMemoryGraphStore::new());
        store
            .add_entity("Acme", EntityType::Company, Attributes::new())
            .unwrap();
        store
            .add_entity("Globex", EntityType::Company, Attributes::new())
            .unwrap();
        store
            .add_entity("Cloud Storage", EntityType::Market, Attributes::new())
            .unwrap();
        for (a, b, rt) in [
            ("Acme", "Globex", RelationshipType::CompetesWith),
            ("Acme", "Cloud Storage", RelationshipType::OperatesIn),
            ("Globex", "Cloud Storage", RelationshipType::OperatesIn),
        ] {
            store.add_relationship(a, b, rt, Attributes::new()).unwrap();
        }
        QueryRouter::new(TraversalService::new(store, &config), &config)
    }

    #[test]
    fn test_routing_table_covers_intents() {
        for intent in QueryIntent::all() {
            assert!(ROUTING_TABLE.iter().any(|(i, _)| i == intent));
        }
        assert_eq!(
            operation_for(QueryIntent::SharedMarkets),
            TraversalOperation::GetSharedMarkets
        );
    }

    #[test]
    fn test_mentions_whole_words() {
        assert!(mentions("what about globex's products?", "globex"));
        assert!(mentions("cloud storage market", "cloud storage"));
        assert!(!mentions("maintain the lead", "ai"));
        assert!(!mentions("anything", ""));
    }

    #[test]
    fn test_route_simple() {
        let routed = router()
            .route("What is Acme's revenue?", &QueryContext::new("Acme"))
            .unwrap();
        assert_eq!(routed, RoutedQuery::Simple);
    }

    #[test]
    fn test_route_competitor_list() {
        let routed = router()
            .route("Who are all competitors of ours?", &QueryContext::new("Acme"))
            .unwrap();
        let RoutedQuery::Graph { outcome, .. } = routed else {
            panic!("expected graph routing");
        };
        let QueryOutcome::Competitors { competitors, .. } = outcome else {
            panic!("expected competitors");
        };
        assert_eq!(competitors[0].name, "Globex");
    }

    #[test]
    fn test_route_resolves_mentioned_competitor() {
        let routed = router()
            .route("What markets do we share with Globex?", &QueryContext::new("Acme"))
            .unwrap();
        let RoutedQuery::Graph {
            intent,
            operation,
            outcome,
        } = routed
        else {
            panic!("expected graph routing");
        };
        assert_eq!(intent, QueryIntent::SharedMarkets);
        assert_eq!(operation, TraversalOperation::GetSharedMarkets);
        let QueryOutcome::SharedMarkets {
            competitor,
            markets,
            ..
        } = outcome
        else {
            panic!("expected shared markets");
        };
        assert_eq!(competitor.as_str(), "globex");
        assert_eq!(markets[0].name, "Cloud Storage");
    }

    #[test]
    fn test_route_missing_competitor() {
        let result = router().route("Which markets do we share?", &QueryContext::new("Acme"));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_route_landscape_resolves_market() {
        let routed = router()
            .route(
                "Describe the landscape of the cloud storage markets",
                &QueryContext::new("Acme"),
            )
            .unwrap();
        let RoutedQuery::Graph { outcome, .. } = routed else {
            panic!("expected graph routing");
        };
        let QueryOutcome::MarketLandscape { companies, .. } = outcome else {
            panic!("expected landscape");
        };
        assert_eq!(companies.len(), 2);
    }

    #[test]
    fn test_route_network_uses_context_depth() {
        let routed = router()
            .route("Show our network", &QueryContext::new("Acme").with_depth(2))
            .unwrap();
        let RoutedQuery::Graph {
            outcome: QueryOutcome::Network {
                network: Some(network),
            },
            ..
        } = routed
        else {
            panic!("expected network");
        };
        assert_eq!(network.depth, 2);
        assert_eq!(network.entities.len(), 3);
    }

    #[test]
    fn test_route_outcome_serializes() {
        let routed = router()
            .route(
                "Is there an indirect connection?",
                &QueryContext::new("Acme").with_competitor("Globex"),
            )
            .unwrap();
        let json = serde_json::to_value(&routed).unwrap();
        assert_eq!(json["mode"], "graph");
        assert_eq!(json["outcome"]["operation"], "relationship_path");
    }
}
