//! Query routing vocabulary.
//!
//! The classifier produces a [`QueryMode`] and, for graph-mode questions, a
//! [`QueryIntent`]. The router maps each intent to a [`TraversalOperation`]
//! through a lookup table, so routing stays testable apart from the keyword
//! list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a question should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Relational or multi-hop question answered from the graph.
    GraphMode,
    /// Single-entity lookup that bypasses the graph.
    #[default]
    SimpleMode,
}

impl QueryMode {
    /// Returns the mode as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GraphMode => "graph_mode",
            Self::SimpleMode => "simple_mode",
        }
    }

    /// Returns true for graph mode.
    #[must_use]
    pub const fn is_graph(&self) -> bool {
        matches!(self, Self::GraphMode)
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of graph question detected in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// "all competitors" - list who competes with a company.
    CompetitorList,
    /// "indirect", "connection" - how two entities are linked.
    IndirectConnection,
    /// "shared", "common", "markets" - markets two companies have in common.
    SharedMarkets,
    /// "compare", "overlap" - where two companies collide.
    ThreatComparison,
    /// "landscape" - who operates in a market.
    MarketLandscape,
    /// "network" - everything around a company.
    Network,
}

impl QueryIntent {
    /// Returns all intent variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CompetitorList,
            Self::IndirectConnection,
            Self::SharedMarkets,
            Self::ThreatComparison,
            Self::MarketLandscape,
            Self::Network,
        ]
    }

    /// Returns the intent as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompetitorList => "competitor_list",
            Self::IndirectConnection => "indirect_connection",
            Self::SharedMarkets => "shared_markets",
            Self::ThreatComparison => "threat_comparison",
            Self::MarketLandscape => "market_landscape",
            Self::Network => "network",
        }
    }

    /// Returns a human-readable description of the intent.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CompetitorList => "List every company that competes with the focus company",
            Self::IndirectConnection => "Find how two entities are connected",
            Self::SharedMarkets => "Find markets both companies operate in",
            Self::ThreatComparison => "Compare two companies for overlapping markets and products",
            Self::MarketLandscape => "List companies operating in a market",
            Self::Network => "Explore entities around a company",
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Traversal engine method an intent dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOperation {
    /// `get_competitors`
    GetCompetitors,
    /// `get_company_network`
    GetCompanyNetwork,
    /// `get_shared_markets`
    GetSharedMarkets,
    /// `get_relationship_path`
    GetRelationshipPath,
    /// `find_competitive_threats`
    FindCompetitiveThreats,
    /// `get_market_landscape`
    GetMarketLandscape,
}

impl TraversalOperation {
    /// Returns the operation name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GetCompetitors => "get_competitors",
            Self::GetCompanyNetwork => "get_company_network",
            Self::GetSharedMarkets => "get_shared_markets",
            Self::GetRelationshipPath => "get_relationship_path",
            Self::FindCompetitiveThreats => "find_competitive_threats",
            Self::GetMarketLandscape => "get_market_landscape",
        }
    }

    /// Returns true if the operation needs a second company.
    #[must_use]
    pub const fn needs_competitor(&self) -> bool {
        matches!(
            self,
            Self::GetSharedMarkets | Self::GetRelationshipPath | Self::FindCompetitiveThreats
        )
    }

    /// Returns true if the operation needs a market.
    #[must_use]
    pub const fn needs_market(&self) -> bool {
        matches!(self, Self::GetMarketLandscape)
    }
}

impl fmt::Display for TraversalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_serde() {
        assert_eq!(
            serde_json::to_string(&QueryMode::GraphMode).unwrap(),
            "\"graph_mode\""
        );
        assert_eq!(QueryMode::default(), QueryMode::SimpleMode);
        assert!(QueryMode::GraphMode.is_graph());
    }

    #[test]
    fn test_intent_strings_unique() {
        let names: std::collections::HashSet<_> =
            QueryIntent::all().iter().map(QueryIntent::as_str).collect();
        assert_eq!(names.len(), QueryIntent::all().len());
    }

    #[test]
    fn test_operation_requirements() {
        assert!(TraversalOperation::GetSharedMarkets.needs_competitor());
        assert!(!TraversalOperation::GetCompetitors.needs_competitor());
        assert!(TraversalOperation::GetMarketLandscape.needs_market());
        assert!(!TraversalOperation::GetCompanyNetwork.needs_market());
    }
}
