//! Keyword-based query classification.
//!
//! Decides whether a natural-language question needs the graph
//! ([`QueryMode::GraphMode`]) or can be answered from a single entity's
//! facts ([`QueryMode::SimpleMode`]). Matching is a case-folded substring
//! test against a fixed keyword set; there is no scoring.
//!
//! For graph-mode questions an ordered signal table picks the
//! [`QueryIntent`]. The first signal present in the question wins.
//!
//! | Signal phrases | Intent |
//! |----------------|--------|
//! | all competitors | `CompetitorList` |
//! | indirect, connection, relationship | `IndirectConnection` |
//! | landscape | `MarketLandscape` |
//! | shared, common, markets | `SharedMarkets` |
//! | overlap, compare | `ThreatComparison` |
//! | network | `Network` |

use crate::models::query::{QueryIntent, QueryMode};
use serde::Serialize;

/// Phrases that route a question to graph mode.
pub const GRAPH_KEYWORDS: &[&str] = &[
    "compare",
    "relationship",
    "connection",
    "shared",
    "common",
    "network",
    "indirect",
    "all competitors",
    "markets",
    "overlap",
];

/// Ordered intent signals; earlier rows take precedence.
pub const INTENT_SIGNALS: &[(&[&str], QueryIntent)] = &[
    (&["all competitors"], QueryIntent::CompetitorList),
    (
        &["indirect", "connection", "relationship"],
        QueryIntent::IndirectConnection,
    ),
    (&["landscape"], QueryIntent::MarketLandscape),
    (&["shared", "common", "markets"], QueryIntent::SharedMarkets),
    (&["overlap", "compare"], QueryIntent::ThreatComparison),
    (&["network"], QueryIntent::Network),
];

/// Result of classifying a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Graph or simple mode.
    pub mode: QueryMode,
    /// Keywords found in the question, in keyword-set order.
    pub matched_keywords: Vec<&'static str>,
    /// Detected intent; always `Some` in graph mode.
    pub intent: Option<QueryIntent>,
}

/// Classifies a question as graph mode or simple mode.
///
/// # Example
///
/// ```rust
/// use rivalgraph::models::query::QueryMode;
/// use rivalgraph::services::classify;
///
/// assert_eq!(classify("What is Acme's revenue?"), QueryMode::SimpleMode);
/// assert_eq!(classify("What markets do we share with Acme?"), QueryMode::GraphMode);
/// ```
#[must_use]
pub fn classify(question: &str) -> QueryMode {
    let lowered = question.to_lowercase();
    if GRAPH_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        QueryMode::GraphMode
    } else {
        QueryMode::SimpleMode
    }
}

/// Classifies a question and reports which keywords and intent were found.
#[must_use]
pub fn classify_question(question: &str) -> Classification {
    let lowered = question.to_lowercase();

    let matched_keywords: Vec<&'static str> = GRAPH_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| lowered.contains(kw))
        .collect();

    if matched_keywords.is_empty() {
        return Classification {
            mode: QueryMode::SimpleMode,
            matched_keywords,
            intent: None,
        };
    }

    let intent = INTENT_SIGNALS
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| lowered.contains(p)))
        .map_or(QueryIntent::Network, |(_, intent)| *intent);

    tracing::debug!(
        intent = %intent,
        keywords = ?matched_keywords,
        "classified graph query"
    );

    Classification {
        mode: QueryMode::GraphMode,
        matched_keywords,
        intent: Some(intent),
    }
}
