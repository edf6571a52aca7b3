//! Session lifecycle.
//!
//! A [`GraphSession`] owns one in-memory graph for the length of an analysis
//! session. Services handed out by the session share the same store, so a
//! fact added through one is visible to all of them.

use crate::config::GraphConfig;
use crate::services::ingest::IngestService;
use crate::services::router::QueryRouter;
use crate::services::summary::SummaryService;
use crate::services::traversal::TraversalService;
use crate::storage::graph::InMemoryGraphStore;
use crate::storage::traits::GraphStore;
use std::sync::Arc;

/// Session-scoped knowledge graph.
///
/// Created empty by [`GraphSession::init`] and discarded by
/// [`GraphSession::teardown`]. Nothing survives the session. Share a
/// session across threads through `Arc<GraphSession>`.
#[derive(Debug)]
pub struct GraphSession {
    store: Arc<InMemoryGraphStore>,
    config: GraphConfig,
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::init()
    }
}

impl GraphSession {
    /// Starts a session with default configuration.
    #[must_use]
    pub fn init() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Starts a session with the given configuration.
    #[must_use]
    pub fn with_config(config: GraphConfig) -> Self {
        tracing::debug!(normalize_ids = config.normalize_ids, "starting graph session");
        Self {
            store: Arc::new(InMemoryGraphStore::with_normalization(config.normalize_ids)),
            config,
        }
    }

    /// Returns the shared store.
    #[must_use]
    pub fn store(&self) -> &InMemoryGraphStore {
        &self.store
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Returns a traversal service over the session graph.
    #[must_use]
    pub fn traversal(&self) -> TraversalService<InMemoryGraphStore> {
        TraversalService::new(Arc::clone(&self.store), &self.config)
    }

    /// Returns a query router over the session graph.
    #[must_use]
    pub fn router(&self) -> QueryRouter<InMemoryGraphStore> {
        QueryRouter::new(self.traversal(), &self.config)
    }

    /// Returns a summary service over the session graph.
    #[must_use]
    pub fn summary(&self) -> SummaryService<InMemoryGraphStore> {
        SummaryService::new(Arc::clone(&self.store), &self.config)
    }

    /// Returns an ingest service over the session graph.
    #[must_use]
    pub fn ingest(&self) -> IngestService<InMemoryGraphStore> {
        IngestService::new(Arc::clone(&self.store))
    }

    /// Ends the session and discards the graph.
    ///
    /// Services obtained from the session keep their own handle to the
    /// store; the graph is dropped when the last of them goes away.
    pub fn teardown(self) {
        tracing::debug!(
            entities = self.store.entity_count().unwrap_or_default(),
            "tearing down graph session"
        );
    }
}
