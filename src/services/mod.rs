//! Business logic services.
//!
//! Services sit on top of a [`GraphStore`](crate::storage::GraphStore) and
//! provide the high-level operations: traversal, question routing, summaries
//! and ingestion. [`GraphSession`] wires them to one session-scoped store.

pub mod classifier;
pub mod ingest;
pub mod router;
mod session;
pub mod summary;
pub mod traversal;

pub use classifier::{Classification, GRAPH_KEYWORDS, classify, classify_question};
pub use ingest::{
    ExtractedEntity, ExtractedRelationship, ExtractionOutput, IngestReport, IngestService,
    parse_extraction_output,
};
pub use router::{
    QueryContext, QueryOutcome, QueryRouter, ROUTING_TABLE, RoutedQuery, operation_for,
};
pub use session::GraphSession;
pub use summary::{
    ExportEdge, ExportNode, ExportStats, GraphExport, GraphSummary, RankedCompany, SummaryService,
};
pub use traversal::{
    CompanyNetwork, LandscapeCompany, LeadershipEntry, MarketLandscape, NetworkEntity,
    OverlapBasis, PathStep, ProductOverlap, RelationshipPath, ThreatAssessment, TraversalService,
};
