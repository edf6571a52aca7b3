//! Property-based tests for graph invariants.
//!
//! Uses proptest to verify invariants across random graphs:
//! - Re-adding an entity never grows the graph
//! - Network expansion never exceeds its depth bound
//! - Relationship paths respect their length bound and are well-formed
//! - Competitor discovery is symmetric
//! - Classification is case-insensitive

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use rivalgraph::models::graph::{Attributes, EntityType, RelationshipType};
use rivalgraph::models::query::QueryMode;
use rivalgraph::services::{GraphSession, classify};
use rivalgraph::storage::GraphStore;

const NODES: usize = 8;

fn relation_strategy() -> impl Strategy<Value = RelationshipType> {
    prop::sample::select(vec![
        RelationshipType::CompetesWith,
        RelationshipType::Produces,
        RelationshipType::OperatesIn,
        RelationshipType::WorksAt,
        RelationshipType::PartnersWith,
    ])
}

fn edges_strategy() -> impl Strategy<Value = Vec<(usize, usize, RelationshipType)>> {
    prop::collection::vec((0..NODES, 0..NODES, relation_strategy()), 0..24)
}

fn build(edges: &[(usize, usize, RelationshipType)]) -> GraphSession {
    let session = GraphSession::init();
    for (a, b, rt) in edges {
        session
            .store()
            .add_relationship(&format!("n{a}"), &format!("n{b}"), rt.clone(), Attributes::new())
            .unwrap();
    }
    session
}

proptest! {
    /// Property: adding the same entity twice leaves the entity count unchanged.
    #[test]
    fn prop_add_entity_idempotent(name in "[A-Za-z][A-Za-z ]{0,20}", times in 1usize..5) {
        let session = GraphSession::init();
        for _ in 0..times {
            session
                .store()
                .add_entity(&name, EntityType::Company, Attributes::new())
                .unwrap();
        }
        prop_assert_eq!(session.store().entity_count().unwrap(), 1);
    }

    /// Property: every relationship add is kept, duplicates included.
    #[test]
    fn prop_relationship_multiplicity(edges in edges_strategy()) {
        let session = build(&edges);
        prop_assert_eq!(session.store().relationship_count().unwrap(), edges.len());
    }

    /// Property: no entity in a network is farther than the requested depth,
    /// and every edge in it joins two visited entities.
    #[test]
    fn prop_network_depth_bound(edges in edges_strategy(), depth in 1u32..4) {
        prop_assume!(!edges.is_empty());
        let session = build(&edges);
        let center = format!("n{}", edges[0].0);

        let network = session
            .traversal()
            .get_company_network(&center, depth)
            .unwrap()
            .unwrap();
        prop_assert!(network.entities.iter().all(|e| e.distance <= depth));
        prop_assert_eq!(network.entities[0].distance, 0);
        for rel in &network.relationships {
            prop_assert!(network.contains(&rel.source));
            prop_assert!(network.contains(&rel.target));
        }
    }

    /// Property: a returned path is within bound and each step is adjacent
    /// to the entity before it.
    #[test]
    fn prop_path_well_formed(
        edges in edges_strategy(),
        from in 0..NODES,
        to in 0..NODES,
        max_length in 0u32..6,
    ) {
        let session = build(&edges);
        let path = session
            .traversal()
            .get_relationship_path(&format!("n{from}"), &format!("n{to}"), max_length)
            .unwrap();

        if let Some(path) = path {
            prop_assert!(path.len() <= max_length as usize || path.is_empty());
            let mut previous = path.start.id.clone();
            for step in &path.steps {
                prop_assert_eq!(step.relationship.other_end(&previous), Some(&step.entity.id));
                previous = step.entity.id.clone();
            }
            prop_assert_eq!(path.end().name.clone(), format!("n{to}"));
        }
    }

    /// Property: a shorter bound never finds a path the longer bound misses,
    /// and the shortest path never grows with the bound.
    #[test]
    fn prop_path_monotone_in_bound(edges in edges_strategy(), from in 0..NODES, to in 0..NODES) {
        let session = build(&edges);
        let traversal = session.traversal();
        let a = format!("n{from}");
        let b = format!("n{to}");

        let short = traversal.get_relationship_path(&a, &b, 2).unwrap();
        let long = traversal.get_relationship_path(&a, &b, 5).unwrap();
        if let Some(short) = short {
            let long = long.unwrap();
            prop_assert_eq!(short.len(), long.len());
        }
    }

    /// Property: competitor discovery is symmetric.
    #[test]
    fn prop_competitors_symmetric(edges in edges_strategy()) {
        let session = build(&edges);
        let traversal = session.traversal();
        for i in 0..NODES {
            let name = format!("n{i}");
            for competitor in traversal.get_competitors(&name).unwrap() {
                let back = traversal.get_competitors(competitor.id.as_str()).unwrap();
                prop_assert!(back.iter().any(|e| e.name == name));
            }
        }
    }

    /// Property: classification ignores case.
    #[test]
    fn prop_classify_case_insensitive(question in "[A-Za-z ]{0,40}") {
        prop_assert_eq!(classify(&question), classify(&question.to_uppercase()));
        prop_assert_eq!(classify(&question), classify(&question.to_lowercase()));
    }

    /// Property: embedding a graph keyword always selects graph mode.
    #[test]
    fn prop_keyword_forces_graph_mode(
        prefix in "[a-z ]{0,10}",
        keyword in prop::sample::select(rivalgraph::services::GRAPH_KEYWORDS.to_vec()),
        suffix in "[a-z ]{0,10}",
    ) {
        let question = format!("{prefix}{keyword}{suffix}");
        prop_assert_eq!(classify(&question), QueryMode::GraphMode);
    }
}
