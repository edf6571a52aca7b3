//! Benchmarks for graph traversal and routing.
//!
//! Benchmark targets:
//! - Competitor lookup: <10µs on a 1k-entity graph
//! - Shortest path (bound 3): <1ms on a 1k-entity graph
//! - Network expansion (depth 2): <1ms
//! - Classification: <5µs per question
//!
//! Graphs are synthetic: companies in a ring of `competes_with` edges, each
//! operating in a handful of shared markets.

// Criterion macros generate items without docs - this is expected for benchmarks
// Benchmarks use expect/unwrap for simplicity - panics are acceptable in benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::doc_markdown)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use rivalgraph::models::graph::{Attributes, EntityType, RelationshipType};
use rivalgraph::services::{GraphSession, QueryContext, classify};
use rivalgraph::storage::GraphStore;

/// Builds `companies` companies in a competition ring over `companies / 10` markets.
fn build_graph(companies: usize) -> GraphSession {
    let session = GraphSession::init();
    let store = session.store();
    let markets = (companies / 10).max(1);

    for i in 0..companies {
        store
            .add_entity(&format!("Company {i}"), EntityType::Company, Attributes::new())
            .unwrap();
    }
    for m in 0..markets {
        store
            .add_entity(&format!("Market {m}"), EntityType::Market, Attributes::new())
            .unwrap();
    }
    for i in 0..companies {
        store
            .add_relationship(
                &format!("Company {i}"),
                &format!("Company {}", (i + 1) % companies),
                RelationshipType::CompetesWith,
                Attributes::new(),
            )
            .unwrap();
        for offset in 0..3 {
            store
                .add_relationship(
                    &format!("Company {i}"),
                    &format!("Market {}", (i + offset) % markets),
                    RelationshipType::OperatesIn,
                    Attributes::new(),
                )
                .unwrap();
        }
    }
    session
}

// ============================================================================
// Traversal Benchmarks
// ============================================================================

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    group.measurement_time(Duration::from_secs(3));

    for size in [100usize, 1000] {
        let session = build_graph(size);
        let traversal = session.traversal();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("get_competitors", size), &size, |b, _| {
            b.iter(|| black_box(traversal.get_competitors("Company 0").unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("get_shared_markets", size), &size, |b, _| {
            b.iter(|| black_box(traversal.get_shared_markets("Company 0", "Company 1").unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("get_company_network", size), &size, |b, _| {
            b.iter(|| black_box(traversal.get_company_network("Company 0", 2).unwrap()));
        });

        let target = format!("Company {}", size / 2);
        group.bench_with_input(BenchmarkId::new("get_relationship_path", size), &size, |b, _| {
            b.iter(|| black_box(traversal.get_relationship_path("Company 0", &target, 3).unwrap()));
        });
    }

    group.finish();
}

// ============================================================================
// Routing Benchmarks
// ============================================================================

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");

    let questions = [
        "What is Acme's revenue?",
        "What markets do we share with Globex?",
        "Is there an indirect connection between us and Initech?",
        "Show all competitors in the cloud storage space",
    ];

    group.bench_function("classify", |b| {
        b.iter(|| {
            for question in &questions {
                black_box(classify(question));
            }
        });
    });

    let session = build_graph(100);
    let router = session.router();
    let context = QueryContext::new("Company 0").with_competitor("Company 1");
    group.bench_function("route_shared_markets", |b| {
        b.iter(|| black_box(router.route("Which markets do we share?", &context).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_traversal, bench_routing);
criterion_main!(benches);
