use archgraph_core::{
    CompatibilityRules, Element, ElementType, GraphStore, Relationship, RelationshipType,
};
use archgraph_graph::{cleanup, ArchGraph, ImpactPropagator};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::time::Duration;

const TYPES: [ElementType; 6] = [
    ElementType::BusinessActor,
    ElementType::BusinessProcess,
    ElementType::BusinessService,
    ElementType::ApplicationComponent,
    ElementType::ApplicationService,
    ElementType::Node,
];

const RELS: [RelationshipType; 5] = [
    RelationshipType::Serving,
    RelationshipType::Realization,
    RelationshipType::Assignment,
    RelationshipType::Triggering,
    RelationshipType::Access,
];

/// Deterministic layered graph with `edges_per_node` links per element.
fn create_test_graph(node_count: usize, edges_per_node: usize) -> ArchGraph {
    let mut graph = ArchGraph::new();
    for i in 0..node_count {
        let element = Element::with_id(
            format!("e{}", i),
            TYPES[i % TYPES.len()],
            format!("Element {}", i),
        );
        graph.add_element(element).unwrap();
    }

    let mut seq = 0usize;
    for i in 0..node_count {
        for k in 1..=edges_per_node {
            let j = (i * 31 + k * 17) % node_count;
            if i == j {
                continue;
            }
            let rel = Relationship::with_id(
                format!("r{}", seq),
                format!("e{}", i),
                format!("e{}", j),
                RELS[seq % RELS.len()],
            );
            graph.add_relationship(rel).unwrap();
            seq += 1;
        }
    }
    graph
}

fn bench_impact(c: &mut Criterion) {
    let mut group = c.benchmark_group("impact_propagation");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 1000, 5000].iter() {
        let graph = create_test_graph(*size, 3);
        let propagator = ImpactPropagator::default();
        group.bench_with_input(BenchmarkId::new("single_seed", size), size, |b, _| {
            b.iter(|| black_box(propagator.propagate(&graph, ["e0"]).unwrap()))
        });
    }

    group.finish();
}

fn bench_cleanup(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleanup");
    let rules = CompatibilityRules::archimate();

    for size in [100, 1000].iter() {
        let graph = create_test_graph(*size, 3);
        group.bench_with_input(BenchmarkId::new("full_pass", size), size, |b, _| {
            b.iter(|| {
                let mut working = graph.clone();
                black_box(cleanup(&mut working, &rules))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_impact, bench_cleanup);
criterion_main!(benches);
