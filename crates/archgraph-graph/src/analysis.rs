use archgraph_core::{Element, ElementId, ElementType, GraphStore, ImpactConfig, Layer};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Hop cutoff for path searches when the caller has no better bound.
pub const DEFAULT_PATH_CUTOFF: usize = 5;
pub const CRITICAL_PATH_LIMIT: usize = 10;
pub const BOTTLENECK_LIMIT: usize = 20;

/// A simple directed path and its mean hop weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath {
    pub elements: Vec<ElementId>,
    pub score: f64,
}

/// A link ranked by how many shortest paths run through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub source: ElementId,
    pub target: ElementId,
    pub betweenness: f64,
}

/// Read-only structural queries available on every store.
pub trait GraphAnalysis: GraphStore {
    /// `(incoming, outgoing)` relationship counts.
    fn relationship_counts(&self, id: &str) -> (usize, usize) {
        (self.incoming(id).len(), self.outgoing(id).len())
    }

    /// (in + out) / (n - 1); `0.0` for unknown ids and single-element graphs.
    fn degree_centrality(&self, id: &str) -> f64 {
        let n = self.element_count();
        if n < 2 || !self.contains_element(id) {
            return 0.0;
        }
        let (incoming, outgoing) = self.relationship_counts(id);
        (incoming + outgoing) as f64 / (n - 1) as f64
    }

    /// Elements whose name contains every whitespace-separated word of
    /// `query`, ignoring case. Queries shorter than two characters match nothing.
    fn search_elements(&self, query: &str) -> Vec<&Element> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < 2 {
            return Vec::new();
        }
        let words: Vec<&str> = query.split_whitespace().collect();
        self.elements()
            .filter(|e| {
                let name = e.name.to_lowercase();
                words.iter().all(|w| name.contains(w))
            })
            .collect()
    }

    fn elements_in_layer(&self, layer: Layer) -> Vec<&Element> {
        self.elements().filter(|e| e.layer() == layer).collect()
    }

    fn elements_of_type(&self, element_type: ElementType) -> Vec<&Element> {
        self.elements()
            .filter(|e| e.element_type == element_type)
            .collect()
    }

    /// Relationship counts keyed by source layer, then target layer.
    /// Relationships with a missing endpoint are not counted.
    fn layer_connectivity(&self) -> BTreeMap<Layer, BTreeMap<Layer, usize>> {
        let mut counts: BTreeMap<Layer, BTreeMap<Layer, usize>> = BTreeMap::new();
        for rel in self.relationships() {
            if let (Some(source), Some(target)) =
                (self.element(&rel.source), self.element(&rel.target))
            {
                *counts
                    .entry(source.layer())
                    .or_default()
                    .entry(target.layer())
                    .or_default() += 1;
            }
        }
        counts
    }

    /// Distinct directed links between different elements over the
    /// n * (n - 1) possible ones. `0.0` below two elements.
    fn density(&self) -> f64 {
        let n = self.element_count();
        if n < 2 {
            return 0.0;
        }
        let links: HashSet<(&str, &str)> = self
            .relationships()
            .filter(|r| r.source != r.target)
            .filter(|r| self.contains_element(&r.source) && self.contains_element(&r.target))
            .map(|r| (r.source.as_str(), r.target.as_str()))
            .collect();
        links.len() as f64 / (n * (n - 1)) as f64
    }

    /// Simple directed paths from `source` to `target` with at most `cutoff`
    /// hops, best mean hop weight first, capped at [`CRITICAL_PATH_LIMIT`].
    ///
    /// Hop weights come from [`ImpactConfig::weight`]. Parallel relationships
    /// between the same pair count once, at the heaviest weight.
    fn critical_paths(
        &self,
        source: &str,
        target: &str,
        cutoff: usize,
        weights: &ImpactConfig,
    ) -> Vec<CriticalPath> {
        if source == target || !self.contains_element(source) || !self.contains_element(target) {
            return Vec::new();
        }
        let mut search = PathSearch {
            graph: self,
            target,
            cutoff,
            weights,
            stack: vec![source],
            hops: Vec::new(),
            found: Vec::new(),
        };
        search.extend();

        let mut paths = search.found;
        paths.sort_by(|a, b| b.score.total_cmp(&a.score));
        paths.truncate(CRITICAL_PATH_LIMIT);
        paths
    }

    /// Links carrying the most shortest paths (unweighted edge betweenness,
    /// normalized by n * (n - 1)), strongest first, capped at [`BOTTLENECK_LIMIT`].
    fn bottlenecks(&self) -> Vec<Bottleneck> {
        let ids: Vec<&str> = self.elements().map(|e| e.id.as_str()).collect();
        let n = ids.len();
        if n < 2 {
            return Vec::new();
        }
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut scores: IndexMap<(usize, usize), f64> = IndexMap::new();
        for (i, id) in ids.iter().enumerate() {
            for rel in self.outgoing(id) {
                if let Some(&j) = index.get(rel.target.as_str()) {
                    if j != i && !adjacency[i].contains(&j) {
                        adjacency[i].push(j);
                        scores.insert((i, j), 0.0);
                    }
                }
            }
        }
        for s in 0..n {
            accumulate_betweenness(s, &adjacency, &mut scores);
        }

        let scale = 1.0 / (n * (n - 1)) as f64;
        let mut ranked: Vec<Bottleneck> = scores
            .into_iter()
            .map(|((i, j), score)| Bottleneck {
                source: ids[i].to_string(),
                target: ids[j].to_string(),
                betweenness: score * scale,
            })
            .collect();
        ranked.sort_by(|a, b| b.betweenness.total_cmp(&a.betweenness));
        ranked.truncate(BOTTLENECK_LIMIT);
        ranked
    }
}

impl<G: GraphStore + ?Sized> GraphAnalysis for G {}

struct PathSearch<'a, G: ?Sized> {
    graph: &'a G,
    target: &'a str,
    cutoff: usize,
    weights: &'a ImpactConfig,
    stack: Vec<&'a str>,
    hops: Vec<f64>,
    found: Vec<CriticalPath>,
}

impl<'a, G: GraphStore + ?Sized> PathSearch<'a, G> {
    fn extend(&mut self) {
        if self.hops.len() >= self.cutoff {
            return;
        }
        let current = match self.stack.last() {
            Some(current) => *current,
            None => return,
        };
        for (next, weight) in heaviest_links(self.graph, current, self.weights) {
            if self.stack.contains(&next) {
                continue;
            }
            self.stack.push(next);
            self.hops.push(weight);
            if next == self.target {
                self.found.push(CriticalPath {
                    elements: self.stack.iter().map(|id| id.to_string()).collect(),
                    score: self.hops.iter().sum::<f64>() / self.hops.len() as f64,
                });
            } else {
                self.extend();
            }
            self.hops.pop();
            self.stack.pop();
        }
    }
}

/// Existing successors of `id`, each with its heaviest link weight.
fn heaviest_links<'a, G: GraphStore + ?Sized>(
    graph: &'a G,
    id: &str,
    weights: &ImpactConfig,
) -> IndexMap<&'a str, f64> {
    let mut links: IndexMap<&'a str, f64> = IndexMap::new();
    for rel in graph.outgoing(id) {
        if !graph.contains_element(&rel.target) {
            continue;
        }
        let weight = weights.weight(rel.rel_type);
        let entry = links.entry(rel.target.as_str()).or_insert(weight);
        *entry = entry.max(weight);
    }
    links
}

/// One Brandes pass: BFS from `source`, then push dependencies back along
/// shortest-path predecessors.
fn accumulate_betweenness(
    source: usize,
    adjacency: &[Vec<usize>],
    scores: &mut IndexMap<(usize, usize), f64>,
) {
    let n = adjacency.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut paths = vec![0.0_f64; n];
    let mut distance: Vec<Option<usize>> = vec![None; n];
    paths[source] = 1.0;
    distance[source] = Some(0);

    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        order.push(v);
        let next = distance[v].map_or(0, |d| d + 1);
        for &w in &adjacency[v] {
            if distance[w].is_none() {
                distance[w] = Some(next);
                queue.push_back(w);
            }
            if distance[w] == Some(next) {
                paths[w] += paths[v];
                predecessors[w].push(v);
            }
        }
    }

    let mut dependency = vec![0.0_f64; n];
    while let Some(w) = order.pop() {
        for &v in &predecessors[w] {
            let share = paths[v] / paths[w] * (1.0 + dependency[w]);
            *scores.entry((v, w)).or_insert(0.0) += share;
            dependency[v] += share;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchGraph;
    use approx::assert_relative_eq;
    use archgraph_core::{ElementType, Relationship, RelationshipType};

    fn graph() -> ArchGraph {
        let mut graph = ArchGraph::new();
        graph
            .add_element(Element::with_id("a", ElementType::BusinessActor, "Sales Clerk"))
            .unwrap();
        graph
            .add_element(Element::with_id("p", ElementType::BusinessProcess, "Sales Order Intake"))
            .unwrap();
        graph
            .add_element(Element::with_id("c", ElementType::ApplicationComponent, "CRM"))
            .unwrap();
        graph
            .add_relationship(Relationship::with_id("r1", "a", "p", RelationshipType::Assignment))
            .unwrap();
        graph
            .add_relationship(Relationship::with_id("r2", "c", "p", RelationshipType::Serving))
            .unwrap();
        graph
    }

    #[test]
    fn centrality_counts_both_directions() {
        let graph = graph();
        assert_eq!(graph.relationship_counts("p"), (2, 0));
        assert_eq!(graph.degree_centrality("p"), 1.0);
        assert_eq!(graph.degree_centrality("a"), 0.5);
        assert_eq!(graph.degree_centrality("nope"), 0.0);
    }

    #[test]
    fn search_matches_all_words() {
        let graph = graph();
        let hits: Vec<_> = graph.search_elements("sales order").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(hits, vec!["p"]);
        assert_eq!(graph.search_elements("SALES").len(), 2);
        assert!(graph.search_elements("s").is_empty());
    }

    fn weighted_graph() -> ArchGraph {
        let mut graph = ArchGraph::new();
        for (id, element_type) in [
            ("s", ElementType::ApplicationComponent),
            ("a", ElementType::ApplicationService),
            ("b", ElementType::ApplicationFunction),
            ("t", ElementType::BusinessProcess),
        ] {
            graph
                .add_element(Element::with_id(id, element_type, id.to_uppercase()))
                .unwrap();
        }
        for (id, source, target, rel_type) in [
            ("r1", "s", "a", RelationshipType::Serving),
            ("r2", "s", "a", RelationshipType::Association),
            ("r3", "a", "t", RelationshipType::Realization),
            ("r4", "s", "b", RelationshipType::Influence),
            ("r5", "b", "t", RelationshipType::Assignment),
            ("r6", "s", "t", RelationshipType::Access),
            ("r7", "t", "s", RelationshipType::Triggering),
        ] {
            graph
                .add_relationship(Relationship::with_id(id, source, target, rel_type))
                .unwrap();
        }
        graph
    }

    fn path_ids(paths: &[CriticalPath]) -> Vec<Vec<&str>> {
        paths
            .iter()
            .map(|p| p.elements.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn critical_paths_rank_by_mean_hop_weight() {
        let graph = weighted_graph();
        let paths = graph.critical_paths("s", "t", DEFAULT_PATH_CUTOFF, &ImpactConfig::default());

        assert_eq!(
            path_ids(&paths),
            vec![vec!["s", "a", "t"], vec!["s", "b", "t"], vec!["s", "t"]]
        );
        assert_relative_eq!(paths[0].score, (0.7 + 0.9) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(paths[1].score, (0.8 + 0.75) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(paths[2].score, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn critical_paths_respect_cutoff_and_endpoints() {
        let graph = weighted_graph();
        let config = ImpactConfig::default();

        assert_eq!(path_ids(&graph.critical_paths("s", "t", 1, &config)), vec![vec!["s", "t"]]);
        assert!(graph.critical_paths("s", "t", 0, &config).is_empty());
        assert!(graph.critical_paths("s", "s", 5, &config).is_empty());
        assert!(graph.critical_paths("s", "ghost", 5, &config).is_empty());

        let reweighted = ImpactConfig::default().with_weight(RelationshipType::Access, 1.0);
        let paths = graph.critical_paths("s", "t", 5, &reweighted);
        assert_eq!(paths[0].elements, vec!["s", "t"]);
    }

    #[test]
    fn critical_paths_keep_the_top_ten() {
        let mut graph = ArchGraph::new();
        for id in ["s", "t", "m1", "m2", "m3", "m4"] {
            graph
                .add_element(Element::with_id(id, ElementType::Node, id))
                .unwrap();
        }
        let mids = ["m1", "m2", "m3", "m4"];
        let mut n = 0;
        for from in std::iter::once("s").chain(mids) {
            for to in mids.iter().copied().chain(std::iter::once("t")) {
                if from != to {
                    n += 1;
                    graph
                        .add_relationship(Relationship::with_id(
                            format!("r{}", n),
                            from,
                            to,
                            RelationshipType::Flow,
                        ))
                        .unwrap();
                }
            }
        }

        let paths = graph.critical_paths("s", "t", DEFAULT_PATH_CUTOFF, &ImpactConfig::default());
        assert_eq!(paths.len(), CRITICAL_PATH_LIMIT);
        for path in &paths {
            assert_eq!(path.elements.first().map(String::as_str), Some("s"));
            assert_eq!(path.elements.last().map(String::as_str), Some("t"));
            assert!(path.elements.len() - 1 <= DEFAULT_PATH_CUTOFF);
        }
    }

    #[test]
    fn layer_connectivity_counts_links_between_layers() {
        let mut graph = graph();
        graph
            .add_relationship(Relationship::with_id("dangling", "c", "gone", RelationshipType::Flow))
            .unwrap();
        let connectivity = graph.layer_connectivity();

        assert_eq!(connectivity[&Layer::Business][&Layer::Business], 1);
        assert_eq!(connectivity[&Layer::Application][&Layer::Business], 1);
        assert!(!connectivity[&Layer::Application].contains_key(&Layer::Application));
        assert_eq!(connectivity.values().flat_map(|m| m.values()).sum::<usize>(), 2);
    }

    #[test]
    fn density_counts_distinct_links() {
        let mut graph = graph();
        assert_relative_eq!(graph.density(), 2.0 / 6.0, epsilon = 1e-12);

        graph
            .add_relationship(Relationship::with_id("r3", "a", "p", RelationshipType::Association))
            .unwrap();
        assert_relative_eq!(graph.density(), 2.0 / 6.0, epsilon = 1e-12);
        assert_eq!(ArchGraph::new().density(), 0.0);
    }

    #[test]
    fn bottlenecks_rank_the_shared_link_first() {
        let mut graph = ArchGraph::new();
        for id in ["a", "b", "hub", "c"] {
            graph
                .add_element(Element::with_id(id, ElementType::Node, id))
                .unwrap();
        }
        for (id, source, target) in [("r1", "a", "hub"), ("r2", "b", "hub"), ("r3", "hub", "c")] {
            graph
                .add_relationship(Relationship::with_id(id, source, target, RelationshipType::Serving))
                .unwrap();
        }

        let ranked = graph.bottlenecks();
        assert_eq!(ranked.len(), 3);
        assert_eq!((ranked[0].source.as_str(), ranked[0].target.as_str()), ("hub", "c"));
        assert_relative_eq!(ranked[0].betweenness, 3.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(ranked[1].betweenness, 2.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(ranked[2].betweenness, 2.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn type_filter() {
        let graph = graph();
        let actors: Vec<_> = graph
            .elements_of_type(ElementType::BusinessActor)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(actors, vec!["a"]);
        assert!(graph.elements_of_type(ElementType::Node).is_empty());
    }

    #[test]
    fn layer_filter() {
        let graph = graph();
        assert_eq!(graph.elements_in_layer(Layer::Business).len(), 2);
        assert!(graph.elements_in_layer(Layer::Technology).is_empty());
    }
}
