//! Weighted, decayed impact propagation from seed elements.

use archgraph_core::{
    ArchGraphError, ElementId, GraphStore, ImpactConfig, Layer, Relationship, Result,
};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info_span};

/// Normalized scores for every element of the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactResult {
    scores: IndexMap<ElementId, f64>,
    seeds: IndexSet<ElementId>,
    reached: usize,
}

impl ImpactResult {
    /// Score of `id`, `0.0` for elements that were not reached or do not exist.
    pub fn score(&self, id: &str) -> f64 {
        self.scores.get(id).copied().unwrap_or(0.0)
    }

    pub fn scores(&self) -> &IndexMap<ElementId, f64> {
        &self.scores
    }

    pub fn is_seed(&self, id: &str) -> bool {
        self.seeds.contains(id)
    }

    /// Non-seed elements that received a non-zero score.
    pub fn reached(&self) -> usize {
        self.reached
    }

    /// Non-seed elements scoring above `threshold`, strongest first, ties by id.
    pub fn impacted(&self, threshold: f64) -> Vec<(&str, f64)> {
        let mut hits: Vec<(&str, f64)> = self
            .scores
            .iter()
            .filter(|(id, score)| **score > threshold && !self.seeds.contains(*id))
            .map(|(id, score)| (id.as_str(), *score))
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hits
    }

    /// Mean score per layer over the impacted (non-seed, non-zero) elements.
    pub fn layer_summary<G: GraphStore + ?Sized>(&self, graph: &G) -> BTreeMap<Layer, f64> {
        let mut sums: BTreeMap<Layer, (f64, usize)> = BTreeMap::new();
        for (id, score) in self.impacted(0.0) {
            if let Some(element) = graph.element(id) {
                let entry = sums.entry(element.layer()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(layer, (sum, n))| (layer, sum / n as f64))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImpactPropagator {
    config: ImpactConfig,
}

impl ImpactPropagator {
    pub fn new(config: ImpactConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Spreads impact from `seeds` breadth-first. Each node keeps the
    /// strongest single-path value it receives; scores are then scaled so the
    /// maximum is `1.0`. Unknown seed ids contribute nothing.
    pub fn propagate<G, I, S>(&self, graph: &G, seeds: I) -> Result<ImpactResult>
    where
        G: GraphStore + ?Sized,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: Vec<S> = seeds.into_iter().collect();
        if requested.is_empty() {
            return Err(ArchGraphError::InvalidOperation(
                "impact propagation needs at least one seed".to_string(),
            ));
        }
        let _span = info_span!("impact", seeds = requested.len()).entered();

        let mut scores: IndexMap<ElementId, f64> =
            graph.elements().map(|e| (e.id.clone(), 0.0)).collect();
        let mut seed_ids = IndexSet::new();
        let mut queue: VecDeque<(ElementId, f64, usize)> = VecDeque::new();

        for seed in &requested {
            let id = seed.as_ref();
            match scores.get_mut(id) {
                Some(score) => {
                    if seed_ids.insert(id.to_string()) {
                        *score = 1.0;
                        queue.push_back((id.to_string(), 1.0, 0));
                    }
                }
                None => debug!("Ignoring unknown seed {}", id),
            }
        }

        let cfg = &self.config;
        while let Some((node, strength, hop)) = queue.pop_front() {
            if hop >= cfg.max_hops {
                continue;
            }
            let outgoing = graph.outgoing(&node).into_iter().map(|r| (r, &r.target, 1.0));
            let incoming = graph
                .incoming(&node)
                .into_iter()
                .map(|r| (r, &r.source, cfg.inbound_factor));

            for (rel, other, factor) in outgoing.chain(incoming) {
                let propagated = strength * self.weight(rel) * cfg.decay * factor;
                let Some(current) = scores.get_mut(other.as_str()) else {
                    continue;
                };
                if propagated > cfg.epsilon && propagated > *current {
                    *current = propagated;
                    queue.push_back((other.clone(), propagated, hop + 1));
                }
            }
        }

        let reached = scores
            .iter()
            .filter(|(id, score)| **score > 0.0 && !seed_ids.contains(*id))
            .count();
        if reached > 0 {
            let max = scores.values().copied().fold(0.0_f64, f64::max);
            if max > 0.0 {
                scores.values_mut().for_each(|s| *s /= max);
            }
        }
        debug!("Impact reached {} elements from {} seeds", reached, seed_ids.len());

        Ok(ImpactResult {
            scores,
            seeds: seed_ids,
            reached,
        })
    }

    fn weight(&self, rel: &Relationship) -> f64 {
        self.config.weight(rel.rel_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchGraph;
    use approx::assert_relative_eq;
    use archgraph_core::{Element, ElementType, RelationshipType};

    fn chain() -> ArchGraph {
        let mut graph = ArchGraph::new();
        for (id, t) in [
            ("a", ElementType::BusinessActor),
            ("b", ElementType::BusinessProcess),
            ("c", ElementType::ApplicationComponent),
        ] {
            graph.add_element(Element::with_id(id, t, id.to_uppercase())).unwrap();
        }
        graph
            .add_relationship(Relationship::with_id("r1", "a", "b", RelationshipType::Serving))
            .unwrap();
        graph
            .add_relationship(Relationship::with_id("r2", "c", "b", RelationshipType::Serving))
            .unwrap();
        graph
    }

    #[test]
    fn inbound_edges_are_weaker() {
        let graph = chain();
        let result = ImpactPropagator::default().propagate(&graph, ["b"]).unwrap();
        // b <- a and b <- c are both walked against their direction.
        assert_relative_eq!(result.score("a"), 0.7 * 0.8 * 0.5);
        assert_relative_eq!(result.score("c"), 0.7 * 0.8 * 0.5);
        assert_relative_eq!(result.score("b"), 1.0);
    }

    #[test]
    fn empty_seed_set_is_rejected() {
        let graph = chain();
        let seeds: Vec<&str> = Vec::new();
        assert!(matches!(
            ImpactPropagator::default().propagate(&graph, seeds),
            Err(ArchGraphError::InvalidOperation(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ImpactConfig {
            decay: 0.0,
            ..ImpactConfig::default()
        };
        assert!(matches!(
            ImpactPropagator::new(config),
            Err(ArchGraphError::Config(_))
        ));
    }
}
