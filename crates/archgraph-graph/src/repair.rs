//! Fixes incompatible relationships by reversing or retyping them, and
//! deletes the ones no single change can make legal.

use crate::store::describe;
use crate::validator::ValidationIssue;
use archgraph_core::{
    CompatibilityRules, ElementType, GraphStore, Relationship, RelationshipKey,
    RelationshipRecord, RelationshipType,
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, info_span, warn};

/// Substitution order, least structurally binding first.
pub const REPAIR_PRIORITY: [RelationshipType; 12] = [
    RelationshipType::Association,
    RelationshipType::Influence,
    RelationshipType::Serving,
    RelationshipType::UsedBy,
    RelationshipType::Access,
    RelationshipType::Flow,
    RelationshipType::Triggering,
    RelationshipType::Realization,
    RelationshipType::Assignment,
    RelationshipType::Specialization,
    RelationshipType::Composition,
    RelationshipType::Aggregation,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RepairActionKind {
    Reversed,
    Retyped,
    ReversedAndRetyped,
    Removed,
}

impl fmt::Display for RepairActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepairActionKind::Reversed => "reversed direction",
            RepairActionKind::Retyped => "changed type",
            RepairActionKind::ReversedAndRetyped => "reversed and changed type",
            RepairActionKind::Removed => "removed unfixable",
        };
        f.write_str(s)
    }
}

/// One repair applied to one relationship. `relationship` is the state
/// before the repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairAction {
    pub relationship: RelationshipRecord,
    pub action: RepairActionKind,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub actions: Vec<RepairAction>,
}

impl RepairReport {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn count(&self, kind: RepairActionKind) -> usize {
        self.actions.iter().filter(|a| a.action == kind).count()
    }

    pub fn action_for(&self, relationship_id: &str) -> Option<&RepairAction> {
        self.actions
            .iter()
            .find(|a| a.relationship.id == relationship_id)
    }
}

enum Plan {
    Apply(RepairActionKind, RelationshipKey),
    Remove(String),
}

pub struct Repairer<'a> {
    rules: &'a CompatibilityRules,
}

impl<'a> Repairer<'a> {
    pub fn new(rules: &'a CompatibilityRules) -> Self {
        Self { rules }
    }

    /// First type in [`REPAIR_PRIORITY`] legal from `source` to `target`
    /// whose triple is not already held by another relationship.
    fn substitute<G: GraphStore + ?Sized>(
        &self,
        graph: &G,
        rel: &Relationship,
        key: &RelationshipKey,
        source: ElementType,
        target: ElementType,
    ) -> Option<RelationshipKey> {
        let valid = self.rules.valid_relationship_types(source, target);
        REPAIR_PRIORITY
            .iter()
            .filter(|t| valid.contains(*t))
            .map(|t| key.with_type(*t))
            .find(|candidate| is_free(graph, rel, candidate))
    }

    fn plan<G: GraphStore + ?Sized>(&self, graph: &G, rel: &Relationship) -> Plan {
        let (Some(source), Some(target)) = (graph.element(&rel.source), graph.element(&rel.target))
        else {
            return Plan::Remove("endpoint no longer exists".to_string());
        };
        let (st, tt) = (source.element_type, target.element_type);
        let key = rel.key();
        let reversed = key.reversed();

        if self.rules.is_allowed(tt, st, rel.rel_type) && is_free(graph, rel, &reversed) {
            return Plan::Apply(RepairActionKind::Reversed, reversed);
        }
        if let Some(retyped) = self.substitute(graph, rel, &key, st, tt) {
            return Plan::Apply(RepairActionKind::Retyped, retyped);
        }
        if let Some(both) = self.substitute(graph, rel, &reversed, tt, st) {
            return Plan::Apply(RepairActionKind::ReversedAndRetyped, both);
        }
        Plan::Remove(format!(
            "no legal relationship between {} and {} in either direction",
            st, tt
        ))
    }

    /// Repairs each relationship flagged incompatible, once, in report order.
    pub fn repair<G: GraphStore + ?Sized>(
        &self,
        graph: &mut G,
        incompatible: &[ValidationIssue],
    ) -> RepairReport {
        let _span = info_span!("repair", candidates = incompatible.len()).entered();
        let mut report = RepairReport::default();

        for issue in incompatible {
            let Some(rel) = graph.relationship(issue.relationship_id()).cloned() else {
                warn!("Relationship {} vanished before repair", issue.relationship_id());
                continue;
            };
            let before = describe(&*graph, &rel);

            let (action, description) = match self.plan(&*graph, &rel) {
                Plan::Apply(kind, key) => {
                    let after = describe(
                        &*graph,
                        &Relationship {
                            source: key.source.clone(),
                            target: key.target.clone(),
                            rel_type: key.rel_type,
                            ..rel.clone()
                        },
                    );
                    match graph.retarget_relationship(&rel.id, key.source, key.target, key.rel_type) {
                        Ok(()) => (kind, format!("{}: {} => {}", kind, before, after)),
                        Err(e) => {
                            warn!("Could not repair {}: {}", rel.id, e);
                            graph.remove_relationship(&rel.id);
                            (
                                RepairActionKind::Removed,
                                format!("{}: {} ({})", RepairActionKind::Removed, before, e),
                            )
                        }
                    }
                }
                Plan::Remove(why) => {
                    graph.remove_relationship(&rel.id);
                    (
                        RepairActionKind::Removed,
                        format!("{}: {} ({})", RepairActionKind::Removed, before, why),
                    )
                }
            };

            debug!("{}", description);
            report.actions.push(RepairAction {
                relationship: RelationshipRecord::from(&rel),
                action,
                description,
            });
        }

        info!(
            "Repair: {} reversed, {} retyped, {} reversed and retyped, {} removed",
            report.count(RepairActionKind::Reversed),
            report.count(RepairActionKind::Retyped),
            report.count(RepairActionKind::ReversedAndRetyped),
            report.count(RepairActionKind::Removed)
        );
        report
    }
}

fn is_free<G: GraphStore + ?Sized>(graph: &G, rel: &Relationship, key: &RelationshipKey) -> bool {
    graph
        .find_by_key(key)
        .map_or(true, |holder| holder.id == rel.id)
}
