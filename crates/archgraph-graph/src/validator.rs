//! Orphan, duplicate and compatibility checks over a graph.

use archgraph_core::{
    ArchGraphError, CompatibilityRules, ElementId, ElementType, Endpoint, GraphStore,
    Relationship, RelationshipId, RelationshipKey, RelationshipRecord,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, info_span};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    Orphaned {
        endpoint: Endpoint,
        missing: Vec<ElementId>,
    },
    Duplicate {
        kept: RelationshipId,
    },
    Incompatible {
        source_type: ElementType,
        target_type: ElementType,
    },
}

/// A flagged relationship and why it was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub relationship: RelationshipRecord,
    pub kind: IssueKind,
    pub reason: String,
}

impl ValidationIssue {
    pub fn relationship_id(&self) -> &str {
        &self.relationship.id
    }

    pub fn to_error(&self) -> ArchGraphError {
        match &self.kind {
            IssueKind::Orphaned { endpoint, missing } => ArchGraphError::Reference {
                relationship: self.relationship.id.clone(),
                endpoint: *endpoint,
                element: missing.join(", "),
            },
            IssueKind::Duplicate { .. } => {
                ArchGraphError::DuplicateRelationship(self.reason.clone())
            }
            IssueKind::Incompatible { .. } => ArchGraphError::IncompatibleType(self.reason.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub orphaned: Vec<ValidationIssue>,
    pub duplicates: Vec<ValidationIssue>,
    pub incompatible: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned.is_empty() && self.duplicates.is_empty() && self.incompatible.is_empty()
    }

    pub fn total(&self) -> usize {
        self.orphaned.len() + self.duplicates.len() + self.incompatible.len()
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.orphaned
            .iter()
            .chain(&self.duplicates)
            .chain(&self.incompatible)
    }
}

pub struct Validator<'a> {
    rules: &'a CompatibilityRules,
}

impl<'a> Validator<'a> {
    pub fn new(rules: &'a CompatibilityRules) -> Self {
        Self { rules }
    }

    /// Classifies every relationship. Each pass only sees relationships the
    /// previous passes left unflagged; the graph itself is not touched.
    pub fn validate<G: GraphStore + ?Sized>(&self, graph: &G) -> ValidationReport {
        let _span = info_span!("validate", relationships = graph.relationship_count()).entered();
        let mut report = ValidationReport::default();

        // Orphans
        let mut live: Vec<&Relationship> = Vec::with_capacity(graph.relationship_count());
        for rel in graph.relationships() {
            let missing_source = !graph.contains_element(&rel.source);
            let missing_target = !graph.contains_element(&rel.target);
            let (endpoint, missing) = match (missing_source, missing_target) {
                (false, false) => {
                    live.push(rel);
                    continue;
                }
                (true, false) => (Endpoint::Source, vec![rel.source.clone()]),
                (false, true) => (Endpoint::Target, vec![rel.target.clone()]),
                (true, true) => (
                    Endpoint::Both,
                    vec![rel.source.clone(), rel.target.clone()],
                ),
            };
            let reason = format!("Missing {} element {}", endpoint, missing.join(", "));
            debug!("Orphaned {}: {}", rel.id, reason);
            report.orphaned.push(ValidationIssue {
                relationship: RelationshipRecord::from(rel),
                kind: IssueKind::Orphaned { endpoint, missing },
                reason,
            });
        }

        // Duplicates, first occurrence wins
        let mut seen: HashMap<RelationshipKey, &RelationshipId> = HashMap::new();
        let mut unique: Vec<&Relationship> = Vec::with_capacity(live.len());
        for rel in live {
            match seen.get(&rel.key()) {
                Some(kept) => {
                    let reason = format!(
                        "Duplicate of {} ({} -> {}, {})",
                        kept, rel.source, rel.target, rel.rel_type
                    );
                    debug!("Duplicate {}: {}", rel.id, reason);
                    report.duplicates.push(ValidationIssue {
                        relationship: RelationshipRecord::from(rel),
                        kind: IssueKind::Duplicate {
                            kept: (*kept).clone(),
                        },
                        reason,
                    });
                }
                None => {
                    seen.insert(rel.key(), &rel.id);
                    unique.push(rel);
                }
            }
        }

        // Compatibility
        for rel in unique {
            let (Some(source), Some(target)) = (graph.element(&rel.source), graph.element(&rel.target))
            else {
                continue;
            };
            if let Err(e) = self
                .rules
                .check(source.element_type, target.element_type, rel.rel_type)
            {
                let reason = format!(
                    "{} {} cannot have a {} relationship to {} {}",
                    source.element_type, source.name, rel.rel_type, target.element_type, target.name
                );
                debug!("Incompatible {}: {}", rel.id, e);
                report.incompatible.push(ValidationIssue {
                    relationship: RelationshipRecord::from(rel),
                    kind: IssueKind::Incompatible {
                        source_type: source.element_type,
                        target_type: target.element_type,
                    },
                    reason,
                });
            }
        }

        info!(
            "Validation found {} orphaned, {} duplicate, {} incompatible relationships",
            report.orphaned.len(),
            report.duplicates.len(),
            report.incompatible.len()
        );
        report
    }

    /// Deletes the orphaned and duplicate relationships named in `report`.
    /// Returns how many were removed.
    pub fn commit<G: GraphStore + ?Sized>(graph: &mut G, report: &ValidationReport) -> usize {
        let doomed: HashSet<&str> = report
            .orphaned
            .iter()
            .chain(&report.duplicates)
            .map(|issue| issue.relationship_id())
            .collect();
        let removed = doomed
            .into_iter()
            .filter(|id| graph.remove_relationship(id).is_some())
            .count();
        info!("Removed {} orphaned or duplicate relationships", removed);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchGraph;
    use archgraph_core::{Element, RelationshipType};

    #[test]
    fn orphan_pass_records_endpoint() {
        let mut graph = ArchGraph::new();
        graph
            .add_element(Element::with_id("a", ElementType::Goal, "Grow"))
            .unwrap();
        graph
            .add_relationship(Relationship::with_id("r1", "a", "x", RelationshipType::Association))
            .unwrap();
        graph
            .add_relationship(Relationship::with_id("r2", "y", "z", RelationshipType::Association))
            .unwrap();

        let rules = CompatibilityRules::archimate();
        let report = Validator::new(&rules).validate(&graph);
        assert_eq!(report.orphaned.len(), 2);
        assert!(matches!(
            &report.orphaned[0].kind,
            IssueKind::Orphaned { endpoint: Endpoint::Target, missing } if missing == &vec!["x".to_string()]
        ));
        assert!(matches!(
            report.orphaned[1].kind,
            IssueKind::Orphaned { endpoint: Endpoint::Both, .. }
        ));
        assert!(matches!(
            report.orphaned[0].to_error(),
            ArchGraphError::Reference { .. }
        ));
    }

    #[test]
    fn orphans_are_not_counted_again_as_duplicates() {
        let mut graph = ArchGraph::new();
        graph
            .add_relationship(Relationship::with_id("r1", "x", "y", RelationshipType::Flow))
            .unwrap();
        graph
            .add_relationship(Relationship::with_id("r2", "x", "y", RelationshipType::Flow))
            .unwrap();

        let rules = CompatibilityRules::archimate();
        let report = Validator::new(&rules).validate(&graph);
        assert_eq!(report.orphaned.len(), 2);
        assert!(report.duplicates.is_empty());
        assert!(report.incompatible.is_empty());
        assert_eq!(report.total(), 2);
    }
}
