//! Full validate-and-clean pass: tidy, validate, commit, repair.

use crate::repair::{RepairActionKind, RepairReport, Repairer};
use crate::validator::{ValidationReport, Validator};
use archgraph_core::{CompatibilityRules, ElementRecord, GraphStore};
use serde::Serialize;
use std::fmt;
use tracing::{info, info_span};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub removed_elements: Vec<ElementRecord>,
    pub validation: ValidationReport,
    pub repair: RepairReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupSummary {
    pub removed_elements: usize,
    pub orphaned: usize,
    pub duplicates: usize,
    pub incompatible: usize,
    pub reversed: usize,
    pub retyped: usize,
    pub reversed_and_retyped: usize,
    pub removed_unfixable: usize,
}

impl CleanupReport {
    pub fn summary(&self) -> CleanupSummary {
        CleanupSummary {
            removed_elements: self.removed_elements.len(),
            orphaned: self.validation.orphaned.len(),
            duplicates: self.validation.duplicates.len(),
            incompatible: self.validation.incompatible.len(),
            reversed: self.repair.count(RepairActionKind::Reversed),
            retyped: self.repair.count(RepairActionKind::Retyped),
            reversed_and_retyped: self.repair.count(RepairActionKind::ReversedAndRetyped),
            removed_unfixable: self.repair.count(RepairActionKind::Removed),
        }
    }

    /// True when the pass found nothing to change.
    pub fn is_clean(&self) -> bool {
        self.removed_elements.is_empty() && self.validation.is_clean()
    }
}

impl fmt::Display for CleanupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unclassified elements removed: {}", self.removed_elements)?;
        writeln!(f, "Orphaned relationships removed: {}", self.orphaned)?;
        writeln!(f, "Duplicate relationships removed: {}", self.duplicates)?;
        writeln!(f, "Incompatible relationships: {}", self.incompatible)?;
        writeln!(f, "  reversed: {}", self.reversed)?;
        writeln!(f, "  retyped: {}", self.retyped)?;
        writeln!(f, "  reversed and retyped: {}", self.reversed_and_retyped)?;
        write!(f, "  removed: {}", self.removed_unfixable)
    }
}

/// Removes elements that belong to no layer folder. Their relationships are
/// left in place for the orphan pass.
pub fn tidy_unclassified<G: GraphStore + ?Sized>(graph: &mut G) -> Vec<ElementRecord> {
    let doomed: Vec<String> = graph
        .elements()
        .filter(|e| !e.is_classified())
        .map(|e| e.id.clone())
        .collect();

    doomed
        .iter()
        .filter_map(|id| graph.remove_element(id))
        .map(|element| {
            info!(
                "Removed unclassifiable {} '{}' ({})",
                element.element_type, element.name, element.id
            );
            ElementRecord::from(&element)
        })
        .collect()
}

/// Runs the whole pipeline. Afterwards a fresh validation reports nothing.
pub fn cleanup<G: GraphStore + ?Sized>(graph: &mut G, rules: &CompatibilityRules) -> CleanupReport {
    let _span = info_span!("cleanup").entered();

    let removed_elements = tidy_unclassified(graph);
    let validation = Validator::new(rules).validate(&*graph);
    Validator::commit(graph, &validation);
    let repair = Repairer::new(rules).repair(graph, &validation.incompatible);

    let report = CleanupReport {
        removed_elements,
        validation,
        repair,
    };
    info!("Cleanup finished:\n{}", report.summary());
    report
}
