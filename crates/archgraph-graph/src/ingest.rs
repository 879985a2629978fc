//! Boundary conversion between plain records and the typed graph.

use crate::ArchGraph;
use archgraph_core::{
    Element, ElementRecord, GraphStore, Relationship, RelationshipRecord, Result,
};
use serde::Serialize;
use tracing::{info, info_span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Element,
    Relationship,
}

/// A record that could not be ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestFailure {
    pub kind: RecordKind,
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub elements_added: usize,
    pub relationships_added: usize,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ArchGraph {
    pub fn from_records(
        elements: &[ElementRecord],
        relationships: &[RelationshipRecord],
    ) -> (Self, IngestReport) {
        let mut graph = Self::new();
        let report = graph.ingest(elements, relationships);
        (graph, report)
    }

    /// Adds records to the graph, elements first. Bad records are reported
    /// and skipped; relationships may still reference missing elements.
    pub fn ingest(
        &mut self,
        elements: &[ElementRecord],
        relationships: &[RelationshipRecord],
    ) -> IngestReport {
        let _span = info_span!("ingest", elements = elements.len(), relationships = relationships.len())
            .entered();
        let mut report = IngestReport::default();

        for record in elements {
            match Element::try_from(record).and_then(|e| self.add_element(e)) {
                Ok(()) => report.elements_added += 1,
                Err(e) => {
                    warn!("Skipping element {}: {}", record.id, e);
                    report.failures.push(IngestFailure {
                        kind: RecordKind::Element,
                        id: record.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        for record in relationships {
            let added: Result<()> =
                Relationship::try_from(record).and_then(|r| self.add_relationship(r));
            match added {
                Ok(()) => report.relationships_added += 1,
                Err(e) => {
                    warn!("Skipping relationship {}: {}", record.id, e);
                    report.failures.push(IngestFailure {
                        kind: RecordKind::Relationship,
                        id: record.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Ingested {} elements and {} relationships ({} rejected)",
            report.elements_added,
            report.relationships_added,
            report.failures.len()
        );
        report
    }

    pub fn element_records(&self) -> Vec<ElementRecord> {
        self.elements().map(ElementRecord::from).collect()
    }

    pub fn relationship_records(&self) -> Vec<RelationshipRecord> {
        self.relationships().map(RelationshipRecord::from).collect()
    }
}
