use crate::element::generate_id;
use crate::{ElementId, RelationshipId, RelationshipType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directed, typed edge between two elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub rel_type: RelationshipType,
    pub source: ElementId,
    pub target: ElementId,
    pub documentation: Option<String>,
}

/// The `(source, target, type)` triple that must be unique across a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipKey {
    pub source: ElementId,
    pub target: ElementId,
    pub rel_type: RelationshipType,
}

impl Relationship {
    pub fn new<S: Into<ElementId>, T: Into<ElementId>>(
        source: S,
        target: T,
        rel_type: RelationshipType,
    ) -> Self {
        Self::with_id(generate_id("id"), source, target, rel_type)
    }

    pub fn with_id<I: Into<RelationshipId>, S: Into<ElementId>, T: Into<ElementId>>(
        id: I,
        source: S,
        target: T,
        rel_type: RelationshipType,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type,
            source: source.into(),
            target: target.into(),
            documentation: None,
        }
    }

    pub fn with_documentation<D: Into<String>>(mut self, documentation: D) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey {
            source: self.source.clone(),
            target: self.target.clone(),
            rel_type: self.rel_type,
        }
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} -> {})",
            self.rel_type, self.id, self.source, self.target
        )
    }
}

impl RelationshipKey {
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            rel_type: self.rel_type,
        }
    }

    pub fn with_type(&self, rel_type: RelationshipType) -> Self {
        Self {
            rel_type,
            ..self.clone()
        }
    }
}
