//! Plain records exchanged with ingestion and persistence collaborators.
//!
//! Type tags stay raw strings here; conversion into [`Element`] and
//! [`Relationship`] is where they are normalized.

use crate::{ArchGraphError, Element, Relationship, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl ElementRecord {
    pub fn new<I, K, N>(id: I, kind: K, name: N) -> Self
    where
        I: Into<String>,
        K: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            documentation: None,
            attributes: HashMap::new(),
        }
    }
}

impl RelationshipRecord {
    pub fn new<I, K, S, T>(id: I, kind: K, source: S, target: T) -> Self
    where
        I: Into<String>,
        K: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            id: id.into(),
            kind: kind.into(),
            source: source.into(),
            target: target.into(),
            documentation: None,
        }
    }
}

impl TryFrom<&ElementRecord> for Element {
    type Error = ArchGraphError;

    fn try_from(record: &ElementRecord) -> Result<Self> {
        let element = Element {
            id: record.id.trim().to_string(),
            element_type: record.kind.parse()?,
            name: record.name.clone(),
            documentation: record.documentation.clone(),
            attributes: record.attributes.clone(),
        };
        element.validate()?;
        Ok(element)
    }
}

impl From<&Element> for ElementRecord {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            kind: element.element_type.qualified_tag(),
            name: element.name.clone(),
            documentation: element.documentation.clone(),
            attributes: element.attributes.clone(),
        }
    }
}

impl TryFrom<&RelationshipRecord> for Relationship {
    type Error = ArchGraphError;

    fn try_from(record: &RelationshipRecord) -> Result<Self> {
        if record.id.trim().is_empty() {
            return Err(ArchGraphError::InvalidOperation(format!(
                "relationship {} -> {} has an empty id",
                record.source, record.target
            )));
        }
        Ok(Relationship {
            id: record.id.trim().to_string(),
            rel_type: record.kind.parse()?,
            source: record.source.trim().to_string(),
            target: record.target.trim().to_string(),
            documentation: record.documentation.clone(),
        })
    }
}

impl From<&Relationship> for RelationshipRecord {
    fn from(rel: &Relationship) -> Self {
        Self {
            id: rel.id.clone(),
            kind: rel.rel_type.qualified_tag(),
            source: rel.source.clone(),
            target: rel.target.clone(),
            documentation: rel.documentation.clone(),
        }
    }
}
