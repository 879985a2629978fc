use crate::{ArchGraphError, ElementId, ElementType, Layer, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Generates an identifier in the `<prefix>-<uuid>` form used by exported models.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// A typed node in the architecture graph.
///
/// Only `documentation` and `attributes` change after creation; type and name
/// are fixed for the lifetime of the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub element_type: ElementType,
    pub name: String,
    pub documentation: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl Element {
    pub fn new<S: Into<String>>(element_type: ElementType, name: S) -> Self {
        Self::with_id(generate_id("id"), element_type, name)
    }

    pub fn with_id<I: Into<ElementId>, S: Into<String>>(
        id: I,
        element_type: ElementType,
        name: S,
    ) -> Self {
        Self {
            id: id.into(),
            element_type,
            name: name.into(),
            documentation: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_documentation<S: Into<String>>(mut self, documentation: S) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn layer(&self) -> Layer {
        self.element_type.layer()
    }

    pub fn folder(&self) -> Option<&'static str> {
        self.layer().folder_name()
    }

    /// Unclassifiable elements have no folder and are removed by cleanup.
    pub fn is_classified(&self) -> bool {
        self.folder().is_some()
    }

    /// Checks the invariants an element must satisfy before entering a graph.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ArchGraphError::InvalidElement(format!(
                "{} '{}' has an empty id",
                self.element_type, self.name
            )));
        }
        if self.name.trim().is_empty() {
            return Err(ArchGraphError::InvalidElement(format!(
                "{} {} has an empty name",
                self.element_type, self.id
            )));
        }
        Ok(())
    }
}
