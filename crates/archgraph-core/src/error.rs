use crate::config_manager::ConfigError;
use crate::Endpoint;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchGraphError {
    #[error("Reference error: relationship {relationship} has missing {endpoint} element {element}")]
    Reference {
        relationship: String,
        endpoint: Endpoint,
        element: String,
    },

    #[error("Duplicate relationship: {0}")]
    DuplicateRelationship(String),

    #[error("Incompatible relationship: {0}")]
    IncompatibleType(String),

    #[error("Rule configuration error: {0}")]
    RuleConfiguration(String),

    #[error("Unknown {kind} type tag: {tag:?}")]
    UnknownType { kind: &'static str, tag: String },

    #[error("Duplicate element id: {0}")]
    DuplicateElement(String),

    #[error("Invalid element: {0}")]
    InvalidElement(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ArchGraphError {
    /// Whether the error aborts a whole batch instead of being recorded per item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ArchGraphError::RuleConfiguration(_) | ArchGraphError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ArchGraphError>;
