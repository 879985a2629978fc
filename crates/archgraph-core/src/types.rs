use crate::ArchGraphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type ElementId = String;
pub type RelationshipId = String;

/// Namespace prefix carried by type tags in exported models.
pub const TAG_NAMESPACE: &str = "archimate";

/// Closed element taxonomy.
///
/// Raw boundary tags (`"archimate:BusinessActor"`, `"businessactor"`) are
/// normalized once through [`FromStr`]; everything past ingestion matches on
/// the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementType {
    // Strategy
    Capability,
    CourseOfAction,
    ValueStream,
    Resource,
    // Motivation
    Stakeholder,
    Driver,
    Assessment,
    Goal,
    Outcome,
    Principle,
    Requirement,
    Constraint,
    Meaning,
    Value,
    // Business
    BusinessActor,
    BusinessRole,
    BusinessCollaboration,
    BusinessInterface,
    BusinessProcess,
    BusinessFunction,
    BusinessInteraction,
    BusinessEvent,
    BusinessService,
    BusinessObject,
    BusinessContract,
    BusinessRepresentation,
    Product,
    // Application
    ApplicationComponent,
    ApplicationCollaboration,
    ApplicationInterface,
    ApplicationFunction,
    ApplicationProcess,
    ApplicationInteraction,
    ApplicationEvent,
    ApplicationService,
    DataObject,
    // Technology & Physical
    Node,
    Device,
    SystemSoftware,
    TechnologyInterface,
    TechnologyService,
    Artifact,
    // Implementation & Migration
    WorkPackage,
    Deliverable,
    Plateau,
    // Connectors and groupings, not filed under any layer
    Location,
    Grouping,
    Junction,
}

impl ElementType {
    pub const ALL: [ElementType; 48] = [
        ElementType::Capability,
        ElementType::CourseOfAction,
        ElementType::ValueStream,
        ElementType::Resource,
        ElementType::Stakeholder,
        ElementType::Driver,
        ElementType::Assessment,
        ElementType::Goal,
        ElementType::Outcome,
        ElementType::Principle,
        ElementType::Requirement,
        ElementType::Constraint,
        ElementType::Meaning,
        ElementType::Value,
        ElementType::BusinessActor,
        ElementType::BusinessRole,
        ElementType::BusinessCollaboration,
        ElementType::BusinessInterface,
        ElementType::BusinessProcess,
        ElementType::BusinessFunction,
        ElementType::BusinessInteraction,
        ElementType::BusinessEvent,
        ElementType::BusinessService,
        ElementType::BusinessObject,
        ElementType::BusinessContract,
        ElementType::BusinessRepresentation,
        ElementType::Product,
        ElementType::ApplicationComponent,
        ElementType::ApplicationCollaboration,
        ElementType::ApplicationInterface,
        ElementType::ApplicationFunction,
        ElementType::ApplicationProcess,
        ElementType::ApplicationInteraction,
        ElementType::ApplicationEvent,
        ElementType::ApplicationService,
        ElementType::DataObject,
        ElementType::Node,
        ElementType::Device,
        ElementType::SystemSoftware,
        ElementType::TechnologyInterface,
        ElementType::TechnologyService,
        ElementType::Artifact,
        ElementType::WorkPackage,
        ElementType::Deliverable,
        ElementType::Plateau,
        ElementType::Location,
        ElementType::Grouping,
        ElementType::Junction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Capability => "Capability",
            ElementType::CourseOfAction => "CourseOfAction",
            ElementType::ValueStream => "ValueStream",
            ElementType::Resource => "Resource",
            ElementType::Stakeholder => "Stakeholder",
            ElementType::Driver => "Driver",
            ElementType::Assessment => "Assessment",
            ElementType::Goal => "Goal",
            ElementType::Outcome => "Outcome",
            ElementType::Principle => "Principle",
            ElementType::Requirement => "Requirement",
            ElementType::Constraint => "Constraint",
            ElementType::Meaning => "Meaning",
            ElementType::Value => "Value",
            ElementType::BusinessActor => "BusinessActor",
            ElementType::BusinessRole => "BusinessRole",
            ElementType::BusinessCollaboration => "BusinessCollaboration",
            ElementType::BusinessInterface => "BusinessInterface",
            ElementType::BusinessProcess => "BusinessProcess",
            ElementType::BusinessFunction => "BusinessFunction",
            ElementType::BusinessInteraction => "BusinessInteraction",
            ElementType::BusinessEvent => "BusinessEvent",
            ElementType::BusinessService => "BusinessService",
            ElementType::BusinessObject => "BusinessObject",
            ElementType::BusinessContract => "BusinessContract",
            ElementType::BusinessRepresentation => "BusinessRepresentation",
            ElementType::Product => "Product",
            ElementType::ApplicationComponent => "ApplicationComponent",
            ElementType::ApplicationCollaboration => "ApplicationCollaboration",
            ElementType::ApplicationInterface => "ApplicationInterface",
            ElementType::ApplicationFunction => "ApplicationFunction",
            ElementType::ApplicationProcess => "ApplicationProcess",
            ElementType::ApplicationInteraction => "ApplicationInteraction",
            ElementType::ApplicationEvent => "ApplicationEvent",
            ElementType::ApplicationService => "ApplicationService",
            ElementType::DataObject => "DataObject",
            ElementType::Node => "Node",
            ElementType::Device => "Device",
            ElementType::SystemSoftware => "SystemSoftware",
            ElementType::TechnologyInterface => "TechnologyInterface",
            ElementType::TechnologyService => "TechnologyService",
            ElementType::Artifact => "Artifact",
            ElementType::WorkPackage => "WorkPackage",
            ElementType::Deliverable => "Deliverable",
            ElementType::Plateau => "Plateau",
            ElementType::Location => "Location",
            ElementType::Grouping => "Grouping",
            ElementType::Junction => "Junction",
        }
    }

    pub fn layer(&self) -> Layer {
        use ElementType::*;
        match self {
            Capability | CourseOfAction | ValueStream | Resource => Layer::Strategy,
            Stakeholder | Driver | Assessment | Goal | Outcome | Principle | Requirement
            | Constraint | Meaning | Value => Layer::Motivation,
            BusinessActor | BusinessRole | BusinessCollaboration | BusinessInterface
            | BusinessProcess | BusinessFunction | BusinessInteraction | BusinessEvent
            | BusinessService | BusinessObject | BusinessContract | BusinessRepresentation
            | Product => Layer::Business,
            ApplicationComponent | ApplicationCollaboration | ApplicationInterface
            | ApplicationFunction | ApplicationProcess | ApplicationInteraction
            | ApplicationEvent | ApplicationService | DataObject => Layer::Application,
            Node | Device | SystemSoftware | TechnologyInterface | TechnologyService
            | Artifact => Layer::Technology,
            WorkPackage | Deliverable | Plateau => Layer::Implementation,
            Location | Grouping | Junction => Layer::Other,
        }
    }

    /// Tag in the exported form, e.g. `archimate:BusinessActor`.
    pub fn qualified_tag(&self) -> String {
        format!("{}:{}", TAG_NAMESPACE, self.as_str())
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ArchGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = strip_namespace(s);
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(short))
            .ok_or_else(|| ArchGraphError::UnknownType {
                kind: "element",
                tag: s.to_string(),
            })
    }
}

impl TryFrom<String> for ElementType {
    type Error = ArchGraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementType> for String {
    fn from(value: ElementType) -> Self {
        value.as_str().to_string()
    }
}

/// Closed relationship taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RelationshipType {
    Association,
    Influence,
    Serving,
    UsedBy,
    Access,
    Flow,
    Triggering,
    Realization,
    Assignment,
    Specialization,
    Composition,
    Aggregation,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 12] = [
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

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Association => "Association",
            RelationshipType::Influence => "Influence",
            RelationshipType::Serving => "Serving",
            RelationshipType::UsedBy => "UsedBy",
            RelationshipType::Access => "Access",
            RelationshipType::Flow => "Flow",
            RelationshipType::Triggering => "Triggering",
            RelationshipType::Realization => "Realization",
            RelationshipType::Assignment => "Assignment",
            RelationshipType::Specialization => "Specialization",
            RelationshipType::Composition => "Composition",
            RelationshipType::Aggregation => "Aggregation",
        }
    }

    /// Tag in the exported form, e.g. `archimate:ServingRelationship`.
    pub fn qualified_tag(&self) -> String {
        format!("{}:{}Relationship", TAG_NAMESPACE, self.as_str())
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = ArchGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let short = strip_namespace(s);
        let short = match short.len().checked_sub("relationship".len()) {
            Some(cut)
                if cut > 0
                    && short.is_char_boundary(cut)
                    && short[cut..].eq_ignore_ascii_case("relationship") =>
            {
                &short[..cut]
            }
            _ => short,
        };
        RelationshipType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(short))
            .ok_or_else(|| ArchGraphError::UnknownType {
                kind: "relationship",
                tag: s.to_string(),
            })
    }
}

impl TryFrom<String> for RelationshipType {
    type Error = ArchGraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RelationshipType> for String {
    fn from(value: RelationshipType) -> Self {
        value.as_str().to_string()
    }
}

/// Architecture layer, derived from [`ElementType::layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Strategy,
    Motivation,
    Business,
    Application,
    Technology,
    Implementation,
    Other,
}

impl Layer {
    /// Folder an element of this layer is filed under. `None` means unclassifiable.
    pub fn folder_name(&self) -> Option<&'static str> {
        match self {
            Layer::Strategy => Some("Strategy"),
            Layer::Motivation => Some("Motivation"),
            Layer::Business => Some("Business"),
            Layer::Application => Some("Application"),
            Layer::Technology => Some("Technology & Physical"),
            Layer::Implementation => Some("Implementation & Migration"),
            Layer::Other => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Layer::Strategy => "Strategy",
            Layer::Motivation => "Motivation",
            Layer::Business => "Business",
            Layer::Application => "Application",
            Layer::Technology => "Technology",
            Layer::Implementation => "Implementation",
            Layer::Other => "Other",
        };
        write!(f, "{}", s)
    }
}

/// Which end of a relationship a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Source,
    Target,
    Both,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Endpoint::Source => "source",
            Endpoint::Target => "target",
            Endpoint::Both => "source and target",
        };
        write!(f, "{}", s)
    }
}

fn strip_namespace(tag: &str) -> &str {
    let tag = tag.trim();
    match tag.rsplit_once(':') {
        Some((_, short)) => short.trim(),
        None => tag,
    }
}
