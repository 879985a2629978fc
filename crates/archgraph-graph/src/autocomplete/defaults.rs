//! Built-in autocomplete rules.

use super::rule::{Action, AutocompleteRule, Condition};
use archgraph_core::ElementType::{self, *};
use archgraph_core::RelationshipType::{self, *};

fn missing(types: &[RelationshipType]) -> Condition {
    Condition::NoRelationshipOfType {
        types: types.to_vec(),
    }
}

fn similarity(threshold: f64) -> Condition {
    Condition::NameSimilarity { threshold }
}

fn direct(rel_type: RelationshipType) -> Action {
    Action::DirectRelationship { rel_type }
}

fn interface(element_type: ElementType) -> Action {
    Action::InsertIntermediary {
        element_type,
        name_template: "{target_name} Interface".to_string(),
        to_target: Assignment,
        to_source: Serving,
    }
}

pub fn archimate_rules() -> Vec<AutocompleteRule> {
    vec![
        // Motivation to business
        AutocompleteRule::new(
            "Connect Goals to Business Capabilities that realize them",
            [Capability],
            [Goal],
            direct(Realization),
        )
        .with_condition(missing(&[Realization, Influence])),
        AutocompleteRule::new(
            "Connect Requirements to Business Services that fulfill them",
            [BusinessService],
            [Requirement],
            direct(Realization),
        )
        .with_condition(missing(&[Realization])),
        AutocompleteRule::new(
            "Connect Drivers to Business Processes they influence",
            [Driver],
            [BusinessProcess],
            direct(Influence),
        )
        .with_condition(missing(&[Influence])),
        // Business to application
        AutocompleteRule::new(
            "Connect Business Services to Application Services that realize them",
            [ApplicationService],
            [BusinessService],
            direct(Realization),
        )
        .with_condition(missing(&[Realization]))
        .with_condition(similarity(0.6)),
        AutocompleteRule::new(
            "Connect Business Processes to Application Services that support them",
            [ApplicationService],
            [BusinessProcess],
            direct(Serving),
        )
        .with_condition(missing(&[Serving]))
        .with_condition(similarity(0.5)),
        AutocompleteRule::new(
            "Connect Business Objects to Data Objects that implement them",
            [DataObject],
            [BusinessObject],
            direct(Realization),
        )
        .with_condition(missing(&[Realization]))
        .with_condition(similarity(0.7)),
        // Application to technology
        AutocompleteRule::new(
            "Connect Application Components to Nodes that host them",
            [Node],
            [ApplicationComponent],
            direct(Assignment),
        )
        .with_condition(missing(&[Assignment]))
        .with_condition(similarity(0.4)),
        AutocompleteRule::new(
            "Connect Application Services to Technology Services that enable them",
            [TechnologyService],
            [ApplicationService],
            direct(Serving),
        )
        .with_condition(missing(&[Serving]))
        .with_condition(similarity(0.5)),
        AutocompleteRule::new(
            "Connect Data Objects to Artifacts that store them",
            [Artifact],
            [DataObject],
            direct(Realization),
        )
        .with_condition(missing(&[Realization]))
        .with_condition(similarity(0.6)),
        // Cross-layer interfaces
        AutocompleteRule::new(
            "Add Application Interface between Business Actors and Application Services",
            [BusinessActor, BusinessRole],
            [ApplicationService],
            interface(ApplicationInterface),
        )
        .with_condition(missing(&[Serving, UsedBy]))
        .with_condition(Condition::TargetNameContains {
            keywords: ["api", "portal", "gateway", "service", "interface"]
                .map(String::from)
                .to_vec(),
        }),
        AutocompleteRule::new(
            "Add Technology Interface between Application Components and Technology Services",
            [ApplicationComponent],
            [TechnologyService],
            interface(TechnologyInterface),
        )
        .with_condition(missing(&[Serving]))
        .with_condition(Condition::TargetNameContains {
            keywords: ["api", "service", "interface", "gateway"]
                .map(String::from)
                .to_vec(),
        }),
        // Value streams and capabilities
        AutocompleteRule::new(
            "Connect Capabilities to Value Streams they enable",
            [Capability],
            [ValueStream],
            direct(Realization),
        )
        .with_condition(missing(&[Realization])),
        AutocompleteRule::new(
            "Connect Value Streams to Business Processes that implement them",
            [BusinessProcess],
            [ValueStream],
            direct(Realization),
        )
        .with_condition(missing(&[Realization]))
        .with_condition(similarity(0.6)),
        // Decomposition
        AutocompleteRule::new(
            "Compose Business Processes from sub-processes",
            [BusinessProcess],
            [BusinessProcess],
            direct(Composition),
        )
        .with_condition(missing(&[Composition, Aggregation]))
        .with_condition(Condition::TargetNameIsPartOfSource),
        AutocompleteRule::new(
            "Compose Application Components from sub-components",
            [ApplicationComponent],
            [ApplicationComponent],
            direct(Composition),
        )
        .with_condition(missing(&[Composition, Aggregation]))
        .with_condition(Condition::TargetNameIsPartOfSource),
    ]
}
