// ABOUTME: Autocomplete engine runs: idempotence, intermediaries, skipped proposals.
// ABOUTME: Covers progress reporting and both cancellation paths.

use archgraph_core::{
    AutocompleteConfig, CompatibilityRules, Element, ElementType, GraphStore, RelationshipKey,
    RelationshipType,
};
use archgraph_graph::autocomplete::rules_from_toml_str;
use archgraph_graph::{
    Action, ArchGraph, AutocompleteEngine, AutocompleteRule, CancellationToken, Condition,
    Validator,
};

fn graph_with(elements: &[(&str, ElementType, &str)]) -> ArchGraph {
    let mut graph = ArchGraph::new();
    for (id, element_type, name) in elements {
        graph
            .add_element(Element::with_id(*id, *element_type, *name))
            .unwrap();
    }
    graph
}

fn capability_goal_rule() -> AutocompleteRule {
    AutocompleteRule::new(
        "Connect Capability to Goal",
        [ElementType::Capability],
        [ElementType::Goal],
        Action::DirectRelationship {
            rel_type: RelationshipType::Realization,
        },
    )
    .with_condition(Condition::NoRelationshipOfType {
        types: vec![RelationshipType::Realization],
    })
}

#[test]
fn second_run_is_a_noop() {
    let mut graph = graph_with(&[
        ("cap", ElementType::Capability, "Online Sales"),
        ("goal", ElementType::Goal, "Grow Revenue"),
    ]);
    let engine = AutocompleteEngine::new(
        vec![capability_goal_rule()],
        Some(CompatibilityRules::archimate()),
    )
    .unwrap();

    let first = engine.run(&mut graph);
    assert_eq!(first.created_relationships.len(), 1);
    assert_eq!(first.created_relationships[0].source, "cap");
    assert_eq!(first.created_relationships[0].target, "goal");
    assert!(graph
        .find_by_key(&RelationshipKey {
            source: "cap".into(),
            target: "goal".into(),
            rel_type: RelationshipType::Realization,
        })
        .is_some());

    let second = engine.run(&mut graph);
    assert!(second.is_noop());
    assert!(second.created_relationships.is_empty());
    assert_eq!(graph.relationship_count(), 1);
}

#[test]
fn built_in_rules_add_interface_once() {
    let mut graph = graph_with(&[
        ("actor", ElementType::BusinessActor, "Customer"),
        ("svc", ElementType::ApplicationService, "Customer Portal"),
    ]);
    let engine = AutocompleteEngine::archimate();

    let first = engine.run(&mut graph);
    assert_eq!(first.created_elements.len(), 1);
    assert_eq!(first.created_elements[0].name, "Customer Portal Interface");
    assert_eq!(first.created_elements[0].kind, "archimate:ApplicationInterface");
    assert_eq!(first.created_relationships.len(), 2);

    let interface = graph
        .find_element_by_name(ElementType::ApplicationInterface, "Customer Portal Interface")
        .unwrap()
        .id
        .clone();
    let out: Vec<_> = graph
        .outgoing(&interface)
        .iter()
        .map(|r| (r.target.as_str(), r.rel_type))
        .collect();
    assert_eq!(
        out,
        vec![
            ("svc", RelationshipType::Assignment),
            ("actor", RelationshipType::Serving)
        ]
    );

    let second = engine.run(&mut graph);
    assert!(second.is_noop());
    assert_eq!(graph.element_count(), 3);
    assert_eq!(graph.relationship_count(), 2);
}

#[test]
fn incompatible_proposals_are_skipped_not_applied() {
    let mut graph = graph_with(&[
        ("app", ElementType::ApplicationService, "Billing"),
        ("biz", ElementType::BusinessService, "Billing"),
    ]);

    let enforced = AutocompleteEngine::archimate();
    let report = enforced.run(&mut graph.clone());
    assert!(report.is_noop());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].source, "app");
    assert!(report.skipped[0].reason.contains("cannot have"));

    let lenient = AutocompleteEngine::new(AutocompleteEngine::default_rules(), None).unwrap();
    let report = lenient.run(&mut graph);
    assert_eq!(report.created_relationships.len(), 1);
    assert!(report.skipped.is_empty());
}

#[test]
fn created_relationships_pass_validation_under_enforcement() {
    let mut graph = graph_with(&[
        ("cap", ElementType::Capability, "Payments"),
        ("goal", ElementType::Goal, "Faster Payments"),
        ("p1", ElementType::BusinessProcess, "Order Handling"),
        ("p2", ElementType::BusinessProcess, "Order"),
        ("actor", ElementType::BusinessRole, "Agent"),
        ("svc", ElementType::ApplicationService, "Agent Gateway"),
    ]);
    let rules = CompatibilityRules::archimate();
    let engine = AutocompleteEngine::archimate();
    let report = engine.run(&mut graph);

    assert!(!report.is_noop());
    assert!(Validator::new(&rules).validate(&graph).is_clean());
}

#[test]
fn self_pairs_are_not_counted_or_evaluated() {
    let mut graph = graph_with(&[
        ("p1", ElementType::BusinessProcess, "Order Handling"),
        ("p2", ElementType::BusinessProcess, "Order"),
        ("p3", ElementType::BusinessProcess, "Shipping"),
    ]);
    let engine = AutocompleteEngine::archimate();
    assert_eq!(engine.total_pairs(&graph), 6);

    let report = engine.run(&mut graph);
    assert_eq!(report.total_pairs, 6);
    assert_eq!(report.pairs_evaluated, 6);
    assert_eq!(report.created_relationships.len(), 1);
    assert_eq!(report.created_relationships[0].source, "p1");
    assert_eq!(report.created_relationships[0].target, "p2");
    assert_eq!(
        report.created_relationships[0].kind,
        "archimate:CompositionRelationship"
    );
}

fn two_by_two() -> ArchGraph {
    graph_with(&[
        ("c1", ElementType::Capability, "Sales"),
        ("c2", ElementType::Capability, "Support"),
        ("g1", ElementType::Goal, "Retention"),
        ("g2", ElementType::Goal, "Growth"),
    ])
}

#[test]
fn progress_reports_every_interval_and_the_final_pair() {
    let engine = AutocompleteEngine::new(vec![capability_goal_rule()], None)
        .unwrap()
        .with_progress_interval(3);
    let mut graph = two_by_two();
    let mut calls = Vec::new();

    let report = engine.run_with_progress(
        &mut graph,
        |done, total| {
            calls.push((done, total));
            true
        },
        None,
    );

    assert_eq!(calls, vec![(3, 4), (4, 4)]);
    assert!(!report.cancelled);
    assert_eq!(report.created_relationships.len(), 4);
}

#[test]
fn callback_can_stop_the_run() {
    let engine = AutocompleteEngine::new(vec![capability_goal_rule()], None).unwrap();
    let mut graph = two_by_two();

    let report = engine.run_with_progress(&mut graph, |_, _| false, None);

    assert!(report.cancelled);
    assert_eq!(report.pairs_evaluated, 1);
    assert_eq!(report.created_relationships.len(), 1);
    assert_eq!(graph.relationship_count(), 1);
}

#[test]
fn cancelled_token_stops_before_first_pair() {
    let engine = AutocompleteEngine::new(vec![capability_goal_rule()], None).unwrap();
    let mut graph = two_by_two();
    let token = CancellationToken::new();
    token.cancel();

    let report = engine.run_with_progress(&mut graph, |_, _| true, Some(&token));

    assert!(report.cancelled);
    assert_eq!(report.pairs_evaluated, 0);
    assert_eq!(report.total_pairs, 4);
    assert_eq!(graph.relationship_count(), 0);
}

#[test]
fn config_can_disable_compatibility_enforcement() {
    let config = AutocompleteConfig {
        enforce_compatibility: false,
        progress_interval: 10,
    };
    let mut graph = graph_with(&[
        ("app", ElementType::ApplicationService, "Billing"),
        ("biz", ElementType::BusinessService, "Billing"),
    ]);
    let engine = AutocompleteEngine::from_config(
        &config,
        AutocompleteEngine::default_rules(),
        CompatibilityRules::archimate(),
    )
    .unwrap();

    assert_eq!(engine.run(&mut graph).created_relationships.len(), 1);
}

#[test]
fn rules_loaded_from_toml_drive_the_engine() {
    let rules = rules_from_toml_str(
        r#"
        [[rule]]
        name = "Nodes host components"
        source_types = ["Node"]
        target_types = ["SystemSoftware"]
        conditions = [
            { kind = "no_relationship_of_type", types = ["Assignment"] },
            { kind = "name_similarity", threshold = 0.5 },
        ]
        action = { kind = "direct_relationship", rel_type = "Assignment" }
        "#,
    )
    .unwrap();
    let mut graph = graph_with(&[
        ("n", ElementType::Node, "Linux Host"),
        ("s1", ElementType::SystemSoftware, "linux host"),
        ("s2", ElementType::SystemSoftware, "Oracle DB"),
    ]);
    let engine = AutocompleteEngine::new(rules, Some(CompatibilityRules::archimate())).unwrap();

    let report = engine.run(&mut graph);
    assert_eq!(report.created_relationships.len(), 1);
    assert_eq!(report.created_relationships[0].target, "s1");
}

#[test]
fn malformed_rule_is_rejected_at_construction() {
    let rule = AutocompleteRule::new(
        "",
        [ElementType::Goal],
        [ElementType::Goal],
        Action::DirectRelationship {
            rel_type: RelationshipType::Influence,
        },
    );
    assert!(AutocompleteEngine::new(vec![rule], None).is_err());
}

/// Names of built-in rules whose every type pairing is forbidden by `rules`.
fn blocked_rule_names(rules: &CompatibilityRules) -> Vec<String> {
    AutocompleteEngine::default_rules()
        .into_iter()
        .filter(|rule| {
            rule.source_types.iter().all(|source| {
                rule.target_types.iter().all(|target| match &rule.action {
                    Action::DirectRelationship { rel_type } => {
                        !rules.is_allowed(*source, *target, *rel_type)
                    }
                    Action::InsertIntermediary {
                        element_type,
                        to_target,
                        to_source,
                        ..
                    } => {
                        !rules.is_allowed(*element_type, *target, *to_target)
                            || !rules.is_allowed(*element_type, *source, *to_source)
                    }
                })
            })
        })
        .map(|rule| rule.name)
        .collect()
}

#[test]
fn default_table_blocks_exactly_seven_built_in_rules() {
    let blocked = blocked_rule_names(&CompatibilityRules::archimate());

    assert_eq!(
        blocked,
        vec![
            "Connect Requirements to Business Services that fulfill them",
            "Connect Drivers to Business Processes they influence",
            "Connect Business Services to Application Services that realize them",
            "Connect Business Objects to Data Objects that implement them",
            "Connect Application Components to Nodes that host them",
            "Connect Capabilities to Value Streams they enable",
            "Connect Value Streams to Business Processes that implement them",
        ]
    );
    assert_eq!(AutocompleteEngine::default_rules().len() - blocked.len(), 8);
    assert!(blocked_rule_names(&CompatibilityRules::empty().allow_default_any(
        RelationshipType::Realization
    ))
    .iter()
    .all(|name| !name.contains("Value Streams")));
}
