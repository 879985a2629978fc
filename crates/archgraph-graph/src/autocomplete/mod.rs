//! Rule-driven enrichment of the graph with missing elements and relationships.
//!
//! Each rule is matched against the cartesian product of its source and target
//! element sets. Pair lists are snapshotted before the first mutation, so
//! elements created by one rule are not candidates for later rules in the same
//! run. Progress and cancellation are checked between pair evaluations only;
//! every action is applied whole or not at all.

mod defaults;
mod rule;

pub use rule::{
    name_similarity, render_name, rules_from_toml_str, Action, AutocompleteRule, Condition,
};

use crate::ArchGraph;
use archgraph_core::{
    AutocompleteConfig, CompatibilityRules, Element, ElementId, ElementRecord, ElementType,
    GraphStore, Relationship, RelationshipKey, RelationshipRecord, RelationshipType, Result,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span};

/// A proposal that matched its rule but was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedProposal {
    pub rule: String,
    pub source: ElementId,
    pub target: ElementId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutocompleteReport {
    pub created_elements: Vec<ElementRecord>,
    pub created_relationships: Vec<RelationshipRecord>,
    pub skipped: Vec<SkippedProposal>,
    pub pairs_evaluated: usize,
    pub total_pairs: usize,
    pub cancelled: bool,
}

impl AutocompleteReport {
    /// Nothing was added to the graph.
    pub fn is_noop(&self) -> bool {
        self.created_elements.is_empty() && self.created_relationships.is_empty()
    }
}

struct RulePlan<'r> {
    rule: &'r AutocompleteRule,
    sources: Vec<ElementId>,
    targets: Vec<ElementId>,
}

impl RulePlan<'_> {
    fn pair_count(&self) -> usize {
        let shared = self
            .sources
            .iter()
            .filter(|id| self.targets.contains(id))
            .count();
        self.sources.len() * self.targets.len() - shared
    }
}

enum Outcome {
    Applied {
        element: Option<Element>,
        relationships: Vec<Relationship>,
    },
    Skipped(String),
    AlreadyPresent,
}

pub struct AutocompleteEngine {
    rules: Vec<AutocompleteRule>,
    compatibility: Option<CompatibilityRules>,
    progress_interval: usize,
}

impl AutocompleteEngine {
    /// Validates every rule; a malformed rule aborts construction.
    pub fn new(
        rules: Vec<AutocompleteRule>,
        compatibility: Option<CompatibilityRules>,
    ) -> Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        if let Some(compat) = &compatibility {
            compat.validate()?;
        }
        Ok(Self {
            rules,
            compatibility,
            progress_interval: 1,
        })
    }

    /// Built-in rule set checked against the built-in compatibility table.
    pub fn archimate() -> Self {
        Self {
            rules: defaults::archimate_rules(),
            compatibility: Some(CompatibilityRules::archimate()),
            progress_interval: 1,
        }
    }

    pub fn from_config(
        config: &AutocompleteConfig,
        rules: Vec<AutocompleteRule>,
        compatibility: CompatibilityRules,
    ) -> Result<Self> {
        let compatibility = config.enforce_compatibility.then_some(compatibility);
        Ok(Self::new(rules, compatibility)?.with_progress_interval(config.progress_interval))
    }

    pub fn default_rules() -> Vec<AutocompleteRule> {
        defaults::archimate_rules()
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn rules(&self) -> &[AutocompleteRule] {
        &self.rules
    }

    fn plan(&self, graph: &ArchGraph) -> Vec<RulePlan<'_>> {
        let ids_of = |types: &BTreeSet<ElementType>| -> Vec<ElementId> {
            graph
                .elements()
                .filter(|e| types.contains(&e.element_type))
                .map(|e| e.id.clone())
                .collect()
        };
        self.rules
            .iter()
            .map(|rule| RulePlan {
                rule,
                sources: ids_of(&rule.source_types),
                targets: ids_of(&rule.target_types),
            })
            .collect()
    }

    /// Number of pairs a run would evaluate against the current graph.
    pub fn total_pairs(&self, graph: &ArchGraph) -> usize {
        self.plan(graph).iter().map(RulePlan::pair_count).sum()
    }

    pub fn run(&self, graph: &mut ArchGraph) -> AutocompleteReport {
        self.run_with_progress(graph, |_, _| true, None)
    }

    /// Runs every rule in order. `progress(completed, total)` returning
    /// `false`, or `cancel` being triggered, stops the run before the next pair.
    pub fn run_with_progress<F>(
        &self,
        graph: &mut ArchGraph,
        mut progress: F,
        cancel: Option<&CancellationToken>,
    ) -> AutocompleteReport
    where
        F: FnMut(usize, usize) -> bool,
    {
        let plans = self.plan(graph);
        let total: usize = plans.iter().map(RulePlan::pair_count).sum();
        let _span = info_span!("autocomplete", rules = plans.len(), pairs = total).entered();

        let mut report = AutocompleteReport {
            total_pairs: total,
            ..Default::default()
        };

        'rules: for plan in &plans {
            debug!("Rule '{}': {} pairs", plan.rule.name, plan.pair_count());
            for source_id in &plan.sources {
                for target_id in &plan.targets {
                    if source_id == target_id {
                        continue;
                    }
                    if cancel.is_some_and(|token| token.is_cancelled()) {
                        report.cancelled = true;
                        break 'rules;
                    }

                    self.evaluate(graph, plan.rule, source_id, target_id, &mut report);
                    report.pairs_evaluated += 1;

                    let done = report.pairs_evaluated;
                    if (done % self.progress_interval == 0 || done == total)
                        && !progress(done, total)
                    {
                        report.cancelled = true;
                        break 'rules;
                    }
                }
            }
        }

        if report.cancelled {
            info!(
                "Autocomplete cancelled after {}/{} pairs",
                report.pairs_evaluated, total
            );
        }
        info!(
            "Autocomplete added {} elements and {} relationships ({} proposals skipped)",
            report.created_elements.len(),
            report.created_relationships.len(),
            report.skipped.len()
        );
        report
    }

    fn evaluate(
        &self,
        graph: &mut ArchGraph,
        rule: &AutocompleteRule,
        source_id: &str,
        target_id: &str,
        report: &mut AutocompleteReport,
    ) {
        let (Some(source), Some(target)) = (graph.element(source_id), graph.element(target_id))
        else {
            return;
        };
        if !rule.matches(graph, source, target) {
            return;
        }
        let (source, target) = (source.clone(), target.clone());

        match self.propose(graph, rule, &source, &target) {
            Outcome::Applied {
                element,
                relationships,
            } => match commit(graph, element, relationships) {
                Ok((element, relationships)) => {
                    for rel in &relationships {
                        debug!("Rule '{}' added {}", rule.name, graph.describe_relationship(rel));
                    }
                    report
                        .created_elements
                        .extend(element.as_ref().map(ElementRecord::from));
                    report
                        .created_relationships
                        .extend(relationships.iter().map(RelationshipRecord::from));
                }
                Err(e) => report.skipped.push(skip(rule, &source, &target, e.to_string())),
            },
            Outcome::Skipped(reason) => {
                debug!("Rule '{}' skipped {} -> {}: {}", rule.name, source.id, target.id, reason);
                report.skipped.push(skip(rule, &source, &target, reason));
            }
            Outcome::AlreadyPresent => {}
        }
    }

    fn allowed(
        &self,
        source: &Element,
        target_type: ElementType,
        rel_type: RelationshipType,
    ) -> std::result::Result<(), String> {
        match &self.compatibility {
            Some(rules) => rules
                .check(source.element_type, target_type, rel_type)
                .map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }

    fn propose(
        &self,
        graph: &ArchGraph,
        rule: &AutocompleteRule,
        source: &Element,
        target: &Element,
    ) -> Outcome {
        match &rule.action {
            Action::DirectRelationship { rel_type } => {
                if holds(graph, &source.id, &target.id, *rel_type) {
                    return Outcome::AlreadyPresent;
                }
                if let Err(reason) = self.allowed(source, target.element_type, *rel_type) {
                    return Outcome::Skipped(reason);
                }
                Outcome::Applied {
                    element: None,
                    relationships: vec![Relationship::new(
                        source.id.clone(),
                        target.id.clone(),
                        *rel_type,
                    )],
                }
            }
            Action::InsertIntermediary {
                element_type,
                name_template,
                to_target,
                to_source,
            } => {
                let name = render_name(name_template, source, target);
                let (intermediary, created) = match graph.find_element_by_name(*element_type, &name) {
                    Some(existing) => (existing.clone(), false),
                    None => (Element::new(*element_type, name), true),
                };

                let mut relationships = Vec::with_capacity(2);
                for (end, rel_type) in [(target, *to_target), (source, *to_source)] {
                    if holds(graph, &intermediary.id, &end.id, rel_type) {
                        continue;
                    }
                    if let Err(reason) = self.allowed(&intermediary, end.element_type, rel_type) {
                        return Outcome::Skipped(reason);
                    }
                    relationships.push(Relationship::new(
                        intermediary.id.clone(),
                        end.id.clone(),
                        rel_type,
                    ));
                }

                if relationships.is_empty() {
                    return Outcome::AlreadyPresent;
                }
                Outcome::Applied {
                    element: created.then_some(intermediary),
                    relationships,
                }
            }
        }
    }
}

fn holds(graph: &ArchGraph, source: &str, target: &str, rel_type: RelationshipType) -> bool {
    graph
        .find_by_key(&RelationshipKey {
            source: source.to_string(),
            target: target.to_string(),
            rel_type,
        })
        .is_some()
}

fn skip(
    rule: &AutocompleteRule,
    source: &Element,
    target: &Element,
    reason: String,
) -> SkippedProposal {
    SkippedProposal {
        rule: rule.name.clone(),
        source: source.id.clone(),
        target: target.id.clone(),
        reason,
    }
}

/// Inserts an element and its relationships, rolling back on failure.
fn commit(
    graph: &mut ArchGraph,
    element: Option<Element>,
    relationships: Vec<Relationship>,
) -> Result<(Option<Element>, Vec<Relationship>)> {
    if let Some(el) = &element {
        graph.add_element(el.clone())?;
    }
    let mut added: Vec<Relationship> = Vec::with_capacity(relationships.len());
    for rel in relationships {
        if let Err(e) = graph.add_relationship(rel.clone()) {
            for done in &added {
                graph.remove_relationship(&done.id);
            }
            if let Some(el) = &element {
                graph.remove_element(&el.id);
            }
            return Err(e);
        }
        added.push(rel);
    }
    Ok((element, added))
}
