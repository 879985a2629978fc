use crate::ArchGraph;
use archgraph_core::{ArchGraphError, Element, ElementType, RelationshipType, Result};
use serde::{Deserialize, Serialize};
use similar::TextDiff;
use std::collections::BTreeSet;

pub const SOURCE_NAME: &str = "{source_name}";
pub const TARGET_NAME: &str = "{target_name}";

/// Predicate over a candidate `(source, target)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// No relationship of any of `types` joins the pair, in either direction.
    NoRelationshipOfType { types: Vec<RelationshipType> },
    /// Character similarity of the lower-cased names is at least `threshold`.
    NameSimilarity { threshold: f64 },
    /// Target name contains one of the keywords, case-insensitively.
    TargetNameContains { keywords: Vec<String> },
    /// Target name is a proper case-insensitive substring of the source name.
    TargetNameIsPartOfSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    DirectRelationship {
        rel_type: RelationshipType,
    },
    /// Creates `intermediary --to_target--> target` and
    /// `intermediary --to_source--> source` around a new element.
    InsertIntermediary {
        element_type: ElementType,
        name_template: String,
        to_target: RelationshipType,
        to_source: RelationshipType,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteRule {
    pub name: String,
    pub source_types: BTreeSet<ElementType>,
    pub target_types: BTreeSet<ElementType>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<AutocompleteRule>,
}

/// Similarity ratio in `[0, 1]` of two names, ignoring case.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    f64::from(TextDiff::from_chars(a.as_str(), b.as_str()).ratio())
}

pub fn render_name(template: &str, source: &Element, target: &Element) -> String {
    template
        .replace(SOURCE_NAME, &source.name)
        .replace(TARGET_NAME, &target.name)
}

impl Condition {
    pub fn holds(&self, graph: &ArchGraph, source: &Element, target: &Element) -> bool {
        match self {
            Condition::NoRelationshipOfType { types } => !graph
                .relationships_between(&source.id, &target.id)
                .iter()
                .any(|r| types.contains(&r.rel_type)),
            Condition::NameSimilarity { threshold } => {
                name_similarity(&source.name, &target.name) >= *threshold
            }
            Condition::TargetNameContains { keywords } => {
                let name = target.name.to_lowercase();
                keywords
                    .iter()
                    .any(|k| name.contains(k.to_lowercase().as_str()))
            }
            Condition::TargetNameIsPartOfSource => {
                let (s, t) = (source.name.to_lowercase(), target.name.to_lowercase());
                !t.is_empty() && s != t && s.contains(t.as_str())
            }
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Condition::NoRelationshipOfType { types } if types.is_empty() => {
                Err("no_relationship_of_type needs at least one type".to_string())
            }
            Condition::NameSimilarity { threshold } if !(0.0..=1.0).contains(threshold) => Err(
                format!("similarity threshold {} is outside [0, 1]", threshold),
            ),
            Condition::TargetNameContains { keywords }
                if keywords.is_empty() || keywords.iter().any(|k| k.trim().is_empty()) =>
            {
                Err("target_name_contains needs non-empty keywords".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl AutocompleteRule {
    pub fn new<S: Into<String>>(
        name: S,
        source_types: impl IntoIterator<Item = ElementType>,
        target_types: impl IntoIterator<Item = ElementType>,
        action: Action,
    ) -> Self {
        Self {
            name: name.into(),
            source_types: source_types.into_iter().collect(),
            target_types: target_types.into_iter().collect(),
            conditions: Vec::new(),
            action,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// All conditions hold, evaluated in order, stopping at the first failure.
    pub fn matches(&self, graph: &ArchGraph, source: &Element, target: &Element) -> bool {
        self.conditions
            .iter()
            .all(|c| c.holds(graph, source, target))
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| {
            Err(ArchGraphError::RuleConfiguration(format!(
                "autocomplete rule '{}': {}",
                self.name, msg
            )))
        };
        if self.name.trim().is_empty() {
            return Err(ArchGraphError::RuleConfiguration(
                "autocomplete rule has an empty name".to_string(),
            ));
        }
        if self.source_types.is_empty() || self.target_types.is_empty() {
            return fail("source and target types must not be empty".to_string());
        }
        for condition in &self.conditions {
            if let Err(msg) = condition.validate() {
                return fail(msg);
            }
        }
        if let Action::InsertIntermediary { name_template, .. } = &self.action {
            if !name_template.contains(SOURCE_NAME) && !name_template.contains(TARGET_NAME) {
                return fail(format!(
                    "name template {:?} has no {} or {} placeholder",
                    name_template, SOURCE_NAME, TARGET_NAME
                ));
            }
        }
        Ok(())
    }
}

/// Parses `[[rule]]` tables and validates every rule.
pub fn rules_from_toml_str(content: &str) -> Result<Vec<AutocompleteRule>> {
    let file: RuleFile =
        toml::from_str(content).map_err(|e| ArchGraphError::RuleConfiguration(e.to_string()))?;
    for rule in &file.rules {
        rule.validate()?;
    }
    Ok(file.rules)
}
