//! Relationship compatibility rules.
//!
//! For each source element type the rules list which relationship types may
//! originate from it and which target types each of them accepts. Sources
//! without an entry fall back to the wildcard (`*`) table.

mod defaults;

use crate::config_manager::ConfigError;
use crate::{ArchGraphError, ElementType, RelationshipType, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// Key and target marker standing for "any type".
pub const WILDCARD: &str = "*";

/// Targets permitted for one relationship type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSet {
    Any,
    Only(BTreeSet<ElementType>),
}

impl TargetSet {
    pub fn permits(&self, target: ElementType) -> bool {
        match self {
            TargetSet::Any => true,
            TargetSet::Only(types) => types.contains(&target),
        }
    }

    fn from_tags(tags: &[String]) -> Result<Self> {
        if tags.is_empty() {
            return Err(ArchGraphError::RuleConfiguration(
                "target list is empty".to_string(),
            ));
        }
        if tags.iter().any(|t| t.trim() == WILDCARD) {
            if tags.len() > 1 {
                return Err(ArchGraphError::RuleConfiguration(format!(
                    "wildcard target mixed with explicit targets: {:?}",
                    tags
                )));
            }
            return Ok(TargetSet::Any);
        }
        let mut types = BTreeSet::new();
        for tag in tags {
            types.insert(tag.parse::<ElementType>().map_err(rule_error)?);
        }
        Ok(TargetSet::Only(types))
    }
}

/// Relationship types and their permitted targets for one source type.
pub type RuleTable = BTreeMap<RelationshipType, TargetSet>;

/// Compatibility table consulted by validation, repair and autocomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityRules {
    by_source: HashMap<ElementType, RuleTable>,
    default: RuleTable,
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Default for CompatibilityRules {
    fn default() -> Self {
        Self::archimate()
    }
}

impl CompatibilityRules {
    pub fn new(by_source: HashMap<ElementType, RuleTable>, default: RuleTable) -> Self {
        Self { by_source, default }
    }

    /// Rules with no entries at all; every relationship is disallowed.
    pub fn empty() -> Self {
        Self::new(HashMap::new(), RuleTable::new())
    }

    /// The built-in ArchiMate table.
    pub fn archimate() -> Self {
        defaults::archimate_rules()
    }

    /// Adds `targets` to the permitted set of `source --rel_type-->`.
    pub fn allow(
        mut self,
        source: ElementType,
        rel_type: RelationshipType,
        targets: &[ElementType],
    ) -> Self {
        let table = self.by_source.entry(source).or_default();
        match table
            .entry(rel_type)
            .or_insert_with(|| TargetSet::Only(BTreeSet::new()))
        {
            TargetSet::Any => {}
            TargetSet::Only(set) => set.extend(targets.iter().copied()),
        }
        self
    }

    /// Permits `source --rel_type--> *`.
    pub fn allow_any(mut self, source: ElementType, rel_type: RelationshipType) -> Self {
        self.by_source
            .entry(source)
            .or_default()
            .insert(rel_type, TargetSet::Any);
        self
    }

    /// Permits `rel_type` to any target for sources without their own entry.
    pub fn allow_default_any(mut self, rel_type: RelationshipType) -> Self {
        self.default.insert(rel_type, TargetSet::Any);
        self
    }

    pub fn has_entry(&self, source: ElementType) -> bool {
        self.by_source.contains_key(&source)
    }

    /// Table for `source`, or the wildcard table when it has no entry.
    pub fn allowed_targets(&self, source: ElementType) -> &RuleTable {
        self.by_source.get(&source).unwrap_or(&self.default)
    }

    pub fn default_table(&self) -> &RuleTable {
        &self.default
    }

    pub fn is_allowed(
        &self,
        source: ElementType,
        target: ElementType,
        rel_type: RelationshipType,
    ) -> bool {
        self.allowed_targets(source)
            .get(&rel_type)
            .is_some_and(|targets| targets.permits(target))
    }

    /// Every relationship type legal from `source` to `target`, sorted by
    /// `RelationshipType` order (the same order repairs try them in).
    pub fn valid_relationship_types(
        &self,
        source: ElementType,
        target: ElementType,
    ) -> BTreeSet<RelationshipType> {
        self.allowed_targets(source)
            .iter()
            .filter(|(_, targets)| targets.permits(target))
            .map(|(rel_type, _)| *rel_type)
            .collect()
    }

    /// Like [`is_allowed`](Self::is_allowed) but reports the violation.
    pub fn check(
        &self,
        source: ElementType,
        target: ElementType,
        rel_type: RelationshipType,
    ) -> Result<()> {
        if self.is_allowed(source, target, rel_type) {
            Ok(())
        } else {
            Err(ArchGraphError::IncompatibleType(format!(
                "{} cannot have a {} relationship to {}",
                source, rel_type, target
            )))
        }
    }

    /// Rejects tables with empty target sets.
    pub fn validate(&self) -> Result<()> {
        let tables = self
            .by_source
            .iter()
            .map(|(source, table)| (source.to_string(), table))
            .chain(std::iter::once((WILDCARD.to_string(), &self.default)));
        for (source, table) in tables {
            for (rel_type, targets) in table {
                if matches!(targets, TargetSet::Only(set) if set.is_empty()) {
                    return Err(ArchGraphError::RuleConfiguration(format!(
                        "{} --{}--> has no permitted targets",
                        source, rel_type
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parses a `[rules.<Source>] <Relationship> = ["Target", ...]` document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RulesFile = toml::from_str(content)
            .map_err(|e| ArchGraphError::RuleConfiguration(e.to_string()))?;

        let mut rules = Self::empty();
        let mut wildcard_key: Option<&String> = None;
        let mut source_keys: HashMap<ElementType, &String> = HashMap::new();
        for (source, entries) in &file.rules {
            let mut table = RuleTable::new();
            let mut rel_keys: HashMap<RelationshipType, &String> = HashMap::new();
            for (rel_tag, targets) in entries {
                let rel_type = rel_tag.parse::<RelationshipType>().map_err(rule_error)?;
                if let Some(first) = rel_keys.insert(rel_type, rel_tag) {
                    return Err(duplicate_key(&format!("rules.{}", source), first, rel_tag));
                }
                let targets = TargetSet::from_tags(targets).map_err(|e| {
                    ArchGraphError::RuleConfiguration(format!("{}.{}: {}", source, rel_tag, e))
                })?;
                table.insert(rel_type, targets);
            }
            if source.trim() == WILDCARD {
                if let Some(first) = wildcard_key.replace(source) {
                    return Err(duplicate_key("rules", first, source));
                }
                rules.default = table;
            } else {
                let source_type = source.parse::<ElementType>().map_err(rule_error)?;
                if let Some(first) = source_keys.insert(source_type, source) {
                    return Err(duplicate_key("rules", first, source));
                }
                rules.by_source.insert(source_type, table);
            }
        }

        rules.validate()?;
        debug!(
            "Parsed compatibility rules for {} source types (default entries: {})",
            rules.by_source.len(),
            rules.default.len()
        );
        Ok(rules)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let rules = Self::from_toml_str(&content)?;
        info!("Loaded compatibility rules from {}", path.display());
        Ok(rules)
    }
}

/// Two keys in one table that parse to the same type.
fn duplicate_key(table: &str, first: &str, second: &str) -> ArchGraphError {
    ArchGraphError::RuleConfiguration(format!(
        "{}: keys {:?} and {:?} name the same type",
        table, first, second
    ))
}

fn rule_error(err: ArchGraphError) -> ArchGraphError {
    match err {
        ArchGraphError::UnknownType { kind, tag } => {
            ArchGraphError::RuleConfiguration(format!("unknown {} type tag {:?}", kind, tag))
        }
        other => other,
    }
}
