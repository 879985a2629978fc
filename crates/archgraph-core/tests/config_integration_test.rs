use archgraph_core::{
    ArchGraphError, CompatibilityRules, ConfigError, ConfigManager, ElementType, RelationshipType,
};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn write_toml(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_from_file_reads_impact_section() {
    let file = write_toml(
        r#"
        [impact]
        max_hops = 7

        [impact.weights]
        Triggering = 0.6
        Realization = 0.9

        [autocomplete]
        progress_interval = 25
        "#,
    );

    let manager = ConfigManager::from_file(file.path()).unwrap();
    let config = manager.config();
    assert_eq!(config.impact.max_hops, 7);
    assert_eq!(config.impact.weight(RelationshipType::Triggering), 0.6);
    assert_eq!(config.autocomplete.progress_interval, 25);
    assert_eq!(manager.config_path(), Some(file.path()));
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let result = ConfigManager::from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_invalid_values_fail_validation() {
    let file = write_toml(
        r#"
        [impact]
        max_hops = 0
        "#,
    );
    let result = ConfigManager::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));

    let file = write_toml("[impact\nmax_hops = 3");
    let result = ConfigManager::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_env_overrides_file_values() {
    let file = write_toml(
        r#"
        [impact]
        decay = 0.6

        [logging]
        format = "pretty"
        "#,
    );

    std::env::set_var("ARCHGRAPH_IMPACT_DECAY", "0.7");
    std::env::set_var("ARCHGRAPH_LOG_FORMAT", "json");
    let result = ConfigManager::from_file(file.path());
    std::env::remove_var("ARCHGRAPH_IMPACT_DECAY");
    std::env::remove_var("ARCHGRAPH_LOG_FORMAT");

    let config = result.unwrap().into_config();
    assert_eq!(config.impact.decay, 0.7);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_default_config_written_and_reloaded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    ConfigManager::create_default_config(&path).unwrap();

    let manager = ConfigManager::from_file(&path).unwrap();
    assert_eq!(manager.config().impact.max_hops, 50);
    assert_eq!(
        manager.config().impact.weight(RelationshipType::Influence),
        0.8
    );
}

#[test]
fn test_rules_file_loading() {
    let file = write_toml(
        r#"
        [rules."*"]
        Association = ["*"]

        [rules.Capability]
        Realization = ["Goal"]
        "#,
    );
    let rules = CompatibilityRules::from_file(file.path()).unwrap();
    assert!(rules.is_allowed(
        ElementType::Capability,
        ElementType::Goal,
        RelationshipType::Realization
    ));
    assert!(!rules.is_allowed(
        ElementType::Capability,
        ElementType::Goal,
        RelationshipType::Association
    ));
    assert!(rules.is_allowed(
        ElementType::Goal,
        ElementType::Capability,
        RelationshipType::Association
    ));

    let dir = tempdir().unwrap();
    let err = CompatibilityRules::from_file(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ArchGraphError::Config(ConfigError::ReadError(_))));
}
