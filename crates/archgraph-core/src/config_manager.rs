use crate::RelationshipType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for ArchGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ArchGraphConfig {
    /// Impact propagation parameters
    #[serde(default)]
    pub impact: ImpactConfig,

    /// Autocomplete engine settings
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weighted, decayed propagation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactConfig {
    /// Per relationship type weight in (0, 1]
    #[serde(default = "default_impact_weights")]
    pub weights: BTreeMap<RelationshipType, f64>,

    /// Weight for relationship types missing from `weights`
    #[serde(default = "default_weight")]
    pub default_weight: f64,

    /// Multiplier applied on every hop, in (0, 1)
    #[serde(default = "default_decay")]
    pub decay: f64,

    /// Branches stop expanding at this depth
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Propagated values at or below this are dropped
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Extra attenuation when walking a relationship against its direction
    #[serde(default = "default_inbound_factor")]
    pub inbound_factor: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            weights: default_impact_weights(),
            default_weight: default_weight(),
            decay: default_decay(),
            max_hops: default_max_hops(),
            epsilon: default_epsilon(),
            inbound_factor: default_inbound_factor(),
        }
    }
}

impl ImpactConfig {
    pub fn weight(&self, rel_type: RelationshipType) -> f64 {
        self.weights
            .get(&rel_type)
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn with_weight(mut self, rel_type: RelationshipType, weight: f64) -> Self {
        self.weights.insert(rel_type, weight);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_unit = |w: f64| w > 0.0 && w <= 1.0;
        for (rel_type, weight) in &self.weights {
            if !in_unit(*weight) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid impact weight for {}: {}. Must be in (0, 1]",
                    rel_type, weight
                )));
            }
        }
        if !in_unit(self.default_weight) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid default impact weight: {}. Must be in (0, 1]",
                self.default_weight
            )));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid impact decay: {}. Must be in (0, 1)",
                self.decay
            )));
        }
        if self.max_hops == 0 {
            return Err(ConfigError::ValidationError(
                "Invalid max hops: 0. Must be at least 1".to_string(),
            ));
        }
        if !(self.epsilon >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid impact epsilon: {}. Must be >= 0",
                self.epsilon
            )));
        }
        if !in_unit(self.inbound_factor) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid inbound factor: {}. Must be in (0, 1]",
                self.inbound_factor
            )));
        }
        Ok(())
    }
}

/// Autocomplete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutocompleteConfig {
    /// Check proposals against the compatibility rules before inserting
    #[serde(default = "default_true")]
    pub enforce_compatibility: bool,

    /// Invoke the progress callback every N evaluated pairs
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            enforce_compatibility: true,
            progress_interval: default_progress_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_impact_weights() -> BTreeMap<RelationshipType, f64> {
    BTreeMap::from([
        (RelationshipType::Influence, 0.8),
        (RelationshipType::Realization, 0.9),
        (RelationshipType::Serving, 0.7),
        (RelationshipType::Triggering, 0.85),
        (RelationshipType::Assignment, 0.75),
        (RelationshipType::Access, 0.6),
    ])
}
fn default_weight() -> f64 {
    0.5
}
fn default_decay() -> f64 {
    0.8
}
fn default_max_hops() -> usize {
    50
}
fn default_epsilon() -> f64 {
    0.01
}
fn default_inbound_factor() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_progress_interval() -> usize {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: ArchGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.archgraph.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load an explicit config file, still honouring environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    fn finish(config: ArchGraphConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Configuration loaded from {}", path.display()),
            None => info!("Configuration loaded (defaults, no config file)"),
        }
        info!(
            "Impact: decay={} max_hops={} epsilon={}",
            config.impact.decay, config.impact.max_hops, config.impact.epsilon
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenvy::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".archgraph.env");
            if home_env.exists() {
                if let Err(e) = dotenvy::from_path(&home_env) {
                    warn!("Failed to load .archgraph.env: {}", e);
                }
            }
        }
    }

    /// Search order:
    /// 1. ./.archgraph.toml
    /// 2. ~/.archgraph/config.toml
    fn load_config_file() -> Result<(ArchGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".archgraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".archgraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((ArchGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<ArchGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(mut config: ArchGraphConfig) -> ArchGraphConfig {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            let raw = std::env::var(key).ok()?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring unparsable {}={:?}", key, raw);
                    None
                }
            }
        }

        // Impact
        if let Some(decay) = parsed("ARCHGRAPH_IMPACT_DECAY") {
            config.impact.decay = decay;
        }
        if let Some(hops) = parsed("ARCHGRAPH_IMPACT_MAX_HOPS") {
            config.impact.max_hops = hops;
        }
        if let Some(epsilon) = parsed("ARCHGRAPH_IMPACT_EPSILON") {
            config.impact.epsilon = epsilon;
        }
        if let Some(weight) = parsed("ARCHGRAPH_IMPACT_DEFAULT_WEIGHT") {
            config.impact.default_weight = weight;
        }

        // Autocomplete
        if let Ok(enforce) = std::env::var("ARCHGRAPH_AUTOCOMPLETE_ENFORCE_COMPATIBILITY") {
            config.autocomplete.enforce_compatibility =
                enforce.to_lowercase() == "true" || enforce == "1";
        }

        // Logging
        if let Ok(level) = std::env::var("ARCHGRAPH_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("ARCHGRAPH_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    fn validate_config(config: &ArchGraphConfig) -> Result<(), ConfigError> {
        config.impact.validate()?;

        if config.autocomplete.progress_interval == 0 {
            return Err(ConfigError::ValidationError(
                "Invalid progress interval: 0. Must be at least 1".to_string(),
            ));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &ArchGraphConfig {
        &self.config
    }

    pub fn into_config(self) -> ArchGraphConfig {
        self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Write the default configuration to `path`
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = ArchGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
