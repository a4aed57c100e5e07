//! Pipeline configuration loading and config file resolution
//!
//! Every stage receives an explicit [`PipelineConfig`]. Values come from a
//! TOML file when one is found, with built-in defaults for anything omitted.
//!
//! Config file resolution priority:
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`REVIEW_PIPELINE_CONFIG`)
//! 3. `review-pipeline.toml` in the working directory
//! 4. `<user config dir>/review-pipeline/config.toml`
//! 5. Compiled defaults (no file)
//!
//! Tiers 1 and 2 name a file explicitly, so a missing or malformed file there
//! is an error. Tiers 3 and 4 are discovered: a bad file logs a warning and
//! the defaults are used instead.

use crate::db::schema::is_valid_identifier;
use crate::{Dimension, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "REVIEW_PIPELINE_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "review-pipeline.toml";

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// SQLite database file holding all four collections
    pub database_path: PathBuf,

    /// Tabular input file read by the ingestion stage
    pub data_path: PathBuf,

    /// Collection (table) names
    pub collections: CollectionNames,

    /// Dashboard HTTP server settings
    pub dashboard: DashboardConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Names of the four collections in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    pub raw: String,
    pub clean: String,
    pub city: String,
    pub state: String,
}

/// Dashboard server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("bigdata_db.sqlite"),
            data_path: PathBuf::from("yelp_database.csv"),
            collections: CollectionNames::default(),
            dashboard: DashboardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            raw: "yelp_raw".to_string(),
            clean: "yelp_clean".to_string(),
            city: "agg_city".to_string(),
            state: "agg_state".to_string(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CollectionNames {
    /// Output collection for an aggregation dimension
    pub fn aggregate(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::City => &self.city,
            Dimension::State => &self.state,
        }
    }

    fn all(&self) -> [&str; 4] {
        [&self.raw, &self.clean, &self.city, &self.state]
    }

    /// Reject names that are not plain identifiers, or that collide
    pub fn validate(&self) -> Result<()> {
        let names = self.all();
        for name in names {
            if !is_valid_identifier(name) {
                return Err(Error::Config(format!("Invalid collection name: {:?}", name)));
            }
        }
        for (i, name) in names.iter().enumerate() {
            if names[i + 1..].contains(name) {
                return Err(Error::Config(format!(
                    "Collection name used more than once: {}",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Where the config file came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named by CLI argument or environment variable; must load
    Explicit(PathBuf),
    /// Found by search; failures fall back to defaults
    Discovered(PathBuf),
}

/// Resolve the config file following the priority order in the module docs
pub fn resolve_config_file(cli_arg: Option<&Path>) -> Option<ConfigLocation> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(ConfigLocation::Explicit(path.to_path_buf()));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(ConfigLocation::Explicit(PathBuf::from(path)));
        }
    }

    // Priority 3: Working directory
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(ConfigLocation::Discovered(local));
    }

    // Priority 4: User config directory
    dirs::config_dir()
        .map(|d| d.join("review-pipeline").join("config.toml"))
        .filter(|p| p.exists())
        .map(ConfigLocation::Discovered)
}

/// How the active configuration was obtained
///
/// Loading happens before logging is set up (the log level is itself a
/// config value), so the outcome is returned for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Loaded from this file
    File(PathBuf),
    /// A discovered file could not be used; defaults are in effect
    Fallback { path: PathBuf, reason: String },
    /// No config file found
    Defaults,
}

impl ConfigOrigin {
    /// Report the outcome through `tracing`
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigOrigin::Fallback { path, reason } => {
                warn!("Ignoring config file {}: {}; using defaults", path.display(), reason)
            }
            ConfigOrigin::Defaults => info!("No config file found, using built-in defaults"),
        }
    }
}

impl PipelineConfig {
    /// Load configuration, resolving the config file from `cli_arg` and the
    /// environment
    pub fn load(cli_arg: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        Self::load_from(resolve_config_file(cli_arg))
    }

    /// Load configuration from an already resolved location
    pub fn load_from(location: Option<ConfigLocation>) -> Result<(Self, ConfigOrigin)> {
        match location {
            Some(ConfigLocation::Explicit(path)) => {
                let config = Self::from_file(&path)?;
                Ok((config, ConfigOrigin::File(path)))
            }
            Some(ConfigLocation::Discovered(path)) => match Self::from_file(&path) {
                Ok(config) => Ok((config, ConfigOrigin::File(path))),
                Err(e) => Ok((
                    Self::default(),
                    ConfigOrigin::Fallback {
                        path,
                        reason: e.to_string(),
                    },
                )),
            },
            None => Ok((Self::default(), ConfigOrigin::Defaults)),
        }
    }

    /// Load and validate a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML config text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.collections.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.collections.raw, "yelp_raw");
        assert_eq!(config.collections.clean, "yelp_clean");
        assert_eq!(config.collections.city, "agg_city");
        assert_eq!(config.collections.state, "agg_state");
        assert_eq!(config.dashboard.port, 8501);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            data_path = "reviews.xlsx"

            [collections]
            clean = "reviews_clean"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("reviews.xlsx"));
        assert_eq!(config.collections.clean, "reviews_clean");
        assert_eq!(config.collections.raw, "yelp_raw");
        assert_eq!(config.database_path, PathBuf::from("bigdata_db.sqlite"));
    }

    #[test]
    fn test_invalid_collection_name_rejected() {
        let result = PipelineConfig::from_toml_str(
            r#"
            [collections]
            raw = "raw; DROP TABLE x"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_collection_name_rejected() {
        let result = PipelineConfig::from_toml_str(
            r#"
            [collections]
            city = "agg"
            state = "agg"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_aggregate_collection_lookup() {
        let names = CollectionNames::default();
        assert_eq!(names.aggregate(Dimension::City), "agg_city");
        assert_eq!(names.aggregate(Dimension::State), "agg_state");
    }

    #[test]
    fn test_malformed_discovered_file_falls_back_with_reason() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&path, "database_path = [not toml").unwrap();

        let (config, origin) =
            PipelineConfig::load_from(Some(ConfigLocation::Discovered(path.clone()))).unwrap();
        assert_eq!(config, PipelineConfig::default());
        match origin {
            ConfigOrigin::Fallback { path: reported, reason } => {
                assert_eq!(reported, path);
                assert!(reason.contains("Invalid TOML"), "Unexpected reason: {}", reason);
            }
            other => panic!("Expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_explicit_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "database_path = [not toml").unwrap();

        let result = PipelineConfig::load_from(Some(ConfigLocation::Explicit(path)));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_loaded_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&path, "data_path = \"reviews.csv\"\n").unwrap();

        let (config, origin) =
            PipelineConfig::load_from(Some(ConfigLocation::Discovered(path.clone()))).unwrap();
        assert_eq!(config.data_path, PathBuf::from("reviews.csv"));
        assert_eq!(origin, ConfigOrigin::File(path));

        let (_, origin) = PipelineConfig::load_from(None).unwrap();
        assert_eq!(origin, ConfigOrigin::Defaults);
    }

    #[test]
    fn test_cli_argument_is_explicit() {
        let location = resolve_config_file(Some(Path::new("/tmp/custom.toml")));
        assert_eq!(
            location,
            Some(ConfigLocation::Explicit(PathBuf::from("/tmp/custom.toml")))
        );
    }
}
