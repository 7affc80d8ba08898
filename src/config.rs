use clap::{ArgAction, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::types::CoercionPolicy;
use crate::{EmbedSqlError, Result};

/// Path sentinel for an ephemeral in-memory database
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Open-time configuration of a database session.
///
/// Mirrors the JSON shape clients pass to `open`:
/// `{"path": ":memory:", "query": {"castDurationToTime64": false}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub query: QueryConfig,
}

/// Options that shape how query results are materialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryConfig {
    /// Convert interval results to a time-of-day value; unset means true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_duration_to_time64: Option<bool>,
}

fn default_path() -> String {
    IN_MEMORY_PATH.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl DatabaseConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: QueryConfig::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_PATH)
    }

    pub fn with_cast_duration_to_time64(mut self, cast: bool) -> Self {
        self.query.cast_duration_to_time64 = Some(cast);
        self
    }

    /// Parse the JSON form; malformed input is a configuration error
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DatabaseConfig = serde_json::from_str(json)
            .map_err(|e| EmbedSqlError::ConfigInvalid(e.to_string()))?;
        Ok(config)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_PATH
    }

    /// Reject configurations no engine could act on. Runs before any engine call.
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(EmbedSqlError::ConfigInvalid(
                "path must be \":memory:\" or a file path, got an empty string".to_string(),
            ));
        }
        if self.path.contains('\0') {
            return Err(EmbedSqlError::ConfigInvalid("path contains a NUL byte".to_string()));
        }
        Ok(())
    }

    pub fn coercion_policy(&self) -> CoercionPolicy {
        CoercionPolicy {
            duration_to_time_of_day: self.query.cast_duration_to_time64.unwrap_or(true),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "embedsql")]
#[command(about = "Run SQL against an embedded database and print columnar results", long_about = None)]
pub struct Config {
    #[arg(short, long, env = "EMBEDSQL_DATABASE", help = "Database path, or :memory: (default)")]
    pub database: Option<String>,

    #[arg(long, env = "EMBEDSQL_CAST_DURATION_TO_TIME64", action = ArgAction::Set, help = "Return intervals as time-of-day values (default: true)")]
    pub cast_duration_to_time64: Option<bool>,

    #[arg(long, env = "EMBEDSQL_CONFIG", help = "JSON file with the open configuration; flags override it")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "info", env = "EMBEDSQL_LOG_LEVEL")]
    pub log_level: String,

    #[arg(long, help = "Decode raw durations instead of reporting them as undecodable")]
    pub decode_durations: bool,

    #[arg(required = true, help = "SQL statements to run, in order")]
    pub sql: Vec<String>,
}

impl Config {
    /// Get a configuration instance with all values resolved from CLI args and environment variables
    pub fn load() -> Self {
        Config::parse()
    }

    /// Resolve the open configuration: JSON file first, then flag overrides
    pub fn database_config(&self) -> Result<DatabaseConfig> {
        let mut config = match &self.config {
            Some(path) => DatabaseConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => DatabaseConfig::in_memory(),
        };

        if let Some(database) = &self.database {
            config.path = database.clone();
        }
        if let Some(cast) = self.cast_duration_to_time64 {
            config.query.cast_duration_to_time64 = Some(cast);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shapes() {
        let config = DatabaseConfig::from_json(r#"{"path": ":memory:", "query": {"castDurationToTime64": false}}"#).unwrap();
        assert!(config.is_in_memory());
        assert_eq!(config.query.cast_duration_to_time64, Some(false));
        assert!(!config.coercion_policy().duration_to_time_of_day);

        let config = DatabaseConfig::from_json(r#"{"path": ":memory:", "query": {}}"#).unwrap();
        assert_eq!(config.query.cast_duration_to_time64, None);
        assert!(config.coercion_policy().duration_to_time_of_day);

        let config = DatabaseConfig::from_json("{}").unwrap();
        assert_eq!(config, DatabaseConfig::in_memory());
    }

    #[test]
    fn test_unset_and_true_resolve_identically() {
        let unset = DatabaseConfig::in_memory();
        let explicit = DatabaseConfig::in_memory().with_cast_duration_to_time64(true);
        assert_eq!(unset.coercion_policy(), explicit.coercion_policy());
    }

    #[test]
    fn test_malformed_json_is_config_invalid() {
        let err = DatabaseConfig::from_json(r#"{"path": 3}"#).unwrap_err();
        assert!(matches!(err, EmbedSqlError::ConfigInvalid(_)));

        let err = DatabaseConfig::from_json(r#"{"query": {"castDurationToTime": true}}"#).unwrap_err();
        assert!(matches!(err, EmbedSqlError::ConfigInvalid(_)));
    }

    #[test]
    fn test_validate() {
        assert!(DatabaseConfig::in_memory().validate().is_ok());
        assert!(DatabaseConfig::new("/tmp/data.db").validate().is_ok());
        assert!(matches!(DatabaseConfig::new("").validate(), Err(EmbedSqlError::ConfigInvalid(_))));
        assert!(matches!(DatabaseConfig::new("   ").validate(), Err(EmbedSqlError::ConfigInvalid(_))));
        assert!(matches!(DatabaseConfig::new("a\0b").validate(), Err(EmbedSqlError::ConfigInvalid(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Config::parse_from([
            "embedsql",
            "--cast-duration-to-time64",
            "false",
            "SELECT 1",
        ]);
        let config = cli.database_config().unwrap();
        assert!(config.is_in_memory());
        assert_eq!(config.query.cast_duration_to_time64, Some(false));
        assert_eq!(cli.sql, vec!["SELECT 1".to_string()]);
    }
}
