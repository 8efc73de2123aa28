//! esrun configuration file.
//!
//! A single TOML file holds the connection parameters and the retrieval
//! settings:
//!
//! ```toml
//! [connection]
//! url = "http://localhost:9200"
//! api_key = "..."
//!
//! [retrieve]
//! index = "msmarco-passage"
//! fields = ["title", "body"]
//! num_results = 100
//! verbose = true
//!
//! [retrieve.columns]
//! "meta.title" = "title"
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use es_retrieve::{ConnectionParams, RetrieveConfig};
use serde::{Deserialize, Serialize};

use crate::error::{EsrunError, Result};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "ESRUN_CONFIG";

/// Environment variable overriding the directory the default config file lives in.
pub const CONFIG_DIR_ENV: &str = "ESRUN_CONFIG_DIR";

/// Directory holding `config.toml`: `$ESRUN_CONFIG_DIR` if set, otherwise
/// `dirs::config_dir()/esrun`, otherwise the working directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    resolve_config_dir(std::env::var_os(CONFIG_DIR_ENV), dirs::config_dir())
}

fn resolve_config_dir(override_dir: Option<OsString>, platform_dir: Option<PathBuf>) -> PathBuf {
    match (override_dir, platform_dir) {
        (Some(dir), _) if !dir.is_empty() => PathBuf::from(dir),
        (_, Some(dir)) => dir.join("esrun"),
        _ => PathBuf::from("."),
    }
}

/// Everything esrun needs to build a retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsrunConfig {
    /// How to reach the cluster.
    #[serde(default)]
    pub connection: ConnectionParams,
    /// What to search and how to shape results.
    pub retrieve: RetrieveConfig,
}

impl EsrunConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing connection fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EsrunError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            EsrunError::Config(msg) => {
                EsrunError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EsrunError::Config`] if the text is not valid TOML for this
    /// schema or the retrieval settings are invalid.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EsrunError::Config(e.to_string()))?;
        config
            .retrieve
            .validate()
            .map_err(|e| EsrunError::Config(e.to_string()))?;
        Ok(config)
    }

    /// The config file read when neither `--config` nor `ESRUN_CONFIG` is given.
    pub fn default_config_path() -> PathBuf {
        config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [connection]
        url = "https://es.internal:9243"
        username = "reader"
        password = "pw"

        [retrieve]
        index = "robust04"
        fields = ["title", "text"]
        num_results = 1000

        [retrieve.columns]
        "meta.title" = "title"
        "meta.date" = "date"
    "#;

    #[test]
    fn parses_full_config() {
        let config = EsrunConfig::from_toml(SAMPLE).expect("parse");
        assert_eq!(config.connection.url, "https://es.internal:9243");
        assert_eq!(config.connection.username.as_deref(), Some("reader"));
        assert_eq!(config.retrieve.index, "robust04");
        assert_eq!(config.retrieve.num_results, Some(1000));
        assert_eq!(
            config.retrieve.columns.destinations().collect::<Vec<_>>(),
            ["title", "date"]
        );
    }

    #[test]
    fn connection_defaults_when_omitted() {
        let config =
            EsrunConfig::from_toml("[retrieve]\nindex = \"docs\"\nfields = [\"body\"]").expect("parse");
        assert_eq!(config.connection, ConnectionParams::default());
        assert!(!config.retrieve.verbose);
    }

    #[test]
    fn invalid_retrieve_settings_rejected() {
        let err = EsrunConfig::from_toml("[retrieve]\nindex = \"docs\"\nfields = []").unwrap_err();
        assert!(err.to_string().contains("field"));
    }

    #[test]
    fn invalid_toml_rejected() {
        let err = EsrunConfig::from_toml("this is not valid toml {{{").unwrap_err();
        assert!(matches!(err, EsrunError::Config(_)));
    }

    #[test]
    fn from_file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("esrun.toml");
        std::fs::write(&path, SAMPLE).expect("write");
        let config = EsrunConfig::from_file(&path).expect("load");
        assert_eq!(config.retrieve.fields, ["title", "text"]);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = EsrunConfig::from_file(Path::new("/nonexistent/path/esrun.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn config_dir_override_wins() {
        let dir = resolve_config_dir(
            Some(OsString::from("/srv/esrun")),
            Some(PathBuf::from("/home/u/.config")),
        );
        assert_eq!(dir, PathBuf::from("/srv/esrun"));
    }

    #[test]
    fn empty_override_falls_back_to_platform_dir() {
        let dir = resolve_config_dir(Some(OsString::new()), Some(PathBuf::from("/home/u/.config")));
        assert_eq!(dir, PathBuf::from("/home/u/.config/esrun"));
    }

    #[test]
    fn no_platform_dir_uses_working_directory() {
        assert_eq!(resolve_config_dir(None, None), PathBuf::from("."));
    }
}
