//! CLI configuration
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! [engine]
//! strict = true
//! allow_anonymous_access = false
//!
//! [log]
//! json = false
//! filter = "formsync_core=debug"
//! ```

use std::path::{Path, PathBuf};

use formsync_core::EngineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Log output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// One JSON object per event instead of human-readable lines
    pub json: bool,
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: Option<String>,
}

/// Full CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Engine settings
    pub engine: EngineConfig,
    /// Log settings
    pub log: LogConfig,
}

impl CliConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration TOML
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Apply command-line overrides; flags only ever turn settings on
    #[must_use]
    pub fn with_overrides(mut self, strict: bool, log_json: bool) -> Self {
        if strict {
            self.engine = self.engine.with_strict(true);
        }
        if log_json {
            self.log.json = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(CliConfig::from_toml("").unwrap(), CliConfig::default());
    }

    #[test]
    fn parse_sections() {
        let config = CliConfig::from_toml(
            r#"
            [engine]
            strict = true

            [log]
            filter = "debug"
            "#,
        )
        .unwrap();
        assert!(config.engine.strict);
        assert!(!config.engine.allow_anonymous_access);
        assert_eq!(config.log.filter.as_deref(), Some("debug"));
        assert!(!config.log.json);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = CliConfig::from_toml("[engine]\nstrict = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = CliConfig::load(Path::new("/nonexistent/formsync.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn overrides_only_enable() {
        let config = CliConfig::default().with_overrides(true, false);
        assert!(config.engine.strict);
        assert!(!config.log.json);

        let strict = CliConfig::from_toml("[engine]\nstrict = true").unwrap();
        assert!(strict.with_overrides(false, false).engine.strict);
    }
}
