//! Runtime configuration for front ends embedding the core.
//!
//! # Invariants
//! - Missing keys fall back to [`WordbookConfig::default`] values.
//! - A loaded config always carries a supported log level.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE_NAME: &str = "wordbook.sqlite3";

/// Store and logging settings, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordbookConfig {
    /// SQLite file holding the dictionary.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for WordbookConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

impl WordbookConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates config JSON.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Normalizes the log level and checks path fields.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let level = normalize_level(&self.log_level)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        self.log_level = level.to_string();

        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WordbookConfig, DEFAULT_DB_FILE_NAME};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn empty_object_uses_defaults() {
        let config = WordbookConfig::from_json("{}").unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE_NAME));
        assert_eq!(config.log_dir, None);
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn log_level_is_normalized_and_checked() {
        let config = WordbookConfig::from_json(r#"{"log_level": "WARNING"}"#).unwrap();
        assert_eq!(config.log_level, "warn");

        let err = WordbookConfig::from_json(r#"{"log_level": "chatty"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = WordbookConfig::from_json(r#"{"log_dir": "logs"}"#).unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn load_reads_file_and_reports_path_on_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"db_path": "/tmp/words.db", "log_level": "debug"}}"#).unwrap();
        let config = WordbookConfig::load(file.path()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/words.db"));
        assert_eq!(config.log_level, "debug");

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "not json").unwrap();
        match WordbookConfig::load(broken.path()).unwrap_err() {
            ConfigError::Parse { path, .. } => assert_eq!(path, broken.path()),
            other => panic!("unexpected error: {other}"),
        }

        let missing = WordbookConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
