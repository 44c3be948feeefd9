//! Application configuration.
//!
//! # Responsibility
//! - Load front-end settings from an optional JSON file.
//! - Provide defaults for every field so a missing file is not an error.
//!
//! # Invariants
//! - Unknown fields are rejected to surface typos early.
//! - `board_key` is never empty after loading.

use crate::logging::default_log_level;
use crate::share::ShareLocale;
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_BOARD_KEY: &str = "default";
const DEFAULT_DB_FILE_NAME: &str = "bingo.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
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

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Namespace of the persisted board entries.
    pub board_key: String,
    pub locale: ShareLocale,
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Title shown on the card; defaults to the current year's bingo.
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// Token `bingo serve` expects from admin clients; writes are refused
    /// over HTTP when unset.
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            board_key: DEFAULT_BOARD_KEY.to_string(),
            locale: ShareLocale::default(),
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            title: None,
            subtitle: None,
            admin_token: None,
        }
    }
}

impl AppConfig {
    /// Loads `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        info!(
            "event=config_load module=config status=ok path={} board_key={}",
            path.display(),
            config.board_key
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.board_key = config.board_key.trim().to_string();
        if config.board_key.is_empty() {
            return Err(ConfigError::Invalid("board_key cannot be empty".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use crate::share::ShareLocale;
    use std::io::Write;

    #[test]
    fn missing_path_yields_defaults() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.board_key, "default");
    }

    #[test]
    fn partial_file_overrides_some_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"board_key": " bingo-2025 ", "locale": "fr"}}"#).unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.board_key, "bingo-2025");
        assert_eq!(config.locale, ShareLocale::Fr);
        assert_eq!(config.db_path, AppConfig::default().db_path);
        assert_eq!(config.admin_token, None);
    }

    #[test]
    fn unknown_fields_and_blank_keys_are_rejected() {
        assert!(matches!(
            AppConfig::from_json(r#"{"boardkey": "x"}"#),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{"board_key": "  "}"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
