//! Contact book configuration.
//!
//! Read from JSON, e.g.
//!
//! ```json
//! {
//!   "storage": { "kind": "file", "path": "/home/me/.rolodex/book.sqlite3" },
//!   "log_level": "info",
//!   "log_dir": "/home/me/.rolodex/logs"
//! }
//! ```
//!
//! `log_level` defaults to [`default_log_level`]; logging stays off when
//! `log_dir` is absent.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{default_log_level, init_logging, normalize_level, normalize_log_dir, LoggingError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Where the contact book lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageLocation {
    File { path: PathBuf },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    pub storage: StorageLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    Db(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create database directory `{}`: {source}",
                path.display()
            ),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Invalid(value.to_string())
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl ManagerConfig {
    /// In-memory book without logging.
    pub fn in_memory() -> Self {
        Self {
            storage: StorageLocation::Memory,
            log_level: None,
            log_dir: None,
        }
    }

    /// File-backed book without logging.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageLocation::File { path: path.into() },
            log_level: None,
            log_dir: None,
        }
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let StorageLocation::File { path } = &self.storage {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "storage.path cannot be empty".to_string(),
                ));
            }
        }
        normalize_level(self.effective_log_level())?;
        if let Some(log_dir) = &self.log_dir {
            normalize_log_dir(log_dir)?;
        }
        Ok(())
    }

    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Starts logging when `log_dir` is configured.
    ///
    /// Returns whether logging was requested.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(log_dir) => {
                init_logging(self.effective_log_level(), log_dir)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Opens the configured database with migrations applied.
    ///
    /// Creates missing parent directories of a file database.
    pub fn open_connection(&self) -> Result<Connection, ConfigError> {
        let conn = match &self.storage {
            StorageLocation::File { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        ConfigError::CreateDirectory {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
                open_db(path)?
            }
            StorageLocation::Memory => open_db_in_memory()?,
        };
        Ok(conn)
    }
}
