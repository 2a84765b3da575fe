//! Catalog runtime configuration.
//!
//! # Responsibility
//! - Hold storage, logging and deletion-policy settings for one process.
//! - Load settings from `CATALOG_*` environment variables.
//!
//! # Invariants
//! - Unset variables fall back to `CatalogConfig::default()` values.
//! - Unknown policy or level values are rejected, never silently defaulted.

use crate::error::{CatalogError, CatalogResult};
use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CATALOG_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CATALOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CATALOG_LOG_DIR";
pub const ENV_PERSONNE_DELETE_POLICY: &str = "CATALOG_PERSONNE_DELETE_POLICY";

/// What deleting a Personne does to the Food records they own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonneDeletePolicy {
    /// Delete owned Food (with associations and images) in the same transaction.
    #[default]
    Cascade,
    /// Refuse with `HasDependents` while any Food is owned.
    Reject,
}

impl PersonneDeletePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cascade" => Some(Self::Cascade),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Settings for one catalog process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// SQLite file; `None` opens an in-memory catalog.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    pub personne_delete_policy: PersonneDeletePolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            personne_delete_policy: PersonneDeletePolicy::default(),
        }
    }
}

impl CatalogConfig {
    /// Reads `CATALOG_*` variables from the process environment.
    pub fn from_env() -> CatalogResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup (environment, `.env` map, tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CatalogResult<Self> {
        let mut config = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            let level = level.trim().to_ascii_lowercase();
            if !matches!(
                level.as_str(),
                "trace" | "debug" | "info" | "warn" | "warning" | "error"
            ) {
                return Err(CatalogError::validation(
                    "log_level",
                    "expected trace|debug|info|warn|error",
                ));
            }
            config.log_level = level;
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(policy) = non_blank(ENV_PERSONNE_DELETE_POLICY) {
            config.personne_delete_policy =
                PersonneDeletePolicy::parse(&policy).ok_or_else(|| {
                    CatalogError::invalid_enum("personne_delete_policy", &policy)
                })?;
        }

        Ok(config)
    }
}
