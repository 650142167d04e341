//! Configuration structures for the tender dashboard.

use crate::error::{Error, Result};
use crate::types::BucketingMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides the database path.
pub const DB_PATH_ENV: &str = "TENDLY_DB_PATH";

/// Largest bucket count the cost distribution accepts.
pub const MAX_BUCKET_COUNT: usize = 10_000;

/// Main configuration for the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Query cache configuration.
    pub cache: CacheConfig,
    /// Cost distribution configuration.
    pub distribution: DistributionConfig,
    /// Dashboard panel configuration.
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.trim().is_empty() {
                self.database.path = path;
            }
        }
        self
    }

    /// Check the configuration for values the dashboard cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.distribution.bucket_count == 0 {
            return Err(Error::invalid_configuration(
                "distribution.bucket_count must be positive",
            ));
        }
        if self.distribution.bucket_count > MAX_BUCKET_COUNT {
            return Err(Error::invalid_configuration(format!(
                "distribution.bucket_count must be at most {MAX_BUCKET_COUNT}"
            )));
        }
        if !is_sql_identifier(&self.database.table) {
            return Err(Error::invalid_configuration(format!(
                "database.table '{}' is not a valid table name",
                self.database.table
            )));
        }
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(Error::invalid_configuration(
                "cache.ttl_seconds must be positive when the cache is enabled",
            ));
        }
        Ok(())
    }
}

/// Check that a name is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Table holding tender details.
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "tenders.db".to_string(),
            table: "estonian_tender_details".to_string(),
        }
    }
}

/// Query cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether query results are cached.
    pub enabled: bool,
    /// Time-to-live for cached results in seconds.
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 600,
        }
    }
}

/// Cost distribution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Number of buckets.
    pub bucket_count: usize,
    /// Edge spacing.
    pub mode: BucketingMode,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            bucket_count: 50,
            mode: BucketingMode::Logarithmic,
        }
    }
}

/// Dashboard panel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Number of categories in the top-categories panel.
    pub top_categories: usize,
    /// Number of rows in the recent-tenders table.
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_categories: 10,
            recent_limit: 20,
        }
    }
}
