//! # Cohort Warming Configuration
//!
//! Process-wide configuration, static after startup. Values come from a TOML
//! base file, an optional per-environment override file and finally
//! `COHORT_WARMING__SECTION__KEY` environment variables. Every key has a
//! default, so an empty configuration directory is a valid deployment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cohort_cache_warmer::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let page_size = manager.config().warming.page_size;
//! let backoff = manager.config().retry.backoff();
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_CONCURRENT_CHAINS, DEFAULT_MAX_PENDING_CHAINS,
    DEFAULT_MIN_COHORT_COUNT, DEFAULT_PAGE_SIZE, DEFAULT_RUN_MAX_RETRIES,
    DEFAULT_RUN_RETRY_BACKOFF, DEFAULT_TEAM_WARM_MAX_RETRIES, DEFAULT_WARM_FUNCTION,
};
use crate::error::{Result, WarmerError};
use crate::validation::validate_sql_identifier;
use crate::warming::WarmArgumentType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use loader::ConfigManager;

/// Root configuration structure mirroring `cohort-warming.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CohortWarmingConfig {
    /// Selection, batching and per-team settings
    pub warming: WarmingConfig,

    /// Outer retry policy for a whole run
    pub retry: RunRetryConfig,

    /// Local chain queue settings
    pub queue: QueueConfig,

    /// Team store connection settings
    pub database: DatabaseConfig,

    /// Metrics export settings
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WarmingConfig {
    /// Teams fetched per store query
    pub page_size: usize,
    /// Teams per chain
    pub batch_size: usize,
    /// Minimum non-deleted cohort count for a team to qualify
    pub min_cohort_count: i64,
    /// Declared per-team retry budget. Not consulted by the team warmer.
    pub team_warm_max_retries: u32,
}

impl Default for WarmingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            min_cohort_count: DEFAULT_MIN_COHORT_COUNT,
            team_warm_max_retries: DEFAULT_TEAM_WARM_MAX_RETRIES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RunRetryConfig {
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub backoff_seconds: u64,
}

impl Default for RunRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_RUN_MAX_RETRIES,
            backoff_seconds: DEFAULT_RUN_RETRY_BACKOFF.as_secs(),
        }
    }
}

impl RunRetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    /// Chains executing concurrently
    pub max_concurrent_chains: usize,
    /// Accepted chains not yet finished; submissions beyond this are rejected
    pub max_pending_chains: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent_chains: DEFAULT_MAX_CONCURRENT_CHAINS,
            max_pending_chains: DEFAULT_MAX_PENDING_CHAINS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; falls back to `DATABASE_URL` when unset
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    /// PostgreSQL function that warms one team's cache
    pub warm_function: String,
    /// SQL type of the warm function's single argument
    pub warm_function_arg_type: WarmArgumentType,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout_seconds: 30,
            warm_function: DEFAULT_WARM_FUNCTION.to_string(),
            warm_function_arg_type: WarmArgumentType::default(),
        }
    }
}

impl DatabaseConfig {
    /// Resolve the connection URL from configuration or the environment
    pub fn database_url(&self) -> Result<String> {
        if let Some(url) = self.url.as_ref().filter(|url| !url.trim().is_empty()) {
            return Ok(url.clone());
        }
        std::env::var("DATABASE_URL").map_err(|_| {
            WarmerError::configuration("database.url is not set and DATABASE_URL is missing")
        })
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    /// Register the active-chains gauge with Prometheus
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CohortWarmingConfig {
    /// Reject values that would make a run loop forever or never schedule work
    pub fn validate(&self) -> Result<()> {
        if self.warming.page_size == 0 {
            return Err(WarmerError::validation(
                "warming.page_size",
                "must be greater than zero",
            ));
        }
        if self.warming.batch_size == 0 {
            return Err(WarmerError::validation(
                "warming.batch_size",
                "must be greater than zero",
            ));
        }
        if self.warming.min_cohort_count < 0 {
            return Err(WarmerError::validation(
                "warming.min_cohort_count",
                "must not be negative",
            ));
        }
        if self.queue.max_concurrent_chains == 0 {
            return Err(WarmerError::validation(
                "queue.max_concurrent_chains",
                "must be greater than zero",
            ));
        }
        if self.queue.max_pending_chains == 0 {
            return Err(WarmerError::validation(
                "queue.max_pending_chains",
                "must be greater than zero",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(WarmerError::validation(
                "database.max_connections",
                "must be greater than zero",
            ));
        }
        validate_sql_identifier(&self.database.warm_function)
            .map_err(|e| WarmerError::validation("database.warm_function", e.to_string()))?;
        Ok(())
    }
}
