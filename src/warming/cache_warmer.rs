//! # External Cache Warming Routine
//!
//! The computation that actually rebuilds a team's cohort dependency cache is
//! owned elsewhere. This module defines the seam it plugs into and one
//! implementation that delegates to a PostgreSQL function.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use tracing::debug;

use crate::error::{Result, WarmerError};
use crate::validation::validate_sql_identifier;
use crate::TeamId;

/// Rebuilds the cohort dependency cache for one team
#[async_trait]
pub trait CacheWarmer: Send + Sync {
    /// Warm the cache for `team_id`. Errors are reported, never retried here.
    async fn warm_dependency_cache(&self, team_id: TeamId) -> anyhow::Result<()>;
}

/// SQL type of the warm function's team id parameter.
///
/// PostgreSQL has no implicit `bigint -> integer` cast, so the bound value
/// must match the declared argument type for the function to resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarmArgumentType {
    /// `INTEGER`, the team primary key type
    #[default]
    Integer,
    Bigint,
}

impl fmt::Display for WarmArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("INTEGER"),
            Self::Bigint => f.write_str("BIGINT"),
        }
    }
}

/// Warms a team by calling `SELECT <function>($1)` on the analytics database
#[derive(Debug, Clone)]
pub struct SqlFunctionCacheWarmer {
    pool: PgPool,
    statement: String,
    arg_type: WarmArgumentType,
}

impl SqlFunctionCacheWarmer {
    /// `function_name` must be a plain or schema-qualified SQL identifier
    pub fn new(pool: PgPool, function_name: &str, arg_type: WarmArgumentType) -> Result<Self> {
        validate_sql_identifier(function_name)
            .map_err(|e| WarmerError::validation("warm_function", e.to_string()))?;

        Ok(Self {
            pool,
            statement: format!("SELECT {function_name}($1::{arg_type})"),
            arg_type,
        })
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }
}

#[async_trait]
impl CacheWarmer for SqlFunctionCacheWarmer {
    async fn warm_dependency_cache(&self, team_id: TeamId) -> anyhow::Result<()> {
        debug!(team_id = team_id, statement = %self.statement, "Invoking cache warming function");

        let query = sqlx::query(&self.statement);
        let query = match self.arg_type {
            WarmArgumentType::Integer => {
                let team_id = i32::try_from(team_id).map_err(|_| {
                    anyhow::anyhow!("team id {team_id} does not fit an INTEGER argument")
                })?;
                query.bind(team_id)
            }
            WarmArgumentType::Bigint => query.bind(team_id),
        };
        query.execute(&self.pool).await?;

        Ok(())
    }
}
