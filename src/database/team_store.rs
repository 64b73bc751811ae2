//! # Team Store
//!
//! Read-only access to the teams whose non-deleted cohort count meets the
//! warming threshold. Results are ordered by team id so that offset paging is
//! a stable partition of the qualifying set while the store is quiescent.
//!
//! The team key is `INTEGER` in the analytics schema; it is widened to
//! `BIGINT` in the query so it always decodes as [`TeamId`].

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::{debug, error};

use crate::constants::tables;
use crate::error::{Result, WarmerError};
use crate::TeamId;

/// Source of qualifying team ids
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Team ids with at least `min_cohort_count` non-deleted cohorts, ascending,
    /// skipping `offset` rows and returning at most `limit`.
    async fn fetch_qualifying_team_ids(
        &self,
        min_cohort_count: i64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TeamId>>;
}

/// PostgreSQL-backed team store over the team and cohort tables
#[derive(Debug, Clone)]
pub struct PgTeamStore {
    pool: PgPool,
    query: String,
}

impl PgTeamStore {
    pub fn new(pool: PgPool) -> Self {
        let query = format!(
            r#"
            SELECT t.id::BIGINT AS id
            FROM {team} t
            INNER JOIN {cohort} c ON c.team_id = t.id
            WHERE c.deleted = FALSE
            GROUP BY t.id
            HAVING COUNT(c.id) >= $1
            ORDER BY t.id ASC
            LIMIT $2 OFFSET $3
            "#,
            team = tables::TEAM,
            cohort = tables::COHORT,
        );

        Self { pool, query }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TeamStore for PgTeamStore {
    async fn fetch_qualifying_team_ids(
        &self,
        min_cohort_count: i64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TeamId>> {
        let start = Instant::now();

        let team_ids: Vec<TeamId> = sqlx::query_scalar(&self.query)
            .bind(min_cohort_count)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(offset = offset, limit = limit, error = %e, "Failed to fetch qualifying teams");
                WarmerError::database("fetch_qualifying_team_ids", e.to_string())
            })?;

        debug!(
            offset = offset,
            limit = limit,
            rows = team_ids.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched qualifying teams"
        );

        Ok(team_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::postgres_test_pool;

    async fn seed_team(pool: &PgPool, team_id: i32, active: i32, deleted: i32) {
        sqlx::query("INSERT INTO posthog_team (id, name) VALUES ($1, $2)")
            .bind(team_id)
            .bind(format!("Team {team_id}"))
            .execute(pool)
            .await
            .unwrap();
        for (count, is_deleted) in [(active, false), (deleted, true)] {
            sqlx::query(
                "INSERT INTO posthog_cohort (team_id, name, deleted) \
                 SELECT $1, 'Cohort ' || g, $2 FROM generate_series(1, $3) g",
            )
            .bind(team_id)
            .bind(is_deleted)
            .bind(count)
            .execute(pool)
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_query_widens_integer_team_key() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap();
        let store = PgTeamStore::new(pool);

        assert!(store.query.contains("SELECT t.id::BIGINT AS id"));
        assert!(store.query.contains("HAVING COUNT(c.id) >= $1"));
        assert!(store.query.contains("ORDER BY t.id ASC"));
    }

    #[tokio::test]
    async fn test_integer_team_keys_decode() {
        let Some(pool) = postgres_test_pool().await.unwrap() else {
            return;
        };
        seed_team(&pool, 1, 50, 0).await;

        let store = PgTeamStore::new(pool);
        let teams = store.fetch_qualifying_team_ids(50, 0, 100).await.unwrap();

        assert_eq!(teams, vec![1]);
    }

    #[tokio::test]
    async fn test_threshold_and_deleted_cohorts() {
        let Some(pool) = postgres_test_pool().await.unwrap() else {
            return;
        };
        seed_team(&pool, 1, 49, 0).await;
        seed_team(&pool, 2, 50, 0).await;
        seed_team(&pool, 3, 45, 10).await;
        seed_team(&pool, 4, 75, 3).await;
        // One short of the threshold; its deleted cohorts must not tip it over
        seed_team(&pool, 5, 49, 1).await;

        let store = PgTeamStore::new(pool);
        let teams = store.fetch_qualifying_team_ids(50, 0, 100).await.unwrap();

        assert_eq!(teams, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_offset_paging_is_ordered() {
        let Some(pool) = postgres_test_pool().await.unwrap() else {
            return;
        };
        for team_id in [5, 1, 3, 2, 4] {
            seed_team(&pool, team_id, 50, 0).await;
        }

        let store = PgTeamStore::new(pool);
        assert_eq!(store.fetch_qualifying_team_ids(50, 0, 2).await.unwrap(), vec![1, 2]);
        assert_eq!(store.fetch_qualifying_team_ids(50, 2, 2).await.unwrap(), vec![3, 4]);
        assert_eq!(store.fetch_qualifying_team_ids(50, 4, 2).await.unwrap(), vec![5]);
        assert!(store.fetch_qualifying_team_ids(50, 6, 2).await.unwrap().is_empty());
    }
}
