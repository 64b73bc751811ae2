//! # Test Utilities
//!
//! Scriptable doubles for the crate's seams: the external warming routine,
//! the chain queue and the team store. Used by unit and integration tests.
//!
//! PostgreSQL-backed tests call [`postgres_test_pool`] and return early when
//! `DATABASE_URL` is unset.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::database::{InMemoryTeamStore, TeamStore};
use crate::error::{Result, WarmerError};
use crate::messaging::{ChainQueue, QueueError, SubmissionHandle, WarmingChain};
use crate::warming::CacheWarmer;
use crate::TeamId;

/// Warming routine that records calls and fails or panics for chosen teams
#[derive(Debug, Default)]
pub struct ScriptedCacheWarmer {
    failures: HashMap<TeamId, String>,
    panics: HashSet<TeamId>,
    delay: Option<Duration>,
    calls: Mutex<Vec<TeamId>>,
}

impl ScriptedCacheWarmer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, team_id: TeamId, message: impl Into<String>) -> Self {
        self.failures.insert(team_id, message.into());
        self
    }

    pub fn panicking_for(mut self, team_id: TeamId) -> Self {
        self.panics.insert(team_id);
        self
    }

    /// Sleep for `delay` before every call completes
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Team ids in invocation order
    pub fn calls(&self) -> Vec<TeamId> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CacheWarmer for ScriptedCacheWarmer {
    async fn warm_dependency_cache(&self, team_id: TeamId) -> anyhow::Result<()> {
        self.calls.lock().push(team_id);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panics.contains(&team_id) {
            panic!("scripted panic for team {team_id}");
        }
        match self.failures.get(&team_id) {
            Some(message) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

/// Queue that records submissions without executing them
#[derive(Debug, Default)]
pub struct RecordingChainQueue {
    failing_calls: HashSet<usize>,
    calls: AtomicUsize,
    submissions: Mutex<Vec<(WarmingChain, DateTime<Utc>)>>,
}

impl RecordingChainQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the given submissions, numbered from 1
    pub fn failing_calls(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.failing_calls.extend(calls);
        self
    }

    /// Accepted chains with their expiry, in submission order
    pub fn submissions(&self) -> Vec<(WarmingChain, DateTime<Utc>)> {
        self.submissions.lock().clone()
    }
}

#[async_trait]
impl ChainQueue for RecordingChainQueue {
    async fn submit(
        &self,
        chain: WarmingChain,
        expires_at: DateTime<Utc>,
    ) -> std::result::Result<SubmissionHandle, QueueError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_calls.contains(&call) {
            return Err(QueueError::broker("submit", "broker unavailable"));
        }

        let handle = SubmissionHandle {
            chain_id: chain.chain_id,
            submitted_at: Utc::now(),
            expires_at,
        };
        self.submissions.lock().push((chain, expires_at));
        Ok(handle)
    }
}

/// Team store that fails its first `failures` queries, then serves `inner`
#[derive(Debug)]
pub struct FailingTeamStore {
    failures: Option<usize>,
    attempts: AtomicUsize,
    inner: InMemoryTeamStore,
}

impl FailingTeamStore {
    /// Every query fails
    pub fn always() -> Self {
        Self {
            failures: None,
            attempts: AtomicUsize::new(0),
            inner: InMemoryTeamStore::new(),
        }
    }

    /// First `failures` queries fail; afterwards `team_ids` all qualify
    pub fn failing_first(failures: usize, team_ids: impl IntoIterator<Item = TeamId>) -> Self {
        Self {
            failures: Some(failures),
            attempts: AtomicUsize::new(0),
            inner: InMemoryTeamStore::with_teams(team_ids, i64::from(u16::MAX)),
        }
    }

    /// Queries received so far, failed or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TeamStore for FailingTeamStore {
    async fn fetch_qualifying_team_ids(
        &self,
        min_cohort_count: i64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TeamId>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let failing = self.failures.map_or(true, |failures| attempt <= failures);
        if failing {
            return Err(WarmerError::database(
                "fetch_qualifying_team_ids",
                "connection refused",
            ));
        }
        self.inner
            .fetch_qualifying_team_ids(min_cohort_count, offset, limit)
            .await
    }
}

const TEAM_SCHEMA_FIXTURE: &str =
    include_str!("../tests/fixtures/migrations/20240101000000_create_team_and_cohort.sql");

/// Pool on a fresh schema holding the team and cohort tables, or `None` when
/// `DATABASE_URL` is unset
pub async fn postgres_test_pool() -> Result<Option<PgPool>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };
    let schema = format!("cohort_warming_test_{}", uuid::Uuid::new_v4().simple());

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;
    admin
        .execute(format!("CREATE SCHEMA {schema}").as_str())
        .await?;
    admin.close().await;

    let search_path = format!("SET search_path TO {schema}");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                conn.execute(search_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&database_url)
        .await?;

    sqlx::raw_sql(TEAM_SCHEMA_FIXTURE).execute(&pool).await?;

    Ok(Some(pool))
}
