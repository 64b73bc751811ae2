//! In-memory team store for local runs and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::team_store::TeamStore;
use crate::error::Result;
use crate::TeamId;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CohortCounts {
    active: i64,
    deleted: i64,
}

/// Team and cohort records held in process, queried like the relational store
#[derive(Debug, Default)]
pub struct InMemoryTeamStore {
    teams: RwLock<BTreeMap<TeamId, CohortCounts>>,
    queries: AtomicUsize,
}

impl InMemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) a team with the given active and deleted cohort counts
    pub fn insert_team(&self, team_id: TeamId, active_cohorts: i64, deleted_cohorts: i64) {
        self.teams.write().insert(
            team_id,
            CohortCounts {
                active: active_cohorts,
                deleted: deleted_cohorts,
            },
        );
    }

    /// Store pre-populated with `team_ids`, each holding `active_cohorts` live cohorts
    pub fn with_teams(team_ids: impl IntoIterator<Item = TeamId>, active_cohorts: i64) -> Self {
        let store = Self::new();
        for team_id in team_ids {
            store.insert_team(team_id, active_cohorts, 0);
        }
        store
    }

    /// Mark `count` of a team's live cohorts as deleted
    pub fn delete_cohorts(&self, team_id: TeamId, count: i64) {
        if let Some(counts) = self.teams.write().get_mut(&team_id) {
            let moved = count.min(counts.active);
            counts.active -= moved;
            counts.deleted += moved;
        }
    }

    /// Number of page queries served
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Acquire)
    }
}

#[async_trait]
impl TeamStore for InMemoryTeamStore {
    async fn fetch_qualifying_team_ids(
        &self,
        min_cohort_count: i64,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TeamId>> {
        self.queries.fetch_add(1, Ordering::AcqRel);

        // Teams without any live cohort never appear, matching the inner join
        Ok(self
            .teams
            .read()
            .iter()
            .filter(|(_, counts)| counts.active > 0 && counts.active >= min_cohort_count)
            .map(|(team_id, _)| *team_id)
            .skip(offset)
            .take(limit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_threshold_boundary() {
        let store = InMemoryTeamStore::new();
        store.insert_team(1, 49, 0);
        store.insert_team(2, 50, 0);
        store.insert_team(3, 75, 0);
        store.insert_team(4, 0, 0);

        let teams = store.fetch_qualifying_team_ids(50, 0, 100).await.unwrap();
        assert_eq!(teams, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_deleted_cohorts_do_not_count() {
        let store = InMemoryTeamStore::new();
        store.insert_team(1, 50, 10);
        store.insert_team(2, 45, 10);

        let teams = store.fetch_qualifying_team_ids(50, 0, 100).await.unwrap();
        assert_eq!(teams, vec![1]);

        store.delete_cohorts(1, 1);
        let teams = store.fetch_qualifying_team_ids(50, 0, 100).await.unwrap();
        assert!(teams.is_empty());
    }

    #[tokio::test]
    async fn test_offset_and_limit_are_ordered() {
        let store = InMemoryTeamStore::with_teams([5, 1, 3, 2, 4], 50);

        assert_eq!(store.fetch_qualifying_team_ids(50, 0, 2).await.unwrap(), vec![1, 2]);
        assert_eq!(store.fetch_qualifying_team_ids(50, 2, 2).await.unwrap(), vec![3, 4]);
        assert_eq!(store.fetch_qualifying_team_ids(50, 4, 2).await.unwrap(), vec![5]);
        assert_eq!(store.queries(), 3);
    }
}
