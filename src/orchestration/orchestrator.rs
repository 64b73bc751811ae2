//! # Cache Warming Orchestrator
//!
//! Top-level entry point for one warming run. Pages through qualifying teams,
//! partitions each page into batches and submits one chain per batch,
//! aggregating the counts into a [`RunSummary`].
//!
//! ## Failure isolation
//!
//! - A rejected chain counts its teams in `failed_teams`; the run continues.
//! - A failing team is handled inside its chain and never seen here.
//! - A store failure aborts the run. [`CacheWarmingOrchestrator::run`] retries
//!   the whole run through its [`RetryPolicy`] and surfaces the error once
//!   the budget is spent; no summary is produced for an aborted run.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cohort_cache_warmer::config::CohortWarmingConfig;
//! use cohort_cache_warmer::database::InMemoryTeamStore;
//! use cohort_cache_warmer::execution::ChainWorker;
//! use cohort_cache_warmer::messaging::LocalChainQueue;
//! use cohort_cache_warmer::metrics::{AtomicGauge, ProgressGauge};
//! use cohort_cache_warmer::orchestration::CacheWarmingOrchestrator;
//! use cohort_cache_warmer::warming::{CacheWarmer, TeamWarmer};
//! use std::sync::Arc;
//!
//! # async fn example(routine: Arc<dyn CacheWarmer>) -> cohort_cache_warmer::Result<()> {
//! let config = CohortWarmingConfig::default();
//! let gauge: Arc<dyn ProgressGauge> = Arc::new(AtomicGauge::new());
//! let worker = ChainWorker::new(TeamWarmer::new(routine), gauge.clone());
//! let queue = Arc::new(LocalChainQueue::new(worker, &config.queue));
//! let store = Arc::new(InMemoryTeamStore::with_teams(1..=75, 50));
//!
//! let orchestrator = CacheWarmingOrchestrator::new(store, queue.clone(), gauge, &config)?;
//! let summary = orchestrator.run().await?;
//! println!("scheduled {} teams", summary.teams_scheduled);
//! queue.drain().await;
//! # Ok(())
//! # }
//! ```

use futures::TryStreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::batch_partitioner::BatchPartitioner;
use super::chain_scheduler::{ChainScheduler, ScheduleOutcome};
use super::team_selector::TeamSelector;
use super::types::{OrchestratorState, RunStatus, RunSummary};
use crate::config::CohortWarmingConfig;
use crate::database::TeamStore;
use crate::error::Result;
use crate::logging::log_error;
use crate::messaging::ChainQueue;
use crate::metrics::ProgressGauge;
use crate::resilience::RetryPolicy;

pub struct CacheWarmingOrchestrator {
    selector: TeamSelector,
    partitioner: BatchPartitioner,
    scheduler: ChainScheduler,
    page_size: usize,
    retry_policy: RetryPolicy,
    state: Mutex<OrchestratorState>,
}

impl CacheWarmingOrchestrator {
    /// Build an orchestrator from process configuration
    pub fn new(
        store: Arc<dyn TeamStore>,
        queue: Arc<dyn ChainQueue>,
        gauge: Arc<dyn ProgressGauge>,
        config: &CohortWarmingConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            selector: TeamSelector::new(store, config.warming.min_cohort_count),
            partitioner: BatchPartitioner::new(config.warming.batch_size)?,
            scheduler: ChainScheduler::new(queue, gauge),
            page_size: config.warming.page_size,
            retry_policy: RetryPolicy::from_config(&config.retry),
            state: Mutex::new(OrchestratorState::Start),
        })
    }

    pub fn current_state(&self) -> OrchestratorState {
        *self.state.lock()
    }

    /// Run once, retrying the whole run on store failure per the retry policy
    pub async fn run(&self) -> Result<RunSummary> {
        self.retry_policy
            .execute("warm_cohort_dependencies_cache_for_all_teams", || {
                self.run_once()
            })
            .await
    }

    /// A single attempt: select, partition and schedule every qualifying team
    #[instrument(skip(self), fields(page_size = self.page_size, batch_size = self.partitioner.batch_size()))]
    pub async fn run_once(&self) -> Result<RunSummary> {
        self.reset();

        let mut teams_found = 0usize;
        let mut teams_scheduled = 0usize;
        let mut failed_teams = 0usize;
        let mut teams_pages_processed = 0usize;

        info!(
            page_size = self.page_size,
            min_cohorts = self.selector.min_cohort_count(),
            "Warming cohort dependencies cache"
        );

        self.transition(OrchestratorState::SelectingPages);
        let pages = self.selector.select_pages(self.page_size).into_stream();
        futures::pin_mut!(pages);

        loop {
            let page = match pages.try_next().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    self.transition(OrchestratorState::Failed);
                    log_error(
                        "orchestrator",
                        "select_pages",
                        &e.to_string(),
                        Some("Failure in cohort cache warming batch task"),
                    );
                    return Err(e);
                }
            };

            teams_pages_processed += 1;
            if page.is_empty() {
                continue;
            }
            teams_found += page.len();

            debug!(
                page = teams_pages_processed,
                total_teams_found = teams_found,
                teams_in_page = page.len(),
                "Processing page of teams for cohort cache warming"
            );

            self.transition(OrchestratorState::PartitioningBatches);
            let batches = self.partitioner.partition(&page);

            self.transition(OrchestratorState::SchedulingChains);
            for batch in batches {
                match self.scheduler.schedule(batch).await {
                    ScheduleOutcome::Scheduled { count, .. } => teams_scheduled += count,
                    ScheduleOutcome::Failed { count, .. } => failed_teams += count,
                }
            }

            self.transition(OrchestratorState::SelectingPages);
        }

        self.transition(OrchestratorState::Completed);

        let summary = RunSummary {
            status: RunStatus::Success,
            teams_found,
            teams_scheduled,
            failed_teams,
            teams_pages_processed,
        };

        info!(
            teams_found = summary.teams_found,
            teams_scheduled = summary.teams_scheduled,
            failed_teams = summary.failed_teams,
            pages = summary.teams_pages_processed,
            "Cohort cache warming completed"
        );

        Ok(summary)
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        if *state != OrchestratorState::Start {
            *state = OrchestratorState::Start;
        }
    }

    fn transition(&self, next: OrchestratorState) {
        let mut state = self.state.lock();
        if !state.can_transition_to(next) {
            error!(from = %*state, to = %next, "Unexpected orchestrator state transition");
        }
        debug!(from = %*state, to = %next, "Orchestrator state transition");
        *state = next;
    }
}
