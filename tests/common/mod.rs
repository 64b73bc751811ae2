#![allow(dead_code)]

pub mod strategies;

use std::sync::Arc;

use cohort_cache_warmer::config::{CohortWarmingConfig, QueueConfig};
use cohort_cache_warmer::database::InMemoryTeamStore;
use cohort_cache_warmer::execution::ChainWorker;
use cohort_cache_warmer::messaging::LocalChainQueue;
use cohort_cache_warmer::metrics::AtomicGauge;
use cohort_cache_warmer::orchestration::CacheWarmingOrchestrator;
use cohort_cache_warmer::test_utils::ScriptedCacheWarmer;
use cohort_cache_warmer::warming::TeamWarmer;

/// Everything wired together in process, with handles kept for assertions
pub struct Harness {
    pub store: Arc<InMemoryTeamStore>,
    pub routine: Arc<ScriptedCacheWarmer>,
    pub gauge: Arc<AtomicGauge>,
    pub queue: Arc<LocalChainQueue>,
    pub orchestrator: CacheWarmingOrchestrator,
}

pub fn config(page_size: usize, batch_size: usize) -> CohortWarmingConfig {
    let mut config = CohortWarmingConfig::default();
    config.warming.page_size = page_size;
    config.warming.batch_size = batch_size;
    config.queue = QueueConfig {
        max_concurrent_chains: 2,
        max_pending_chains: 1_000,
    };
    config
}

pub fn harness(
    store: InMemoryTeamStore,
    routine: ScriptedCacheWarmer,
    config: &CohortWarmingConfig,
) -> Harness {
    let store = Arc::new(store);
    let routine = Arc::new(routine);
    let gauge = Arc::new(AtomicGauge::new());
    let worker = ChainWorker::new(TeamWarmer::new(routine.clone()), gauge.clone());
    let queue = Arc::new(LocalChainQueue::new(worker, &config.queue));
    let orchestrator =
        CacheWarmingOrchestrator::new(store.clone(), queue.clone(), gauge.clone(), config)
            .expect("valid test configuration");

    Harness {
        store,
        routine,
        gauge,
        queue,
        orchestrator,
    }
}
