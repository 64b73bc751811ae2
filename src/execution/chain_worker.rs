//! # Chain Worker
//!
//! Worker-side execution of a [`WarmingChain`]. Steps run one after another;
//! a failed warm is recorded and the next step still runs, so the terminal
//! decrement step always executes once the chain has started.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::messaging::{ChainStep, WarmingChain};
use crate::metrics::ProgressGauge;
use crate::warming::{TeamWarmer, WarmResult};

/// What happened to one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainReport {
    pub chain_id: Uuid,
    /// Per-team results in execution order
    pub results: Vec<WarmResult>,
    /// The chain's expiry passed before it started; no step ran
    pub expired: bool,
    pub gauge_decremented: bool,
    pub duration_ms: u64,
}

impl ChainReport {
    pub fn expired(chain_id: Uuid) -> Self {
        Self {
            chain_id,
            results: Vec::new(),
            expired: true,
            gauge_decremented: false,
            duration_ms: 0,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Executes chain steps against the team warmer and the active-chains gauge
#[derive(Debug, Clone)]
pub struct ChainWorker {
    team_warmer: TeamWarmer,
    gauge: Arc<dyn ProgressGauge>,
}

impl ChainWorker {
    pub fn new(team_warmer: TeamWarmer, gauge: Arc<dyn ProgressGauge>) -> Self {
        Self { team_warmer, gauge }
    }

    /// Run every step of `chain` in order
    pub async fn run_chain(&self, chain: &WarmingChain) -> ChainReport {
        let start = Instant::now();
        let mut results = Vec::with_capacity(chain.team_count());
        let mut gauge_decremented = false;

        debug!(
            chain_id = %chain.chain_id,
            steps = chain.steps.len(),
            "Starting warming chain"
        );

        for step in &chain.steps {
            match step {
                ChainStep::WarmTeam { team_id } => {
                    results.push(self.team_warmer.warm(*team_id).await);
                }
                ChainStep::DecrementActiveChains => {
                    self.gauge.decrement();
                    gauge_decremented = true;
                }
            }
        }

        let report = ChainReport {
            chain_id: chain.chain_id,
            results,
            expired: false,
            gauge_decremented,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            chain_id = %chain.chain_id,
            teams_warmed = report.succeeded(),
            teams_failed = report.failed(),
            duration_ms = report.duration_ms,
            "Completed warming chain"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::AtomicGauge;
    use crate::test_utils::ScriptedCacheWarmer;

    #[tokio::test]
    async fn test_failure_does_not_stop_siblings() {
        let routine = Arc::new(ScriptedCacheWarmer::new().failing_for(2, "boom"));
        let gauge = Arc::new(AtomicGauge::new());
        gauge.increment();
        let worker = ChainWorker::new(TeamWarmer::new(routine.clone()), gauge.clone());

        let report = worker.run_chain(&WarmingChain::for_batch(&[1, 2, 3])).await;

        assert_eq!(routine.calls(), vec![1, 2, 3]);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.results[1].is_success());
        assert!(report.gauge_decremented);
        assert_eq!(gauge.value(), 0);
    }

    #[tokio::test]
    async fn test_all_failures_still_decrement_once() {
        let routine = Arc::new(
            ScriptedCacheWarmer::new()
                .failing_for(1, "down")
                .panicking_for(2),
        );
        let gauge = Arc::new(AtomicGauge::new());
        gauge.increment();
        let worker = ChainWorker::new(TeamWarmer::new(routine), gauge.clone());

        let report = worker.run_chain(&WarmingChain::for_batch(&[1, 2])).await;

        assert_eq!(report.failed(), 2);
        assert_eq!(gauge.value(), 0);
    }
}
