//! # Chain Scheduler
//!
//! Turns one batch into a [`WarmingChain`] and submits it with an absolute
//! expiry of submission time plus [`CHAIN_TTL`]. The active-chains gauge is
//! incremented before submission, since an accepted chain may start and reach
//! its terminal decrement before `submit` returns. A rejected submission takes
//! the increment back, so the net effect is +1 per accepted chain only.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error};

use crate::constants::CHAIN_TTL;
use crate::messaging::{ChainQueue, QueueError, SubmissionHandle, WarmingChain};
use crate::metrics::ProgressGauge;
use crate::TeamId;

/// Result of submitting one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled {
        count: usize,
        handle: SubmissionHandle,
    },
    Failed {
        count: usize,
        error: QueueError,
    },
}

impl ScheduleOutcome {
    /// Teams in the batch
    pub fn count(&self) -> usize {
        match self {
            ScheduleOutcome::Scheduled { count, .. } | ScheduleOutcome::Failed { count, .. } => {
                *count
            }
        }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleOutcome::Scheduled { .. })
    }
}

#[derive(Clone)]
pub struct ChainScheduler {
    queue: Arc<dyn ChainQueue>,
    gauge: Arc<dyn ProgressGauge>,
    ttl: chrono::Duration,
}

impl ChainScheduler {
    pub fn new(queue: Arc<dyn ChainQueue>, gauge: Arc<dyn ProgressGauge>) -> Self {
        Self {
            queue,
            gauge,
            ttl: chrono::Duration::seconds(CHAIN_TTL.as_secs() as i64),
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Submit a chain for `batch` now
    pub async fn schedule(&self, batch: &[TeamId]) -> ScheduleOutcome {
        self.schedule_at(batch, Utc::now()).await
    }

    /// Submit a chain for `batch` as if submitted at `submitted_at`
    pub async fn schedule_at(
        &self,
        batch: &[TeamId],
        submitted_at: DateTime<Utc>,
    ) -> ScheduleOutcome {
        let chain = WarmingChain::for_batch(batch);
        let chain_id = chain.chain_id;
        let expires_at = submitted_at + self.ttl;

        self.gauge.increment();
        match self.queue.submit(chain, expires_at).await {
            Ok(handle) => {
                debug!(
                    chain_id = %chain_id,
                    batch_size = batch.len(),
                    teams_in_batch = ?batch,
                    expires_at = %expires_at,
                    "Scheduled chain for batch"
                );
                ScheduleOutcome::Scheduled {
                    count: batch.len(),
                    handle,
                }
            }
            Err(e) => {
                self.gauge.decrement();
                error!(
                    chain_id = %chain_id,
                    batch_size = batch.len(),
                    error = %e,
                    "Failed to schedule chain for batch"
                );
                ScheduleOutcome::Failed {
                    count: batch.len(),
                    error: e,
                }
            }
        }
    }
}
