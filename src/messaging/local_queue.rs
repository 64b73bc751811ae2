//! # Local Chain Queue
//!
//! In-process [`ChainQueue`] running chains on the tokio runtime. Each chain
//! runs its steps sequentially on one spawned task; a semaphore bounds how
//! many chains execute at once, which is the only backpressure applied to the
//! warming routine. Chains whose expiry passes while they wait for a permit
//! are dropped without running any step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::chain::{SubmissionHandle, WarmingChain};
use super::errors::QueueError;
use super::queue::ChainQueue;
use crate::config::QueueConfig;
use crate::execution::{ChainReport, ChainWorker};

/// Tokio-backed chain queue with bounded concurrency and capacity
#[derive(Clone)]
pub struct LocalChainQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    worker: ChainWorker,
    permits: Arc<Semaphore>,
    pending: AtomicUsize,
    max_pending: usize,
    closed: AtomicBool,
    handles: Mutex<Vec<JoinHandle<ChainReport>>>,
}

impl LocalChainQueue {
    pub fn new(worker: ChainWorker, config: &QueueConfig) -> Self {
        info!(
            max_concurrent_chains = config.max_concurrent_chains,
            max_pending_chains = config.max_pending_chains,
            "Local chain queue initialized"
        );

        Self {
            inner: Arc::new(QueueInner {
                worker,
                permits: Arc::new(Semaphore::new(config.max_concurrent_chains.max(1))),
                pending: AtomicUsize::new(0),
                max_pending: config.max_pending_chains,
                closed: AtomicBool::new(false),
                handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Chains accepted and not yet finished or dropped
    pub fn pending_chains(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Wait for every accepted chain, including ones accepted while draining
    pub async fn drain(&self) -> Vec<ChainReport> {
        let mut reports = Vec::new();
        loop {
            let handles = std::mem::take(&mut *self.inner.handles.lock());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                match handle.await {
                    Ok(report) => reports.push(report),
                    Err(e) => error!(error = %e, "Warming chain task aborted"),
                }
            }
        }
        reports
    }

    /// Stop accepting chains and wait for the accepted ones
    pub async fn shutdown(&self) -> Vec<ChainReport> {
        self.inner.closed.store(true, Ordering::Release);
        info!(
            pending_chains = self.pending_chains(),
            "Local chain queue shutting down"
        );
        self.drain().await
    }
}

#[async_trait]
impl ChainQueue for LocalChainQueue {
    async fn submit(
        &self,
        chain: WarmingChain,
        expires_at: DateTime<Utc>,
    ) -> Result<SubmissionHandle, QueueError> {
        if self.is_closed() {
            return Err(QueueError::closed());
        }

        let submitted_at = Utc::now();
        if expires_at <= submitted_at {
            return Err(QueueError::AlreadyExpired {
                expires_at: expires_at.to_rfc3339(),
            });
        }

        let pending = self.inner.pending.fetch_add(1, Ordering::AcqRel);
        if pending >= self.inner.max_pending {
            self.inner.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(QueueError::capacity_exceeded(pending, self.inner.max_pending));
        }

        let chain_id = chain.chain_id;
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            // Never closed, so acquisition cannot fail
            let _permit = inner.permits.clone().acquire_owned().await.ok();

            let report = if Utc::now() > expires_at {
                warn!(
                    chain_id = %chain.chain_id,
                    expires_at = %expires_at,
                    teams = chain.team_count(),
                    "Warming chain expired before it started; dropping"
                );
                ChainReport::expired(chain.chain_id)
            } else {
                inner.worker.run_chain(&chain).await
            };

            inner.pending.fetch_sub(1, Ordering::AcqRel);
            report
        });
        self.inner.handles.lock().push(handle);

        debug!(chain_id = %chain_id, expires_at = %expires_at, "Accepted warming chain");

        Ok(SubmissionHandle {
            chain_id,
            submitted_at,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{AtomicGauge, ProgressGauge};
    use crate::test_utils::ScriptedCacheWarmer;
    use crate::warming::TeamWarmer;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    fn queue_with(
        routine: Arc<ScriptedCacheWarmer>,
        gauge: Arc<AtomicGauge>,
        max_concurrent_chains: usize,
        max_pending_chains: usize,
    ) -> LocalChainQueue {
        let worker = ChainWorker::new(TeamWarmer::new(routine), gauge);
        LocalChainQueue::new(
            worker,
            &QueueConfig {
                max_concurrent_chains,
                max_pending_chains,
            },
        )
    }

    fn in_thirty_minutes() -> DateTime<Utc> {
        Utc::now() + ChronoDuration::minutes(30)
    }

    #[tokio::test]
    async fn test_chains_run_steps_in_order() {
        let routine = Arc::new(ScriptedCacheWarmer::new());
        let gauge = Arc::new(AtomicGauge::new());
        let queue = queue_with(routine.clone(), gauge.clone(), 1, 10);

        gauge.increment();
        queue
            .submit(WarmingChain::for_batch(&[4, 2, 8]), in_thirty_minutes())
            .await
            .unwrap();
        gauge.increment();
        queue
            .submit(WarmingChain::for_batch(&[1]), in_thirty_minutes())
            .await
            .unwrap();

        let reports = queue.drain().await;

        assert_eq!(reports.len(), 2);
        assert_eq!(routine.calls(), vec![4, 2, 8, 1]);
        assert_eq!(gauge.value(), 0);
        assert_eq!(queue.pending_chains(), 0);
    }

    #[tokio::test]
    async fn test_rejects_when_closed() {
        let queue = queue_with(
            Arc::new(ScriptedCacheWarmer::new()),
            Arc::new(AtomicGauge::new()),
            2,
            10,
        );
        queue.shutdown().await;

        let err = queue
            .submit(WarmingChain::for_batch(&[1]), in_thirty_minutes())
            .await
            .unwrap_err();
        assert_eq!(err, QueueError::Closed);
    }

    #[tokio::test]
    async fn test_rejects_when_capacity_exceeded() {
        let routine = Arc::new(ScriptedCacheWarmer::new().with_delay(Duration::from_millis(50)));
        let queue = queue_with(routine, Arc::new(AtomicGauge::new()), 1, 1);

        queue
            .submit(WarmingChain::for_batch(&[1]), in_thirty_minutes())
            .await
            .unwrap();
        let err = queue
            .submit(WarmingChain::for_batch(&[2]), in_thirty_minutes())
            .await
            .unwrap_err();
        assert_eq!(err, QueueError::capacity_exceeded(1, 1));

        queue.drain().await;
        assert_eq!(queue.pending_chains(), 0);
    }

    #[tokio::test]
    async fn test_rejects_already_expired_chain() {
        let queue = queue_with(
            Arc::new(ScriptedCacheWarmer::new()),
            Arc::new(AtomicGauge::new()),
            1,
            10,
        );
        let err = queue
            .submit(
                WarmingChain::for_batch(&[1]),
                Utc::now() - ChronoDuration::seconds(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, QueueError::AlreadyExpired { .. }));
    }

    #[tokio::test]
    async fn test_chain_expiring_while_waiting_never_runs() {
        let routine = Arc::new(ScriptedCacheWarmer::new().with_delay(Duration::from_millis(200)));
        let gauge = Arc::new(AtomicGauge::new());
        let queue = queue_with(routine.clone(), gauge.clone(), 1, 10);

        gauge.increment();
        queue
            .submit(WarmingChain::for_batch(&[1]), in_thirty_minutes())
            .await
            .unwrap();
        gauge.increment();
        queue
            .submit(
                WarmingChain::for_batch(&[2]),
                Utc::now() + ChronoDuration::milliseconds(20),
            )
            .await
            .unwrap();

        let reports = queue.drain().await;

        assert_eq!(routine.calls(), vec![1]);
        assert_eq!(reports.iter().filter(|r| r.expired).count(), 1);
        // The dropped chain never reaches its decrement step
        assert_eq!(gauge.value(), 1);
    }
}
