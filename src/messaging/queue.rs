use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::chain::{SubmissionHandle, WarmingChain};
use super::errors::QueueError;

/// Accepts warming chains for asynchronous execution.
///
/// Implementations must run a chain's steps strictly in order and must never
/// start a chain after `expires_at`. Returning an error means the chain was
/// not accepted and none of its steps will run.
#[async_trait]
pub trait ChainQueue: Send + Sync {
    async fn submit(
        &self,
        chain: WarmingChain,
        expires_at: DateTime<Utc>,
    ) -> Result<SubmissionHandle, QueueError>;
}
