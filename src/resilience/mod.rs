//! # Resilience Module
//!
//! Retry policy for whole warming runs. A run that fails during team
//! selection is retried as a unit after a fixed backoff; failures inside a run
//! (a rejected batch, a failing team) are isolated locally and never reach
//! this layer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cohort_cache_warmer::resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! # async fn example() -> cohort_cache_warmer::Result<()> {
//! let policy = RetryPolicy::fixed(1, Duration::from_secs(300));
//! let value = policy.execute("load_teams", || async { Ok(42) }).await?;
//! # Ok(())
//! # }
//! ```

pub mod retry;

pub use retry::{Backoff, RetryPolicy};
