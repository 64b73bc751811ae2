//! # Per-Team Warmer
//!
//! Runs the external warming routine for exactly one team and turns whatever
//! happens into a [`WarmResult`]. Errors and panics stop here: a failing team
//! is logged and left stale until the next scheduled run, and the chain moves
//! on to its next step.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

use super::cache_warmer::CacheWarmer;
use crate::constants::DEFAULT_TEAM_WARM_MAX_RETRIES;
use crate::TeamId;

/// Outcome of warming one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WarmResult {
    Success { team_id: TeamId },
    Failure { team_id: TeamId, error: String },
}

impl WarmResult {
    pub fn team_id(&self) -> TeamId {
        match self {
            WarmResult::Success { team_id } | WarmResult::Failure { team_id, .. } => *team_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WarmResult::Success { .. })
    }
}

/// Invokes the cache warming routine with failure isolation
#[derive(Clone)]
pub struct TeamWarmer {
    warmer: Arc<dyn CacheWarmer>,
    max_retries: u32,
}

impl std::fmt::Debug for TeamWarmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamWarmer")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl TeamWarmer {
    pub fn new(warmer: Arc<dyn CacheWarmer>) -> Self {
        Self {
            warmer,
            max_retries: DEFAULT_TEAM_WARM_MAX_RETRIES,
        }
    }

    /// Record the configured per-team retry budget.
    ///
    /// The budget is reported in logs only; `warm` always makes one attempt.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Warm one team, converting any error or panic into `WarmResult::Failure`
    pub async fn warm(&self, team_id: TeamId) -> WarmResult {
        let outcome = AssertUnwindSafe(self.warmer.warm_dependency_cache(team_id))
            .catch_unwind()
            .await;

        let error = match outcome {
            Ok(Ok(())) => {
                debug!(team_id = team_id, "Warmed cohort dependencies cache for team");
                return WarmResult::Success { team_id };
            }
            Ok(Err(e)) => format!("{e:#}"),
            Err(panic) => panic_message(panic.as_ref()),
        };

        warn!(
            team_id = team_id,
            error = %error,
            retry_budget = self.max_retries,
            "Failed to warm cohort dependencies cache for team"
        );
        WarmResult::Failure { team_id, error }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic: non-string payload".to_string()
    }
}
