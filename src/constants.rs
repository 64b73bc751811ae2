//! # System Constants
//!
//! Defaults and fixed values for cohort dependency cache warming.

use std::time::Duration;

/// Teams fetched from the store per page
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Teams warmed sequentially inside one chain
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Minimum number of non-deleted cohorts for a team to be warmed
pub const DEFAULT_MIN_COHORT_COUNT: i64 = 50;

/// A chain not started within this window after submission is dropped
pub const CHAIN_TTL: Duration = Duration::from_secs(30 * 60);

/// Retries of a whole run after a store failure
pub const DEFAULT_RUN_MAX_RETRIES: u32 = 1;

/// Fixed delay before retrying a failed run
pub const DEFAULT_RUN_RETRY_BACKOFF: Duration = Duration::from_secs(5 * 60);

/// Retry budget declared for a single team warm. Never consulted: a failed
/// team waits for the next scheduled run.
pub const DEFAULT_TEAM_WARM_MAX_RETRIES: u32 = 3;

/// Chains executing at once on the local queue
pub const DEFAULT_MAX_CONCURRENT_CHAINS: usize = 4;

/// Chains accepted but not yet finished on the local queue
pub const DEFAULT_MAX_PENDING_CHAINS: usize = 10_000;

/// PostgreSQL function invoked by the SQL cache warmer
pub const DEFAULT_WARM_FUNCTION: &str = "warm_team_cohort_dependency_cache";

/// Prometheus gauge tracking in-flight chains
pub const ACTIVE_CHAINS_GAUGE_NAME: &str = "cohort_cache_warming_active_chains";
pub const ACTIVE_CHAINS_GAUGE_HELP: &str =
    "Number of currently active cohort cache warming chains";

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "COHORT_WARMING";

/// Base configuration file name (without extension)
pub const CONFIG_FILE_STEM: &str = "cohort-warming";

/// Relational tables queried by the PostgreSQL team store
pub mod tables {
    pub const TEAM: &str = "posthog_team";
    pub const COHORT: &str = "posthog_cohort";
}
