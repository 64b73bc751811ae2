//! # Orchestration
//!
//! Drives one cohort cache warming run.
//!
//! ## Components
//!
//! - **TeamSelector**: lazily pages qualifying team ids out of the [`TeamStore`](crate::database::TeamStore)
//! - **BatchPartitioner**: splits each page into fixed-size batches
//! - **ChainScheduler**: submits one expiring [`WarmingChain`](crate::messaging::WarmingChain) per batch
//! - **CacheWarmingOrchestrator**: ties the above together and aggregates a [`RunSummary`]
//!
//! The orchestrator never waits for chains to execute. Execution, per-team
//! failure isolation and the active-chains decrement happen downstream in
//! [`crate::execution`].

pub mod batch_partitioner;
pub mod chain_scheduler;
pub mod orchestrator;
pub mod team_selector;
pub mod types;

pub use batch_partitioner::BatchPartitioner;
pub use chain_scheduler::{ChainScheduler, ScheduleOutcome};
pub use orchestrator::CacheWarmingOrchestrator;
pub use team_selector::{TeamPager, TeamSelector};
pub use types::{OrchestratorState, Page, RunStatus, RunSummary};
