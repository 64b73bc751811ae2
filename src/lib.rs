#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Cohort Cache Warmer
//!
//! Periodic background job that pre-computes each sizable team's cohort
//! dependency cache.
//!
//! ## Overview
//!
//! A run selects every team with at least `min_cohort_count` non-deleted
//! cohorts, pages through them in ascending team id order, splits each page
//! into batches and submits one chain per batch to an asynchronous queue. A
//! chain warms its teams one after another and then decrements a shared
//! active-chains gauge. Chains that are not started within thirty minutes of
//! submission are dropped.
//!
//! The run itself only schedules work. It returns a [`RunSummary`] with the
//! number of teams found, scheduled and failed to schedule, plus the number of
//! pages processed.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered TOML and environment configuration
//! - [`database`] - Team store implementations and connection management
//! - [`orchestration`] - Page selection, batching and chain scheduling
//! - [`messaging`] - Chain payloads and the queue they are submitted to
//! - [`execution`] - Sequential chain execution
//! - [`warming`] - Per-team warming with failure isolation
//! - [`metrics`] - Active-chains gauge
//! - [`resilience`] - Whole-run retry policy
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cohort_cache_warmer::config::ConfigManager;
//! use cohort_cache_warmer::database::{DatabaseConnection, PgTeamStore};
//! use cohort_cache_warmer::execution::ChainWorker;
//! use cohort_cache_warmer::messaging::LocalChainQueue;
//! use cohort_cache_warmer::metrics::{AtomicGauge, ProgressGauge};
//! use cohort_cache_warmer::orchestration::CacheWarmingOrchestrator;
//! use cohort_cache_warmer::warming::{SqlFunctionCacheWarmer, TeamWarmer};
//! use std::sync::Arc;
//!
//! # async fn example() -> cohort_cache_warmer::Result<()> {
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//! let db = DatabaseConnection::connect(&config.database).await?;
//!
//! let routine = SqlFunctionCacheWarmer::new(
//!     db.pool().clone(),
//!     &config.database.warm_function,
//!     config.database.warm_function_arg_type,
//! )?;
//! let gauge: Arc<dyn ProgressGauge> = Arc::new(AtomicGauge::new());
//! let worker = ChainWorker::new(TeamWarmer::new(Arc::new(routine)), gauge.clone());
//! let queue = Arc::new(LocalChainQueue::new(worker, &config.queue));
//! let store = Arc::new(PgTeamStore::new(db.pool().clone()));
//!
//! let orchestrator = CacheWarmingOrchestrator::new(store, queue.clone(), gauge, config)?;
//! let summary = orchestrator.run().await?;
//! println!("{}", summary.to_json());
//! queue.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```
//!
//! PostgreSQL-backed tests run only when `DATABASE_URL` is set.

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod execution;
pub mod logging;
pub mod messaging;
pub mod metrics;
pub mod orchestration;
pub mod resilience;
pub mod test_utils;
pub mod validation;
pub mod warming;

/// Primary key of a team
pub type TeamId = i64;

pub use config::{CohortWarmingConfig, ConfigManager};
pub use error::{Result, WarmerError};
pub use orchestration::{CacheWarmingOrchestrator, RunStatus, RunSummary};
