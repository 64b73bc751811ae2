//! # Execution
//!
//! Worker-side execution of warming chains.

pub mod chain_worker;

pub use chain_worker::{ChainReport, ChainWorker};
