//! # Messaging Module
//!
//! Chain submission: the [`WarmingChain`] unit of work, the [`ChainQueue`]
//! seam the scheduler submits through, and an in-process implementation.

pub mod chain;
pub mod errors;
pub mod local_queue;
pub mod queue;

pub use chain::{ChainStep, SubmissionHandle, WarmingChain};
pub use errors::QueueError;
pub use local_queue::LocalChainQueue;
pub use queue::ChainQueue;
