//! # Warming
//!
//! Per-team cache warming: the external routine seam ([`CacheWarmer`]) and the
//! failure-isolating wrapper the chain worker calls ([`TeamWarmer`]).

pub mod cache_warmer;
pub mod team_warmer;

pub use cache_warmer::{CacheWarmer, SqlFunctionCacheWarmer, WarmArgumentType};
pub use team_warmer::{TeamWarmer, WarmResult};
