//! # Database Operations
//!
//! Read-only team selection against the relational store.
//!
//! - [`connection`] - Pool construction and health checks
//! - [`team_store`] - The [`TeamStore`] contract and its PostgreSQL implementation
//! - [`memory`] - An in-process implementation honoring the same contract

pub mod connection;
pub mod memory;
pub mod team_store;

pub use connection::DatabaseConnection;
pub use memory::InMemoryTeamStore;
pub use team_store::{PgTeamStore, TeamStore};
