//! Shared configuration, error types, IDs, and metrics for shardq crates.
//!
//! Architecture role:
//! - defines dispatch configuration passed into the job manager
//! - provides common [`ShardqError`] / [`Result`] contracts
//! - hosts the Prometheus metrics registry used by the dispatch path
//!
//! Key modules:
//! - [`config`]
//! - [`error`]
//! - [`ids`]
//! - [`metrics`]

pub mod config;
pub mod error;
pub mod ids;
pub mod metrics;

pub use config::{DispatchConfig, DispatchMode};
pub use error::{Result, ShardqError};
pub use ids::*;
pub use metrics::MetricsRegistry;
