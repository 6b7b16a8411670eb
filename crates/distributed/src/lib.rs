//! Job dispatch for distributed query execution.
//!
//! Responsibilities:
//! - bind a physical plan, request and result sink into a [`JobContext`];
//! - register jobs in a concurrent registry keyed by [`JobId`](shardq_common::JobId);
//! - fan task requests out to every intermediate and leaf of the plan through
//!   a [`TaskManager`], failing fast on the first send error.

pub mod job_context;
pub mod job_manager;
pub mod task;

pub use job_context::{JobContext, JobRequest, ResultSink, TaskResponse};
pub use job_manager::JobManager;
pub use task::{TaskContext, TaskManager, TaskRequest, TaskType};
