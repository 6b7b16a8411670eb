//! Task-manager contract consumed by the job manager.
//!
//! The task manager owns task bookkeeping, response correlation and the
//! network transport; the job manager only needs id allocation, registration
//! and a send primitive.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shardq_common::{JobId, Result, ShardId, TaskId};

use crate::job_context::ResultSink;

/// Role of the node a task request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Intermediate,
    Leaf,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Intermediate => "intermediate",
            TaskType::Leaf => "leaf",
        }
    }
}

/// Request sent to one plan node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub job_id: JobId,
    pub task_id: TaskId,
    /// Indicator of the node that will receive this task's results.
    pub parent: String,
    pub task_type: TaskType,
    /// JSON-encoded physical plan of the whole job.
    pub physical_plan: Vec<u8>,
    /// JSON-encoded [`crate::JobRequest`].
    pub payload: Vec<u8>,
    /// Shards to execute against; empty for intermediate tasks.
    pub shard_ids: Vec<ShardId>,
}

/// Registration handed to [`TaskManager::submit`] so responses can be
/// correlated back to their job.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub task_type: TaskType,
    /// Node the request is sent to.
    pub target: String,
    pub parent: String,
    /// Number of responses the task waits for before it is complete.
    pub expected_results: usize,
    pub result_sink: Option<ResultSink>,
}

/// Task allocation, registration and transport used by the job manager.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Return a fresh, collision-free task id. Must be safe to call concurrently.
    fn alloc_task_id(&self) -> TaskId;
    /// Register a task for later response correlation.
    fn submit(&self, task: TaskContext);
    /// Hand `request` to the transport for delivery to `target`.
    ///
    /// Any failure to hand the request off is an error; callers do not
    /// distinguish connection, encoding or remote-rejection failures.
    async fn send_request(&self, target: &str, request: TaskRequest) -> Result<()>;
}
