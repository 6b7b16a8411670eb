//! Unit of work handed to the job manager.
//!
//! A [`JobContext`] is storage only: the cancellation token, optional result
//! sink, physical plan and parsed request travel together from submission to
//! the registry.

use serde::{Deserialize, Serialize};
use shardq_common::{JobId, TaskId};
use shardq_planner::{MetadataQuery, PhysicalPlan, Query};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Parsed request a job executes. Dispatch branches on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "request", rename_all = "snake_case")]
pub enum JobRequest {
    /// Data query: fans out through intermediates to leaves.
    Query(Query),
    /// Metadata query: flat fan-out to leaves.
    Metadata(MetadataQuery),
}

impl JobRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            JobRequest::Query(_) => "query",
            JobRequest::Metadata(_) => "metadata",
        }
    }
}

/// Response forwarded into a job's result sink by the task manager.
#[derive(Debug, Clone)]
pub struct TaskResponse {
    pub job_id: JobId,
    pub task_id: TaskId,
    pub payload: Vec<u8>,
    pub error: Option<String>,
}

/// Channel a job's responses are delivered to.
pub type ResultSink = mpsc::Sender<TaskResponse>;

/// One unit of work: execution context, result sink, plan and request.
#[derive(Debug, Clone)]
pub struct JobContext {
    cancel: CancellationToken,
    result_sink: Option<ResultSink>,
    plan: PhysicalPlan,
    request: JobRequest,
}

impl JobContext {
    pub fn new(
        cancel: CancellationToken,
        result_sink: Option<ResultSink>,
        plan: PhysicalPlan,
        request: JobRequest,
    ) -> Self {
        Self {
            cancel,
            result_sink,
            plan,
            request,
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Absent for fire-and-forget jobs.
    pub fn result_sink(&self) -> Option<&ResultSink> {
        self.result_sink.as_ref()
    }

    pub fn plan(&self) -> &PhysicalPlan {
        &self.plan
    }

    pub fn request(&self) -> &JobRequest {
        &self.request
    }
}
