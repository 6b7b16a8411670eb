//! Job registry and plan fan-out.
//!
//! Dispatch semantics:
//! - the root is the local coordinator and never receives a request;
//! - data queries address every intermediate, then every leaf, in plan order;
//! - metadata queries address leaves only;
//! - the first failed send aborts dispatch and is returned, earlier sends are
//!   not undone and the job stays registered.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;
use futures::{TryStreamExt, stream};
use shardq_common::metrics::global_metrics;
use shardq_common::{DispatchConfig, DispatchMode, JobId, Result, ShardId, ShardqError};
use shardq_planner::{BaseNode, MetadataQuery, PhysicalPlan};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job_context::{JobContext, JobRequest, ResultSink};
use crate::task::{TaskContext, TaskManager, TaskRequest, TaskType};

// Registry values are type-erased; reads downcast and treat mismatches as absent.
type RegistryEntry = Arc<dyn Any + Send + Sync>;

// Shared by every manager in the process so job ids never collide on the wire.
static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(0);

/// Allocates job ids, keeps live jobs, and dispatches their task requests.
pub struct JobManager {
    task_manager: Arc<dyn TaskManager>,
    config: DispatchConfig,
    jobs: DashMap<JobId, RegistryEntry>,
}

impl std::fmt::Debug for JobManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobManager")
            .field("config", &self.config)
            .field("jobs", &self.jobs.len())
            .finish()
    }
}

struct DispatchTarget<'a> {
    task_type: TaskType,
    node: &'a BaseNode,
    shard_ids: &'a [ShardId],
    expected_results: usize,
}

// Plan and payload bytes shared by every request of one job.
struct EncodedJob {
    job_id: JobId,
    physical_plan: Vec<u8>,
    payload: Vec<u8>,
}

impl EncodedJob {
    fn encode(job_id: JobId, job: &JobContext) -> Result<Self> {
        let physical_plan = serde_json::to_vec(job.plan())
            .map_err(|e| ShardqError::Encoding(format!("physical plan encode failed: {e}")))?;
        let payload = serde_json::to_vec(job.request())
            .map_err(|e| ShardqError::Encoding(format!("job request encode failed: {e}")))?;
        Ok(Self {
            job_id,
            physical_plan,
            payload,
        })
    }
}

impl JobManager {
    pub fn new(task_manager: Arc<dyn TaskManager>) -> Self {
        Self::with_config(task_manager, DispatchConfig::default())
    }

    /// Build a manager whose dispatch mode comes from `SHARDQ_DISPATCH_MODE`
    /// and `SHARDQ_DISPATCH_MAX_IN_FLIGHT`.
    pub fn from_env(task_manager: Arc<dyn TaskManager>) -> Result<Self> {
        Ok(Self::with_config(task_manager, DispatchConfig::from_env()?))
    }

    pub fn with_config(task_manager: Arc<dyn TaskManager>, config: DispatchConfig) -> Self {
        Self {
            task_manager,
            config,
            jobs: DashMap::new(),
        }
    }

    /// Register `job` and dispatch its task requests.
    ///
    /// Returns the allocated job id. On a failed send the returned
    /// [`ShardqError::Dispatch`] carries the id instead, and the job can
    /// still be looked up with [`JobManager::get_job`].
    pub async fn submit_job(&self, job: JobContext) -> Result<JobId> {
        let job_id = Self::alloc_job_id();
        let job = Arc::new(job);
        self.jobs.insert(job_id, Arc::clone(&job) as RegistryEntry);

        let kind = job.request().kind();
        let targets = dispatch_targets(job.plan(), job.request());
        global_metrics().inc_jobs_submitted(kind);
        info!(
            job_id = %job_id,
            kind,
            targets = targets.len(),
            "job registered"
        );

        let encoded = EncodedJob::encode(job_id, &job)?;
        let job_ref: &JobContext = &job;
        let encoded_ref = &encoded;
        match self.config.mode {
            DispatchMode::Sequential => {
                for target in &targets {
                    self.dispatch_task(job_ref, encoded_ref, target).await?;
                }
            }
            DispatchMode::Concurrent { max_in_flight } => {
                stream::iter(targets.iter().map(Ok::<_, ShardqError>))
                    .try_for_each_concurrent(max_in_flight.max(1), move |target| {
                        self.dispatch_task(job_ref, encoded_ref, target)
                    })
                    .await?;
            }
        }
        Ok(job_id)
    }

    /// Register and dispatch a metadata job. Only leaves are addressed.
    pub async fn submit_metadata_job(
        &self,
        cancel: CancellationToken,
        plan: PhysicalPlan,
        request: MetadataQuery,
        result_sink: Option<ResultSink>,
    ) -> Result<JobId> {
        self.submit_job(JobContext::new(
            cancel,
            result_sink,
            plan,
            JobRequest::Metadata(request),
        ))
        .await
    }

    /// Look up a registered job. Entries that are not a [`JobContext`] read as absent.
    pub fn get_job(&self, job_id: JobId) -> Option<Arc<JobContext>> {
        let entry = self.jobs.get(&job_id)?.value().clone();
        entry.downcast::<JobContext>().ok()
    }

    pub fn task_manager(&self) -> Arc<dyn TaskManager> {
        Arc::clone(&self.task_manager)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    fn alloc_job_id() -> JobId {
        JobId(NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn dispatch_task(
        &self,
        job: &JobContext,
        encoded: &EncodedJob,
        target: &DispatchTarget<'_>,
    ) -> Result<()> {
        let job_id = encoded.job_id;
        let indicator = target.node.indicator.as_str();
        if job.is_cancelled() {
            warn!(job_id = %job_id, target = indicator, "job canceled, dispatch stopped");
            return Err(ShardqError::Dispatch {
                job_id,
                target: indicator.to_string(),
                source: Box::new(ShardqError::Canceled(format!(
                    "job {job_id} canceled before dispatch"
                ))),
            });
        }

        let task_id = self.task_manager.alloc_task_id();
        let request = TaskRequest {
            job_id,
            task_id: task_id.clone(),
            parent: target.node.parent.clone(),
            task_type: target.task_type,
            physical_plan: encoded.physical_plan.clone(),
            payload: encoded.payload.clone(),
            shard_ids: target.shard_ids.to_vec(),
        };
        self.task_manager.submit(TaskContext {
            job_id,
            task_id: task_id.clone(),
            task_type: target.task_type,
            target: indicator.to_string(),
            parent: target.node.parent.clone(),
            expected_results: target.expected_results,
            result_sink: job.result_sink().cloned(),
        });

        debug!(
            job_id = %job_id,
            task_id = %task_id,
            task_type = target.task_type.as_str(),
            target = indicator,
            shards = target.shard_ids.len(),
            "sending task request"
        );
        let started = Instant::now();
        match self.task_manager.send_request(indicator, request).await {
            Ok(()) => {
                let secs = started.elapsed().as_secs_f64();
                global_metrics().record_task_dispatch(target.task_type.as_str(), secs);
                Ok(())
            }
            Err(e) => {
                global_metrics().inc_dispatch_failures(target.task_type.as_str());
                warn!(
                    job_id = %job_id,
                    task_id = %task_id,
                    target = indicator,
                    error = %e,
                    "task request send failed"
                );
                Err(ShardqError::Dispatch {
                    job_id,
                    target: indicator.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }
}

fn dispatch_targets<'a>(plan: &'a PhysicalPlan, request: &JobRequest) -> Vec<DispatchTarget<'a>> {
    let leafs = plan.leafs().iter().map(|leaf| DispatchTarget {
        task_type: TaskType::Leaf,
        node: &leaf.base,
        shard_ids: &leaf.shard_ids,
        expected_results: 1,
    });
    match request {
        JobRequest::Query(_) => plan
            .intermediates()
            .iter()
            .map(|intermediate| DispatchTarget {
                task_type: TaskType::Intermediate,
                node: &intermediate.base,
                shard_ids: &[],
                expected_results: plan.child_count(&intermediate.base.indicator),
            })
            .chain(leafs)
            .collect(),
        JobRequest::Metadata(_) => leafs.collect(),
    }
}

#[cfg(test)]
#[path = "job_manager_tests.rs"]
mod tests;
