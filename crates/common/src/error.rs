use thiserror::Error;

use crate::ids::JobId;

/// Canonical shardq error taxonomy used across crates.
///
/// Classification guidance:
/// - [`ShardqError::Dispatch`]: a job could not hand one of its task requests to a node
/// - [`ShardqError::Transport`]: raw send failure reported by a task manager implementation
/// - [`ShardqError::Canceled`]: the job's execution context was cancelled before a send
/// - [`ShardqError::Encoding`]: plan or request payload could not be encoded
/// - [`ShardqError::InvalidConfig`]: config/environment contract violations
#[derive(Debug, Error)]
pub enum ShardqError {
    /// Sending a task request to `target` failed while dispatching `job_id`.
    ///
    /// Sends issued to earlier targets of the same job are not rolled back,
    /// and the job stays registered.
    #[error("dispatch of job {job_id} to {target} failed: {source}")]
    Dispatch {
        job_id: JobId,
        target: String,
        #[source]
        source: Box<ShardqError>,
    },

    /// Transport-level send failure.
    ///
    /// Connection, serialization and remote rejection errors all land here;
    /// callers do not distinguish them.
    #[error("transport error: {0}")]
    Transport(String),

    /// The job was cancelled before the request was sent.
    #[error("canceled: {0}")]
    Canceled(String),

    /// Physical plan or request payload encoding failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Invalid or inconsistent configuration.
    ///
    /// Examples:
    /// - unknown dispatch mode name
    /// - zero concurrent send limit
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ShardqError {
    /// Node address a dispatch failure was aimed at, if this is one.
    pub fn dispatch_target(&self) -> Option<&str> {
        match self {
            ShardqError::Dispatch { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Job id carried by a dispatch failure.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            ShardqError::Dispatch { job_id, .. } => Some(*job_id),
            _ => None,
        }
    }
}

/// Standard shardq result alias.
pub type Result<T> = std::result::Result<T, ShardqError>;
