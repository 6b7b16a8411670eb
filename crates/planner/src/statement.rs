//! Parsed request values carried by a job.
//!
//! The query parser lives outside this workspace; these are the already
//! validated shapes it produces, shipped to nodes as task payloads.

use serde::{Deserialize, Serialize};

/// Half-open time range in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

/// Data query over one metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub namespace: String,
    pub metric_name: String,
    /// Selected field expressions, as written.
    pub select_items: Vec<String>,
    /// Tag filter expression, if any.
    pub condition: Option<String>,
    pub time_range: TimeRange,
    /// Down-sampling interval in milliseconds, 0 for storage resolution.
    pub interval: i64,
    pub group_by: Vec<String>,
    pub limit: usize,
}

/// Kind of catalog listing a metadata query asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataType {
    #[default]
    Database,
    Namespace,
    Metric,
    Field,
    TagKey,
    TagValue,
}

/// Catalog query (show databases / metrics / tag values ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataQuery {
    pub metadata_type: MetadataType,
    pub namespace: String,
    pub metric_name: String,
    /// Tag key for `TagValue` listings.
    pub tag_key: String,
    pub condition: Option<String>,
    /// Name prefix filter.
    pub prefix: String,
    pub limit: usize,
}
