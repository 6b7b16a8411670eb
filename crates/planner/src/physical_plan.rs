use serde::{Deserialize, Serialize};
use shardq_common::ShardId;

/// Identity shared by every non-root plan node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseNode {
    /// Indicator of the node that dispatches to this one.
    pub parent: String,
    /// This node's own address, unique within a plan.
    pub indicator: String,
}

impl BaseNode {
    pub fn new(parent: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            indicator: indicator.into(),
        }
    }
}

/// Local coordinating node of a plan. Never a dispatch target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub indicator: String,
    /// Expected count of top-level dispatch targets.
    pub num_of_task: u32,
}

/// Partial-aggregation tier forwarding to further intermediates or leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intermediate {
    #[serde(flatten)]
    pub base: BaseNode,
}

/// Terminal fragment executor scoped to a set of shards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    #[serde(flatten)]
    pub base: BaseNode,
    pub shard_ids: Vec<ShardId>,
}

/// Execution topology for one job.
///
/// Built incrementally by the planner and read-only once handed to the job
/// manager. Parent/indicator consistency is the planner's contract and is not
/// re-checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalPlan {
    pub root: Root,
    #[serde(default)]
    pub intermediates: Vec<Intermediate>,
    #[serde(default)]
    pub leafs: Vec<Leaf>,
}

impl PhysicalPlan {
    pub fn new(root: Root) -> Self {
        Self {
            root,
            intermediates: Vec::new(),
            leafs: Vec::new(),
        }
    }

    pub fn add_intermediate(&mut self, intermediate: Intermediate) {
        self.intermediates.push(intermediate);
    }

    pub fn add_leaf(&mut self, leaf: Leaf) {
        self.leafs.push(leaf);
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn intermediates(&self) -> &[Intermediate] {
        &self.intermediates
    }

    pub fn leafs(&self) -> &[Leaf] {
        &self.leafs
    }

    /// Number of intermediates and leaves whose parent is `indicator`.
    pub fn child_count(&self, indicator: &str) -> usize {
        let intermediates = self
            .intermediates
            .iter()
            .filter(|n| n.base.parent == indicator)
            .count();
        let leafs = self
            .leafs
            .iter()
            .filter(|n| n.base.parent == indicator)
            .count();
        intermediates + leafs
    }

    /// Every node except the root.
    pub fn dispatch_target_count(&self) -> usize {
        self.intermediates.len() + self.leafs.len()
    }
}
