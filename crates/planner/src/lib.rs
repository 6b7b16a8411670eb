//! Physical-plan topology and request values consumed by the dispatch layer.
//!
//! Plan construction (turning a query plus shard assignment into a tree) is
//! done elsewhere; this crate only defines what a finished plan looks like.

pub mod physical_plan;
pub mod statement;

pub use physical_plan::*;
pub use statement::*;
