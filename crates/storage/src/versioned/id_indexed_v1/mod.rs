//! Content tables indexed by content id.
//!
//! One table per [`ContentType`](crate::ContentType). Each row carries the
//! top 32 bits of its distance to the local node, so eviction can order
//! rows with an index instead of recomputing full distances.

mod config;
mod sql;
mod store;
mod usage_stats;

pub use config::IdIndexedV1StoreConfig;
pub use store::{IdIndexedV1Store, PaginateLocalContentInfo};
pub use usage_stats::UsageStats;
