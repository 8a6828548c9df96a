use portal_primitives::{DistanceFunction, NodeId};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::{StorageConfig, versioned::ContentType};

/// Configuration of one [`IdIndexedV1Store`](super::IdIndexedV1Store) namespace.
#[derive(Debug, Clone)]
pub struct IdIndexedV1StoreConfig {
    pub content_type: ContentType,
    pub node_id: NodeId,
    pub storage_capacity_bytes: u64,
    pub distance_fn: DistanceFunction,
    pub sql_connection_pool: Pool<SqliteConnectionManager>,
}

impl IdIndexedV1StoreConfig {
    pub fn new(content_type: ContentType, config: StorageConfig) -> Self {
        Self {
            content_type,
            node_id: config.node_id,
            storage_capacity_bytes: config.storage_capacity_bytes,
            distance_fn: config.distance_fn,
            sql_connection_pool: config.sql_connection_pool,
        }
    }

    /// Usage at which a reopened store considers itself full (95% of capacity).
    pub(crate) fn full_threshold_bytes(&self) -> u64 {
        self.storage_capacity_bytes - self.storage_capacity_bytes / 20
    }
}
