//! Node-local content storage.
//!
//! A content store keeps the content closest to the local node within a
//! byte budget. When the budget is exceeded the farthest content is evicted
//! and the store's radius (the farthest distance it promises to cover)
//! shrinks to the farthest content that remains.
//!
//! Stores are opened per [`ContentType`] through [`create_store`], which
//! checks the namespace's recorded schema version first.

mod args;
mod config;
mod error;
mod memory;
mod metrics;
mod radius;
mod traits;
pub mod versioned;

pub use args::{DEFAULT_DATA_DIR, DEFAULT_STORAGE_CAPACITY_MB, StorageArgs};
pub use config::{BYTES_IN_MB_U64, DATABASE_FILE_NAME, StorageConfig, setup_sql};
pub use error::{ContentStoreError, ContentStoreResult};
pub use memory::MemoryContentStore;
pub use radius::SharedRadius;
pub use traits::{ContentStore, ShouldWeStoreContent};
pub use versioned::{
    ContentType, SchemaChecked, StoreVersion, VersionedContentStore, create_store,
    id_indexed_v1::{IdIndexedV1Store, PaginateLocalContentInfo, UsageStats},
};

pub use portal_primitives::{ContentId, Distance, DistanceFunction, NodeId};
