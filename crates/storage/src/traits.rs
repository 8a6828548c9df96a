//! The content store contract consumed by the network layer.

use portal_primitives::{ContentId, Distance};

use crate::ContentStoreResult;

/// A node-local store of overlay content.
///
/// One implementation exists per schema version. Calls are synchronous and
/// may be made concurrently from any number of threads.
pub trait ContentStore: Send + Sync {
    /// Look up the value stored under `content_id`.
    ///
    /// Fails with [`ContentStoreError::NotFound`](crate::ContentStoreError::NotFound)
    /// when nothing is stored. Has no side effects.
    fn get(&self, content_key: &[u8], content_id: &ContentId) -> ContentStoreResult<Vec<u8>>;

    /// Admit new content.
    ///
    /// A second put of the same `content_id` succeeds without changing state.
    /// May evict the farthest content and shrink the radius.
    fn put(
        &self,
        content_key: &[u8],
        content_id: &ContentId,
        content_value: &[u8],
    ) -> ContentStoreResult<()>;

    /// The farthest distance this store currently covers. Never blocks.
    ///
    /// A put that evicts publishes the smaller radius before its deletes
    /// commit. Only if that commit fails is the previous radius restored.
    fn radius(&self) -> Distance;
}

/// Whether a store wants a piece of content, and if not, why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShouldWeStoreContent {
    /// Within radius and not yet stored.
    Store,
    /// Farther than the current radius.
    NotWithinRadius,
    /// Already stored.
    AlreadyStored,
}
