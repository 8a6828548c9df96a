//! In-memory content store.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use portal_primitives::{ContentId, Distance, DistanceFunction, NodeId};

use crate::{ContentStore, ContentStoreError, ContentStoreResult, SharedRadius};

#[derive(Debug, Default)]
struct Entries {
    /// Rows by id: key, value.
    rows: HashMap<ContentId, (Vec<u8>, Vec<u8>)>,
    /// Ids ordered by distance to the local node.
    by_distance: BTreeMap<(Distance, ContentId), u64>,
    total_bytes: u64,
}

/// A [`ContentStore`] kept entirely in memory.
///
/// Same admission and farthest-first eviction rules as the SQLite store,
/// without persistence. Meant for tests of code built on top of a store.
#[derive(Debug)]
pub struct MemoryContentStore {
    node_id: NodeId,
    distance_fn: DistanceFunction,
    storage_capacity_bytes: u64,
    entries: Mutex<Entries>,
    radius: SharedRadius,
}

impl MemoryContentStore {
    /// Create an empty store.
    ///
    /// Fails with [`ContentStoreError::InvalidConfig`] for a zero capacity.
    pub fn new(node_id: NodeId, storage_capacity_bytes: u64) -> ContentStoreResult<Self> {
        if storage_capacity_bytes == 0 {
            return Err(ContentStoreError::invalid_config(
                "storage capacity must be greater than zero",
            ));
        }
        Ok(Self {
            node_id,
            distance_fn: DistanceFunction::Xor,
            storage_capacity_bytes,
            entries: Mutex::default(),
            radius: SharedRadius::default(),
        })
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.entries.lock().rows.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate size of stored values.
    pub fn total_bytes(&self) -> u64 {
        self.entries.lock().total_bytes
    }

    fn distance(&self, content_id: &ContentId) -> Distance {
        self.distance_fn.distance(&self.node_id, content_id)
    }
}

impl ContentStore for MemoryContentStore {
    fn get(&self, _content_key: &[u8], content_id: &ContentId) -> ContentStoreResult<Vec<u8>> {
        self.entries
            .lock()
            .rows
            .get(content_id)
            .map(|(_, value)| value.clone())
            .ok_or(ContentStoreError::NotFound {
                content_id: *content_id,
            })
    }

    fn put(
        &self,
        content_key: &[u8],
        content_id: &ContentId,
        content_value: &[u8],
    ) -> ContentStoreResult<()> {
        let mut guard = self.entries.lock();
        let entries = &mut *guard;
        if entries.rows.contains_key(content_id) {
            return Ok(());
        }

        let size = content_value.len() as u64;
        entries
            .rows
            .insert(*content_id, (content_key.to_vec(), content_value.to_vec()));
        entries
            .by_distance
            .insert((self.distance(content_id), *content_id), size);
        entries.total_bytes += size;

        if entries.total_bytes <= self.storage_capacity_bytes {
            return Ok(());
        }

        let current = self.radius.load();
        while let Some((&(distance, farthest), &size)) = entries.by_distance.last_key_value() {
            if entries.total_bytes <= self.storage_capacity_bytes && distance <= current {
                break;
            }
            entries.by_distance.pop_last();
            entries.rows.remove(&farthest);
            entries.total_bytes -= size;
        }

        let radius = entries
            .by_distance
            .last_key_value()
            .map_or(Distance::ZERO, |(&(distance, _), _)| distance);
        self.radius.store(radius);
        Ok(())
    }

    fn radius(&self) -> Distance {
        self.radius.load()
    }
}
