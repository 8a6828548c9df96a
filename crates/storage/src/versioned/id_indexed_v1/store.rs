use parking_lot::Mutex;
use portal_primitives::{ContentId, Distance};
use r2d2_sqlite::rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info, trace};

use super::{IdIndexedV1StoreConfig, UsageStats, sql};
use crate::{
    ContentStore, ContentStoreError, ContentStoreResult, SharedRadius, ShouldWeStoreContent,
    StorageConfig,
    metrics::StorageMetrics,
    versioned::{ContentType, SchemaChecked, StoreVersion, VersionedContentStore},
};

/// A page of locally stored content keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginateLocalContentInfo {
    /// Keys in insertion order.
    pub content_keys: Vec<Vec<u8>>,
    /// Number of rows in the namespace.
    pub total_entries: u64,
}

/// Content store of one namespace, backed by an id-indexed SQLite table.
///
/// Every successful insert is followed, in the same transaction, by a
/// capacity check. While the namespace is over capacity the rows farthest
/// from the local node are deleted, and the radius is then shrunk to the
/// distance of the farthest row left.
///
/// Writers are serialized by the usage lock; readers (`get`, `radius`) take
/// no lock of this store.
#[derive(Debug)]
pub struct IdIndexedV1Store {
    config: IdIndexedV1StoreConfig,
    radius: SharedRadius,
    usage: Mutex<UsageStats>,
    metrics: StorageMetrics,
}

const _: () = {
    const fn assert_store<T: ContentStore + VersionedContentStore>() {}
    assert_store::<IdIndexedV1Store>();
};

impl VersionedContentStore for IdIndexedV1Store {
    type Config = StorageConfig;

    fn version() -> StoreVersion {
        StoreVersion::IdIndexedV1
    }

    fn create(
        content_type: ContentType,
        config: Self::Config,
        _checked: SchemaChecked,
    ) -> ContentStoreResult<Self> {
        let config = IdIndexedV1StoreConfig::new(content_type, config);
        let store = Self {
            radius: SharedRadius::default(),
            usage: Mutex::new(UsageStats::default()),
            metrics: StorageMetrics::new(content_type),
            config,
        };
        store.init()?;
        Ok(store)
    }
}

impl IdIndexedV1Store {
    /// Create the table and rebuild usage and radius from what is persisted.
    fn init(&self) -> ContentStoreResult<()> {
        if self.config.storage_capacity_bytes == 0 {
            return Err(ContentStoreError::invalid_config(
                "storage capacity must be greater than zero",
            ));
        }

        let mut conn = self.config.sql_connection_pool.get()?;
        conn.execute_batch(&sql::create_table(self.config.content_type))?;

        let mut usage = self.usage.lock();
        *usage = self.query_usage(&conn)?;
        self.metrics
            .report_capacity(self.config.storage_capacity_bytes);

        if usage.is_above(self.config.storage_capacity_bytes) {
            // capacity was lowered since the last run
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut next = *usage;
            let pruned = self.prune(&tx, &mut next)?;
            tx.commit()?;
            *usage = next;
            if let Some((evicted, radius)) = pruned {
                info!(
                    content_type = %self.config.content_type,
                    evicted,
                    %radius,
                    "Pruned store down to capacity"
                );
                self.publish_radius(radius);
            }
        } else if usage.total_entry_size_bytes >= self.config.full_threshold_bytes() {
            let radius = match self.lookup_farthest(&conn)? {
                Some((_, distance)) => distance,
                None => Distance::MAX,
            };
            self.publish_radius(radius);
        } else {
            self.publish_radius(Distance::MAX);
        }

        self.metrics
            .report_usage(usage.entry_count, usage.total_entry_size_bytes);
        debug!(
            content_type = %self.config.content_type,
            entries = usage.entry_count,
            bytes = usage.total_entry_size_bytes,
            radius = %self.radius.load(),
            "Opened content store"
        );
        Ok(())
    }

    /// The namespace this store serves.
    pub fn content_type(&self) -> ContentType {
        self.config.content_type
    }

    /// The configured capacity.
    pub fn storage_capacity_bytes(&self) -> u64 {
        self.config.storage_capacity_bytes
    }

    /// Distance between the local node and `content_id`.
    pub fn distance_to_content_id(&self, content_id: &ContentId) -> Distance {
        self.config
            .distance_fn
            .distance(&self.config.node_id, content_id)
    }

    /// Current row count and aggregate size.
    pub fn usage_stats(&self) -> UsageStats {
        *self.usage.lock()
    }

    /// Whether `content_id` should be offered to [`ContentStore::put`].
    ///
    /// `put` accepts content outside the radius and leaves it to eviction;
    /// this is for callers that want to filter beforehand.
    pub fn should_store(&self, content_id: &ContentId) -> ContentStoreResult<ShouldWeStoreContent> {
        if self.distance_to_content_id(content_id) > self.radius.load() {
            return Ok(ShouldWeStoreContent::NotWithinRadius);
        }
        if self.contains(content_id)? {
            return Ok(ShouldWeStoreContent::AlreadyStored);
        }
        Ok(ShouldWeStoreContent::Store)
    }

    /// Returns true if a row exists for `content_id`.
    pub fn contains(&self, content_id: &ContentId) -> ContentStoreResult<bool> {
        let conn = self.config.sql_connection_pool.get()?;
        let found = conn
            .query_row(
                &sql::contains(self.config.content_type),
                [content_id.as_slice()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// The key stored alongside `content_id`.
    pub fn lookup_content_key(&self, content_id: &ContentId) -> ContentStoreResult<Option<Vec<u8>>> {
        let conn = self.config.sql_connection_pool.get()?;
        Ok(conn
            .query_row(
                &sql::lookup_key(self.config.content_type),
                [content_id.as_slice()],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// The value stored under `content_id`.
    pub fn lookup_content_value(
        &self,
        content_id: &ContentId,
    ) -> ContentStoreResult<Option<Vec<u8>>> {
        let conn = self.config.sql_connection_pool.get()?;
        Ok(conn
            .query_row(
                &sql::lookup_value(self.config.content_type),
                [content_id.as_slice()],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Delete one row, returning the bytes it freed.
    ///
    /// The radius is not changed.
    pub fn evict(&self, content_id: &ContentId) -> ContentStoreResult<Option<u64>> {
        let mut usage = self.usage.lock();
        let conn = self.config.sql_connection_pool.get()?;
        let freed = self.delete(&conn, content_id)?;
        if let Some(size) = freed {
            usage.on_delete(size);
            self.metrics
                .report_usage(usage.entry_count, usage.total_entry_size_bytes);
            debug!(content_type = %self.config.content_type, %content_id, size, "Evicted content");
        }
        Ok(freed)
    }

    /// Keys of stored content, `limit` at a time starting at `offset`.
    pub fn paginate(&self, offset: u64, limit: u64) -> ContentStoreResult<PaginateLocalContentInfo> {
        let conn = self.config.sql_connection_pool.get()?;
        let mut stmt = conn.prepare(&sql::paginate(self.config.content_type))?;
        let content_keys = stmt
            .query_map([to_sql_int(limit), to_sql_int(offset)], |row| row.get(0))?
            .collect::<Result<Vec<Vec<u8>>, _>>()?;
        let total_entries = self.query_usage(&conn)?.entry_count;
        Ok(PaginateLocalContentInfo {
            content_keys,
            total_entries,
        })
    }

    /// Delete every row and reset the radius to full coverage.
    pub fn clear(&self) -> ContentStoreResult<()> {
        let mut usage = self.usage.lock();
        let conn = self.config.sql_connection_pool.get()?;
        conn.execute(&sql::delete_all(self.config.content_type), [])?;
        *usage = UsageStats::default();
        self.publish_radius(Distance::MAX);
        self.metrics.report_usage(0, 0);
        info!(content_type = %self.config.content_type, "Cleared content store");
        Ok(())
    }

    /// Evict farthest-first until `usage` fits the capacity.
    ///
    /// Returns `None` if nothing had to go, otherwise the number of evicted
    /// rows and the radius to publish once `conn`'s transaction commits.
    fn prune(
        &self,
        conn: &Connection,
        usage: &mut UsageStats,
    ) -> ContentStoreResult<Option<(u64, Distance)>> {
        let capacity = self.config.storage_capacity_bytes;
        if !usage.is_above(capacity) {
            return Ok(None);
        }

        let mut evicted = 0u64;
        let mut stmt = conn.prepare_cached(&sql::delete_farthest(self.config.content_type))?;
        while usage.is_above(capacity) {
            let excess = usage.total_entry_size_bytes - capacity;
            let batch = usage
                .average_entry_size_bytes()
                .map_or(1, |average| excess / average.max(1))
                .max(1);

            let freed = stmt
                .query_map([to_sql_int(batch)], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            if freed.is_empty() {
                return Err(ContentStoreError::InvalidData {
                    message: format!(
                        "{} bytes accounted but no rows left to evict",
                        usage.total_entry_size_bytes
                    ),
                });
            }
            for size in freed {
                usage.on_delete(from_sql_int(size));
                evicted += 1;
            }
            trace!(
                content_type = %self.config.content_type,
                batch,
                bytes = usage.total_entry_size_bytes,
                "Evicted farthest batch"
            );
        }

        // Rows accepted outside the published radius go too, so the radius
        // never grows and never sits below a retained row.
        let current = self.radius.load();
        let radius = loop {
            let Some((farthest, distance)) = self.lookup_farthest(conn)? else {
                break Distance::ZERO;
            };
            if distance <= current {
                break distance;
            }
            if let Some(size) = self.delete(conn, &farthest)? {
                usage.on_delete(size);
                evicted += 1;
            }
        };

        Ok(Some((evicted, radius)))
    }

    fn delete(&self, conn: &Connection, content_id: &ContentId) -> ContentStoreResult<Option<u64>> {
        let size = conn
            .query_row(
                &sql::delete(self.config.content_type),
                [content_id.as_slice()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(size.map(from_sql_int))
    }

    /// The retained row with the greatest full distance, and that distance.
    ///
    /// `distance_short` only orders rows up to its 32 bits, so every row in
    /// the top bucket is compared on the full distance.
    fn lookup_farthest(
        &self,
        conn: &Connection,
    ) -> ContentStoreResult<Option<(ContentId, Distance)>> {
        let mut stmt = conn.prepare_cached(&sql::lookup_farthest(self.config.content_type))?;
        let mut rows = stmt.query([])?;
        let mut farthest: Option<(ContentId, Distance)> = None;
        while let Some(row) = rows.next()? {
            let bytes: Vec<u8> = row.get(0)?;
            let content_id = ContentId::try_from(bytes.as_slice()).map_err(|err| {
                ContentStoreError::InvalidData {
                    message: err.to_string(),
                }
            })?;
            let distance = self.distance_to_content_id(&content_id);
            if farthest.is_none_or(|(_, max)| distance > max) {
                farthest = Some((content_id, distance));
            }
        }
        Ok(farthest)
    }

    fn query_usage(&self, conn: &Connection) -> ContentStoreResult<UsageStats> {
        let (entry_count, total_entry_size_bytes) = conn.query_row(
            &sql::entry_count_and_size(self.config.content_type),
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;
        Ok(UsageStats {
            entry_count: from_sql_int(entry_count),
            total_entry_size_bytes: from_sql_int(total_entry_size_bytes),
        })
    }

    fn publish_radius(&self, radius: Distance) {
        self.radius.store(radius);
        self.metrics.report_radius(radius);
    }
}

impl ContentStore for IdIndexedV1Store {
    fn get(&self, _content_key: &[u8], content_id: &ContentId) -> ContentStoreResult<Vec<u8>> {
        self.lookup_content_value(content_id)?
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
        let mut usage = self.usage.lock();
        let mut conn = self.config.sql_connection_pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let distance = self.distance_to_content_id(content_id);
        let content_size = content_value.len() as u64;
        let inserted = tx.execute(
            &sql::insert(self.config.content_type),
            params![
                content_id.as_slice(),
                content_key,
                content_value,
                distance.big_endian_u32(),
                to_sql_int(content_size),
            ],
        )?;
        if inserted == 0 {
            trace!(content_type = %self.config.content_type, %content_id, "Content already stored");
            return Ok(());
        }

        let mut next = *usage;
        next.on_store(content_size);
        let pruned = self.prune(&tx, &mut next)?;

        // The shrunk radius goes out before the deletes become visible, so
        // readers never see a radius wider than the committed rows justify.
        let previous = self.radius.load();
        if let Some((_, radius)) = pruned {
            self.publish_radius(radius);
        }
        if let Err(err) = tx.commit() {
            self.publish_radius(previous);
            return Err(err.into());
        }

        *usage = next;
        self.metrics.inc_inserted();
        self.metrics
            .report_usage(usage.entry_count, usage.total_entry_size_bytes);
        if let Some((evicted, radius)) = pruned {
            debug!(
                content_type = %self.config.content_type,
                evicted,
                %radius,
                bytes = usage.total_entry_size_bytes,
                "Store over capacity, evicted farthest content"
            );
            self.metrics.inc_evicted(evicted);
        }
        Ok(())
    }

    fn radius(&self) -> Distance {
        self.radius.load()
    }
}

/// SQLite integers are signed; sizes and counts never reach `i64::MAX`.
fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_int(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}
