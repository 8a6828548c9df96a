//! Store configuration and the shared SQLite handle.

use std::{path::Path, time::Duration};

use portal_primitives::{DistanceFunction, NodeId};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::{ContentStoreError, ContentStoreResult};

/// Bytes per megabyte, as used by the capacity flags.
pub const BYTES_IN_MB_U64: u64 = 1000 * 1000;

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "portal.sqlite";

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Configuration consumed by a content store at construction.
///
/// The connection pool is shared by every namespace of one data directory.
/// Namespaces never share a lock in this crate, but SQLite admits one write
/// transaction per database file: puts to different namespaces commit one at
/// a time, each waiting up to the busy timeout (5s) for the file lock before
/// failing with [`ContentStoreError::Database`].
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Basis for all distance computations.
    pub node_id: NodeId,
    /// Upper bound on the aggregate size of stored rows.
    pub storage_capacity_bytes: u64,
    /// Metric used to order content by closeness.
    pub distance_fn: DistanceFunction,
    /// Shared connection pool to the backing database.
    pub sql_connection_pool: Pool<SqliteConnectionManager>,
}

impl StorageConfig {
    /// Build a validated config.
    ///
    /// Fails with [`ContentStoreError::InvalidConfig`] for a zero capacity.
    pub fn new(
        node_id: NodeId,
        storage_capacity_bytes: u64,
        sql_connection_pool: Pool<SqliteConnectionManager>,
    ) -> ContentStoreResult<Self> {
        if storage_capacity_bytes == 0 {
            return Err(ContentStoreError::invalid_config(
                "storage capacity must be greater than zero",
            ));
        }
        Ok(Self {
            node_id,
            storage_capacity_bytes,
            distance_fn: DistanceFunction::Xor,
            sql_connection_pool,
        })
    }

    /// Replace the distance function.
    pub fn with_distance_fn(mut self, distance_fn: DistanceFunction) -> Self {
        self.distance_fn = distance_fn;
        self
    }
}

/// Open (or create) the SQLite database in `data_dir` behind a connection pool.
///
/// Every connection runs in WAL mode with a busy timeout, so readers don't
/// block on the single writer of each namespace.
pub fn setup_sql(data_dir: &Path) -> ContentStoreResult<Pool<SqliteConnectionManager>> {
    std::fs::create_dir_all(data_dir)?;
    let sql_path = data_dir.join(DATABASE_FILE_NAME);
    info!(path = %sql_path.display(), "Setting up SQLite database");

    let manager = SqliteConnectionManager::file(sql_path).with_init(|conn| {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)
    });
    Ok(Pool::new(manager)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn test_zero_capacity_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let pool = setup_sql(temp_dir.path()).unwrap();
        let result = StorageConfig::new(NodeId::ZERO, 0, pool);
        assert_matches!(result, Err(ContentStoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_setup_sql_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested");
        let pool = setup_sql(&data_dir).unwrap();
        pool.get().unwrap().execute_batch("SELECT 1").unwrap();
        assert!(data_dir.join(DATABASE_FILE_NAME).exists());
    }
}
