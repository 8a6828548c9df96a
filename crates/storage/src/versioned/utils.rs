use r2d2::Pool;
use r2d2_sqlite::{
    SqliteConnectionManager,
    rusqlite::{Connection, OptionalExtension, params},
};
use tracing::{debug, info};

use super::{
    ContentType, StoreVersion, VersionedContentStore,
    sql::{STORE_INFO_CREATE_TABLE, STORE_INFO_LOOKUP, STORE_INFO_UPDATE},
};
use crate::ContentStoreResult;

/// Evidence that [`create_store`] checked the recorded schema version of a
/// namespace.
///
/// Only [`create_store`] can produce one, so every [`VersionedContentStore`]
/// is opened through the version gate.
///
/// ```compile_fail
/// let _ = portal_storage::SchemaChecked(());
/// ```
#[derive(Debug)]
pub struct SchemaChecked(());

/// Open the store of `content_type`, gating on its recorded schema version.
///
/// - no recorded version: the table is created and the version recorded
/// - same version: the table is opened as is
/// - other version: [`VersionedContentStore::migrate_from`] must succeed
///   before the table is opened and the new version recorded
///
/// No store is returned unless the gate passed.
pub fn create_store<S: VersionedContentStore>(
    content_type: ContentType,
    config: S::Config,
    sql_connection_pool: &Pool<SqliteConnectionManager>,
) -> ContentStoreResult<S> {
    let conn = sql_connection_pool.get()?;
    conn.execute_batch(STORE_INFO_CREATE_TABLE)?;

    let Some(old_version) = lookup_store_version(content_type, &conn)? else {
        debug!(%content_type, version = %S::version(), "Creating new store");
        let store = S::create(content_type, config, SchemaChecked(()))?;
        update_store_info(content_type, S::version(), &conn)?;
        return Ok(store);
    };

    if old_version == S::version().as_ref() {
        debug!(%content_type, version = %S::version(), "Opening existing store");
        return S::create(content_type, config, SchemaChecked(()));
    }

    info!(
        %content_type,
        from = %old_version,
        to = %S::version(),
        "Migrating store"
    );
    S::migrate_from(content_type, &old_version, &config)?;
    let store = S::create(content_type, config, SchemaChecked(()))?;
    update_store_info(content_type, S::version(), &conn)?;
    Ok(store)
}

/// The version string recorded for `content_type`, if any.
pub fn lookup_store_version(
    content_type: ContentType,
    conn: &Connection,
) -> ContentStoreResult<Option<String>> {
    Ok(conn
        .query_row(STORE_INFO_LOOKUP, [content_type.as_ref()], |row| row.get(0))
        .optional()?)
}

/// Record `version` as the schema version of `content_type`.
pub fn update_store_info(
    content_type: ContentType,
    version: StoreVersion,
    conn: &Connection,
) -> ContentStoreResult<()> {
    conn.execute(
        STORE_INFO_UPDATE,
        params![content_type.as_ref(), version.as_ref()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentStoreError, setup_sql};
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    /// Records which hooks the gate invoked.
    #[derive(Debug)]
    struct ProbeStore {
        content_type: ContentType,
    }

    /// Accepts migration from `id_indexed_v0` only.
    #[derive(Debug)]
    struct MigratingStore;

    impl VersionedContentStore for ProbeStore {
        type Config = ();

        fn version() -> StoreVersion {
            StoreVersion::IdIndexedV1
        }

        fn create(
            content_type: ContentType,
            _config: (),
            _checked: SchemaChecked,
        ) -> ContentStoreResult<Self> {
            Ok(Self { content_type })
        }
    }

    impl VersionedContentStore for MigratingStore {
        type Config = ();

        fn version() -> StoreVersion {
            StoreVersion::IdIndexedV1
        }

        fn migrate_from(
            content_type: ContentType,
            old_version: &str,
            _config: &(),
        ) -> ContentStoreResult<()> {
            match old_version {
                "id_indexed_v0" => Ok(()),
                _ => Err(ContentStoreError::SchemaMismatch {
                    content_type,
                    found: old_version.to_string(),
                    expected: Self::version(),
                }),
            }
        }

        fn create(
            _content_type: ContentType,
            _config: (),
            _checked: SchemaChecked,
        ) -> ContentStoreResult<Self> {
            Ok(Self)
        }
    }

    fn record(pool: &Pool<SqliteConnectionManager>, content_type: ContentType, version: &str) {
        let conn = pool.get().unwrap();
        conn.execute_batch(STORE_INFO_CREATE_TABLE).unwrap();
        conn.execute(STORE_INFO_UPDATE, params![content_type.as_ref(), version])
            .unwrap();
    }

    #[test]
    fn test_fresh_namespace_records_version() {
        let temp_dir = TempDir::new().unwrap();
        let pool = setup_sql(temp_dir.path()).unwrap();

        let store: ProbeStore = create_store(ContentType::History, (), &pool).unwrap();
        assert_eq!(store.content_type, ContentType::History);

        let conn = pool.get().unwrap();
        assert_eq!(
            lookup_store_version(ContentType::History, &conn).unwrap(),
            Some("id_indexed_v1".to_string())
        );
        assert_eq!(lookup_store_version(ContentType::State, &conn).unwrap(), None);
    }

    #[test]
    fn test_same_version_opens() {
        let temp_dir = TempDir::new().unwrap();
        let pool = setup_sql(temp_dir.path()).unwrap();
        record(&pool, ContentType::State, "id_indexed_v1");

        let store: ProbeStore = create_store(ContentType::State, (), &pool).unwrap();
        assert_eq!(store.content_type, ContentType::State);
    }

    #[test]
    fn test_unregistered_version_refused() {
        let temp_dir = TempDir::new().unwrap();
        let pool = setup_sql(temp_dir.path()).unwrap();
        record(&pool, ContentType::History, "id_indexed_v7");

        let result = create_store::<ProbeStore>(ContentType::History, (), &pool);
        assert_matches!(
            result,
            Err(ContentStoreError::SchemaMismatch { content_type: ContentType::History, found, .. })
                if found == "id_indexed_v7"
        );

        // the registry is left untouched
        let conn = pool.get().unwrap();
        assert_eq!(
            lookup_store_version(ContentType::History, &conn).unwrap(),
            Some("id_indexed_v7".to_string())
        );
    }

    #[test]
    fn test_registered_migration_updates_version() {
        let temp_dir = TempDir::new().unwrap();
        let pool = setup_sql(temp_dir.path()).unwrap();
        record(&pool, ContentType::History, "id_indexed_v0");

        create_store::<MigratingStore>(ContentType::History, (), &pool).unwrap();

        let conn = pool.get().unwrap();
        assert_eq!(
            lookup_store_version(ContentType::History, &conn).unwrap(),
            Some("id_indexed_v1".to_string())
        );
    }

    #[test]
    fn test_failed_migration_keeps_old_version() {
        let temp_dir = TempDir::new().unwrap();
        let pool = setup_sql(temp_dir.path()).unwrap();
        record(&pool, ContentType::State, "legacy");

        let result = create_store::<MigratingStore>(ContentType::State, (), &pool);
        assert_matches!(result, Err(ContentStoreError::SchemaMismatch { .. }));

        let conn = pool.get().unwrap();
        assert_eq!(
            lookup_store_version(ContentType::State, &conn).unwrap(),
            Some("legacy".to_string())
        );
    }
}
