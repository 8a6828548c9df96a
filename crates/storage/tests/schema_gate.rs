//! Startup gating on the recorded schema version.

use assert_matches::assert_matches;
use portal_storage::{
    ContentId, ContentStore, ContentStoreError, ContentType, IdIndexedV1Store, NodeId,
    StorageConfig, StoreVersion, VersionedContentStore, create_store, setup_sql,
    versioned::{lookup_store_version, update_store_info},
};
use tempfile::TempDir;

#[test]
fn test_fresh_database_opens_every_namespace() {
    let temp_dir = TempDir::new().unwrap();
    let pool = setup_sql(temp_dir.path()).unwrap();
    let config = StorageConfig::new(NodeId::ZERO, 1_000, pool.clone()).unwrap();

    for content_type in [ContentType::History, ContentType::State] {
        let store: IdIndexedV1Store = create_store(content_type, config.clone(), &pool).unwrap();
        assert_eq!(store.content_type(), content_type);
    }

    let conn = pool.get().unwrap();
    assert_eq!(
        lookup_store_version(ContentType::State, &conn).unwrap().as_deref(),
        Some("id_indexed_v1")
    );
}

#[test]
fn test_data_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let content_id = ContentId::new([3u8; 32]);
    {
        let pool = setup_sql(temp_dir.path()).unwrap();
        let config = StorageConfig::new(NodeId::ZERO, 1_000, pool.clone()).unwrap();
        let store: IdIndexedV1Store = create_store(ContentType::History, config, &pool).unwrap();
        store.put(b"key", &content_id, b"value").unwrap();
    }

    let pool = setup_sql(temp_dir.path()).unwrap();
    let config = StorageConfig::new(NodeId::ZERO, 1_000, pool.clone()).unwrap();
    let store: IdIndexedV1Store = create_store(ContentType::History, config, &pool).unwrap();
    assert_eq!(store.get(b"key", &content_id).unwrap(), b"value".to_vec());
}

#[test]
fn test_mismatched_version_refused_before_serving() {
    let temp_dir = TempDir::new().unwrap();
    let pool = setup_sql(temp_dir.path()).unwrap();
    let config = StorageConfig::new(NodeId::ZERO, 1_000, pool.clone()).unwrap();

    let store: IdIndexedV1Store =
        create_store(ContentType::History, config.clone(), &pool).unwrap();
    drop(store);

    pool.get()
        .unwrap()
        .execute(
            "UPDATE store_info SET version = 'id_indexed_v2' WHERE content_type = 'history'",
            [],
        )
        .unwrap();

    let result = create_store::<IdIndexedV1Store>(ContentType::History, config.clone(), &pool);
    assert_matches!(
        result,
        Err(ContentStoreError::SchemaMismatch {
            content_type: ContentType::History,
            expected: StoreVersion::IdIndexedV1,
            ..
        })
    );

    // other namespaces are unaffected
    let state: IdIndexedV1Store = create_store(ContentType::State, config, &pool).unwrap();
    assert_eq!(state.radius(), portal_storage::Distance::MAX);
}

#[test]
fn test_recorded_version_matches_implementation() {
    let temp_dir = TempDir::new().unwrap();
    let pool = setup_sql(temp_dir.path()).unwrap();
    let conn = pool.get().unwrap();
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS store_info (content_type TEXT PRIMARY KEY, version TEXT NOT NULL)",
    )
    .unwrap();
    update_store_info(ContentType::History, IdIndexedV1Store::version(), &conn).unwrap();
    drop(conn);

    let config = StorageConfig::new(NodeId::ZERO, 1_000, pool.clone()).unwrap();
    assert!(create_store::<IdIndexedV1Store>(ContentType::History, config, &pool).is_ok());
}
