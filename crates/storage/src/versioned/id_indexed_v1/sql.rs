//! SQL statements of the id-indexed content table.
//!
//! Table names come only from [`table_name`], never from caller input.

use crate::versioned::ContentType;

/// Name of the content table of `content_type`.
pub(crate) fn table_name(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::History => "ii1_history",
        ContentType::State => "ii1_state",
    }
}

pub(crate) fn create_table(content_type: ContentType) -> String {
    let table = table_name(content_type);
    format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            content_id BLOB PRIMARY KEY,
            content_key BLOB NOT NULL,
            content_value BLOB NOT NULL,
            distance_short INTEGER NOT NULL,
            content_size INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS {table}_distance_short_idx ON {table} (distance_short);
        CREATE INDEX IF NOT EXISTS {table}_content_size_idx ON {table} (content_size);
        "
    )
}

pub(crate) fn insert(content_type: ContentType) -> String {
    format!(
        "
        INSERT OR IGNORE INTO {} (
            content_id,
            content_key,
            content_value,
            distance_short,
            content_size
        )
        VALUES (?1, ?2, ?3, ?4, ?5)",
        table_name(content_type)
    )
}

pub(crate) fn delete(content_type: ContentType) -> String {
    format!(
        "
        DELETE FROM {}
        WHERE content_id = (?1)
        RETURNING content_size",
        table_name(content_type)
    )
}

/// Ties on `distance_short` go to the oldest row.
pub(crate) fn delete_farthest(content_type: ContentType) -> String {
    let table = table_name(content_type);
    format!(
        "
        DELETE FROM {table}
        WHERE rowid IN (
            SELECT rowid
            FROM {table}
            ORDER BY distance_short DESC, rowid ASC
            LIMIT (?1)
        )
        RETURNING content_size"
    )
}

/// Every row sharing the greatest `distance_short`.
pub(crate) fn lookup_farthest(content_type: ContentType) -> String {
    let table = table_name(content_type);
    format!(
        "
        SELECT content_id
        FROM {table}
        WHERE distance_short = (SELECT MAX(distance_short) FROM {table})"
    )
}

pub(crate) fn lookup_key(content_type: ContentType) -> String {
    format!(
        "SELECT content_key FROM {} WHERE content_id = (?1) LIMIT 1",
        table_name(content_type)
    )
}

pub(crate) fn lookup_value(content_type: ContentType) -> String {
    format!(
        "SELECT content_value FROM {} WHERE content_id = (?1) LIMIT 1",
        table_name(content_type)
    )
}

pub(crate) fn contains(content_type: ContentType) -> String {
    format!(
        "SELECT 1 FROM {} WHERE content_id = (?1) LIMIT 1",
        table_name(content_type)
    )
}

pub(crate) fn entry_count_and_size(content_type: ContentType) -> String {
    format!(
        "SELECT COUNT(*), COALESCE(SUM(content_size), 0) FROM {}",
        table_name(content_type)
    )
}

pub(crate) fn paginate(content_type: ContentType) -> String {
    format!(
        "SELECT content_key FROM {} ORDER BY rowid LIMIT (?1) OFFSET (?2)",
        table_name(content_type)
    )
}

pub(crate) fn delete_all(content_type: ContentType) -> String {
    format!("DELETE FROM {}", table_name(content_type))
}
