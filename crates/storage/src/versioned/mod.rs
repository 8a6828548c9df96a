//! Versioned content stores.
//!
//! Every namespace records the schema version of its table in the shared
//! `store_info` registry. [`create_store`] consults the registry before a
//! store is handed out, so a namespace is never served from a table layout
//! the store implementation doesn't understand.

pub mod id_indexed_v1;
mod sql;
mod utils;

pub use utils::{SchemaChecked, create_store, lookup_store_version, update_store_info};

use crate::{ContentStoreError, ContentStoreResult};

/// The closed set of content namespaces.
///
/// Each one has its own table, radius and capacity; rows are never compared
/// across namespaces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Historical chain data.
    History,
    /// State data.
    State,
}

/// On-disk layout revision of a namespace's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr)]
pub enum StoreVersion {
    /// Rows indexed by content id, with a short distance column for eviction.
    #[strum(serialize = "id_indexed_v1")]
    IdIndexedV1,
}

/// A content store implementation bound to one schema version.
pub trait VersionedContentStore: Sized {
    /// Configuration needed to open the store.
    type Config;

    /// The schema version this implementation reads and writes.
    fn version() -> StoreVersion;

    /// Bring a namespace recorded at `old_version` up to [`Self::version`].
    ///
    /// Runs before [`Self::create`]. Without a registered migration the
    /// namespace is refused with [`ContentStoreError::SchemaMismatch`].
    fn migrate_from(
        content_type: ContentType,
        old_version: &str,
        _config: &Self::Config,
    ) -> ContentStoreResult<()> {
        Err(ContentStoreError::SchemaMismatch {
            content_type,
            found: old_version.to_string(),
            expected: Self::version(),
        })
    }

    /// Open the namespace's table at the current version, creating it if needed.
    ///
    /// Reached only through [`create_store`], which hands out the
    /// [`SchemaChecked`] token once the recorded version was accepted.
    fn create(
        content_type: ContentType,
        config: Self::Config,
        checked: SchemaChecked,
    ) -> ContentStoreResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_content_type_names() {
        assert_eq!(ContentType::History.to_string(), "history");
        assert_eq!(ContentType::from_str("state").unwrap(), ContentType::State);
        assert!(ContentType::from_str("beacon").is_err());
    }

    #[test]
    fn test_store_version_names() {
        assert_eq!(StoreVersion::IdIndexedV1.as_ref(), "id_indexed_v1");
        assert_eq!(
            StoreVersion::from_str("id_indexed_v1").unwrap(),
            StoreVersion::IdIndexedV1
        );
    }
}
