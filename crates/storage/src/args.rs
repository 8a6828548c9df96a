//! Storage CLI arguments.

use std::path::PathBuf;

use clap::Args;
use portal_primitives::NodeId;
use serde::{Deserialize, Serialize};

use crate::{
    BYTES_IN_MB_U64, ContentStoreError, ContentStoreResult, StorageConfig, setup_sql,
    versioned::ContentType,
};

/// Default storage capacity in megabytes.
pub const DEFAULT_STORAGE_CAPACITY_MB: u64 = 1000;

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "./portal-data";

/// Storage configuration arguments.
#[derive(Debug, Args, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[command(next_help_heading = "Storage")]
#[serde(default)]
pub struct StorageArgs {
    /// Directory holding the content database.
    #[arg(long = "storage.datadir", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Capacity of each content namespace in megabytes.
    #[arg(long = "storage.capacity-mb", default_value_t = DEFAULT_STORAGE_CAPACITY_MB)]
    pub capacity_mb: u64,

    /// Content namespaces to open.
    #[arg(
        long = "storage.content-types",
        value_delimiter = ',',
        default_value = "history"
    )]
    pub content_types: Vec<ContentType>,
}

impl Default for StorageArgs {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            capacity_mb: DEFAULT_STORAGE_CAPACITY_MB,
            content_types: vec![ContentType::History],
        }
    }
}

impl StorageArgs {
    /// Capacity per namespace in bytes.
    pub fn storage_capacity_bytes(&self) -> ContentStoreResult<u64> {
        match self.capacity_mb.checked_mul(BYTES_IN_MB_U64) {
            Some(0) => Err(ContentStoreError::invalid_config(
                "storage capacity must be greater than zero",
            )),
            Some(bytes) => Ok(bytes),
            None => Err(ContentStoreError::invalid_config(format!(
                "storage capacity of {} MB is too large",
                self.capacity_mb
            ))),
        }
    }

    /// Validate the arguments and open the shared database.
    ///
    /// Capacity is checked before anything is created on disk.
    pub fn open_config(&self, node_id: NodeId) -> ContentStoreResult<StorageConfig> {
        let capacity = self.storage_capacity_bytes()?;
        if self.content_types.is_empty() {
            return Err(ContentStoreError::invalid_config(
                "at least one content type is required",
            ));
        }
        let pool = setup_sql(&self.data_dir)?;
        StorageConfig::new(node_id, capacity, pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        storage: StorageArgs,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["portal"]).unwrap();
        assert_eq!(cli.storage, StorageArgs::default());
        assert_eq!(
            cli.storage.storage_capacity_bytes().unwrap(),
            DEFAULT_STORAGE_CAPACITY_MB * BYTES_IN_MB_U64
        );
    }

    #[test]
    fn test_parse_content_types() {
        let cli = TestCli::try_parse_from([
            "portal",
            "--storage.content-types",
            "history,state",
            "--storage.capacity-mb",
            "5",
        ])
        .unwrap();
        assert_eq!(
            cli.storage.content_types,
            vec![ContentType::History, ContentType::State]
        );
        assert_eq!(cli.storage.storage_capacity_bytes().unwrap(), 5_000_000);
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let result =
            TestCli::try_parse_from(["portal", "--storage.content-types", "beacon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_capacity_fails_before_disk_access() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let args = StorageArgs {
            data_dir: temp_dir.path().join("never-created"),
            capacity_mb: 0,
            ..Default::default()
        };
        assert_matches!(
            args.open_config(NodeId::ZERO),
            Err(ContentStoreError::InvalidConfig { .. })
        );
        assert!(!args.data_dir.exists());
    }
}
