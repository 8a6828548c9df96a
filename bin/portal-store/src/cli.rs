//! Command line interface.

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr, eyre};
use portal_observability::{LogArgs, init_logging};
use portal_primitives::{ContentId, NodeId};
use portal_storage::{
    ContentStore, ContentType, IdIndexedV1Store, StorageArgs, StorageConfig, create_store,
};
use tracing::debug;

/// Portal content store - inspect and operate the node-local content database.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    logs: LogArgs,

    /// Storage configuration.
    #[command(flatten)]
    storage: StorageArgs,

    /// Identifier of the local node, as 32 hex-encoded bytes.
    #[arg(long = "node-id", global = true, default_value_t = NodeId::ZERO)]
    node_id: NodeId,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Print usage and radius of every configured namespace.
    Info,
    /// Print the hex-encoded value stored under a content id.
    Get {
        /// Namespace to read from.
        #[arg(long, default_value_t = ContentType::History)]
        content_type: ContentType,
        /// Content id.
        content_id: ContentId,
    },
    /// Store a hex-encoded key and value under a content id.
    Put {
        /// Namespace to write to.
        #[arg(long, default_value_t = ContentType::History)]
        content_type: ContentType,
        /// Content id.
        content_id: ContentId,
        /// Hex-encoded content key.
        content_key: String,
        /// Hex-encoded content value.
        content_value: String,
    },
    /// List stored content keys.
    Keys {
        /// Namespace to list.
        #[arg(long, default_value_t = ContentType::History)]
        content_type: ContentType,
        /// Number of keys to skip.
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Maximum number of keys to print.
        #[arg(long, default_value_t = 100)]
        limit: u64,
    },
    /// Delete the content stored under a content id.
    Evict {
        /// Namespace to delete from.
        #[arg(long, default_value_t = ContentType::History)]
        content_type: ContentType,
        /// Content id.
        content_id: ContentId,
    },
}

/// Parse arguments, set up logging and run the selected command.
pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.logs)?;

    let config = cli
        .storage
        .open_config(cli.node_id)
        .wrap_err("failed to open storage")?;
    debug!(data_dir = %cli.storage.data_dir.display(), node_id = %cli.node_id, "Opened storage");

    match cli.command {
        Commands::Info => {
            for content_type in &cli.storage.content_types {
                let store = open_store(*content_type, &config)?;
                let usage = store.usage_stats();
                println!(
                    "{content_type}: entries={} bytes={} capacity={} radius={}",
                    usage.entry_count,
                    usage.total_entry_size_bytes,
                    store.storage_capacity_bytes(),
                    store.radius()
                );
            }
        }
        Commands::Get {
            content_type,
            content_id,
        } => {
            let store = open_store(content_type, &config)?;
            let value = store
                .lookup_content_value(&content_id)?
                .ok_or_else(|| eyre!("content not found: {content_id}"))?;
            println!("{}", hex::encode(value));
        }
        Commands::Put {
            content_type,
            content_id,
            content_key,
            content_value,
        } => {
            let store = open_store(content_type, &config)?;
            let key = decode_hex(&content_key).wrap_err("invalid content key")?;
            let value = decode_hex(&content_value).wrap_err("invalid content value")?;
            store.put(&key, &content_id, &value)?;
            println!("radius={}", store.radius());
        }
        Commands::Keys {
            content_type,
            offset,
            limit,
        } => {
            let store = open_store(content_type, &config)?;
            let page = store.paginate(offset, limit)?;
            for key in &page.content_keys {
                println!("{}", hex::encode(key));
            }
            println!("total={}", page.total_entries);
        }
        Commands::Evict {
            content_type,
            content_id,
        } => {
            let store = open_store(content_type, &config)?;
            match store.evict(&content_id)? {
                Some(freed) => println!("freed={freed}"),
                None => return Err(eyre!("content not found: {content_id}")),
            }
        }
    }
    Ok(())
}

fn open_store(content_type: ContentType, config: &StorageConfig) -> Result<IdIndexedV1Store> {
    create_store(content_type, config.clone(), &config.sql_connection_pool)
        .wrap_err_with(|| format!("failed to open {content_type} store"))
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(input.strip_prefix("0x").unwrap_or(input))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_put() {
        let cli = Cli::try_parse_from([
            "portal-store",
            "--storage.capacity-mb",
            "1",
            "put",
            "--content-type",
            "state",
            "0x0000000000000000000000000000000000000000000000000000000000000001",
            "0xaa",
            "bbcc",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Put {
                content_type: ContentType::State,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0xbeef").unwrap(), vec![0xbe, 0xef]);
        assert_eq!(decode_hex("beef").unwrap(), vec![0xbe, 0xef]);
        assert!(decode_hex("xyz").is_err());
    }
}
