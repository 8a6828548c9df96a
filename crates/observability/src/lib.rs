//! Logging for portal binaries.

use clap::Args;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor `--log.filter` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Logging arguments.
#[derive(Debug, Default, Args, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[command(next_help_heading = "Logging")]
#[serde(default)]
pub struct LogArgs {
    /// Log filter directives, e.g. `info,portal_storage=debug`.
    ///
    /// Takes precedence over `RUST_LOG`.
    #[arg(long = "log.filter")]
    pub filter: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long = "log.json")]
    pub json: bool,

    /// Disable ANSI colours.
    #[arg(long = "log.no-color")]
    pub no_color: bool,
}

impl LogArgs {
    fn env_filter(&self) -> eyre::Result<EnvFilter> {
        match &self.filter {
            Some(directives) => EnvFilter::try_new(directives)
                .wrap_err_with(|| format!("invalid log filter: {directives}")),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))),
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init_logging(args: &LogArgs) -> eyre::Result<()> {
    let env_filter = args.env_filter()?;

    let layer = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color && !args.json);
    let layer = if args.json {
        layer.json().boxed()
    } else {
        layer.boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_filter_wins() {
        let args = LogArgs {
            filter: Some("warn,portal_storage=trace".to_string()),
            ..Default::default()
        };
        assert!(args.env_filter().is_ok());
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let args = LogArgs {
            filter: Some("portal_storage=loudest".to_string()),
            ..Default::default()
        };
        assert!(args.env_filter().is_err());
    }
}
