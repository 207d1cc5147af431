//! CLI error types.

use ditaa_builder::BuildError;
use ditaa_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),
}
