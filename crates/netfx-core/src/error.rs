use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a [`NetworkConfig`](crate::config::NetworkConfig).
///
/// Simulation and rendering never fail; only reading configuration can.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
