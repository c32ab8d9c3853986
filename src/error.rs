use std::{io, path::PathBuf};

use thiserror::Error;

/// Problems loading or validating a [`CyclerConfig`](crate::config::CyclerConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Cycle bounds must be finite, non-negative and ordered
    #[error("invalid cycle bounds [{low}, {high}] seconds")]
    InvalidBounds { low: f64, high: f64 },

    #[error("poll interval must be at least 1ms")]
    InvalidPollInterval,
}

/// Failures starting a [`PhaseCycler`](crate::phase_cycler::PhaseCycler)
#[derive(Debug, Error)]
pub enum CyclerError {
    #[error("phase cycler is already running")]
    AlreadyRunning,

    #[error("phase cycler has been shut down")]
    ShutDown,

    #[error("failed to spawn cycling thread: {0}")]
    Spawn(#[from] io::Error),
}
