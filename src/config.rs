use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{cycle_duration::CycleBounds, error::ConfigError};

/// Timing settings for a [`PhaseCycler`](crate::phase_cycler::PhaseCycler).
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclerConfig {
    /// Shortest time a phase is held, in seconds
    pub min_cycle_seconds: f64,
    /// Longest time a phase is held, in seconds
    pub max_cycle_seconds: f64,
    /// How long the cycling loop sleeps between checks of the elapsed time
    pub poll_interval_ms: u64,
    /// Fixed seed for the cycle length generator. Unset means seeded from the OS
    pub seed: Option<u64>,
}

impl Default for CyclerConfig {
    fn default() -> Self {
        Self {
            min_cycle_seconds: 4.0,
            max_cycle_seconds: 6.0,
            poll_interval_ms: 1,
            seed: None,
        }
    }
}

impl CyclerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        Ok(())
    }

    pub fn bounds(&self) -> Result<CycleBounds, ConfigError> {
        CycleBounds::new(self.min_cycle_seconds, self.max_cycle_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
