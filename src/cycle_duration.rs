use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::error::ConfigError;

/// A closed interval of cycle lengths, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleBounds {
    low_seconds: f64,
    high_seconds: f64,
}

impl Default for CycleBounds {
    fn default() -> Self {
        Self {
            low_seconds: 4.0,
            high_seconds: 6.0,
        }
    }
}

impl CycleBounds {
    pub fn new(low_seconds: f64, high_seconds: f64) -> Result<Self, ConfigError> {
        let valid = low_seconds.is_finite()
            && high_seconds.is_finite()
            && low_seconds >= 0.0
            && low_seconds <= high_seconds
            && Duration::try_from_secs_f64(high_seconds).is_ok();
        if !valid {
            return Err(ConfigError::InvalidBounds {
                low: low_seconds,
                high: high_seconds,
            });
        }
        Ok(Self {
            low_seconds,
            high_seconds,
        })
    }

    pub fn low_seconds(&self) -> f64 {
        self.low_seconds
    }

    pub fn high_seconds(&self) -> f64 {
        self.high_seconds
    }

    /// The longest cycle these bounds can produce. Always representable, `new` checks it
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs_f64(self.high_seconds)
    }
}

/// Draws random cycle lengths from one seeded generator
#[derive(Debug)]
pub struct CycleDuration {
    bounds: CycleBounds,
    rng: StdRng,
}

impl CycleDuration {
    /// `None` seeds the generator from the operating system
    pub fn new(bounds: CycleBounds, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { bounds, rng }
    }

    /// Uniformly samples a length in `[low, high]` seconds, both ends included
    pub fn next_seconds(&mut self) -> f64 {
        let CycleBounds {
            low_seconds: low,
            high_seconds: high,
        } = self.bounds;
        if low == high {
            return low;
        }
        self.rng.random_range(low..=high).clamp(low, high)
    }

    pub fn next_duration(&mut self) -> Duration {
        Duration::from_secs_f64(self.next_seconds())
    }
}
