//! A traffic light that toggles between red and green on a background thread, and the blocking
//! message queue other threads use to wait for a given phase.

pub mod config;
pub mod cycle_duration;
pub mod error;
pub mod logging;
pub mod phase;
pub mod phase_cycler;
pub mod system;

pub use config::CyclerConfig;
pub use error::{ConfigError, CyclerError};
pub use phase::Phase;
pub use phase_cycler::PhaseCycler;
pub use system::{MessageQueue, RecvError};
