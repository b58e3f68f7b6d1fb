//! Frame-loop driver for the `tickflow` scheduler: config file, logging,
//! a clamped and scalable frame clock, fixed-step and real-time drivers,
//! and the demo scene run by the `tickflow` binary.

pub mod clock;
pub mod config;
pub mod demo;
pub mod driver;
pub mod error;
pub mod logging;
pub mod paths;

use std::path::Path;

pub use clock::FrameClock;
pub use config::{ConfigError, FrameConfig, LoggingConfig, RunnerConfig};
pub use demo::{Actor, Demo};
pub use driver::{FrameDriver, RunLimits, RunStats, StopReason};
pub use error::RunnerError;
pub use logging::init_logging;

/// Load `path`, or the default config file when `path` is `None`.
///
/// An explicit path must exist. A missing default file yields defaults.
pub fn load_config(path: Option<&Path>) -> Result<RunnerConfig, RunnerError> {
    match path {
        Some(path) => Ok(RunnerConfig::load_from(path)?),
        None => {
            let path = RunnerConfig::default_path().ok_or(RunnerError::NoConfigPath)?;
            Ok(RunnerConfig::load_or_default(&path)?)
        }
    }
}
