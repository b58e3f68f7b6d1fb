use tickflow::FlowError;

use crate::config::ConfigError;

/// Errors surfaced by the frame drivers and demo setup
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Scheduler rejected a call: {0}")]
    Flow(#[from] FlowError),

    #[error("No config path given and no home directory found")]
    NoConfigPath,
}
