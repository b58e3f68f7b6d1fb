use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::paths::ProjectPaths;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error on config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Ticks per second for both drivers
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Multiplier applied to the scaled delta channel (0 pauses scaled flows)
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,

    /// Upper bound on a single real-time delta, in milliseconds
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: u64,

    /// Number of ticks to run (default: 240)
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Stop as soon as no flows are pending
    #[serde(default = "default_stop_when_idle")]
    pub stop_when_idle: bool,
}

fn default_tick_hz() -> u32 {
    60
}

fn default_time_scale() -> f32 {
    1.0
}

fn default_max_delta_ms() -> u64 {
    250
}

fn default_ticks() -> u64 {
    240
}

fn default_stop_when_idle() -> bool {
    true
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            tick_hz: default_tick_hz(),
            time_scale: default_time_scale(),
            max_delta_ms: default_max_delta_ms(),
            ticks: default_ticks(),
            stop_when_idle: default_stop_when_idle(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to `<data dir>/logs/<component>.log`
    #[serde(default)]
    pub file: bool,

    /// `EnvFilter` directive used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: false,
            filter: default_filter(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub frame: FrameConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RunnerConfig {
    /// Default config path, `None` when no home directory is available
    pub fn default_path() -> Option<PathBuf> {
        ProjectPaths::new("tickflow").map(|p| p.config_file())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(path) {
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let frame = &self.frame;
        if frame.tick_hz == 0 {
            return Err(ConfigError::Invalid("frame.tick_hz must be at least 1".into()));
        }
        if !frame.time_scale.is_finite() || frame.time_scale < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "frame.time_scale must be finite and non-negative (got {})",
                frame.time_scale
            )));
        }
        if frame.max_delta_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame.max_delta_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
