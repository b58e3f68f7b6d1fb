use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Per-user directories for the runner, following platform conventions
/// (XDG on Linux, Application Support on macOS, %APPDATA% on Windows).
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// `None` when no home directory can be determined
    pub fn new(name: &str) -> Option<Self> {
        ProjectDirs::from("", "", name).map(|dirs| Self { dirs })
    }

    pub fn config_dir(&self) -> &Path {
        self.dirs.config_dir()
    }

    pub fn data_dir(&self) -> &Path {
        self.dirs.data_dir()
    }

    /// Default location of the runner's config file
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    /// Directory log files are written to
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}
