use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::paths::ProjectPaths;

const MAX_LOG_SIZE: u64 = 1024 * 1024; // 1MB

/// Initialize logging for a component.
///
/// - `component_name`: Name of the log file stem (e.g., "tickflow")
/// - `config`: Enables the file layer and supplies the fallback filter
/// - `verbosity`: Count of `-d` flags; 1 forces debug, 2 or more forces trace
///
/// RUST_LOG wins over both `verbosity` and `config.filter`.
///
/// Returns a guard that must be kept alive for the duration of the program.
pub fn init_logging(
    component_name: &str,
    config: &LoggingConfig,
    verbosity: u8,
) -> io::Result<Option<WorkerGuard>> {
    let directive = filter_directive(&config.filter, verbosity);

    if config.file {
        let log_dir = get_log_directory()?;
        fs::create_dir_all(&log_dir)?;

        let log_path = log_dir.join(format!("{}.log", component_name));
        truncate_if_needed(&log_path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let (non_blocking_file, guard) = tracing_appender::non_blocking(BufWriter::new(file));

        tracing_subscriber::registry()
            .with(env_filter(&directive))
            .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
            .with(
                fmt::layer()
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_target(true),
            )
            .init();

        tracing::info!("Logging to file: {}", log_path.display());

        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(&directive))
            .init();

        Ok(None)
    }
}

fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Filter used when RUST_LOG is unset
pub fn filter_directive(configured: &str, verbosity: u8) -> String {
    match verbosity {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn get_log_directory() -> io::Result<PathBuf> {
    let proj_paths = ProjectPaths::new("tickflow")
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Failed to find home directory"))?;

    Ok(proj_paths.log_dir())
}

/// Empty the file when it has grown past MAX_LOG_SIZE
fn truncate_if_needed(log_path: &Path) -> io::Result<()> {
    if log_path.exists() && fs::metadata(log_path)?.len() > MAX_LOG_SIZE {
        let file = File::create(log_path)?;
        file.set_len(0)?;
    }
    Ok(())
}
