use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use tickflow_runner::{init_logging, load_config, Demo, FrameDriver, RunLimits, RunnerConfig};

#[derive(Parser)]
#[command(version, about = "Run the tickflow demo scene", long_about = None)]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/tickflow/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Ticks per second
    #[arg(long)]
    hz: Option<u32>,

    /// Multiplier for the scaled time channel
    #[arg(long)]
    time_scale: Option<f32>,

    /// Tick against the wall clock instead of a fixed step
    #[arg(long)]
    realtime: bool,

    /// Also log to the data directory
    #[arg(long)]
    log_file: bool,

    /// Enables debug mode (-dd for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

impl Cli {
    fn apply(&self, config: &mut RunnerConfig) {
        if let Some(ticks) = self.ticks {
            config.frame.ticks = ticks;
        }
        if let Some(hz) = self.hz {
            config.frame.tick_hz = hz;
        }
        if let Some(scale) = self.time_scale {
            config.frame.time_scale = scale;
        }
        if self.log_file {
            config.logging.file = true;
        }
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let _guard = init_logging("tickflow", &config.logging, cli.debug)?;

    info!("Starting tickflow demo...");

    let driver = FrameDriver::from_config(&config.frame);
    let demo = Demo::install(driver.scheduler())?;
    let limits = RunLimits::from(&config.frame);
    info!(
        "Step {:?}, time scale {}",
        driver.step(),
        driver.clock().time_scale()
    );

    let stats = if cli.realtime {
        driver.run_realtime(limits, ctrl_c()).await?
    } else {
        driver.run_fixed(limits)?
    };

    info!(
        "Stopped ({:?}) after {} ticks, {:.3}s simulated ({:.3}s wall), {} flows pending",
        stats.stopped,
        stats.ticks,
        stats.simulated_secs,
        driver.clock().elapsed_secs(),
        stats.pending_flows
    );
    info!("Ghost haunted {} times", demo.haunts.get());

    Ok(())
}
