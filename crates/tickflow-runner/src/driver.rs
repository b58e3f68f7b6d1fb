use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use tickflow::{Scheduler, TickTime};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::clock::FrameClock;
use crate::config::FrameConfig;
use crate::error::RunnerError;

/// When a run should end on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    /// Hard cap on ticks
    pub max_ticks: u64,
    /// Stop once the scheduler has no pending flows
    pub stop_when_idle: bool,
}

impl From<&FrameConfig> for RunLimits {
    fn from(config: &FrameConfig) -> Self {
        Self {
            max_ticks: config.ticks,
            stop_when_idle: config.stop_when_idle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TickLimit,
    Idle,
    Shutdown,
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub ticks: u64,
    /// Sum of unscaled deltas handed to the scheduler
    pub simulated_secs: f64,
    pub pending_flows: usize,
    pub stopped: StopReason,
}

/// Feeds a [`Scheduler`] from a [`FrameClock`], either at a fixed step or
/// against the wall clock.
pub struct FrameDriver<T: 'static> {
    scheduler: Scheduler<T>,
    clock: Rc<FrameClock>,
    step: Duration,
}

impl<T: 'static> FrameDriver<T> {
    /// The clock doubles as the scheduler's time source. It is primed with
    /// one nominal step so flows registered before the first tick are timed
    /// from that tick, like flows registered between later ticks.
    pub fn new(clock: FrameClock, tick_hz: u32) -> Self {
        let step = step_for(tick_hz);
        clock.prime(step);
        let clock = Rc::new(clock);
        let scheduler = Scheduler::with_time_source(clock.clone());
        Self {
            scheduler,
            clock,
            step,
        }
    }

    pub fn from_config(config: &FrameConfig) -> Self {
        let clock = FrameClock::new(
            config.time_scale,
            Duration::from_millis(config.max_delta_ms),
        );
        Self::new(clock, config.tick_hz)
    }

    pub fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Wall time between ticks
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Advance the clock by `raw` and run one scheduler pass
    pub fn advance(&self, raw: Duration) -> Result<TickTime, RunnerError> {
        let time = self.clock.advance(raw);
        self.scheduler.tick(time.delta, time.unscaled_delta)?;
        Ok(time)
    }

    /// Tick at exactly `step` per frame until a limit is hit
    pub fn run_fixed(&self, limits: RunLimits) -> Result<RunStats, RunnerError> {
        info!(
            "Running fixed-step: {} ticks max, step {:?}",
            limits.max_ticks, self.step
        );

        let mut run = RunState::default();
        let stopped = loop {
            if let Some(reason) = run.should_stop(&limits, &self.scheduler) {
                break reason;
            }
            run.record(self.advance(self.step)?);
        };

        Ok(run.finish(stopped, &self.scheduler))
    }

    /// Tick on a wall-clock interval until a limit is hit or `shutdown`
    /// resolves. Deltas are the measured time between ticks.
    pub async fn run_realtime<F>(
        &self,
        limits: RunLimits,
        shutdown: F,
    ) -> Result<RunStats, RunnerError>
    where
        F: Future<Output = ()>,
    {
        info!("Running real-time at step {:?}", self.step);

        let mut interval = tokio::time::interval(self.step);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        // The first interval tick completes immediately
        interval.tick().await;
        let mut last = Instant::now();

        let mut run = RunState::default();
        let stopped = loop {
            if let Some(reason) = run.should_stop(&limits, &self.scheduler) {
                break reason;
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break StopReason::Shutdown;
                }
                _ = interval.tick() => {
                    let now = Instant::now();
                    let raw = now.duration_since(last);
                    last = now;
                    run.record(self.advance(raw)?);
                }
            }
        };

        Ok(run.finish(stopped, &self.scheduler))
    }
}

fn step_for(tick_hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(tick_hz.max(1)))
}

#[derive(Default)]
struct RunState {
    ticks: u64,
    simulated_secs: f64,
}

impl RunState {
    fn should_stop<T: 'static>(
        &self,
        limits: &RunLimits,
        scheduler: &Scheduler<T>,
    ) -> Option<StopReason> {
        if self.ticks >= limits.max_ticks {
            return Some(StopReason::TickLimit);
        }
        if limits.stop_when_idle && scheduler.pending_flows() == 0 {
            return Some(StopReason::Idle);
        }
        None
    }

    fn record(&mut self, time: TickTime) {
        self.ticks += 1;
        self.simulated_secs += f64::from(time.unscaled_delta);
    }

    fn finish<T: 'static>(self, stopped: StopReason, scheduler: &Scheduler<T>) -> RunStats {
        let stats = RunStats {
            ticks: self.ticks,
            simulated_secs: self.simulated_secs,
            pending_flows: scheduler.pending_flows(),
            stopped,
        };
        debug!(?stats, "Run finished");
        stats
    }
}
