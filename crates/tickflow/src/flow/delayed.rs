use super::{Flow, FlowKind, Step};
use crate::error::{check_duration, FlowError};
use crate::time::{TickTime, TimeChannel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayState {
    Pending,
    Fired,
}

/// Fires `action` once `delay` seconds have accumulated on its channel.
///
/// The accumulator is seeded with minus the current delta, so the tick that
/// first steps the flow counts as zero elapsed and a zero delay still waits
/// for that tick.
pub struct DelayedFlow {
    delay: f32,
    elapsed: f32,
    channel: TimeChannel,
    action: Option<Box<dyn FnOnce()>>,
    state: DelayState,
}

impl DelayedFlow {
    pub fn new(
        delay: f32,
        channel: TimeChannel,
        action: impl FnOnce() + 'static,
    ) -> Result<Self, FlowError> {
        Ok(Self {
            delay: check_duration("delay", delay)?,
            elapsed: 0.0,
            channel,
            action: Some(Box::new(action)),
            state: DelayState::Pending,
        })
    }

    pub fn state(&self) -> DelayState {
        self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn channel(&self) -> TimeChannel {
        self.channel
    }
}

impl Flow for DelayedFlow {
    fn step(&mut self, time: &TickTime) -> Step {
        if self.state == DelayState::Fired {
            return Step::Complete;
        }

        self.elapsed += time.channel(self.channel);
        if self.elapsed < self.delay {
            return Step::Pending;
        }

        self.state = DelayState::Fired;
        if let Some(action) = self.action.take() {
            action();
        }
        Step::Complete
    }

    fn seed(&mut self, current: &TickTime) {
        self.elapsed = -current.channel(self.channel);
    }

    fn kind(&self) -> FlowKind {
        FlowKind::Delayed
    }
}

/// Fires `action` after a whole number of ticks.
///
/// The tick counter starts at -1: a flow registered between ticks with
/// `frames = n` fires on the `n + 1`th tick after registration.
pub struct FrameDelayedFlow {
    frames: u32,
    elapsed: i64,
    action: Option<Box<dyn FnOnce()>>,
    state: DelayState,
}

impl FrameDelayedFlow {
    pub fn new(frames: u32, action: impl FnOnce() + 'static) -> Self {
        Self {
            frames,
            elapsed: -1,
            action: Some(Box::new(action)),
            state: DelayState::Pending,
        }
    }

    pub fn state(&self) -> DelayState {
        self.state
    }

    /// Ticks counted so far, -1 before the first step
    pub fn elapsed_frames(&self) -> i64 {
        self.elapsed
    }
}

impl Flow for FrameDelayedFlow {
    fn step(&mut self, _time: &TickTime) -> Step {
        if self.state == DelayState::Fired {
            return Step::Complete;
        }

        self.elapsed += 1;
        if self.elapsed < i64::from(self.frames) {
            return Step::Pending;
        }

        self.state = DelayState::Fired;
        if let Some(action) = self.action.take() {
            action();
        }
        Step::Complete
    }

    fn kind(&self) -> FlowKind {
        FlowKind::DelayedFrames
    }
}
