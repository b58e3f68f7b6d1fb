//! Flow contract and the built-in flow variants.
//!
//! A flow is stepped at most once per tick. Once `step` returns
//! [`Step::Complete`] the scheduler drops it and never steps it again.

mod conditional;
mod delayed;
mod lerp;

pub use conditional::{WhenFlow, WhenState, WhileFlow, WhileState};
pub use delayed::{DelayState, DelayedFlow, FrameDelayedFlow};
pub use lerp::{lerp, LerpFlow, LerpState};

use crate::time::TickTime;

/// Result of stepping a flow once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Pending,
    Complete,
}

impl Step {
    pub fn is_complete(self) -> bool {
        self == Step::Complete
    }
}

/// Tag used for logging and introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    When,
    While,
    Delayed,
    DelayedFrames,
    Lerp,
    Custom,
}

impl FlowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::When => "when",
            FlowKind::While => "while",
            FlowKind::Delayed => "delayed",
            FlowKind::DelayedFrames => "delayed_frames",
            FlowKind::Lerp => "lerp",
            FlowKind::Custom => "custom",
        }
    }
}

/// A unit of deferred work advanced once per tick
pub trait Flow {
    /// Advance by one tick using the tick's cached deltas
    fn step(&mut self, time: &TickTime) -> Step;

    /// Called once at registration with the host's current deltas, before the
    /// first step. Time-based flows start their accumulator one tick behind.
    fn seed(&mut self, _current: &TickTime) {}

    fn kind(&self) -> FlowKind {
        FlowKind::Custom
    }
}

impl<F: Flow + ?Sized> Flow for Box<F> {
    fn step(&mut self, time: &TickTime) -> Step {
        (**self).step(time)
    }

    fn seed(&mut self, current: &TickTime) {
        (**self).seed(current)
    }

    fn kind(&self) -> FlowKind {
        (**self).kind()
    }
}

pub(crate) type BoxedFlow = Box<dyn Flow>;
