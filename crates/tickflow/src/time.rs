use std::rc::Rc;

/// Which delta a time-based flow accumulates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeChannel {
    /// Delta after the host's time scale is applied
    #[default]
    Scaled,
    /// Raw frame delta, unaffected by time scale or pause
    Unscaled,
}

/// The pair of deltas observed by every flow stepped within one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickTime {
    pub delta: f32,
    pub unscaled_delta: f32,
}

impl TickTime {
    pub fn new(delta: f32, unscaled_delta: f32) -> Self {
        Self {
            delta,
            unscaled_delta,
        }
    }

    /// Delta for the given channel
    pub fn channel(&self, channel: TimeChannel) -> f32 {
        match channel {
            TimeChannel::Scaled => self.delta,
            TimeChannel::Unscaled => self.unscaled_delta,
        }
    }
}

/// Reports the host's current frame deltas.
///
/// Only consulted when a time-based flow is created: the flow's accumulator
/// starts at minus the current delta, so the first tick that steps it counts
/// as time zero.
pub trait TimeSource {
    fn delta(&self) -> f32;

    fn unscaled_delta(&self) -> f32;

    fn current(&self) -> TickTime {
        TickTime::new(self.delta(), self.unscaled_delta())
    }
}

impl<S: TimeSource + ?Sized> TimeSource for Rc<S> {
    fn delta(&self) -> f32 {
        (**self).delta()
    }

    fn unscaled_delta(&self) -> f32 {
        (**self).unscaled_delta()
    }
}

impl<S: TimeSource + ?Sized> TimeSource for Box<S> {
    fn delta(&self) -> f32 {
        (**self).delta()
    }

    fn unscaled_delta(&self) -> f32 {
        (**self).unscaled_delta()
    }
}

/// Time source for fixed-step hosts: always reports the same deltas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimeSource {
    delta: f32,
    unscaled_delta: f32,
}

impl FixedTimeSource {
    pub fn new(delta: f32, unscaled_delta: f32) -> Self {
        Self {
            delta,
            unscaled_delta,
        }
    }

    /// Same delta on both channels
    pub fn uniform(delta: f32) -> Self {
        Self::new(delta, delta)
    }
}

impl TimeSource for FixedTimeSource {
    fn delta(&self) -> f32 {
        self.delta
    }

    fn unscaled_delta(&self) -> f32 {
        self.unscaled_delta
    }
}
