use std::ops::Range;

use super::{Flow, FlowKind, Step};
use crate::error::{check_duration, FlowError};
use crate::time::{TickTime, TimeChannel};

/// Default scalar interpolation
#[cfg(not(feature = "high-precision-lerp"))]
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + t * (end - start)
}

/// Default scalar interpolation
#[cfg(feature = "high-precision-lerp")]
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    (1.0 - t) * start + t * end
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LerpState {
    Interpolating,
    Settled,
}

type Interpolate<V> = Box<dyn Fn(&V, &V, f32) -> V>;

/// Delivers interpolated samples between `start` and `end` over `duration`
/// seconds, then the literal `end` value and the optional completion callback.
pub struct LerpFlow<V> {
    duration: f32,
    elapsed: f32,
    start: V,
    end: V,
    channel: TimeChannel,
    interpolate: Interpolate<V>,
    on_value: Box<dyn FnMut(V)>,
    on_complete: Option<Box<dyn FnOnce()>>,
    state: LerpState,
}

impl LerpFlow<f32> {
    /// Linear `f32` interpolation using [`lerp`]
    pub fn linear(
        duration: f32,
        range: Range<f32>,
        on_value: impl FnMut(f32) + 'static,
    ) -> Result<Self, FlowError> {
        Self::new(duration, range, |a: &f32, b: &f32, t| lerp(*a, *b, t), on_value)
    }
}

impl<V: Clone + 'static> LerpFlow<V> {
    /// Interpolate any value type with a caller-supplied `(start, end, t)` function
    pub fn new(
        duration: f32,
        range: Range<V>,
        interpolate: impl Fn(&V, &V, f32) -> V + 'static,
        on_value: impl FnMut(V) + 'static,
    ) -> Result<Self, FlowError> {
        Ok(Self {
            duration: check_duration("duration", duration)?,
            elapsed: 0.0,
            start: range.start,
            end: range.end,
            channel: TimeChannel::Scaled,
            interpolate: Box::new(interpolate),
            on_value: Box::new(on_value),
            on_complete: None,
            state: LerpState::Interpolating,
        })
    }

    pub fn channel(mut self, channel: TimeChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Attach a completion callback, run after the end value is delivered
    pub fn then(mut self, on_complete: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    pub fn state(&self) -> LerpState {
        self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Sample position for the current accumulator, within `[0, 1)` while interpolating
    pub fn progress(&self) -> f32 {
        match self.state {
            LerpState::Settled => 1.0,
            // max() also maps the NaN of a zero duration to 0
            LerpState::Interpolating => (self.elapsed / self.duration).max(0.0).min(1.0),
        }
    }
}

impl<V: Clone + 'static> Flow for LerpFlow<V> {
    fn step(&mut self, time: &TickTime) -> Step {
        if self.state == LerpState::Settled {
            return Step::Complete;
        }

        self.elapsed += time.channel(self.channel);
        if self.elapsed < self.duration {
            let t = (self.elapsed / self.duration).max(0.0);
            let value = (self.interpolate)(&self.start, &self.end, t);
            (self.on_value)(value);
            return Step::Pending;
        }

        self.state = LerpState::Settled;
        (self.on_value)(self.end.clone());
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
        Step::Complete
    }

    fn seed(&mut self, current: &TickTime) {
        self.elapsed = -current.channel(self.channel);
    }

    fn kind(&self) -> FlowKind {
        FlowKind::Lerp
    }
}
