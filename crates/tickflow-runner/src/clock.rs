use std::cell::Cell;
use std::time::Duration;

use tickflow::{TickTime, TimeSource};

/// Turns raw wall-clock deltas into scaled and unscaled tick deltas.
///
/// The unscaled delta is the raw delta clamped to `max_delta`. The scaled
/// delta is the unscaled delta times `time_scale`. Shared with the
/// scheduler as its time source so flows registered between ticks seed
/// from the last advanced frame, or from the primed frame before the first.
#[derive(Debug)]
pub struct FrameClock {
    max_delta: f32,
    time_scale: f32,
    current: Cell<TickTime>,
    elapsed: Cell<f64>,
    frame_index: Cell<u64>,
}

impl FrameClock {
    /// Negative or non-finite `time_scale` pauses the scaled channel
    pub fn new(time_scale: f32, max_delta: Duration) -> Self {
        Self {
            max_delta: max_delta.as_secs_f32().max(0.001),
            time_scale: sanitize_scale(time_scale),
            current: Cell::new(TickTime::default()),
            elapsed: Cell::new(0.0),
            frame_index: Cell::new(0),
        }
    }

    /// Report `nominal` as the current frame until the first `advance`,
    /// so flows registered before it are measured from the first tick
    pub fn prime(&self, nominal: Duration) {
        self.current.set(self.deltas(nominal));
    }

    /// Record one frame of `raw` wall time and return the deltas for it
    pub fn advance(&self, raw: Duration) -> TickTime {
        let time = self.deltas(raw);

        self.current.set(time);
        self.elapsed.set(self.elapsed.get() + raw.as_secs_f64());
        self.frame_index.set(self.frame_index.get() + 1);
        time
    }

    fn deltas(&self, raw: Duration) -> TickTime {
        let unscaled = raw.as_secs_f32().min(self.max_delta);
        TickTime::new(unscaled * self.time_scale, unscaled)
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Unclamped wall time fed to `advance` so far, in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.get()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index.get()
    }
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale >= 0.0 {
        scale
    } else {
        0.0
    }
}

impl TimeSource for FrameClock {
    fn delta(&self) -> f32 {
        self.current.get().delta
    }

    fn unscaled_delta(&self) -> f32 {
        self.current.get().unscaled_delta
    }
}
