use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{check_delta, FlowError};
use crate::flow::{
    BoxedFlow, DelayedFlow, Flow, FrameDelayedFlow, LerpFlow, WhenFlow, WhileFlow,
};
use crate::hooks::{Gate, Hooks};
use crate::registry::TargetRegistry;
use crate::target::{Target, TargetKey};
use crate::time::{TickTime, TimeChannel, TimeSource};

struct Shared<T> {
    registry: RefCell<TargetRegistry<T>>,
    /// Flows registered while a pass is running, merged once it finishes
    staged: RefCell<TargetRegistry<T>>,
    hooks: RefCell<Hooks<T>>,
    /// `None` seeds new flows from the deltas of the last tick
    time_source: Option<Box<dyn TimeSource>>,
    time: Cell<TickTime>,
    iterating: Cell<bool>,
    ticks: Cell<u64>,
}

/// Per-tick scheduler for flows attached to owners of type `T`.
///
/// `Scheduler` is a cheap handle: clones share the same registry, so a
/// callback can capture a clone and register further flows while a tick is
/// running. Single-threaded; the host drives it with [`Scheduler::tick`].
pub struct Scheduler<T: 'static> {
    shared: Rc<Shared<T>>,
}

impl<T: 'static> Clone for Scheduler<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: 'static> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resets the iterating flag even if a callback unwinds out of the pass
struct IterationGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> IterationGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for IterationGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl<T: 'static> Scheduler<T> {
    /// Scheduler that seeds new time-based flows from the previous tick's deltas
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Scheduler that seeds new time-based flows from `source`
    pub fn with_time_source(source: impl TimeSource + 'static) -> Self {
        Self::build(Some(Box::new(source)))
    }

    fn build(time_source: Option<Box<dyn TimeSource>>) -> Self {
        Self {
            shared: Rc::new(Shared {
                registry: RefCell::new(TargetRegistry::new()),
                staged: RefCell::new(TargetRegistry::new()),
                hooks: RefCell::new(Hooks::new()),
                time_source,
                time: Cell::new(TickTime::default()),
                iterating: Cell::new(false),
                ticks: Cell::new(0),
            }),
        }
    }

    // ===== Hooks =====

    /// Owners failing this test have all their flows dropped at the next tick
    pub fn set_validity_predicate(&self, predicate: impl Fn(&T) -> bool + 'static) {
        self.shared
            .hooks
            .borrow_mut()
            .set_validity(Rc::new(predicate));
    }

    /// Owners failing this test keep their flows but are not stepped
    pub fn set_enablement_predicate(&self, predicate: impl Fn(&T) -> bool + 'static) {
        self.shared
            .hooks
            .borrow_mut()
            .set_enablement(Rc::new(predicate));
    }

    fn gate(&self, target: &Target<T>) -> Gate {
        // Cloned out so predicates may touch the scheduler
        let hooks = self.shared.hooks.borrow().clone();
        hooks.gate(target)
    }

    // ===== Tick =====

    /// Advance every pending flow by one step.
    ///
    /// Both deltas are cached for the whole pass. Owners are visited in
    /// enumeration order; each owner's flows run from last-registered to
    /// first-registered. A panic in a callback propagates to the caller.
    pub fn tick(&self, delta: f32, unscaled_delta: f32) -> Result<(), FlowError> {
        if self.shared.iterating.get() {
            return Err(FlowError::ReentrantTick);
        }
        let delta = check_delta("delta", delta)?;
        let unscaled_delta = check_delta("unscaled_delta", unscaled_delta)?;

        let time = TickTime::new(delta, unscaled_delta);
        self.shared.time.set(time);

        let mut stepped = 0usize;
        let mut completed = 0usize;
        let mut dropped = 0usize;
        {
            let _guard = IterationGuard::enter(&self.shared.iterating);
            let keys = self.shared.registry.borrow().keys();
            let mut removals: Vec<TargetKey> = Vec::new();

            for key in keys {
                let Some(target) = self.shared.registry.borrow().target(key) else {
                    continue;
                };

                match self.gate(&target) {
                    Gate::Evict => {
                        removals.push(key);
                        continue;
                    }
                    Gate::Skip => continue,
                    Gate::Run => {}
                }

                let mut flows = self.shared.registry.borrow_mut().take_flows(key);
                let mut i = flows.len();
                while i > 0 {
                    i -= 1;
                    stepped += 1;
                    if flows[i].step(&time).is_complete() {
                        flows.remove(i);
                        completed += 1;
                    }
                }

                if flows.is_empty() {
                    removals.push(key);
                }
                self.shared.registry.borrow_mut().restore_flows(key, flows);
            }

            let evicted = self.shared.registry.borrow_mut().remove_all(&removals);
            for (key, entry) in &evicted {
                let count = entry.flow_count();
                if count > 0 {
                    debug!(target: "tickflow", "Dropped {} flow(s) of invalid target {:?}", count, key);
                    dropped += count;
                }
            }
            // Released with no registry borrow held; owners and closures may call back in
            drop(evicted);
        }

        let staged = std::mem::take(&mut *self.shared.staged.borrow_mut());
        if !staged.is_empty() {
            trace!(target: "tickflow", "Merging {} flow(s) registered during tick", staged.flow_count());
            self.shared.registry.borrow_mut().merge(staged);
        }

        let tick = self.shared.ticks.get() + 1;
        self.shared.ticks.set(tick);
        trace!(
            target: "tickflow",
            "Tick {} (dt={}, unscaled_dt={}): stepped={} completed={} dropped={} pending={}",
            tick, delta, unscaled_delta, stepped, completed, dropped, self.pending_flows()
        );
        Ok(())
    }

    // ===== Registration =====

    /// Register any flow under the scheduling protocol.
    ///
    /// Between ticks the flow is queued and first stepped by the next tick.
    /// During a tick it is stepped once immediately with the current deltas;
    /// if that step completes it is dropped, otherwise it joins the registry
    /// when the pass finishes.
    pub fn add_flow(&self, target: impl Into<Target<T>>, flow: impl Flow + 'static) {
        let target = target.into();
        let mut flow: BoxedFlow = Box::new(flow);
        flow.seed(&self.current_time());
        let kind = flow.kind();

        if !self.shared.iterating.get() {
            trace!(target: "tickflow", "Registered {} flow for {:?}", kind.as_str(), target.key());
            self.shared.registry.borrow_mut().push(&target, flow);
            return;
        }

        match self.gate(&target) {
            Gate::Evict => {
                debug!(
                    target: "tickflow",
                    "Discarded {} flow registered mid-tick for invalid target {:?}",
                    kind.as_str(),
                    target.key()
                );
                return;
            }
            Gate::Skip => {}
            Gate::Run => {
                let time = self.shared.time.get();
                if flow.step(&time).is_complete() {
                    trace!(target: "tickflow", "Mid-tick {} flow completed on its first step", kind.as_str());
                    return;
                }
            }
        }

        trace!(target: "tickflow", "Staged {} flow for {:?}", kind.as_str(), target.key());
        self.shared.staged.borrow_mut().push(&target, flow);
    }

    /// Run `action` once, on the first tick `condition` is true
    pub fn invoke_when(
        &self,
        target: impl Into<Target<T>>,
        action: impl FnOnce() + 'static,
        condition: impl FnMut() -> bool + 'static,
    ) {
        self.add_flow(target, WhenFlow::new(condition, action));
    }

    /// Run `action` every tick while `condition` is true
    pub fn invoke_while(
        &self,
        target: impl Into<Target<T>>,
        action: impl FnMut() + 'static,
        condition: impl FnMut() -> bool + 'static,
    ) {
        self.add_flow(target, WhileFlow::new(condition, action));
    }

    /// Like [`Self::invoke_while`], then run `on_complete` on the first tick the condition fails
    pub fn invoke_while_then(
        &self,
        target: impl Into<Target<T>>,
        action: impl FnMut() + 'static,
        condition: impl FnMut() -> bool + 'static,
        on_complete: impl FnOnce() + 'static,
    ) {
        self.add_flow(target, WhileFlow::new(condition, action).then(on_complete));
    }

    /// Run `action` once `delay` seconds have passed on `channel`, measured from the next tick
    pub fn invoke_delayed(
        &self,
        target: impl Into<Target<T>>,
        delay: f32,
        channel: TimeChannel,
        action: impl FnOnce() + 'static,
    ) -> Result<(), FlowError> {
        let flow = DelayedFlow::new(delay, channel, action)?;
        self.add_flow(target, flow);
        Ok(())
    }

    /// Run `action` after `frames` whole ticks
    pub fn invoke_delayed_frames(
        &self,
        target: impl Into<Target<T>>,
        frames: u32,
        action: impl FnOnce() + 'static,
    ) {
        self.add_flow(target, FrameDelayedFlow::new(frames, action));
    }

    /// Deliver a linearly interpolated `f32` every tick for `duration` seconds, ending on exactly `range.end`
    pub fn time_lerp_value(
        &self,
        target: impl Into<Target<T>>,
        duration: f32,
        range: Range<f32>,
        channel: TimeChannel,
        on_value: impl FnMut(f32) + 'static,
    ) -> Result<(), FlowError> {
        let flow = LerpFlow::linear(duration, range, on_value)?.channel(channel);
        self.add_flow(target, flow);
        Ok(())
    }

    /// Like [`Self::time_lerp_value`], then run `on_complete` after the end value
    pub fn time_lerp_value_then(
        &self,
        target: impl Into<Target<T>>,
        duration: f32,
        range: Range<f32>,
        channel: TimeChannel,
        on_value: impl FnMut(f32) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), FlowError> {
        let flow = LerpFlow::linear(duration, range, on_value)?
            .channel(channel)
            .then(on_complete);
        self.add_flow(target, flow);
        Ok(())
    }

    /// Interpolate any value type with `interpolate(start, end, t)`
    pub fn time_lerp_with<V: Clone + 'static>(
        &self,
        target: impl Into<Target<T>>,
        duration: f32,
        range: Range<V>,
        channel: TimeChannel,
        interpolate: impl Fn(&V, &V, f32) -> V + 'static,
        on_value: impl FnMut(V) + 'static,
    ) -> Result<(), FlowError> {
        let flow = LerpFlow::new(duration, range, interpolate, on_value)?.channel(channel);
        self.add_flow(target, flow);
        Ok(())
    }

    /// Like [`Self::time_lerp_with`], then run `on_complete` after the end value
    #[allow(clippy::too_many_arguments)]
    pub fn time_lerp_with_then<V: Clone + 'static>(
        &self,
        target: impl Into<Target<T>>,
        duration: f32,
        range: Range<V>,
        channel: TimeChannel,
        interpolate: impl Fn(&V, &V, f32) -> V + 'static,
        on_value: impl FnMut(V) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<(), FlowError> {
        let flow = LerpFlow::new(duration, range, interpolate, on_value)?
            .channel(channel)
            .then(on_complete);
        self.add_flow(target, flow);
        Ok(())
    }

    // ===== Introspection =====

    /// Deltas new flows are seeded with
    fn current_time(&self) -> TickTime {
        match &self.shared.time_source {
            Some(source) => source.current(),
            None => self.shared.time.get(),
        }
    }

    /// Flows waiting to be stepped, including ones staged during the current tick.
    /// While a tick is running, the owner being stepped is not counted.
    pub fn pending_flows(&self) -> usize {
        self.shared.registry.borrow().flow_count() + self.shared.staged.borrow().flow_count()
    }

    pub fn pending_flows_for(&self, target: impl Into<Target<T>>) -> usize {
        let key = target.into().key();
        self.shared.registry.borrow().flow_count_for(key)
            + self.shared.staged.borrow().flow_count_for(key)
    }

    /// Owners with at least one registered flow
    pub fn target_count(&self) -> usize {
        self.shared.registry.borrow().target_count()
    }

    pub fn is_iterating(&self) -> bool {
        self.shared.iterating.get()
    }

    /// Deltas cached by the most recent tick
    pub fn last_tick_time(&self) -> TickTime {
        self.shared.time.get()
    }

    /// Number of completed `tick` calls
    pub fn tick_count(&self) -> u64 {
        self.shared.ticks.get()
    }
}
