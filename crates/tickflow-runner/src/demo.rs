//! A small scene of actors driven by flows, run by the `tickflow` binary.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tickflow::{Scheduler, Target, TimeChannel};
use tracing::{debug, info};

use crate::error::RunnerError;

/// Owner type for the demo scene
#[derive(Debug)]
pub struct Actor {
    pub name: &'static str,
    pub alive: Cell<bool>,
    pub paused: Cell<bool>,
    pub position: Cell<f32>,
}

impl Actor {
    pub fn spawn(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            alive: Cell::new(true),
            paused: Cell::new(false),
            position: Cell::new(0.0),
        })
    }
}

/// Handles to the scene's actors and the events they have produced
pub struct Demo {
    pub hero: Rc<Actor>,
    pub scout: Rc<Actor>,
    pub ghost: Rc<Actor>,
    pub haunts: Rc<Cell<u32>>,
    events: Rc<RefCell<Vec<String>>>,
}

impl Demo {
    /// Wire the actor predicates into `scheduler` and register the scene's flows.
    ///
    /// - hero walks 0 to 10 over one scaled second, noting the halfway mark,
    ///   then rests for a quarter second
    /// - scout starts paused, is released after a quarter second, and
    ///   reports three frames later
    /// - ghost haunts every tick until it vanishes at half a second
    pub fn install(scheduler: &Scheduler<Actor>) -> Result<Self, RunnerError> {
        scheduler.set_validity_predicate(|actor: &Actor| actor.alive.get());
        scheduler.set_enablement_predicate(|actor: &Actor| !actor.paused.get());

        let demo = Self {
            hero: Actor::spawn("hero"),
            scout: Actor::spawn("scout"),
            ghost: Actor::spawn("ghost"),
            haunts: Rc::new(Cell::new(0)),
            events: Rc::new(RefCell::new(Vec::new())),
        };

        demo.install_hero(scheduler)?;
        demo.install_scout(scheduler)?;
        demo.install_ghost(scheduler)?;

        let events = demo.events.clone();
        scheduler.invoke_delayed_frames(Target::Global, 1, move || {
            record(&events, "first frame");
        });

        Ok(demo)
    }

    /// Events in the order they happened
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn install_hero(&self, scheduler: &Scheduler<Actor>) -> Result<(), RunnerError> {
        let hero = &self.hero;

        let walker = hero.clone();
        let events = self.events.clone();
        scheduler.invoke_while_then(
            hero,
            || {},
            move || walker.position.get() < 5.0,
            move || record(&events, "hero passed halfway"),
        );

        let mover = hero.clone();
        let resting = hero.clone();
        let events = self.events.clone();
        let inner = scheduler.clone();
        scheduler.time_lerp_value_then(
            hero,
            1.0,
            0.0..10.0,
            TimeChannel::Scaled,
            move |x| {
                mover.position.set(x);
                debug!(target: "demo", "hero at {x:.2}");
            },
            move || {
                record(&events, "hero arrived");
                let events = events.clone();
                if let Err(e) = inner.invoke_delayed(
                    &resting,
                    0.25,
                    TimeChannel::Scaled,
                    move || record(&events, "hero rested"),
                ) {
                    tracing::error!(target: "demo", "hero could not rest: {e}");
                }
            },
        )?;

        Ok(())
    }

    fn install_scout(&self, scheduler: &Scheduler<Actor>) -> Result<(), RunnerError> {
        self.scout.paused.set(true);

        let events = self.events.clone();
        scheduler.invoke_delayed_frames(&self.scout, 3, move || {
            record(&events, "scout reporting");
        });

        let scout = self.scout.clone();
        let events = self.events.clone();
        scheduler.invoke_delayed(Target::Global, 0.25, TimeChannel::Unscaled, move || {
            scout.paused.set(false);
            record(&events, "scout released");
        })?;

        Ok(())
    }

    fn install_ghost(&self, scheduler: &Scheduler<Actor>) -> Result<(), RunnerError> {
        let haunts = self.haunts.clone();
        scheduler.invoke_while(&self.ghost, move || haunts.set(haunts.get() + 1), || true);

        let ghost = self.ghost.clone();
        let events = self.events.clone();
        scheduler.invoke_delayed(Target::Global, 0.5, TimeChannel::Scaled, move || {
            ghost.alive.set(false);
            record(&events, "ghost vanished");
        })?;

        Ok(())
    }
}

fn record(events: &Rc<RefCell<Vec<String>>>, event: &str) {
    info!(target: "demo", "{event}");
    events.borrow_mut().push(event.to_string());
}
