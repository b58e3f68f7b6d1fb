//! End-to-end scheduling scenarios driven through the public API

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tickflow::{FixedTimeSource, Flow, Scheduler, Step, Target, TickTime, TimeChannel};

struct Actor {
    name: &'static str,
    alive: Cell<bool>,
    enabled: Cell<bool>,
}

impl Actor {
    fn new(name: &'static str) -> Rc<Self> {
        Rc::new(Self {
            name,
            alive: Cell::new(true),
            enabled: Cell::new(true),
        })
    }
}

fn wire(scheduler: &Scheduler<Actor>) {
    scheduler.set_validity_predicate(|a: &Actor| a.alive.get());
    scheduler.set_enablement_predicate(|a: &Actor| a.enabled.get());
}

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

#[test]
fn test_delayed_and_while_on_same_owner() {
    let scheduler = Scheduler::with_time_source(FixedTimeSource::uniform(0.1));
    wire(&scheduler);
    let actor = Actor::new("hero");
    let tick = Rc::new(Cell::new(0u32));
    let holding = Rc::new(Cell::new(true));
    let log = new_log();

    {
        let log = log.clone();
        let tick = tick.clone();
        scheduler
            .invoke_delayed(&actor, 0.2, TimeChannel::Scaled, move || {
                push(&log, format!("delayed@{}", tick.get()))
            })
            .unwrap();
    }
    {
        let log_a = log.clone();
        let log_c = log.clone();
        let tick_a = tick.clone();
        let tick_c = tick.clone();
        let holding = holding.clone();
        scheduler.invoke_while_then(
            &actor,
            move || push(&log_a, format!("while@{}", tick_a.get())),
            move || holding.get(),
            move || push(&log_c, format!("while-done@{}", tick_c.get())),
        );
    }

    for n in 1..=3 {
        tick.set(n);
        scheduler.tick(0.1, 0.1).unwrap();
    }

    assert_eq!(
        *log.borrow(),
        vec!["while@1", "while@2", "while@3", "delayed@3"]
    );
    assert_eq!(scheduler.pending_flows_for(&actor), 1);

    // Condition drops: completion runs on the next tick, then the owner is pruned
    holding.set(false);
    tick.set(4);
    scheduler.tick(0.1, 0.1).unwrap();
    assert_eq!(log.borrow().last().map(String::as_str), Some("while-done@4"));
    assert_eq!(scheduler.pending_flows(), 0);
    assert_eq!(scheduler.target_count(), 0);
}

#[test]
fn test_while_completion_on_tick_three() {
    let scheduler = Scheduler::with_time_source(FixedTimeSource::uniform(0.1));
    wire(&scheduler);
    let actor = Actor::new("hero");
    let holding = Rc::new(Cell::new(true));
    let actions = Rc::new(Cell::new(0u32));
    let completions = Rc::new(Cell::new(0u32));

    {
        let holding = holding.clone();
        let actions = actions.clone();
        let completions = completions.clone();
        scheduler.invoke_while_then(
            &actor,
            move || actions.set(actions.get() + 1),
            move || holding.get(),
            move || completions.set(completions.get() + 1),
        );
    }

    scheduler.tick(0.1, 0.1).unwrap();
    scheduler.tick(0.1, 0.1).unwrap();
    holding.set(false);
    scheduler.tick(0.1, 0.1).unwrap();
    scheduler.tick(0.1, 0.1).unwrap();

    assert_eq!(actions.get(), 2);
    assert_eq!(completions.get(), 1);
    assert_eq!(scheduler.pending_flows(), 0);
}

#[test]
fn test_lerp_zero_to_hundred() {
    let scheduler: Scheduler<Actor> = Scheduler::new();
    let actor = Actor::new("bar");
    let values = Rc::new(RefCell::new(Vec::new()));
    let done = Rc::new(Cell::new(0u32));

    {
        let values = values.clone();
        let done = done.clone();
        scheduler
            .time_lerp_value_then(
                &actor,
                2.0,
                0.0..100.0,
                TimeChannel::Scaled,
                move |v| values.borrow_mut().push(v),
                move || done.set(done.get() + 1),
            )
            .unwrap();
    }

    for _ in 0..6 {
        scheduler.tick(0.5, 0.5).unwrap();
    }

    assert_eq!(*values.borrow(), vec![25.0, 50.0, 75.0, 100.0]);
    assert_eq!(done.get(), 1);
}

#[test]
fn test_lerp_values_progress_monotonically() {
    let scheduler: Scheduler<Actor> = Scheduler::with_time_source(FixedTimeSource::uniform(1.0 / 60.0));
    let values = Rc::new(RefCell::new(Vec::new()));
    {
        let values = values.clone();
        scheduler
            .time_lerp_value(
                Target::Global,
                0.75,
                -3.0..9.0,
                TimeChannel::Unscaled,
                move |v| values.borrow_mut().push(v),
            )
            .unwrap();
    }

    while scheduler.pending_flows() > 0 {
        scheduler.tick(0.0, 1.0 / 60.0).unwrap();
    }

    let values = values.borrow();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(values.first().copied(), Some(-3.0));
    assert_eq!(values.last().copied(), Some(9.0));
}

#[test]
fn test_when_fires_once_on_first_true_tick() {
    let scheduler = Scheduler::new();
    wire(&scheduler);
    let actor = Actor::new("npc");
    let armed = Rc::new(Cell::new(false));
    let fired_on = Rc::new(RefCell::new(Vec::new()));
    let tick = Rc::new(Cell::new(0u32));

    {
        let armed = armed.clone();
        let fired_on = fired_on.clone();
        let tick = tick.clone();
        scheduler.invoke_when(
            &actor,
            move || fired_on.borrow_mut().push(tick.get()),
            move || armed.get(),
        );
    }

    for n in 1..=6 {
        tick.set(n);
        if n == 3 {
            armed.set(true);
        }
        scheduler.tick(0.016, 0.016).unwrap();
    }

    assert_eq!(*fired_on.borrow(), vec![3]);
}

#[test]
fn test_invalidated_owner_receives_no_further_callbacks() {
    let scheduler = Scheduler::new();
    wire(&scheduler);
    let keep = Actor::new("keep");
    let doomed = Actor::new("doomed");
    let log = new_log();

    for actor in [&keep, &doomed] {
        let log_while = log.clone();
        let name = actor.name;
        scheduler.invoke_while(actor, move || push(&log_while, name), || true);
        let log_late = log.clone();
        scheduler.invoke_delayed_frames(actor, 5, move || push(&log_late, format!("{name}-late")));
    }

    scheduler.tick(0.1, 0.1).unwrap();
    doomed.alive.set(false);
    log.borrow_mut().clear();

    for _ in 0..10 {
        scheduler.tick(0.1, 0.1).unwrap();
    }

    assert!(log.borrow().iter().all(|entry| entry.starts_with("keep")));
    assert!(log.borrow().iter().any(|entry| entry == "keep-late"));
    assert_eq!(scheduler.pending_flows_for(&doomed), 0);
    assert_eq!(scheduler.target_count(), 1);
}

#[test]
fn test_mid_tick_registration_is_stepped_in_same_tick() {
    let scheduler = Scheduler::new();
    wire(&scheduler);
    let a = Actor::new("a");
    let b = Actor::new("b");
    let log = new_log();

    // Siblings on `a`, registered first so they are visited last
    for name in ["a-1", "a-2"] {
        let log = log.clone();
        scheduler.invoke_while(&a, move || push(&log, name), || true);
    }
    {
        let inner = scheduler.clone();
        let log = log.clone();
        let a2 = a.clone();
        let b2 = b.clone();
        scheduler.invoke_when(
            &a,
            move || {
                push(&log, "spawner");
                let l = log.clone();
                inner.invoke_when(&a2, move || push(&l, "child-a"), || true);
                let l = log.clone();
                inner.invoke_while(&b2, move || push(&l, "child-b"), || true);
            },
            || true,
        );
    }
    {
        let log = log.clone();
        scheduler.invoke_while(&b, move || push(&log, "b-1"), || true);
    }

    scheduler.tick(0.1, 0.1).unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["spawner", "child-a", "child-b", "a-2", "a-1", "b-1"]
    );

    // child-a completed immediately and was never stored; child-b joins b's list
    assert_eq!(scheduler.pending_flows_for(&a), 2);
    assert_eq!(scheduler.pending_flows_for(&b), 2);

    log.borrow_mut().clear();
    scheduler.tick(0.1, 0.1).unwrap();
    assert_eq!(*log.borrow(), vec!["a-2", "a-1", "child-b", "b-1"]);
}

#[test]
fn test_mid_tick_delayed_flow_is_measured_from_current_tick() {
    let scheduler: Scheduler<Actor> = Scheduler::new();
    let log = new_log();
    {
        let inner = scheduler.clone();
        let log = log.clone();
        scheduler.invoke_delayed_frames(Target::Global, 1, move || {
            let log = log.clone();
            inner
                .invoke_delayed(Target::Global, 0.25, TimeChannel::Scaled, move || {
                    push(&log, "fired")
                })
                .unwrap();
        });
    }

    scheduler.tick(0.25, 0.25).unwrap();
    scheduler.tick(0.25, 0.25).unwrap(); // spawner fires; child steps once at zero elapsed
    assert!(log.borrow().is_empty());
    scheduler.tick(0.25, 0.25).unwrap();
    assert_eq!(*log.borrow(), vec!["fired"]);
}

#[test]
fn test_custom_flow_through_add_flow() {
    struct Countdown {
        left: u32,
        seen: Rc<RefCell<Vec<f32>>>,
    }

    impl Flow for Countdown {
        fn step(&mut self, time: &TickTime) -> Step {
            self.seen.borrow_mut().push(time.unscaled_delta);
            self.left -= 1;
            if self.left == 0 {
                Step::Complete
            } else {
                Step::Pending
            }
        }
    }

    let scheduler: Scheduler<Actor> = Scheduler::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    scheduler.add_flow(
        Target::Global,
        Countdown {
            left: 3,
            seen: seen.clone(),
        },
    );

    for dt in [0.1, 0.2, 0.3, 0.4] {
        scheduler.tick(dt, dt * 2.0).unwrap();
    }
    assert_eq!(*seen.borrow(), vec![0.2, 0.4, 0.6]);
    assert_eq!(scheduler.tick_count(), 4);
}

#[test]
fn test_independent_schedulers_do_not_share_state() {
    let ui: Scheduler<Actor> = Scheduler::new();
    let world: Scheduler<Actor> = Scheduler::new();
    let actor = Actor::new("shared");
    ui.invoke_while(&actor, || {}, || true);

    world.tick(0.1, 0.1).unwrap();
    assert_eq!(ui.pending_flows(), 1);
    assert_eq!(world.pending_flows(), 0);
    assert_eq!(world.tick_count(), 1);
    assert_eq!(ui.tick_count(), 0);
}

fn lerp_pair(start: &(f32, f32), end: &(f32, f32), t: f32) -> (f32, f32) {
    (
        start.0 + t * (end.0 - start.0),
        start.1 + t * (end.1 - start.1),
    )
}

#[test]
fn test_generic_lerp_ends_on_literal_value_then_completes() {
    let scheduler = Scheduler::new();
    wire(&scheduler);
    let actor = Actor::new("mover");
    let log = new_log();

    {
        let values = log.clone();
        let done = log.clone();
        scheduler
            .time_lerp_with_then(
                &actor,
                1.0,
                (0.0, 0.0)..(4.0, 8.0),
                TimeChannel::Scaled,
                lerp_pair,
                move |(x, y)| push(&values, format!("{x},{y}")),
                move || push(&done, "done"),
            )
            .unwrap();
    }

    for _ in 0..6 {
        scheduler.tick(0.25, 0.25).unwrap();
    }

    assert_eq!(*log.borrow(), vec!["1,2", "2,4", "3,6", "4,8", "done"]);
    assert_eq!(scheduler.pending_flows_for(&actor), 0);
}

#[test]
fn test_generic_lerp_on_unscaled_channel_ignores_pause() {
    let scheduler: Scheduler<Actor> = Scheduler::new();
    let values = Rc::new(RefCell::new(Vec::new()));

    {
        let values = values.clone();
        scheduler
            .time_lerp_with(
                Target::Global,
                0.5,
                (10.0, -10.0)..(20.0, 10.0),
                TimeChannel::Unscaled,
                lerp_pair,
                move |v| values.borrow_mut().push(v),
            )
            .unwrap();
    }

    // Scaled time stands still; the unscaled channel keeps the flow moving
    for _ in 0..4 {
        scheduler.tick(0.0, 0.25).unwrap();
    }

    assert_eq!(*values.borrow(), vec![(15.0, 0.0), (20.0, 10.0)]);
    assert_eq!(scheduler.pending_flows(), 0);
}

#[test]
fn test_generic_lerp_rejects_negative_duration() {
    let scheduler: Scheduler<Actor> = Scheduler::new();
    let result = scheduler.time_lerp_with(
        Target::Global,
        -1.0,
        0.0f32..1.0,
        TimeChannel::Scaled,
        |a: &f32, b: &f32, t| a + t * (b - a),
        |_| {},
    );
    assert!(result.is_err());
    assert_eq!(scheduler.pending_flows(), 0);
}
