//! Per-tick callback scheduler.
//!
//! Register deferred, conditional, timed or interpolated flows against an
//! owner, then call [`Scheduler::tick`] once per frame with the elapsed time.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tickflow::{Scheduler, TimeChannel};
//!
//! struct Door {
//!     open: Cell<bool>,
//! }
//!
//! let scheduler: Scheduler<Door> = Scheduler::new();
//! let door = Rc::new(Door { open: Cell::new(false) });
//!
//! let d = door.clone();
//! scheduler
//!     .invoke_delayed(&door, 0.5, TimeChannel::Scaled, move || d.open.set(true))
//!     .unwrap();
//!
//! for _ in 0..6 {
//!     scheduler.tick(0.1, 0.1).unwrap();
//! }
//! assert!(door.open.get());
//! ```

pub mod error;
pub mod flow;
mod hooks;
mod registry;
pub mod scheduler;
pub mod target;
pub mod time;

pub use error::FlowError;
pub use flow::{lerp, Flow, FlowKind, Step};
pub use scheduler::Scheduler;
pub use target::{Target, TargetKey};
pub use time::{FixedTimeSource, TickTime, TimeChannel, TimeSource};
