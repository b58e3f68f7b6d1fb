use super::{Flow, FlowKind, Step};
use crate::time::TickTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenState {
    Waiting,
    Done,
}

/// Runs `action` once, on the first tick `condition` holds
pub struct WhenFlow {
    condition: Box<dyn FnMut() -> bool>,
    action: Option<Box<dyn FnOnce()>>,
    state: WhenState,
}

impl WhenFlow {
    pub fn new(condition: impl FnMut() -> bool + 'static, action: impl FnOnce() + 'static) -> Self {
        Self {
            condition: Box::new(condition),
            action: Some(Box::new(action)),
            state: WhenState::Waiting,
        }
    }

    pub fn state(&self) -> WhenState {
        self.state
    }
}

impl Flow for WhenFlow {
    fn step(&mut self, _time: &TickTime) -> Step {
        if self.state == WhenState::Done {
            return Step::Complete;
        }
        if !(self.condition)() {
            return Step::Pending;
        }

        self.state = WhenState::Done;
        if let Some(action) = self.action.take() {
            action();
        }
        Step::Complete
    }

    fn kind(&self) -> FlowKind {
        FlowKind::When
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhileState {
    Running,
    Done,
}

/// Runs `action` every tick `condition` holds, then `on_complete` once on the
/// first tick it does not
pub struct WhileFlow {
    condition: Box<dyn FnMut() -> bool>,
    action: Box<dyn FnMut()>,
    on_complete: Option<Box<dyn FnOnce()>>,
    state: WhileState,
}

impl WhileFlow {
    pub fn new(condition: impl FnMut() -> bool + 'static, action: impl FnMut() + 'static) -> Self {
        Self {
            condition: Box::new(condition),
            action: Box::new(action),
            on_complete: None,
            state: WhileState::Running,
        }
    }

    /// Attach a completion callback
    pub fn then(mut self, on_complete: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    pub fn state(&self) -> WhileState {
        self.state
    }
}

impl Flow for WhileFlow {
    fn step(&mut self, _time: &TickTime) -> Step {
        if self.state == WhileState::Done {
            return Step::Complete;
        }
        if (self.condition)() {
            (self.action)();
            return Step::Pending;
        }

        self.state = WhileState::Done;
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
        Step::Complete
    }

    fn kind(&self) -> FlowKind {
        FlowKind::While
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_when_waits_for_condition() {
        let gate = Rc::new(Cell::new(false));
        let hits = Rc::new(Cell::new(0));

        let mut flow = {
            let gate = gate.clone();
            let hits = hits.clone();
            WhenFlow::new(move || gate.get(), move || hits.set(hits.get() + 1))
        };

        let time = TickTime::default();
        assert_eq!(flow.step(&time), Step::Pending);
        assert_eq!(flow.state(), WhenState::Waiting);
        assert_eq!(hits.get(), 0);

        gate.set(true);
        assert_eq!(flow.step(&time), Step::Complete);
        assert_eq!(flow.state(), WhenState::Done);
        assert_eq!(hits.get(), 1);

        // Stepping a finished flow is a no-op
        assert_eq!(flow.step(&time), Step::Complete);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_while_runs_until_condition_fails() {
        let remaining = Rc::new(Cell::new(3));
        let completed = Rc::new(Cell::new(0));

        let mut flow = {
            let remaining_c = remaining.clone();
            let remaining_a = remaining.clone();
            let completed = completed.clone();
            WhileFlow::new(
                move || remaining_c.get() > 0,
                move || remaining_a.set(remaining_a.get() - 1),
            )
            .then(move || completed.set(completed.get() + 1))
        };

        let time = TickTime::default();
        for _ in 0..3 {
            assert_eq!(flow.step(&time), Step::Pending);
        }
        assert_eq!(remaining.get(), 0);
        assert_eq!(completed.get(), 0);

        assert_eq!(flow.step(&time), Step::Complete);
        assert_eq!(flow.state(), WhileState::Done);
        assert_eq!(completed.get(), 1);

        assert_eq!(flow.step(&time), Step::Complete);
        assert_eq!(completed.get(), 1);
    }

    #[test]
    fn test_while_without_completion_callback() {
        let mut flow = WhileFlow::new(|| false, || panic!("action must not run"));
        assert!(flow.step(&TickTime::default()).is_complete());
    }
}
