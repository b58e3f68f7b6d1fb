use std::rc::Rc;

use crate::target::Target;

/// Host-supplied test against an owner
pub(crate) type Predicate<T> = Rc<dyn Fn(&T) -> bool>;

/// What a pass should do with one owner's flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
    /// Step the flows
    Run,
    /// Owner is paused; keep its flows for a later tick
    Skip,
    /// Owner is gone; drop its flows
    Evict,
}

/// Validity and enablement predicates. Unset predicates accept every owner.
pub(crate) struct Hooks<T> {
    is_valid: Option<Predicate<T>>,
    is_enabled: Option<Predicate<T>>,
}

impl<T> Hooks<T> {
    pub(crate) fn new() -> Self {
        Self {
            is_valid: None,
            is_enabled: None,
        }
    }

    pub(crate) fn set_validity(&mut self, predicate: Predicate<T>) {
        self.is_valid = Some(predicate);
    }

    pub(crate) fn set_enablement(&mut self, predicate: Predicate<T>) {
        self.is_enabled = Some(predicate);
    }

    /// Evaluate both predicates for `target`. The global sentinel always runs.
    pub(crate) fn gate(&self, target: &Target<T>) -> Gate {
        let Some(owner) = target.owner() else {
            return Gate::Run;
        };

        if let Some(is_valid) = &self.is_valid {
            if !is_valid(owner) {
                return Gate::Evict;
            }
        }

        if let Some(is_enabled) = &self.is_enabled {
            if !is_enabled(owner) {
                return Gate::Skip;
            }
        }

        Gate::Run
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            is_valid: self.is_valid.clone(),
            is_enabled: self.is_enabled.clone(),
        }
    }
}
