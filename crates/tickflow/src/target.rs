use std::fmt;
use std::rc::Rc;

/// Owner a flow is attached to.
///
/// Owners are compared by pointer identity: two structurally equal values in
/// different allocations are different targets. `Global` is the sentinel that
/// skips the validity and enablement checks.
pub enum Target<T> {
    Global,
    Owned(Rc<T>),
}

/// Registry key derived from a target's identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKey {
    Global,
    Owned(usize),
}

impl<T> Target<T> {
    pub fn global() -> Self {
        Target::Global
    }

    pub fn owned(owner: &Rc<T>) -> Self {
        Target::Owned(Rc::clone(owner))
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Target::Global)
    }

    /// The owner value, `None` for the global sentinel
    pub fn owner(&self) -> Option<&T> {
        match self {
            Target::Global => None,
            Target::Owned(owner) => Some(owner),
        }
    }

    pub fn key(&self) -> TargetKey {
        match self {
            Target::Global => TargetKey::Global,
            // The registry holds a strong reference, so the address cannot be reused
            // while the entry exists.
            Target::Owned(owner) => TargetKey::Owned(Rc::as_ptr(owner) as *const () as usize),
        }
    }
}

impl<T> Clone for Target<T> {
    fn clone(&self) -> Self {
        match self {
            Target::Global => Target::Global,
            Target::Owned(owner) => Target::Owned(Rc::clone(owner)),
        }
    }
}

impl<T> From<Rc<T>> for Target<T> {
    fn from(owner: Rc<T>) -> Self {
        Target::Owned(owner)
    }
}

impl<T> From<&Rc<T>> for Target<T> {
    fn from(owner: &Rc<T>) -> Self {
        Target::owned(owner)
    }
}

impl<T> From<&Target<T>> for Target<T> {
    fn from(target: &Target<T>) -> Self {
        target.clone()
    }
}

impl<T> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.key() {
            TargetKey::Global => write!(f, "Target::Global"),
            TargetKey::Owned(addr) => write!(f, "Target::Owned({:#x})", addr),
        }
    }
}
