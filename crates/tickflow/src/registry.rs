use std::collections::{HashMap, HashSet};

use crate::flow::BoxedFlow;
use crate::target::{Target, TargetKey};

pub(crate) struct TargetEntry<T> {
    target: Target<T>,
    flows: Vec<BoxedFlow>,
}

impl<T> TargetEntry<T> {
    pub(crate) fn flow_count(&self) -> usize {
        self.flows.len()
    }
}

/// Owner -> ordered flows, with owners enumerated in first-registration order
pub(crate) struct TargetRegistry<T> {
    order: Vec<TargetKey>,
    entries: HashMap<TargetKey, TargetEntry<T>>,
}

impl<T> TargetRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Append `flow` after the owner's existing flows
    pub(crate) fn push(&mut self, target: &Target<T>, flow: BoxedFlow) {
        self.entry(target).flows.push(flow);
    }

    fn entry(&mut self, target: &Target<T>) -> &mut TargetEntry<T> {
        let key = target.key();
        if !self.entries.contains_key(&key) {
            self.order.push(key);
        }
        self.entries.entry(key).or_insert_with(|| TargetEntry {
            target: target.clone(),
            flows: Vec::new(),
        })
    }

    /// Snapshot of the owners, in enumeration order
    pub(crate) fn keys(&self) -> Vec<TargetKey> {
        self.order.clone()
    }

    pub(crate) fn target(&self, key: TargetKey) -> Option<Target<T>> {
        self.entries.get(&key).map(|entry| entry.target.clone())
    }

    /// Move an owner's flows out so they can be stepped without a borrow held.
    /// The entry stays registered with an empty list until [`Self::restore_flows`].
    pub(crate) fn take_flows(&mut self, key: TargetKey) -> Vec<BoxedFlow> {
        self.entries
            .get_mut(&key)
            .map(|entry| std::mem::take(&mut entry.flows))
            .unwrap_or_default()
    }

    pub(crate) fn restore_flows(&mut self, key: TargetKey, flows: Vec<BoxedFlow>) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.flows = flows;
        }
    }

    /// Detach every owner in `keys` with its flows, pruning the order once.
    ///
    /// The entries are handed back so the caller decides when their
    /// closures and owners are dropped.
    pub(crate) fn remove_all(
        &mut self,
        keys: &[TargetKey],
    ) -> Vec<(TargetKey, TargetEntry<T>)> {
        let removed: Vec<_> = keys
            .iter()
            .filter_map(|key| self.entries.remove(key).map(|entry| (*key, entry)))
            .collect();

        if !removed.is_empty() {
            let gone: HashSet<TargetKey> = removed.iter().map(|(key, _)| *key).collect();
            self.order.retain(|key| !gone.contains(key));
        }
        removed
    }

    /// Fold `other` in, appending its flows after each owner's existing ones
    pub(crate) fn merge(&mut self, other: TargetRegistry<T>) {
        let TargetRegistry { order, mut entries } = other;
        for key in order {
            if let Some(incoming) = entries.remove(&key) {
                if incoming.flows.is_empty() {
                    continue;
                }
                self.entry(&incoming.target).flows.extend(incoming.flows);
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn target_count(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn flow_count(&self) -> usize {
        self.entries.values().map(|entry| entry.flows.len()).sum()
    }

    pub(crate) fn flow_count_for(&self, key: TargetKey) -> usize {
        self.entries.get(&key).map_or(0, |entry| entry.flows.len())
    }
}

impl<T> Default for TargetRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
