//! Time-ordered queue of pending module re-evaluations.

use std::collections::{BTreeMap, BTreeSet};

use gatewave_common::SimTime;

use crate::ids::ModuleId;

/// A pending `propagate` call: one module at one time, with the inputs that changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueItem {
    /// The module to re-evaluate.
    pub module: ModuleId,
    /// When to re-evaluate it.
    pub time: SimTime,
    /// Input slots whose wires changed at `time`.
    pub inputs: BTreeSet<usize>,
}

/// Pending events ordered by `(time, module)`.
///
/// Input changes for the same module at the same time coalesce into one item,
/// so simultaneous changes cause a single `propagate` call.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    items: BTreeMap<(SimTime, ModuleId), BTreeSet<usize>>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that input `inum` of `module` changes at `time`.
    pub fn push(&mut self, module: ModuleId, time: SimTime, inum: usize) {
        self.items.entry((time, module)).or_default().insert(inum);
    }

    /// Time of the earliest pending item.
    pub fn peek_time(&self) -> Option<SimTime> {
        self.items.keys().next().map(|(t, _)| *t)
    }

    /// Removes and returns the earliest item; ties go to the lower module ID.
    pub fn pop(&mut self) -> Option<QueueItem> {
        let ((time, module), inputs) = self.items.pop_first()?;
        Some(QueueItem {
            module,
            time,
            inputs,
        })
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every pending item for `module`; returns how many were dropped.
    pub fn remove_module(&mut self, module: ModuleId) -> usize {
        let before = self.items.len();
        self.items.retain(|(_, m), _| *m != module);
        before - self.items.len()
    }

    /// Drops every pending item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates over pending items in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (SimTime, ModuleId, &BTreeSet<usize>)> {
        self.items.iter().map(|((t, m), inputs)| (*t, *m, inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(raw: u32) -> ModuleId {
        ModuleId::from_raw(raw)
    }

    fn t(ticks: u64) -> SimTime {
        SimTime::from_ticks(ticks)
    }

    #[test]
    fn coalesces_same_module_and_time() {
        let mut q = EventQueue::new();
        q.push(m(1), t(10), 0);
        q.push(m(1), t(10), 2);
        q.push(m(1), t(10), 0);
        assert_eq!(q.len(), 1);
        let item = q.pop().unwrap();
        assert_eq!(item.inputs.into_iter().collect::<Vec<_>>(), vec![0, 2]);
        assert!(q.is_empty());
    }

    #[test]
    fn distinct_times_are_distinct_items() {
        let mut q = EventQueue::new();
        q.push(m(1), t(10), 0);
        q.push(m(1), t(11), 0);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn pops_by_time_then_module() {
        let mut q = EventQueue::new();
        q.push(m(5), t(20), 0);
        q.push(m(3), t(10), 0);
        q.push(m(1), t(10), 1);
        q.push(m(0), t(30), 0);
        let order: Vec<_> = std::iter::from_fn(|| q.pop())
            .map(|item| (item.time.ticks(), item.module.as_raw()))
            .collect();
        assert_eq!(order, vec![(10, 1), (10, 3), (20, 5), (30, 0)]);
    }

    #[test]
    fn peek_time_does_not_consume() {
        let mut q = EventQueue::new();
        assert_eq!(q.peek_time(), None);
        q.push(m(2), t(7), 0);
        assert_eq!(q.peek_time(), Some(t(7)));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn remove_module_keeps_the_others() {
        let mut q = EventQueue::new();
        q.push(m(2), t(7), 0);
        q.push(m(3), t(7), 0);
        q.push(m(2), t(9), 1);
        assert_eq!(q.remove_module(m(2)), 2);
        assert_eq!(q.pop().map(|item| item.module), Some(m(3)));
        assert!(q.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = EventQueue::new();
        q.push(m(2), t(7), 0);
        q.push(m(3), t(8), 1);
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.iter().count(), 0);
    }
}
