//! Sparse, time-ordered value history of a single-bit signal.

use crate::bit::Bit;
use crate::time::SimTime;
use std::collections::BTreeMap;

/// The value changes recorded on one wire.
///
/// Holds at most one entry per time point. A query at time `T` answers with
/// the entry at the greatest recorded time `<= T`, so the history only has to
/// store the handful of points at which a signal actually changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignalHistory {
    entries: BTreeMap<SimTime, Bit>,
}

impl SignalHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recent entry at or before `time`.
    pub fn entry(&self, time: SimTime) -> Option<(SimTime, Bit)> {
        self.entries
            .range(..=time)
            .next_back()
            .map(|(t, b)| (*t, *b))
    }

    /// Returns the value at `time`, or `Undef` if nothing was recorded yet.
    pub fn get(&self, time: SimTime) -> Bit {
        self.entry(time).map_or(Bit::Undef, |(_, b)| b)
    }

    /// Records `bit` at `time`.
    ///
    /// Returns `false` without touching the history when the value already
    /// in effect at `time` equals `bit`; otherwise the entry at exactly
    /// `time` is inserted or replaced and `true` is returned.
    pub fn set(&mut self, bit: Bit, time: SimTime) -> bool {
        if self.get(time) == bit {
            return false;
        }
        self.entries.insert(time, bit);
        true
    }

    /// Drops every entry recorded strictly after `time`.
    ///
    /// Returns the number of entries removed.
    pub fn truncate_after(&mut self, time: SimTime) -> usize {
        let mut later = self.entries.split_off(&time);
        if let Some(bit) = later.remove(&time) {
            self.entries.insert(time, bit);
        }
        later.len()
    }

    /// Returns `true` if an entry exists at exactly `time`.
    pub fn has_time(&self, time: SimTime) -> bool {
        self.entries.contains_key(&time)
    }

    /// Returns the latest recorded time, or `None` if the history is empty.
    pub fn last_time(&self) -> Option<SimTime> {
        self.entries.keys().next_back().copied()
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over `(time, bit)` entries in increasing time order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (SimTime, Bit)> + '_ {
        self.entries.iter().map(|(t, b)| (*t, *b))
    }
}
