//! Single-bit shared nets.

use std::collections::BTreeSet;
use std::fmt;

use gatewave_common::{Bit, SignalHistory, SimTime};
use log::trace;

use crate::ids::ModuleId;

/// One slot of one module: an input index for readers, an output index for the writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin {
    /// The module owning the slot.
    pub module: ModuleId,
    /// Slot index within the module's inputs or outputs.
    pub index: usize,
}

impl Pin {
    /// Creates a pin.
    pub fn new(module: ModuleId, index: usize) -> Self {
        Self { module, index }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.index)
    }
}

/// A single-bit net shared by every module slot bound to it.
///
/// Only leaf modules appear as the writer or among the readers; composite
/// modules bind their slots to the same wire without taking a role. The
/// wire is freed once no slot references it.
#[derive(Clone, Debug, Default)]
pub struct Wire {
    writer: Option<Pin>,
    readers: BTreeSet<Pin>,
    history: SignalHistory,
    constant: bool,
    refs: u32,
}

impl Wire {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The output slot driving this wire.
    pub fn writer(&self) -> Option<Pin> {
        self.writer
    }

    /// The input slots reading this wire, in module order.
    pub fn readers(&self) -> impl Iterator<Item = Pin> + '_ {
        self.readers.iter().copied()
    }

    /// Number of reader slots.
    pub fn num_readers(&self) -> usize {
        self.readers.len()
    }

    /// The recorded value changes.
    pub fn history(&self) -> &SignalHistory {
        &self.history
    }

    /// The value in effect at `time`.
    pub fn get(&self, time: SimTime) -> Bit {
        self.history.get(time)
    }

    /// Returns `true` once [`hold`](Self::hold) froze the wire.
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Number of module slots bound to this wire.
    pub fn ref_count(&self) -> u32 {
        self.refs
    }

    pub(crate) fn set_writer(&mut self, pin: Pin) {
        assert!(
            self.writer.is_none() || self.writer == Some(pin),
            "wire already driven by {}",
            self.writer.map_or_else(String::new, |w| w.to_string())
        );
        self.writer = Some(pin);
    }

    pub(crate) fn add_reader(&mut self, pin: Pin) {
        self.readers.insert(pin);
    }

    /// Drops every role `module` holds on this wire.
    pub(crate) fn detach(&mut self, module: ModuleId) {
        self.readers.retain(|p| p.module != module);
        if self.writer.is_some_and(|p| p.module == module) {
            self.writer = None;
        }
    }

    /// Records a value change; returns `true` if the value actually changed.
    ///
    /// Writes follow transport-delay rules: a write at `time` supersedes every
    /// change previously scheduled after `time`, so a late-arriving write from
    /// an earlier event can never outlive a newer one.
    ///
    /// # Panics
    ///
    /// Panics if the wire is held constant.
    pub(crate) fn set(&mut self, bit: Bit, time: SimTime) -> bool {
        assert!(!self.constant, "write to held wire at {time}");
        let dropped = self.history.truncate_after(time);
        if dropped > 0 {
            trace!("{dropped} superseded change(s) after {time} dropped");
        }
        self.history.set(bit, time)
    }

    /// Freezes the current value.
    ///
    /// # Panics
    ///
    /// Panics if the wire is already held or has more than one recorded value.
    pub(crate) fn hold(&mut self) {
        assert!(!self.constant, "wire is already held");
        assert!(
            self.history.len() <= 1,
            "cannot hold a wire with {} recorded values",
            self.history.len()
        );
        self.constant = true;
    }

    /// Clears the history unless the wire is held.
    pub(crate) fn clear(&mut self) {
        if !self.constant {
            self.history.clear();
        }
    }

    /// Takes over the readers, writer, and references of a wire being merged away.
    pub(crate) fn absorb(&mut self, other: Wire) {
        if let Some(pin) = other.writer {
            self.set_writer(pin);
        }
        self.readers.extend(other.readers);
        self.refs += other.refs;
    }

    pub(crate) fn retain(&mut self, count: u32) {
        self.refs += count;
    }

    /// Drops one reference and returns how many remain.
    pub(crate) fn release(&mut self) -> u32 {
        self.refs = self.refs.saturating_sub(1);
        self.refs
    }
}
