//! Port views and module port layouts.
//!
//! A module's inputs and outputs are flat arrays of single-bit slots. A
//! [`PortLayout`] declares how many slots exist and layers names over
//! contiguous ranges of them; a [`Port`] is a copyable view of one such range
//! on one module instance.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::ids::ModuleId;

/// Whether a port slot is read or written by its module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Read by the module.
    Input,
    /// Written by the module.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// A view of the contiguous bit range `low..=high` of one module's inputs or outputs.
///
/// Ports own nothing; they are handles passed to the connection and access
/// methods of [`Circuit`](crate::Circuit).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Port {
    module: ModuleId,
    low: usize,
    high: usize,
    direction: Direction,
}

impl Port {
    pub(crate) fn new(module: ModuleId, direction: Direction, high: usize, low: usize) -> Self {
        assert!(high >= low, "port range [{high}:{low}] is reversed");
        Self {
            module,
            low,
            high,
            direction,
        }
    }

    /// The module this port belongs to.
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// Lowest slot index covered.
    pub fn low(&self) -> usize {
        self.low
    }

    /// Highest slot index covered.
    pub fn high(&self) -> usize {
        self.high
    }

    /// Input or output.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` for output ports.
    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Number of bits covered.
    pub fn width(&self) -> usize {
        self.high - self.low + 1
    }

    /// Absolute slot indices covered, least significant first.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.low..=self.high
    }

    /// The single bit at `index`, relative to the start of this port.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn bit(&self, index: usize) -> Port {
        self.slice(index, index)
    }

    /// The sub-range `[high:low]`, relative to the start of this port.
    ///
    /// # Panics
    ///
    /// Panics if the range is reversed or extends past this port.
    pub fn slice(&self, high: usize, low: usize) -> Port {
        assert!(
            high < self.width(),
            "index {high} out of bounds for width {}",
            self.width()
        );
        Port::new(self.module, self.direction, self.low + high, self.low + low)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Input => "in",
            Direction::Output => "out",
        };
        if self.low == self.high {
            write!(f, "{}.{dir}[{}]", self.module, self.low)
        } else {
            write!(f, "{}.{dir}[{}:{}]", self.module, self.high, self.low)
        }
    }
}

/// A named slot range declared in a [`PortLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortRange {
    /// Input or output.
    pub direction: Direction,
    /// Highest slot index.
    pub high: usize,
    /// Lowest slot index.
    pub low: usize,
}

impl PortRange {
    /// Number of bits covered.
    pub fn width(&self) -> usize {
        self.high - self.low + 1
    }

    fn contains(&self, direction: Direction, index: usize) -> bool {
        self.direction == direction && (self.low..=self.high).contains(&index)
    }
}

/// The human-readable name of one port slot, e.g. `S[3]`, `Co`, or `in[5]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinName {
    /// The declared name covering the slot, if any.
    pub name: Option<String>,
    /// Bit offset within a multi-bit named range, or the raw slot index when unnamed.
    pub bit: Option<usize>,
    /// Input or output.
    pub direction: Direction,
}

impl fmt::Display for PinName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (&self.name, self.direction) {
            (Some(name), _) => name.as_str(),
            (None, Direction::Input) => "in",
            (None, Direction::Output) => "out",
        };
        match self.bit {
            Some(bit) => write!(f, "{name}[{bit}]"),
            None => write!(f, "{name}"),
        }
    }
}

/// The shape of a module: slot counts per direction and the named ranges over them.
///
/// Slots are added first (`add_inputs`/`add_input`), then names may be bound
/// to existing ranges. Names are unique across both directions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortLayout {
    num_inputs: usize,
    num_outputs: usize,
    names: BTreeMap<String, PortRange>,
}

impl PortLayout {
    /// Creates a layout with no ports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of input slots.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Number of output slots.
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Number of slots in the given direction.
    pub fn count(&self, direction: Direction) -> usize {
        match direction {
            Direction::Input => self.num_inputs,
            Direction::Output => self.num_outputs,
        }
    }

    /// Grows the input slot space by `n` unnamed bits.
    pub fn add_inputs(&mut self, n: usize) -> &mut Self {
        self.num_inputs += n;
        self
    }

    /// Grows the output slot space by `n` unnamed bits.
    pub fn add_outputs(&mut self, n: usize) -> &mut Self {
        self.num_outputs += n;
        self
    }

    /// Appends `width` input slots and names them.
    pub fn add_input(&mut self, name: &str, width: usize) -> &mut Self {
        assert!(width > 0, "port '{name}' must have a positive width");
        let low = self.num_inputs;
        self.add_inputs(width);
        self.define_input(name, low + width - 1, low)
    }

    /// Appends `width` output slots and names them.
    pub fn add_output(&mut self, name: &str, width: usize) -> &mut Self {
        assert!(width > 0, "port '{name}' must have a positive width");
        let low = self.num_outputs;
        self.add_outputs(width);
        self.define_output(name, low + width - 1, low)
    }

    /// Names the existing input range `[high:low]`.
    ///
    /// # Panics
    ///
    /// Panics if the name is taken or the range does not exist yet.
    pub fn define_input(&mut self, name: &str, high: usize, low: usize) -> &mut Self {
        self.define(name, Direction::Input, high, low)
    }

    /// Names the existing output range `[high:low]`.
    ///
    /// # Panics
    ///
    /// Panics if the name is taken or the range does not exist yet.
    pub fn define_output(&mut self, name: &str, high: usize, low: usize) -> &mut Self {
        self.define(name, Direction::Output, high, low)
    }

    fn define(&mut self, name: &str, direction: Direction, high: usize, low: usize) -> &mut Self {
        assert!(
            !self.names.contains_key(name),
            "port name '{name}' is already defined"
        );
        assert!(high >= low, "port range [{high}:{low}] is reversed");
        assert!(
            high < self.count(direction),
            "{direction} range [{high}:{low}] exceeds {} declared {direction}s",
            self.count(direction)
        );
        self.names.insert(
            name.to_string(),
            PortRange {
                direction,
                high,
                low,
            },
        );
        self
    }

    /// Builder form of [`add_input`](Self::add_input).
    pub fn with_input(mut self, name: &str, width: usize) -> Self {
        self.add_input(name, width);
        self
    }

    /// Builder form of [`add_output`](Self::add_output).
    pub fn with_output(mut self, name: &str, width: usize) -> Self {
        self.add_output(name, width);
        self
    }

    /// Builder form of [`add_inputs`](Self::add_inputs).
    pub fn with_inputs(mut self, n: usize) -> Self {
        self.add_inputs(n);
        self
    }

    /// Builder form of [`add_outputs`](Self::add_outputs).
    pub fn with_outputs(mut self, n: usize) -> Self {
        self.add_outputs(n);
        self
    }

    /// Looks up a named range.
    pub fn lookup(&self, name: &str) -> Option<PortRange> {
        self.names.get(name).copied()
    }

    /// Returns `true` if `name` is a declared input.
    pub fn has_input(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|r| r.direction == Direction::Input)
    }

    /// Returns `true` if `name` is a declared output.
    pub fn has_output(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|r| r.direction == Direction::Output)
    }

    /// Iterates over the declared names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = (&str, PortRange)> {
        self.names.iter().map(|(n, r)| (n.as_str(), *r))
    }

    /// Names the slot `index` in `direction`.
    ///
    /// The first declared name (in lexical order) covering the slot wins.
    /// Single-bit names carry no bit offset.
    pub fn name_of(&self, direction: Direction, index: usize) -> PinName {
        for (name, range) in &self.names {
            if range.contains(direction, index) {
                return PinName {
                    name: Some(name.clone()),
                    bit: (range.width() > 1).then(|| index - range.low),
                    direction,
                };
            }
        }
        PinName {
            name: None,
            bit: Some(index),
            direction,
        }
    }
}
