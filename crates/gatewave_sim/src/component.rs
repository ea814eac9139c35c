//! The behavior contract of leaf circuit blocks.

use gatewave_common::Delay;

use crate::io::PortIo;
use crate::port::PortLayout;

/// Area estimate, in the units of the cell parameter tables.
pub type Area = f64;
/// Switching energy estimate, in the units of the cell parameter tables.
pub type Energy = f64;

/// A leaf circuit block: its shape, its reaction function, and its cost model.
///
/// Composite blocks do not implement this trait; they are assembled inside a
/// [`Circuit`](crate::Circuit) from other modules, and their timing and cost
/// figures are derived from their submodules.
pub trait Component {
    /// Structural identity, e.g. `"AND<3>"`. Instances with equal class names
    /// must have identical ports and timing.
    fn class_name(&self) -> String;

    /// The block's input and output ports.
    fn layout(&self) -> PortLayout;

    /// Reads the current inputs and schedules the resulting output values.
    ///
    /// Must be total over the three-valued input space.
    fn propagate(&self, io: &mut PortIo<'_>);

    /// Delay from input slot `inum` to output slot `onum`, or `None` if the
    /// input does not affect that output.
    fn delay(&self, inum: usize, onum: usize) -> Option<Delay>;

    /// Load input slot `inum` presents to its driver.
    fn load(&self, _inum: usize) -> Delay {
        0
    }

    /// Static area of the block.
    fn area(&self) -> Area {
        0.0
    }

    /// Energy spent each time output slot `onum` switches.
    fn energy(&self, _onum: usize) -> Energy {
        0.0
    }
}
