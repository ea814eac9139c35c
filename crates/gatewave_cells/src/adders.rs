//! Multi-bit adders assembled from smaller adders.
//!
//! Every adder shares one port shape: `X(N)`, `Y(N)`, `Ci` in and `S(N)`,
//! `Co` out. An [`Adder`] is a recipe that can instantiate itself any number
//! of times into a [`Circuit`], which is how a [`RippleAdder`] stamps out its
//! stages from a single group adder.

use std::fmt;
use std::rc::Rc;

use gatewave_common::LogicOp;
use gatewave_config::CellParams;
use gatewave_sim::{Circuit, Component, ModuleId, PortLayout};

use crate::adder_cells::{FullAdderCell, HalfAdder};
use crate::gates::Gate;

/// Port layout shared by every N-bit adder.
pub fn adder_layout(width: usize) -> PortLayout {
    PortLayout::new()
        .with_input("X", width)
        .with_input("Y", width)
        .with_input("Ci", 1)
        .with_output("S", width)
        .with_output("Co", 1)
}

/// A fixed-width adder that can be instantiated into a circuit.
pub trait Adder {
    /// Operand width in bits.
    fn width(&self) -> usize;

    /// Class name of every instance this adder builds.
    fn class_name(&self) -> String;

    /// Adds a fresh instance to `circuit` and returns its id.
    fn build(&self, circuit: &mut Circuit) -> ModuleId;
}

impl Adder for FullAdderCell {
    fn width(&self) -> usize {
        1
    }

    fn class_name(&self) -> String {
        Component::class_name(self)
    }

    fn build(&self, circuit: &mut Circuit) -> ModuleId {
        circuit.add_leaf(self.clone())
    }
}

/// One-bit full adder made of two half adders and an OR on the carries.
#[derive(Clone, Debug, Default)]
pub struct FullAdder {
    cells: CellParams,
}

impl FullAdder {
    /// Creates a full adder from the reference cells.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a full adder whose cells are costed from `cells`.
    pub fn with_params(cells: CellParams) -> Self {
        Self { cells }
    }
}

impl Adder for FullAdder {
    fn width(&self) -> usize {
        1
    }

    fn class_name(&self) -> String {
        "FullAdder".into()
    }

    fn build(&self, circuit: &mut Circuit) -> ModuleId {
        let fa = circuit.add_composite(self.class_name(), adder_layout(1));
        let or = circuit.add_leaf(Gate::with_params(LogicOp::Or, 2, self.cells.or));
        let ha0 = circuit.add_leaf(HalfAdder::with_params(&self.cells));
        let ha1 = circuit.add_leaf(HalfAdder::with_params(&self.cells));
        circuit.add_submodules(fa, [or, ha0, ha1]);

        circuit.connect(circuit.input(fa, "X"), circuit.input(ha0, "X"));
        circuit.connect(circuit.input(fa, "Y"), circuit.input(ha0, "Y"));
        circuit.connect(circuit.output(ha0, "S"), circuit.input(ha1, "X"));
        circuit.connect(circuit.input(fa, "Ci"), circuit.input(ha1, "Y"));
        circuit.connect(circuit.output(ha0, "C"), circuit.input_bit(or, 0));
        circuit.connect(circuit.output(ha1, "C"), circuit.input_bit(or, 1));
        circuit.connect(circuit.output(ha1, "S"), circuit.output(fa, "S"));
        circuit.connect(circuit.output_bit(or, 0), circuit.output(fa, "Co"));
        fa
    }
}

/// N-bit ripple-carry adder: `N / group.width()` group adders with each
/// carry out feeding the next carry in.
///
/// Stage `i` covers bits `[(i + 1) * w - 1 : i * w]` and is tagged `i`.
#[derive(Clone)]
pub struct RippleAdder {
    width: usize,
    group: Rc<dyn Adder>,
}

impl RippleAdder {
    /// Creates an N-bit ripple adder from copies of `group`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or not a multiple of the group width.
    pub fn new(width: usize, group: impl Adder + 'static) -> Self {
        let gw = group.width();
        assert!(
            width > 0 && gw > 0 && width % gw == 0,
            "ripple width {width} is not a multiple of group width {gw}"
        );
        Self {
            width,
            group: Rc::new(group),
        }
    }

    /// Number of group adders in the carry chain.
    pub fn stages(&self) -> usize {
        self.width / self.group.width()
    }
}

impl fmt::Debug for RippleAdder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RippleAdder")
            .field("width", &self.width)
            .field("group", &self.group.class_name())
            .finish()
    }
}

impl Adder for RippleAdder {
    fn width(&self) -> usize {
        self.width
    }

    fn class_name(&self) -> String {
        format!("RippleAdder<{},{}>", self.width, self.group.class_name())
    }

    fn build(&self, circuit: &mut Circuit) -> ModuleId {
        let top = circuit.add_composite(self.class_name(), adder_layout(self.width));
        let gw = self.group.width();
        let mut carry: Option<ModuleId> = None;
        for i in 0..self.stages() {
            let stage = self.group.build(circuit);
            circuit.add_submodule(top, stage);
            circuit.set_tag(stage, i as u32);

            let (high, low) = ((i + 1) * gw - 1, i * gw);
            circuit.connect(circuit.input_range(top, "X", high, low), circuit.input(stage, "X"));
            circuit.connect(circuit.input_range(top, "Y", high, low), circuit.input(stage, "Y"));
            match carry {
                None => circuit.connect(circuit.input(top, "Ci"), circuit.input(stage, "Ci")),
                Some(prev) => circuit.connect(circuit.output(prev, "Co"), circuit.input(stage, "Ci")),
            }
            circuit.connect(circuit.output(stage, "S"), circuit.output_range(top, "S", high, low));
            carry = Some(stage);
        }
        if let Some(last) = carry {
            circuit.connect(circuit.output(last, "Co"), circuit.output(top, "Co"));
        }
        top
    }
}
