//! Small leaf blocks used by the kernel's unit tests.

use std::cell::Cell;
use std::rc::Rc;

use gatewave_common::Delay;

use crate::circuit::Circuit;
use crate::component::{Area, Component, Energy};
use crate::ids::ModuleId;
use crate::io::PortIo;
use crate::port::PortLayout;

/// Inverter: delay 3, load 1, area 1, energy 1.
pub(crate) struct Inv;

impl Component for Inv {
    fn class_name(&self) -> String {
        "TINV".into()
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new().with_input("X", 1).with_output("Z", 1)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        let x = io.read_bit("X");
        io.write("Z", !x);
    }

    fn delay(&self, _inum: usize, _onum: usize) -> Option<Delay> {
        Some(3)
    }

    fn load(&self, _inum: usize) -> Delay {
        1
    }

    fn area(&self) -> Area {
        1.0
    }

    fn energy(&self, _onum: usize) -> Energy {
        1.0
    }
}

/// Two-input AND: delay 10, load 2, area 2, energy 2. Counts its evaluations.
#[derive(Default)]
pub(crate) struct And2 {
    pub(crate) calls: Rc<Cell<usize>>,
}

impl Component for And2 {
    fn class_name(&self) -> String {
        "TAND".into()
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .with_input("A", 1)
            .with_input("B", 1)
            .with_output("Z", 1)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        self.calls.set(self.calls.get() + 1);
        let z = io.read_bit("A") & io.read_bit("B");
        io.write("Z", z);
    }

    fn delay(&self, _inum: usize, _onum: usize) -> Option<Delay> {
        Some(10)
    }

    fn load(&self, _inum: usize) -> Delay {
        2
    }

    fn area(&self) -> Area {
        2.0
    }

    fn energy(&self, _onum: usize) -> Energy {
        2.0
    }
}

pub(crate) fn inv(c: &mut Circuit) -> ModuleId {
    c.add_leaf(Inv)
}

pub(crate) fn and2(c: &mut Circuit) -> ModuleId {
    c.add_leaf(And2::default())
}

/// Composite `A -> first -> second -> Z`. Returns `(pair, first, second)`.
pub(crate) fn pair_of_inverters(c: &mut Circuit) -> (ModuleId, ModuleId, ModuleId) {
    let pair = c.add_composite(
        "Pair",
        PortLayout::new().with_input("A", 1).with_output("Z", 1),
    );
    let first = inv(c);
    let second = inv(c);
    c.add_submodules(pair, [first, second]);
    c.connect(c.input(pair, "A"), c.input(first, "X"));
    c.connect(c.output(first, "Z"), c.input(second, "X"));
    c.connect(c.output(second, "Z"), c.output(pair, "Z"));
    (pair, first, second)
}
