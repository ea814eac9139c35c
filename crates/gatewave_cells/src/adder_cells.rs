//! One-bit half and full adder leaf cells.

use gatewave_common::Delay;
use gatewave_config::CellParams;
use gatewave_sim::{Area, Component, Energy, PortIo, PortLayout};

/// Half adder: `S = X ^ Y`, `C = X & Y`.
#[derive(Clone, Debug)]
pub struct HalfAdder {
    sum_delay: Delay,
    carry_delay: Delay,
    load: Delay,
    area: Area,
    sum_energy: Energy,
    carry_energy: Energy,
}

impl HalfAdder {
    /// Creates a half adder costed from the reference gate tables.
    pub fn new() -> Self {
        Self::with_params(&CellParams::default())
    }

    /// Creates a half adder costed as one XOR and one AND, both two-input.
    pub fn with_params(cells: &CellParams) -> Self {
        Self {
            sum_delay: cells.xor.delay(2),
            carry_delay: cells.and.delay(2),
            load: cells.and.load + cells.xor.load,
            area: cells.xor.area(2) + cells.and.area(2),
            sum_energy: cells.xor.energy(2),
            carry_energy: cells.and.energy(2),
        }
    }
}

impl Default for HalfAdder {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HalfAdder {
    fn class_name(&self) -> String {
        "HA".into()
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .with_input("X", 1)
            .with_input("Y", 1)
            .with_output("S", 1)
            .with_output("C", 1)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        let x = io.read_bit("X");
        let y = io.read_bit("Y");
        io.write("S", x ^ y);
        io.write("C", x & y);
    }

    fn delay(&self, _inum: usize, onum: usize) -> Option<Delay> {
        Some(if onum == 0 {
            self.sum_delay
        } else {
            self.carry_delay
        })
    }

    fn load(&self, _inum: usize) -> Delay {
        self.load
    }

    fn area(&self) -> Area {
        self.area
    }

    fn energy(&self, onum: usize) -> Energy {
        if onum == 0 {
            self.sum_energy
        } else {
            self.carry_energy
        }
    }
}

/// Full adder leaf: `S = X ^ Y ^ Ci`, `Co = majority(X, Y, Ci)`.
///
/// Costed as two XORs for the sum, three ANDs and a three-input OR for the
/// carry. The carry input reaches the sum through one XOR only.
#[derive(Clone, Debug)]
pub struct FullAdderCell {
    xor_delay: Delay,
    carry_delay: Delay,
    operand_load: Delay,
    carry_load: Delay,
    area: Area,
    sum_energy: Energy,
    carry_energy: Energy,
}

impl FullAdderCell {
    /// Creates a full adder costed from the reference gate tables.
    pub fn new() -> Self {
        Self::with_params(&CellParams::default())
    }

    /// Creates a full adder costed from the given gate tables.
    pub fn with_params(cells: &CellParams) -> Self {
        Self {
            xor_delay: cells.xor.delay(2),
            carry_delay: cells.or.delay(3) + cells.and.delay(2),
            operand_load: 2 * cells.and.load + cells.xor.load,
            carry_load: 3 * cells.and.load,
            area: 2.0 * cells.xor.area(2) + 3.0 * cells.and.area(2) + cells.or.area(2),
            sum_energy: 2.0 * cells.xor.energy(2),
            carry_energy: 3.0 * cells.or.energy + 3.0 * cells.and.energy(2),
        }
    }
}

impl Default for FullAdderCell {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FullAdderCell {
    fn class_name(&self) -> String {
        "FA".into()
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .with_input("X", 1)
            .with_input("Y", 1)
            .with_input("Ci", 1)
            .with_output("S", 1)
            .with_output("Co", 1)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        let x = io.bit(0);
        let y = io.bit(1);
        let c = io.bit(2);
        io.write_bit(0, x ^ y ^ c);
        io.write_bit(1, (x & y) | (x & c) | (y & c));
    }

    fn delay(&self, inum: usize, onum: usize) -> Option<Delay> {
        Some(match (onum, inum) {
            (0, 2) => self.xor_delay,
            (0, _) => 2 * self.xor_delay,
            _ => self.carry_delay,
        })
    }

    fn load(&self, inum: usize) -> Delay {
        if inum == 2 {
            self.carry_load
        } else {
            self.operand_load
        }
    }

    fn area(&self) -> Area {
        self.area
    }

    fn energy(&self, onum: usize) -> Energy {
        if onum == 0 {
            self.sum_energy
        } else {
            self.carry_energy
        }
    }
}
