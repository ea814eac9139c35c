//! Bitwise inverters and buffers.

use gatewave_common::Delay;
use gatewave_config::InverterParams;
use gatewave_sim::{Area, Component, Energy, PortIo, PortLayout};

/// `Z = !X` on every bit of an N-bit port.
#[derive(Clone, Debug)]
pub struct Inv {
    width: usize,
    params: InverterParams,
}

impl Inv {
    /// Creates an N-bit inverter with the reference parameters.
    pub fn new(width: usize) -> Self {
        Self::with_params(width, InverterParams::default())
    }

    /// Creates an N-bit inverter with explicit parameters.
    pub fn with_params(width: usize, params: InverterParams) -> Self {
        assert!(width > 0, "inverter width must be positive");
        Self { width, params }
    }
}

impl Component for Inv {
    fn class_name(&self) -> String {
        format!("INV<{}>", self.width)
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .with_input("X", self.width)
            .with_output("Z", self.width)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        let x = io.read("X");
        io.write("Z", !&x);
    }

    fn delay(&self, inum: usize, onum: usize) -> Option<Delay> {
        (inum == onum).then_some(self.params.delay)
    }

    fn load(&self, _inum: usize) -> Delay {
        self.params.load
    }

    fn area(&self) -> Area {
        self.width as Area * self.params.area
    }

    fn energy(&self, _onum: usize) -> Energy {
        self.params.energy
    }
}

/// `Z = X` on every bit, modeled as two inverters in series.
#[derive(Clone, Debug)]
pub struct Buf {
    width: usize,
    params: InverterParams,
}

impl Buf {
    /// Creates an N-bit buffer with the reference parameters.
    pub fn new(width: usize) -> Self {
        Self::with_params(width, InverterParams::default())
    }

    /// Creates an N-bit buffer with explicit inverter parameters.
    pub fn with_params(width: usize, params: InverterParams) -> Self {
        assert!(width > 0, "buffer width must be positive");
        Self { width, params }
    }
}

impl Component for Buf {
    fn class_name(&self) -> String {
        format!("BUF<{}>", self.width)
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .with_input("X", self.width)
            .with_output("Z", self.width)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        let x = io.read("X");
        io.write("Z", x);
    }

    fn delay(&self, inum: usize, onum: usize) -> Option<Delay> {
        (inum == onum).then_some(2 * self.params.delay)
    }

    fn load(&self, _inum: usize) -> Delay {
        self.params.load
    }

    fn area(&self) -> Area {
        self.width as Area * 2.0 * self.params.area
    }

    fn energy(&self, _onum: usize) -> Energy {
        2.0 * self.params.energy
    }
}

#[cfg(test)]
mod tests {
    use gatewave_common::{BitVector, SimTime};
    use gatewave_sim::Circuit;

    use super::*;

    #[test]
    fn inverts_each_bit() {
        let mut c = Circuit::new();
        let n = c.add_leaf(Inv::new(4));
        c.assign(c.input(n, "X"), BitVector::from_binary_str("10x0").unwrap());
        c.simulate(n);
        assert_eq!(c.read(c.output(n, "Z")).to_string(), "01x1");
    }

    #[test]
    fn inverter_paths_are_bitwise() {
        let n = Inv::new(3);
        assert_eq!(n.class_name(), "INV<3>");
        assert_eq!(n.delay(1, 1), Some(1));
        assert_eq!(n.delay(0, 2), None);
        assert_eq!(n.area(), 3.0);
        assert_eq!(n.energy(0), 1.0);
    }

    #[test]
    fn buffer_copies_after_two_stages() {
        let mut c = Circuit::new();
        let b = c.add_leaf(Buf::new(2));
        c.assign_value(c.input(b, "X"), 0b10);
        c.simulate(b);
        let z = c.output(b, "Z");
        assert_eq!(c.value_at(z, SimTime::from_ticks(1)), None);
        assert_eq!(c.value_at(z, SimTime::from_ticks(2)), Some(0b10));
    }

    #[test]
    fn buffer_figures() {
        let b = Buf::new(4);
        assert_eq!(b.class_name(), "BUF<4>");
        assert_eq!(b.delay(3, 3), Some(2));
        assert_eq!(b.delay(3, 2), None);
        assert_eq!(b.load(0), 1);
        assert_eq!(b.area(), 8.0);
        assert_eq!(b.energy(0), 2.0);
    }
}
