//! Two-way multiplexer.

use gatewave_common::{Bit, BitVector, Delay};
use gatewave_config::CellParams;
use gatewave_sim::{Area, Component, Energy, PortIo, PortLayout};

/// `Z = SEL ? B : A` on N-bit data; an undefined select gives an all-`x` result.
///
/// Each bit is costed as two ANDs feeding an OR.
#[derive(Clone, Debug)]
pub struct Mux {
    width: usize,
    delay: Delay,
    data_load: Delay,
    bit_area: Area,
    energy: Energy,
}

impl Mux {
    /// Creates an N-bit multiplexer with the reference gate tables.
    pub fn new(width: usize) -> Self {
        Self::with_params(width, &CellParams::default())
    }

    /// Creates an N-bit multiplexer costed from the given gate tables.
    pub fn with_params(width: usize, cells: &CellParams) -> Self {
        assert!(width > 0, "multiplexer width must be positive");
        Self {
            width,
            delay: cells.and.delay(2) + cells.or.delay(2),
            data_load: cells.and.load,
            bit_area: 2.0 * cells.and.area(2) + cells.or.area(2),
            energy: 2.0 * cells.and.energy(2) + cells.or.energy(2),
        }
    }
}

impl Component for Mux {
    fn class_name(&self) -> String {
        format!("MUX<{}>", self.width)
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .with_input("A", self.width)
            .with_input("B", self.width)
            .with_input("SEL", 1)
            .with_output("Z", self.width)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        let z = match io.read_bit("SEL") {
            Bit::Low => io.read("A"),
            Bit::High => io.read("B"),
            Bit::Undef => BitVector::new(self.width),
        };
        io.write("Z", z);
    }

    /// Data bit `i` of `A` or `B` only reaches `Z[i]`; `SEL` reaches every output.
    fn delay(&self, inum: usize, onum: usize) -> Option<Delay> {
        if inum < 2 * self.width && inum % self.width != onum {
            return None;
        }
        Some(self.delay)
    }

    fn load(&self, inum: usize) -> Delay {
        if inum < 2 * self.width {
            self.data_load
        } else {
            self.width as Delay * 2 * self.data_load
        }
    }

    fn area(&self) -> Area {
        self.width as Area * self.bit_area
    }

    fn energy(&self, _onum: usize) -> Energy {
        self.energy
    }
}
