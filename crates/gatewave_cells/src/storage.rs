//! Clocked storage: edge-triggered registers and level-sensitive latches.
//!
//! Both cells take an N-bit `D` input followed by a one-bit `CLK` input and
//! drive an N-bit `Q` output. Timing only runs from the clock (and, for the
//! transparent latch, from each data bit to its own output).

use gatewave_common::{Bit, Delay};
use gatewave_config::{CellParams, StorageParams};
use gatewave_sim::{Area, Component, Energy, PortIo, PortLayout};

fn storage_layout(width: usize) -> PortLayout {
    assert!(width > 0, "storage width must be positive");
    PortLayout::new()
        .with_input("D", width)
        .with_input("CLK", 1)
        .with_output("Q", width)
}

/// Clock load grows with the number of bits the clock fans out to.
fn storage_load(params: &StorageParams, width: usize, inum: usize) -> Delay {
    if inum == width {
        (width as Delay + 1) * 2 * params.load
    } else {
        params.load
    }
}

/// `Q <= D` on every rising edge of `CLK`.
#[derive(Clone, Debug)]
pub struct Register {
    width: usize,
    params: StorageParams,
}

impl Register {
    /// Creates an N-bit register with the reference parameters.
    pub fn new(width: usize) -> Self {
        Self::with_params(width, CellParams::default().register)
    }

    /// Creates an N-bit register with explicit parameters.
    pub fn with_params(width: usize, params: StorageParams) -> Self {
        Self { width, params }
    }
}

impl Component for Register {
    fn class_name(&self) -> String {
        format!("REG<{}>", self.width)
    }

    fn layout(&self) -> PortLayout {
        storage_layout(self.width)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        if io.posedge("CLK") {
            let d = io.read("D");
            io.write("Q", d);
        }
    }

    fn delay(&self, inum: usize, _onum: usize) -> Option<Delay> {
        (inum == self.width).then_some(self.params.clk_to_q)
    }

    fn load(&self, inum: usize) -> Delay {
        storage_load(&self.params, self.width, inum)
    }

    fn area(&self) -> Area {
        self.params.area * (self.width + 1) as Area
    }

    fn energy(&self, _onum: usize) -> Energy {
        self.params.energy
    }
}

/// `Q <= D` whenever `CLK` is `1`.
#[derive(Clone, Debug)]
pub struct Latch {
    width: usize,
    params: StorageParams,
}

impl Latch {
    /// Creates an N-bit latch with the reference parameters.
    pub fn new(width: usize) -> Self {
        Self::with_params(width, CellParams::default().latch)
    }

    /// Creates an N-bit latch with explicit parameters.
    pub fn with_params(width: usize, params: StorageParams) -> Self {
        Self { width, params }
    }
}

impl Component for Latch {
    fn class_name(&self) -> String {
        format!("LATCH<{}>", self.width)
    }

    fn layout(&self) -> PortLayout {
        storage_layout(self.width)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        if io.read_bit("CLK") == Bit::High {
            let d = io.read("D");
            io.write("Q", d);
        }
    }

    fn delay(&self, inum: usize, onum: usize) -> Option<Delay> {
        (inum == onum || inum == self.width).then_some(self.params.clk_to_q)
    }

    fn load(&self, inum: usize) -> Delay {
        storage_load(&self.params, self.width, inum)
    }

    fn area(&self) -> Area {
        self.params.area * (self.width + 1) as Area
    }

    fn energy(&self, _onum: usize) -> Energy {
        self.params.energy
    }
}
