//! The view a leaf block gets of its own ports during `propagate`.

use gatewave_common::{Bit, BitVector, SimTime};

use crate::circuit::Circuit;
use crate::ids::ModuleId;
use crate::port::{Direction, Port};

/// Port access for one module at the current simulation time.
///
/// Reads see wire values at the current time. Writes to outputs are
/// scheduled after the module's input-to-output delay; an output that none
/// of the changed inputs affects is left alone.
pub struct PortIo<'a> {
    circuit: &'a mut Circuit,
    module: ModuleId,
}

impl<'a> PortIo<'a> {
    pub(crate) fn new(circuit: &'a mut Circuit, module: ModuleId) -> Self {
        Self { circuit, module }
    }

    /// The module being evaluated.
    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// The current simulation time.
    pub fn time(&self) -> SimTime {
        self.circuit.sim.time
    }

    /// Number of input slots.
    pub fn num_inputs(&self) -> usize {
        self.circuit.modules[self.module].num_inputs()
    }

    /// Number of output slots.
    pub fn num_outputs(&self) -> usize {
        self.circuit.modules[self.module].num_outputs()
    }

    /// The named input port.
    pub fn input(&self, name: &str) -> Port {
        self.circuit.input(self.module, name)
    }

    /// The named output port.
    pub fn output(&self, name: &str) -> Port {
        self.circuit.output(self.module, name)
    }

    /// Value of input slot `inum`.
    pub fn bit(&self, inum: usize) -> Bit {
        self.circuit.input_value(self.module, inum, self.time())
    }

    /// Value of every input slot, least significant first.
    pub fn read_all(&self) -> BitVector {
        (0..self.num_inputs()).map(|i| self.bit(i)).collect()
    }

    /// Value of the named input.
    pub fn read(&self, name: &str) -> BitVector {
        self.read_port(self.input(name))
    }

    /// Value of the named single-bit input.
    ///
    /// # Panics
    ///
    /// Panics if the input is wider than one bit.
    pub fn read_bit(&self, name: &str) -> Bit {
        let port = self.input(name);
        assert_eq!(port.width(), 1, "input '{name}' is {} bits wide", port.width());
        self.bit(port.low())
    }

    /// Value of one of this module's input ports.
    pub fn read_port(&self, port: Port) -> BitVector {
        assert_eq!(port.module(), self.module, "port belongs to another module");
        assert_eq!(port.direction(), Direction::Input, "reading an output port");
        self.circuit.read_at(port, self.time())
    }

    /// Schedules a value on the named output.
    pub fn write(&mut self, name: &str, value: impl Into<BitVector>) {
        let port = self.output(name);
        self.write_port(port, value);
    }

    /// Schedules a value on one of this module's output ports.
    pub fn write_port(&mut self, port: Port, value: impl Into<BitVector>) {
        let value = value.into();
        assert_eq!(port.module(), self.module, "port belongs to another module");
        assert_eq!(port.direction(), Direction::Output, "writing an input port");
        assert_eq!(
            value.width(),
            port.width(),
            "width mismatch writing {} bits to a {}-bit port",
            value.width(),
            port.width()
        );
        for (k, onum) in port.indices().enumerate() {
            self.write_bit(onum, value.get(k));
        }
    }

    /// Schedules a value on output slot `onum` after its input-to-output delay.
    pub fn write_bit(&mut self, onum: usize, bit: Bit) {
        if let Some(delay) = self.circuit.delay_to_output(self.module, onum) {
            let at = self.time() + delay;
            self.circuit.set_output(self.module, onum, bit, at);
        }
    }

    /// Writes output slot `onum` at an absolute time, bypassing delay
    /// computation. Returns `true` if the value changed.
    pub fn write_at(&mut self, onum: usize, bit: Bit, time: SimTime) -> bool {
        self.circuit.set_output(self.module, onum, bit, time)
    }

    /// Returns `true` if input slot `inum` changed at the current time.
    pub fn edge(&self, inum: usize) -> bool {
        self.circuit.edge(self.module, inum)
    }

    /// Returns `true` if the named single-bit input just rose to `1`.
    pub fn posedge(&self, name: &str) -> bool {
        let port = self.input(name);
        assert_eq!(port.width(), 1, "input '{name}' is {} bits wide", port.width());
        self.circuit.posedge(self.module, port.low())
    }

    /// Returns `true` if the named single-bit input just fell to `0`.
    pub fn negedge(&self, name: &str) -> bool {
        let port = self.input(name);
        assert_eq!(port.width(), 1, "input '{name}' is {} bits wide", port.width());
        self.circuit.negedge(self.module, port.low())
    }
}
