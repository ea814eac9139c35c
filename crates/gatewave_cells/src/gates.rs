//! N-input logic gates.

use gatewave_common::{Delay, LogicOp};
use gatewave_config::{CellParams, GateParams};
use gatewave_sim::{Area, Component, Energy, PortIo, PortLayout};

/// An N-input, one-output gate reducing its inputs with a [`LogicOp`].
///
/// Inverting operators reduce with their base operator and invert once, so
/// `NAND<3>` is `!(a & b & c)`.
#[derive(Clone, Debug)]
pub struct Gate {
    op: LogicOp,
    inputs: usize,
    params: GateParams,
}

impl Gate {
    /// Creates a gate with the reference parameters for `op`.
    ///
    /// # Panics
    ///
    /// Panics if `inputs < 2`.
    pub fn new(op: LogicOp, inputs: usize) -> Self {
        Self::with_params(op, inputs, *CellParams::default().gate(op))
    }

    /// Creates a gate with explicit parameters.
    ///
    /// # Panics
    ///
    /// Panics if `inputs < 2`.
    pub fn with_params(op: LogicOp, inputs: usize, params: GateParams) -> Self {
        assert!(inputs > 1, "a gate needs at least two inputs, got {inputs}");
        Self { op, inputs, params }
    }

    /// The reduction operator.
    pub fn op(&self) -> LogicOp {
        self.op
    }

    /// Number of inputs.
    pub fn inputs(&self) -> usize {
        self.inputs
    }
}

impl Component for Gate {
    fn class_name(&self) -> String {
        if self.inputs == 2 {
            self.op.name().to_string()
        } else {
            format!("{}<{}>", self.op.name(), self.inputs)
        }
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new()
            .with_inputs(self.inputs)
            .with_outputs(1)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        let z = self.op.reduce(io.read_all().iter());
        io.write_bit(0, z);
    }

    fn delay(&self, _inum: usize, _onum: usize) -> Option<Delay> {
        Some(self.params.delay(self.inputs))
    }

    fn load(&self, _inum: usize) -> Delay {
        self.params.load
    }

    fn area(&self) -> Area {
        self.params.area(self.inputs)
    }

    fn energy(&self, _onum: usize) -> Energy {
        self.params.energy(self.inputs)
    }
}

#[cfg(test)]
mod tests {
    use gatewave_common::{Bit, BitVector, SimTime};
    use gatewave_sim::Circuit;

    use super::*;

    fn eval(op: LogicOp, bits: &[Bit]) -> Bit {
        let mut c = Circuit::new();
        let g = c.add_leaf(Gate::new(op, bits.len()));
        c.assign(c.inputs(g), bits.iter().copied().collect::<BitVector>());
        c.simulate(g);
        c.output_value(g, 0, SimTime::MAX)
    }

    #[test]
    fn class_names() {
        assert_eq!(Gate::new(LogicOp::And, 2).class_name(), "AND");
        assert_eq!(Gate::new(LogicOp::Xnor, 2).class_name(), "XNOR");
        assert_eq!(Gate::new(LogicOp::Or, 3).class_name(), "OR<3>");
        assert_eq!(Gate::new(LogicOp::Nand, 5).class_name(), "NAND<5>");
    }

    #[test]
    #[should_panic(expected = "at least two inputs")]
    fn single_input_gate_panics() {
        Gate::new(LogicOp::And, 1);
    }

    #[test]
    fn reduces_all_inputs() {
        use Bit::{High, Low, Undef};
        assert_eq!(eval(LogicOp::And, &[High, High, High]), High);
        assert_eq!(eval(LogicOp::And, &[High, Low, Undef]), Low);
        assert_eq!(eval(LogicOp::Or, &[Low, Undef, High]), High);
        assert_eq!(eval(LogicOp::Or, &[Low, Undef]), Undef);
        assert_eq!(eval(LogicOp::Nand, &[High, High, High]), Low);
        assert_eq!(eval(LogicOp::Nor, &[Low, Low, Low, Low]), High);
        assert_eq!(eval(LogicOp::Xor, &[High, High, High]), High);
        assert_eq!(eval(LogicOp::Xnor, &[High, Low, High]), High);
        assert_eq!(eval(LogicOp::Xor, &[High, Undef]), Undef);
    }

    #[test]
    fn reference_figures() {
        let and3 = Gate::new(LogicOp::And, 3);
        assert_eq!(and3.delay(0, 0), Some(23));
        assert_eq!(and3.load(2), 3);
        assert_eq!(and3.area(), 3.0);
        assert_eq!(and3.energy(0), 3.0);

        let xor2 = Gate::new(LogicOp::Xor, 2);
        assert_eq!(xor2.delay(1, 0), Some(62));
        assert_eq!(xor2.load(0), 6);
        assert_eq!(xor2.area(), 4.0);
        assert_eq!(xor2.energy(0), 4.0);
    }

    #[test]
    fn output_appears_after_gate_delay() {
        let mut c = Circuit::new();
        let g = c.add_leaf(Gate::new(LogicOp::Nor, 2));
        c.assign(c.inputs(g), BitVector::from_u64(0, 2));
        c.simulate(g);
        assert_eq!(c.output_value(g, 0, SimTime::from_ticks(18)), Bit::Undef);
        assert_eq!(c.output_value(g, 0, SimTime::from_ticks(19)), Bit::High);
    }

    #[test]
    fn custom_parameters() {
        let params = GateParams {
            delay_base: 1,
            delay_per_input: 1,
            load: 2,
            area_per_input: 0.5,
            energy: 0.25,
        };
        let g = Gate::with_params(LogicOp::And, 4, params);
        assert_eq!(g.delay(0, 0), Some(5));
        assert_eq!(g.area(), 2.0);
        assert_eq!(g.energy(0), 1.0);
    }
}
