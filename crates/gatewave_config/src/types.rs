//! Configuration types deserialized from `gatewave.toml`.

use gatewave_common::{Delay, LogicOp};
use serde::Deserialize;

/// The top-level configuration parsed from `gatewave.toml`.
///
/// Every section is optional; an empty file yields the reference parameter set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaveConfig {
    /// Scheduler and timing options.
    #[serde(default)]
    pub simulation: SimConfig,
    /// Per-cell delay, load, area and energy tables.
    #[serde(default)]
    pub cells: CellParams,
}

/// Options that change how the kernel schedules writes and computes delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimConfig {
    /// Add the driven wire's fanout load to every output delay.
    #[serde(default = "default_fanout_delay")]
    pub fanout_delay: bool,
    /// Tick horizon for whole-circuit runs; `None` runs to quiescence.
    #[serde(default)]
    pub time_limit: Option<u64>,
}

fn default_fanout_delay() -> bool {
    true
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fanout_delay: default_fanout_delay(),
            time_limit: None,
        }
    }
}

/// Parameters of an N-input logic gate.
///
/// Delay and area scale with the number of inputs; `energy` is the
/// per-input switching energy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GateParams {
    /// Fixed part of the propagation delay.
    pub delay_base: Delay,
    /// Additional delay per gate input.
    pub delay_per_input: Delay,
    /// Load each input presents to its driver.
    pub load: Delay,
    /// Area per gate input.
    pub area_per_input: f64,
    /// Switching energy per gate input.
    pub energy: f64,
}

impl GateParams {
    /// AND/NAND/OR/NOR reference values.
    pub const SIMPLE: GateParams = GateParams {
        delay_base: 11,
        delay_per_input: 4,
        load: 3,
        area_per_input: 1.0,
        energy: 1.0,
    };

    /// XOR/XNOR reference values.
    pub const PARITY: GateParams = GateParams {
        delay_base: 30,
        delay_per_input: 16,
        load: 6,
        area_per_input: 2.0,
        energy: 2.0,
    };

    /// Propagation delay of an `inputs`-input gate.
    pub fn delay(&self, inputs: usize) -> Delay {
        self.delay_base + self.delay_per_input * inputs as Delay
    }

    /// Area of an `inputs`-input gate.
    pub fn area(&self, inputs: usize) -> f64 {
        self.area_per_input * inputs as f64
    }

    /// Switching energy of an `inputs`-input gate.
    pub fn energy(&self, inputs: usize) -> f64 {
        self.energy * inputs as f64
    }
}

/// Parameters of the single-stage inverter.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct InverterParams {
    /// Propagation delay.
    pub delay: Delay,
    /// Input load.
    pub load: Delay,
    /// Area per bit.
    pub area: f64,
    /// Switching energy.
    pub energy: f64,
}

impl Default for InverterParams {
    fn default() -> Self {
        Self {
            delay: 1,
            load: 1,
            area: 1.0,
            energy: 1.0,
        }
    }
}

/// Parameters of a clocked storage cell (latch or register).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StorageParams {
    /// Clock-to-output delay.
    pub clk_to_q: Delay,
    /// Load of each data input; the clock input presents `2 * load` per bit.
    pub load: Delay,
    /// Area per port bit.
    pub area: f64,
    /// Switching energy per output bit.
    pub energy: f64,
}

impl StorageParams {
    /// A latch modeled as two NAND stages on the clock path and four NANDs of area.
    pub fn latch(nand: &GateParams) -> Self {
        Self {
            clk_to_q: 2 * nand.delay(2),
            load: nand.load,
            area: 4.0 * nand.area(2),
            energy: 4.0 * 2.0 * nand.energy,
        }
    }

    /// A register modeled as three NAND stages on the clock path and six NANDs of area.
    pub fn register(nand: &GateParams) -> Self {
        Self {
            clk_to_q: 3 * nand.delay(2),
            load: nand.load,
            area: 6.0 * nand.area(2),
            energy: 6.0 * 2.0 * nand.energy,
        }
    }
}

/// All cell parameter tables.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CellParams {
    /// Inverter; the buffer is two inverters.
    #[serde(default)]
    pub inverter: InverterParams,
    /// AND gate.
    #[serde(default = "simple_gate")]
    pub and: GateParams,
    /// NAND gate.
    #[serde(default = "simple_gate")]
    pub nand: GateParams,
    /// OR gate.
    #[serde(default = "simple_gate")]
    pub or: GateParams,
    /// NOR gate.
    #[serde(default = "simple_gate")]
    pub nor: GateParams,
    /// XOR gate.
    #[serde(default = "parity_gate")]
    pub xor: GateParams,
    /// XNOR gate.
    #[serde(default = "parity_gate")]
    pub xnor: GateParams,
    /// Level-sensitive latch.
    #[serde(default = "default_latch")]
    pub latch: StorageParams,
    /// Edge-triggered register.
    #[serde(default = "default_register")]
    pub register: StorageParams,
}

fn simple_gate() -> GateParams {
    GateParams::SIMPLE
}

fn parity_gate() -> GateParams {
    GateParams::PARITY
}

fn default_latch() -> StorageParams {
    StorageParams::latch(&GateParams::SIMPLE)
}

fn default_register() -> StorageParams {
    StorageParams::register(&GateParams::SIMPLE)
}

impl Default for CellParams {
    fn default() -> Self {
        Self {
            inverter: InverterParams::default(),
            and: simple_gate(),
            nand: simple_gate(),
            or: simple_gate(),
            nor: simple_gate(),
            xor: parity_gate(),
            xnor: parity_gate(),
            latch: default_latch(),
            register: default_register(),
        }
    }
}

impl CellParams {
    /// Returns the parameter table of the gate implementing `op`.
    pub fn gate(&self, op: LogicOp) -> &GateParams {
        match op {
            LogicOp::And => &self.and,
            LogicOp::Nand => &self.nand,
            LogicOp::Or => &self.or,
            LogicOp::Nor => &self.nor,
            LogicOp::Xor => &self.xor,
            LogicOp::Xnor => &self.xnor,
        }
    }

    /// Iterates over the gate tables with their operators.
    pub fn gates(&self) -> impl Iterator<Item = (LogicOp, &GateParams)> {
        LogicOp::ALL.into_iter().map(move |op| (op, self.gate(op)))
    }
}
