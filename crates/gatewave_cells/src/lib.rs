//! Circuit-block library for the gatewave simulator.
//!
//! Every block here is built only from the kernel's public contract: leaves
//! implement [`gatewave_sim::Component`], and composites are assembled with
//! [`Circuit::add_composite`](gatewave_sim::Circuit::add_composite) and
//! [`Circuit::connect`](gatewave_sim::Circuit::connect).
//!
//! # Usage
//!
//! ```ignore
//! use gatewave_cells::{Adder, FullAdder, RippleAdder};
//! use gatewave_common::Bit;
//! use gatewave_sim::Circuit;
//!
//! let mut circuit = Circuit::new();
//! let adder = RippleAdder::new(8, FullAdder::new()).build(&mut circuit);
//! circuit.assign_value(circuit.input(adder, "X"), 102);
//! circuit.assign_value(circuit.input(adder, "Y"), 42);
//! circuit.assign(circuit.input(adder, "Ci"), Bit::Low);
//! circuit.simulate(adder);
//! assert_eq!(circuit.value(circuit.output(adder, "S")), Some(144));
//! ```
//!
//! # Modules
//!
//! - [`gates`]: N-input AND/NAND/OR/NOR/XOR/XNOR
//! - [`inverter`]: bitwise inverter and buffer
//! - [`adder_cells`]: one-bit half and full adder leaves
//! - [`mux`]: two-way multiplexer
//! - [`storage`]: register and latch
//! - [`clock`]: clock source
//! - [`adders`]: composite full adder and ripple-carry adder

#![warn(missing_docs)]

pub mod adder_cells;
pub mod adders;
pub mod clock;
pub mod gates;
pub mod inverter;
pub mod mux;
pub mod storage;

pub use adder_cells::{FullAdderCell, HalfAdder};
pub use adders::{adder_layout, Adder, FullAdder, RippleAdder};
pub use clock::Clock;
pub use gates::Gate;
pub use inverter::{Buf, Inv};
pub use mux::Mux;
pub use storage::{Latch, Register};
