//! Discrete-event simulation kernel for three-valued gate-level circuits.
//!
//! This crate owns the circuit graph and the scheduler. Leaf blocks implement
//! [`Component`]; composite blocks are assembled inside a [`Circuit`] from
//! other modules and get their timing and cost figures derived from their
//! contents.
//!
//! # Architecture
//!
//! Modules and single-bit wires live in slot arenas addressed by
//! [`ModuleId`] and [`WireId`]. Each wire has at most one writer and keeps a
//! sparse time-indexed history of its values. Writing an output that changes
//! a wire during a run enqueues every reader at the change time; the
//! scheduler then re-evaluates modules in `(time, module)` order, coalescing
//! simultaneous input changes into a single evaluation.
//!
//! Composite delays come from a static longest-path analysis over internal
//! wires, cached per class name and invalidated by [`Circuit::sim_reset`].
//!
//! # Usage
//!
//! ```ignore
//! let mut circuit = Circuit::new();
//! let adder = RippleAdder::new(8, FullAdder::new()).build(&mut circuit);
//! circuit.assign_value(circuit.input(adder, "X"), 102);
//! circuit.assign_value(circuit.input(adder, "Y"), 42);
//! circuit.assign_value(circuit.input(adder, "Ci"), 0);
//! circuit.simulate(adder);
//! assert_eq!(circuit.value(circuit.output(adder, "S")), Some(144));
//! ```
//!
//! # Modules
//!
//! - `circuit`: Arenas, construction, port access and assignment
//! - `connect`: Connection rules and wire merging
//! - `schedule`: Event loop, run lifecycle, edge queries
//! - `composite`: Delay tables, load, fanout, area and energy
//! - `analysis`: Critical path and power statistics
//! - `vcd`: Waveform dump of recorded histories

#![warn(missing_docs)]

pub mod analysis;
pub mod arena;
pub mod circuit;
pub mod component;
pub mod composite;
pub mod connect;
pub mod context;
pub mod error;
pub mod ids;
pub mod io;
pub mod module;
pub mod port;
pub mod queue;
pub mod schedule;
pub mod vcd;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{CriticalPath, PowerStats};
pub use circuit::Circuit;
pub use component::{Area, Component, Energy};
pub use composite::{DelayTable, DelayTableCache, Link};
pub use context::{SimContext, SimState};
pub use error::SimError;
pub use ids::{ModuleId, WireId};
pub use io::PortIo;
pub use module::{Module, ModuleKind};
pub use port::{Direction, PinName, Port, PortLayout, PortRange};
pub use queue::{EventQueue, QueueItem};
pub use schedule::RUN_TO_COMPLETION;
pub use vcd::VcdWriter;
pub use wire::{Pin, Wire};
