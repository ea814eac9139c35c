//! Shared foundational types used across the gatewave logic simulator.
//!
//! This crate provides the three-valued [`Bit`], fixed-width [`BitVector`]s,
//! the sparse per-wire [`SignalHistory`], and simulation time values.

#![warn(missing_docs)]

pub mod bit;
pub mod bit_vector;
pub mod history;
pub mod time;

pub use bit::{Bit, LogicOp};
pub use bit_vector::BitVector;
pub use history::SignalHistory;
pub use time::{Delay, SimTime};
