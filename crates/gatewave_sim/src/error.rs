//! Circuit construction and waveform error types.
//!
//! Every structural problem a circuit can have is a variant of [`SimError`].
//! The checked `try_*` construction methods return these; their panicking
//! counterparts abort with the error's message, since a malformed circuit
//! must never begin simulating.

use std::io;

use crate::port::Direction;

/// Errors raised while building, wiring, or dumping a circuit.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Two connected ports, or a port and a value, differ in width.
    #[error("width mismatch: {left} bits vs {right} bits")]
    WidthMismatch {
        /// Width of the source side.
        left: usize,
        /// Width of the destination side.
        right: usize,
    },

    /// A port name is not declared on the module.
    #[error("{module} has no {direction} named '{name}'")]
    UnknownPort {
        /// Label of the module that was queried.
        module: String,
        /// Direction that was looked up.
        direction: Direction,
        /// The undeclared name.
        name: String,
    },

    /// A bit index lies outside the module's declared range.
    #[error("{direction} index {index} out of range for {module} ({count} {direction}s)")]
    IndexOutOfRange {
        /// Label of the module that was indexed.
        module: String,
        /// Direction of the indexed bit.
        direction: Direction,
        /// The offending index.
        index: usize,
        /// Number of declared bits in that direction.
        count: usize,
    },

    /// The port directions cannot be connected in the requested order.
    #[error("invalid connection: {reason}")]
    InvalidConnection {
        /// Why the connection is not allowed.
        reason: String,
    },

    /// The operation needs a composite module but was given a leaf.
    #[error("{0} is not a composite module")]
    NotComposite(String),

    /// A module was registered under a second parent.
    #[error("{module} is already a submodule of {parent}")]
    AlreadyHasParent {
        /// Label of the child module.
        module: String,
        /// Label of its existing parent.
        parent: String,
    },

    /// A composite output was bound to a second internal driver.
    #[error("composite output {port} is already connected")]
    OutputAlreadyConnected {
        /// Label of the composite output bit.
        port: String,
    },

    /// A composite output was used before anything inside drives it.
    #[error("composite output {port} is not driven by any submodule")]
    UndrivenOutput {
        /// Label of the undriven output bit.
        port: String,
    },

    /// Joining two nets would give the surviving wire a second writer.
    #[error("the wire at {port} already has a writer")]
    WireHasWriter {
        /// Label of the input bit whose wire is already driven.
        port: String,
    },

    /// A value was written to a wire that is held constant.
    #[error("cannot write to held wire at {port}")]
    HeldWire {
        /// Label of the held bit.
        port: String,
    },

    /// The internal wire graph of a composite contains a cycle.
    #[error("combinational loop inside {0}")]
    CombinationalLoop(String),

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}
