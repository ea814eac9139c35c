//! Value Change Dump output of recorded wire histories.
//!
//! The [`VcdWriter`] is a read-only consumer: signals are registered as
//! ports, and [`VcdWriter::write`] walks the histories of their wires to
//! produce an IEEE 1364 VCD file viewable in GTKWave or Surfer.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gatewave_common::{BitVector, SimTime};

use crate::circuit::Circuit;
use crate::error::SimError;
use crate::ids::ModuleId;
use crate::port::Port;

/// Collects ports to dump and writes them in VCD format.
#[derive(Clone, Debug)]
pub struct VcdWriter {
    scope: String,
    signals: Vec<(String, Port)>,
}

impl Default for VcdWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VcdWriter {
    /// Creates a writer whose signals live in the `logic` scope.
    pub fn new() -> Self {
        Self::with_scope("logic")
    }

    /// Creates a writer with a custom scope name.
    pub fn with_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            signals: Vec::new(),
        }
    }

    /// Adds a named input or output of `module`, shown as `label.name`.
    pub fn add_signal(&mut self, circuit: &Circuit, module: ModuleId, name: &str) -> Result<(), SimError> {
        let port = circuit
            .try_input(module, name)
            .or_else(|_| circuit.try_output(module, name))?;
        self.add_port(format!("{}.{name}", circuit.label(module)), port);
        Ok(())
    }

    /// Adds input slot `inum`, shown as `label.IN<inum>`.
    pub fn add_input(&mut self, circuit: &Circuit, module: ModuleId, inum: usize) {
        let port = circuit.input_bit(module, inum);
        self.add_port(format!("{}.IN{inum}", circuit.label(module)), port);
    }

    /// Adds output slot `onum`, shown as `label.OUT<onum>`.
    pub fn add_output(&mut self, circuit: &Circuit, module: ModuleId, onum: usize) {
        let port = circuit.output_bit(module, onum);
        self.add_port(format!("{}.OUT{onum}", circuit.label(module)), port);
    }

    /// Adds an arbitrary port under the given name. Spaces are removed.
    pub fn add_port(&mut self, name: impl Into<String>, port: Port) {
        let name: String = name.into().chars().filter(|c| *c != ' ').collect();
        self.signals.push((name, port));
    }

    /// Number of registered signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Returns `true` if no signals are registered.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Writes the dump: header, declarations, values at time zero, then
    /// every time at which any registered bit changed.
    pub fn write<W: Write>(&self, circuit: &Circuit, mut out: W) -> Result<(), SimError> {
        writeln!(out, "$date")?;
        writeln!(out, "  Simulation date")?;
        writeln!(out, "$end")?;
        writeln!(out, "$version")?;
        writeln!(out, "  gatewave logic simulator")?;
        writeln!(out, "$end")?;
        writeln!(out, "$timescale 1ps $end")?;
        writeln!(out, "$scope module {} $end", self.scope)?;
        let codes: Vec<String> = (0..self.signals.len()).map(make_id_code).collect();
        for ((name, port), code) in self.signals.iter().zip(&codes) {
            writeln!(out, "$var wire {} {code} {name} $end", port.width())?;
        }
        writeln!(out, "$upscope $end")?;
        writeln!(out, "$enddefinitions $end")?;

        writeln!(out, "$dumpvars")?;
        for ((_, port), code) in self.signals.iter().zip(&codes) {
            write_value(&mut out, &circuit.read_at(*port, SimTime::ZERO), code)?;
        }
        writeln!(out, "$end")?;

        let mut changes: BTreeMap<SimTime, BTreeSet<usize>> = BTreeMap::new();
        for (n, (_, port)) in self.signals.iter().enumerate() {
            for w in circuit.port_wires(*port).into_iter().flatten() {
                for (time, _) in circuit.wire(w).history().iter() {
                    changes.entry(time).or_default().insert(n);
                }
            }
        }
        for (time, signals) in changes {
            writeln!(out, "#{}", time.ticks())?;
            for n in signals {
                write_value(&mut out, &circuit.read_at(self.signals[n].1, time), &codes[n])?;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Writes the dump to a file, replacing it if present.
    pub fn write_to_file(&self, circuit: &Circuit, path: impl AsRef<Path>) -> Result<(), SimError> {
        let file = File::create(path)?;
        self.write(circuit, BufWriter::new(file))
    }
}

/// Generates a VCD identifier code from a sequential index.
///
/// Uses printable ASCII characters starting from `!` (0x21).
/// Multi-character codes are generated for indices >= 94.
fn make_id_code(index: usize) -> String {
    let mut result = String::new();
    let mut idx = index;
    loop {
        result.push((b'!' + (idx % 94) as u8) as char);
        idx /= 94;
        if idx == 0 {
            break;
        }
        idx -= 1;
    }
    result
}

fn write_value<W: Write>(out: &mut W, value: &BitVector, code: &str) -> std::io::Result<()> {
    if value.width() == 1 {
        writeln!(out, "{}{code}", value.get(0))
    } else {
        writeln!(out, "b{value} {code}")
    }
}
