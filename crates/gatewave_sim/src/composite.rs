//! Timing and cost figures of modules, derived for composites.
//!
//! A composite's input-to-output delays come from a static longest-path
//! analysis over its internal wires. The result depends only on the
//! composite's structure, so tables are cached per class name in a
//! [`DelayTableCache`] owned by the circuit and invalidated on
//! [`Circuit::sim_reset`].

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use gatewave_common::Delay;
use log::debug;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::component::{Area, Energy};
use crate::error::SimError;
use crate::ids::{ModuleId, WireId};
use crate::module::ModuleKind;
use crate::wire::Pin;

/// Input-to-output delays of one composite class.
///
/// Missing entries mean the input does not affect the output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayTable {
    arcs: BTreeMap<usize, BTreeMap<usize, Delay>>,
}

impl DelayTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The delay from input `inum` to output `onum`, if related.
    pub fn get(&self, inum: usize, onum: usize) -> Option<Delay> {
        self.arcs.get(&inum)?.get(&onum).copied()
    }

    /// Sets the delay from input `inum` to output `onum`.
    pub fn insert(&mut self, inum: usize, onum: usize, delay: Delay) {
        self.arcs.entry(inum).or_default().insert(onum, delay);
    }

    /// Iterates over `(inum, onum, delay)` in input, then output order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Delay)> + '_ {
        self.arcs
            .iter()
            .flat_map(|(&i, outs)| outs.iter().map(move |(&o, &d)| (i, o, d)))
    }

    /// Number of related input/output pairs.
    pub fn len(&self) -> usize {
        self.arcs.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if no input affects any output.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Delay tables keyed by composite class name.
#[derive(Clone, Debug, Default)]
pub struct DelayTableCache {
    tables: HashMap<String, DelayTable>,
}

impl DelayTableCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached table for a class.
    pub fn get(&self, class_name: &str) -> Option<&DelayTable> {
        self.tables.get(class_name)
    }

    /// Stores the table for a class.
    pub fn insert(&mut self, class_name: impl Into<String>, table: DelayTable) {
        self.tables.insert(class_name.into(), table);
    }

    /// Returns `true` if a table for the class is cached.
    pub fn contains(&self, class_name: &str) -> bool {
        self.tables.contains_key(class_name)
    }

    /// Drops every table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    /// Number of cached classes.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// One binding discovered between a composite's ports and its submodules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Link {
    /// A composite input feeds a submodule input.
    Input {
        /// Composite input slot.
        system_input: usize,
        /// The reading submodule slot.
        to: Pin,
    },
    /// A submodule output feeds another submodule input.
    Internal {
        /// The driving submodule slot.
        from: Pin,
        /// The reading submodule slot.
        to: Pin,
    },
    /// A submodule output drives a composite output.
    Output {
        /// The driving submodule slot.
        from: Pin,
        /// Composite output slot.
        system_output: usize,
    },
}

impl Circuit {
    /// Delay from input `inum` to output `onum`, or `None` if unrelated.
    ///
    /// Composite delays come from the class's cached delay table, generated
    /// on first use.
    ///
    /// # Panics
    ///
    /// Panics if a composite contains a combinational loop.
    pub fn delay(&self, id: ModuleId, inum: usize, onum: usize) -> Option<Delay> {
        match &self.modules[id].kind {
            ModuleKind::Leaf(c) => c.delay(inum, onum),
            ModuleKind::Composite(_) => self.delay_table(id).get(inum, onum),
        }
    }

    /// The delay table of a composite, generated and cached on first use.
    ///
    /// # Panics
    ///
    /// Panics if `id` is a leaf or contains a combinational loop.
    pub fn delay_table(&self, id: ModuleId) -> DelayTable {
        self.try_delay_table(id).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The delay table of a composite, generated and cached on first use.
    pub fn try_delay_table(&self, id: ModuleId) -> Result<DelayTable, SimError> {
        let class_name = self.modules[id].class_name();
        let cached = self.delay_tables.borrow().get(class_name).cloned();
        if let Some(table) = cached {
            return Ok(table);
        }
        let table = self.generate_delay_table(id)?;
        self.delay_tables
            .borrow_mut()
            .insert(class_name, table.clone());
        Ok(table)
    }

    /// The per-circuit delay-table cache.
    pub fn delay_tables(&self) -> std::cell::Ref<'_, DelayTableCache> {
        self.delay_tables.borrow()
    }

    /// Longest-path relaxation from every composite input over internal wires.
    fn generate_delay_table(&self, id: ModuleId) -> Result<DelayTable, SimError> {
        let module = &self.modules[id];
        if !module.is_composite() {
            return Err(SimError::NotComposite(module.to_string()));
        }
        debug!("generating delay table for {}", module.class_name());

        // Arcs from each wire to the submodule output wires it reaches.
        let mut arcs: BTreeMap<WireId, Vec<(WireId, Delay)>> = BTreeMap::new();
        for sub in module.submodules() {
            let sm = &self.modules[sub];
            for (inum, w) in sm.inputs.iter().enumerate() {
                let Some(w) = *w else { continue };
                for (onum, out) in sm.outputs.iter().enumerate() {
                    let Some(out) = *out else { continue };
                    let Some(d) = self.delay(sub, inum, onum) else {
                        continue;
                    };
                    let d = if self.config.fanout_delay {
                        d + self.wire_fanout(out)
                    } else {
                        d
                    };
                    arcs.entry(w).or_default().push((out, d));
                }
            }
        }

        let mut graph: DiGraphMap<WireId, ()> = DiGraphMap::new();
        for (&from, outs) in &arcs {
            for &(to, _) in outs {
                graph.add_edge(from, to, ());
            }
        }
        if is_cyclic_directed(&graph) {
            return Err(SimError::CombinationalLoop(module.to_string()));
        }

        let mut dist: BTreeMap<(usize, WireId), Delay> = BTreeMap::new();
        let mut queue = VecDeque::new();
        for (i, w) in module.inputs.iter().enumerate() {
            if let Some(w) = *w {
                dist.insert((i, w), 0);
                queue.push_back((i, w));
            }
        }
        while let Some((i, w)) = queue.pop_front() {
            let base = dist.get(&(i, w)).copied().unwrap_or(0);
            let Some(outs) = arcs.get(&w) else { continue };
            for &(out, d) in outs {
                let candidate = base + d;
                if dist.get(&(i, out)).is_some_and(|&best| best >= candidate) {
                    continue;
                }
                dist.insert((i, out), candidate);
                queue.push_back((i, out));
            }
        }

        let mut output_slot = BTreeMap::new();
        for (o, w) in module.outputs.iter().enumerate() {
            if let Some(w) = *w {
                output_slot.insert(w, o);
            }
        }
        let mut table = DelayTable::new();
        for ((i, w), d) in dist {
            let Some(&o) = output_slot.get(&w) else {
                continue;
            };
            let d = if self.config.fanout_delay {
                d.saturating_sub(self.wire_fanout(w))
            } else {
                d
            };
            table.insert(i, o, d);
        }
        debug!(
            "delay table for {}: {} arc(s)",
            module.class_name(),
            table.len()
        );
        Ok(table)
    }

    /// Load input `inum` presents to its driver: the leaf's own figure, or
    /// for a composite the sum over the leaves reading the input's wire.
    pub fn load(&self, id: ModuleId, inum: usize) -> Delay {
        match &self.modules[id].kind {
            ModuleKind::Leaf(c) => c.load(inum),
            ModuleKind::Composite(_) => self.modules[id]
                .input_wire(inum)
                .map_or(0, |w| self.wire_fanout(w)),
        }
    }

    /// Total load on output `onum`: the sum of `load` over the output wire's readers.
    pub fn fanout(&self, id: ModuleId, onum: usize) -> Delay {
        self.modules[id]
            .output_wire(onum)
            .map_or(0, |w| self.wire_fanout(w))
    }

    pub(crate) fn wire_fanout(&self, w: WireId) -> Delay {
        self.wires[w]
            .readers()
            .map(|pin| self.load(pin.module, pin.index))
            .sum()
    }

    /// Static area: the leaf's figure, or the sum over a composite's submodules.
    pub fn area(&self, id: ModuleId) -> Area {
        match &self.modules[id].kind {
            ModuleKind::Leaf(c) => c.area(),
            ModuleKind::Composite(subs) => subs.iter().map(|&sub| self.area(sub)).sum(),
        }
    }

    /// Energy of one switching of output `onum`.
    ///
    /// For a composite, the sum over every submodule output on any path from
    /// that output back to the composite inputs.
    pub fn energy(&self, id: ModuleId, onum: usize) -> Energy {
        let module = &self.modules[id];
        if let ModuleKind::Leaf(c) = &module.kind {
            return c.energy(onum);
        }
        let Some(start) = module.output_wire(onum) else {
            return 0.0;
        };
        let mut drivers: BTreeMap<WireId, Pin> = BTreeMap::new();
        for sub in module.submodules() {
            for (o, w) in self.modules[sub].outputs.iter().enumerate() {
                if let Some(w) = *w {
                    drivers.insert(w, Pin::new(sub, o));
                }
            }
        }
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut total = 0.0;
        while let Some(w) = queue.pop_front() {
            let Some(&pin) = drivers.get(&w) else {
                continue;
            };
            total += self.energy(pin.module, pin.index);
            for &input in self.modules[pin.module].inputs.iter().flatten() {
                if seen.insert(input) {
                    queue.push_back(input);
                }
            }
        }
        total
    }

    /// Bindings of a composite's ports and submodules, in sorted order.
    pub fn connections(&self, id: ModuleId) -> Vec<Link> {
        let module = &self.modules[id];
        let subs: BTreeSet<ModuleId> = module.submodules().collect();
        let mut links = BTreeSet::new();
        for (system_input, w) in module.inputs.iter().enumerate() {
            let Some(w) = *w else { continue };
            for to in self.wires[w].readers().filter(|p| subs.contains(&p.module)) {
                links.insert(Link::Input { system_input, to });
            }
        }
        for &sub in &subs {
            for (o, w) in self.modules[sub].outputs.iter().enumerate() {
                let Some(w) = *w else { continue };
                let from = Pin::new(sub, o);
                for to in self.wires[w].readers().filter(|p| subs.contains(&p.module)) {
                    links.insert(Link::Internal { from, to });
                }
                for (system_output, sw) in module.outputs.iter().enumerate() {
                    if *sw == Some(w) {
                        links.insert(Link::Output {
                            from,
                            system_output,
                        });
                    }
                }
            }
        }
        links.into_iter().collect()
    }
}
