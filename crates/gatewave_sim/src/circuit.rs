//! The circuit: module and wire arenas, construction, and port access.
//!
//! A [`Circuit`] owns every module instance and every wire, plus the state of
//! the current simulation run and the per-circuit delay-table cache. Modules
//! and wires are addressed by [`ModuleId`] and [`WireId`] handles; ports are
//! [`Port`] views over module slots.
//!
//! Connection and merge rules live in `connect.rs`, the scheduler in
//! `schedule.rs`, and composite timing/cost analysis in `composite.rs`.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use gatewave_common::{Bit, BitVector, SignalHistory, SimTime};
use gatewave_config::SimConfig;
use log::{debug, trace};

use crate::arena::Arena;
use crate::component::Component;
use crate::composite::DelayTableCache;
use crate::context::SimContext;
use crate::error::SimError;
use crate::ids::{ModuleId, WireId};
use crate::module::{Module, ModuleKind};
use crate::port::{Direction, PinName, Port, PortLayout};
use crate::wire::{Pin, Wire};

/// A network of modules connected by single-bit wires.
#[derive(Debug, Default)]
pub struct Circuit {
    pub(crate) modules: Arena<ModuleId, Module>,
    pub(crate) wires: Arena<WireId, Wire>,
    pub(crate) sim: SimContext,
    pub(crate) delay_tables: RefCell<DelayTableCache>,
    pub(crate) config: SimConfig,
}

impl Circuit {
    /// Creates an empty circuit with the default simulation options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty circuit with the given simulation options.
    pub fn with_config(config: SimConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The simulation options.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Instantiates a leaf module.
    pub fn add_leaf<C: Component + 'static>(&mut self, component: C) -> ModuleId {
        let class_name = component.class_name();
        let layout = component.layout();
        let kind = ModuleKind::Leaf(Rc::new(component));
        let id = self.modules.alloc(Module::new(class_name, layout, kind));
        trace!("added leaf {} as {id}", self.modules[id]);
        id
    }

    /// Instantiates an empty composite module with the given structural name and ports.
    ///
    /// Composites with equal class names share one delay table, so the name
    /// must capture everything that changes the internal structure.
    pub fn add_composite(&mut self, class_name: impl Into<String>, layout: PortLayout) -> ModuleId {
        let kind = ModuleKind::Composite(BTreeSet::new());
        let id = self
            .modules
            .alloc(Module::new(class_name.into(), layout, kind));
        trace!("added composite {} as {id}", self.modules[id]);
        id
    }

    /// Registers `child` as a submodule of the composite `parent`.
    ///
    /// A module has at most one parent; registering it again under the same
    /// parent is a no-op.
    pub fn try_add_submodule(&mut self, parent: ModuleId, child: ModuleId) -> Result<(), SimError> {
        assert_ne!(parent, child, "a module cannot contain itself");
        if !self.modules[parent].is_composite() {
            return Err(SimError::NotComposite(self.label(parent)));
        }
        match self.modules[child].parent {
            Some(p) if p == parent => return Ok(()),
            Some(p) => {
                return Err(SimError::AlreadyHasParent {
                    module: self.label(child),
                    parent: self.label(p),
                })
            }
            None => {}
        }
        if let ModuleKind::Composite(subs) = &mut self.modules[parent].kind {
            subs.insert(child);
        }
        self.modules[child].parent = Some(parent);
        Ok(())
    }

    /// Registers `child` as a submodule of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is a leaf or `child` already has another parent.
    pub fn add_submodule(&mut self, parent: ModuleId, child: ModuleId) {
        if let Err(e) = self.try_add_submodule(parent, child) {
            panic!("{e}");
        }
    }

    /// Registers every module in `children` as a submodule of `parent`.
    pub fn add_submodules<I: IntoIterator<Item = ModuleId>>(&mut self, parent: ModuleId, children: I) {
        for child in children {
            self.add_submodule(parent, child);
        }
    }

    /// Attaches an instance tag, shown in labels as `class#tag`.
    pub fn set_tag(&mut self, id: ModuleId, tag: u32) {
        self.modules[id].tag = Some(tag);
    }

    /// Destroys a module, releasing its wire references.
    ///
    /// Wires whose last reference goes away are freed. The module leaves its
    /// parent's submodule set; its own submodules become parentless. Events
    /// still queued for it in a paused run are discarded.
    pub fn remove_module(&mut self, id: ModuleId) {
        let Some(module) = self.modules.remove(id) else {
            return;
        };
        debug!("removing {module} ({id})");
        let dropped = self.sim.queue.remove_module(id);
        if dropped > 0 {
            debug!("{dropped} pending event(s) for {id} dropped");
        }
        if let Some(parent) = module.parent.filter(|p| self.modules.contains(*p)) {
            if let ModuleKind::Composite(subs) = &mut self.modules[parent].kind {
                subs.remove(&id);
            }
        }
        for sub in module.submodules() {
            if self.modules.contains(sub) {
                self.modules[sub].parent = None;
            }
        }
        for w in module.bound_wires() {
            if !self.wires.contains(w) {
                continue;
            }
            let wire = &mut self.wires[w];
            wire.detach(id);
            if wire.release() == 0 {
                self.wires.remove(w);
            }
        }
        self.delay_tables.get_mut().clear();
    }

    /// The module with the given ID.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Iterates over all live modules in creation order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter()
    }

    /// The wire with the given ID.
    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id]
    }

    /// Iterates over all live wires in creation order.
    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires.iter()
    }

    /// Number of live modules.
    pub fn num_modules(&self) -> usize {
        self.modules.len()
    }

    /// Number of live wires.
    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }

    /// Display label of a module: its class name plus `#tag` if tagged.
    pub fn label(&self, id: ModuleId) -> String {
        self.modules[id].to_string()
    }

    /// Direct submodules of a composite, in creation order.
    pub fn submodules(&self, id: ModuleId) -> Vec<ModuleId> {
        self.modules[id].submodules().collect()
    }

    fn try_named(&self, id: ModuleId, direction: Direction, name: &str) -> Result<Port, SimError> {
        let module = &self.modules[id];
        match module.layout.lookup(name) {
            Some(r) if r.direction == direction => Ok(Port::new(id, direction, r.high, r.low)),
            _ => Err(SimError::UnknownPort {
                module: module.to_string(),
                direction,
                name: name.to_string(),
            }),
        }
    }

    /// The named input port.
    pub fn try_input(&self, id: ModuleId, name: &str) -> Result<Port, SimError> {
        self.try_named(id, Direction::Input, name)
    }

    /// The named output port.
    pub fn try_output(&self, id: ModuleId, name: &str) -> Result<Port, SimError> {
        self.try_named(id, Direction::Output, name)
    }

    /// The named input port.
    ///
    /// # Panics
    ///
    /// Panics if the module declares no input with that name.
    pub fn input(&self, id: ModuleId, name: &str) -> Port {
        self.try_input(id, name).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The named output port.
    ///
    /// # Panics
    ///
    /// Panics if the module declares no output with that name.
    pub fn output(&self, id: ModuleId, name: &str) -> Port {
        self.try_output(id, name).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Input slot `inum` as a single-bit port.
    pub fn input_bit(&self, id: ModuleId, inum: usize) -> Port {
        self.expect_index(id, Direction::Input, inum);
        Port::new(id, Direction::Input, inum, inum)
    }

    /// Output slot `onum` as a single-bit port.
    pub fn output_bit(&self, id: ModuleId, onum: usize) -> Port {
        self.expect_index(id, Direction::Output, onum);
        Port::new(id, Direction::Output, onum, onum)
    }

    /// Bits `[high:low]` of the named input.
    pub fn input_range(&self, id: ModuleId, name: &str, high: usize, low: usize) -> Port {
        self.input(id, name).slice(high, low)
    }

    /// Bits `[high:low]` of the named output.
    pub fn output_range(&self, id: ModuleId, name: &str, high: usize, low: usize) -> Port {
        self.output(id, name).slice(high, low)
    }

    /// Every input slot of the module as one port.
    ///
    /// # Panics
    ///
    /// Panics if the module has no inputs.
    pub fn inputs(&self, id: ModuleId) -> Port {
        let n = self.modules[id].num_inputs();
        assert!(n > 0, "{} has no inputs", self.modules[id]);
        Port::new(id, Direction::Input, n - 1, 0)
    }

    /// Every output slot of the module as one port.
    ///
    /// # Panics
    ///
    /// Panics if the module has no outputs.
    pub fn outputs(&self, id: ModuleId) -> Port {
        let n = self.modules[id].num_outputs();
        assert!(n > 0, "{} has no outputs", self.modules[id]);
        Port::new(id, Direction::Output, n - 1, 0)
    }

    /// Returns `true` if the module declares an input called `name`.
    pub fn has_input(&self, id: ModuleId, name: &str) -> bool {
        self.modules[id].layout.has_input(name)
    }

    /// Returns `true` if the module declares an output called `name`.
    pub fn has_output(&self, id: ModuleId, name: &str) -> bool {
        self.modules[id].layout.has_output(name)
    }

    /// Name of input slot `inum`, e.g. `X[3]`.
    pub fn name_of_input(&self, id: ModuleId, inum: usize) -> PinName {
        self.modules[id].layout.name_of(Direction::Input, inum)
    }

    /// Name of output slot `onum`, e.g. `Co`.
    pub fn name_of_output(&self, id: ModuleId, onum: usize) -> PinName {
        self.modules[id].layout.name_of(Direction::Output, onum)
    }

    /// Label of one slot, e.g. `FullAdder#2.Ci`.
    pub(crate) fn pin_label(&self, id: ModuleId, direction: Direction, index: usize) -> String {
        let module = &self.modules[id];
        format!("{module}.{}", module.layout.name_of(direction, index))
    }

    pub(crate) fn check_index(
        &self,
        id: ModuleId,
        direction: Direction,
        index: usize,
    ) -> Result<(), SimError> {
        let count = self.modules[id].layout.count(direction);
        if index < count {
            Ok(())
        } else {
            Err(SimError::IndexOutOfRange {
                module: self.label(id),
                direction,
                index,
                count,
            })
        }
    }

    pub(crate) fn check_port(&self, port: Port) -> Result<(), SimError> {
        self.check_index(port.module(), port.direction(), port.high())
    }

    fn expect_index(&self, id: ModuleId, direction: Direction, index: usize) {
        if let Err(e) = self.check_index(id, direction, index) {
            panic!("{e}");
        }
    }

    pub(crate) fn slot(&self, id: ModuleId, direction: Direction, index: usize) -> Option<WireId> {
        self.modules[id].slots(direction)[index]
    }

    fn slot_value(&self, id: ModuleId, direction: Direction, index: usize, time: SimTime) -> Bit {
        self.slot(id, direction, index)
            .map_or(Bit::Undef, |w| self.wires[w].get(time))
    }

    /// Value of input slot `inum` at `time`; `Undef` if the slot is unbound.
    pub fn input_value(&self, id: ModuleId, inum: usize, time: SimTime) -> Bit {
        self.expect_index(id, Direction::Input, inum);
        self.slot_value(id, Direction::Input, inum, time)
    }

    /// Value of output slot `onum` at `time`; `Undef` if the slot is unbound.
    pub fn output_value(&self, id: ModuleId, onum: usize, time: SimTime) -> Bit {
        self.expect_index(id, Direction::Output, onum);
        self.slot_value(id, Direction::Output, onum, time)
    }

    /// The port's value at `time`.
    pub fn read_at(&self, port: Port, time: SimTime) -> BitVector {
        self.expect_index(port.module(), port.direction(), port.high());
        port.indices()
            .map(|i| self.slot_value(port.module(), port.direction(), i, time))
            .collect()
    }

    /// The port's final recorded value.
    pub fn read(&self, port: Port) -> BitVector {
        self.read_at(port, SimTime::MAX)
    }

    /// The port's value at `time` as an integer, if fully defined.
    pub fn value_at(&self, port: Port, time: SimTime) -> Option<u64> {
        self.read_at(port, time).to_u64()
    }

    /// The port's final value as an integer, if fully defined.
    pub fn value(&self, port: Port) -> Option<u64> {
        self.read(port).to_u64()
    }

    /// Returns `true` if no bit of the port's final value is `Undef`.
    pub fn is_defined(&self, port: Port) -> bool {
        self.read(port).is_defined()
    }

    /// The wires bound to each bit of the port, least significant first.
    pub fn port_wires(&self, port: Port) -> Vec<Option<WireId>> {
        self.expect_index(port.module(), port.direction(), port.high());
        port.indices()
            .map(|i| self.slot(port.module(), port.direction(), i))
            .collect()
    }

    /// History of a single-bit port, or `None` if the slot is unbound.
    ///
    /// # Panics
    ///
    /// Panics if the port is wider than one bit.
    pub fn history(&self, port: Port) -> Option<&SignalHistory> {
        assert_eq!(port.width(), 1, "history needs a single-bit port");
        self.expect_index(port.module(), port.direction(), port.low());
        self.slot(port.module(), port.direction(), port.low())
            .map(|w| self.wires[w].history())
    }

    /// Latest change time over the bits of the port.
    pub fn last_time(&self, port: Port) -> Option<SimTime> {
        self.port_wires(port)
            .into_iter()
            .flatten()
            .filter_map(|w| self.wires[w].history().last_time())
            .max()
    }

    /// Latest change time over all inputs of the module.
    pub fn last_input_time(&self, id: ModuleId) -> Option<SimTime> {
        self.last_slot_time(id, Direction::Input)
    }

    /// Latest change time over all outputs of the module.
    pub fn last_output_time(&self, id: ModuleId) -> Option<SimTime> {
        self.last_slot_time(id, Direction::Output)
    }

    fn last_slot_time(&self, id: ModuleId, direction: Direction) -> Option<SimTime> {
        self.modules[id]
            .slots(direction)
            .iter()
            .flatten()
            .filter_map(|w| self.wires[*w].history().last_time())
            .max()
    }

    /// Drives a port with a value.
    ///
    /// Inputs take the value at the current simulation time. Outputs are
    /// scheduled `delay_to_output` later, and bits no changed input affects
    /// are not written.
    pub fn try_assign(&mut self, port: Port, value: impl Into<BitVector>) -> Result<(), SimError> {
        let value = value.into();
        if value.width() != port.width() {
            return Err(SimError::WidthMismatch {
                left: value.width(),
                right: port.width(),
            });
        }
        self.check_port(port)?;
        let (id, direction) = (port.module(), port.direction());
        for index in port.indices() {
            if let Some(w) = self.slot(id, direction, index) {
                if self.wires[w].is_constant() {
                    return Err(SimError::HeldWire {
                        port: self.pin_label(id, direction, index),
                    });
                }
            }
        }
        let now = self.sim.time;
        for (k, index) in port.indices().enumerate() {
            let bit = value.get(k);
            match direction {
                Direction::Input => self.set_input(id, index, bit, now),
                Direction::Output => {
                    if let Some(d) = self.delay_to_output(id, index) {
                        self.set_output(id, index, bit, now + d);
                    }
                }
            }
        }
        Ok(())
    }

    /// Drives a port with a value.
    ///
    /// # Panics
    ///
    /// Panics on a width mismatch, an out-of-range port, or a held wire.
    pub fn assign(&mut self, port: Port, value: impl Into<BitVector>) {
        if let Err(e) = self.try_assign(port, value) {
            panic!("{e}");
        }
    }

    /// Drives a port with the low bits of an integer.
    pub fn assign_value(&mut self, port: Port, value: u64) {
        self.assign(port, BitVector::from_u64(value, port.width()));
    }

    /// Drives `dst` with the current value of `src`.
    pub fn assign_from(&mut self, dst: Port, src: Port) {
        let value = self.read_at(src, self.sim.time);
        self.assign(dst, value);
    }

    /// Freezes every bit of the port at its current value.
    ///
    /// Unbound slots get a fresh wire first.
    pub fn hold(&mut self, port: Port) {
        self.expect_index(port.module(), port.direction(), port.high());
        for index in port.indices() {
            let w = self.ensure_wire(port.module(), port.direction(), index);
            self.wires[w].hold();
        }
    }

    /// Clears the histories of every wire the module (and, for composites,
    /// every nested submodule) is bound to. Held wires keep their value and
    /// the topology is untouched.
    pub fn reset(&mut self, id: ModuleId) {
        let mut stack = vec![id];
        let mut wires = BTreeSet::new();
        while let Some(m) = stack.pop() {
            let module = &self.modules[m];
            wires.extend(module.bound_wires());
            stack.extend(module.submodules());
        }
        for w in wires {
            self.wires[w].clear();
        }
    }

    pub(crate) fn new_wire(&mut self) -> WireId {
        self.wires.alloc(Wire::new())
    }

    /// Binds an empty slot to `wire`. Leaves take the reader or writer role.
    pub(crate) fn bind(&mut self, id: ModuleId, direction: Direction, index: usize, wire: WireId) {
        let module = &mut self.modules[id];
        debug_assert!(module.slots(direction)[index].is_none());
        module.slots_mut(direction)[index] = Some(wire);
        let leaf = !module.is_composite();
        let w = &mut self.wires[wire];
        w.retain(1);
        if leaf {
            let pin = Pin::new(id, index);
            match direction {
                Direction::Input => w.add_reader(pin),
                Direction::Output => w.set_writer(pin),
            }
        }
    }

    pub(crate) fn ensure_wire(&mut self, id: ModuleId, direction: Direction, index: usize) -> WireId {
        if let Some(w) = self.slot(id, direction, index) {
            return w;
        }
        let w = self.new_wire();
        self.bind(id, direction, index, w);
        w
    }

    /// Records an input value. Input writes never schedule events.
    pub(crate) fn set_input(&mut self, id: ModuleId, inum: usize, bit: Bit, time: SimTime) {
        let w = self.ensure_wire(id, Direction::Input, inum);
        self.wires[w].set(bit, time);
    }

    /// Records an output value; during a run, a change schedules every reader.
    pub(crate) fn set_output(&mut self, id: ModuleId, onum: usize, bit: Bit, time: SimTime) -> bool {
        let w = self.ensure_wire(id, Direction::Output, onum);
        let changed = self.wires[w].set(bit, time);
        if changed {
            trace!(
                "{} <= {bit} at {time}",
                self.pin_label(id, Direction::Output, onum)
            );
            if self.sim.is_active() {
                let Circuit { wires, sim, .. } = self;
                for reader in wires[w].readers() {
                    sim.queue.push(reader.module, time, reader.index);
                }
            }
        }
        changed
    }
}
