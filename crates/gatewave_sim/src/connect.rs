//! Wiring rules: binding module slots to shared wires.
//!
//! Every slot starts unbound. Connecting two slots either creates a wire,
//! binds the unbound side to the existing wire, or merges two wires into
//! one. A wire never gets a second driver: any connection that would give it
//! one is rejected with [`SimError::WireHasWriter`].

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::circuit::Circuit;
use crate::error::SimError;
use crate::ids::{ModuleId, WireId};
use crate::port::{Direction, Port};

/// One module slot.
#[derive(Clone, Copy, Debug)]
struct Slot {
    module: ModuleId,
    direction: Direction,
    index: usize,
}

impl Slot {
    fn new(module: ModuleId, direction: Direction, index: usize) -> Self {
        Self {
            module,
            direction,
            index,
        }
    }
}

#[derive(Debug)]
enum Step {
    /// Both slots share a new wire.
    Fresh(Slot, Slot),
    /// An unbound slot joins an existing wire.
    Bind(Slot, WireId),
    Merge { survivor: WireId, discarded: WireId },
}

/// Wiring steps for a whole port, validated before any of them is applied.
///
/// Later bits are checked against the circuit as earlier bits will leave it:
/// merged wires resolve to their survivor and wires that gain a driver count
/// as driven.
#[derive(Debug, Default)]
struct Plan {
    steps: Vec<Step>,
    merged: HashMap<WireId, WireId>,
    driven: HashSet<WireId>,
}

impl Plan {
    fn resolve(&self, mut w: WireId) -> WireId {
        while let Some(&next) = self.merged.get(&w) {
            w = next;
        }
        w
    }

    fn slot(&self, c: &Circuit, slot: Slot) -> Option<WireId> {
        c.slot(slot.module, slot.direction, slot.index)
            .map(|w| self.resolve(w))
    }

    fn has_writer(&self, c: &Circuit, w: WireId) -> bool {
        self.driven.contains(&w) || c.wires[w].writer().is_some()
    }

    fn fresh(&mut self, a: Slot, b: Slot) {
        self.steps.push(Step::Fresh(a, b));
    }

    fn bind(&mut self, c: &Circuit, slot: Slot, w: WireId) {
        if slot.direction == Direction::Output && !c.modules[slot.module].is_composite() {
            self.driven.insert(w);
        }
        self.steps.push(Step::Bind(slot, w));
    }

    fn merge(&mut self, c: &Circuit, survivor: WireId, discarded: WireId) {
        if self.has_writer(c, discarded) {
            self.driven.insert(survivor);
        }
        self.merged.insert(discarded, survivor);
        self.steps.push(Step::Merge {
            survivor,
            discarded,
        });
    }
}

impl Circuit {
    /// Connects two equal-width ports bit by bit.
    ///
    /// The direction pair selects the rule:
    /// - output to input: a driver feeds a reader;
    /// - composite input to submodule input: an input enters a composite;
    /// - submodule output to composite output: a result leaves a composite.
    ///
    /// An input can never drive an output. Every bit is checked before any is
    /// bound, so a failed connection leaves the circuit unchanged.
    pub fn try_connect(&mut self, from: Port, to: Port) -> Result<(), SimError> {
        if from.width() != to.width() {
            return Err(SimError::WidthMismatch {
                left: from.width(),
                right: to.width(),
            });
        }
        self.check_port(from)?;
        self.check_port(to)?;
        let mut plan = Plan::default();
        let pairs = from.indices().zip(to.indices());
        match (from.direction(), to.direction()) {
            (Direction::Output, Direction::Input) => {
                for (onum, inum) in pairs {
                    self.plan_pin(&mut plan, from.module(), onum, to.module(), inum)?;
                }
            }
            (Direction::Input, Direction::Input) => {
                self.expect_composite(from.module())?;
                for (i, inum) in pairs {
                    self.plan_system_input(&mut plan, from.module(), i, to.module(), inum)?;
                }
            }
            (Direction::Output, Direction::Output) => {
                self.expect_composite(to.module())?;
                for (onum, o) in pairs {
                    self.plan_system_output(&mut plan, to.module(), o, from.module(), onum)?;
                }
            }
            (Direction::Input, Direction::Output) => {
                return Err(SimError::InvalidConnection {
                    reason: format!(
                        "input {} cannot drive output {}",
                        self.port_label(from),
                        self.port_label(to)
                    ),
                })
            }
        }
        self.apply(plan);
        Ok(())
    }

    /// Connects two equal-width ports bit by bit.
    ///
    /// # Panics
    ///
    /// Panics on any connection error.
    pub fn connect(&mut self, from: Port, to: Port) {
        if let Err(e) = self.try_connect(from, to) {
            panic!("{e}");
        }
    }

    /// Connects every output of `from` to `to`.
    pub fn connect_module(&mut self, from: ModuleId, to: Port) {
        let outputs = self.outputs(from);
        self.connect(outputs, to);
    }

    /// Connects output slot `onum` of `from` to input slot `inum` of `to`.
    pub fn try_connect_pin(
        &mut self,
        from: ModuleId,
        onum: usize,
        to: ModuleId,
        inum: usize,
    ) -> Result<(), SimError> {
        self.check_index(from, Direction::Output, onum)?;
        self.check_index(to, Direction::Input, inum)?;
        let mut plan = Plan::default();
        self.plan_pin(&mut plan, from, onum, to, inum)?;
        self.apply(plan);
        Ok(())
    }

    fn plan_pin(
        &self,
        plan: &mut Plan,
        from: ModuleId,
        onum: usize,
        to: ModuleId,
        inum: usize,
    ) -> Result<(), SimError> {
        let out = Slot::new(from, Direction::Output, onum);
        let reader = Slot::new(to, Direction::Input, inum);
        match (plan.slot(self, out), plan.slot(self, reader)) {
            (None, _) if self.modules[from].is_composite() => {
                return Err(SimError::UndrivenOutput {
                    port: self.pin_label(from, Direction::Output, onum),
                })
            }
            (None, None) => plan.fresh(out, reader),
            (None, Some(w)) => {
                self.ensure_undriven(plan, w, reader)?;
                plan.bind(self, out, w);
            }
            (Some(w), None) => plan.bind(self, reader, w),
            (Some(a), Some(b)) if a == b => {}
            (Some(a), Some(b)) => {
                self.ensure_undriven(plan, b, reader)?;
                plan.merge(self, a, b);
            }
        }
        Ok(())
    }

    /// Plans binding composite input `i` of `system` to input `inum` of `sub`.
    ///
    /// The submodule input must not already be driven from inside the
    /// composite, or the composite input would become a second source.
    fn plan_system_input(
        &self,
        plan: &mut Plan,
        system: ModuleId,
        i: usize,
        sub: ModuleId,
        inum: usize,
    ) -> Result<(), SimError> {
        let outer = Slot::new(system, Direction::Input, i);
        let inner = Slot::new(sub, Direction::Input, inum);
        match (plan.slot(self, outer), plan.slot(self, inner)) {
            (Some(a), Some(b)) if a == b => {}
            (_, Some(b)) if plan.has_writer(self, b) => {
                return Err(SimError::WireHasWriter {
                    port: self.pin_label(sub, Direction::Input, inum),
                })
            }
            (None, None) => plan.fresh(outer, inner),
            (None, Some(w)) => plan.bind(self, outer, w),
            (Some(w), None) => plan.bind(self, inner, w),
            (Some(a), Some(b)) => plan.merge(self, a, b),
        }
        Ok(())
    }

    /// Plans binding composite output `o` of `system` to the wire driven by
    /// output `onum` of `sub`.
    fn plan_system_output(
        &self,
        plan: &mut Plan,
        system: ModuleId,
        o: usize,
        sub: ModuleId,
        onum: usize,
    ) -> Result<(), SimError> {
        let outer = Slot::new(system, Direction::Output, o);
        let inner = Slot::new(sub, Direction::Output, onum);
        if plan.slot(self, outer).is_some() {
            return Err(SimError::OutputAlreadyConnected {
                port: self.pin_label(system, Direction::Output, o),
            });
        }
        match plan.slot(self, inner) {
            Some(w) => plan.bind(self, outer, w),
            None if self.modules[sub].is_composite() => {
                return Err(SimError::UndrivenOutput {
                    port: self.pin_label(sub, Direction::Output, onum),
                })
            }
            None => plan.fresh(inner, outer),
        }
        Ok(())
    }

    fn apply(&mut self, plan: Plan) {
        for step in plan.steps {
            match step {
                Step::Fresh(a, b) => {
                    let w = self.new_wire();
                    self.bind(a.module, a.direction, a.index, w);
                    self.bind(b.module, b.direction, b.index, w);
                }
                Step::Bind(slot, w) => self.bind(slot.module, slot.direction, slot.index, w),
                Step::Merge {
                    survivor,
                    discarded,
                } => self.merge_wires(survivor, discarded),
            }
        }
    }

    /// Folds `discarded` into `survivor` and redirects every slot bound to it.
    fn merge_wires(&mut self, survivor: WireId, discarded: WireId) {
        let Some(old) = self.wires.remove(discarded) else {
            return;
        };
        debug!(
            "merging {discarded} into {survivor} ({} readers move)",
            old.num_readers()
        );
        self.wires[survivor].absorb(old);
        for module in self.modules.values_mut() {
            for slot in module.inputs.iter_mut().chain(module.outputs.iter_mut()) {
                if *slot == Some(discarded) {
                    *slot = Some(survivor);
                }
            }
        }
    }

    fn ensure_undriven(&self, plan: &Plan, w: WireId, slot: Slot) -> Result<(), SimError> {
        if plan.has_writer(self, w) {
            return Err(SimError::WireHasWriter {
                port: self.pin_label(slot.module, slot.direction, slot.index),
            });
        }
        Ok(())
    }

    fn expect_composite(&self, id: ModuleId) -> Result<(), SimError> {
        if self.modules[id].is_composite() {
            Ok(())
        } else {
            Err(SimError::NotComposite(self.label(id)))
        }
    }

    fn port_label(&self, port: Port) -> String {
        let module = &self.modules[port.module()];
        if port.width() == 1 {
            self.pin_label(port.module(), port.direction(), port.low())
        } else {
            format!(
                "{module}.{}..{}",
                module.layout.name_of(port.direction(), port.low()),
                module.layout.name_of(port.direction(), port.high())
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use gatewave_common::Bit;

    use crate::testing::{and2, inv, pair_of_inverters};
    use crate::{Circuit, ModuleId, Pin, PortLayout, SimError, RUN_TO_COMPLETION};

    /// Composite with a two-bit output `O`, each bit driven by an inverter.
    fn two_bit_driver(c: &mut Circuit) -> ModuleId {
        let drv = c.add_composite("Drv", PortLayout::new().with_output("O", 2));
        let lo = inv(c);
        let hi = inv(c);
        c.add_submodules(drv, [lo, hi]);
        c.connect(c.output(lo, "Z"), c.output_bit(drv, 0));
        c.connect(c.output(hi, "Z"), c.output_bit(drv, 1));
        drv
    }

    /// Every wire bound to a leaf output is driven by exactly that output.
    fn assert_single_writers(c: &Circuit) {
        for (id, module) in c.modules() {
            if module.is_composite() {
                continue;
            }
            for onum in 0..module.num_outputs() {
                if let Some(w) = module.output_wire(onum) {
                    assert_eq!(c.wire(w).writer(), Some(Pin::new(id, onum)));
                }
            }
        }
    }

    #[test]
    fn output_to_input_creates_one_wire() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let b = inv(&mut c);
        c.connect(c.output(a, "Z"), c.input(b, "X"));
        assert_eq!(c.num_wires(), 1);
        let w = c.module(a).output_wire(0).unwrap();
        assert_eq!(c.module(b).input_wire(0), Some(w));
        let wire = c.wire(w);
        assert_eq!(wire.writer().map(|p| p.module), Some(a));
        assert_eq!(wire.num_readers(), 1);
        assert_eq!(wire.ref_count(), 2);
    }

    #[test]
    fn fanout_shares_the_driver_wire() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let g = and2(&mut c);
        c.connect(c.output(a, "Z"), c.input(g, "A"));
        c.connect(c.output(a, "Z"), c.input(g, "B"));
        assert_eq!(c.num_wires(), 1);
        let w = c.module(a).output_wire(0).unwrap();
        assert_eq!(c.wire(w).num_readers(), 2);
    }

    #[test]
    fn second_driver_is_rejected() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let b = inv(&mut c);
        let g = inv(&mut c);
        c.connect(c.output(a, "Z"), c.input(g, "X"));
        let err = c.try_connect(c.output(b, "Z"), c.input(g, "X")).unwrap_err();
        assert!(matches!(err, SimError::WireHasWriter { .. }));

        // Also when both sides already have wires.
        let d = inv(&mut c);
        c.connect(c.output(b, "Z"), c.input(d, "X"));
        let err = c.try_connect(c.output(b, "Z"), c.input(g, "X")).unwrap_err();
        assert!(matches!(err, SimError::WireHasWriter { .. }));
    }

    #[test]
    fn driving_a_composite_input_merges_wires() {
        let mut c = Circuit::new();
        let (pair, first, _) = pair_of_inverters(&mut c);
        let src = inv(&mut c);
        let other = inv(&mut c);
        c.connect(c.output(src, "Z"), c.input(other, "X"));
        let before = c.num_wires();

        c.connect(c.output(src, "Z"), c.input(pair, "A"));

        assert_eq!(c.num_wires(), before - 1);
        let w = c.module(src).output_wire(0).unwrap();
        assert_eq!(c.module(pair).input_wire(0), Some(w));
        assert_eq!(c.module(first).input_wire(0), Some(w));
        let readers: Vec<_> = c.wire(w).readers().map(|p| p.module).collect();
        assert_eq!(readers, vec![first, other]);
        assert_eq!(c.wire(w).writer().map(|p| p.module), Some(src));
    }

    #[test]
    fn driving_an_unbound_composite_input_binds_in_place() {
        let mut c = Circuit::new();
        let (pair, first, _) = pair_of_inverters(&mut c);
        let src = inv(&mut c);
        let before = c.num_wires();
        c.connect(c.output(src, "Z"), c.input(pair, "A"));
        assert_eq!(c.num_wires(), before);
        assert_eq!(
            c.module(src).output_wire(0),
            c.module(first).input_wire(0)
        );
    }

    #[test]
    fn width_mismatch() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let g = and2(&mut c);
        let err = c.try_connect(c.output(a, "Z"), c.inputs(g)).unwrap_err();
        assert!(matches!(err, SimError::WidthMismatch { left: 1, right: 2 }));
    }

    #[test]
    fn input_cannot_drive_output() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let b = inv(&mut c);
        let err = c.try_connect(c.input(a, "X"), c.output(b, "Z")).unwrap_err();
        assert!(matches!(err, SimError::InvalidConnection { .. }));
    }

    #[test]
    fn composite_output_connected_twice() {
        let mut c = Circuit::new();
        let (pair, _, second) = pair_of_inverters(&mut c);
        let err = c
            .try_connect(c.output(second, "Z"), c.output(pair, "Z"))
            .unwrap_err();
        assert!(matches!(err, SimError::OutputAlreadyConnected { .. }));
    }

    #[test]
    fn undriven_composite_output() {
        let mut c = Circuit::new();
        let outer = c.add_composite("Outer", crate::PortLayout::new().with_output("Z", 1));
        let inner = c.add_composite("Inner", crate::PortLayout::new().with_output("Z", 1));
        c.add_submodule(outer, inner);
        let err = c
            .try_connect(c.output(inner, "Z"), c.output(outer, "Z"))
            .unwrap_err();
        assert!(matches!(err, SimError::UndrivenOutput { .. }));

        let sink = inv(&mut c);
        let err = c
            .try_connect(c.output(inner, "Z"), c.input(sink, "X"))
            .unwrap_err();
        assert!(matches!(err, SimError::UndrivenOutput { .. }));
    }

    #[test]
    fn system_input_on_leaf_is_rejected() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let b = inv(&mut c);
        let err = c.try_connect(c.input(a, "X"), c.input(b, "X")).unwrap_err();
        assert!(matches!(err, SimError::NotComposite(_)));
    }

    #[test]
    fn connect_module_uses_all_outputs() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let b = inv(&mut c);
        c.connect_module(a, c.input(b, "X"));
        assert_eq!(c.module(a).output_wire(0), c.module(b).input_wire(0));
    }

    #[test]
    fn reconnecting_the_same_wire_is_a_no_op() {
        let mut c = Circuit::new();
        let a = inv(&mut c);
        let b = inv(&mut c);
        c.connect(c.output(a, "Z"), c.input(b, "X"));
        c.connect(c.output(a, "Z"), c.input(b, "X"));
        let w = c.module(a).output_wire(0).unwrap();
        assert_eq!(c.wire(w).ref_count(), 2);
    }

    #[test]
    fn composite_input_cannot_join_an_internally_driven_net() {
        let mut c = Circuit::new();
        let t = c.add_composite("T", PortLayout::new().with_input("A", 1));
        let n = inv(&mut c);
        let g = and2(&mut c);
        c.add_submodules(t, [n, g]);
        c.connect(c.output(n, "Z"), c.input(g, "A"));

        let err = c.try_connect(c.input(t, "A"), c.input(g, "A")).unwrap_err();
        assert!(matches!(err, SimError::WireHasWriter { ref port } if port == "TAND.A"));
        assert_eq!(c.module(t).input_wire(0), None);

        // Same when the composite input already has a wire of its own.
        c.connect(c.input(t, "A"), c.input(n, "X"));
        let wires = c.num_wires();
        let err = c.try_connect(c.input(t, "A"), c.input(g, "A")).unwrap_err();
        assert!(matches!(err, SimError::WireHasWriter { .. }));
        assert_eq!(c.num_wires(), wires);
        assert_ne!(c.module(t).input_wire(0), c.module(g).input_wire(0));
        assert_single_writers(&c);
    }

    #[test]
    fn failed_wide_connect_changes_nothing() {
        let mut c = Circuit::new();
        let drv = two_bit_driver(&mut c);
        let g = and2(&mut c);
        let other = inv(&mut c);
        c.connect(c.output(other, "Z"), c.input(g, "B"));
        let wires = c.num_wires();

        let err = c.try_connect(c.outputs(drv), c.inputs(g)).unwrap_err();
        assert!(matches!(err, SimError::WireHasWriter { ref port } if port == "TAND.B"));
        assert_eq!(c.num_wires(), wires);
        assert_eq!(c.module(g).input_wire(0), None);
        let low = c.module(drv).output_wire(0).unwrap();
        assert_eq!(c.wire(low).num_readers(), 0);
        assert_eq!(c.wire(low).ref_count(), 2);
    }

    #[test]
    fn later_bits_see_the_drivers_earlier_bits_add() {
        let mut c = Circuit::new();
        let drv = two_bit_driver(&mut c);
        let t = c.add_composite("T", PortLayout::new().with_input("A", 2));
        let g = and2(&mut c);
        c.add_submodule(t, g);
        // Both composite input bits end up on g.A's wire.
        c.connect(c.input_bit(t, 0), c.input(g, "A"));
        c.connect(c.input_bit(t, 1), c.input(g, "A"));
        let shared = c.module(g).input_wire(0).unwrap();
        assert_eq!(c.module(t).input_wire(1), Some(shared));
        let wires = c.num_wires();

        // Bit 0 alone would be fine; bit 1 would then drive the same net twice.
        let err = c.try_connect(c.outputs(drv), c.input(t, "A")).unwrap_err();
        assert!(matches!(err, SimError::WireHasWriter { .. }));
        assert_eq!(c.num_wires(), wires);
        assert_eq!(c.module(t).input_wire(0), Some(shared));
        assert_eq!(c.wire(shared).writer(), None);
    }

    #[test]
    fn nested_composite_inputs_merge_across_levels() {
        let mut c = Circuit::new();
        let outer = c.add_composite(
            "Outer",
            PortLayout::new().with_input("A", 1).with_output("Z", 1),
        );
        let (pair, first, _) = pair_of_inverters(&mut c);
        let tap = inv(&mut c);
        c.add_submodules(outer, [pair, tap]);
        c.connect(c.input(outer, "A"), c.input(tap, "X"));
        let survivor = c.module(outer).input_wire(0).unwrap();
        assert_ne!(c.module(pair).input_wire(0), Some(survivor));
        let before = c.num_wires();

        // Both the outer and the nested composite input already have wires.
        c.connect(c.input(outer, "A"), c.input(pair, "A"));
        c.connect(c.output(pair, "Z"), c.output(outer, "Z"));

        assert_eq!(c.num_wires(), before - 1);
        for m in [outer, pair, first, tap] {
            assert_eq!(c.module(m).input_wire(0), Some(survivor), "{}", c.label(m));
        }
        let readers: Vec<_> = c.wire(survivor).readers().map(|p| p.module).collect();
        assert_eq!(readers.len(), 2);
        assert!(readers.contains(&first) && readers.contains(&tap));
        assert_eq!(c.wire(survivor).writer(), None);

        let src = inv(&mut c);
        c.connect(c.output(src, "Z"), c.input(outer, "A"));
        assert_eq!(c.wire(survivor).writer(), Some(Pin::new(src, 0)));
        assert_single_writers(&c);

        c.assign(c.input(src, "X"), Bit::High);
        c.sim_start([src], RUN_TO_COMPLETION);
        assert_eq!(c.value(c.output(outer, "Z")), Some(0));
        assert_eq!(c.value(c.output(tap, "Z")), Some(1));
    }
}
