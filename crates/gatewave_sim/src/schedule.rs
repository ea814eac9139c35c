//! The event-driven scheduler.
//!
//! A run starts by propagating each root module once at time zero, which
//! reacts to stimulus assigned beforehand. Every output change then enqueues
//! the wire's readers at the change time, and the step loop executes queued
//! items in `(time, module)` order until the queue drains or the horizon is
//! reached. A paused run resumes with another [`Circuit::sim_step`].

use std::collections::BTreeSet;

use gatewave_common::{Bit, Delay, SimTime};
use log::{debug, trace};

use crate::circuit::Circuit;
use crate::context::{SimContext, SimState};
use crate::ids::ModuleId;
use crate::io::PortIo;

/// Step count that never stops a run before the queue drains.
pub const RUN_TO_COMPLETION: u64 = u64::MAX;

impl Circuit {
    /// The global simulation time.
    pub fn sim_time(&self) -> SimTime {
        self.sim.time
    }

    /// The scheduler state.
    pub fn sim_state(&self) -> SimState {
        self.sim.state
    }

    /// The transient state of the current run.
    pub fn sim_context(&self) -> &SimContext {
        &self.sim
    }

    /// Number of queued events.
    pub fn pending_events(&self) -> usize {
        self.sim.queue.len()
    }

    /// Starts a run: resets the scheduler, propagates every root once at
    /// time zero, then executes events for up to `steps` ticks.
    pub fn sim_start<I: IntoIterator<Item = ModuleId>>(&mut self, roots: I, steps: u64) -> SimState {
        self.sim_reset();
        self.sim.state = SimState::Running;
        let roots: Vec<ModuleId> = roots.into_iter().collect();
        debug!("simulation start with {} root(s)", roots.len());
        for root in roots {
            self.propagate(root);
        }
        self.sim_step(steps)
    }

    /// Executes queued events whose time is before `now + steps`.
    ///
    /// Stops as [`SimState::Paused`] at the first event at or past the
    /// horizon, leaving it queued, or as [`SimState::Drained`] once the queue
    /// is empty.
    ///
    /// # Panics
    ///
    /// Panics if no run was started.
    pub fn sim_step(&mut self, steps: u64) -> SimState {
        assert!(self.sim.is_active(), "sim_step called without sim_start");
        self.sim.state = SimState::Running;
        let end = self.sim.time.saturating_add(steps);
        while let Some(time) = self.sim.queue.peek_time() {
            if time >= end {
                self.sim.state = SimState::Paused;
                debug!("simulation paused at {} ({} pending)", self.sim.time, self.sim.queue.len());
                return self.sim.state;
            }
            let Some(item) = self.sim.queue.pop() else {
                break;
            };
            self.sim.time = item.time;
            let module = item.module;
            self.sim.current = Some(item);
            self.propagate(module);
            self.sim.current = None;
        }
        self.sim.state = SimState::Drained;
        debug!("simulation drained at {}", self.sim.time);
        self.sim.state
    }

    /// Returns the scheduler to idle: empty queue, time zero, and an empty
    /// delay-table cache. Wire histories are kept.
    pub fn sim_reset(&mut self) {
        self.sim = SimContext::default();
        self.delay_tables.get_mut().clear();
    }

    /// Runs `root` as the sole root until the queue drains or the configured
    /// time limit is hit, then resets the scheduler. Returns the time of the
    /// last executed event.
    pub fn simulate(&mut self, root: ModuleId) -> SimTime {
        let steps = self.config.time_limit.unwrap_or(RUN_TO_COMPLETION);
        self.sim_start([root], steps);
        let end = self.sim.time;
        self.sim_reset();
        end
    }

    pub(crate) fn propagate(&mut self, id: ModuleId) {
        match self.modules[id].component_rc() {
            Some(component) => {
                trace!("propagate {} ({id}) at {}", self.modules[id], self.sim.time);
                let mut io = PortIo::new(self, id);
                component.propagate(&mut io);
            }
            None => self.propagate_composite(id),
        }
    }

    /// A composite root forwards the initial propagation to the leaves
    /// reading its inputs.
    fn propagate_composite(&mut self, id: ModuleId) {
        assert_eq!(
            self.sim.time,
            SimTime::ZERO,
            "composite {} can only be propagated as a root",
            self.modules[id]
        );
        let readers: BTreeSet<ModuleId> = self.modules[id]
            .inputs
            .iter()
            .flatten()
            .flat_map(|w| self.wires[*w].readers())
            .map(|pin| pin.module)
            .collect();
        for reader in readers {
            self.propagate(reader);
        }
    }

    /// Delay from the inputs that just changed to output `onum`, or `None`
    /// if none of them affects it.
    ///
    /// Inside an event the changed inputs are the event's input set;
    /// otherwise they are the inputs with an edge at the current time.
    pub(crate) fn delay_to_output(&self, id: ModuleId, onum: usize) -> Option<Delay> {
        let worst = match &self.sim.current {
            Some(item) if item.module == id => item
                .inputs
                .iter()
                .filter_map(|&inum| self.delay(id, inum, onum))
                .max(),
            _ => (0..self.modules[id].num_inputs())
                .filter(|&inum| self.edge(id, inum))
                .filter_map(|inum| self.delay(id, inum, onum))
                .max(),
        };
        worst.map(|d| {
            if self.config.fanout_delay {
                d + self.fanout(id, onum)
            } else {
                d
            }
        })
    }

    /// Returns `true` if input `inum` has a recorded change at the current time.
    pub fn edge(&self, id: ModuleId, inum: usize) -> bool {
        self.modules[id]
            .input_wire(inum)
            .is_some_and(|w| self.wires[w].history().has_time(self.sim.time))
    }

    /// Returns `true` if input `inum` changed to `1` at the current time.
    pub fn posedge(&self, id: ModuleId, inum: usize) -> bool {
        self.edge_to(id, inum, Bit::High)
    }

    /// Returns `true` if input `inum` changed to `0` at the current time.
    pub fn negedge(&self, id: ModuleId, inum: usize) -> bool {
        self.edge_to(id, inum, Bit::Low)
    }

    fn edge_to(&self, id: ModuleId, inum: usize, bit: Bit) -> bool {
        self.edge(id, inum) && self.input_value(id, inum, self.sim.time) == bit
    }
}
