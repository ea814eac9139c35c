//! Static timing and post-run power figures.

use std::collections::BTreeMap;

use gatewave_common::{Delay, SimTime};
use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::component::Energy;
use crate::ids::ModuleId;
use crate::module::ModuleKind;

/// The slowest input-to-output arc of a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPath {
    /// Input slot at the start of the path.
    pub input: usize,
    /// Output slot at the end of the path.
    pub output: usize,
    /// Path delay, including the output's fanout when fanout delay is enabled.
    pub delay: Delay,
}

/// Energy per time step over one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerStats {
    /// Total energy divided by the time of the last switching event.
    pub average: Energy,
    /// Largest energy spent at a single time.
    pub peak: Energy,
}

impl Circuit {
    /// Finds the input/output pair with the largest delay.
    ///
    /// Ties keep the first pair in input-then-output order. Returns `None`
    /// if no input affects any output.
    pub fn critical_path(&self, id: ModuleId) -> Option<CriticalPath> {
        let module = &self.modules[id];
        let mut worst: Option<CriticalPath> = None;
        for input in 0..module.num_inputs() {
            for output in 0..module.num_outputs() {
                let Some(mut delay) = self.delay(id, input, output) else {
                    continue;
                };
                if self.config.fanout_delay {
                    delay += self.fanout(id, output);
                }
                if worst.map_or(true, |w| delay > w.delay) {
                    worst = Some(CriticalPath {
                        input,
                        output,
                        delay,
                    });
                }
            }
        }
        worst
    }

    /// Adds `energy(onum)` at every recorded change of every leaf output
    /// under `id`.
    pub fn record_energies(&self, id: ModuleId, table: &mut BTreeMap<SimTime, Energy>) {
        let module = &self.modules[id];
        match &module.kind {
            ModuleKind::Composite(subs) => {
                for &sub in subs {
                    self.record_energies(sub, table);
                }
            }
            ModuleKind::Leaf(component) => {
                for (onum, w) in module.outputs.iter().enumerate() {
                    let Some(w) = *w else { continue };
                    let energy = component.energy(onum);
                    for (time, _) in self.wires[w].history().iter() {
                        *table.entry(time).or_insert(0.0) += energy;
                    }
                }
            }
        }
    }

    /// Average and peak energy per time step from the recorded histories.
    pub fn sim_power_stats(&self, id: ModuleId) -> PowerStats {
        let mut table = BTreeMap::new();
        self.record_energies(id, &mut table);
        let Some((&last, _)) = table.last_key_value() else {
            return PowerStats::default();
        };
        let total: Energy = table.values().sum();
        let peak = table.values().copied().fold(0.0, Energy::max);
        let span = last.ticks().max(1) as Energy;
        PowerStats {
            average: total / span,
            peak,
        }
    }
}
