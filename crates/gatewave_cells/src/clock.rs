//! Free-running clock source.

use gatewave_common::{Bit, Delay, SimTime};
use gatewave_sim::{Area, Component, Energy, PortIo, PortLayout};

/// Drives `CLK` through a fixed number of periods.
///
/// Cycle `c` rises at `start + c * (high + low)` and falls `high` ticks
/// later. The whole waveform is scheduled the first time the clock is
/// propagated, so the clock is meant to be used as a simulation root.
#[derive(Clone, Debug)]
pub struct Clock {
    cycles: u64,
    high: Delay,
    low: Delay,
    start: SimTime,
}

impl Clock {
    /// Creates a clock running `cycles` periods of `high` then `low` ticks,
    /// with the first rising edge at `start`.
    pub fn new(cycles: u64, high: Delay, low: Delay, start: u64) -> Self {
        Self {
            cycles,
            high,
            low,
            start: SimTime::from_ticks(start),
        }
    }

    /// Length of one period.
    pub fn period(&self) -> Delay {
        self.high + self.low
    }

    /// Time of the last falling edge, or `None` for a clock with no cycles.
    pub fn end(&self) -> Option<SimTime> {
        (self.cycles > 0)
            .then(|| self.start + (self.cycles - 1) * self.period() + self.high)
    }
}

impl Component for Clock {
    fn class_name(&self) -> String {
        format!("CLK<{},{},{}>", self.cycles, self.high, self.low)
    }

    fn layout(&self) -> PortLayout {
        PortLayout::new().with_output("CLK", 1)
    }

    fn propagate(&self, io: &mut PortIo<'_>) {
        assert!(
            io.time() <= self.start,
            "clock propagated at {} after its start {}",
            io.time(),
            self.start
        );
        for c in 0..self.cycles {
            let rise = self.start + c * self.period();
            io.write_at(0, Bit::High, rise);
            io.write_at(0, Bit::Low, rise + self.high);
        }
    }

    fn delay(&self, _inum: usize, _onum: usize) -> Option<Delay> {
        None
    }

    fn area(&self) -> Area {
        0.0
    }

    fn energy(&self, _onum: usize) -> Energy {
        1.0
    }
}
