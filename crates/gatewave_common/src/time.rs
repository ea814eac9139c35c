//! Simulation time points and propagation delays.
//!
//! Time is an integral tick count. Gate delays are expressed in the same
//! ticks, so a [`Delay`] can be added to a [`SimTime`] directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A propagation delay in simulation ticks.
pub type Delay = u64;

/// A point in simulation time, in ticks since the start of the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// The start of every simulation run.
    pub const ZERO: SimTime = SimTime(0);
    /// The latest representable time; reads at `MAX` return the final value.
    pub const MAX: SimTime = SimTime(u64::MAX);

    /// Creates a time point from a tick count.
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Returns the tick count.
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Adds a delay, clamping at [`SimTime::MAX`].
    pub fn saturating_add(self, delay: Delay) -> Self {
        Self(self.0.saturating_add(delay))
    }
}

impl Add<Delay> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Delay) -> SimTime {
        self.saturating_add(rhs)
    }
}

impl Sub for SimTime {
    type Output = Delay;

    /// Returns the distance between two time points, zero if `rhs` is later.
    fn sub(self, rhs: SimTime) -> Delay {
        self.0.saturating_sub(rhs.0)
    }
}

impl From<u64> for SimTime {
    fn from(ticks: u64) -> Self {
        Self(ticks)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == SimTime::MAX {
            write!(f, "+inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_default() {
        assert_eq!(SimTime::default(), SimTime::ZERO);
        assert_eq!(SimTime::ZERO.ticks(), 0);
    }

    #[test]
    fn add_delay() {
        assert_eq!(SimTime::from_ticks(10) + 5, SimTime::from_ticks(15));
    }

    #[test]
    fn add_saturates() {
        assert_eq!(SimTime::from_ticks(u64::MAX - 1) + 10, SimTime::MAX);
    }

    #[test]
    fn difference() {
        assert_eq!(SimTime::from_ticks(40) - SimTime::from_ticks(15), 25);
        assert_eq!(SimTime::from_ticks(15) - SimTime::from_ticks(40), 0);
    }

    #[test]
    fn ordering() {
        assert!(SimTime::from_ticks(1) < SimTime::from_ticks(2));
        assert!(SimTime::MAX > SimTime::from_ticks(u64::MAX - 1));
    }

    #[test]
    fn display() {
        assert_eq!(SimTime::from_ticks(57).to_string(), "57");
        assert_eq!(SimTime::MAX.to_string(), "+inf");
    }

    #[test]
    fn serde_roundtrip() {
        let t = SimTime::from_ticks(1234);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "1234");
        let back: SimTime = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
