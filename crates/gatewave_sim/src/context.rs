//! Transient state of one simulation run.

use gatewave_common::SimTime;

use crate::queue::{EventQueue, QueueItem};

/// Lifecycle of the scheduler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimState {
    /// No run in progress; output writes do not schedule readers.
    #[default]
    Idle,
    /// Executing events.
    Running,
    /// Stopped at the requested horizon with events still pending.
    Paused,
    /// The queue ran empty.
    Drained,
}

/// Current time, pending events, and the event being executed.
#[derive(Clone, Debug, Default)]
pub struct SimContext {
    pub(crate) time: SimTime,
    pub(crate) queue: EventQueue,
    pub(crate) current: Option<QueueItem>,
    pub(crate) state: SimState,
}

impl SimContext {
    /// The global simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// The scheduler state.
    pub fn state(&self) -> SimState {
        self.state
    }

    /// Pending events.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// The event whose `propagate` call is in progress.
    pub fn current(&self) -> Option<&QueueItem> {
        self.current.as_ref()
    }

    /// Returns `true` between a start and the next reset.
    pub fn is_active(&self) -> bool {
        self.state != SimState::Idle
    }
}
