//! Stepped Backend Implementation
//!
//! # Design
//! The virtual clock proper. Time only moves when [`ClockBackend::step`]
//! is called, and always by exactly one interval.
//! - All fields live in one `ClockState` behind a `RwLock`
//! - Readers (`now()`, `total_elapsed()`) take the shared lock
//! - `step()` and `rebase()` take the exclusive lock

use chrono::Duration;
use parking_lot::RwLock;
use tracing::warn;

use super::backend::ClockBackend;
use super::types::{ClockState, VirtualInstant};

/// Virtual clock that advances in discrete, fixed-size jumps
///
/// Keeping every field under one lock means a reader can never observe a
/// `current` that disagrees with `elapsed`.
#[derive(Debug)]
pub struct SteppedBackend {
    state: RwLock<ClockState>,
}

impl SteppedBackend {
    /// Clock at `start` with a one second interval and a 24 hour span
    pub fn new(start: VirtualInstant) -> Self {
        Self::from_state(ClockState::starting_at(start))
    }

    /// Clock with explicit parameters
    pub fn with_params(start: VirtualInstant, interval: Duration, end: VirtualInstant) -> Self {
        Self::from_state(ClockState::rebased(start, interval, end))
    }

    fn from_state(state: ClockState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl ClockBackend for SteppedBackend {
    fn state(&self) -> ClockState {
        *self.state.read()
    }

    fn step(&self) -> VirtualInstant {
        let mut state = self.state.write();
        if !state.step() {
            warn!(current = %state.current, "virtual clock cannot advance past the calendar limit");
        }
        state.current
    }

    fn rebase(&self, start: VirtualInstant, interval: Duration, end: VirtualInstant) {
        *self.state.write() = ClockState::rebased(start, interval, end);
    }
}
