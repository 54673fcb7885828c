//! Clock Backend Abstraction Layer
//!
//! The gating loop in [`crate::Synchronizer`] never touches clock fields
//! directly. It goes through [`ClockBackend`], so a stepped virtual clock
//! and a wall-clock passthrough share the exact same loop.
//!
//! Backends are shared between the loop thread and any number of readers,
//! so every method takes `&self` and the implementation owns whatever
//! synchronization it needs.

use chrono::Duration;

use super::types::{ClockState, VirtualInstant};

/// Storage and stepping strategy for the synchronizer's clock
///
/// # Thread Safety
/// Implementations must return a consistent [`ClockState`] from
/// [`state`](ClockBackend::state) even while another thread is inside
/// [`step`](ClockBackend::step).
pub trait ClockBackend: Send + Sync {
    /// Consistent snapshot of all clock fields
    fn state(&self) -> ClockState;

    /// Present time on this clock
    fn now(&self) -> VirtualInstant {
        self.state().current
    }

    /// Time accumulated since the clock's start
    fn total_elapsed(&self) -> Duration {
        self.state().elapsed
    }

    /// Move forward by one interval and return the new present
    fn step(&self) -> VirtualInstant;

    /// Overwrite start, interval and end; current and elapsed restart
    fn rebase(&self, start: VirtualInstant, interval: Duration, end: VirtualInstant);
}
