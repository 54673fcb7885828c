//! Virtual Clock Module
//!
//! # Design Philosophy
//!
//! Two traits split the clock into *what callers see* and *how time is
//! stored*:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  Application Code                                      │
//! │  sync.now(); sync.bang(start, interval, end);          │
//! │  (VirtualTime)                                         │
//! └────────────────────────────────────────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          │                       │
//!     Simulation              Passthrough
//!          │                       │
//!   Synchronizer<             Synchronizer<
//!     SteppedBackend>           WallClockBackend>
//!          │                       │
//!   ClockState + RwLock      Utc::now() + RwLock
//!   (moves by interval)      (moves on its own)
//! ```
//!
//! The gating loop is written once against [`ClockBackend`]; swapping the
//! backend changes where time comes from, never when the loop may advance.
//!
//! # Invariants
//! - `elapsed == current - start` on the stepped backend
//! - `current` moves only by whole intervals on the stepped backend

mod backend;
mod stepped_backend;
mod types;
mod wall_clock_backend;

use chrono::Duration;

pub use backend::ClockBackend;
pub use stepped_backend::SteppedBackend;
pub use types::{
    default_interval,
    default_span,
    ClockState,
    LoopExit,
    TickOutcome,
    VirtualInstant,
};
pub use wall_clock_backend::WallClockBackend;

/// The clock capability set exposed to simulation code
///
/// Implemented by [`crate::Synchronizer`] for every backend, so code that
/// only needs to read or drive time can take `&dyn VirtualTime`.
pub trait VirtualTime {
    /// Present virtual time
    fn now(&self) -> VirtualInstant;

    /// Virtual time accumulated since the start of the current run
    fn total_elapsed(&self) -> Duration;

    /// One manual step of the clock, ignoring the gate
    fn advance(&self);

    /// Run the gated advance loop until `end` or cancellation
    ///
    /// Blocks the calling thread. Launch it on a background thread, for
    /// example with [`crate::adapters::BangDriver`].
    fn bang(&self, start: VirtualInstant, interval: Duration, end: VirtualInstant) -> LoopExit;
}
