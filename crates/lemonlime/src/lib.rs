//! lemonlime - Gated Virtual Clock Synchronizer
//!
//! # Overview
//!
//! `lemonlime` advances a simulated timeline in fixed steps, but only while
//! no registered member has outstanding work. Discrete-event simulations
//! and test harnesses get deterministic, gated time instead of wall-clock
//! time.
//!
//! # Architecture
//!
//! - **Domain**: clock, events, member registry, synchronizer loop
//! - **Infrastructure**: TOML configuration, event id suppliers
//! - **Adapters**: background-thread driver for the advance loop
//!
//! # Laws
//!
//! - **Gate**: the clock steps only when every member's event list is empty
//! - **Elapsed**: `total_elapsed() == now() - start` on the stepped clock
//! - **Bound**: the advance loop never steps past its end
//! - **Pop**: only complete events are ever popped
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::{Duration, TimeZone, Utc};
//! use lemonlime::{BangDriver, LoopExit, SynchronizerBuilder, VirtualTime};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let sync = Arc::new(
//!     SynchronizerBuilder::new(start)
//!         .span(Duration::seconds(3))
//!         .tick_pause(std::time::Duration::from_millis(1))
//!         .publish_events(true)
//!         .build()
//!         .unwrap(),
//! );
//!
//! // Outstanding work holds the clock at `start`.
//! let event = sync.new_event().unwrap();
//! sync.register_event("worker", Arc::clone(&event));
//! assert!(!sync.can_advance());
//!
//! // Finish the work and pop it; the loop can now run to the end.
//! event.complete_event();
//! sync.pop_event("worker", event.id());
//!
//! let handle = BangDriver::spawn_configured(Arc::clone(&sync)).unwrap();
//! assert_eq!(handle.join(), LoopExit::ReachedEnd);
//! assert_eq!(sync.total_elapsed(), Duration::seconds(3));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod infrastructure;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Re-export Primary Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// Clock types
pub use domain::{
    ClockBackend,
    ClockState,
    LoopExit,
    SteppedBackend,
    TickOutcome,
    VirtualInstant,
    VirtualTime,
    WallClockBackend,
};

// Registry and event types
pub use domain::{ClearOutcome, Event, EventDetails, MemberRegistry, PopOutcome};

// Synchronizer types
pub use domain::{
    SteppedSynchronizer,
    SyncSnapshot,
    Synchronizer,
    SynchronizerBuilder,
    WallClockSynchronizer,
};

pub use adapters::{BangDriver, DriverHandle};
pub use error::{ConfigError, SyncError, SyncResult};
pub use infrastructure::{IdGenerator, SequentialIds, SynchronizerConfig, UuidGenerator};

/// Re-exported so callers can hold the kill handle without a direct dependency
pub use tokio_util::sync::CancellationToken;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
