//! Domain Layer
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  Clock Module                  Event / Registry             │
//! │  ├─ VirtualTime (trait)        ├─ Event (Arc-shared)        │
//! │  ├─ ClockBackend (trait)       └─ MemberRegistry            │
//! │  ├─ SteppedBackend                 (RwLock<HashMap>)        │
//! │  └─ WallClockBackend                                        │
//! │                                                             │
//! │                   Synchronizer Module                       │
//! │                   ├─ Synchronizer<B>                        │
//! │                   ├─ SynchronizerBuilder                    │
//! │                   └─ bang / tick (gated advance loop)       │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # The Gate
//!
//! The clock may step only when every member's list is empty. An event
//! leaves its list through `pop_event` once complete, or through
//! `clear_events` as an administrative override. Anything else keeps the
//! clock frozen.

pub mod clock;
pub mod event;
pub mod registry;
pub mod synchronizer;

// Re-export clock types
pub use clock::{
    ClockBackend,
    ClockState,
    LoopExit,
    SteppedBackend,
    TickOutcome,
    VirtualInstant,
    VirtualTime,
    WallClockBackend,
};

// Re-export event and registry types
pub use event::{Event, EventDetails};
pub use registry::{ClearOutcome, MemberRegistry, PopOutcome};

// Re-export synchronizer types
pub use synchronizer::{SyncSnapshot, Synchronizer, SynchronizerBuilder};

/// Stepped synchronizer, the normal simulation setup
pub type SteppedSynchronizer = Synchronizer<SteppedBackend>;

/// Synchronizer passing real time through, for tests that only need the gate
pub type WallClockSynchronizer = Synchronizer<WallClockBackend>;
