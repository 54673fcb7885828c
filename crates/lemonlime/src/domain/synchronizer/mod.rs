//! Synchronizer - registry, clock and event gate in one owner.
//!
//! # Architecture
//!
//! ```text
//! Synchronizer<B: ClockBackend>
//!   ├─ clock: B                        (now / step / rebase)
//!   ├─ members: MemberRegistry         (RwLock<HashMap<key, Vec<Arc<Event>>>>)
//!   ├─ publish_events: AtomicBool      (gate for new_event)
//!   ├─ kill: RwLock<CancellationToken> (advisory stop for bang)
//!   └─ running: AtomicBool             (one bang at a time)
//! ```
//!
//! Share it as `Arc<Synchronizer>`: every method takes `&self`, so one
//! thread can run [`VirtualTime::bang`](crate::VirtualTime::bang) while
//! others register and pop events.

mod builder;
mod engine;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::clock::{ClockBackend, SteppedBackend, VirtualInstant};
use super::event::{Event, EventDetails};
use super::registry::{ClearOutcome, MemberRegistry, PopOutcome};
use crate::error::{SyncError, SyncResult};
use crate::infrastructure::config::{SynchronizerConfig, DEFAULT_TICK_PAUSE_MS};
use crate::infrastructure::ids::{IdGenerator, UuidGenerator};

pub use builder::SynchronizerBuilder;

/// Gated virtual clock
///
/// The clock advances by one interval per loop iteration, and only while
/// no member has an outstanding event.
pub struct Synchronizer<B: ClockBackend = SteppedBackend> {
    clock: B,
    members: MemberRegistry,
    publish_events: AtomicBool,
    kill: RwLock<CancellationToken>,
    running: AtomicBool,
    tick_pause: StdDuration,
    ids: Arc<dyn IdGenerator>,
}

impl Synchronizer<SteppedBackend> {
    /// Synchronizer starting at `start`
    ///
    /// Defaults: one second interval, end 24 hours after start, publishing
    /// disabled, 25 ms pause between loop iterations.
    pub fn from_date(start: VirtualInstant) -> Self {
        Self::with_backend(SteppedBackend::new(start))
    }

    /// Synchronizer starting at the present wall-clock moment
    pub fn from_now() -> Self {
        Self::from_date(Utc::now())
    }

    /// Synchronizer described by a validated config
    pub fn from_config(config: &SynchronizerConfig) -> SyncResult<Self> {
        SynchronizerBuilder::from_config(config)?.build()
    }
}

impl<B: ClockBackend> Synchronizer<B> {
    /// Synchronizer over an arbitrary clock backend with default settings
    pub fn with_backend(clock: B) -> Self {
        Self::assemble(
            clock,
            false,
            StdDuration::from_millis(DEFAULT_TICK_PAUSE_MS),
            Arc::new(UuidGenerator),
        )
    }

    pub(crate) fn assemble(
        clock: B,
        publish_events: bool,
        tick_pause: StdDuration,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            clock,
            members: MemberRegistry::new(),
            publish_events: AtomicBool::new(publish_events),
            kill: RwLock::new(CancellationToken::new()),
            running: AtomicBool::new(false),
            tick_pause,
            ids,
        }
    }

    /// The clock backend
    pub fn clock(&self) -> &B {
        &self.clock
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Registry
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Create an empty event list for `key`, resetting any existing one
    pub fn register_member(&self, key: &str) {
        self.members.register_member(key);
    }

    /// Append `event` under `key`, registering the member if needed
    pub fn register_event(&self, key: &str, event: Arc<Event>) {
        self.members.register_event(key, event);
    }

    /// Administrative override: discard all events for `key`
    ///
    /// Unblocks the clock for that member whether or not its events were
    /// complete. Normal flow is `complete_event` followed by `pop_event`.
    pub fn clear_events(&self, key: &str) -> ClearOutcome {
        self.members.clear(key)
    }

    /// Remove the first *complete* event `event_id` registered under `key`
    ///
    /// A no-op (logged) when the member is unknown or the event is missing
    /// or still incomplete.
    pub fn pop_event(&self, key: &str, event_id: &str) -> PopOutcome {
        self.members.pop(key, event_id)
    }

    /// Events currently outstanding for `key`
    pub fn get_member(&self, key: &str) -> SyncResult<Vec<Arc<Event>>> {
        self.members.get(key)
    }

    /// True iff no member has an outstanding event
    pub fn can_advance(&self) -> bool {
        self.members.can_advance()
    }

    /// Outstanding events across all members
    pub fn outstanding_events(&self) -> usize {
        self.members.outstanding()
    }

    /// Registered member keys, sorted
    pub fn member_keys(&self) -> Vec<String> {
        self.members.keys()
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Events
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Whether `new_event` is currently permitted
    pub fn is_publishing(&self) -> bool {
        self.publish_events.load(Ordering::Acquire)
    }

    /// Open or close the gate on event creation
    pub fn set_publishing(&self, enabled: bool) {
        self.publish_events.store(enabled, Ordering::Release);
        info!(enabled, "event publishing toggled");
    }

    /// Create an unregistered event stamped with the current real and
    /// virtual time
    ///
    /// # Errors
    /// [`SyncError::PublishingDisabled`] while the publishing gate is closed.
    pub fn new_event(&self) -> SyncResult<Arc<Event>> {
        self.create_event(None)
    }

    /// Like [`new_event`](Self::new_event), attaching an opaque payload
    pub fn new_event_with(&self, details: EventDetails) -> SyncResult<Arc<Event>> {
        self.create_event(Some(details))
    }

    fn create_event(&self, details: Option<EventDetails>) -> SyncResult<Arc<Event>> {
        if !self.is_publishing() {
            return Err(SyncError::PublishingDisabled);
        }
        let event = Event::new(self.ids.next_id(), details, Utc::now(), self.clock.now());
        debug!(event = event.id(), virtual_time = %event.virtual_time(), "event created");
        Ok(Arc::new(event))
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Cancellation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Token that stops the advance loop when cancelled
    pub fn kill_handle(&self) -> CancellationToken {
        self.kill.read().clone()
    }

    /// Ask the advance loop to stop at its next tick boundary
    pub fn kill(&self) {
        self.kill.read().cancel();
    }

    /// Install a fresh token so the loop can run again after a kill
    ///
    /// Handles obtained earlier keep pointing at the old token.
    pub fn rearm(&self) {
        *self.kill.write() = CancellationToken::new();
    }

    /// Whether an advance loop is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Real-time pause between loop iterations
    pub fn tick_pause(&self) -> StdDuration {
        self.tick_pause
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Inspection
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Serializable view of the clock and every member's events
    ///
    /// Taken under the registry's exclusive lock, so no tick can step the
    /// clock between copying the members and reading the clock.
    pub fn snapshot(&self) -> SyncSnapshot {
        self.members.snapshot_with(|members| {
            let state = self.clock.state();
            SyncSnapshot {
                members,
                start: state.start,
                current: state.current,
                elapsed_ms: state.elapsed.num_milliseconds(),
                interval_ms: state.interval.num_milliseconds(),
                end: state.end,
                publish_events: self.is_publishing(),
            }
        })
    }
}

impl<B: ClockBackend + std::fmt::Debug> std::fmt::Debug for Synchronizer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("clock", &self.clock)
            .field("members", &self.members)
            .field("publish_events", &self.is_publishing())
            .field("running", &self.is_running())
            .field("tick_pause", &self.tick_pause)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of a synchronizer
#[derive(Debug, Clone, Serialize)]
pub struct SyncSnapshot {
    /// Outstanding events per member, keys sorted
    pub members: BTreeMap<String, Vec<Arc<Event>>>,
    /// Start of the current run
    pub start: VirtualInstant,
    /// Present virtual time
    pub current: VirtualInstant,
    /// `current - start` in milliseconds
    pub elapsed_ms: i64,
    /// Step size in milliseconds
    pub interval_ms: i64,
    /// End of the current run
    pub end: VirtualInstant,
    /// Whether event creation is permitted
    pub publish_events: bool,
}

impl SyncSnapshot {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Elapsed virtual time as a duration
    pub fn elapsed(&self) -> Duration {
        Duration::milliseconds(self.elapsed_ms)
    }
}
