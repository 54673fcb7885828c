//! Events - units of outstanding work that hold the clock in place.
//!
//! An event is created by the synchronizer, registered under a member key,
//! marked complete by the task that consumed it, and finally popped. Only
//! the pop removes it; completion alone never unblocks the clock.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::clock::VirtualInstant;

/// Opaque caller payload attached to an event
pub type EventDetails = serde_json::Value;

/// Pending work stamped with the wall-clock and virtual-clock time of its
/// creation
///
/// Events are shared as `Arc<Event>` between the registry and the task
/// that owns the work, so completion is an atomic flag rather than a
/// `&mut` setter.
#[derive(Debug, Serialize)]
pub struct Event {
    id: String,
    #[serde(serialize_with = "serialize_flag")]
    complete: AtomicBool,
    details: Option<EventDetails>,
    real_time: DateTime<Utc>,
    virtual_time: VirtualInstant,
}

impl Event {
    pub(crate) fn new(
        id: String,
        details: Option<EventDetails>,
        real_time: DateTime<Utc>,
        virtual_time: VirtualInstant,
    ) -> Self {
        Self {
            id,
            complete: AtomicBool::new(false),
            details,
            real_time,
            virtual_time,
        }
    }

    /// Unique identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the owning task has finished with this event
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Mark the event complete
    ///
    /// Idempotent. The event stays registered (and keeps blocking the
    /// clock) until it is popped with `Synchronizer::pop_event`.
    pub fn complete_event(&self) {
        self.complete.store(true, Ordering::Release);
    }

    /// Caller payload, never inspected by the synchronizer
    pub fn details(&self) -> Option<&EventDetails> {
        self.details.as_ref()
    }

    /// Wall-clock time at creation
    pub fn real_time(&self) -> DateTime<Utc> {
        self.real_time
    }

    /// Virtual time at creation
    pub fn virtual_time(&self) -> VirtualInstant {
        self.virtual_time
    }
}

fn serialize_flag<S: Serializer>(flag: &AtomicBool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(flag.load(Ordering::Acquire))
}
