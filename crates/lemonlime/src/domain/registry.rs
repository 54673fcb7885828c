//! # Member Registry
//!
//! Thread-safe map from member key to the events that member still has
//! outstanding. The whole map sits behind one `RwLock`:
//! - `can_advance()`, `get()` and `when_idle()` take the shared lock
//! - every mutation, including `clear()` and `pop()`, takes the exclusive lock
//! - `snapshot_with()` takes the exclusive lock so it excludes `when_idle()`
//!
//! Keys are caller-defined partitions. Nothing requires a key to name a
//! long-lived subscriber; an event's own id is a valid key.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::event::Event;
use crate::error::{SyncError, SyncResult};

// ============================================================================
// OUTCOMES
// ============================================================================

/// What `pop` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    /// A matching complete event was removed
    Removed,
    /// The member key is not registered
    MemberNotFound,
    /// No event with that id is both present and complete
    EventNotFound,
}

/// What `clear` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The member's list was emptied; holds the number of discarded events
    Cleared(usize),
    /// The member key is not registered
    MemberNotFound,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Outstanding events grouped by member key
#[derive(Debug, Default)]
pub struct MemberRegistry {
    members: RwLock<HashMap<String, Vec<Arc<Event>>>>,
}

impl MemberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or reset the list for `key`
    ///
    /// Re-registering an existing member discards its events.
    pub fn register_member(&self, key: &str) {
        let previous = self.members.write().insert(key.to_owned(), Vec::new());
        match previous {
            Some(events) if !events.is_empty() => {
                info!(member = key, discarded = events.len(), "member re-registered");
            }
            _ => info!(member = key, "member registered"),
        }
    }

    /// Append `event` to the list for `key`, creating the list if needed
    ///
    /// Event ids are not checked for uniqueness.
    pub fn register_event(&self, key: &str, event: Arc<Event>) {
        let mut members = self.members.write();
        if !members.contains_key(key) {
            debug!(member = key, "member not found, registering");
        }
        debug!(member = key, event = event.id(), "event registered");
        members.entry(key.to_owned()).or_default().push(event);
    }

    /// Drop every event for `key`, complete or not
    pub fn clear(&self, key: &str) -> ClearOutcome {
        let mut members = self.members.write();
        let Some(events) = members.get_mut(key) else {
            warn!(member = key, "clear_events: member not found");
            return ClearOutcome::MemberNotFound;
        };

        let discarded = events.len();
        events.clear();
        debug!(member = key, discarded, "events cleared");
        ClearOutcome::Cleared(discarded)
    }

    /// Remove the first complete event named `event_id` under `key`
    ///
    /// Incomplete events are skipped even if the id matches. The remaining
    /// events keep their relative order.
    pub fn pop(&self, key: &str, event_id: &str) -> PopOutcome {
        let mut members = self.members.write();
        let Some(events) = members.get_mut(key) else {
            warn!(member = key, "pop_event: member not found");
            return PopOutcome::MemberNotFound;
        };

        match events
            .iter()
            .position(|event| event.id() == event_id && event.is_complete())
        {
            Some(index) => {
                events.remove(index);
                debug!(member = key, event = event_id, "pop_event: removing");
                PopOutcome::Removed
            }
            None => {
                warn!(member = key, event = event_id, "pop_event: event not found");
                PopOutcome::EventNotFound
            }
        }
    }

    /// Events currently outstanding for `key`
    pub fn get(&self, key: &str) -> SyncResult<Vec<Arc<Event>>> {
        self.members.read().get(key).cloned().ok_or_else(|| {
            debug!(member = key, "member not found");
            SyncError::MemberNotFound(key.to_owned())
        })
    }

    /// True iff no member has an outstanding event
    pub fn can_advance(&self) -> bool {
        self.members.read().values().all(Vec::is_empty)
    }

    /// Run `f` only if no member has an outstanding event
    ///
    /// The shared lock is held for the whole call, so no event can be
    /// registered between the emptiness check and `f`. `f` must not call
    /// back into the registry. Returns the outstanding count when blocked.
    pub fn when_idle<R>(&self, f: impl FnOnce() -> R) -> Result<R, usize> {
        let members = self.members.read();
        let outstanding: usize = members.values().map(Vec::len).sum();
        if outstanding > 0 {
            return Err(outstanding);
        }
        Ok(f())
    }

    /// Total number of outstanding events across all members
    pub fn outstanding(&self) -> usize {
        self.members.read().values().map(Vec::len).sum()
    }

    /// Registered member keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.members.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registered members
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Whether no member is registered
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Sorted copy of the whole map, taken under one shared lock
    pub fn snapshot(&self) -> BTreeMap<String, Vec<Arc<Event>>> {
        Self::copy(&self.members.read())
    }

    /// Sorted copy of the map handed to `f` while the exclusive lock is held
    ///
    /// Excludes every [`when_idle`](Self::when_idle) section, so `f` can read
    /// state those sections mutate and see it agree with the copy.
    pub fn snapshot_with<R>(&self, f: impl FnOnce(BTreeMap<String, Vec<Arc<Event>>>) -> R) -> R {
        let members = self.members.write();
        f(Self::copy(&members))
    }

    fn copy(members: &HashMap<String, Vec<Arc<Event>>>) -> BTreeMap<String, Vec<Arc<Event>>> {
        members
            .iter()
            .map(|(key, events)| (key.clone(), events.clone()))
            .collect()
    }
}
