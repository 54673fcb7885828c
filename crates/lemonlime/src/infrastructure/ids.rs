//! Identifier suppliers for new events.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of unique, opaque event identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce an identifier not returned before by this generator
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs, the default supplier
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `prefix-0`, `prefix-1`, ... for reproducible test runs
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    /// Counter starting at zero
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
