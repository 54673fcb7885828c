//! Wall-clock passthrough backend.
//!
//! Reports real UTC time. `step()` is a no-op because real time moves on
//! its own, so a synchronizer built on this backend only waits for `end`
//! or cancellation. Useful in tests that want the gating API without a
//! simulated timeline.
//!
//! The advance loop's overshoot check still applies: once real time is
//! less than one `interval` short of `end`, the next tick reports
//! `WouldOvershoot` and the loop returns `ReachedEnd` early, up to one
//! interval before `end`.

use chrono::{Duration, Utc};
use parking_lot::RwLock;

use super::backend::ClockBackend;
use super::types::{default_interval, default_span, ClockState, VirtualInstant};

#[derive(Debug, Clone, Copy)]
struct Bounds {
    origin: VirtualInstant,
    interval: Duration,
    end: VirtualInstant,
}

/// Clock backend that passes the system clock through
#[derive(Debug)]
pub struct WallClockBackend {
    bounds: RwLock<Bounds>,
}

impl WallClockBackend {
    /// Passthrough anchored at the present moment with a 24 hour span
    pub fn new() -> Self {
        let origin = Utc::now();
        Self {
            bounds: RwLock::new(Bounds {
                origin,
                interval: default_interval(),
                end: origin + default_span(),
            }),
        }
    }
}

impl Default for WallClockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockBackend for WallClockBackend {
    fn state(&self) -> ClockState {
        let bounds = *self.bounds.read();
        let current = Utc::now();
        ClockState {
            start: bounds.origin,
            current,
            elapsed: current - bounds.origin,
            interval: bounds.interval,
            end: bounds.end,
        }
    }

    fn step(&self) -> VirtualInstant {
        Utc::now()
    }

    fn rebase(&self, start: VirtualInstant, interval: Duration, end: VirtualInstant) {
        *self.bounds.write() = Bounds {
            origin: start,
            interval,
            end,
        };
    }
}
