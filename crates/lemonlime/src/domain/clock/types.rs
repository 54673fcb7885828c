//! Virtual Clock Types
//!
//! Timestamps are `chrono::DateTime<Utc>` and steps are `chrono::Duration`,
//! so a simulation can start at any calendar date and step by days as
//! easily as by milliseconds.

use chrono::{DateTime, Duration, Utc};

/// A point on the virtual timeline
pub type VirtualInstant = DateTime<Utc>;

/// Default step size for one advance
pub fn default_interval() -> Duration {
    Duration::seconds(1)
}

/// Default distance between start and end
pub fn default_span() -> Duration {
    Duration::hours(24)
}

/// Snapshot of every clock field
///
/// # Invariants
/// - `current >= start`
/// - `elapsed == current - start`
/// - `current - start` is a whole multiple of `interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    /// Where the current run began
    pub start: VirtualInstant,
    /// Present virtual time
    pub current: VirtualInstant,
    /// Virtual time accumulated since `start`
    pub elapsed: Duration,
    /// Size of one advance
    pub interval: Duration,
    /// Exclusive upper bound of the advance loop
    pub end: VirtualInstant,
}

impl ClockState {
    /// Fresh clock at `start` with the default interval and span
    pub fn starting_at(start: VirtualInstant) -> Self {
        Self::rebased(start, default_interval(), start + default_span())
    }

    /// Clock re-based at `start` with zero elapsed time
    pub fn rebased(start: VirtualInstant, interval: Duration, end: VirtualInstant) -> Self {
        Self {
            start,
            current: start,
            elapsed: Duration::zero(),
            interval,
            end,
        }
    }

    /// Where one more advance would land, `None` on calendar overflow
    pub fn next_instant(&self) -> Option<VirtualInstant> {
        self.current.checked_add_signed(self.interval)
    }

    /// Move forward by one interval
    ///
    /// Returns `false` and leaves the state untouched if the step would
    /// overflow the calendar.
    pub fn step(&mut self) -> bool {
        let Some(next) = self.next_instant() else {
            return false;
        };
        let Some(elapsed) = self.elapsed.checked_add(&self.interval) else {
            return false;
        };
        self.current = next;
        self.elapsed = elapsed;
        true
    }

    /// Whether the loop condition `current < end` still holds
    pub fn is_before_end(&self) -> bool {
        self.current < self.end
    }

    /// Whether one more step would land beyond `end`
    pub fn would_overshoot(&self) -> bool {
        self.next_instant().map_or(true, |next| next > self.end)
    }
}

/// Result of a single gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock moved to the contained instant
    Advanced(VirtualInstant),
    /// Outstanding events held the clock in place
    Blocked {
        /// Number of events still registered across all members
        outstanding: usize,
    },
    /// The next step would pass the configured end
    WouldOvershoot,
}

/// Why the advance loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// `current` reached `end` (or the next step would pass it)
    ReachedEnd,
    /// The cancellation token fired
    Cancelled,
    /// Another loop is already driving this synchronizer
    AlreadyRunning,
    /// The interval was zero or negative, so the loop could never finish
    InvalidInterval,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> VirtualInstant {
        Utc.with_ymd_and_hms(2007, 8, 1, 1, 1, 1).unwrap()
    }

    #[test]
    fn test_starting_at_defaults() {
        let state = ClockState::starting_at(t0());
        assert_eq!(state.current, t0());
        assert_eq!(state.elapsed, Duration::zero());
        assert_eq!(state.interval, Duration::seconds(1));
        assert_eq!(state.end, t0() + Duration::hours(24));
    }

    #[test]
    fn test_step_keeps_elapsed_in_sync() {
        let mut state = ClockState::rebased(t0(), Duration::seconds(7), t0() + Duration::minutes(1));
        for _ in 0..5 {
            assert!(state.step());
            assert_eq!(state.elapsed, state.current - state.start);
        }
        assert_eq!(state.elapsed, Duration::seconds(35));
    }

    #[test]
    fn test_overshoot_detection() {
        let mut state = ClockState::rebased(t0(), Duration::seconds(7), t0() + Duration::seconds(10));
        assert!(!state.would_overshoot());
        state.step();
        assert!(state.is_before_end());
        assert!(state.would_overshoot());
    }

    #[test]
    fn test_exact_multiple_reaches_end() {
        let mut state = ClockState::rebased(t0(), Duration::seconds(5), t0() + Duration::seconds(10));
        state.step();
        assert!(!state.would_overshoot());
        state.step();
        assert!(!state.is_before_end());
        assert_eq!(state.current, state.end);
    }

    #[test]
    fn test_step_refuses_calendar_overflow() {
        let mut state = ClockState::rebased(DateTime::<Utc>::MAX_UTC, Duration::seconds(1), DateTime::<Utc>::MAX_UTC);
        assert!(!state.step());
        assert_eq!(state.current, DateTime::<Utc>::MAX_UTC);
        assert!(state.would_overshoot());
    }
}
