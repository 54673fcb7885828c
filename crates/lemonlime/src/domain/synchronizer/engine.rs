//! Advance Loop - the gated tick
//!
//! # State Machine
//!
//! ```text
//!            ┌──────────── blocked / advanced (sleep tick_pause) ───┐
//!            ▼                                                      │
//!  bang ─► RUNNING ──(can_advance? step : skip)─────────────────────┘
//!            │
//!            ├── current >= end ──────────► STOPPED (ReachedEnd)
//!            ├── next step passes end ────► STOPPED (ReachedEnd)
//!            └── kill token cancelled ────► STOPPED (Cancelled)
//! ```
//!
//! Cancellation is checked before the gate on every iteration and never
//! waited on, so a kill is observed within one `tick_pause`.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Duration;
use tracing::{info, trace, warn};

use super::Synchronizer;
use crate::domain::clock::{ClockBackend, LoopExit, TickOutcome, VirtualInstant, VirtualTime};

/// Clears the running flag even if the loop unwinds
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: ClockBackend> Synchronizer<B> {
    /// One gate check: step the clock if no member has outstanding events
    ///
    /// The check and the step run under the registry's shared lock, so an
    /// event registered concurrently lands either before the check (and
    /// blocks) or after the step. Refuses to step past the configured end.
    pub fn tick(&self) -> TickOutcome {
        // Lock order: registry, then clock.
        let gated = self.members.when_idle(|| {
            if self.clock.state().would_overshoot() {
                TickOutcome::WouldOvershoot
            } else {
                TickOutcome::Advanced(self.clock.step())
            }
        });
        gated.unwrap_or_else(|outstanding| TickOutcome::Blocked { outstanding })
    }

    fn run_loop(&self, start: VirtualInstant, interval: Duration, end: VirtualInstant) -> LoopExit {
        if interval <= Duration::zero() {
            warn!(interval_ms = interval.num_milliseconds(), "advance loop refused: interval must be positive");
            return LoopExit::InvalidInterval;
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("advance loop refused: already running");
            return LoopExit::AlreadyRunning;
        }
        let _running = RunningGuard(&self.running);

        self.clock.rebase(start, interval, end);
        info!(%start, %end, interval_ms = interval.num_milliseconds(), "⏱ advance loop started");

        let exit = loop {
            if !self.clock.state().is_before_end() {
                break LoopExit::ReachedEnd;
            }
            if self.kill.read().is_cancelled() {
                info!("kill");
                break LoopExit::Cancelled;
            }

            match self.tick() {
                TickOutcome::Advanced(now) => {
                    trace!(%now, elapsed_ms = self.clock.total_elapsed().num_milliseconds(), "time / elapsed");
                }
                TickOutcome::Blocked { outstanding } => {
                    trace!(outstanding, "can't advance");
                }
                TickOutcome::WouldOvershoot => break LoopExit::ReachedEnd,
            }

            std::thread::sleep(self.tick_pause);
        };

        let state = self.clock.state();
        info!(
            ?exit,
            current = %state.current,
            elapsed_ms = state.elapsed.num_milliseconds(),
            "advance loop stopped"
        );
        exit
    }
}

impl<B: ClockBackend> VirtualTime for Synchronizer<B> {
    fn now(&self) -> VirtualInstant {
        self.clock.now()
    }

    fn total_elapsed(&self) -> Duration {
        self.clock.total_elapsed()
    }

    fn advance(&self) {
        let now = self.clock.step();
        trace!(%now, "manual advance");
    }

    fn bang(&self, start: VirtualInstant, interval: Duration, end: VirtualInstant) -> LoopExit {
        self.run_loop(start, interval, end)
    }
}
