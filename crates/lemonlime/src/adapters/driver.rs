//! Background-thread runner for the advance loop.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::Duration;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::domain::clock::{ClockBackend, LoopExit, VirtualInstant, VirtualTime};
use crate::domain::synchronizer::Synchronizer;

const THREAD_NAME: &str = "lemonlime-bang";

/// Spawns [`VirtualTime::bang`] on a dedicated thread
pub struct BangDriver;

impl BangDriver {
    /// Start the loop with explicit parameters
    pub fn spawn<B: ClockBackend + 'static>(
        sync: Arc<Synchronizer<B>>,
        start: VirtualInstant,
        interval: Duration,
        end: VirtualInstant,
    ) -> io::Result<DriverHandle> {
        let kill = sync.kill_handle();
        let join = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || sync.bang(start, interval, end))?;
        Ok(DriverHandle { join, kill })
    }

    /// Start the loop from the present virtual time, with the configured
    /// interval and end
    ///
    /// Any manual [`advance`](VirtualTime::advance) already taken is kept
    /// as the new start; elapsed time is reset by the loop's rebase.
    pub fn spawn_configured<B: ClockBackend + 'static>(
        sync: Arc<Synchronizer<B>>,
    ) -> io::Result<DriverHandle> {
        let state = sync.clock().state();
        Self::spawn(sync, state.current, state.interval, state.end)
    }
}

/// Handle to a running advance loop
#[derive(Debug)]
pub struct DriverHandle {
    join: JoinHandle<LoopExit>,
    kill: CancellationToken,
}

impl DriverHandle {
    /// Request a stop at the next tick boundary
    pub fn stop(&self) {
        self.kill.cancel();
    }

    /// Whether the loop thread has returned
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to return
    ///
    /// A panic inside the loop is logged and reported as `Cancelled`.
    pub fn join(self) -> LoopExit {
        self.join.join().unwrap_or_else(|_| {
            error!("advance loop thread panicked");
            LoopExit::Cancelled
        })
    }

    /// Stop the loop and wait for it
    pub fn shutdown(self) -> LoopExit {
        self.stop();
        self.join()
    }
}
