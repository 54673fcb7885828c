//! Integration Tests - gated advancement end to end
//!
//! These tests drive the advance loop on a background thread while the
//! test thread plays the role of members publishing and completing work.

use std::sync::Arc;
use std::thread;
use std::time::{Duration as StdDuration, Instant};

use chrono::{Duration, TimeZone, Utc};
use lemonlime::*;

fn t0() -> VirtualInstant {
    Utc.with_ymd_and_hms(2007, 8, 1, 1, 1, 1).unwrap()
}

fn synchronizer(pause_ms: u64) -> Arc<Synchronizer> {
    Arc::new(
        SynchronizerBuilder::new(t0())
            .tick_pause(StdDuration::from_millis(pause_ms))
            .publish_events(true)
            .build()
            .unwrap(),
    )
}

// Scenario: no members, loop runs uninterrupted to its end
mod free_running {
    use super::*;

    #[test]
    fn test_reaches_end_with_no_members() {
        let sync = synchronizer(1);
        let handle =
            BangDriver::spawn(Arc::clone(&sync), t0(), Duration::seconds(1), t0() + Duration::seconds(10))
                .unwrap();

        assert_eq!(handle.join(), LoopExit::ReachedEnd);
        assert_eq!(sync.now(), t0() + Duration::seconds(10));
        assert_eq!(sync.total_elapsed(), Duration::seconds(10));
    }

    #[test]
    fn test_idle_members_do_not_block() {
        let sync = synchronizer(1);
        sync.register_member("a");
        sync.register_member("b");

        let exit = sync.bang(t0(), Duration::seconds(1), t0() + Duration::seconds(4));
        assert_eq!(exit, LoopExit::ReachedEnd);
        assert_eq!(sync.total_elapsed(), Duration::seconds(4));
    }
}

// Scenario: an incomplete event freezes the clock until completed and popped
mod backpressure {
    use super::*;

    #[test]
    fn test_incomplete_event_freezes_clock() {
        let sync = synchronizer(1);
        sync.register_member("m");
        let event = sync.new_event().unwrap();
        sync.register_event("m", Arc::clone(&event));

        let handle =
            BangDriver::spawn(Arc::clone(&sync), t0(), Duration::seconds(1), t0() + Duration::seconds(5))
                .unwrap();

        thread::sleep(StdDuration::from_millis(50));
        assert_eq!(sync.now(), t0());
        assert!(!handle.is_finished());

        // Completion alone is not enough
        event.complete_event();
        thread::sleep(StdDuration::from_millis(20));
        assert_eq!(sync.now(), t0());

        assert_eq!(sync.pop_event("m", event.id()), PopOutcome::Removed);
        assert_eq!(handle.join(), LoopExit::ReachedEnd);
        assert_eq!(sync.now(), t0() + Duration::seconds(5));
    }

    #[test]
    fn test_pop_of_incomplete_event_keeps_blocking() {
        let sync = synchronizer(1);
        let event = sync.new_event().unwrap();
        sync.register_event("m", Arc::clone(&event));

        assert_eq!(sync.pop_event("m", event.id()), PopOutcome::EventNotFound);
        assert_eq!(sync.get_member("m").unwrap().len(), 1);
        assert!(!sync.can_advance());
    }

    #[test]
    fn test_clear_events_overrides_incomplete_work() {
        let sync = synchronizer(1);
        sync.register_member("stuck");
        sync.register_event("stuck", sync.new_event().unwrap());

        let handle =
            BangDriver::spawn(Arc::clone(&sync), t0(), Duration::seconds(1), t0() + Duration::seconds(3))
                .unwrap();
        thread::sleep(StdDuration::from_millis(20));
        assert_eq!(sync.now(), t0());

        assert_eq!(sync.clear_events("stuck"), ClearOutcome::Cleared(1));
        assert_eq!(handle.join(), LoopExit::ReachedEnd);
        assert_eq!(sync.total_elapsed(), Duration::seconds(3));
    }

    #[test]
    fn test_workers_publish_and_drain_concurrently() {
        let sync = synchronizer(1);
        let handle =
            BangDriver::spawn(Arc::clone(&sync), t0(), Duration::seconds(1), t0() + Duration::seconds(20))
                .unwrap();

        let workers: Vec<_> = (0..4)
            .map(|n| {
                let sync = Arc::clone(&sync);
                thread::spawn(move || {
                    let key = format!("worker-{n}");
                    for _ in 0..25 {
                        let event = sync.new_event().unwrap();
                        sync.register_event(&key, Arc::clone(&event));
                        event.complete_event();
                        assert_eq!(sync.pop_event(&key, event.id()), PopOutcome::Removed);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(handle.join(), LoopExit::ReachedEnd);
        assert_eq!(sync.outstanding_events(), 0);
        assert_eq!(sync.total_elapsed(), Duration::seconds(20));
    }

    #[test]
    fn test_clock_never_moves_while_event_registered() {
        let sync = Arc::new(
            SynchronizerBuilder::new(t0())
                .interval(Duration::milliseconds(1))
                .span(Duration::days(365))
                .tick_pause(StdDuration::ZERO)
                .publish_events(true)
                .build()
                .unwrap(),
        );
        let handle = BangDriver::spawn(
            Arc::clone(&sync),
            t0(),
            Duration::milliseconds(1),
            t0() + Duration::days(365),
        )
        .unwrap();

        let mut moved = 0;
        for _ in 0..20_000 {
            let event = sync.new_event().unwrap();
            sync.register_event("m", Arc::clone(&event));
            let held = sync.now();
            thread::yield_now();
            if sync.now() != held {
                moved += 1;
            }
            event.complete_event();
            assert_eq!(sync.pop_event("m", event.id()), PopOutcome::Removed);
        }

        assert_eq!(handle.shutdown(), LoopExit::Cancelled);
        assert_eq!(moved, 0);
    }

    #[test]
    fn test_snapshot_of_blocked_loop_shows_held_clock() {
        let sync = synchronizer(0);
        let event = sync.new_event().unwrap();
        sync.register_event("m", Arc::clone(&event));
        let handle =
            BangDriver::spawn(Arc::clone(&sync), t0(), Duration::seconds(1), t0() + Duration::seconds(5))
                .unwrap();

        for _ in 0..1_000 {
            let snapshot = sync.snapshot();
            assert_eq!(snapshot.members["m"].len(), 1);
            assert_eq!(snapshot.current, t0());
            assert_eq!(snapshot.elapsed(), Duration::zero());
        }

        event.complete_event();
        sync.pop_event("m", event.id());
        assert_eq!(handle.join(), LoopExit::ReachedEnd);

        let snapshot = sync.snapshot();
        assert!(snapshot.members["m"].is_empty());
        assert_eq!(snapshot.current, t0() + Duration::seconds(5));
        assert_eq!(snapshot.elapsed(), Duration::seconds(5));
    }
}

// Scenario: cancellation is observed at the next tick boundary
mod cancellation {
    use super::*;

    #[test]
    fn test_cancel_right_after_start() {
        let sync = synchronizer(200);
        let handle =
            BangDriver::spawn(Arc::clone(&sync), t0(), Duration::seconds(1), t0() + Duration::seconds(10))
                .unwrap();

        let asked = Instant::now();
        sync.kill();

        assert_eq!(handle.join(), LoopExit::Cancelled);
        assert!(asked.elapsed() < StdDuration::from_secs(2));
        assert!(sync.total_elapsed() <= Duration::seconds(1));
    }

    #[test]
    fn test_rearm_allows_another_run() {
        let sync = synchronizer(1);
        sync.kill();
        assert_eq!(
            sync.bang(t0(), Duration::seconds(1), t0() + Duration::seconds(2)),
            LoopExit::Cancelled
        );

        sync.rearm();
        assert_eq!(
            sync.bang(t0(), Duration::seconds(1), t0() + Duration::seconds(2)),
            LoopExit::ReachedEnd
        );
        assert_eq!(sync.total_elapsed(), Duration::seconds(2));
    }

    #[test]
    fn test_kill_handle_from_another_thread() {
        let sync = synchronizer(1);
        sync.register_event("m", sync.new_event().unwrap());
        let kill = sync.kill_handle();

        let handle =
            BangDriver::spawn(Arc::clone(&sync), t0(), Duration::seconds(1), t0() + Duration::seconds(10))
                .unwrap();
        thread::spawn(move || kill.cancel()).join().unwrap();

        assert_eq!(handle.join(), LoopExit::Cancelled);
        assert_eq!(sync.now(), t0());
    }
}

// Passthrough clock: the same gate over real time
mod wall_clock {
    use super::*;

    #[test]
    fn test_wall_clock_loop_stops_on_kill() {
        let sync = Arc::new(
            SynchronizerBuilder::new(t0())
                .tick_pause(StdDuration::from_millis(1))
                .build_with_backend(WallClockBackend::new()),
        );
        let now = Utc::now();
        let handle =
            BangDriver::spawn(Arc::clone(&sync), now, Duration::milliseconds(1), now + Duration::hours(1))
                .unwrap();

        thread::sleep(StdDuration::from_millis(10));
        assert!(sync.is_running());
        assert_eq!(handle.shutdown(), LoopExit::Cancelled);
        assert!(sync.total_elapsed() >= Duration::zero());
    }

    #[test]
    fn test_wall_clock_loop_stops_one_interval_short_of_end() {
        let sync = SynchronizerBuilder::new(t0())
            .tick_pause(StdDuration::from_millis(1))
            .build_with_backend(WallClockBackend::new());
        let now = Utc::now();
        let end = now + Duration::minutes(30);

        assert_eq!(sync.bang(now, Duration::hours(1), end), LoopExit::ReachedEnd);
        assert!(sync.now() < end);
    }
}
