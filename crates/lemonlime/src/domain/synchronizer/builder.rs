//! Builder for stepped synchronizers.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::warn;

use super::Synchronizer;
use crate::domain::clock::{
    default_interval, default_span, ClockBackend, SteppedBackend, VirtualInstant,
};
use crate::error::{SyncError, SyncResult};
use crate::infrastructure::config::{SynchronizerConfig, DEFAULT_TICK_PAUSE_MS};
use crate::infrastructure::ids::{IdGenerator, UuidGenerator};

/// Factory for [`Synchronizer`]s with non-default settings
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use lemonlime::{SynchronizerBuilder, VirtualTime};
///
/// let start = Utc.with_ymd_and_hms(2007, 8, 1, 1, 1, 1).unwrap();
/// let sync = SynchronizerBuilder::new(start)
///     .interval(Duration::days(1))
///     .span(Duration::days(365))
///     .publish_events(true)
///     .build()
///     .unwrap();
///
/// sync.advance();
/// assert_eq!(sync.total_elapsed(), Duration::days(1));
/// ```
pub struct SynchronizerBuilder {
    start: VirtualInstant,
    interval: Duration,
    end: Option<VirtualInstant>,
    span: Duration,
    tick_pause: StdDuration,
    publish_events: bool,
    ids: Arc<dyn IdGenerator>,
}

impl SynchronizerBuilder {
    /// Builder with default configuration
    ///
    /// Defaults:
    /// - 1 second interval
    /// - End 24 hours after start
    /// - 25 ms pause between loop iterations
    /// - Publishing disabled
    /// - Random UUID event ids
    pub fn new(start: VirtualInstant) -> Self {
        Self {
            start,
            interval: default_interval(),
            end: None,
            span: default_span(),
            tick_pause: StdDuration::from_millis(DEFAULT_TICK_PAUSE_MS),
            publish_events: false,
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Builder seeded from a config file's settings
    pub fn from_config(config: &SynchronizerConfig) -> SyncResult<Self> {
        config.validate()?;
        let start = config.resolve_start();
        Ok(Self::new(start)
            .interval(config.interval()?)
            .end(config.resolve_end(start)?)
            .tick_pause(config.tick_pause())
            .publish_events(config.publish_events))
    }

    /// Set the virtual step size
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set an explicit end instant
    pub fn end(mut self, end: VirtualInstant) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the end relative to start; ignored when `end` is set
    pub fn span(mut self, span: Duration) -> Self {
        self.span = span;
        self
    }

    /// Set the real-time pause between loop iterations
    pub fn tick_pause(mut self, pause: StdDuration) -> Self {
        self.tick_pause = pause;
        self
    }

    /// Open the event gate from the start
    pub fn publish_events(mut self, enabled: bool) -> Self {
        self.publish_events = enabled;
        self
    }

    /// Replace the event id supplier
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Build a stepped synchronizer
    ///
    /// # Errors
    /// [`SyncError::InvalidConfig`] for a non-positive interval or an end
    /// before the start.
    pub fn build(self) -> SyncResult<Synchronizer> {
        let end = match self.end {
            Some(end) => end,
            None => self
                .start
                .checked_add_signed(self.span)
                .ok_or_else(|| SyncError::InvalidConfig("span overflows the calendar".into()))?,
        };
        if self.interval <= Duration::zero() {
            warn!(interval_ms = self.interval.num_milliseconds(), "rejected non-positive interval");
            return Err(SyncError::InvalidConfig("interval must be positive".into()));
        }
        if end < self.start {
            return Err(SyncError::InvalidConfig(format!(
                "end {end} is before start {}",
                self.start
            )));
        }

        let clock = SteppedBackend::with_params(self.start, self.interval, end);
        Ok(self.build_with_backend(clock))
    }

    /// Build over a custom clock backend, keeping the loop settings
    pub fn build_with_backend<B: ClockBackend>(self, clock: B) -> Synchronizer<B> {
        Synchronizer::assemble(clock, self.publish_events, self.tick_pause, self.ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::{VirtualTime, WallClockBackend};
    use chrono::{TimeZone, Utc};

    fn t0() -> VirtualInstant {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_builder_defaults_match_from_date() {
        let built = SynchronizerBuilder::new(t0()).build().unwrap();
        let plain = Synchronizer::from_date(t0());
        assert_eq!(built.clock().state(), plain.clock().state());
        assert_eq!(built.tick_pause(), plain.tick_pause());
        assert_eq!(built.is_publishing(), plain.is_publishing());
    }

    #[test]
    fn test_explicit_end_wins_over_span() {
        let end = t0() + Duration::minutes(5);
        let sync = SynchronizerBuilder::new(t0())
            .span(Duration::days(2))
            .end(end)
            .build()
            .unwrap();
        assert_eq!(sync.clock().state().end, end);
    }

    #[test]
    fn test_rejects_negative_interval() {
        let err = SynchronizerBuilder::new(t0())
            .interval(Duration::seconds(-1))
            .build()
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_end_before_start() {
        let result = SynchronizerBuilder::new(t0())
            .end(t0() - Duration::seconds(1))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config() {
        let config = SynchronizerConfig {
            start: Some(t0()),
            interval_ms: 500,
            span_secs: 60,
            publish_events: true,
            ..Default::default()
        };
        let sync = Synchronizer::from_config(&config).unwrap();
        let state = sync.clock().state();

        assert_eq!(state.start, t0());
        assert_eq!(state.interval, Duration::milliseconds(500));
        assert_eq!(state.end, t0() + Duration::seconds(60));
        assert!(sync.is_publishing());
    }

    #[test]
    fn test_build_with_wall_clock_backend() {
        let sync = SynchronizerBuilder::new(t0())
            .publish_events(true)
            .build_with_backend(WallClockBackend::new());
        let before = Utc::now();
        assert!(sync.now() >= before);
        assert!(sync.new_event().is_ok());
    }
}
