//! # Synchronizer Configuration
//!
//! File-backed settings for building a [`crate::Synchronizer`]. Every field
//! has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! start = "2007-08-01T01:01:01Z"   # omitted: wall clock at build time
//! interval_ms = 1000
//! span_secs = 86400                 # ignored when `end` is present
//! # end = "2007-08-02T01:01:01Z"
//! tick_pause_ms = 25
//! publish_events = false
//! ```

use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::clock::VirtualInstant;
use crate::error::{ConfigError, SyncError, SyncResult};

/// Default real-time pause between loop iterations
pub const DEFAULT_TICK_PAUSE_MS: u64 = 25;

/// Clock and loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynchronizerConfig {
    /// First instant of the virtual timeline
    pub start: Option<VirtualInstant>,

    /// Virtual step size in milliseconds
    pub interval_ms: u64,

    /// Distance from start to end in seconds
    pub span_secs: u64,

    /// Explicit end instant, overrides `span_secs`
    pub end: Option<VirtualInstant>,

    /// Real-time pause between loop iterations in milliseconds
    pub tick_pause_ms: u64,

    /// Whether `new_event` is permitted from the start
    pub publish_events: bool,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            start: None,
            interval_ms: 1_000,
            span_secs: 86_400,
            end: None,
            tick_pause_ms: DEFAULT_TICK_PAUSE_MS,
            publish_events: false,
        }
    }
}

impl SynchronizerConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Reject intervals that would never finish and ends before the start
    pub fn validate(&self) -> SyncResult<()> {
        if self.interval_ms == 0 {
            return Err(SyncError::InvalidConfig("interval_ms must be positive".into()));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(SyncError::InvalidConfig(format!(
                    "end {end} is before start {start}"
                )));
            }
        }
        Ok(())
    }

    /// Virtual step as a chrono duration
    pub fn interval(&self) -> SyncResult<Duration> {
        i64::try_from(self.interval_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .ok_or_else(|| SyncError::InvalidConfig("interval_ms out of range".into()))
    }

    /// Configured start, or the present moment
    pub fn resolve_start(&self) -> VirtualInstant {
        self.start.unwrap_or_else(Utc::now)
    }

    /// Configured end, or `start + span_secs`
    pub fn resolve_end(&self, start: VirtualInstant) -> SyncResult<VirtualInstant> {
        if let Some(end) = self.end {
            return Ok(end);
        }
        i64::try_from(self.span_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|span| start.checked_add_signed(span))
            .ok_or_else(|| SyncError::InvalidConfig("span_secs out of range".into()))
    }

    /// Real-time pause between loop iterations
    pub fn tick_pause(&self) -> StdDuration {
        StdDuration::from_millis(self.tick_pause_ms)
    }
}
