//! Lightweight timing utilities for optional performance tracing.
//!
//! A [`TimingGuard`] records the elapsed duration of a scoped operation and
//! logs it when dropped. Guards only emit when the global logger enables the
//! requested level for the telemetry target, so the overhead is negligible
//! when tracing is off.

use std::{
    borrow::Cow,
    time::{Duration, Instant},
};

use log::{Level, log, log_enabled};

/// Log target used for all timing output (`RUST_LOG=digit::telemetry=debug`).
pub const TELEMETRY_TARGET: &str = "digit::telemetry";

/// RAII helper that logs how long an operation took when dropped.
pub struct TimingGuard {
    label: Cow<'static, str>,
    level: Level,
    start: Instant,
    active: bool,
}

impl TimingGuard {
    /// Returns `true` when the guard will emit a log entry on drop.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the elapsed duration since the guard was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Consume the guard and return the elapsed duration without logging.
    pub fn finish(mut self) -> Duration {
        let duration = self.start.elapsed();
        self.active = false;
        duration
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if self.active {
            let duration = self.start.elapsed();
            log!(
                target: TELEMETRY_TARGET,
                self.level,
                "{} completed in {:.2?}",
                self.label,
                duration
            );
        }
    }
}

/// Create a timing guard that logs at the provided level when that level is
/// enabled for the telemetry target.
pub fn timing_guard(label: impl Into<Cow<'static, str>>, level: Level) -> TimingGuard {
    TimingGuard {
        label: label.into(),
        level,
        start: Instant::now(),
        active: log_enabled!(target: TELEMETRY_TARGET, level),
    }
}
