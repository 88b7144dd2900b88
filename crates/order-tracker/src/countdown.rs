//! # Countdown Clock
//!
//! Turns the server's absolute ready-time estimate into an `m:ss` string that
//! ticks down locally. Recomputing the string never touches the network; it
//! only reads the wall clock through [`Clock`].

use crate::model::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" for the countdown.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Timestamp(u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX))
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(start.as_nanos())),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.nanos.store(now.as_nanos(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.nanos.load(Ordering::SeqCst))
    }
}

/// Formats a remaining duration as `m:ss`. Minutes are unpadded.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Holds the latest estimate and renders it against the current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Countdown {
    estimate: Option<Timestamp>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn estimate(&self) -> Option<Timestamp> {
        self.estimate
    }

    /// Installs a freshly fetched estimate.
    ///
    /// Returns `true` when the value differs from the one already held, which
    /// is the caller's cue to restart its tick timer.
    pub fn set_estimate(&mut self, estimate: Timestamp) -> bool {
        let changed = self.estimate != Some(estimate);
        self.estimate = Some(estimate);
        changed
    }

    pub fn clear(&mut self) {
        self.estimate = None;
    }

    /// `None` when there is no estimate; `"0:00"` once the estimate has passed.
    pub fn render(&self, now: Timestamp) -> Option<String> {
        self.estimate
            .map(|estimate| format_remaining(estimate.remaining_from(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_are_zero_padded() {
        assert_eq!(format_remaining(Duration::from_secs(303)), "5:03");
        assert_eq!(format_remaining(Duration::from_secs(60)), "1:00");
        assert_eq!(format_remaining(Duration::from_secs(0)), "0:00");
    }

    #[test]
    fn sub_second_remainders_are_truncated() {
        assert_eq!(format_remaining(Duration::from_millis(59_999)), "0:59");
    }

    #[test]
    fn no_estimate_renders_nothing() {
        let countdown = Countdown::new();
        assert_eq!(countdown.render(Timestamp::from_secs(10)), None);
    }

    #[test]
    fn counts_down_one_second_per_tick() {
        let clock = ManualClock::new(Timestamp::from_secs(1_000));
        let mut countdown = Countdown::new();
        countdown.set_estimate(Timestamp::from_secs(1_125));

        assert_eq!(countdown.render(clock.now()).as_deref(), Some("2:05"));
        clock.advance(Duration::from_secs(1));
        assert_eq!(countdown.render(clock.now()).as_deref(), Some("2:04"));
        clock.advance(Duration::from_secs(1));
        assert_eq!(countdown.render(clock.now()).as_deref(), Some("2:03"));
    }

    #[test]
    fn holds_at_zero_once_the_estimate_has_passed() {
        let clock = ManualClock::new(Timestamp::from_secs(500));
        let mut countdown = Countdown::new();
        countdown.set_estimate(Timestamp::from_secs(502));

        clock.advance(Duration::from_secs(2));
        assert_eq!(countdown.render(clock.now()).as_deref(), Some("0:00"));
        clock.advance(Duration::from_secs(90));
        assert_eq!(countdown.render(clock.now()).as_deref(), Some("0:00"));

        // A fresh estimate may jump the display back up.
        assert!(countdown.set_estimate(Timestamp::from_secs(700)));
        assert_eq!(countdown.render(clock.now()).as_deref(), Some("1:48"));
    }

    #[test]
    fn same_estimate_is_not_a_change() {
        let mut countdown = Countdown::new();
        assert!(countdown.set_estimate(Timestamp(5)));
        assert!(!countdown.set_estimate(Timestamp(5)));
        countdown.clear();
        assert_eq!(countdown.estimate(), None);
    }
}
