//! Session clock and scan pacing.
//!
//! A scan session records when it started so the exit summary can report
//! throughput, and paces frame pulls to the configured scan interval.

use std::time::{Duration, Instant};

/// Monotonic clock anchored at session start.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Local::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Events per minute over the session so far.
    pub fn per_minute(&self, count: u64) -> f64 {
        let secs = self.elapsed_secs();
        if secs <= f64::EPSILON {
            return 0.0;
        }
        count as f64 * 60.0 / secs
    }
}

/// Keeps successive ticks at least `interval` apart.
#[derive(Debug)]
pub struct ScanPacer {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl ScanPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
        }
    }

    /// Build a pacer from a millisecond interval.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Time still to wait before the next tick is due, measured at `now`.
    /// The first call never waits.
    pub fn remaining_at(&self, now: Instant) -> Duration {
        match self.last_tick {
            None => Duration::ZERO,
            Some(last) => (last + self.interval).saturating_duration_since(now),
        }
    }

    /// Block until the next tick is due, then record it.
    pub fn wait(&mut self) {
        let remaining = self.remaining_at(Instant::now());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.last_tick = Some(Instant::now());
    }

    /// Record a tick at `now` without sleeping.
    pub fn mark(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_secs() < 1.0);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_first_tick_is_immediate() {
        let pacer = ScanPacer::from_millis(100);
        assert_eq!(pacer.remaining_at(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_pacer_remaining_shrinks() {
        let mut pacer = ScanPacer::from_millis(100);
        let t0 = Instant::now();
        pacer.mark(t0);
        assert_eq!(pacer.remaining_at(t0), Duration::from_millis(100));
        assert_eq!(
            pacer.remaining_at(t0 + Duration::from_millis(40)),
            Duration::from_millis(60)
        );
        assert_eq!(
            pacer.remaining_at(t0 + Duration::from_millis(250)),
            Duration::ZERO
        );
    }
}
