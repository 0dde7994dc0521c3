//! Session clock and frame pacing.
//!
//! Every frame tick is stamped with monotonic nanoseconds relative to the
//! session epoch. Hold timers and cooldowns compare these stamps directly,
//! so a delayed tick never accumulates drift.

use std::time::Instant;

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Nanoseconds elapsed since session start.
    pub fn now_ns(&self) -> TimestampNs {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert a nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs * 1_000_000_000.0) as u64
    }

    /// Seconds from `earlier` to `later`, zero if the stamps are out of order.
    pub fn secs_between(earlier: TimestampNs, later: TimestampNs) -> f64 {
        Self::ns_to_secs(later.saturating_sub(earlier))
    }
}

/// Frame rate controller used to pace replayed frames.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true. Frames up to a quarter interval
    /// early still count, so a jittery source at the target rate is not thinned.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        let slack = self.target_interval_ns / 4;
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns + slack >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.now_ns() < 1_000_000_000);
    }

    #[test]
    fn test_ns_to_secs_conversion() {
        assert!((SessionClock::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
        assert_eq!(SessionClock::secs_to_ns(2.0), 2_000_000_000);
    }

    #[test]
    fn test_secs_between_saturates() {
        assert!((SessionClock::secs_between(1_000_000_000, 3_500_000_000) - 2.5).abs() < 1e-9);
        assert_eq!(SessionClock::secs_between(5, 1), 0.0);
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::new(20);
        assert!(ctrl.should_tick(0));
        assert!(!ctrl.should_tick(10_000_000));
        assert!(ctrl.should_tick(50_000_000));
        // Slightly early frames still tick; a 60 Hz source is thinned.
        assert!(ctrl.should_tick(99_000_000));
        assert!(!ctrl.should_tick(115_000_000));
    }
}
