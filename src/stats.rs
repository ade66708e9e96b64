//! Count-up animation for dashboard stat cards.

use std::time::{Duration, Instant};

pub const ANIMATION_DURATION: Duration = Duration::from_millis(1000);

/// Interval between animation frames.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy)]
pub struct NumberAnimation {
    start: i64,
    end: i64,
    duration: Duration,
    started_at: Instant,
}

impl NumberAnimation {
    pub fn new(start: i64, end: i64, started_at: Instant) -> Self {
        Self {
            start,
            end,
            duration: ANIMATION_DURATION,
            started_at,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn target(&self) -> i64 {
        self.end
    }

    fn increment(&self) -> f64 {
        let frames = self.duration.as_secs_f64() / FRAME.as_secs_f64();
        (self.end - self.start) as f64 / frames
    }

    /// Displayed value at `now`, stepping once per frame and snapping to the target.
    pub fn value_at(&self, now: Instant) -> i64 {
        if self.duration.is_zero() {
            return self.end;
        }
        let increment = self.increment();
        if increment == 0.0 {
            return self.end;
        }

        let elapsed = now.saturating_duration_since(self.started_at);
        let steps = (elapsed.as_millis() / FRAME.as_millis()) as f64;
        let current = self.start as f64 + increment * steps;

        let done = (increment > 0.0 && current >= self.end as f64)
            || (increment < 0.0 && current <= self.end as f64);
        if done { self.end } else { current.round() as i64 }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.value_at(now) == self.end
    }
}
