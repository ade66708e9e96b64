//! Deadline-based debouncer polled from the frame loop.

use std::time::{Duration, Instant};

/// Quiet period used for live preview updates.
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    /// Fire on the first event of a burst instead of after it
    leading: bool,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            deadline: None,
        }
    }

    pub fn leading(wait: Duration) -> Self {
        Self {
            leading: true,
            ..Self::new(wait)
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Records an event. Returns `true` when the handler should run right now
    /// (leading mode, first event of a burst).
    pub fn trigger(&mut self, now: Instant) -> bool {
        let fire_now = self.leading && self.deadline.is_none_or(|d| now >= d);
        self.deadline = Some(now + self.wait);
        fire_now
    }

    /// Returns `true` once when the quiet period after the last event has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                !self.leading
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Time left until the deadline, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(PREVIEW_DEBOUNCE);

        assert!(!debouncer.trigger(start));
        assert!(!debouncer.trigger(start + ms(100)));
        assert!(!debouncer.trigger(start + ms(200)));

        assert!(!debouncer.poll(start + ms(450)));
        assert!(debouncer.poll(start + ms(500)));
        assert!(!debouncer.poll(start + ms(900)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        debouncer.trigger(start);
        debouncer.cancel();
        assert!(!debouncer.is_armed());
        assert!(!debouncer.poll(start + ms(1000)));
    }

    #[test]
    fn leading_mode_fires_at_burst_start() {
        let start = Instant::now();
        let mut debouncer = Debouncer::leading(ms(300));
        assert!(debouncer.trigger(start));
        assert!(!debouncer.trigger(start + ms(100)));
        assert!(!debouncer.poll(start + ms(400)));
        assert!(debouncer.trigger(start + ms(800)));
    }

    #[test]
    fn remaining_counts_down() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(300));
        assert_eq!(debouncer.remaining(start), None);
        debouncer.trigger(start);
        assert_eq!(debouncer.remaining(start + ms(100)), Some(ms(200)));
    }
}
