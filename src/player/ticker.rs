//! Fixed-interval schedule for the progress refresh.
//!
//! The event loop polls the ticker instead of sleeping on it, so the refresh
//! runs on the UI thread and stops for good once cancelled.

use std::time::{Duration, Instant};

pub struct ProgressTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl ProgressTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Schedule the first refresh one interval from `now`, replacing any
    /// schedule already running.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Whether a refresh is due at `now`. A due tick is consumed and the next
    /// one is scheduled on the original cadence; missed ticks collapse into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(mut due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        while due <= now {
            due += self.interval;
        }
        self.next_due = Some(due);
        true
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
