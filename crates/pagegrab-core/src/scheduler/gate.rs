//! Minimum-interval gate between request starts.

use std::time::{Duration, Instant};

/// Enforces `min_interval` between the start of successive requests.
#[derive(Debug, Clone)]
pub struct RateGate {
    min_interval: Duration,
    last_start: Option<Instant>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_start(&self) -> Option<Instant> {
        self.last_start
    }

    /// Earliest instant the next request may start.
    pub fn next_allowed(&self) -> Option<Instant> {
        self.last_start.map(|t| t + self.min_interval)
    }

    /// Time left until the gate opens, measured from `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_allowed()
            .map(|next| next.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Record that a request starts now and return that instant.
    pub fn mark(&mut self) -> Instant {
        let now = Instant::now();
        self.last_start = Some(now);
        now
    }
}
