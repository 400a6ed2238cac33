//! Progress update throttling

use std::time::{Duration, Instant};

/// Decides which progress observations become state updates
///
/// An observation is emitted when `interval` has elapsed since the last
/// emission, or (determinate mode) when the fraction has advanced by at least
/// `min_delta` since the last emission. The first observation always passes.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    interval: Duration,
    min_delta: f32,
    last_emit: Option<Instant>,
    last_fraction: f32,
}

impl ProgressThrottle {
    #[must_use]
    pub fn new(interval: Duration, min_delta: f32) -> Self {
        Self {
            interval,
            min_delta,
            last_emit: None,
            last_fraction: 0.0,
        }
    }

    /// Record an observation; returns whether it should be emitted
    pub fn observe(&mut self, now: Instant, fraction: Option<f32>) -> bool {
        let due = self
            .last_emit
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        let advanced = fraction.is_some_and(|f| f - self.last_fraction >= self.min_delta);

        if !(due || advanced) {
            return false;
        }
        self.last_emit = Some(now);
        if let Some(f) = fraction {
            self.last_fraction = f;
        }
        true
    }

    /// Whether a closing 100% update is still owed
    #[must_use]
    pub fn needs_final(&self) -> bool {
        self.last_fraction < 1.0
    }

    /// Record the closing 100% update
    pub fn finish(&mut self, now: Instant) {
        self.last_emit = Some(now);
        self.last_fraction = 1.0;
    }
}
