//! Zoom/pan viewport and the debounce that commits it as a date range.

use std::time::{Duration, Instant};

/// How long the viewport must stay still before it becomes the panel's range.
pub const DATE_RANGE_DEBOUNCE: Duration = Duration::from_secs(1);

/// Narrowest window the viewport zooms to.
const MIN_SPAN_MS: i64 = 1000;

/// A visible time window in unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Viewport {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        let (start_ms, end_ms) = if start_ms <= end_ms {
            (start_ms, end_ms)
        } else {
            (end_ms, start_ms)
        };
        Self { start_ms, end_ms }
    }

    pub fn span(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Scale the window around its center. Factors below 1 zoom in.
    pub fn zoom(&self, factor: f64) -> Self {
        let center = self.start_ms + self.span() / 2;
        let span = ((self.span() as f64 * factor).round() as i64).max(MIN_SPAN_MS);
        Self::new(center - span / 2, center - span / 2 + span)
    }

    /// Shift the window by a fraction of its span. Negative moves back in time.
    pub fn pan(&self, fraction: f64) -> Self {
        let shift = (self.span() as f64 * fraction).round() as i64;
        Self::new(self.start_ms + shift, self.end_ms + shift)
    }
}

/// A value that only becomes ready after it stops changing for `delay`.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value and restart the delay.
    pub fn set(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if its delay has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, since)) if now.saturating_duration_since(*since) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without committing it.
    pub fn clear(&mut self) {
        self.pending = None;
    }
}
