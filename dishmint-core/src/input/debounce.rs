//! Edge debouncing

use embassy_time::{Duration, Instant};

/// Minimum-spacing debouncer for one input
///
/// An edge is accepted when at least `interval` has passed since the last
/// accepted edge. Rejected edges do not restart the window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last_accepted: Option<Instant>,
}

impl Debouncer {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: None,
        }
    }

    /// Returns true if the edge at `at` counts as a press
    pub fn accept(&mut self, at: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if at.saturating_duration_since(last) < self.interval {
                return false;
            }
        }
        self.last_accepted = Some(at);
        true
    }
}
