//! Deadline timer for the retransmission engine.
//!
//! Replaces a process-wide alarm signal with a value owned by the loop that
//! waits on it. Reads are bounded by [`RetransmitTimer::deadline`]; reaching
//! the deadline is the timer event.

use std::time::Duration;

use tokio::time::Instant;

/// One-shot, re-armable deadline.
#[derive(Debug, Clone)]
pub struct RetransmitTimer {
    /// Length of one timeout window.
    period: Duration,
    /// Current deadline, if armed.
    deadline: Option<Instant>,
}

impl RetransmitTimer {
    /// Create a disarmed timer with the given window length.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Length of one timeout window.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start a new window from now, replacing any previous deadline.
    pub fn arm(&mut self) -> Instant {
        let deadline = Instant::now() + self.period;
        self.deadline = Some(deadline);
        deadline
    }

    /// Cancel the current window.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Check if a window is running.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The instant the current window ends.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left in the current window (zero once elapsed).
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Check if the current window has ended.
    pub fn has_elapsed(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}
