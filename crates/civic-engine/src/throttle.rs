//! Trailing-edge pass throttle.
//!
//! A burst of triggers yields exactly one deferred run. The first trigger
//! after an idle period schedules a run one interval out (and never
//! sooner than one interval after the previous run); further triggers
//! while that run is pending are absorbed. A forced run cancels the
//! pending deadline and records itself as the latest run.
//!
//! The type is clock-free: every method takes `now`, so tests drive it
//! with synthetic instants.

use std::time::{Duration, Instant};

/// Coalesces recomputation triggers into deferred runs.
#[derive(Clone, Debug)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    pending: Option<Instant>,
}

impl Throttle {
    /// A throttle that spaces runs `interval` apart.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            pending: None,
        }
    }

    /// The configured spacing.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Request a run. Returns when it is due.
    ///
    /// If a run is already pending its deadline is returned unchanged.
    pub fn trigger(&mut self, now: Instant) -> Instant {
        if let Some(due) = self.pending {
            return due;
        }
        let mut due = now + self.interval;
        if let Some(last) = self.last_run {
            due = due.max(last + self.interval);
        }
        self.pending = Some(due);
        due
    }

    /// When the pending run is due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Whether a run is pending.
    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Claim the pending run if it is due at `now`.
    ///
    /// Returns `true` at most once per scheduled run.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(due) if now >= due => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Note that a full run happened at `now`, throttled or forced.
    ///
    /// Later triggers are spaced from this run. A pending run is left
    /// alone; forced runs [`cancel`](Self::cancel) it first.
    pub fn record_run(&mut self, now: Instant) {
        self.last_run = Some(now);
    }

    /// Drop the pending run without running.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
