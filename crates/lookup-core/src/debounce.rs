#![forbid(unsafe_code)]

//! Cancellable delayed actions driven by caller-supplied timestamps.
//!
//! A [`Debouncer`] is scheduled on one event (pointer leaves a region) and
//! cancelled by another (pointer re-enters). The host loop polls it with the
//! current time; the action fires at most once per schedule.
//!
//! # Invariants
//!
//! 1. `poll` returns `true` exactly once per schedule, and only when
//!    `now >= scheduled_at + delay`.
//! 2. Re-scheduling while pending restarts the delay from the new timestamp.
//! 3. `cancel` discards the pending action; a later `poll` returns `false`.
//!
//! Time is never read internally, so every transition is reproducible in
//! tests by passing synthetic [`Instant`]s.

use std::time::{Duration, Instant};

/// A single cancellable delayed action.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    /// Diagnostic: number of times the action fired.
    fired: u64,
}

impl Debouncer {
    /// Create an idle debouncer with the given delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            fired: 0,
        }
    }

    /// Configured delay.
    #[inline]
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule (or restart) the action relative to `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Discard the pending action. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether an action is waiting to fire.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the pending action fires, if any.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Fire the action if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.fired += 1;
                true
            }
            _ => false,
        }
    }

    /// Number of times the action has fired (diagnostic).
    #[inline]
    #[must_use]
    pub const fn fired_count(&self) -> u64 {
        self.fired
    }
}
