//! Longest continuous up/down interval tracking.
//!
//! Only period endpoints are stored; the full probe history never is.
//! Closed periods are offered to the tracker the moment a transition is
//! detected, and the still-open period is evaluated lazily at report time.

use chrono::{DateTime, Local};
use std::time::Duration;

/// One contiguous period the target stayed in a single state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LongestInterval {
    pub duration: Duration,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl LongestInterval {
    /// Build an interval, clamping a negative span (clock going backwards) to zero.
    pub fn between(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self {
            duration: (end - start).to_std().unwrap_or_default(),
            start,
            end,
        }
    }

    /// `true` once a non-zero interval has been recorded.
    pub fn is_some(&self) -> bool {
        !self.duration.is_zero()
    }
}

/// Which side of the up/down state machine an interval belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Up,
    Down,
}

/// Keeps the longest uptime and the longest downtime seen so far.
#[derive(Clone, Debug)]
pub struct IntervalTracker {
    uptime: Option<LongestInterval>,
    downtime: Option<LongestInterval>,
}

impl IntervalTracker {
    pub fn new() -> Self {
        Self {
            uptime: None,
            downtime: None,
        }
    }

    /// Offer the period `[start, reference]` as a candidate for `kind`.
    ///
    /// Replaces the stored interval only on a strictly longer duration,
    /// so the earliest of several equally long periods wins.
    pub fn observe(&mut self, kind: Period, start: DateTime<Local>, reference: DateTime<Local>) {
        let candidate = LongestInterval::between(start, reference);
        let slot = match kind {
            Period::Up => &mut self.uptime,
            Period::Down => &mut self.downtime,
        };
        if Self::beats(slot.as_ref(), &candidate) {
            *slot = Some(candidate);
        }
    }

    /// Longest recorded interval of `kind`, also considering the open period
    /// `[open_start, now]` without storing it.
    pub fn longest_at(
        &self,
        kind: Period,
        open: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> Option<LongestInterval> {
        let stored = match kind {
            Period::Up => self.uptime,
            Period::Down => self.downtime,
        };
        let candidate = open.map(|start| LongestInterval::between(start, now));
        let best = match (stored, candidate) {
            (Some(s), Some(c)) if Self::beats(Some(&s), &c) => Some(c),
            (Some(s), _) => Some(s),
            (None, c) => c,
        };
        best.filter(LongestInterval::is_some)
    }

    fn beats(stored: Option<&LongestInterval>, candidate: &LongestInterval) -> bool {
        match stored {
            Some(s) => candidate.duration > s.duration,
            None => candidate.is_some(),
        }
    }
}

impl Default for IntervalTracker {
    fn default() -> Self {
        Self::new()
    }
}
