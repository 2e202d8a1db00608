//! Polling detection of composition edits.
//!
//! The host sends no notification when the composition text changes, so
//! while a composition is on screen the poller re-reads it on a short fixed
//! interval and brailles the full text whenever it differs from what was
//! last seen.
//!
//! The poller is a two-state machine:
//!
//! ```text
//!   Idle --start--> Active --tick (still composing)--> Active
//!     ^                |
//!     +------stop------+  (tick finds no composition, fault, or terminate)
//! ```
//!
//! `last_seen` belongs to the poller alone. It is deliberately not the
//! cursor model's content: navigation must not mask an edit here, and an
//! edit seen here must not reset the inferred cursor.

use std::time::Duration;

use crate::error::HostError;
use crate::host::{active_composition, Lookup, OutputChannels, Task, TimerId, Timers};
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollStatus {
    #[default]
    Idle,
    Active,
}

/// What the poller remembers between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    pub last_seen: String,
    pub status: PollStatus,
    /// Registration of the next tick while Active
    pub pending: Option<TimerId>,
}

/// Result of handling one timer expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The expiry was not the tick we are waiting for
    Stale,
    /// No qualifying composition any more; the poller is Idle
    Stopped,
    /// Content equals `last_seen`; nothing emitted
    Unchanged,
    /// Content changed and was brailled
    Changed,
}

#[derive(Debug, Clone)]
pub struct ChangePoller {
    interval: Duration,
    class_marker: String,
    braille: bool,
    state: PollState,
}

impl ChangePoller {
    pub fn new(config: &Config) -> Self {
        Self {
            interval: config.poll_interval(),
            class_marker: config.class_marker.clone(),
            braille: config.braille_composition_changes,
            state: PollState::default(),
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn status(&self) -> PollStatus {
        self.state.status
    }

    pub fn is_active(&self) -> bool {
        self.state.status == PollStatus::Active
    }

    pub fn last_seen(&self) -> &str {
        &self.state.last_seen
    }

    /// Move from Idle to Active and schedule the first tick.
    ///
    /// Returns `false` (and does nothing) when already Active.
    pub fn start<T: Timers + ?Sized>(&mut self, timers: &mut T) -> bool {
        if self.is_active() {
            return false;
        }
        self.state.status = PollStatus::Active;
        self.state.pending = Some(timers.schedule(self.interval, Task::PollTick));
        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "poller started");
        true
    }

    /// Handle the expiry of timer `id`.
    ///
    /// On `Err` the pending registration has already been consumed; the
    /// caller is expected to [`stop`](Self::stop) the poller.
    pub fn tick<H>(&mut self, host: &mut H, id: TimerId) -> Result<TickOutcome, HostError>
    where
        H: Lookup + Timers + OutputChannels + ?Sized,
    {
        if !self.is_active() || self.state.pending != Some(id) {
            return Ok(TickOutcome::Stale);
        }
        self.state.pending = None;

        let Some(composition) = active_composition(&*host, &self.class_marker)? else {
            self.stop(host);
            return Ok(TickOutcome::Stopped);
        };

        let outcome = if composition.content != self.state.last_seen {
            tracing::debug!(
                previous = %self.state.last_seen,
                current = %composition.content,
                "composition changed"
            );
            if self.braille {
                host.braille_message(&composition.content);
            }
            self.state.last_seen = composition.content;
            TickOutcome::Changed
        } else {
            TickOutcome::Unchanged
        };

        self.state.pending = Some(host.schedule(self.interval, Task::PollTick));
        Ok(outcome)
    }

    /// Cancel the pending tick and return to Idle. Safe to call repeatedly.
    pub fn stop<T: Timers + ?Sized>(&mut self, timers: &mut T) {
        if let Some(id) = self.state.pending.take() {
            timers.cancel(id);
        }
        if self.is_active() {
            tracing::debug!("poller stopped");
        }
        self.state.status = PollStatus::Idle;
        self.state.last_seen.clear();
    }
}
