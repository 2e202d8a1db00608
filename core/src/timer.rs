//! Deterministic virtual-time timer queue.
//!
//! A `TimerQueue` implements the host timer contract without touching a real
//! clock. The embedding loop pops due tasks in firing order and feeds them
//! back to the tracker. Registrations that share a deadline fire in the order
//! they were made.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::host::{Task, TimerId, Timers};

#[derive(Debug, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    /// Pending tasks ordered by (deadline, registration order)
    pending: BTreeMap<(Duration, TimerId), Task>,
    deadlines: HashMap<TimerId, Duration>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest task due at or before `until`, moving the clock to its
    /// deadline. Returns `None` once nothing is due; the clock is left alone
    /// so the caller can finish with [`advance_to`](Self::advance_to).
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Task)> {
        let key = *self.pending.keys().next()?;
        if key.0 > until {
            return None;
        }
        let task = self.pending.remove(&key)?;
        self.deadlines.remove(&key.1);
        self.now = self.now.max(key.0);
        Some((key.1, task))
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }
}

impl Timers for TimerQueue {
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.pending.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(deadline) = self.deadlines.remove(&id) {
            self.pending.remove(&(deadline, id));
        }
    }
}
