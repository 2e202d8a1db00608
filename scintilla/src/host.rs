//! In-process Scintilla host.
//!
//! `SimHost` implements every collaborator contract the tracker needs over
//! an [`ObjectTree`], a virtual-time [`TimerQueue`], and a transcript of
//! everything that was spoken or brailled. It also plays the part of the
//! real host's own caret feedback: every step key pressed inside a
//! composition produces the host's (wrong) default announcement after a
//! short latency, so the race the tracker exists to win is visible in the
//! transcript.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use caretfix_core::{
    CompositionSnapshot, HostError, KeyHook, Lookup, OutputChannels, Task, TimerId, TimerQueue,
    Timers,
};

use crate::object_tree::{ObjectId, ObjectTree, ParentChainLocator};

/// Who produced an output event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The host's built-in caret feedback
    Host,
    /// The caret tracker
    Tracker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum OutputKind {
    Speak(String),
    Cancel,
    Braille(String),
}

/// One line of the output transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEvent {
    pub at_ms: u64,
    pub origin: Origin,
    #[serde(flatten)]
    pub kind: OutputKind,
}

impl std::fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let origin = match self.origin {
            Origin::Host => "host",
            Origin::Tracker => "tracker",
        };
        match &self.kind {
            OutputKind::Speak(text) => write!(f, "[{:>5}] {:<7} speak   {}", self.at_ms, origin, text),
            OutputKind::Cancel => write!(f, "[{:>5}] {:<7} cancel", self.at_ms, origin),
            OutputKind::Braille(text) => {
                write!(f, "[{:>5}] {:<7} braille {}", self.at_ms, origin, text)
            }
        }
    }
}

#[derive(Debug)]
pub struct SimHost {
    tree: ObjectTree,
    locator: ParentChainLocator,
    timers: TimerQueue,
    key_hook: bool,
    /// Host default feedback waiting to be spoken, keyed by (due time, sequence)
    default_feedback: BTreeMap<(Duration, u64), String>,
    feedback_seq: u64,
    transcript: Vec<OutputEvent>,
}

impl SimHost {
    pub fn new(locator: ParentChainLocator) -> Self {
        Self {
            tree: ObjectTree::new(),
            locator,
            timers: TimerQueue::new(),
            key_hook: false,
            default_feedback: BTreeMap::new(),
            feedback_seq: 0,
            transcript: Vec::new(),
        }
    }

    pub fn tree(&self) -> &ObjectTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ObjectTree {
        &mut self.tree
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn key_hook_installed(&self) -> bool {
        self.key_hook
    }

    pub fn transcript(&self) -> &[OutputEvent] {
        &self.transcript
    }

    pub fn take_transcript(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.transcript)
    }

    /// Queue the host's own feedback for a caret move.
    pub fn queue_default_feedback(&mut self, latency: Duration, text: &str) {
        let due = self.now() + latency;
        self.default_feedback
            .insert((due, self.feedback_seq), text.to_string());
        self.feedback_seq += 1;
    }

    /// Earliest pending event of either kind.
    pub fn next_deadline(&self) -> Option<Duration> {
        let feedback = self.default_feedback.keys().next().map(|(due, _)| *due);
        match (feedback, self.timers.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Speak any host feedback due at or before `until`, in order, up to
    /// (and including) the deadline of the next tracker timer. Returns the
    /// next tracker timer due at or before `until`, if any.
    ///
    /// Host feedback due at the same instant as a tracker timer goes first.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Task)> {
        loop {
            let timer_due = self.timers.next_deadline().filter(|due| *due <= until);
            let feedback_key = self
                .default_feedback
                .keys()
                .next()
                .copied()
                .filter(|(due, _)| *due <= until);

            match (feedback_key, timer_due) {
                (Some(key), timer) if timer.map_or(true, |t| key.0 <= t) => {
                    if let Some(text) = self.default_feedback.remove(&key) {
                        self.timers.advance_to(key.0);
                        self.record(Origin::Host, OutputKind::Speak(text));
                    }
                }
                (_, Some(_)) => return self.timers.pop_due(until),
                _ => return None,
            }
        }
    }

    pub fn advance_to(&mut self, time: Duration) {
        self.timers.advance_to(time);
    }

    fn record(&mut self, origin: Origin, kind: OutputKind) {
        let at_ms = self.now().as_millis() as u64;
        self.transcript.push(OutputEvent {
            at_ms,
            origin,
            kind,
        });
    }
}

impl Lookup for SimHost {
    type Handle = ObjectId;

    fn focus(&self) -> Result<Option<ObjectId>, HostError> {
        Ok(self.tree.focus())
    }

    fn class_name(&self, handle: &ObjectId) -> Result<Option<String>, HostError> {
        self.tree.window_class(*handle, self.locator.max_depth())
    }

    fn locate_composition(
        &self,
        handle: &ObjectId,
    ) -> Result<Option<CompositionSnapshot>, HostError> {
        self.locator.locate(&self.tree, *handle)
    }
}

impl Timers for SimHost {
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        self.timers.schedule(delay, task)
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.cancel(id);
    }
}

impl OutputChannels for SimHost {
    fn speak(&mut self, text: &str) {
        self.record(Origin::Tracker, OutputKind::Speak(text.to_string()));
    }

    fn cancel_speech(&mut self) {
        self.record(Origin::Tracker, OutputKind::Cancel);
    }

    fn braille_message(&mut self, text: &str) {
        self.record(Origin::Tracker, OutputKind::Braille(text.to_string()));
    }
}

impl KeyHook for SimHost {
    fn install_key_hook(&mut self) -> Result<(), HostError> {
        if self.key_hook {
            return Err(HostError::KeyHook("already installed".to_string()));
        }
        self.key_hook = true;
        Ok(())
    }

    fn remove_key_hook(&mut self) -> Result<(), HostError> {
        if !self.key_hook {
            return Err(HostError::KeyHook("not installed".to_string()));
        }
        self.key_hook = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_host_feedback_before_timer_at_same_instant() {
        let mut host = SimHost::new(ParentChainLocator::new(8));
        host.schedule(ms(25), Task::PollTick);
        host.queue_default_feedback(ms(25), "blank");

        let (_, task) = host.pop_due(ms(100)).unwrap();
        assert_eq!(task, Task::PollTick);
        assert_eq!(host.transcript().len(), 1);
        assert_eq!(host.transcript()[0].kind, OutputKind::Speak("blank".to_string()));
        assert_eq!(host.transcript()[0].origin, Origin::Host);
        assert_eq!(host.transcript()[0].at_ms, 25);
    }

    #[test]
    fn test_feedback_only() {
        let mut host = SimHost::new(ParentChainLocator::new(8));
        host.queue_default_feedback(ms(25), "blank");

        assert!(host.pop_due(ms(20)).is_none());
        assert!(host.transcript().is_empty());
        assert!(host.pop_due(ms(30)).is_none());
        assert_eq!(host.transcript().len(), 1);
        assert_eq!(host.next_deadline(), None);
    }

    #[test]
    fn test_key_hook_double_install() {
        let mut host = SimHost::new(ParentChainLocator::new(8));
        host.install_key_hook().unwrap();
        assert!(host.install_key_hook().is_err());
        host.remove_key_hook().unwrap();
        assert!(host.remove_key_hook().is_err());
    }

    #[test]
    fn test_display() {
        let event = OutputEvent {
            at_ms: 150,
            origin: Origin::Tracker,
            kind: OutputKind::Speak("o".to_string()),
        };
        assert_eq!(event.to_string(), "[  150] tracker speak   o");
    }
}
