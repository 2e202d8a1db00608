//! Deferred, corrected feedback for navigation steps.
//!
//! The host reacts to the same arrow key with its own (wrong) feedback a few
//! tens of milliseconds later, and there is no way to pre-empt it. The fix is
//! ordering by time: our announcement is registered with a delay that safely
//! exceeds the host's latency, and when it fires it first cuts off whatever
//! speech is still in flight.

use std::time::Duration;

use crate::gesture::Direction;
use crate::host::{OutputChannels, Task, TimerId, Timers};
use crate::Config;

/// One character to announce, and the step that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub character: char,
    pub direction: Direction,
}

#[derive(Debug, Clone)]
pub struct FeedbackScheduler {
    delay: Duration,
    speak: bool,
    braille: bool,
}

impl FeedbackScheduler {
    pub fn new(config: &Config) -> Self {
        Self {
            delay: config.announce_delay(),
            speak: config.speak_announcements,
            braille: config.braille_announcements,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register the announcement. Nothing is emitted now; the host's default
    /// feedback for this key is already on its way.
    pub fn schedule<T: Timers + ?Sized>(
        &self,
        timers: &mut T,
        character: char,
        direction: Direction,
    ) -> TimerId {
        let id = timers.schedule(
            self.delay,
            Task::Announce(Announcement {
                character,
                direction,
            }),
        );
        tracing::debug!(
            %character,
            direction = direction.as_str(),
            delay_ms = self.delay.as_millis() as u64,
            "announcement scheduled"
        );
        id
    }

    /// Emit a due announcement: cancel speech, speak, then braille.
    pub fn deliver<O: OutputChannels + ?Sized>(
        &self,
        output: &mut O,
        announcement: &Announcement,
    ) {
        let text = announcement.character.to_string();
        tracing::debug!(character = %text, "announcing");
        if self.speak {
            output.cancel_speech();
            output.speak(&text);
        }
        if self.braille {
            output.braille_message(&text);
        }
    }
}
