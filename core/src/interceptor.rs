//! Key-event observation and cursor reconciliation.
//!
//! Runs for every raw key event before the host dispatches it. It never
//! consumes the key; it only looks at the focused composition, keeps the
//! poller alive, and turns left/right steps into scheduled announcements.

use crate::cursor::CursorModel;
use crate::error::HostError;
use crate::feedback::FeedbackScheduler;
use crate::gesture::{Direction, KeyGesture, StepKeys};
use crate::host::{active_composition, Lookup, Timers};
use crate::poller::ChangePoller;
use crate::Config;

/// What a key event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Focus is elsewhere or nothing is being composed
    NotApplicable,
    /// A composition is active but the key is not a step
    Observed,
    /// The step would leave the composition; nothing announced
    Boundary { direction: Direction, offset: usize },
    /// The cursor moved and `character` was scheduled for announcement
    Moved {
        direction: Direction,
        offset: usize,
        character: Option<char>,
    },
}

#[derive(Debug, Clone)]
pub struct NavigationInterceptor {
    class_marker: String,
    keys: StepKeys,
}

impl NavigationInterceptor {
    pub fn new(config: &Config) -> Self {
        Self {
            class_marker: config.class_marker.clone(),
            keys: config.step_keys.clone(),
        }
    }

    pub fn on_key_event<H>(
        &self,
        host: &mut H,
        gesture: &KeyGesture,
        model: &mut CursorModel,
        poller: &mut ChangePoller,
        feedback: &FeedbackScheduler,
    ) -> Result<NavigationOutcome, HostError>
    where
        H: Lookup + Timers + ?Sized,
    {
        let Some(composition) = active_composition(&*host, &self.class_marker)? else {
            return Ok(NavigationOutcome::NotApplicable);
        };

        // There is no "composition started" event; any key seen while
        // composing is our cue to begin polling.
        poller.start(host);

        let Some(direction) = self.keys.classify(gesture) else {
            return Ok(NavigationOutcome::Observed);
        };

        model.on_composition(composition.id, &composition.content);
        let outcome = model.move_cursor(direction);
        if !outcome.moved {
            tracing::debug!(
                direction = direction.as_str(),
                offset = outcome.offset,
                len = model.len(),
                "cursor at boundary"
            );
            return Ok(NavigationOutcome::Boundary {
                direction,
                offset: outcome.offset,
            });
        }

        tracing::debug!(
            direction = direction.as_str(),
            offset = outcome.offset,
            content = %composition.content,
            "cursor moved"
        );
        let character = model.character_for(direction);
        if let Some(character) = character {
            feedback.schedule(host, character, direction);
        }
        Ok(NavigationOutcome::Moved {
            direction,
            offset: outcome.offset,
            character,
        })
    }
}
