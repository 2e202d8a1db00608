//! A caret tracker wired to a simulated Scintilla host.
//!
//! `Simulation` plays the host's event loop: key presses go through the
//! tracker's hook first and then to the host's default handling, and virtual
//! time advances by firing due timers and host feedback in order.

use std::time::Duration;

use thiserror::Error;

use caretfix_core::{CaretError, CaretTracker, KeyGesture, Lookup};

use crate::config::ScintillaConfig;
use crate::host::{OutputEvent, SimHost};
use crate::object_tree::{AccessibleObject, ObjectId, ParentChainLocator, Role};
use crate::script::{parse_script, Directive, ScriptError, ScriptLine};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("line {line}: no editor to compose in; use `focus <class>` first")]
    NoEditor { line: usize },

    #[error("line {line}: composition id {id} is reserved for editor objects")]
    ReservedId { line: usize, id: u64 },

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Caret(#[from] CaretError),
}

/// Script composition ids never collide with editor objects.
const EDITOR_ID_BASE: u64 = 1 << 32;

pub struct Simulation {
    config: ScintillaConfig,
    host: SimHost,
    tracker: CaretTracker,
    editor: Option<ObjectId>,
    active_composition: Option<ObjectId>,
    next_editor_id: u64,
}

impl Simulation {
    pub fn new(config: ScintillaConfig) -> Result<Self, SimError> {
        Self::build(config, true)
    }

    /// Same host, but the tracker is never initialized: only the host's own
    /// feedback is produced.
    pub fn without_tracker(config: ScintillaConfig) -> Result<Self, SimError> {
        Self::build(config, false)
    }

    fn build(config: ScintillaConfig, install: bool) -> Result<Self, SimError> {
        config.validate()?;
        let mut host = SimHost::new(ParentChainLocator::new(config.max_parent_depth));
        let mut tracker = CaretTracker::new(config.base.clone())?;
        if install {
            tracker.init(&mut host)?;
        }
        Ok(Self {
            config,
            host,
            tracker,
            editor: None,
            active_composition: None,
            next_editor_id: EDITOR_ID_BASE,
        })
    }

    pub fn host(&self) -> &SimHost {
        &self.host
    }

    pub fn tracker(&self) -> &CaretTracker {
        &self.tracker
    }

    pub fn now(&self) -> Duration {
        self.host.now()
    }

    pub fn transcript(&self) -> &[OutputEvent] {
        self.host.transcript()
    }

    /// Parse and apply a whole script.
    pub fn run_script(&mut self, text: &str) -> Result<(), SimError> {
        for line in parse_script(text)? {
            self.apply(&line)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, line: &ScriptLine) -> Result<(), SimError> {
        match &line.directive {
            Directive::Focus(class) => self.focus_editor(class),
            Directive::Blur => self.host.tree_mut().set_focus(None),
            Directive::Compose { id, text } => {
                let editor = self.editor.ok_or(SimError::NoEditor { line: line.line })?;
                if *id >= EDITOR_ID_BASE {
                    return Err(SimError::ReservedId {
                        line: line.line,
                        id: *id,
                    });
                }
                self.compose(editor, *id, text);
            }
            Directive::Commit => self.commit(),
            Directive::Key(gesture) => self.press(gesture),
            Directive::Wait(ms) => self.advance(Duration::from_millis(*ms)),
        }
        Ok(())
    }

    /// Open a fresh editor in a window of class `class` and focus it.
    pub fn focus_editor(&mut self, class: &str) {
        let window = ObjectId(self.next_editor_id);
        let editor = ObjectId(self.next_editor_id + 1);
        self.next_editor_id += 2;

        let tree = self.host.tree_mut();
        tree.insert(AccessibleObject::new(window, Role::Window).with_window_class(class));
        tree.insert(AccessibleObject::new(editor, Role::Editor).with_parent(window));
        tree.set_focus(Some(editor));

        self.editor = Some(editor);
        self.active_composition = None;
    }

    /// Show (or update) composition `id` under `editor` and focus it.
    fn compose(&mut self, editor: ObjectId, id: u64, text: &str) {
        let object_id = ObjectId(id);
        let tree = self.host.tree_mut();
        match tree.get_mut(object_id) {
            Some(object) => object.composition_string = Some(text.to_string()),
            None => tree.insert(
                AccessibleObject::new(object_id, Role::InputComposition)
                    .with_parent(editor)
                    .with_composition(text),
            ),
        }
        tree.set_focus(Some(object_id));
        self.active_composition = Some(object_id);
    }

    /// Drop the active composition; focus returns to its editor.
    fn commit(&mut self) {
        let Some(composition) = self.active_composition.take() else {
            tracing::debug!("commit without an active composition");
            return;
        };
        let tree = self.host.tree_mut();
        tree.remove(composition);
        tree.set_focus(self.editor);
    }

    /// Deliver a key press: tracker hook first, then the host's own handling.
    pub fn press(&mut self, gesture: &KeyGesture) {
        if self.host.key_hook_installed() {
            self.tracker.on_key_event(&mut self.host, gesture);
        }

        // Inside a composition the host cannot read the caret and reports
        // its placeholder instead.
        let is_step = self.config.base.step_keys.classify(gesture).is_some();
        if is_step && self.focused_composition().is_some() {
            let latency = Duration::from_millis(self.config.default_feedback_latency_ms);
            let text = self.config.default_feedback_text.clone();
            self.host.queue_default_feedback(latency, &text);
        }
    }

    fn focused_composition(&self) -> Option<caretfix_core::CompositionSnapshot> {
        let focus = self.host.focus().ok().flatten()?;
        self.host.locate_composition(&focus).ok().flatten()
    }

    /// Let `duration` of virtual time pass.
    pub fn advance(&mut self, duration: Duration) {
        let until = self.host.now() + duration;
        while let Some((id, task)) = self.host.pop_due(until) {
            self.tracker.on_timer(&mut self.host, id, task);
        }
        self.host.advance_to(until);
    }

    /// Advance far enough for every feedback already in flight to land.
    pub fn settle(&mut self) {
        let longest = self
            .config
            .base
            .announce_delay_ms
            .max(self.config.default_feedback_latency_ms);
        self.advance(Duration::from_millis(longest));
    }

    /// Settle, tear the tracker down, and hand back the transcript.
    pub fn finish(mut self) -> Vec<OutputEvent> {
        self.settle();
        self.tracker.terminate(&mut self.host);
        self.host.take_transcript()
    }
}
