//! In-memory host used by the unit tests.

use std::time::Duration;

use crate::cursor::SessionId;
use crate::error::HostError;
use crate::host::{CompositionSnapshot, KeyHook, Lookup, OutputChannels, Task, TimerId, Timers};
use crate::timer::TimerQueue;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Output {
    Speak(String),
    CancelSpeech,
    Braille(String),
}

#[derive(Debug)]
pub(crate) struct FakeHost {
    pub focused: bool,
    pub class: Option<String>,
    pub composition: Option<CompositionSnapshot>,
    pub fail_lookups: bool,
    pub panic_on_lookup: bool,
    pub hook_installed: bool,
    pub timers: TimerQueue,
    pub outputs: Vec<Output>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            focused: true,
            class: Some("Scintilla".to_string()),
            composition: None,
            fail_lookups: false,
            panic_on_lookup: false,
            hook_installed: false,
            timers: TimerQueue::new(),
            outputs: Vec::new(),
        }
    }

    pub fn composing(mut self, id: u64, text: &str) -> Self {
        self.set_composition(id, text);
        self
    }

    pub fn set_composition(&mut self, id: u64, text: &str) {
        self.composition = Some(CompositionSnapshot {
            id: SessionId(id),
            content: text.to_string(),
        });
    }

    fn check(&self) -> Result<(), HostError> {
        if self.panic_on_lookup {
            panic!("lookup exploded");
        }
        if self.fail_lookups {
            return Err(HostError::StaleHandle("focus".to_string()));
        }
        Ok(())
    }
}

impl Lookup for FakeHost {
    type Handle = ();

    fn focus(&self) -> Result<Option<()>, HostError> {
        self.check()?;
        Ok(self.focused.then_some(()))
    }

    fn class_name(&self, _handle: &()) -> Result<Option<String>, HostError> {
        self.check()?;
        Ok(self.class.clone())
    }

    fn locate_composition(&self, _handle: &()) -> Result<Option<CompositionSnapshot>, HostError> {
        self.check()?;
        Ok(self.composition.clone())
    }
}

impl Timers for FakeHost {
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        self.timers.schedule(delay, task)
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.cancel(id)
    }
}

impl OutputChannels for FakeHost {
    fn speak(&mut self, text: &str) {
        self.outputs.push(Output::Speak(text.to_string()));
    }

    fn cancel_speech(&mut self) {
        self.outputs.push(Output::CancelSpeech);
    }

    fn braille_message(&mut self, text: &str) {
        self.outputs.push(Output::Braille(text.to_string()));
    }
}

impl KeyHook for FakeHost {
    fn install_key_hook(&mut self) -> Result<(), HostError> {
        self.hook_installed = true;
        Ok(())
    }

    fn remove_key_hook(&mut self) -> Result<(), HostError> {
        self.hook_installed = false;
        Ok(())
    }
}
