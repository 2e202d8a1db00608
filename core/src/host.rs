//! Collaborator contracts the host environment must provide.
//!
//! The tracker never reaches into global host state; every callback receives
//! the host by mutable reference and talks to it only through these traits.
//! Lookups distinguish "nothing there" (`Ok(None)`) from a fault (`Err`).

use std::time::Duration;

use crate::cursor::SessionId;
use crate::error::HostError;
use crate::feedback::Announcement;

/// What the host reports about the active composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionSnapshot {
    pub id: SessionId,
    pub content: String,
}

/// Handle to a registered timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Deferred work handed to the host's timer and returned on expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Next change-poller tick
    PollTick,
    /// Corrected feedback for one navigation step
    Announce(Announcement),
}

/// Focus, control classification and composition discovery.
pub trait Lookup {
    /// Opaque reference to a focusable object.
    type Handle;

    fn focus(&self) -> Result<Option<Self::Handle>, HostError>;

    /// Window class name of the control owning `handle`.
    fn class_name(&self, handle: &Self::Handle) -> Result<Option<String>, HostError>;

    /// The composition entity associated with `handle`, however the host
    /// chooses to find it.
    fn locate_composition(
        &self,
        handle: &Self::Handle,
    ) -> Result<Option<CompositionSnapshot>, HostError>;
}

/// Non-blocking deferred callbacks.
pub trait Timers {
    /// Register `task` to be handed back after `delay`.
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId;

    /// Cancel a pending registration. Unknown or fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

/// Fire-and-forget speech and braille output.
pub trait OutputChannels {
    fn speak(&mut self, text: &str);
    fn cancel_speech(&mut self);
    fn braille_message(&mut self, text: &str);
}

/// Registration of the raw key-event hook.
pub trait KeyHook {
    fn install_key_hook(&mut self) -> Result<(), HostError>;
    fn remove_key_hook(&mut self) -> Result<(), HostError>;
}

/// Everything the tracker needs from its host.
pub trait Host: Lookup + Timers + OutputChannels + KeyHook {}

impl<T: Lookup + Timers + OutputChannels + KeyHook> Host for T {}

/// The composition to act on, if the focused control belongs to the target
/// family (its class name contains `class_marker`) and currently shows a
/// non-empty composition.
pub fn active_composition<L: Lookup + ?Sized>(
    host: &L,
    class_marker: &str,
) -> Result<Option<CompositionSnapshot>, HostError> {
    let Some(focus) = host.focus()? else {
        return Ok(None);
    };
    match host.class_name(&focus)? {
        Some(class) if class.contains(class_marker) => {}
        _ => return Ok(None),
    }
    Ok(host
        .locate_composition(&focus)?
        .filter(|composition| !composition.content.is_empty()))
}
