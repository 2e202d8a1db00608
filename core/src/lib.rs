//! caretfix-core
//!
//! Cursor tracking for IME compositions in hosts that show the composition
//! string but never say where the caret is inside it, and never announce
//! edits to it.
//!
//! The cursor offset is inferred from left/right key events, edits are found
//! by polling, and corrected speech/braille feedback is timed to land after
//! the host's own (wrong) feedback for the same key.
//!
//! Public API:
//! - `CaretTracker` - plugin instance driven by host callbacks
//! - `CursorModel` - composition identity, content and inferred offset
//! - `NavigationInterceptor` - key-event handling
//! - `ChangePoller` - Idle/Active polling state machine
//! - `FeedbackScheduler` - delayed announcement of navigation steps
//! - `Host` and friends - collaborator traits the host implements
//! - `TimerQueue` - virtual-time implementation of the timer contract
//! - `Config` - configuration
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;
pub use error::{CaretError, HostError, Result};

pub mod gesture;
pub use gesture::{Direction, KeyGesture, KeyResult, StepKeys};

pub mod cursor;
pub use cursor::{CompositionSession, CursorModel, MoveOutcome, SessionId};

pub mod host;
pub use host::{
    active_composition, CompositionSnapshot, Host, KeyHook, Lookup, OutputChannels, Task, TimerId,
    Timers,
};

pub mod timer;
pub use timer::TimerQueue;

pub mod feedback;
pub use feedback::{Announcement, FeedbackScheduler};

pub mod poller;
pub use poller::{ChangePoller, PollState, PollStatus, TickOutcome};

pub mod interceptor;
pub use interceptor::{NavigationInterceptor, NavigationOutcome};

pub mod tracker;
pub use tracker::{CaretTracker, Lifecycle};

#[cfg(test)]
mod testing;

/// Tracker configuration.
///
/// The two delays were tuned by hand against one host: the host's own caret
/// feedback arrives roughly 20-30 ms after the key, so announcements wait
/// 150 ms. Nothing measures the real latency at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Substring of the window class name identifying target controls
    pub class_marker: String,

    /// Interval between change-poller ticks, in milliseconds
    pub poll_interval_ms: u64,

    /// Delay before a navigation announcement fires, in milliseconds.
    /// Must exceed the host's default-feedback latency.
    pub announce_delay_ms: u64,

    /// Speak announced characters (cancelling in-flight speech first)
    pub speak_announcements: bool,
    /// Braille announced characters
    pub braille_announcements: bool,
    /// Braille the full composition whenever polling sees it change
    pub braille_composition_changes: bool,

    /// Keys that step the cursor
    pub step_keys: StepKeys,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            class_marker: "Scintilla".to_string(),
            poll_interval_ms: 50,
            announce_delay_ms: 150,
            speak_announcements: true,
            braille_announcements: true,
            braille_composition_changes: true,
            step_keys: StepKeys::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn announce_delay(&self) -> Duration {
        Duration::from_millis(self.announce_delay_ms)
    }

    /// Reject settings the tracker cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.class_marker.is_empty() {
            return Err(CaretError::InvalidConfig(
                "class_marker must not be empty".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(CaretError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.announce_delay_ms == 0 {
            return Err(CaretError::InvalidConfig(
                "announce_delay_ms must be greater than zero".to_string(),
            ));
        }
        let keys = &self.step_keys;
        if keys.left_vk_code == keys.right_vk_code || keys.left_key_name == keys.right_key_name {
            return Err(CaretError::InvalidConfig(
                "left and right step keys must differ".to_string(),
            ));
        }
        Ok(())
    }
}
