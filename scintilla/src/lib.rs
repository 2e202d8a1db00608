//! caretfix-scintilla crate root
//!
//! Host glue for Scintilla-based editors (Notepad++ and friends), whose IME
//! composition objects never report a caret position. This crate provides
//! the window-class and parent-chain lookups, a simulated host implementing
//! every `caretfix-core` collaborator trait, and a script-driven simulation
//! used by the `caretfix-sim` binary and the integration tests.
//!
//! Public API exported here:
//! - `ScintillaConfig` from `config`
//! - `ObjectTree`, `ParentChainLocator` from `object_tree`
//! - `SimHost`, `OutputEvent` from `host`
//! - `Simulation` from `simulation`

pub mod config;
pub mod host;
pub mod object_tree;
pub mod script;
pub mod simulation;

// Re-export the tracker API from core.
pub use caretfix_core::{
    CaretError, CaretTracker, Config, Direction, KeyGesture, KeyResult, PollStatus, SessionId,
};

pub use config::ScintillaConfig;
pub use host::{Origin, OutputEvent, OutputKind, SimHost};
pub use object_tree::{AccessibleObject, ObjectId, ObjectTree, ParentChainLocator, Role};
pub use script::{parse_script, Directive, ScriptError, ScriptLine};
pub use simulation::{SimError, Simulation};
