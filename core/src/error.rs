//! Error types shared by the tracker and its collaborators.
//!
//! Two of the three failure classes the tracker deals with are not errors at
//! all: a lookup that finds nothing is `Ok(None)`, and a cursor move that hits
//! the edge of the composition is a [`MoveOutcome`](crate::MoveOutcome) with
//! `moved == false`. What is left is collected here.

use thiserror::Error;

/// A fault reported by the host while answering a lookup or hook request.
///
/// Hosts return this for stale references, missing attributes and similar
/// transient conditions. The tracker logs it at the callback boundary and
/// carries on; the next independent event retries naturally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The handle no longer refers to a live object.
    #[error("stale handle: {0}")]
    StaleHandle(String),

    /// The object exists but an attribute the tracker needs could not be read.
    #[error("attribute `{attribute}` unavailable")]
    MissingAttribute { attribute: &'static str },

    /// The key hook could not be installed or removed.
    #[error("key hook: {0}")]
    KeyHook(String),

    /// Anything else the host wants to surface.
    #[error("{0}")]
    Other(String),
}

/// Errors raised by the core crate.
#[derive(Debug, Error)]
pub enum CaretError {
    #[error("host fault: {0}")]
    Host(#[from] HostError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CaretError>;
