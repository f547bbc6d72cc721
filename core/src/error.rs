//! Error types.
//!
//! Nothing here crosses a public scheduling entry point: dispatch failures are
//! logged and absorbed by the handler. `ConfigError` is the only error a host
//! ever sees, and only while loading configuration.

use crate::event::EventKind;

/// Failure while loading, parsing or validating a [`HandlerConfig`](crate::HandlerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure inside a dispatched event. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The owner is already mutably borrowed, which means a collaborator called
    /// back into the handler while it was being driven.
    #[error("owner is busy while handling {kind:?}")]
    OwnerBusy { kind: EventKind },

    #[error("collaborator failed while handling {kind:?}: {cause:#}")]
    Collaborator { kind: EventKind, cause: anyhow::Error },
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran against a live owner.
    Handled,
    /// The owner was gone; the event was discarded without side effects.
    OwnerGone,
    /// The handler ran but a collaborator failed; the failure was logged.
    Failed,
}
