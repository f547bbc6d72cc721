//! imegate-core
//!
//! Deferred-event coordination for an input method surface whose host
//! delivers lifecycle notifications out of order while it reconfigures.
//!
//! Everything runs on one control thread. Work is posted into a delay-ordered
//! queue on a logical clock and dispatched against a session controller that
//! the handler references weakly, so scheduled work never keeps the
//! controller alive and silently stops once it is gone.
//!
//! Public API:
//! - `LifecycleHandler` - owner-bound scheduler, dispatcher and gate entry points
//! - `Scheduler` - delay-ordered queue with per-kind cancellation and coalescing
//! - `Event` / `EventKind` - deferred work items and their discriminants
//! - `ReconfigurationGate` - buffers and replays notifications around a reconfiguration
//! - `RotationMemory` - remembers the last used alternative for rotation requests
//! - `HandlerConfig` - timing configuration loaded from TOML
//! - `SessionController`, `KeyboardSwitcher`, `SuggestionEngine`, `RotationHost` -
//!   collaborator traits implemented by the host

pub mod collaborators;
pub use collaborators::{
    CapsMode, KeyboardSwitcher, RecapitalizeMode, RotationHost, ScriptId, SessionController,
    SuggestionEngine,
};

pub mod config;
pub use config::HandlerConfig;

pub mod context;
pub use context::{EditorAction, EditorContext, InputPurpose};

pub mod error;
pub use error::{ConfigError, DispatchError, DispatchOutcome};

pub mod event;
pub use event::{Event, EventKind, GesturePreview, InputStyle, SuggestedWords};

pub mod gate;
pub use gate::{PendingCallbacks, ReconfigurationGate};

pub mod handler;
pub use handler::LifecycleHandler;

pub mod rotation;
pub use rotation::{Alternative, RotationDecision, RotationMemory};

pub mod scheduler;
pub use scheduler::Scheduler;
