//! Support code for the `replay_trace` binary.
//!
//! - `script`: TOML script of host notifications and clock advances
//! - `recorder`: session controller that records every downstream call
//! - `replay`: drives a `LifecycleHandler` through a script

pub mod recorder;
pub mod replay;
pub mod script;

pub use recorder::{Observation, RecordingController};
pub use replay::{replay, TraceLine};
pub use script::{Script, Step};
