//! Timing configuration for the lifecycle handler.
//!
//! All delays are stored in milliseconds so the TOML form stays readable.
//! The defaults are the values the handler has always shipped with; they are
//! empirical and may be tuned per device.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing knobs consulted by [`LifecycleHandler`](crate::LifecycleHandler)
/// and the reconfiguration gate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Length of the guard window opened after the first post-reconfiguration
    /// start-view notification.
    pub pending_ims_callback_ms: u64,

    /// Deadline after which a dictionary reload is reported as late.
    pub wait_for_dictionary_load_ms: u64,

    /// Idle time after a view detach before non-essential caches are freed.
    pub deallocate_memory_ms: u64,

    /// Debounce for suggestion strip updates and delayed resumes.
    pub update_suggestions_delay_ms: u64,

    /// Debounce for shift state updates.
    pub update_shift_state_delay_ms: u64,

    /// Retry budget used by `post_reset_caches_default`.
    pub reset_caches_max_tries: u32,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            pending_ims_callback_ms: 800,
            wait_for_dictionary_load_ms: 2_000,
            deallocate_memory_ms: 10_000,
            update_suggestions_delay_ms: 100,
            update_shift_state_delay_ms: 100,
            reset_caches_max_tries: 5,
        }
    }
}

impl HandlerConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: HandlerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would make the gate or the idle release misbehave.
    ///
    /// A zero guard window would never buffer anything, and a zero idle
    /// timeout would free caches in the middle of a detach/attach pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pending_ims_callback_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "pending_ims_callback_ms",
                reason: "guard window must be non-zero".to_string(),
            });
        }
        if self.deallocate_memory_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "deallocate_memory_ms",
                reason: "idle timeout must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    // ========== Duration accessors ==========

    pub fn pending_ims_callback(&self) -> Duration {
        Duration::from_millis(self.pending_ims_callback_ms)
    }

    pub fn wait_for_dictionary_load(&self) -> Duration {
        Duration::from_millis(self.wait_for_dictionary_load_ms)
    }

    pub fn deallocate_memory(&self) -> Duration {
        Duration::from_millis(self.deallocate_memory_ms)
    }

    pub fn update_suggestions_delay(&self) -> Duration {
        Duration::from_millis(self.update_suggestions_delay_ms)
    }

    pub fn update_shift_state_delay(&self) -> Duration {
        Duration::from_millis(self.update_shift_state_delay_ms)
    }
}
