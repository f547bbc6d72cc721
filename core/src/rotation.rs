//! Alternative rotation memory.
//!
//! Pressing "rotate" should return to the alternative the user was typing
//! with before, not march forward through every enabled alternative. The
//! memory only moves when the current alternative has actually produced
//! input, so two rotations in a row without typing toggle between the same
//! pair.

use crate::collaborators::RotationHost;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A selectable language/layout variant of the input method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Alternative {
    /// Locale tag, e.g. "en_US".
    pub locale: String,
    /// Keyboard layout name, e.g. "qwerty".
    pub layout: String,
}

impl Alternative {
    pub fn new<L: Into<String>, K: Into<String>>(locale: L, layout: K) -> Self {
        Self {
            locale: locale.into(),
            layout: layout.into(),
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.locale, self.layout)
    }
}

/// Outcome of a rotation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationDecision {
    /// Jumped back to the remembered alternative.
    Remembered(Alternative),
    /// Deferred to the host's default next-alternative rotation.
    DefaultNext,
}

#[derive(Debug, Clone, Default)]
pub struct RotationMemory {
    last_active: Option<Alternative>,
    current_has_been_used: bool,
}

impl RotationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the user produced input through the current alternative.
    pub fn mark_current_alternative_used(&mut self) {
        self.current_has_been_used = true;
    }

    pub fn last_active_alternative(&self) -> Option<&Alternative> {
        self.last_active.as_ref()
    }

    pub fn current_alternative_has_been_used(&self) -> bool {
        self.current_has_been_used
    }

    /// Rotate starting from the alternative the host reports as current.
    pub fn switch_alternative<H: RotationHost>(
        &mut self,
        token: &H::Token,
        host: &mut H,
    ) -> RotationDecision {
        let current = host.current_alternative();
        self.rotate(token, &current, host)
    }

    /// Rotate away from `current`.
    ///
    /// The memory is committed before the decision is taken, so the decision
    /// only ever sees the snapshot read at entry.
    pub fn rotate<H: RotationHost>(
        &mut self,
        token: &H::Token,
        current: &Alternative,
        host: &mut H,
    ) -> RotationDecision {
        let remembered = self.last_active.clone();
        let was_used = self.current_has_been_used;
        if was_used {
            self.last_active = Some(current.clone());
            self.current_has_been_used = false;
        }

        if was_used {
            if let Some(remembered) = remembered {
                if host.alternative_belongs_and_enabled(&remembered) && remembered != *current {
                    debug!(from = %current, to = %remembered, "switching to remembered alternative");
                    host.apply_alternative(token, &remembered);
                    return RotationDecision::Remembered(remembered);
                }
            }
        }

        debug!(from = %current, "deferring to default rotation");
        host.rotate_to_next_default(token, true);
        RotationDecision::DefaultNext
    }
}
