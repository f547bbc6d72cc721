//! Lifecycle scripts.
//!
//! A script is a list of `[[step]]` tables, each tagged by `op`:
//!
//! ```toml
//! [[step]]
//! op = "begin_reconfiguration"
//!
//! [[step]]
//! op = "start"
//! restarting = true
//! context = { package_name = "com.example.notes" }
//!
//! [[step]]
//! op = "advance"
//! ms = 900
//!
//! [[step]]
//! op = "post"
//! event = { kind = "reopen_dictionaries" }
//! ```

use anyhow::{Context, Result};
use imegate_core::{EditorContext, Event, EventKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    BeginReconfiguration,
    Start {
        #[serde(default)]
        context: EditorContext,
        #[serde(default)]
        restarting: bool,
    },
    StartView {
        #[serde(default)]
        context: EditorContext,
        #[serde(default)]
        restarting: bool,
    },
    FinishView {
        #[serde(default)]
        finishing_session: bool,
    },
    Finish,
    Advance {
        ms: u64,
    },
    Post {
        event: Event,
        #[serde(default)]
        delay_ms: u64,
    },
    Cancel {
        kind: EventKind,
    },
}

impl Step {
    /// Short name used in trace output.
    pub fn op(&self) -> &'static str {
        match self {
            Step::BeginReconfiguration => "begin_reconfiguration",
            Step::Start { .. } => "start",
            Step::StartView { .. } => "start_view",
            Step::FinishView { .. } => "finish_view",
            Step::Finish => "finish",
            Step::Advance { .. } => "advance",
            Step::Post { .. } => "post",
            Step::Cancel { .. } => "cancel",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Script {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing script {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
