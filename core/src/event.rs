//! Scheduled event kinds and their payloads.
//!
//! Identity of a scheduled event is its [`EventKind`]. Payloads ride along in
//! [`Event`] and are never used for matching: cancelling a kind removes every
//! pending instance regardless of payload.

use crate::rotation::Alternative;
use serde::{Deserialize, Serialize};

/// How the suggestions being shown were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStyle {
    #[default]
    None,
    Typing,
    UpdateBatch,
    TailBatch,
    ApplicationSpecified,
    Recorrection,
    Prediction,
    BeginningOfSentencePrediction,
}

/// Gesture floating preview handling for a suggestion strip update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePreview {
    /// Not gesture input; show the strip only.
    #[default]
    None,
    /// Show the strip and keep the floating preview text.
    Show,
    /// Show the strip and dismiss the floating preview text.
    Dismiss,
}

/// Suggestions produced by the suggestion engine, carried opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SuggestedWords {
    pub words: Vec<String>,
    pub input_style: InputStyle,
}

impl SuggestedWords {
    pub fn new<I, S>(words: I, input_style: InputStyle) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            input_style,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Payload-free discriminant used for cancellation and pending queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UpdateShiftState,
    PendingImsCallback,
    UpdateSuggestionStrip,
    ShowSuggestionStrip,
    ResumeSuggestions,
    ReopenDictionaries,
    UpdateTailBatchInputCompleted,
    ResetCaches,
    WaitForDictionaryLoad,
    DeallocateMemory,
    ResumeSuggestionsForStartInput,
    SwitchLanguage,
}

impl EventKind {
    /// Kinds whose pending instances are cancelled when this kind is posted.
    ///
    /// Empty means instances coexist; callers that need at most one use
    /// `has_pending` first.
    pub fn superseded_kinds(self) -> &'static [EventKind] {
        match self {
            EventKind::UpdateShiftState => &[EventKind::UpdateShiftState],
            EventKind::UpdateSuggestionStrip => &[EventKind::UpdateSuggestionStrip],
            EventKind::ShowSuggestionStrip => &[EventKind::ShowSuggestionStrip],
            EventKind::ResetCaches => &[EventKind::ResetCaches],
            EventKind::ResumeSuggestions | EventKind::ResumeSuggestionsForStartInput => &[
                EventKind::ResumeSuggestions,
                EventKind::ResumeSuggestionsForStartInput,
            ],
            EventKind::PendingImsCallback
            | EventKind::ReopenDictionaries
            | EventKind::UpdateTailBatchInputCompleted
            | EventKind::WaitForDictionaryLoad
            | EventKind::DeallocateMemory
            | EventKind::SwitchLanguage => &[],
        }
    }

    pub fn is_coalescing(self) -> bool {
        !self.superseded_kinds().is_empty()
    }
}

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Recompute the capitalization display.
    UpdateShiftState,
    /// Guard timer for the reconfiguration gate. Carries no owner effect.
    PendingImsCallback,
    /// Recompute and show suggestions.
    UpdateSuggestionStrip { input_style: InputStyle },
    /// Show already computed suggestions, optionally with a gesture preview.
    ShowSuggestionStrip {
        words: SuggestedWords,
        #[serde(default)]
        preview: GesturePreview,
    },
    /// Re-evaluate suggestions for the word under the cursor.
    ResumeSuggestions,
    /// Re-evaluate suggestions for the word under the cursor of a fresh session.
    ResumeSuggestionsForStartInput,
    /// Re-validate language resources.
    ReopenDictionaries,
    /// Commit the result of a finished gesture batch.
    UpdateTailBatchInputCompleted { words: SuggestedWords },
    /// Attempt a cache reset, retrying while budget remains.
    ResetCaches {
        try_resume_suggestions: bool,
        remaining_tries: u32,
    },
    /// Diagnostic deadline for dictionary loading.
    WaitForDictionaryLoad,
    /// Free non-essential caches after an idle period.
    DeallocateMemory,
    /// Switch to another alternative without user interaction.
    SwitchLanguage { alternative: Alternative },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::UpdateShiftState => EventKind::UpdateShiftState,
            Event::PendingImsCallback => EventKind::PendingImsCallback,
            Event::UpdateSuggestionStrip { .. } => EventKind::UpdateSuggestionStrip,
            Event::ShowSuggestionStrip { .. } => EventKind::ShowSuggestionStrip,
            Event::ResumeSuggestions => EventKind::ResumeSuggestions,
            Event::ResumeSuggestionsForStartInput => EventKind::ResumeSuggestionsForStartInput,
            Event::ReopenDictionaries => EventKind::ReopenDictionaries,
            Event::UpdateTailBatchInputCompleted { .. } => EventKind::UpdateTailBatchInputCompleted,
            Event::ResetCaches { .. } => EventKind::ResetCaches,
            Event::WaitForDictionaryLoad => EventKind::WaitForDictionaryLoad,
            Event::DeallocateMemory => EventKind::DeallocateMemory,
            Event::SwitchLanguage { .. } => EventKind::SwitchLanguage,
        }
    }
}
