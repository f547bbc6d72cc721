//! Session controller that records what the handler forwards to it.

use imegate_core::{
    Alternative, CapsMode, EditorContext, InputStyle, KeyboardSwitcher, RecapitalizeMode, ScriptId,
    SessionController, SuggestedWords, SuggestionEngine,
};
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// One downstream call observed during a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Observation {
    StartSession {
        package: Option<String>,
        restarting: bool,
    },
    StartView {
        package: String,
        restarting: bool,
    },
    FinishView {
        finishing_session: bool,
    },
    FinishSession,
    PersistVisualState,
    LoadKeyboard {
        package: Option<String>,
    },
    UpdateShiftState,
    RecomputeSuggestions {
        input_style: InputStyle,
    },
    RestartSuggestions {
        for_start_input: bool,
    },
    ResetCaches {
        remaining_tries: u32,
    },
    TailBatchCompleted,
    TailBatchShown,
    ShowSuggestionStrip {
        words: Vec<String>,
    },
    ShowGesturePreview {
        words: Vec<String>,
        dismiss_preview: bool,
    },
    ResetDictionaries,
    DeallocateMemory,
    SwitchAlternative {
        alternative: String,
    },
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::StartSession {
                package,
                restarting,
            } => write!(
                f,
                "start_session package={} restarting={restarting}",
                package.as_deref().unwrap_or("-")
            ),
            Observation::StartView {
                package,
                restarting,
            } => write!(f, "start_view package={package} restarting={restarting}"),
            Observation::FinishView { finishing_session } => {
                write!(f, "finish_view finishing_session={finishing_session}")
            }
            Observation::FinishSession => write!(f, "finish_session"),
            Observation::PersistVisualState => write!(f, "persist_visual_state"),
            Observation::LoadKeyboard { package } => {
                write!(f, "load_keyboard package={}", package.as_deref().unwrap_or("-"))
            }
            Observation::UpdateShiftState => write!(f, "update_shift_state"),
            Observation::RecomputeSuggestions { input_style } => {
                write!(f, "recompute_suggestions style={input_style:?}")
            }
            Observation::RestartSuggestions { for_start_input } => {
                write!(f, "restart_suggestions for_start_input={for_start_input}")
            }
            Observation::ResetCaches { remaining_tries } => {
                write!(f, "reset_caches remaining_tries={remaining_tries}")
            }
            Observation::TailBatchCompleted => write!(f, "tail_batch_completed"),
            Observation::TailBatchShown => write!(f, "tail_batch_shown"),
            Observation::ShowSuggestionStrip { words } => {
                write!(f, "show_suggestion_strip words={}", words.join(","))
            }
            Observation::ShowGesturePreview {
                words,
                dismiss_preview,
            } => write!(
                f,
                "show_gesture_preview words={} dismiss={dismiss_preview}",
                words.join(",")
            ),
            Observation::ResetDictionaries => write!(f, "reset_dictionaries"),
            Observation::DeallocateMemory => write!(f, "deallocate_memory"),
            Observation::SwitchAlternative { alternative } => {
                write!(f, "switch_alternative {alternative}")
            }
        }
    }
}

pub type ObservationLog = Rc<RefCell<Vec<Observation>>>;

pub struct RecordingKeyboard {
    log: ObservationLog,
}

impl KeyboardSwitcher<()> for RecordingKeyboard {
    fn persist_visual_state(&mut self) {
        self.log.borrow_mut().push(Observation::PersistVisualState);
    }

    fn load_keyboard(
        &mut self,
        context: Option<&EditorContext>,
        _settings: &(),
        _caps: CapsMode,
        _recapitalize: RecapitalizeMode,
    ) -> anyhow::Result<()> {
        self.log.borrow_mut().push(Observation::LoadKeyboard {
            package: context.map(|c| c.package_name.clone()),
        });
        Ok(())
    }

    fn request_updating_shift_state(&mut self, _caps: CapsMode, _recapitalize: RecapitalizeMode) {
        self.log.borrow_mut().push(Observation::UpdateShiftState);
    }

    fn current_script_id(&self) -> ScriptId {
        ScriptId::default()
    }
}

pub struct RecordingSuggestions {
    log: ObservationLog,
}

impl SuggestionEngine<()> for RecordingSuggestions {
    fn recompute_suggestions_sync(&mut self, _settings: &(), input_style: InputStyle) {
        self.log
            .borrow_mut()
            .push(Observation::RecomputeSuggestions { input_style });
    }

    fn restart_suggestions_at_cursor(
        &mut self,
        _settings: &(),
        for_start_input: bool,
        _script_id: ScriptId,
    ) {
        self.log
            .borrow_mut()
            .push(Observation::RestartSuggestions { for_start_input });
    }

    fn retry_reset_caches(&mut self, _try_resume_suggestions: bool, remaining_tries: u32) -> bool {
        self.log
            .borrow_mut()
            .push(Observation::ResetCaches { remaining_tries });
        true
    }

    fn on_update_tail_batch_input_completed(&mut self, _settings: &(), _words: &SuggestedWords) {
        self.log.borrow_mut().push(Observation::TailBatchCompleted);
    }
}

/// Controller with no behavior of its own beyond tracking the current
/// context and whether a view is attached.
pub struct RecordingController {
    log: ObservationLog,
    keyboard: RecordingKeyboard,
    suggestions: RecordingSuggestions,
    context: Option<EditorContext>,
    view_shown: bool,
}

impl RecordingController {
    pub fn new() -> Self {
        let log: ObservationLog = Rc::default();
        Self {
            keyboard: RecordingKeyboard { log: log.clone() },
            suggestions: RecordingSuggestions { log: log.clone() },
            log,
            context: None,
            view_shown: false,
        }
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Observation> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    fn record(&self, observation: Observation) {
        self.log.borrow_mut().push(observation);
    }
}

impl Default for RecordingController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController for RecordingController {
    type Settings = ();
    type Keyboard = RecordingKeyboard;
    type Suggestions = RecordingSuggestions;

    fn settings(&self) -> Self::Settings {}

    fn current_context(&self) -> Option<EditorContext> {
        self.context.clone()
    }

    fn caps_mode(&self) -> CapsMode {
        CapsMode::default()
    }

    fn recapitalize_mode(&self) -> RecapitalizeMode {
        RecapitalizeMode::default()
    }

    fn is_view_shown(&self) -> bool {
        self.view_shown
    }

    fn keyboard(&mut self) -> &mut RecordingKeyboard {
        &mut self.keyboard
    }

    fn suggestions(&mut self) -> &mut RecordingSuggestions {
        &mut self.suggestions
    }

    fn on_session_start_internal(&mut self, context: Option<&EditorContext>, restarting: bool) {
        if let Some(context) = context {
            self.context = Some(context.clone());
        }
        self.record(Observation::StartSession {
            package: context.map(|c| c.package_name.clone()),
            restarting,
        });
    }

    fn on_session_start_view_internal(&mut self, context: &EditorContext, restarting: bool) {
        self.context = Some(context.clone());
        self.view_shown = true;
        self.record(Observation::StartView {
            package: context.package_name.clone(),
            restarting,
        });
    }

    fn on_finish_view_internal(&mut self, finishing_session: bool) {
        self.view_shown = false;
        self.record(Observation::FinishView { finishing_session });
    }

    fn on_finish_session_internal(&mut self) {
        self.context = None;
        self.record(Observation::FinishSession);
    }

    fn deallocate_memory(&mut self) {
        self.record(Observation::DeallocateMemory);
    }

    fn apply_switched_alternative(&mut self, alternative: &Alternative) {
        self.record(Observation::SwitchAlternative {
            alternative: alternative.to_string(),
        });
    }

    fn reset_dictionaries_if_necessary(&mut self) -> anyhow::Result<()> {
        self.record(Observation::ResetDictionaries);
        Ok(())
    }

    fn show_suggestion_strip(&mut self, words: &SuggestedWords) {
        self.record(Observation::ShowSuggestionStrip {
            words: words.words.clone(),
        });
    }

    fn show_gesture_preview_and_suggestion_strip(
        &mut self,
        words: &SuggestedWords,
        dismiss_preview: bool,
    ) {
        self.record(Observation::ShowGesturePreview {
            words: words.words.clone(),
            dismiss_preview,
        });
    }

    fn on_tail_batch_input_shown(&mut self, _words: &SuggestedWords) {
        self.record(Observation::TailBatchShown);
    }
}
