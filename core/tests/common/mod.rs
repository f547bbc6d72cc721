//! Shared mock collaborators for imegate-core integration tests.
//!
//! Import from integration test files with:
//! ```ignore
//! mod common;
//! use common::{Call, MockController};
//! ```
#![allow(dead_code)]

use imegate_core::{
    Alternative, CapsMode, EditorContext, HandlerConfig, InputStyle, KeyboardSwitcher,
    LifecycleHandler, RecapitalizeMode, ScriptId, SessionController, SuggestedWords,
    SuggestionEngine,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Everything a collaborator observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StartSession { package: Option<String>, restarting: bool },
    StartView { package: String, restarting: bool },
    FinishView { finishing_session: bool },
    FinishSession,
    DeallocateMemory,
    SwitchedAlternative(Alternative),
    ResetDictionaries,
    ShowStrip { words: Vec<String>, dismiss_preview: Option<bool> },
    TailBatchShown,
    PersistVisualState,
    LoadKeyboard { package: Option<String> },
    ShiftState(CapsMode, RecapitalizeMode),
    Recompute(InputStyle),
    RestartAtCursor { for_start_input: bool, script: ScriptId },
    RetryResetCaches { try_resume: bool, remaining: u32 },
    TailBatchCompleted,
}

impl Call {
    /// Calls that reach the session controller's lifecycle methods.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Call::StartSession { .. }
                | Call::StartView { .. }
                | Call::FinishView { .. }
                | Call::FinishSession
        )
    }
}

pub type Log = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Clone, Default)]
pub struct TestSettings {
    pub generation: u32,
}

pub struct MockKeyboard {
    log: Log,
    pub fail_load: bool,
}

impl KeyboardSwitcher<TestSettings> for MockKeyboard {
    fn persist_visual_state(&mut self) {
        self.log.borrow_mut().push(Call::PersistVisualState);
    }

    fn load_keyboard(
        &mut self,
        context: Option<&EditorContext>,
        _settings: &TestSettings,
        _caps: CapsMode,
        _recapitalize: RecapitalizeMode,
    ) -> anyhow::Result<()> {
        if self.fail_load {
            anyhow::bail!("layout resources missing");
        }
        self.log.borrow_mut().push(Call::LoadKeyboard {
            package: context.map(|c| c.package_name.clone()),
        });
        Ok(())
    }

    fn request_updating_shift_state(&mut self, caps: CapsMode, recapitalize: RecapitalizeMode) {
        self.log
            .borrow_mut()
            .push(Call::ShiftState(caps, recapitalize));
    }

    fn current_script_id(&self) -> ScriptId {
        ScriptId(11)
    }
}

pub struct MockSuggestions {
    log: Log,
    pub reset_succeeds: bool,
}

impl SuggestionEngine<TestSettings> for MockSuggestions {
    fn recompute_suggestions_sync(&mut self, _settings: &TestSettings, input_style: InputStyle) {
        self.log.borrow_mut().push(Call::Recompute(input_style));
    }

    fn restart_suggestions_at_cursor(
        &mut self,
        _settings: &TestSettings,
        for_start_input: bool,
        script_id: ScriptId,
    ) {
        self.log.borrow_mut().push(Call::RestartAtCursor {
            for_start_input,
            script: script_id,
        });
    }

    fn retry_reset_caches(&mut self, try_resume_suggestions: bool, remaining_tries: u32) -> bool {
        self.log.borrow_mut().push(Call::RetryResetCaches {
            try_resume: try_resume_suggestions,
            remaining: remaining_tries,
        });
        self.reset_succeeds
    }

    fn on_update_tail_batch_input_completed(
        &mut self,
        _settings: &TestSettings,
        _words: &SuggestedWords,
    ) {
        self.log.borrow_mut().push(Call::TailBatchCompleted);
    }
}

pub struct MockController {
    pub log: Log,
    pub keyboard: MockKeyboard,
    pub suggestions: MockSuggestions,
    pub view_shown: bool,
    pub suggestions_enabled: bool,
    pub fail_dictionaries: bool,
    pub context: Option<EditorContext>,
}

impl MockController {
    pub fn new() -> Self {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        Self {
            keyboard: MockKeyboard {
                log: log.clone(),
                fail_load: false,
            },
            suggestions: MockSuggestions {
                log: log.clone(),
                reset_succeeds: true,
            },
            log,
            view_shown: false,
            suggestions_enabled: true,
            fail_dictionaries: false,
            context: None,
        }
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl SessionController for MockController {
    type Settings = TestSettings;
    type Keyboard = MockKeyboard;
    type Suggestions = MockSuggestions;

    fn settings(&self) -> TestSettings {
        TestSettings::default()
    }

    fn suggestions_enabled(&self) -> bool {
        self.suggestions_enabled
    }

    fn current_context(&self) -> Option<EditorContext> {
        self.context.clone()
    }

    fn caps_mode(&self) -> CapsMode {
        CapsMode(0x2000)
    }

    fn recapitalize_mode(&self) -> RecapitalizeMode {
        RecapitalizeMode::Off
    }

    fn is_view_shown(&self) -> bool {
        self.view_shown
    }

    fn keyboard(&mut self) -> &mut MockKeyboard {
        &mut self.keyboard
    }

    fn suggestions(&mut self) -> &mut MockSuggestions {
        &mut self.suggestions
    }

    fn on_session_start_internal(&mut self, context: Option<&EditorContext>, restarting: bool) {
        self.context = context.cloned();
        self.record(Call::StartSession {
            package: context.map(|c| c.package_name.clone()),
            restarting,
        });
    }

    fn on_session_start_view_internal(&mut self, context: &EditorContext, restarting: bool) {
        self.view_shown = true;
        self.record(Call::StartView {
            package: context.package_name.clone(),
            restarting,
        });
    }

    fn on_finish_view_internal(&mut self, finishing_session: bool) {
        self.view_shown = false;
        self.record(Call::FinishView { finishing_session });
    }

    fn on_finish_session_internal(&mut self) {
        self.record(Call::FinishSession);
    }

    fn deallocate_memory(&mut self) {
        self.record(Call::DeallocateMemory);
    }

    fn apply_switched_alternative(&mut self, alternative: &Alternative) {
        self.record(Call::SwitchedAlternative(alternative.clone()));
    }

    fn reset_dictionaries_if_necessary(&mut self) -> anyhow::Result<()> {
        if self.fail_dictionaries {
            anyhow::bail!("dictionary pack unreadable");
        }
        self.record(Call::ResetDictionaries);
        Ok(())
    }

    fn show_suggestion_strip(&mut self, words: &SuggestedWords) {
        self.record(Call::ShowStrip {
            words: words.words.clone(),
            dismiss_preview: None,
        });
    }

    fn show_gesture_preview_and_suggestion_strip(
        &mut self,
        words: &SuggestedWords,
        dismiss_preview: bool,
    ) {
        self.record(Call::ShowStrip {
            words: words.words.clone(),
            dismiss_preview: Some(dismiss_preview),
        });
    }

    fn on_tail_batch_input_shown(&mut self, _words: &SuggestedWords) {
        self.record(Call::TailBatchShown);
    }
}

/// A live controller plus a handler bound to it.
pub fn setup() -> (Rc<RefCell<MockController>>, LifecycleHandler<MockController>) {
    setup_with(HandlerConfig::default())
}

pub fn setup_with(
    config: HandlerConfig,
) -> (Rc<RefCell<MockController>>, LifecycleHandler<MockController>) {
    let controller = Rc::new(RefCell::new(MockController::new()));
    let handler = LifecycleHandler::new(&controller, config);
    (controller, handler)
}

/// Snapshot of every recorded call.
pub fn calls(controller: &Rc<RefCell<MockController>>) -> Vec<Call> {
    controller.borrow().log.borrow().clone()
}

/// Snapshot of lifecycle calls only.
pub fn lifecycle_calls(controller: &Rc<RefCell<MockController>>) -> Vec<Call> {
    calls(controller)
        .into_iter()
        .filter(Call::is_lifecycle)
        .collect()
}

pub fn ctx(package: &str) -> EditorContext {
    EditorContext::new(package)
}
