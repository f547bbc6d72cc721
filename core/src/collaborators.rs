//! Outbound capabilities the handler depends on but does not implement.
//!
//! The host implements these traits on its own types. The handler only ever
//! reaches the session controller through a weak reference; the keyboard and
//! suggestion collaborators are reached through the controller, so they share
//! its lifetime.

use crate::context::EditorContext;
use crate::event::{InputStyle, SuggestedWords};
use crate::rotation::Alternative;

/// Auto-capitalization mode flags of the text before the cursor. Zero means
/// no capitalization is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapsMode(pub u32);

/// Recapitalization cycle state of the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecapitalizeMode {
    #[default]
    Off,
    OriginalMixedCase,
    AllLower,
    FirstWordUpper,
    AllUpper,
}

/// Writing script of the active keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScriptId(pub u32);

/// Keyboard state collaborator.
pub trait KeyboardSwitcher<S> {
    /// Remember the visual keyboard state so it survives a surface recreation.
    fn persist_visual_state(&mut self);

    /// Reload the keyboard for `context`. May fail if layout resources are
    /// unavailable.
    fn load_keyboard(
        &mut self,
        context: Option<&EditorContext>,
        settings: &S,
        caps: CapsMode,
        recapitalize: RecapitalizeMode,
    ) -> anyhow::Result<()>;

    fn request_updating_shift_state(&mut self, caps: CapsMode, recapitalize: RecapitalizeMode);

    fn current_script_id(&self) -> ScriptId;
}

/// Suggestion collaborator.
pub trait SuggestionEngine<S> {
    fn recompute_suggestions_sync(&mut self, settings: &S, input_style: InputStyle);

    fn restart_suggestions_at_cursor(
        &mut self,
        settings: &S,
        for_start_input: bool,
        script_id: ScriptId,
    );

    /// Try to reset caches after a cursor move. Returns whether the reset
    /// succeeded. Rescheduling on failure is the handler's job.
    fn retry_reset_caches(&mut self, try_resume_suggestions: bool, remaining_tries: u32) -> bool;

    fn on_update_tail_batch_input_completed(&mut self, settings: &S, words: &SuggestedWords);
}

/// The session controller that owns the input surface.
pub trait SessionController {
    /// Settings snapshot passed to collaborators.
    type Settings;
    type Keyboard: KeyboardSwitcher<Self::Settings>;
    type Suggestions: SuggestionEngine<Self::Settings>;

    fn settings(&self) -> Self::Settings;

    /// Whether the user enabled suggestions at all.
    fn suggestions_enabled(&self) -> bool {
        true
    }

    fn current_context(&self) -> Option<EditorContext>;
    fn caps_mode(&self) -> CapsMode;
    fn recapitalize_mode(&self) -> RecapitalizeMode;
    fn is_view_shown(&self) -> bool;

    fn keyboard(&mut self) -> &mut Self::Keyboard;
    fn suggestions(&mut self) -> &mut Self::Suggestions;

    fn on_session_start_internal(&mut self, context: Option<&EditorContext>, restarting: bool);
    fn on_session_start_view_internal(&mut self, context: &EditorContext, restarting: bool);
    fn on_finish_view_internal(&mut self, finishing_session: bool);
    fn on_finish_session_internal(&mut self);

    fn deallocate_memory(&mut self);
    fn apply_switched_alternative(&mut self, alternative: &Alternative);

    /// Re-validate dictionaries after a locale or script change.
    fn reset_dictionaries_if_necessary(&mut self) -> anyhow::Result<()>;

    fn show_suggestion_strip(&mut self, words: &SuggestedWords);
    fn show_gesture_preview_and_suggestion_strip(
        &mut self,
        words: &SuggestedWords,
        dismiss_preview: bool,
    );
    fn on_tail_batch_input_shown(&mut self, words: &SuggestedWords);
}

/// Host side of alternative rotation.
pub trait RotationHost {
    /// Window token identifying the surface requesting the switch.
    type Token: ?Sized;

    fn current_alternative(&self) -> Alternative;
    fn alternative_belongs_and_enabled(&self, alternative: &Alternative) -> bool;
    fn apply_alternative(&mut self, token: &Self::Token, alternative: &Alternative);
    fn rotate_to_next_default(&mut self, token: &Self::Token, only_this_surface: bool);
}
