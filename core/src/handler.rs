//! Lifecycle handler bound to a session controller.
//!
//! `LifecycleHandler` combines the [`Scheduler`], the
//! [`ReconfigurationGate`] and the dispatch table for every [`Event`]. It
//! holds only a weak reference to its owner: once the owner is dropped,
//! pending work is discarded as it comes due and gate notifications stop
//! reaching downstream code.
//!
//! The host drives time explicitly with [`LifecycleHandler::advance_by`] (or
//! [`LifecycleHandler::run_pending`] for zero-delay work), typically from its
//! own event loop using [`LifecycleHandler::next_deadline`] to decide how long
//! to sleep.

use crate::collaborators::{KeyboardSwitcher, SessionController, SuggestionEngine};
use crate::config::HandlerConfig;
use crate::context::EditorContext;
use crate::error::{DispatchError, DispatchOutcome};
use crate::event::{Event, EventKind, GesturePreview, InputStyle, SuggestedWords};
use crate::gate::ReconfigurationGate;
use crate::rotation::Alternative;
use crate::scheduler::Scheduler;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct LifecycleHandler<O: SessionController> {
    owner: Weak<RefCell<O>>,
    scheduler: Scheduler,
    gate: ReconfigurationGate,
    config: HandlerConfig,
}

impl<O: SessionController> LifecycleHandler<O> {
    /// Create a handler for `owner` without taking a strong reference.
    pub fn new(owner: &Rc<RefCell<O>>, config: HandlerConfig) -> Self {
        Self {
            owner: Rc::downgrade(owner),
            scheduler: Scheduler::new(),
            gate: ReconfigurationGate::new(),
            config,
        }
    }

    /// Create a handler with no owner yet. Everything it dispatches is a
    /// no-op until [`set_owner`](Self::set_owner) is called.
    pub fn detached(config: HandlerConfig) -> Self {
        Self {
            owner: Weak::new(),
            scheduler: Scheduler::new(),
            gate: ReconfigurationGate::new(),
            config,
        }
    }

    pub fn set_owner(&mut self, owner: &Rc<RefCell<O>>) {
        self.owner = Rc::downgrade(owner);
    }

    pub fn owner_alive(&self) -> bool {
        self.owner.strong_count() > 0
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Replace the timing configuration. Already scheduled events keep their
    /// deadlines.
    pub fn set_config(&mut self, config: HandlerConfig) {
        self.config = config;
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn gate(&self) -> &ReconfigurationGate {
        &self.gate
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    // ========== Generic scheduling ==========

    pub fn post(&mut self, event: Event, delay: Duration) {
        self.scheduler.post(event, delay);
    }

    pub fn cancel(&mut self, kind: EventKind) {
        self.scheduler.cancel(kind);
    }

    pub fn has_pending(&self, kind: EventKind) -> bool {
        self.scheduler.has_pending(kind)
    }

    /// Drop all pending work and reset the gate.
    pub fn remove_all(&mut self) {
        self.scheduler.remove_all();
        self.gate.reset();
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Dispatch everything that is due at the current time, including
    /// zero-delay work posted by the handlers themselves.
    pub fn run_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while let Some(event) = self.scheduler.pop_due() {
            self.dispatch(event);
            dispatched += 1;
        }
        dispatched
    }

    /// Move the clock forward by `elapsed`, dispatching due events in
    /// deadline order. Events posted while advancing fire in the same call if
    /// their deadline falls inside the window.
    pub fn advance_by(&mut self, elapsed: Duration) -> usize {
        let target = self.scheduler.now().saturating_add(elapsed);
        let mut dispatched = 0;
        while let Some(event) = self.scheduler.pop_until(target) {
            self.dispatch(event);
            dispatched += 1;
        }
        self.scheduler.advance_to(target);
        dispatched
    }

    /// Run `event` synchronously against the owner.
    ///
    /// A missing owner turns this into a no-op. Failures are logged and
    /// absorbed.
    pub fn dispatch(&mut self, event: Event) -> DispatchOutcome {
        let kind = event.kind();
        let Some(owner) = self.owner.upgrade() else {
            debug!(?kind, "owner gone, dropping event");
            return DispatchOutcome::OwnerGone;
        };
        let result = match owner.try_borrow_mut() {
            Ok(mut owner) => self.handle(&mut owner, event),
            Err(_) => Err(DispatchError::OwnerBusy { kind }),
        };
        match result {
            Ok(()) => DispatchOutcome::Handled,
            Err(err) => {
                warn!(error = %err, "event handler failed");
                DispatchOutcome::Failed
            }
        }
    }

    fn handle(&mut self, owner: &mut O, event: Event) -> Result<(), DispatchError> {
        let kind = event.kind();
        match event {
            Event::UpdateSuggestionStrip { input_style } => {
                self.scheduler.cancel(EventKind::UpdateSuggestionStrip);
                let settings = owner.settings();
                owner
                    .suggestions()
                    .recompute_suggestions_sync(&settings, input_style);
            }
            Event::UpdateShiftState => {
                let caps = owner.caps_mode();
                let recapitalize = owner.recapitalize_mode();
                owner
                    .keyboard()
                    .request_updating_shift_state(caps, recapitalize);
            }
            Event::ShowSuggestionStrip { words, preview } => match preview {
                GesturePreview::None => owner.show_suggestion_strip(&words),
                GesturePreview::Show => owner.show_gesture_preview_and_suggestion_strip(&words, false),
                GesturePreview::Dismiss => {
                    owner.show_gesture_preview_and_suggestion_strip(&words, true)
                }
            },
            Event::ResumeSuggestions => Self::restart_suggestions(owner, false),
            Event::ResumeSuggestionsForStartInput => Self::restart_suggestions(owner, true),
            Event::ReopenDictionaries => {
                // The script may have changed, so re-evaluate against a
                // fresh load deadline.
                self.post_wait_for_dictionary_load();
                owner
                    .reset_dictionaries_if_necessary()
                    .map_err(|cause| DispatchError::Collaborator { kind, cause })?;
            }
            Event::UpdateTailBatchInputCompleted { words } => {
                let settings = owner.settings();
                owner
                    .suggestions()
                    .on_update_tail_batch_input_completed(&settings, &words);
                owner.on_tail_batch_input_shown(&words);
            }
            Event::ResetCaches {
                try_resume_suggestions,
                remaining_tries,
            } => self.reset_caches(owner, try_resume_suggestions, remaining_tries)?,
            Event::WaitForDictionaryLoad => {
                info!("Timeout waiting for dictionary load");
            }
            Event::DeallocateMemory => owner.deallocate_memory(),
            Event::SwitchLanguage { alternative } => owner.apply_switched_alternative(&alternative),
            Event::PendingImsCallback => debug!("guard window closed"),
        }
        Ok(())
    }

    fn restart_suggestions(owner: &mut O, for_start_input: bool) {
        let settings = owner.settings();
        let script_id = owner.keyboard().current_script_id();
        owner
            .suggestions()
            .restart_suggestions_at_cursor(&settings, for_start_input, script_id);
    }

    fn reset_caches(
        &mut self,
        owner: &mut O,
        try_resume_suggestions: bool,
        remaining_tries: u32,
    ) -> Result<(), DispatchError> {
        let settings = owner.settings();
        if !owner
            .suggestions()
            .retry_reset_caches(try_resume_suggestions, remaining_tries)
        {
            match remaining_tries.checked_sub(1) {
                Some(remaining) => self.post_reset_caches(try_resume_suggestions, remaining),
                None => warn!("cache reset retries exhausted, keeping last good state"),
            }
            return Ok(());
        }
        if try_resume_suggestions && owner.suggestions_enabled() {
            self.scheduler.post(
                Event::ResumeSuggestions,
                self.config.update_suggestions_delay(),
            );
        }
        // Caches are consistent again, so the keyboard can be reloaded.
        let context = owner.current_context();
        let caps = owner.caps_mode();
        let recapitalize = owner.recapitalize_mode();
        owner
            .keyboard()
            .load_keyboard(context.as_ref(), &settings, caps, recapitalize)
            .map_err(|cause| DispatchError::Collaborator {
                kind: EventKind::ResetCaches,
                cause,
            })
    }

    // ========== Typed posting helpers ==========

    pub fn post_update_suggestion_strip(&mut self, input_style: InputStyle) {
        self.scheduler.post(
            Event::UpdateSuggestionStrip { input_style },
            self.config.update_suggestions_delay(),
        );
    }

    pub fn cancel_update_suggestion_strip(&mut self) {
        self.scheduler.cancel(EventKind::UpdateSuggestionStrip);
    }

    pub fn has_pending_update_suggestions(&self) -> bool {
        self.scheduler.has_pending(EventKind::UpdateSuggestionStrip)
    }

    pub fn post_update_shift_state(&mut self) {
        self.scheduler.post(
            Event::UpdateShiftState,
            self.config.update_shift_state_delay(),
        );
    }

    pub fn post_reopen_dictionaries(&mut self) {
        self.scheduler.post(Event::ReopenDictionaries, Duration::ZERO);
    }

    pub fn has_pending_reopen_dictionaries(&self) -> bool {
        self.scheduler.has_pending(EventKind::ReopenDictionaries)
    }

    pub fn post_resume_suggestions(&mut self, should_delay: bool) {
        self.post_resume_suggestions_internal(should_delay, false);
    }

    pub fn post_resume_suggestions_for_start_input(&mut self, should_delay: bool) {
        self.post_resume_suggestions_internal(should_delay, true);
    }

    fn post_resume_suggestions_internal(&mut self, should_delay: bool, for_start_input: bool) {
        let Some(owner) = self.owner.upgrade() else {
            return;
        };
        let enabled = match owner.try_borrow() {
            Ok(owner) => owner.suggestions_enabled(),
            Err(_) => {
                warn!("owner busy, not resuming suggestions");
                return;
            }
        };
        if !enabled {
            return;
        }
        let event = if for_start_input {
            Event::ResumeSuggestionsForStartInput
        } else {
            Event::ResumeSuggestions
        };
        let delay = if should_delay {
            self.config.update_suggestions_delay()
        } else {
            Duration::ZERO
        };
        self.scheduler.post(event, delay);
    }

    pub fn post_reset_caches(&mut self, try_resume_suggestions: bool, remaining_tries: u32) {
        self.scheduler.post(
            Event::ResetCaches {
                try_resume_suggestions,
                remaining_tries,
            },
            Duration::ZERO,
        );
    }

    /// Post a cache reset with the configured retry budget.
    pub fn post_reset_caches_default(&mut self, try_resume_suggestions: bool) {
        let tries = self.config.reset_caches_max_tries;
        self.post_reset_caches(try_resume_suggestions, tries);
    }

    pub fn post_wait_for_dictionary_load(&mut self) {
        self.scheduler.post(
            Event::WaitForDictionaryLoad,
            self.config.wait_for_dictionary_load(),
        );
    }

    pub fn cancel_wait_for_dictionary_load(&mut self) {
        self.scheduler.cancel(EventKind::WaitForDictionaryLoad);
    }

    pub fn has_pending_wait_for_dictionary_load(&self) -> bool {
        self.scheduler.has_pending(EventKind::WaitForDictionaryLoad)
    }

    pub fn post_deallocate_memory(&mut self) {
        self.scheduler
            .post(Event::DeallocateMemory, self.config.deallocate_memory());
    }

    pub fn cancel_deallocate_memory(&mut self) {
        self.scheduler.cancel(EventKind::DeallocateMemory);
    }

    pub fn has_pending_deallocate_memory(&self) -> bool {
        self.scheduler.has_pending(EventKind::DeallocateMemory)
    }

    pub fn show_suggestion_strip(&mut self, words: SuggestedWords) {
        self.scheduler.post(
            Event::ShowSuggestionStrip {
                words,
                preview: GesturePreview::None,
            },
            Duration::ZERO,
        );
    }

    pub fn show_gesture_preview_and_suggestion_strip(
        &mut self,
        words: SuggestedWords,
        dismiss_preview: bool,
    ) {
        let preview = if dismiss_preview {
            GesturePreview::Dismiss
        } else {
            GesturePreview::Show
        };
        self.scheduler
            .post(Event::ShowSuggestionStrip { words, preview }, Duration::ZERO);
    }

    pub fn show_tail_batch_input_result(&mut self, words: SuggestedWords) {
        self.scheduler.post(
            Event::UpdateTailBatchInputCompleted { words },
            Duration::ZERO,
        );
    }

    pub fn post_switch_language(&mut self, alternative: Alternative) {
        self.scheduler
            .post(Event::SwitchLanguage { alternative }, Duration::ZERO);
    }

    // ========== Host lifecycle notifications ==========

    pub fn begin_reconfiguration(&mut self) {
        let owner = self.owner.upgrade();
        let mut guard = owner.as_ref().and_then(|rc| Self::borrow_for_gate(rc));
        self.gate
            .begin_reconfiguration(&mut self.scheduler, guard.as_deref_mut());
    }

    pub fn on_session_start(&mut self, context: &EditorContext, restarting: bool) {
        let owner = self.owner.upgrade();
        let mut guard = owner.as_ref().and_then(|rc| Self::borrow_for_gate(rc));
        self.gate.on_session_start(
            &mut self.scheduler,
            guard.as_deref_mut(),
            context,
            restarting,
        );
    }

    pub fn on_session_start_view(&mut self, context: &EditorContext, restarting: bool) {
        let owner = self.owner.upgrade();
        let mut guard = owner.as_ref().and_then(|rc| Self::borrow_for_gate(rc));
        self.gate.on_session_start_view(
            &mut self.scheduler,
            guard.as_deref_mut(),
            &self.config,
            context,
            restarting,
        );
    }

    pub fn on_finish_view(&mut self, finishing_session: bool) {
        let owner = self.owner.upgrade();
        let mut guard = owner.as_ref().and_then(|rc| Self::borrow_for_gate(rc));
        self.gate.on_finish_view(
            &mut self.scheduler,
            guard.as_deref_mut(),
            &self.config,
            finishing_session,
        );
    }

    pub fn on_finish_session(&mut self) {
        let owner = self.owner.upgrade();
        let mut guard = owner.as_ref().and_then(|rc| Self::borrow_for_gate(rc));
        self.gate
            .on_finish_session(&mut self.scheduler, guard.as_deref_mut());
    }

    fn borrow_for_gate(owner: &Rc<RefCell<O>>) -> Option<std::cell::RefMut<'_, O>> {
        match owner.try_borrow_mut() {
            Ok(owner) => Some(owner),
            Err(_) => {
                warn!("owner busy during lifecycle notification, not forwarding");
                None
            }
        }
    }
}
