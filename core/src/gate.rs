//! Reconfiguration gate.
//!
//! During an orientation change the host tears the surface down and builds
//! it again, emitting start/finish notifications in an order it does not
//! guarantee. The gate opens a bounded guard window after the first
//! post-reconfiguration start-view, buffers finish/start notifications that
//! arrive inside it, and replays them in causal order (finish view, finish
//! session, start session) on the next notification that is let through.
//!
//! The guard window is the presence of a pending
//! [`EventKind::PendingImsCallback`] in the scheduler. When that timer fires
//! the window closes; anything still buffered waits for the next real
//! notification to flush it.

use crate::collaborators::{KeyboardSwitcher, SessionController};
use crate::config::HandlerConfig;
use crate::context::EditorContext;
use crate::event::{Event, EventKind};
use crate::scheduler::Scheduler;
use tracing::debug;

/// Notifications deferred while the guard window was open.
///
/// Always drained as one value, so the three flags clear together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingCallbacks {
    pub start: bool,
    pub finish_view: bool,
    pub finish: bool,
}

impl PendingCallbacks {
    pub fn is_empty(&self) -> bool {
        !self.start && !self.finish_view && !self.finish
    }
}

/// Gate state.
///
/// `reconfiguring` and `awaiting_start_view` move independently: a second
/// `begin_reconfiguration` after the first restarting start must not forget
/// that the next start-view still has to open the guard window.
#[derive(Debug, Clone, Default)]
pub struct ReconfigurationGate {
    /// The host announced a layout change; waiting for the restarting start.
    reconfiguring: bool,
    /// The first post-reconfiguration start arrived; the next start-view
    /// opens the guard window.
    awaiting_start_view: bool,
    pending: PendingCallbacks,
    applied_context: Option<EditorContext>,
}

impl ReconfigurationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reconfiguring(&self) -> bool {
        self.reconfiguring
    }

    pub fn awaiting_start_view(&self) -> bool {
        self.awaiting_start_view
    }

    /// Context last applied to a visible view, if any.
    pub fn applied_context(&self) -> Option<&EditorContext> {
        self.applied_context.as_ref()
    }

    /// Notifications buffered by the guard window and not yet replayed.
    pub fn pending(&self) -> PendingCallbacks {
        self.pending
    }

    pub fn guard_active(scheduler: &Scheduler) -> bool {
        scheduler.has_pending(EventKind::PendingImsCallback)
    }

    /// Forget everything, including the applied context.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn begin_reconfiguration<O: SessionController>(
        &mut self,
        scheduler: &mut Scheduler,
        owner: Option<&mut O>,
    ) {
        scheduler.cancel(EventKind::PendingImsCallback);
        let dropped = self.take_pending();
        self.reconfiguring = true;
        debug!(?dropped, "reconfiguration started");
        if let Some(owner) = owner {
            if owner.is_view_shown() {
                owner.keyboard().persist_visual_state();
            }
        }
    }

    pub fn on_session_start<O: SessionController>(
        &mut self,
        scheduler: &mut Scheduler,
        owner: Option<&mut O>,
        context: &EditorContext,
        restarting: bool,
    ) {
        if Self::guard_active(scheduler) {
            // Typically the second start after the orientation change.
            self.buffer(|pending| pending.start = true);
            return;
        }
        if self.reconfiguring && restarting {
            debug!("first start after reconfiguration");
            self.reconfiguring = false;
            self.awaiting_start_view = true;
        }
        if let Some(owner) = owner {
            self.flush(owner, Some(context), restarting);
            owner.on_session_start_internal(Some(context), restarting);
        }
    }

    pub fn on_session_start_view<O: SessionController>(
        &mut self,
        scheduler: &mut Scheduler,
        owner: Option<&mut O>,
        config: &HandlerConfig,
        context: &EditorContext,
        restarting: bool,
    ) {
        let redundant = self
            .applied_context
            .as_ref()
            .is_some_and(|applied| applied.is_equivalent_for_keyboard(context));
        if Self::guard_active(scheduler) && redundant {
            // Typically the second start-view after the orientation change.
            let dropped = self.take_pending();
            debug!(?dropped, "suppressed redundant start view");
            return;
        }
        if self.awaiting_start_view {
            self.awaiting_start_view = false;
            let stale = self.take_pending();
            if !stale.is_empty() {
                debug!(?stale, "discarding notifications left by an expired guard");
            }
            scheduler.cancel(EventKind::PendingImsCallback);
            scheduler.post(Event::PendingImsCallback, config.pending_ims_callback());
            debug!("guard window opened");
        }
        if let Some(owner) = owner {
            self.flush(owner, Some(context), restarting);
            owner.on_session_start_view_internal(context, restarting);
            self.applied_context = Some(context.clone());
        }
        scheduler.cancel(EventKind::DeallocateMemory);
    }

    pub fn on_finish_view<O: SessionController>(
        &mut self,
        scheduler: &mut Scheduler,
        owner: Option<&mut O>,
        config: &HandlerConfig,
        finishing_session: bool,
    ) {
        if Self::guard_active(scheduler) {
            // Typically the first finish-view after the orientation change.
            self.buffer(|pending| pending.finish_view = true);
            return;
        }
        if let Some(owner) = owner {
            owner.on_finish_view_internal(finishing_session);
            self.applied_context = None;
        }
        if !scheduler.has_pending(EventKind::DeallocateMemory) {
            scheduler.post(Event::DeallocateMemory, config.deallocate_memory());
        }
    }

    pub fn on_finish_session<O: SessionController>(
        &mut self,
        scheduler: &mut Scheduler,
        owner: Option<&mut O>,
    ) {
        if Self::guard_active(scheduler) {
            // Typically the first finish after the orientation change.
            self.buffer(|pending| pending.finish = true);
            return;
        }
        if let Some(owner) = owner {
            self.flush(owner, None, false);
            owner.on_finish_session_internal();
        }
    }

    fn buffer(&mut self, record: impl FnOnce(&mut PendingCallbacks)) {
        record(&mut self.pending);
        debug!(pending = ?self.pending, "deferred notification");
    }

    fn take_pending(&mut self) -> PendingCallbacks {
        std::mem::take(&mut self.pending)
    }

    fn flush<O: SessionController>(
        &mut self,
        owner: &mut O,
        context: Option<&EditorContext>,
        restarting: bool,
    ) {
        let pending = self.take_pending();
        if pending.is_empty() {
            return;
        }
        debug!(?pending, "replaying deferred notifications");
        if pending.finish_view {
            owner.on_finish_view_internal(pending.finish);
        }
        if pending.finish {
            owner.on_finish_session_internal();
        }
        if pending.start {
            owner.on_session_start_internal(context, restarting);
        }
    }
}
