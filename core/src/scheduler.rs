// core/src/scheduler.rs
//
// Delay-ordered queue of deferred events on a logical clock.
// The scheduler never runs anything itself; the handler pops due events and
// dispatches them, which keeps the queue free of callbacks and borrows.

use crate::event::{Event, EventKind};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
struct Entry {
    fire_at: Duration,
    seq: u64,
    event: Event,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .cmp(&other.fire_at)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Single-threaded timer queue keyed by fire time.
///
/// Time only moves when the owner of the scheduler says so (`advance_to`),
/// which makes every ordering decision reproducible. Events with the same
/// deadline fire in posting order.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `event` to fire `delay` after now.
    ///
    /// Kinds that coalesce cancel their pending instances first, so at most
    /// one occurrence is outstanding afterwards.
    pub fn post(&mut self, event: Event, delay: Duration) {
        let kind = event.kind();
        for superseded in kind.superseded_kinds() {
            self.cancel(*superseded);
        }
        let fire_at = self.now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!(?kind, delay_ms = delay.as_millis() as u64, "scheduled event");
        self.queue.push(Reverse(Entry {
            fire_at,
            seq,
            event,
        }));
    }

    /// Remove every pending instance of `kind`. Returns how many were removed.
    pub fn cancel(&mut self, kind: EventKind) -> usize {
        let before = self.queue.len();
        self.queue.retain(|Reverse(entry)| entry.event.kind() != kind);
        let removed = before - self.queue.len();
        if removed > 0 {
            debug!(?kind, removed, "cancelled event");
        }
        removed
    }

    pub fn has_pending(&self, kind: EventKind) -> bool {
        self.queue
            .iter()
            .any(|Reverse(entry)| entry.event.kind() == kind)
    }

    /// Number of pending instances of `kind`.
    pub fn pending_count(&self, kind: EventKind) -> usize {
        self.queue
            .iter()
            .filter(|Reverse(entry)| entry.event.kind() == kind)
            .count()
    }

    /// Pending kinds in firing order, duplicates included.
    pub fn pending_kinds(&self) -> Vec<EventKind> {
        let mut entries: Vec<&Entry> = self.queue.iter().map(|Reverse(e)| e).collect();
        entries.sort();
        entries.into_iter().map(|e| e.event.kind()).collect()
    }

    /// Drop everything. Used to reset state between test cases.
    pub fn remove_all(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Fire time of the earliest pending event.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.fire_at)
    }

    /// Pop the earliest event if it is due at the current time.
    pub fn pop_due(&mut self) -> Option<Event> {
        self.pop_until(self.now)
    }

    /// Pop the earliest event if it fires at or before `deadline`, moving the
    /// clock forward to its fire time.
    pub fn pop_until(&mut self, deadline: Duration) -> Option<Event> {
        let due = matches!(self.queue.peek(), Some(Reverse(entry)) if entry.fire_at <= deadline);
        if !due {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.fire_at);
        Some(entry.event)
    }

    /// Move the clock forward. Never moves it backwards.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}
