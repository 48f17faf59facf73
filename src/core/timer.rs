//! Generation-Tagged Timers
//!
//! Every delayed action in the engine (countdowns, per-step deadlines,
//! reveal steps, feedback delays, tournament duration) is a [`Timer`] held
//! in an owned [`TimerQueue`]. Each timer records the generation of its
//! owner at scheduling time; the owner's [`CancelGuard`] only admits timers
//! from the current generation while it is active. A `reset` or terminal
//! transition bumps the generation and drains the queue, so a callback
//! captured earlier can never act on the new round.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use super::clock::Tick;

/// Monotonic round counter used to invalidate stale timers.
pub type Generation = u64;

/// Identifier of a scheduled timer, unique within one queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// A scheduled callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer<K> {
    /// Queue-unique identifier.
    pub id: TimerId,
    /// What to do when the timer fires.
    pub kind: K,
    /// Absolute tick at which the timer is due.
    pub due: Tick,
    /// Owner generation captured when the timer was scheduled.
    pub generation: Generation,
}

/// Owned queue of pending timers, ordered by due tick then scheduling order.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    pending: BTreeMap<(Tick, TimerId), Timer<K>>,
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<K: Clone> TimerQueue<K> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer and return a copy of it.
    pub fn schedule(&mut self, kind: K, due: Tick, generation: Generation) -> Timer<K> {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let timer = Timer { id, kind, due, generation };
        self.pending.insert((due, id), timer.clone());

        #[cfg(feature = "debug-tracing")]
        tracing::trace!(timer = id.0, due, generation, "timer scheduled");

        timer
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Tick) -> Option<Timer<K>> {
        let key = *self.pending.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.pending.remove(&key)
    }

    /// Cancel a single timer. Returns true if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.pending.keys().find(|(_, tid)| *tid == id).copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    /// Cancel every timer whose kind matches the predicate.
    ///
    /// Returns the number of timers removed.
    pub fn cancel_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let before = self.pending.len();
        self.pending.retain(|_, timer| !pred(&timer.kind));
        before - self.pending.len()
    }

    /// Cancel everything. Returns the number of timers removed.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Due tick of the first pending timer matching the predicate.
    pub fn due_of<F>(&self, mut pred: F) -> Option<Tick>
    where
        F: FnMut(&K) -> bool,
    {
        self.pending
            .values()
            .find(|timer| pred(&timer.kind))
            .map(|timer| timer.due)
    }

    /// Iterate pending timers in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &Timer<K>> {
        self.pending.values()
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Active flag plus generation counter shared by all timers of one owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelGuard {
    generation: Generation,
    active: bool,
}

impl CancelGuard {
    /// Create an inactive guard at generation 0.
    pub const fn new() -> Self {
        Self {
            generation: 0,
            active: false,
        }
    }

    /// Current generation.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether timers are currently admitted at all.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open a new generation and start admitting its timers.
    pub fn arm(&mut self) -> Generation {
        self.generation += 1;
        self.active = true;
        self.generation
    }

    /// Close the current generation.
    ///
    /// Always bumps the generation. Returns true only for the call that
    /// actually deactivated the guard, so callers can run their one-time
    /// cleanup exactly once.
    pub fn invalidate(&mut self) -> bool {
        self.generation += 1;
        let was_active = self.active;
        self.active = false;
        was_active
    }

    /// Whether a timer captured under `generation` may still act.
    #[inline]
    pub fn admits(&self, generation: Generation) -> bool {
        self.active && generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Kind {
        Deadline,
        Feedback,
    }

    #[test]
    fn test_pop_due_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Kind::Feedback, 5, 1);
        queue.schedule(Kind::Deadline, 3, 1);
        queue.schedule(Kind::Feedback, 3, 1);

        assert!(queue.pop_due(2).is_none());

        let first = queue.pop_due(3).unwrap();
        assert_eq!(first.kind, Kind::Deadline);
        let second = queue.pop_due(3).unwrap();
        assert_eq!(second.kind, Kind::Feedback);
        assert_eq!(second.due, 3);
        assert!(queue.pop_due(4).is_none());
        assert_eq!(queue.pop_due(10).unwrap().due, 5);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_single_and_by_kind() {
        let mut queue = TimerQueue::new();
        let a = queue.schedule(Kind::Deadline, 3, 1);
        queue.schedule(Kind::Feedback, 4, 1);
        queue.schedule(Kind::Deadline, 9, 1);

        assert!(queue.cancel(a.id));
        assert!(!queue.cancel(a.id));
        assert_eq!(queue.cancel_where(|k| *k == Kind::Deadline), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.due_of(|k| *k == Kind::Feedback), Some(4));
        assert_eq!(queue.cancel_all(), 1);
        assert_eq!(queue.cancel_all(), 0);
    }

    #[test]
    fn test_guard_rejects_stale_generation() {
        let mut guard = CancelGuard::new();
        assert!(!guard.admits(0));

        let first = guard.arm();
        assert!(guard.admits(first));

        assert!(guard.invalidate());
        assert!(!guard.admits(first));

        let second = guard.arm();
        assert_ne!(first, second);
        assert!(!guard.admits(first));
        assert!(guard.admits(second));
    }

    #[test]
    fn test_guard_invalidates_once() {
        let mut guard = CancelGuard::new();
        guard.arm();
        let g = guard.generation();
        assert!(guard.invalidate());
        assert!(!guard.invalidate());
        assert!(guard.generation() > g + 1);
    }
}
