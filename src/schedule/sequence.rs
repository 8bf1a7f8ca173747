use crate::foundation::core::Millis;
use crate::schedule::timer::{Fired, TimerId, TimerQueue, TimerTarget};

/// Cursor over an ordered list advanced by one pending single-shot timer.
///
/// The list itself is not owned; callers pass its current length so live edits are seen on the
/// next advance.
#[derive(Debug)]
pub struct Sequencer {
    index: usize,
    pending: Option<TimerId>,
    target: TimerTarget,
}

impl Sequencer {
    /// Idle cursor at index 0 whose timers carry `target`.
    pub fn new(target: TimerTarget) -> Self {
        Self {
            index: 0,
            pending: None,
            target,
        }
    }

    /// Raw index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current position in a list of `len` elements, wrapped; `None` for an empty list.
    pub fn current(&self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.index % len)
    }

    /// The pending timer, if any.
    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    /// Target stamped on armed timers.
    pub fn target(&self) -> TimerTarget {
        self.target
    }

    /// Re-target future and pending timers (e.g. after the owner moved to another index). The
    /// pending timer keeps its deadline.
    pub fn retarget(&mut self, timers: &mut TimerQueue, target: TimerTarget) {
        self.target = target;
        if let Some(id) = self.pending.take()
            && let Some(deadline) = timers.deadline(id)
        {
            timers.cancel(id);
            self.pending = Some(timers.arm_at(deadline, target));
        }
    }

    /// Replace the pending timer with one firing at `deadline`.
    pub fn arm_at(&mut self, timers: &mut TimerQueue, deadline: Millis) {
        self.cancel(timers);
        self.pending = Some(timers.arm_at(deadline, self.target));
    }

    /// Cancel the pending timer.
    pub fn cancel(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.pending.take() {
            timers.cancel(id);
        }
    }

    /// Cancel and rewind to index 0.
    pub fn reset(&mut self, timers: &mut TimerQueue) {
        self.cancel(timers);
        self.index = 0;
    }

    /// Set the index directly (wrapped into `len` when non-empty).
    pub fn set_index(&mut self, index: usize, len: usize) {
        self.index = if len == 0 { 0 } else { index % len };
    }

    /// Consume `fired` if it is this cursor's pending timer and step to the next element.
    ///
    /// Returns the new position, or `None` when `fired` is stale or the list is empty.
    pub fn advance(&mut self, fired: &Fired, len: usize) -> Option<usize> {
        if self.pending != Some(fired.id) {
            return None;
        }
        self.pending = None;
        if len == 0 {
            self.index = 0;
            return None;
        }
        self.index = (self.index % len + 1) % len;
        Some(self.index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/sequence.rs"]
mod tests;
