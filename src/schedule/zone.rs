use crate::foundation::core::Millis;
use crate::schedule::Dwell;
use crate::schedule::sequence::Sequencer;
use crate::schedule::timer::{Fired, TimerQueue, TimerTarget, ZoneSlot};

/// Observable state of a zone scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum ZoneState {
    /// Empty timeline; no timer armed.
    Idle,
    /// Showing the item at this index.
    Index(usize),
}

/// Plays one zone timeline: dwell on each item for its duration, then move to the next,
/// wrapping at the end.
#[derive(Debug)]
pub struct ZoneScheduler {
    seq: Sequencer,
}

impl ZoneScheduler {
    /// Idle scheduler for `slot`.
    pub fn new(slot: ZoneSlot) -> Self {
        Self {
            seq: Sequencer::new(TimerTarget::Zone(slot)),
        }
    }

    /// State for a timeline of `len` items.
    pub fn state(&self, len: usize) -> ZoneState {
        match self.seq.current(len) {
            Some(i) => ZoneState::Index(i),
            None => ZoneState::Idle,
        }
    }

    /// Current item index, `None` when idle.
    pub fn current(&self, len: usize) -> Option<usize> {
        self.seq.current(len)
    }

    /// Begin at item 0. An empty timeline stays idle.
    pub fn start<T: Dwell>(&mut self, timers: &mut TimerQueue, now: Millis, timeline: &[T]) {
        self.seq.reset(timers);
        if let Some(first) = timeline.first() {
            self.seq.arm_at(timers, now.after(first.dwell_ms()));
        }
    }

    /// Handle a fired timer. Returns the new index when `fired` belonged to this zone.
    ///
    /// The next dwell is measured from the fired deadline so late delivery does not drift.
    pub fn on_fire<T: Dwell>(
        &mut self,
        timers: &mut TimerQueue,
        fired: &Fired,
        timeline: &[T],
    ) -> Option<usize> {
        let next = self.seq.advance(fired, timeline.len())?;
        self.seq
            .arm_at(timers, fired.deadline.after(timeline[next].dwell_ms()));
        Some(next)
    }

    /// Reconcile with an edited timeline without restarting the current dwell.
    ///
    /// An emptied timeline goes idle, a previously idle one starts at item 0, and otherwise the
    /// index is wrapped into the new length.
    pub fn sync<T: Dwell>(&mut self, timers: &mut TimerQueue, now: Millis, timeline: &[T]) {
        if timeline.is_empty() {
            self.seq.reset(timers);
        } else if self.seq.pending().is_none() {
            self.start(timers, now, timeline);
        } else {
            self.seq.set_index(self.seq.index(), timeline.len());
        }
    }

    /// Move to another slot, keeping the pending deadline.
    pub fn retarget(&mut self, timers: &mut TimerQueue, slot: ZoneSlot) {
        self.seq.retarget(timers, TimerTarget::Zone(slot));
    }

    /// Cancel the pending timer.
    pub fn stop(&mut self, timers: &mut TimerQueue) {
        self.seq.cancel(timers);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/zone.rs"]
mod tests;
