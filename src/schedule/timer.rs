use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::foundation::core::Millis;

/// Handle of an armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Which zone a zone timer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneSlot {
    /// Zone at this index of the active layout.
    Index(usize),
    /// The layout-wide timeline shown in place of zones.
    Global,
}

/// Which content runtime a refresh or rotation timer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSlot {
    /// Overlay widget at this index of the active layout.
    Widget(usize),
    /// The app of the active playlist entry.
    App,
}

/// What a timer drives when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerTarget {
    /// Advance the playlist.
    Playlist,
    /// Advance a zone timeline.
    Zone(ZoneSlot),
    /// Refresh a content runtime through its cache.
    Refresh(SourceSlot),
    /// Rotate a feed to its next entry.
    Rotate(SourceSlot),
    /// Report liveness.
    Heartbeat,
    /// Check whether stored content changed.
    Poll,
}

/// A timer that came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    /// Handle returned when it was armed.
    pub id: TimerId,
    /// Scheduled instant; follow-up timers are armed relative to this, not to the observed time.
    pub deadline: Millis,
    /// What it drives.
    pub target: TimerTarget,
}

/// Single-threaded queue of one-shot timers.
///
/// Timers fire in deadline order; equal deadlines fire in the order they were armed. A cancelled
/// timer never fires.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<(Millis, u64)>>,
    live: HashMap<u64, (Millis, TimerTarget)>,
    next_seq: u64,
}

impl TimerQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer firing `delay_ms` after `now`.
    pub fn arm(&mut self, now: Millis, delay_ms: u64, target: TimerTarget) -> TimerId {
        self.arm_at(now.after(delay_ms), target)
    }

    /// Arm a timer firing at `deadline`.
    pub fn arm_at(&mut self, deadline: Millis, target: TimerTarget) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((deadline, seq)));
        self.live.insert(seq, (deadline, target));
        TimerId(seq)
    }

    /// Cancel a timer. Returns `false` when it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id.0).is_some()
    }

    /// Whether `id` is still armed.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains_key(&id.0)
    }

    /// Deadline of an armed timer.
    pub fn deadline(&self, id: TimerId) -> Option<Millis> {
        self.live.get(&id.0).map(|(d, _)| *d)
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.purge_cancelled();
        self.heap.peek().map(|Reverse((d, _))| *d)
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<Fired> {
        self.purge_cancelled();
        let Reverse((deadline, seq)) = *self.heap.peek()?;
        if deadline > now {
            return None;
        }
        self.heap.pop();
        let (_, target) = self.live.remove(&seq)?;
        Some(Fired {
            id: TimerId(seq),
            deadline,
            target,
        })
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no timer is armed.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Cancel every timer.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }

    fn purge_cancelled(&mut self) {
        while let Some(Reverse((_, seq))) = self.heap.peek() {
            if self.live.contains_key(seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timer.rs"]
mod tests;
