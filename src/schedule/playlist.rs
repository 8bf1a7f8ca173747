use crate::foundation::core::Millis;
use crate::schedule::Dwell;
use crate::schedule::sequence::Sequencer;
use crate::schedule::timer::{Fired, TimerQueue, TimerTarget};

/// Selects the active playlist entry.
///
/// A single-entry playlist shows its entry indefinitely; no timer is armed for it.
#[derive(Debug)]
pub struct PlaylistScheduler {
    seq: Sequencer,
}

impl Default for PlaylistScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistScheduler {
    /// Idle scheduler.
    pub fn new() -> Self {
        Self {
            seq: Sequencer::new(TimerTarget::Playlist),
        }
    }

    /// Active entry for a playlist of `len` entries.
    pub fn current(&self, len: usize) -> Option<usize> {
        self.seq.current(len)
    }

    /// Whether an advance is scheduled.
    pub fn is_armed(&self) -> bool {
        self.seq.pending().is_some()
    }

    /// Activate entry 0. Returns it, or `None` for an empty playlist.
    pub fn start<T: Dwell>(
        &mut self,
        timers: &mut TimerQueue,
        now: Millis,
        entries: &[T],
    ) -> Option<usize> {
        self.seq.reset(timers);
        let first = entries.first()?;
        if entries.len() > 1 {
            self.seq.arm_at(timers, now.after(first.dwell_ms()));
        }
        Some(0)
    }

    /// Handle a fired timer. Returns the newly active entry when `fired` was the playlist timer.
    pub fn on_fire<T: Dwell>(
        &mut self,
        timers: &mut TimerQueue,
        fired: &Fired,
        entries: &[T],
    ) -> Option<usize> {
        let next = self.seq.advance(fired, entries.len())?;
        if entries.len() > 1 {
            self.seq
                .arm_at(timers, fired.deadline.after(entries[next].dwell_ms()));
        }
        Some(next)
    }

    /// Cancel the pending timer.
    pub fn stop(&mut self, timers: &mut TimerQueue) {
        self.seq.cancel(timers);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/playlist.rs"]
mod tests;
