//! Timers and the single-shot schedulers built on them.

/// Playlist-level scheduler.
pub mod playlist;
/// Cursor advanced by a single pending timer.
pub mod sequence;
/// Timer queue.
pub mod timer;
/// Zone-level scheduler.
pub mod zone;

use crate::model::layout::{TimelineItem, dwell_ms};
use crate::model::records::PlaylistItem;

/// Anything with a dwell time.
pub trait Dwell {
    /// Milliseconds to stay on this element.
    fn dwell_ms(&self) -> u64;
}

impl Dwell for TimelineItem {
    fn dwell_ms(&self) -> u64 {
        TimelineItem::dwell_ms(self)
    }
}

impl Dwell for PlaylistItem {
    fn dwell_ms(&self) -> u64 {
        dwell_ms(self.duration)
    }
}
