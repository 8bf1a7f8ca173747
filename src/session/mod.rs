//! Running presentations: resolved programs, the timer-driven presentation and the screen
//! player that pairs a device with its playlist.

/// Timer-driven playback of one program.
pub mod presentation;
/// Screen pairing, heartbeats and reloads.
pub mod player;
/// Playlist resolution against the store.
pub mod program;
