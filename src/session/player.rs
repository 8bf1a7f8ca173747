use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::content::fetch::Fetcher;
use crate::foundation::core::Millis;
use crate::foundation::error::ZonecastResult;
use crate::model::records::Screen;
use crate::render::frame::Frame;
use crate::session::presentation::{Presentation, PresentationOpts, SessionEvent};
use crate::session::program::Program;
use crate::store::{RecordStore, RecordStoreExt};

/// Interval between `last_seen` updates.
pub const HEARTBEAT_MS: u64 = 30_000;

/// Interval between checks for changed content.
pub const POLL_MS: u64 = 15_000;

/// Player timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerTiming {
    /// Heartbeat interval in milliseconds.
    pub heartbeat_ms: u64,
    /// Freshness poll interval in milliseconds.
    pub poll_ms: u64,
}

impl Default for PlayerTiming {
    fn default() -> Self {
        Self {
            heartbeat_ms: HEARTBEAT_MS,
            poll_ms: POLL_MS,
        }
    }
}

/// A screen paired by code, playing whatever playlist the store assigns it.
pub struct ScreenPlayer<S: RecordStore> {
    store: S,
    screen: Screen,
    presentation: Presentation,
    wall_origin: DateTime<Utc>,
    fingerprint: String,
}

impl<S: RecordStore> std::fmt::Debug for ScreenPlayer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenPlayer")
            .field("screen", &self.screen.id)
            .field("presentation", &self.presentation)
            .finish_non_exhaustive()
    }
}

fn fingerprint(screen: &Screen, program: &Program) -> String {
    format!(
        "{}|{}",
        screen.current_playlist_id.as_deref().unwrap_or_default(),
        program.revision
    )
}

impl<S: RecordStore> ScreenPlayer<S> {
    /// Look a screen up by pairing code and resolve its current playlist.
    pub fn resolve(store: &S, code: &str) -> ZonecastResult<(Screen, Program)> {
        let screen = store.screen_by_code(code)?;
        let program = Program::for_screen(store, &screen)?;
        Ok((screen, program))
    }

    /// Pair with the screen for `code`, mark it online and start playback at session time 0.
    #[tracing::instrument(skip(store, fetcher, opts))]
    pub fn connect(
        mut store: S,
        code: &str,
        fetcher: Rc<dyn Fetcher>,
        opts: PresentationOpts,
        timing: PlayerTiming,
    ) -> ZonecastResult<Self> {
        let (mut screen, program) = Self::resolve(&store, code)?;
        let wall_origin = opts.wall_origin;
        screen.status = "online".to_string();
        screen.last_seen = Some(wall_origin);
        store.update(&screen)?;
        tracing::info!(screen = %screen.id, entries = program.entries.len(), "screen connected");

        let fingerprint = fingerprint(&screen, &program);
        let mut presentation = Presentation::new(program, fetcher, opts);
        presentation.start(Millis::ZERO);
        presentation.enable_heartbeat(timing.heartbeat_ms);
        presentation.enable_poll(timing.poll_ms);
        Ok(Self {
            store,
            screen,
            presentation,
            wall_origin,
            fingerprint,
        })
    }

    /// The paired screen as last read.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store, e.g. to simulate edits in tests.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The running presentation.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    fn wall(&self, now: Millis) -> DateTime<Utc> {
        self.wall_origin + chrono::Duration::milliseconds(i64::try_from(now.0).unwrap_or(i64::MAX))
    }

    /// Advance to `now`, handling heartbeats and content polls along the way.
    pub fn tick(&mut self, now: Millis) -> ZonecastResult<Vec<SessionEvent>> {
        let events = self.presentation.advance_to(now);
        let mut out = Vec::with_capacity(events.len());
        for ev in events {
            match ev {
                SessionEvent::Heartbeat => self.heartbeat(now)?,
                SessionEvent::Poll => {
                    out.extend(self.check_for_updates(now)?);
                }
                _ => {}
            }
            out.push(ev);
        }
        Ok(out)
    }

    /// Re-read the paired screen; `None` once its row has been deleted.
    fn reread_screen(&self) -> ZonecastResult<Option<Screen>> {
        self.store.find::<Screen>(&self.screen.id)
    }

    fn heartbeat(&mut self, now: Millis) -> ZonecastResult<()> {
        let Some(mut screen) = self.reread_screen()? else {
            tracing::warn!(screen = %self.screen.id, "screen missing, skipping heartbeat");
            return Ok(());
        };
        screen.status = "online".to_string();
        screen.last_seen = Some(self.wall(now));
        self.store.update(&screen)?;
        tracing::debug!(screen = %screen.id, "heartbeat");
        self.screen = screen;
        Ok(())
    }

    /// Re-read the screen and its playlist; reload playback when anything changed.
    ///
    /// A screen deleted from the store shows [`ScreenState::NotFound`] and keeps polling, so
    /// playback resumes if the row comes back.
    ///
    /// [`ScreenState::NotFound`]: crate::render::frame::ScreenState::NotFound
    pub fn check_for_updates(&mut self, now: Millis) -> ZonecastResult<Vec<SessionEvent>> {
        let (program, fp) = match self.reread_screen()? {
            Some(screen) => {
                let program = Program::for_screen(&self.store, &screen)?;
                let fp = fingerprint(&screen, &program);
                self.screen = screen;
                (program, fp)
            }
            None => {
                let program = Program::not_found(format!("screen '{}'", self.screen.id));
                let fp = program.revision.clone();
                if fp != self.fingerprint {
                    tracing::warn!(screen = %self.screen.id, "screen removed from store");
                }
                (program, fp)
            }
        };
        if fp == self.fingerprint {
            return Ok(Vec::new());
        }
        tracing::info!(screen = %self.screen.id, "content changed, reloading");
        self.fingerprint = fp;
        Ok(self.presentation.reload(program, now))
    }

    /// What the screen shows at `now`.
    pub fn frame(&self, now: Millis) -> Frame {
        self.presentation.frame(now)
    }

    /// Stop playback, mark the screen offline and hand the store back.
    pub fn disconnect(mut self) -> ZonecastResult<S> {
        self.presentation.teardown();
        match self.reread_screen()? {
            Some(mut screen) => {
                screen.status = "offline".to_string();
                self.store.update(&screen)?;
                tracing::info!(screen = %screen.id, "screen disconnected");
            }
            None => {
                tracing::warn!(screen = %self.screen.id, "screen missing, not marked offline");
            }
        }
        Ok(self.store)
    }

    /// Drive the player against the monotonic clock.
    ///
    /// Sleeps until the next timer or `tick`, whichever comes first, and calls `on_frame`
    /// whenever something happened. Returns after `run_for` when given.
    pub fn run_realtime(
        &mut self,
        tick: Duration,
        run_for: Option<Duration>,
        mut on_frame: impl FnMut(&Frame, &[SessionEvent]),
    ) -> ZonecastResult<()> {
        let started = Instant::now();
        on_frame(&self.frame(Millis::ZERO), &[]);
        loop {
            let elapsed = started.elapsed();
            if run_for.is_some_and(|limit| elapsed >= limit) {
                return Ok(());
            }
            let now = Millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
            let events = self.tick(now)?;
            if !events.is_empty() {
                on_frame(&self.frame(now), &events);
            }
            let wait = self
                .presentation
                .next_deadline()
                .map(|d| Duration::from_millis(d.since(now)))
                .unwrap_or(tick)
                .min(tick);
            std::thread::sleep(wait);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/player.rs"]
mod tests;
