use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::content::fetch::Fetcher;
use crate::foundation::core::Millis;
use crate::model::layout::{Layout, WidgetConfig};
use crate::render::compositor::{LayoutState, compose_layout};
use crate::render::frame::{Frame, ScreenState};
use crate::schedule::playlist::PlaylistScheduler;
use crate::schedule::timer::{Fired, SourceSlot, TimerId, TimerQueue, TimerTarget, ZoneSlot};
use crate::schedule::zone::ZoneScheduler;
use crate::session::program::{EntryContent, Program};
use crate::widgets::WidgetContent;
use crate::widgets::runtime::{ContentRuntime, FEED_ROTATION_MS};

/// Construction options for a [`Presentation`].
#[derive(Clone, Debug)]
pub struct PresentationOpts {
    /// Relay used for feed requests.
    pub proxy_base: Option<url::Url>,
    /// Wall-clock time at session start; clocks read `wall_origin + now`.
    pub wall_origin: DateTime<Utc>,
    /// Seed for random picks (quote pool, image URLs).
    pub seed: u64,
}

impl Default for PresentationOpts {
    fn default() -> Self {
        Self {
            proxy_base: None,
            wall_origin: Utc::now(),
            seed: 0,
        }
    }
}

/// Something observable that happened while advancing time.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Playlist entry `index` became active.
    Activated {
        /// Entry position.
        index: usize,
        /// Playlist item id.
        entry_id: String,
    },
    /// A zone moved to its next item.
    ZoneAdvanced {
        /// Zone id, or `timeline` for the global timeline.
        zone_id: String,
        /// New item index.
        index: usize,
    },
    /// A widget or app pulled fresh content.
    Refreshed {
        /// Which source.
        source: SourceSlot,
    },
    /// A rotating source moved to its next entry.
    Rotated {
        /// Which source.
        source: SourceSlot,
        /// New entry index.
        index: usize,
    },
    /// Heartbeat interval elapsed.
    Heartbeat,
    /// Freshness poll interval elapsed.
    Poll,
}

#[derive(Debug)]
struct SourceRun {
    runtime: ContentRuntime,
    refresh: Option<TimerId>,
    rotate: Option<TimerId>,
}

impl SourceRun {
    fn start(
        mut runtime: ContentRuntime,
        slot: SourceSlot,
        now: Millis,
        timers: &mut TimerQueue,
        fetcher: &dyn Fetcher,
        rng: &mut StdRng,
    ) -> Self {
        let mut refresh = None;
        let mut rotate = None;
        if let Some(interval) = runtime.refresh_interval_ms() {
            let r = runtime.refresh(now, fetcher, rng);
            refresh = Some(timers.arm(now, interval, TimerTarget::Refresh(slot)));
            if r.rotation_ready {
                rotate = Some(timers.arm(now, FEED_ROTATION_MS, TimerTarget::Rotate(slot)));
            }
        }
        Self {
            runtime,
            refresh,
            rotate,
        }
    }

    fn stop(&mut self, timers: &mut TimerQueue) {
        for id in [self.refresh.take(), self.rotate.take()].into_iter().flatten() {
            timers.cancel(id);
        }
    }

    fn retarget(&mut self, timers: &mut TimerQueue, slot: SourceSlot) {
        let rearm = |timers: &mut TimerQueue, id: Option<TimerId>, target| {
            let id = id?;
            let deadline = timers.deadline(id)?;
            timers.cancel(id);
            Some(timers.arm_at(deadline, target))
        };
        self.refresh = rearm(timers, self.refresh, TimerTarget::Refresh(slot));
        self.rotate = rearm(timers, self.rotate, TimerTarget::Rotate(slot));
    }
}

#[derive(Debug)]
struct ZoneRun {
    id: String,
    scheduler: ZoneScheduler,
}

#[derive(Debug)]
struct LayoutRun {
    layout: Arc<Layout>,
    zones: Vec<ZoneRun>,
    global: ZoneScheduler,
    widgets: Vec<(WidgetConfig, SourceRun)>,
}

#[derive(Debug)]
enum Active {
    Nothing,
    Screen(ScreenState),
    Layout(LayoutRun),
    App { app_type: String, run: SourceRun },
}

/// A running presentation: one program, one timer queue, one clock.
///
/// Time only moves when the caller says so through [`Presentation::advance_to`], so the same
/// session runs against a virtual clock in tests and a monotonic clock in the player.
pub struct Presentation {
    program: Program,
    timers: TimerQueue,
    playlist: PlaylistScheduler,
    active: Active,
    fetcher: Rc<dyn Fetcher>,
    proxy_base: Option<url::Url>,
    rng: StdRng,
    wall_origin: DateTime<Utc>,
    now: Millis,
    heartbeat: Option<(TimerId, u64)>,
    poll: Option<(TimerId, u64)>,
    closed: bool,
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("entries", &self.program.entries.len())
            .field("timers", &self.timers.len())
            .field("now", &self.now)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Presentation {
    /// Create a presentation. Nothing is armed until [`Presentation::start`].
    pub fn new(program: Program, fetcher: Rc<dyn Fetcher>, opts: PresentationOpts) -> Self {
        Self {
            program,
            timers: TimerQueue::new(),
            playlist: PlaylistScheduler::new(),
            active: Active::Nothing,
            fetcher,
            proxy_base: opts.proxy_base,
            rng: StdRng::seed_from_u64(opts.seed),
            wall_origin: opts.wall_origin,
            now: Millis::ZERO,
            heartbeat: None,
            poll: None,
            closed: false,
        }
    }

    /// Current session time.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// The program being played.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Index of the active playlist entry.
    pub fn current_entry(&self) -> Option<usize> {
        self.playlist.current(self.program.entries.len())
    }

    /// Number of armed timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Activate the first entry at `now`.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self, now: Millis) -> Vec<SessionEvent> {
        self.now = now;
        self.closed = false;
        let mut events = Vec::new();
        match self
            .playlist
            .start(&mut self.timers, now, &self.program.entries)
        {
            Some(i) => self.activate(i, now, &mut events),
            None => {
                self.deactivate();
                tracing::debug!("playlist empty, awaiting content");
            }
        }
        events
    }

    /// Re-arm a repeating heartbeat every `interval_ms`.
    pub fn enable_heartbeat(&mut self, interval_ms: u64) {
        if let Some((id, _)) = self.heartbeat.take() {
            self.timers.cancel(id);
        }
        let id = self
            .timers
            .arm(self.now, interval_ms, TimerTarget::Heartbeat);
        self.heartbeat = Some((id, interval_ms));
    }

    /// Re-arm a repeating freshness poll every `interval_ms`.
    pub fn enable_poll(&mut self, interval_ms: u64) {
        if let Some((id, _)) = self.poll.take() {
            self.timers.cancel(id);
        }
        let id = self.timers.arm(self.now, interval_ms, TimerTarget::Poll);
        self.poll = Some((id, interval_ms));
    }

    /// Fire every timer due at or before `now`, in deadline order.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn advance_to(&mut self, now: Millis) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.closed {
            return events;
        }
        while let Some(fired) = self.timers.pop_due(now) {
            self.now = fired.deadline;
            self.on_fire(fired, &mut events);
        }
        self.now = self.now.max(now);
        events
    }

    fn on_fire(&mut self, fired: Fired, events: &mut Vec<SessionEvent>) {
        tracing::debug!(target_kind = ?fired.target, deadline = fired.deadline.0, "timer fired");
        match fired.target {
            TimerTarget::Playlist => {
                if let Some(next) =
                    self.playlist
                        .on_fire(&mut self.timers, &fired, &self.program.entries)
                {
                    self.activate(next, fired.deadline, events);
                }
            }
            TimerTarget::Zone(slot) => {
                let Active::Layout(run) = &mut self.active else {
                    return;
                };
                let (zone_id, timeline, scheduler) = match slot {
                    ZoneSlot::Index(i) => {
                        let (Some(zone), Some(zr)) = (run.layout.zones.get(i), run.zones.get_mut(i))
                        else {
                            return;
                        };
                        (zone.id.as_str(), &zone.timeline, &mut zr.scheduler)
                    }
                    ZoneSlot::Global => (
                        crate::render::compositor::GLOBAL_NODE_ID,
                        &run.layout.global_timeline,
                        &mut run.global,
                    ),
                };
                if let Some(index) = scheduler.on_fire(&mut self.timers, &fired, timeline) {
                    events.push(SessionEvent::ZoneAdvanced {
                        zone_id: zone_id.to_string(),
                        index,
                    });
                }
            }
            TimerTarget::Refresh(slot) => {
                let Some(run) = source_mut(&mut self.active, slot) else {
                    return;
                };
                if run.refresh != Some(fired.id) {
                    return;
                }
                let r = run
                    .runtime
                    .refresh(fired.deadline, self.fetcher.as_ref(), &mut self.rng);
                run.refresh = run
                    .runtime
                    .refresh_interval_ms()
                    .map(|ms| self.timers.arm(fired.deadline, ms, TimerTarget::Refresh(slot)));
                if r.rotation_ready && run.rotate.is_none() {
                    run.rotate = Some(self.timers.arm(
                        fired.deadline,
                        FEED_ROTATION_MS,
                        TimerTarget::Rotate(slot),
                    ));
                }
                events.push(SessionEvent::Refreshed { source: slot });
            }
            TimerTarget::Rotate(slot) => {
                let Some(run) = source_mut(&mut self.active, slot) else {
                    return;
                };
                if run.rotate != Some(fired.id) {
                    return;
                }
                run.rotate = None;
                if run.runtime.rotate() {
                    run.rotate = Some(self.timers.arm(
                        fired.deadline,
                        FEED_ROTATION_MS,
                        TimerTarget::Rotate(slot),
                    ));
                    if let Some(index) = run.runtime.rotation_index() {
                        events.push(SessionEvent::Rotated {
                            source: slot,
                            index,
                        });
                    }
                }
            }
            TimerTarget::Heartbeat => {
                if let Some((id, ms)) = self.heartbeat
                    && id == fired.id
                {
                    let next = self.timers.arm(fired.deadline, ms, TimerTarget::Heartbeat);
                    self.heartbeat = Some((next, ms));
                    events.push(SessionEvent::Heartbeat);
                }
            }
            TimerTarget::Poll => {
                if let Some((id, ms)) = self.poll
                    && id == fired.id
                {
                    let next = self.timers.arm(fired.deadline, ms, TimerTarget::Poll);
                    self.poll = Some((next, ms));
                    events.push(SessionEvent::Poll);
                }
            }
        }
    }

    /// Tear down whatever is on screen and bring up entry `index`.
    fn activate(&mut self, index: usize, now: Millis, events: &mut Vec<SessionEvent>) {
        self.deactivate();
        let Some(entry) = self.program.entries.get(index) else {
            return;
        };
        let content = entry.content.clone();
        tracing::debug!(index, entry_id = %entry.id, "entry activated");
        events.push(SessionEvent::Activated {
            index,
            entry_id: entry.id.clone(),
        });

        self.active = match &content {
            EntryContent::Media(f) => Active::Screen(ScreenState::Media {
                file_id: f.id.clone(),
                url: f.file_url.clone(),
                media: f.kind(),
            }),
            EntryContent::NotFound(what) => {
                Active::Screen(ScreenState::NotFound { what: what.clone() })
            }
            EntryContent::Unsupported { file_type } => Active::Screen(ScreenState::Unsupported {
                file_type: file_type.clone(),
            }),
            EntryContent::UnsupportedApp { app_type, reason } => {
                Active::Screen(ScreenState::UnsupportedApp {
                    app_type: app_type.clone(),
                    reason: reason.clone(),
                })
            }
            EntryContent::Layout { layout, .. } => {
                let layout = Arc::clone(layout);
                Active::Layout(self.start_layout(layout, now))
            }
            EntryContent::App { app_type, spec } => {
                let runtime = ContentRuntime::for_app(spec, self.proxy_base.as_ref(), now);
                let app_type = app_type.clone();
                let run = SourceRun::start(
                    runtime,
                    SourceSlot::App,
                    now,
                    &mut self.timers,
                    self.fetcher.as_ref(),
                    &mut self.rng,
                );
                Active::App { app_type, run }
            }
        };
    }

    fn start_layout(&mut self, layout: Arc<Layout>, now: Millis) -> LayoutRun {
        let zones = layout
            .zones
            .iter()
            .enumerate()
            .map(|(i, z)| {
                let mut scheduler = ZoneScheduler::new(ZoneSlot::Index(i));
                scheduler.start(&mut self.timers, now, &z.timeline);
                ZoneRun {
                    id: z.id.clone(),
                    scheduler,
                }
            })
            .collect();
        let mut global = ZoneScheduler::new(ZoneSlot::Global);
        if layout.zones.is_empty() {
            global.start(&mut self.timers, now, &layout.global_timeline);
        }
        let widgets = layout
            .widgets
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let runtime = ContentRuntime::for_widget(&w.config, now);
                let run = SourceRun::start(
                    runtime,
                    SourceSlot::Widget(i),
                    now,
                    &mut self.timers,
                    self.fetcher.as_ref(),
                    &mut self.rng,
                );
                (w.config.clone(), run)
            })
            .collect();
        LayoutRun {
            layout,
            zones,
            global,
            widgets,
        }
    }

    fn deactivate(&mut self) {
        match std::mem::replace(&mut self.active, Active::Nothing) {
            Active::Layout(mut run) => {
                for z in &mut run.zones {
                    z.scheduler.stop(&mut self.timers);
                }
                run.global.stop(&mut self.timers);
                for (_, w) in &mut run.widgets {
                    w.stop(&mut self.timers);
                }
            }
            Active::App { mut run, .. } => run.stop(&mut self.timers),
            Active::Nothing | Active::Screen(_) => {}
        }
    }

    /// Swap in an edited layout snapshot while it is on screen.
    ///
    /// Zones are matched by id and keep their position and pending timer; a shrunk timeline
    /// wraps its index, an emptied one goes idle and a new zone starts at its first item.
    /// Widgets whose configuration is unchanged keep their runtime. Every playlist entry
    /// showing `layout_id` is updated so later activations see the edit too.
    #[tracing::instrument(skip(self, layout))]
    pub fn replace_layout(&mut self, layout_id: &str, layout: Arc<Layout>, now: Millis) {
        self.now = self.now.max(now);
        let mut active_matches = false;
        let current = self.current_entry();
        for (i, entry) in self.program.entries.iter_mut().enumerate() {
            if let EntryContent::Layout {
                layout_id: id,
                layout: l,
            } = &mut entry.content
                && id == layout_id
            {
                *l = Arc::clone(&layout);
                active_matches |= current == Some(i);
            }
        }
        if !active_matches {
            return;
        }
        let Active::Layout(run) = &mut self.active else {
            return;
        };

        let mut old_zones: Vec<ZoneRun> = std::mem::take(&mut run.zones);
        let mut zones = Vec::with_capacity(layout.zones.len());
        for (i, z) in layout.zones.iter().enumerate() {
            let scheduler = match old_zones.iter().position(|o| o.id == z.id) {
                Some(pos) => {
                    let mut kept = old_zones.swap_remove(pos).scheduler;
                    kept.retarget(&mut self.timers, ZoneSlot::Index(i));
                    kept.sync(&mut self.timers, now, &z.timeline);
                    kept
                }
                None => {
                    let mut fresh = ZoneScheduler::new(ZoneSlot::Index(i));
                    fresh.start(&mut self.timers, now, &z.timeline);
                    fresh
                }
            };
            zones.push(ZoneRun {
                id: z.id.clone(),
                scheduler,
            });
        }
        for mut gone in old_zones {
            gone.scheduler.stop(&mut self.timers);
        }
        run.zones = zones;

        if layout.zones.is_empty() {
            run.global.sync(&mut self.timers, now, &layout.global_timeline);
        } else {
            run.global.stop(&mut self.timers);
        }

        let mut old_widgets = std::mem::take(&mut run.widgets);
        let mut widgets = Vec::with_capacity(layout.widgets.len());
        for (i, w) in layout.widgets.iter().enumerate() {
            let slot = SourceSlot::Widget(i);
            let source = match old_widgets.iter().position(|(cfg, _)| *cfg == w.config) {
                Some(pos) => {
                    let (_, mut kept) = old_widgets.swap_remove(pos);
                    kept.retarget(&mut self.timers, slot);
                    kept
                }
                None => SourceRun::start(
                    ContentRuntime::for_widget(&w.config, now),
                    slot,
                    now,
                    &mut self.timers,
                    self.fetcher.as_ref(),
                    &mut self.rng,
                ),
            };
            widgets.push((w.config.clone(), source));
        }
        for (_, mut gone) in old_widgets {
            gone.stop(&mut self.timers);
        }
        run.widgets = widgets;
        run.layout = layout;
        tracing::debug!(layout_id, "layout replaced in place");
    }

    /// Take over a freshly resolved program.
    ///
    /// When the new program has the same shape, every entry takes its new duration and content.
    /// Layout edits are applied in place; any other changed entry that is on screen is
    /// re-activated. A new duration applies from the next playlist advance. Otherwise playback
    /// restarts from the first entry.
    pub fn reload(&mut self, program: Program, now: Millis) -> Vec<SessionEvent> {
        self.now = self.now.max(now);
        if !self.closed && self.program.same_shape(&program) {
            let Program {
                entries,
                files,
                revision,
            } = program;
            let current = self.current_entry();
            let mut layouts: Vec<(String, Arc<Layout>)> = Vec::new();
            let mut reactivate = false;
            for (i, (old, new)) in self.program.entries.iter_mut().zip(entries).enumerate() {
                old.duration = new.duration;
                match new.content {
                    EntryContent::Layout { layout_id, layout } => layouts.push((layout_id, layout)),
                    content if content != old.content => {
                        reactivate |= current == Some(i);
                        old.content = content;
                    }
                    _ => {}
                }
            }
            self.program.files = files;
            self.program.revision = revision;
            for (id, layout) in layouts {
                self.replace_layout(&id, layout, now);
            }
            let mut events = Vec::new();
            if reactivate && let Some(i) = current {
                tracing::debug!(index = i, "active entry changed, re-activating");
                self.activate(i, now, &mut events);
            }
            return events;
        }
        tracing::debug!("program changed shape, restarting");
        self.deactivate();
        self.playlist.stop(&mut self.timers);
        self.program = program;
        self.start(now)
    }

    /// Cancel every timer and stop showing content.
    #[tracing::instrument(skip(self))]
    pub fn teardown(&mut self) {
        self.deactivate();
        self.playlist.stop(&mut self.timers);
        self.timers.clear();
        self.heartbeat = None;
        self.poll = None;
        self.closed = true;
    }

    /// Evaluate what is on screen at `now`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn frame(&self, now: Millis) -> Frame {
        let wall = self.wall_origin
            + chrono::Duration::milliseconds(i64::try_from(now.0).unwrap_or(i64::MAX));
        let screen = if self.closed {
            ScreenState::Closed
        } else {
            match &self.active {
                Active::Nothing => ScreenState::AwaitingContent,
                Active::Screen(s) => s.clone(),
                Active::App { app_type, run } => ScreenState::App {
                    app_type: app_type.clone(),
                    content: run.runtime.content(now, wall),
                },
                Active::Layout(run) => {
                    let zone_positions: Vec<Option<usize>> = run
                        .layout
                        .zones
                        .iter()
                        .zip(&run.zones)
                        .map(|(z, zr)| zr.scheduler.current(z.timeline.len()))
                        .collect();
                    let widgets: Vec<WidgetContent> = run
                        .widgets
                        .iter()
                        .map(|(_, w)| w.runtime.content(now, wall))
                        .collect();
                    let global_position =
                        run.global.current(run.layout.global_timeline.len());
                    ScreenState::Layout(compose_layout(&LayoutState {
                        layout: &run.layout,
                        zone_positions: &zone_positions,
                        global_position,
                        files: &self.program.files,
                        widgets: &widgets,
                    }))
                }
            }
        };
        Frame { at: now, screen }
    }
}

fn source_mut(active: &mut Active, slot: SourceSlot) -> Option<&mut SourceRun> {
    match (active, slot) {
        (Active::Layout(run), SourceSlot::Widget(i)) => run.widgets.get_mut(i).map(|(_, s)| s),
        (Active::App { run, .. }, SourceSlot::App) => Some(run),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/presentation.rs"]
mod tests;
