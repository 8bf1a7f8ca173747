use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::foundation::core::{Rect, Rotation, new_id};
use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::geometry::placement::{PlacementMode, place};
use crate::model::layout::{
    DEFAULT_DURATION_SECS, Layout, TimelineItem, Widget, WidgetKind, Zone,
};
use crate::model::records::LayoutRecord;
use crate::store::{RecordStore, RecordStoreExt};

/// Size in percent given to a newly added zone.
pub const NEW_ZONE_SIZE: (f64, f64) = (50.0, 50.0);

/// Which timeline an item operation targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineRef {
    /// The timeline of the zone with this id.
    Zone(String),
    /// The layout-wide timeline.
    Global,
}

/// Stacking move for a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackMove {
    /// Swap with the next zone (drawn later, so on top).
    Forward,
    /// Swap with the previous zone.
    Backward,
}

/// Partial update of a zone; `None` fields are left alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ZonePatch {
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New width.
    pub width: Option<f64>,
    /// New height.
    pub height: Option<f64>,
    /// New rotation.
    pub rotation: Option<Rotation>,
}

/// In-memory editing of one layout.
///
/// Every operation clones the current snapshot, changes the clone and swaps it in, so readers
/// holding a previous [`EditSession::snapshot`] never observe a partial edit. A failed operation
/// leaves the snapshot untouched.
#[derive(Clone, Debug)]
pub struct EditSession {
    layout: Arc<Layout>,
    selected: Option<String>,
    placement: PlacementMode,
}

impl EditSession {
    /// Start editing `layout`.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout: Arc::new(layout),
            selected: None,
            placement: PlacementMode::AvoidOverlap,
        }
    }

    /// Load layout record `layout_id` from `store`.
    pub fn open<S: RecordStore + ?Sized>(store: &S, layout_id: &str) -> ZonecastResult<Self> {
        let record: LayoutRecord = store.get(layout_id)?;
        Ok(Self::new(record.layout()?))
    }

    /// Current layout.
    pub fn snapshot(&self) -> Arc<Layout> {
        Arc::clone(&self.layout)
    }

    /// Whether new zones may overlap existing ones.
    pub fn set_placement(&mut self, mode: PlacementMode) {
        self.placement = mode;
    }

    /// Zone that [`EditSession::add_file`] appends to.
    pub fn selected_zone(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a zone (or clear the selection with `None`).
    pub fn select_zone(&mut self, id: Option<&str>) -> ZonecastResult<()> {
        if let Some(id) = id
            && self.layout.zone(id).is_none()
        {
            return Err(ZonecastError::not_found(format!("zone '{id}'")));
        }
        self.selected = id.map(str::to_string);
        Ok(())
    }

    /// Run `edit` against a copy of the layout and publish the copy when it succeeds.
    pub fn apply<T>(
        &mut self,
        edit: impl FnOnce(&mut Layout) -> ZonecastResult<T>,
    ) -> ZonecastResult<T> {
        let mut next = (*self.layout).clone();
        let out = edit(&mut next)?;
        self.layout = Arc::new(next);
        Ok(out)
    }

    /// Add a 50x50 zone, placed by the current placement mode, and select it.
    pub fn add_zone(&mut self) -> ZonecastResult<String> {
        let mode = self.placement;
        let id = self.apply(|l| {
            let (w, h) = NEW_ZONE_SIZE;
            let (x, y) = place(mode, w, h, &l.zone_rects());
            let mut id = new_id();
            while l.zone(&id).is_some() {
                id = new_id();
            }
            l.zones.push(Zone::new(id.clone(), Rect::new(x, y, w, h)));
            Ok(id)
        })?;
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Remove a zone; clears the selection.
    pub fn remove_zone(&mut self, id: &str) -> ZonecastResult<()> {
        self.apply(|l| {
            let i = zone_index(l, id)?;
            l.zones.remove(i);
            Ok(())
        })?;
        self.selected = None;
        Ok(())
    }

    /// Patch a zone's geometry or rotation. Values past the canvas are stored as given.
    pub fn update_zone(&mut self, id: &str, patch: ZonePatch) -> ZonecastResult<()> {
        self.apply(|l| {
            let i = zone_index(l, id)?;
            let z = &mut l.zones[i];
            if let Some(v) = patch.x {
                z.rect.x = v;
            }
            if let Some(v) = patch.y {
                z.rect.y = v;
            }
            if let Some(v) = patch.width {
                z.rect.width = v;
            }
            if let Some(v) = patch.height {
                z.rect.height = v;
            }
            if let Some(r) = patch.rotation {
                z.rotation = r;
            }
            if !z.rect.is_within_canvas() {
                tracing::warn!(zone = id, rect = ?z.rect, "zone extends past the canvas");
            }
            Ok(())
        })
    }

    /// Swap a zone with its neighbor in drawing order. A move past either end is a no-op.
    pub fn move_zone(&mut self, id: &str, dir: StackMove) -> ZonecastResult<()> {
        self.apply(|l| {
            let i = zone_index(l, id)?;
            let j = match dir {
                StackMove::Forward if i + 1 < l.zones.len() => i + 1,
                StackMove::Backward if i > 0 => i - 1,
                _ => return Ok(()),
            };
            l.zones.swap(i, j);
            Ok(())
        })
    }

    /// Set the layout-wide rotation.
    pub fn set_layout_rotation(&mut self, rotation: Rotation) -> ZonecastResult<()> {
        self.apply(|l| {
            l.rotation = rotation;
            Ok(())
        })
    }

    /// Append a file to the selected zone, or to the global timeline when nothing is selected.
    pub fn add_file(&mut self, file_id: &str) -> ZonecastResult<String> {
        let target = match &self.selected {
            Some(z) => TimelineRef::Zone(z.clone()),
            None => TimelineRef::Global,
        };
        self.add_file_to(&target, file_id)
    }

    /// Append a file to a specific timeline (drop onto a zone).
    pub fn add_file_to(&mut self, target: &TimelineRef, file_id: &str) -> ZonecastResult<String> {
        self.apply(|l| {
            let item = TimelineItem::file(file_id, DEFAULT_DURATION_SECS);
            let id = item.id.clone();
            timeline_mut(l, target)?.push(item);
            Ok(id)
        })
    }

    /// Change an item's dwell. Running schedulers pick it up from their next advance.
    pub fn set_item_duration(
        &mut self,
        target: &TimelineRef,
        item_id: &str,
        secs: u32,
    ) -> ZonecastResult<()> {
        self.apply(|l| {
            item_mut(timeline_mut(l, target)?, item_id)?.duration = secs;
            Ok(())
        })
    }

    /// Change an item's rotation.
    pub fn set_item_rotation(
        &mut self,
        target: &TimelineRef,
        item_id: &str,
        rotation: Rotation,
    ) -> ZonecastResult<()> {
        self.apply(|l| {
            item_mut(timeline_mut(l, target)?, item_id)?.rotation = rotation;
            Ok(())
        })
    }

    /// Remove an item.
    pub fn remove_item(&mut self, target: &TimelineRef, item_id: &str) -> ZonecastResult<()> {
        self.apply(|l| {
            let timeline = timeline_mut(l, target)?;
            let i = timeline
                .iter()
                .position(|t| t.id == item_id)
                .ok_or_else(|| ZonecastError::not_found(format!("timeline item '{item_id}'")))?;
            timeline.remove(i);
            Ok(())
        })
    }

    /// Append a copy of an item with a fresh id; returns the new id.
    pub fn duplicate_item(
        &mut self,
        target: &TimelineRef,
        item_id: &str,
    ) -> ZonecastResult<String> {
        self.apply(|l| {
            let timeline = timeline_mut(l, target)?;
            let mut copy = item_mut(timeline, item_id)?.clone();
            copy.id = new_id();
            let id = copy.id.clone();
            timeline.push(copy);
            Ok(id)
        })
    }

    /// Add an overlay widget with its default size and configuration.
    pub fn add_widget(&mut self, kind: WidgetKind) -> ZonecastResult<String> {
        self.apply(|l| {
            let w = Widget::new(kind);
            let id = w.id.clone();
            l.widgets.push(w);
            Ok(id)
        })
    }

    /// Replace an overlay widget (matched by id).
    pub fn update_widget(&mut self, widget: Widget) -> ZonecastResult<()> {
        self.apply(|l| {
            let slot = l
                .widgets
                .iter_mut()
                .find(|w| w.id == widget.id)
                .ok_or_else(|| ZonecastError::not_found(format!("widget '{}'", widget.id)))?;
            *slot = widget;
            Ok(())
        })
    }

    /// Remove an overlay widget.
    pub fn remove_widget(&mut self, id: &str) -> ZonecastResult<()> {
        self.apply(|l| {
            let before = l.widgets.len();
            l.widgets.retain(|w| w.id != id);
            if l.widgets.len() == before {
                return Err(ZonecastError::not_found(format!("widget '{id}'")));
            }
            Ok(())
        })
    }

    /// Validate and persist the current layout, then signal affected screens.
    ///
    /// Returns the ids of screens whose `updated_at` was bumped.
    pub fn save<S: RecordStore + ?Sized>(
        &self,
        store: &mut S,
        layout_id: &str,
        now: DateTime<Utc>,
    ) -> ZonecastResult<Vec<String>> {
        self.layout.validate()?;
        store.save_layout(layout_id, &self.layout, now)
    }
}

fn zone_index(l: &Layout, id: &str) -> ZonecastResult<usize> {
    l.zones
        .iter()
        .position(|z| z.id == id)
        .ok_or_else(|| ZonecastError::not_found(format!("zone '{id}'")))
}

fn timeline_mut<'a>(
    l: &'a mut Layout,
    target: &TimelineRef,
) -> ZonecastResult<&'a mut Vec<TimelineItem>> {
    match target {
        TimelineRef::Global => Ok(&mut l.global_timeline),
        TimelineRef::Zone(id) => {
            let i = zone_index(l, id)?;
            Ok(&mut l.zones[i].timeline)
        }
    }
}

fn item_mut<'a>(
    timeline: &'a mut [TimelineItem],
    item_id: &str,
) -> ZonecastResult<&'a mut TimelineItem> {
    timeline
        .iter_mut()
        .find(|t| t.id == item_id)
        .ok_or_else(|| ZonecastError::not_found(format!("timeline item '{item_id}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/model/edit.rs"]
mod tests;
