use super::*;
use crate::model::templates::template;
use crate::store::memory::MemoryStore;
use chrono::TimeZone;

#[test]
fn add_zone_places_without_overlap_and_selects() {
    let mut s = EditSession::new(Layout::default());
    let a = s.add_zone().unwrap();
    let b = s.add_zone().unwrap();
    let l = s.snapshot();
    assert_eq!(l.zone(&a).unwrap().rect, Rect::new(0.0, 0.0, 50.0, 50.0));
    assert_eq!(l.zone(&b).unwrap().rect, Rect::new(50.0, 0.0, 50.0, 50.0));
    assert_eq!(s.selected_zone(), Some(b.as_str()));
}

#[test]
fn allow_overlap_places_at_origin() {
    let mut s = EditSession::new(template("fullscreen").unwrap());
    s.set_placement(PlacementMode::AllowOverlap);
    let id = s.add_zone().unwrap();
    assert_eq!(s.snapshot().zone(&id).unwrap().rect.x, 0.0);
}

#[test]
fn snapshots_are_not_mutated_by_later_edits() {
    let mut s = EditSession::new(template("split-vertical").unwrap());
    let before = s.snapshot();
    s.remove_zone("left").unwrap();
    assert_eq!(before.zones.len(), 2);
    assert_eq!(s.snapshot().zones.len(), 1);
}

#[test]
fn failed_edit_leaves_layout_untouched() {
    let mut s = EditSession::new(template("fullscreen").unwrap());
    let before = s.snapshot();
    assert!(s.remove_zone("nope").unwrap_err().is_not_found());
    assert!(Arc::ptr_eq(&before, &s.snapshot()));
}

#[test]
fn update_zone_patches_fields() {
    let mut s = EditSession::new(template("fullscreen").unwrap());
    s.update_zone(
        "main",
        ZonePatch {
            width: Some(80.0),
            rotation: Some(Rotation::Deg90),
            ..ZonePatch::default()
        },
    )
    .unwrap();
    let l = s.snapshot();
    let z = l.zone("main").unwrap();
    assert_eq!(z.rect, Rect::new(0.0, 0.0, 80.0, 100.0));
    assert_eq!(z.rotation, Rotation::Deg90);
}

#[test]
fn move_zone_swaps_neighbors_and_stops_at_ends() {
    let mut s = EditSession::new(template("three-zones").unwrap());
    s.move_zone("main", StackMove::Forward).unwrap();
    let ids = |s: &EditSession| -> Vec<String> {
        s.snapshot().zones.iter().map(|z| z.id.clone()).collect()
    };
    assert_eq!(ids(&s), ["sidebar-top", "main", "sidebar-bottom"]);
    s.move_zone("sidebar-top", StackMove::Backward).unwrap();
    assert_eq!(ids(&s), ["sidebar-top", "main", "sidebar-bottom"]);
    s.move_zone("sidebar-bottom", StackMove::Forward).unwrap();
    assert_eq!(ids(&s), ["sidebar-top", "main", "sidebar-bottom"]);
}

#[test]
fn add_file_targets_selection_or_global_timeline() {
    let mut s = EditSession::new(template("split-horizontal").unwrap());
    s.add_file("f-global").unwrap();
    s.select_zone(Some("bottom")).unwrap();
    s.add_file("f-bottom").unwrap();
    s.add_file_to(&TimelineRef::Zone("top".into()), "f-top").unwrap();

    let l = s.snapshot();
    assert_eq!(l.global_timeline[0].file_id.as_deref(), Some("f-global"));
    assert_eq!(l.zone("bottom").unwrap().timeline[0].file_id.as_deref(), Some("f-bottom"));
    assert_eq!(l.zone("top").unwrap().timeline[0].duration, DEFAULT_DURATION_SECS);
    assert!(s.select_zone(Some("ghost")).is_err());
}

#[test]
fn item_operations() {
    let mut s = EditSession::new(template("fullscreen").unwrap());
    let main = TimelineRef::Zone("main".into());
    let a = s.add_file_to(&main, "f1").unwrap();
    s.set_item_duration(&main, &a, 3).unwrap();
    s.set_item_rotation(&main, &a, Rotation::Deg180).unwrap();
    let b = s.duplicate_item(&main, &a).unwrap();
    assert_ne!(a, b);

    let l = s.snapshot();
    let tl = &l.zone("main").unwrap().timeline;
    assert_eq!(tl.len(), 2);
    assert_eq!(tl[1].id, b);
    assert_eq!((tl[1].duration, tl[1].rotation), (3, Rotation::Deg180));
    assert_eq!(tl[1].file_id, tl[0].file_id);

    s.remove_item(&main, &a).unwrap();
    assert_eq!(s.snapshot().zone("main").unwrap().timeline[0].id, b);
    assert!(s.remove_item(&main, &a).is_err());
}

#[test]
fn widget_operations() {
    let mut s = EditSession::new(Layout::default());
    let id = s.add_widget(WidgetKind::Clock).unwrap();
    let mut w = s.snapshot().widgets[0].clone();
    w.rect.x = 80.0;
    s.update_widget(w).unwrap();
    assert_eq!(s.snapshot().widgets[0].rect.x, 80.0);
    s.remove_widget(&id).unwrap();
    assert!(s.remove_widget(&id).is_err());
}

#[test]
fn save_persists_and_signals_screens() {
    let mut store = MemoryStore::from_json(
        r#"{"layouts": [{"id": "l1", "name": "L", "layout_data": null}],
            "playlist_items": [{"id": "i", "playlist_id": "p", "layout_id": "l1"}],
            "screens": [{"id": "s", "name": "S", "code": "1", "current_playlist_id": "p"}]}"#,
    )
    .unwrap();
    let mut s = EditSession::open(&store, "l1").unwrap();
    s.set_layout_rotation(Rotation::Deg270).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(s.save(&mut store, "l1", now).unwrap(), ["s"]);

    let reopened = EditSession::open(&store, "l1").unwrap();
    assert_eq!(reopened.snapshot().rotation, Rotation::Deg270);
}

#[test]
fn save_refuses_invalid_layouts() {
    let mut store = MemoryStore::from_json(r#"{"layouts": [{"id": "l1", "name": "L"}]}"#).unwrap();
    let mut layout = Layout::default();
    layout.zones.push(Zone::new("dup", Rect::full()));
    layout.zones.push(Zone::new("dup", Rect::full()));
    let s = EditSession::new(layout);
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert!(s.save(&mut store, "l1", now).is_err());
}
