use super::*;

use std::collections::HashMap;

use chrono::TimeZone;

use crate::content::fetch::ScriptedFetcher;
use crate::foundation::core::Rect;
use crate::model::layout::{TimelineItem, Widget, WidgetKind, Zone};
use crate::model::records::MediaFile;
use crate::render::frame::NodeContent;
use crate::session::program::PlaylistEntry;
use crate::widgets::apps::AppSpec;

fn opts() -> PresentationOpts {
    PresentationOpts {
        proxy_base: None,
        wall_origin: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        seed: 7,
    }
}

fn image(id: &str) -> MediaFile {
    MediaFile {
        id: id.to_string(),
        name: id.to_string(),
        file_url: format!("https://cdn.test/{id}.png"),
        file_type: "image/png".to_string(),
        duration: None,
    }
}

fn files(ids: &[&str]) -> HashMap<String, MediaFile> {
    ids.iter().map(|id| (id.to_string(), image(id))).collect()
}

fn two_zone_layout() -> Layout {
    let mut a = Zone::new("a", Rect::new(0.0, 0.0, 50.0, 100.0));
    a.timeline.push(TimelineItem::file("f1", 5));
    a.timeline.push(TimelineItem::file("f2", 3));
    let mut b = Zone::new("b", Rect::new(50.0, 0.0, 50.0, 100.0));
    b.timeline.push(TimelineItem::file("f3", 0));
    let mut layout = Layout::default();
    layout.zones = vec![a, b];
    layout
}

fn present(program: Program) -> Presentation {
    Presentation::new(program, Rc::new(ScriptedFetcher::new()), opts())
}

fn zone_file(p: &Presentation, now: Millis, zone: &str) -> Option<String> {
    let frame = p.frame(now);
    match &frame.layout()?.node(zone)?.content {
        NodeContent::Media { file_id, .. } => Some(file_id.clone()),
        _ => None,
    }
}

#[test]
fn zones_advance_independently_from_fired_deadlines() {
    let program = Program::single_layout(two_zone_layout(), files(&["f1", "f2", "f3"]));
    let mut p = present(program);
    p.start(Millis(0));
    assert_eq!(zone_file(&p, Millis(0), "a").as_deref(), Some("f1"));

    let events = p.advance_to(Millis(5_000));
    assert_eq!(
        events,
        vec![SessionEvent::ZoneAdvanced {
            zone_id: "a".to_string(),
            index: 1
        }]
    );
    assert_eq!(zone_file(&p, Millis(5_000), "a").as_deref(), Some("f2"));

    // a: 5s, then 3s, then 5s ... ; b: single item with the 10s default, re-armed in place.
    let events = p.advance_to(Millis(10_000));
    let a_steps = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::ZoneAdvanced { zone_id, .. } if zone_id == "a"))
        .count();
    assert_eq!(a_steps, 1);
    assert!(events.contains(&SessionEvent::ZoneAdvanced {
        zone_id: "b".to_string(),
        index: 0
    }));
    assert_eq!(zone_file(&p, Millis(10_000), "a").as_deref(), Some("f1"));
}

#[test]
fn late_advance_catches_up_every_step() {
    let program = Program::single_layout(two_zone_layout(), files(&["f1", "f2", "f3"]));
    let mut p = present(program);
    p.start(Millis(0));
    let events = p.advance_to(Millis(16_000));
    // a fires at 5, 8, 13, 16
    let a_steps = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::ZoneAdvanced { zone_id, .. } if zone_id == "a"))
        .count();
    assert_eq!(a_steps, 4);
    assert_eq!(zone_file(&p, Millis(16_000), "a").as_deref(), Some("f1"));
}

#[test]
fn empty_program_awaits_content() {
    let mut p = present(Program::empty());
    assert!(p.start(Millis(0)).is_empty());
    assert_eq!(p.frame(Millis(0)).screen, ScreenState::AwaitingContent);
    assert_eq!(p.pending_timers(), 0);
}

fn entry(id: &str, duration: u32, content: EntryContent) -> PlaylistEntry {
    PlaylistEntry {
        id: id.to_string(),
        duration,
        content,
    }
}

#[test]
fn playlist_rotates_through_media_and_missing_entries() {
    let program = Program {
        entries: vec![
            entry("e1", 4, EntryContent::Media(image("f1"))),
            entry("e2", 6, EntryContent::NotFound("file 'gone'".to_string())),
            entry(
                "e3",
                2,
                EntryContent::Unsupported {
                    file_type: "application/pdf".to_string(),
                },
            ),
        ],
        ..Program::default()
    };
    let mut p = present(program);
    let events = p.start(Millis(0));
    assert_eq!(
        events,
        vec![SessionEvent::Activated {
            index: 0,
            entry_id: "e1".to_string()
        }]
    );
    assert!(matches!(p.frame(Millis(0)).screen, ScreenState::Media { .. }));

    p.advance_to(Millis(4_000));
    assert_eq!(
        p.frame(Millis(4_000)).screen,
        ScreenState::NotFound {
            what: "file 'gone'".to_string()
        }
    );
    p.advance_to(Millis(10_000));
    assert!(matches!(
        p.frame(Millis(10_000)).screen,
        ScreenState::Unsupported { .. }
    ));
    p.advance_to(Millis(12_000));
    assert_eq!(p.current_entry(), Some(0));
}

#[test]
fn activating_a_layout_restarts_its_zones() {
    let program = Program {
        entries: vec![
            entry(
                "l",
                8,
                EntryContent::Layout {
                    layout_id: "l".to_string(),
                    layout: Arc::new(two_zone_layout()),
                },
            ),
            entry("m", 2, EntryContent::Media(image("f9"))),
        ],
        files: files(&["f1", "f2", "f3"]),
        revision: String::new(),
    };
    let mut p = present(program);
    p.start(Millis(0));
    p.advance_to(Millis(5_000));
    assert_eq!(zone_file(&p, Millis(5_000), "a").as_deref(), Some("f2"));
    p.advance_to(Millis(8_000));
    assert!(matches!(p.frame(Millis(8_000)).screen, ScreenState::Media { .. }));
    p.advance_to(Millis(10_000));
    assert_eq!(zone_file(&p, Millis(10_000), "a").as_deref(), Some("f1"));
}

#[test]
fn teardown_cancels_every_timer() {
    let program = Program::single_layout(two_zone_layout(), files(&["f1", "f2", "f3"]));
    let mut p = present(program);
    p.start(Millis(0));
    p.enable_heartbeat(30_000);
    assert!(p.pending_timers() > 0);
    p.teardown();
    assert_eq!(p.pending_timers(), 0);
    assert!(p.advance_to(Millis(60_000)).is_empty());
    assert_eq!(p.frame(Millis(60_000)).screen, ScreenState::Closed);
}

#[test]
fn heartbeat_repeats() {
    let mut p = present(Program::empty());
    p.start(Millis(0));
    p.enable_heartbeat(30_000);
    let events = p.advance_to(Millis(90_000));
    assert_eq!(
        events.iter().filter(|e| **e == SessionEvent::Heartbeat).count(),
        3
    );
}

#[test]
fn replacing_a_layout_keeps_zone_positions() {
    let layout = two_zone_layout();
    let mut p = present(Program::single_layout(layout.clone(), files(&["f1", "f2", "f3"])));
    p.start(Millis(0));
    p.advance_to(Millis(5_000));
    assert_eq!(zone_file(&p, Millis(5_000), "a").as_deref(), Some("f2"));

    let mut edited = layout;
    edited.zones.swap(0, 1);
    edited.widgets.push(Widget::new(WidgetKind::Clock));
    p.replace_layout("layout", Arc::new(edited), Millis(6_000));
    assert_eq!(zone_file(&p, Millis(6_000), "a").as_deref(), Some("f2"));

    // The pending deadline at 8s survives the move to a new slot.
    let events = p.advance_to(Millis(8_000));
    assert!(events.contains(&SessionEvent::ZoneAdvanced {
        zone_id: "a".to_string(),
        index: 0
    }));
    let frame = p.frame(Millis(8_000));
    assert_eq!(frame.layout().map(|l| l.widgets().count()), Some(1));
}

#[test]
fn emptied_zone_shows_placeholder_and_stops() {
    let layout = two_zone_layout();
    let mut p = present(Program::single_layout(layout.clone(), files(&["f1", "f2", "f3"])));
    p.start(Millis(0));
    let mut edited = layout;
    edited.zones[0].timeline.clear();
    p.replace_layout("layout", Arc::new(edited), Millis(1_000));
    let frame = p.frame(Millis(1_000));
    assert_eq!(
        frame.layout().and_then(|l| l.node("a")).map(|n| n.content.clone()),
        Some(NodeContent::placeholder(1, 0))
    );
    let events = p.advance_to(Millis(30_000));
    assert!(!events.iter().any(
        |e| matches!(e, SessionEvent::ZoneAdvanced { zone_id, .. } if zone_id == "a")
    ));
}

#[test]
fn app_entry_refreshes_on_its_ttl() {
    let fetcher = Rc::new(ScriptedFetcher::new());
    fetcher.respond(
        "https://api.quotable.io",
        "application/json",
        r#"{"content": "Ship it.", "author": "Anon"}"#,
    );
    let program = Program {
        entries: vec![entry(
            "q",
            60,
            EntryContent::App {
                app_type: "quote".to_string(),
                spec: AppSpec::Quote,
            },
        )],
        ..Program::default()
    };
    let mut p = Presentation::new(program, fetcher.clone(), opts());
    p.start(Millis(0));
    assert_eq!(fetcher.count("https://api.quotable.io"), 1);
    p.advance_to(Millis(29_999));
    assert_eq!(fetcher.count("https://api.quotable.io"), 1);
    let events = p.advance_to(Millis(30_000));
    assert!(events.contains(&SessionEvent::Refreshed {
        source: SourceSlot::App
    }));
    assert_eq!(fetcher.count("https://api.quotable.io"), 2);
    assert!(matches!(
        p.frame(Millis(30_000)).screen,
        ScreenState::App { .. }
    ));
}

#[test]
fn reload_with_new_shape_restarts() {
    let mut p = present(Program::empty());
    p.start(Millis(0));
    let events = p.reload(
        Program::single_layout(two_zone_layout(), files(&["f1"])),
        Millis(1_000),
    );
    assert!(matches!(events.as_slice(), [SessionEvent::Activated { index: 0, .. }]));
    assert!(p.frame(Millis(1_000)).layout().is_some());
}

#[test]
fn reload_with_same_shape_takes_new_entry_content() {
    let program = |first: &str, duration: u32| Program {
        entries: vec![
            entry("e1", duration, EntryContent::Media(image(first))),
            entry("e2", 5, EntryContent::Media(image("other"))),
        ],
        ..Program::default()
    };
    let shown = |p: &Presentation, now: Millis| match p.frame(now).screen {
        ScreenState::Media { file_id, .. } => file_id,
        other => panic!("unexpected {other:?}"),
    };

    let mut p = present(program("old", 10));
    p.start(Millis(0));
    assert_eq!(shown(&p, Millis(0)), "old");

    let events = p.reload(program("new", 60), Millis(2_000));
    assert_eq!(
        events,
        vec![SessionEvent::Activated {
            index: 0,
            entry_id: "e1".to_string()
        }]
    );
    assert_eq!(shown(&p, Millis(2_000)), "new");
    assert_eq!(p.program().entries[0].duration, 60);

    // The advance armed before the reload still fires on its old deadline.
    p.advance_to(Millis(10_000));
    assert_eq!(shown(&p, Millis(10_000)), "other");
    p.advance_to(Millis(15_000));
    assert_eq!(shown(&p, Millis(15_000)), "new");
    p.advance_to(Millis(74_999));
    assert_eq!(shown(&p, Millis(74_999)), "new");
}

#[test]
fn reload_leaves_unchanged_entry_on_screen() {
    let program = Program {
        entries: vec![
            entry("e1", 10, EntryContent::Media(image("a"))),
            entry("e2", 10, EntryContent::Media(image("b"))),
        ],
        ..Program::default()
    };
    let mut changed = program.clone();
    changed.entries[1].content = EntryContent::Media(image("c"));

    let mut p = present(program);
    p.start(Millis(0));
    assert!(p.reload(changed, Millis(1_000)).is_empty());
    p.advance_to(Millis(10_000));
    assert!(matches!(
        p.frame(Millis(10_000)).screen,
        ScreenState::Media { ref file_id, .. } if file_id == "c"
    ));
}
