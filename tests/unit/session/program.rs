use super::*;

use crate::store::memory::MemoryStore;

const DOC: &str = r#"{
    "files": [
        {"id": "f1", "name": "poster", "file_url": "https://cdn.test/p.png", "file_type": "image/png"},
        {"id": "f2", "name": "manual", "file_url": "https://cdn.test/m.pdf", "file_type": "application/pdf"}
    ],
    "layouts": [
        {"id": "l1", "name": "Split", "updated_at": "2024-03-01T10:00:00Z",
         "layout_data": {"zones": [{"id": "z", "x": 0, "y": 0, "width": 100, "height": 100,
                                    "timeline": [{"id": "t", "type": "file", "file_id": "f1", "duration": 5}]}]}}
    ],
    "playlist_items": [
        {"id": "i4", "playlist_id": "p", "order_index": 4, "app_type": "quote"},
        {"id": "i1", "playlist_id": "p", "order_index": 1, "file_id": "f1", "duration": 7},
        {"id": "i2", "playlist_id": "p", "order_index": 2, "layout_id": "l1"},
        {"id": "i3", "playlist_id": "p", "order_index": 3, "file_id": "nope"},
        {"id": "i5", "playlist_id": "p", "order_index": 5, "file_id": "f2"},
        {"id": "i6", "playlist_id": "p", "order_index": 6, "app_type": "clock_tower"},
        {"id": "x", "playlist_id": "other", "order_index": 0, "file_id": "f1"}
    ]
}"#;

fn program() -> Program {
    let store = MemoryStore::from_json(DOC).unwrap();
    Program::resolve(&store, "p").unwrap()
}

#[test]
fn entries_follow_order_index() {
    let p = program();
    let ids: Vec<_> = p.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["i1", "i2", "i3", "i4", "i5", "i6"]);
    assert_eq!(p.entries[0].duration, 7);
    assert_eq!(p.entries[1].duration, DEFAULT_DURATION_SECS);
}

#[test]
fn unresolved_references_do_not_abort() {
    let p = program();
    assert!(matches!(p.entries[0].content, EntryContent::Media(_)));
    assert!(matches!(p.entries[1].content, EntryContent::Layout { .. }));
    assert_eq!(
        p.entries[2].content,
        EntryContent::NotFound("file 'nope'".to_string())
    );
    assert!(matches!(
        p.entries[3].content,
        EntryContent::App { spec: AppSpec::Quote, .. }
    ));
    assert_eq!(
        p.entries[4].content,
        EntryContent::Unsupported {
            file_type: "application/pdf".to_string()
        }
    );
    assert!(matches!(p.entries[5].content, EntryContent::UnsupportedApp { .. }));
}

#[test]
fn layout_file_references_are_preloaded() {
    let p = program();
    assert!(p.files.contains_key("f1"));
    assert!(!p.files.contains_key("f2"));
}

#[test]
fn revision_tracks_layout_saves() {
    let mut store = MemoryStore::from_json(DOC).unwrap();
    let before = Program::resolve(&store, "p").unwrap();
    let layout: LayoutRecord = store.get("l1").unwrap();
    let parsed = layout.layout().unwrap();
    let now = "2024-03-02T10:00:00Z".parse().unwrap();
    store.save_layout("l1", &parsed, now).unwrap();
    let after = Program::resolve(&store, "p").unwrap();
    assert_ne!(before.revision, after.revision);
    assert!(before.same_shape(&after));
}

#[test]
fn screen_without_playlist_is_empty() {
    let store = MemoryStore::from_json(DOC).unwrap();
    let screen = Screen {
        id: "s".to_string(),
        name: "Lobby".to_string(),
        code: "1".to_string(),
        current_playlist_id: None,
        status: "offline".to_string(),
        last_seen: None,
        updated_at: None,
    };
    assert!(Program::for_screen(&store, &screen).unwrap().entries.is_empty());
}

#[test]
fn single_layout_program_has_one_entry() {
    let p = Program::single_layout(Layout::default(), HashMap::new());
    assert_eq!(p.entries.len(), 1);
    assert_eq!(p.entries[0].dwell_ms(), 10_000);
}
