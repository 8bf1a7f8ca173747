use super::*;

use crate::model::layout::{Widget, WidgetKind, Zone};

fn files() -> HashMap<String, MediaFile> {
    let mut m = HashMap::new();
    m.insert(
        "img".to_string(),
        MediaFile {
            id: "img".to_string(),
            name: "poster".to_string(),
            file_url: "https://cdn.test/poster.png".to_string(),
            file_type: "image/png".to_string(),
            duration: None,
        },
    );
    m.insert(
        "doc".to_string(),
        MediaFile {
            id: "doc".to_string(),
            name: "manual".to_string(),
            file_url: "https://cdn.test/manual.pdf".to_string(),
            file_type: "application/pdf".to_string(),
            duration: None,
        },
    );
    m
}

fn compose(layout: &Layout, zones: &[Option<usize>], widgets: &[WidgetContent]) -> LayoutFrame {
    let files = files();
    compose_layout(&LayoutState {
        layout,
        zone_positions: zones,
        global_position: Some(0),
        files: &files,
        widgets,
    })
}

#[test]
fn widgets_paint_above_every_zone() {
    let mut layout = Layout::default();
    layout.zones.push(Zone::new("a", Rect::new(0.0, 0.0, 50.0, 50.0)));
    layout.zones.push(Zone::new("b", Rect::new(50.0, 0.0, 50.0, 50.0)));
    layout.widgets.push(Widget::new(WidgetKind::Clock));
    let frame = compose(&layout, &[None, None], &[]);
    let ids: Vec<_> = frame.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids[..2], ["a", "b"]);
    assert_eq!(frame.nodes[2].layer, NodeLayer::Widget);
    assert!(frame.nodes.windows(2).all(|w| w[0].z < w[1].z));
}

#[test]
fn clock_only_layout_has_a_single_widget_node() {
    let mut layout = Layout::default();
    layout.widgets.push(Widget::new(WidgetKind::Clock));
    let clock = WidgetContent::Clock {
        text: "09:30".to_string(),
    };
    let frame = compose(&layout, &[], std::slice::from_ref(&clock));
    assert_eq!(frame.nodes.len(), 1);
    assert_eq!(frame.zones().count(), 0);
    match &frame.nodes[0].content {
        NodeContent::Widget { widget, content } => {
            assert_eq!(*widget, WidgetKind::Clock);
            assert_eq!(content, &clock);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn empty_zone_renders_placeholder() {
    let mut layout = Layout::default();
    layout.zones.push(Zone::new("z", Rect::full()));
    let frame = compose(&layout, &[None], &[]);
    assert_eq!(frame.nodes[0].content, NodeContent::placeholder(1, 0));
}

#[test]
fn items_resolve_to_media_missing_or_unsupported() {
    let mut zone = Zone::new("z", Rect::full());
    zone.timeline.push(TimelineItem::file("img", 5));
    zone.timeline.push(TimelineItem::file("gone", 5));
    zone.timeline.push(TimelineItem::file("doc", 5));
    let mut layout = Layout::default();
    layout.zones.push(zone);

    let at = |i| compose(&layout, &[Some(i)], &[]).nodes[0].content.clone();
    assert!(matches!(
        at(0),
        NodeContent::Media { media: MediaKind::Image, item_index: 0, item_count: 3, .. }
    ));
    assert_eq!(
        at(1),
        NodeContent::MissingFile {
            file_id: "gone".to_string()
        }
    );
    assert!(matches!(at(2), NodeContent::UnsupportedFile { .. }));
}

#[test]
fn zone_rotations_are_layout_zone_item() {
    let mut item = TimelineItem::file("img", 5);
    item.rotation = Rotation::Deg180;
    let mut zone = Zone::new("z", Rect::full());
    zone.rotation = Rotation::Deg90;
    zone.timeline.push(item);
    let mut layout = Layout::default();
    layout.rotation = Rotation::Deg270;
    layout.zones.push(zone);
    let frame = compose(&layout, &[Some(0)], &[]);
    assert_eq!(
        frame.nodes[0].rotations.layers(),
        &[Rotation::Deg270, Rotation::Deg90, Rotation::Deg180]
    );
}

#[test]
fn global_timeline_only_without_zones() {
    let mut layout = Layout::default();
    layout.global_timeline.push(TimelineItem::file("img", 5));
    let frame = compose(&layout, &[], &[]);
    assert_eq!(frame.nodes.len(), 1);
    assert_eq!(frame.nodes[0].id, GLOBAL_NODE_ID);
    assert_eq!(frame.nodes[0].rect, Rect::full());

    layout.zones.push(Zone::new("z", Rect::full()));
    let frame = compose(&layout, &[None], &[]);
    assert!(frame.node(GLOBAL_NODE_ID).is_none());
}

#[test]
fn nested_layout_items_are_labelled() {
    let mut item = TimelineItem::file("x", 5);
    item.kind = ItemKind::Layout;
    let id = item.id.clone();
    let mut zone = Zone::new("z", Rect::full());
    zone.timeline.push(item);
    let mut layout = Layout::default();
    layout.zones.push(zone);
    let frame = compose(&layout, &[Some(0)], &[]);
    assert_eq!(frame.nodes[0].content, NodeContent::NestedLayout { item_id: id });
}
