use super::*;

use crate::foundation::core::Point;

#[test]
fn placeholder_label_uses_ordinal_and_count() {
    match NodeContent::placeholder(1, 0) {
        NodeContent::Placeholder { label, .. } => assert_eq!(label, "Zone 1 / 0 items"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rotation_stack_keeps_layers_separate() {
    let s = RotationStack::zone(Rotation::Deg90, Rotation::Deg180, Rotation::Deg180);
    assert_eq!(
        s.layers(),
        &[Rotation::Deg90, Rotation::Deg180, Rotation::Deg180]
    );
    assert_eq!(s.net_degrees(), 90);
    assert_eq!(RotationStack::widget(Rotation::Deg270).layers().len(), 1);
}

#[test]
fn stacked_affine_matches_net_rotation() {
    let c = Point::new(10.0, 10.0);
    let s = RotationStack::zone(Rotation::Deg90, Rotation::Deg90, Rotation::Deg0);
    let p = s.to_affine(c) * Point::new(20.0, 10.0);
    let q = Rotation::Deg180.about(c) * Point::new(20.0, 10.0);
    assert!((p.x - q.x).abs() < 1e-9);
    assert!((p.y - q.y).abs() < 1e-9);
}

#[test]
fn screen_state_serializes_with_state_tag() {
    let v = serde_json::to_value(ScreenState::AwaitingContent).unwrap();
    assert_eq!(v["state"], "awaiting_content");
    let f = Frame {
        at: Millis(5),
        screen: ScreenState::Layout(LayoutFrame::default()),
    };
    assert!(f.layout().is_some());
}
