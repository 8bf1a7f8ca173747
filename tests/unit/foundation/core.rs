use super::*;

#[test]
fn millis_arithmetic_saturates() {
    assert_eq!(Millis::from_secs(10), Millis(10_000));
    assert_eq!(Millis(5).after(10), Millis(15));
    assert_eq!(Millis(u64::MAX).after(1), Millis(u64::MAX));
    assert_eq!(Millis(10).since(Millis(4)), 6);
    assert_eq!(Millis(4).since(Millis(10)), 0);
}

#[test]
fn rotation_accepts_only_quarter_turns() {
    for r in Rotation::ALL {
        assert_eq!(Rotation::from_degrees(i64::from(r.degrees())).unwrap(), r);
    }
    assert!(Rotation::from_degrees(45).is_err());
    assert!(Rotation::from_degrees(360).is_err());
    assert!(Rotation::from_degrees(-90).is_err());
}

#[test]
fn rotation_serializes_as_bare_number() {
    let s = serde_json::to_string(&Rotation::Deg270).unwrap();
    assert_eq!(s, "270");
    let r: Rotation = serde_json::from_str("90").unwrap();
    assert_eq!(r, Rotation::Deg90);
    assert!(serde_json::from_str::<Rotation>("45").is_err());
}

#[test]
fn rotation_about_center_keeps_center_fixed() {
    let c = Point::new(25.0, 25.0);
    for r in Rotation::ALL {
        let p = r.about(c) * c;
        assert!((p.x - c.x).abs() < 1e-9);
        assert!((p.y - c.y).abs() < 1e-9);
    }
}

#[test]
fn rect_canvas_bounds() {
    assert!(Rect::full().is_within_canvas());
    assert!(Rect::new(50.0, 50.0, 50.0, 50.0).is_within_canvas());
    assert!(!Rect::new(60.0, 0.0, 50.0, 10.0).is_within_canvas());
    assert!(!Rect::new(-1.0, 0.0, 10.0, 10.0).is_within_canvas());
}

#[test]
fn rect_maps_to_pixels() {
    let px = Rect::new(50.0, 25.0, 50.0, 50.0).to_pixels(200, 100);
    assert_eq!(px.x0, 100.0);
    assert_eq!(px.y0, 25.0);
    assert_eq!(px.x1, 200.0);
    assert_eq!(px.y1, 75.0);
}

#[test]
fn fresh_ids_are_distinct() {
    assert_ne!(new_id(), new_id());
}
