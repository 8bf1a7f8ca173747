use super::*;

#[test]
fn edge_touching_rectangles_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 50.0, 50.0);
    let b = Rect::new(50.0, 0.0, 50.0, 50.0);
    assert!(!overlaps(&a, &b));
    assert!(!overlaps(&b, &a));

    let below = Rect::new(0.0, 50.0, 50.0, 50.0);
    assert!(!overlaps(&a, &below));

    let corner = Rect::new(50.0, 50.0, 10.0, 10.0);
    assert!(!overlaps(&a, &corner));
}

#[test]
fn shared_interior_overlaps() {
    let a = Rect::new(0.0, 0.0, 50.0, 50.0);
    assert!(overlaps(&a, &Rect::new(49.0, 49.0, 10.0, 10.0)));
    assert!(overlaps(&a, &Rect::new(10.0, 10.0, 5.0, 5.0)));
    assert!(overlaps(&a, &a));
}

#[test]
fn disjoint_rectangles_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(!overlaps(&a, &Rect::new(20.0, 20.0, 10.0, 10.0)));
    assert!(!overlaps(&a, &Rect::new(0.0, 20.0, 10.0, 10.0)));
}

#[test]
fn overlapping_pairs_reports_each_pair_once() {
    let rects = [
        Rect::new(0.0, 0.0, 50.0, 50.0),
        Rect::new(50.0, 0.0, 50.0, 50.0),
        Rect::new(25.0, 25.0, 50.0, 50.0),
    ];
    assert_eq!(overlapping_pairs(&rects), vec![(0, 2), (1, 2)]);
}
