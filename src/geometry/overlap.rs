use crate::foundation::core::Rect;

/// Return `true` when `a` and `b` share interior area.
///
/// Projections are compared as open intervals, so rectangles that only touch along an edge or at a
/// corner do not overlap. Edge-to-edge tiling is a valid layout.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    !(a.right() <= b.x || a.x >= b.right() || a.bottom() <= b.y || a.y >= b.bottom())
}

/// Indices of every pair of rectangles in `rects` that overlap, in `(i, j)` order with `i < j`.
pub fn overlapping_pairs(rects: &[Rect]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for (i, a) in rects.iter().enumerate() {
        for (j, b) in rects.iter().enumerate().skip(i + 1) {
            if overlaps(a, b) {
                out.push((i, j));
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/overlap.rs"]
mod tests;
