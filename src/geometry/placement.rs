use crate::foundation::core::Rect;
use crate::geometry::overlap::overlaps;

/// Grid step, in percent, between candidate positions.
pub const PLACEMENT_STEP: u32 = 5;

/// Whether a new zone must avoid the existing ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlacementMode {
    /// Search for the first free slot; fall back to the origin when none exists.
    #[default]
    AvoidOverlap,
    /// Place at the origin without searching.
    AllowOverlap,
}

/// Find the first `(x, y)` where a `width x height` rectangle overlaps none of `existing`.
///
/// Candidates are visited row-major (`y` outer, `x` inner) in steps of [`PLACEMENT_STEP`], which
/// makes the result deterministic. When every candidate collides, `(0, 0)` is returned and the new
/// zone overlaps; exhaustion is not an error.
pub fn find_free_slot(width: f64, height: f64, existing: &[Rect]) -> (f64, f64) {
    let step = f64::from(PLACEMENT_STEP);
    let max_y = 100.0 - height;
    let max_x = 100.0 - width;

    let mut y = 0.0;
    while y <= max_y {
        let mut x = 0.0;
        while x <= max_x {
            let candidate = Rect::new(x, y, width, height);
            if !existing.iter().any(|z| overlaps(z, &candidate)) {
                return (x, y);
            }
            x += step;
        }
        y += step;
    }

    tracing::debug!(width, height, zones = existing.len(), "no free slot, placing at origin");
    (0.0, 0.0)
}

/// Resolve the position for a new zone under `mode`.
pub fn place(mode: PlacementMode, width: f64, height: f64, existing: &[Rect]) -> (f64, f64) {
    match mode {
        PlacementMode::AvoidOverlap => find_free_slot(width, height, existing),
        PlacementMode::AllowOverlap => (0.0, 0.0),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/placement.rs"]
mod tests;
