//! Percent-space geometry used when authoring layouts.

/// Overlap predicate shared by placement and validation.
pub mod overlap;
/// Free-slot search for newly added zones.
pub mod placement;
