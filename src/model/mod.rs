//! Layout data model, starter templates, stored record shapes and the editing session.

/// Copy-on-write layout editing.
pub mod edit;
/// Zones, timelines, widgets and layouts.
pub mod layout;
/// Stored record shapes.
pub mod records;
/// Starter layouts.
pub mod templates;
