use crate::foundation::core::Rect;
use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::model::layout::{Layout, Zone};

/// Names accepted by [`template`].
pub const TEMPLATE_NAMES: [&str; 4] = [
    "fullscreen",
    "split-horizontal",
    "split-vertical",
    "three-zones",
];

/// Starter layout for a named template.
pub fn template(name: &str) -> ZonecastResult<Layout> {
    let zones: &[(&str, [f64; 4])] = match name {
        "fullscreen" => &[("main", [0.0, 0.0, 100.0, 100.0])],
        "split-horizontal" => &[
            ("top", [0.0, 0.0, 100.0, 50.0]),
            ("bottom", [0.0, 50.0, 100.0, 50.0]),
        ],
        "split-vertical" => &[
            ("left", [0.0, 0.0, 50.0, 100.0]),
            ("right", [50.0, 0.0, 50.0, 100.0]),
        ],
        "three-zones" => &[
            ("main", [0.0, 0.0, 70.0, 100.0]),
            ("sidebar-top", [70.0, 0.0, 30.0, 50.0]),
            ("sidebar-bottom", [70.0, 50.0, 30.0, 50.0]),
        ],
        other => {
            return Err(ZonecastError::validation(format!(
                "unknown template '{other}' (expected one of {})",
                TEMPLATE_NAMES.join(", ")
            )));
        }
    };
    Ok(Layout {
        template: Some(name.to_string()),
        zones: zones
            .iter()
            .map(|(id, [x, y, w, h])| Zone::new(*id, Rect::new(*x, *y, *w, *h)))
            .collect(),
        ..Layout::default()
    })
}

#[cfg(test)]
#[path = "../../tests/unit/model/templates.rs"]
mod tests;
