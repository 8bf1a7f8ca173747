use std::collections::HashMap;

use crate::foundation::core::{Rect, Rotation};
use crate::model::layout::{ItemKind, Layout, TimelineItem};
use crate::model::records::{MediaFile, MediaKind};
use crate::render::frame::{FrameNode, LayoutFrame, NodeContent, NodeLayer, RotationStack};
use crate::widgets::WidgetContent;

/// Id given to the node that shows the layout-global timeline.
pub const GLOBAL_NODE_ID: &str = "timeline";

/// Everything the compositor reads to build one layout frame.
///
/// `zone_positions[i]` is the current item of `layout.zones[i]`; `widgets[i]` is the current
/// state of `layout.widgets[i]`. Missing entries count as "nothing yet".
#[derive(Clone, Copy, Debug)]
pub struct LayoutState<'a> {
    /// Layout being shown.
    pub layout: &'a Layout,
    /// Current item per zone.
    pub zone_positions: &'a [Option<usize>],
    /// Current item of the global timeline.
    pub global_position: Option<usize>,
    /// Media files by id.
    pub files: &'a HashMap<String, MediaFile>,
    /// Current widget states.
    pub widgets: &'a [WidgetContent],
}

/// Build the paint-ordered node list for a layout.
///
/// Zones come first in array order, then every widget in array order. The global timeline is
/// drawn as one full-canvas zone, and only when the layout has no zones.
pub fn compose_layout(state: &LayoutState<'_>) -> LayoutFrame {
    let layout = state.layout;
    let mut nodes = Vec::with_capacity(layout.zones.len() + layout.widgets.len() + 1);

    if layout.zones.is_empty() && !layout.global_timeline.is_empty() {
        let timeline = &layout.global_timeline;
        let (content, item_rotation) = match state
            .global_position
            .and_then(|p| timeline.get(p).map(|it| (p, it)))
        {
            Some((p, item)) => (
                item_content(item, p, timeline.len(), state.files),
                item.rotation,
            ),
            None => (NodeContent::placeholder(1, timeline.len()), Rotation::Deg0),
        };
        nodes.push(FrameNode {
            layer: NodeLayer::Zone,
            id: GLOBAL_NODE_ID.to_string(),
            rect: Rect::full(),
            z: nodes.len(),
            rotations: RotationStack::zone(layout.rotation, Rotation::Deg0, item_rotation),
            content,
        });
    }

    for (i, zone) in layout.zones.iter().enumerate() {
        let len = zone.timeline.len();
        let current = state
            .zone_positions
            .get(i)
            .copied()
            .flatten()
            .and_then(|p| zone.timeline.get(p).map(|it| (p, it)));
        let (content, item_rotation) = match current {
            Some((p, item)) => (item_content(item, p, len, state.files), item.rotation),
            None => (NodeContent::placeholder(i + 1, len), Rotation::Deg0),
        };
        nodes.push(FrameNode {
            layer: NodeLayer::Zone,
            id: zone.id.clone(),
            rect: zone.rect,
            z: nodes.len(),
            rotations: RotationStack::zone(layout.rotation, zone.rotation, item_rotation),
            content,
        });
    }

    for (i, widget) in layout.widgets.iter().enumerate() {
        let content = state
            .widgets
            .get(i)
            .cloned()
            .unwrap_or(WidgetContent::Loading);
        nodes.push(FrameNode {
            layer: NodeLayer::Widget,
            id: widget.id.clone(),
            rect: widget.rect,
            z: nodes.len(),
            rotations: RotationStack::widget(widget.rotation),
            content: NodeContent::Widget {
                widget: widget.kind(),
                content,
            },
        });
    }

    LayoutFrame {
        rotation: layout.rotation,
        nodes,
    }
}

fn item_content(
    item: &TimelineItem,
    index: usize,
    count: usize,
    files: &HashMap<String, MediaFile>,
) -> NodeContent {
    if item.kind == ItemKind::Layout {
        return NodeContent::NestedLayout {
            item_id: item.id.clone(),
        };
    }
    let Some(file_id) = item.file_id.as_deref() else {
        return NodeContent::MissingFile {
            file_id: String::new(),
        };
    };
    match files.get(file_id) {
        None => NodeContent::MissingFile {
            file_id: file_id.to_string(),
        },
        Some(f) if f.kind() == MediaKind::Unsupported => NodeContent::UnsupportedFile {
            file_id: file_id.to_string(),
            file_type: f.file_type.clone(),
        },
        Some(f) => NodeContent::Media {
            file_id: file_id.to_string(),
            url: f.file_url.clone(),
            media: f.kind(),
            item_index: index,
            item_count: count,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
