use crate::foundation::core::{Affine, Millis, Rect, Rotation};
use crate::model::layout::WidgetKind;
use crate::model::records::MediaKind;
use crate::widgets::WidgetContent;

/// The nested rotations applied to one node, outermost first.
///
/// Zones carry three layers (layout, zone, current item); widgets carry only their own. The
/// layers are never folded into a single angle; [`RotationStack::net_degrees`] exists for
/// diagnostics only.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RotationStack {
    layers: Vec<Rotation>,
}

impl RotationStack {
    /// Stack for a zone showing an item.
    pub fn zone(layout: Rotation, zone: Rotation, item: Rotation) -> Self {
        Self {
            layers: vec![layout, zone, item],
        }
    }

    /// Stack for a widget.
    pub fn widget(own: Rotation) -> Self {
        Self { layers: vec![own] }
    }

    /// Layers, outermost first.
    pub fn layers(&self) -> &[Rotation] {
        &self.layers
    }

    /// Sum of all layers modulo a full turn.
    pub fn net_degrees(&self) -> u16 {
        let total: u32 = self.layers.iter().map(|r| u32::from(r.degrees())).sum();
        (total % 360) as u16
    }

    /// Compose every layer as a rotation about `center`, outermost applied last.
    pub fn to_affine(&self, center: crate::foundation::core::Point) -> Affine {
        self.layers
            .iter()
            .fold(Affine::IDENTITY, |acc, r| acc * r.about(center))
    }
}

/// Which stacking layer a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeLayer {
    /// A zone (or the full-canvas global timeline).
    Zone,
    /// An overlay widget.
    Widget,
}

/// What a node shows.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeContent {
    /// Neutral placeholder for a zone with nothing to show.
    Placeholder {
        /// 1-based position of the zone in the layout.
        ordinal: usize,
        /// Number of items in the zone's timeline.
        item_count: usize,
        /// Display text, `Zone {ordinal} / {item_count} items`.
        label: String,
    },
    /// A resolved media file.
    Media {
        /// File id.
        file_id: String,
        /// Source URL.
        url: String,
        /// Image or video.
        media: MediaKind,
        /// Position of the item in its timeline.
        item_index: usize,
        /// Timeline length.
        item_count: usize,
    },
    /// A file reference that does not resolve.
    MissingFile {
        /// The unresolved id.
        file_id: String,
    },
    /// A file whose type is neither image nor video.
    UnsupportedFile {
        /// File id.
        file_id: String,
        /// Reported MIME type.
        file_type: String,
    },
    /// A nested layout item, shown as a labelled placeholder.
    NestedLayout {
        /// Timeline item id.
        item_id: String,
    },
    /// An overlay widget.
    Widget {
        /// Widget type.
        widget: WidgetKind,
        /// Current widget state.
        content: WidgetContent,
    },
}

impl NodeContent {
    /// Placeholder for zone number `ordinal` with `item_count` items.
    pub fn placeholder(ordinal: usize, item_count: usize) -> Self {
        Self::Placeholder {
            ordinal,
            item_count,
            label: format!("Zone {ordinal} / {item_count} items"),
        }
    }
}

/// One drawable element of a layout frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameNode {
    /// Stacking layer.
    pub layer: NodeLayer,
    /// Zone or widget id.
    pub id: String,
    /// Placement in canvas percent, before rotation.
    pub rect: Rect,
    /// Paint order; higher draws later.
    pub z: usize,
    /// Rotations about the rect center.
    pub rotations: RotationStack,
    /// Content.
    pub content: NodeContent,
}

impl FrameNode {
    /// Full transform for this node in percent space.
    pub fn transform(&self) -> Affine {
        self.rotations.to_affine(self.rect.center())
    }
}

/// A composited layout, nodes in paint order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct LayoutFrame {
    /// Layout rotation (also the outermost layer of every zone).
    pub rotation: Rotation,
    /// Nodes, bottom to top.
    pub nodes: Vec<FrameNode>,
}

impl LayoutFrame {
    /// Nodes on the zone layer.
    pub fn zones(&self) -> impl Iterator<Item = &FrameNode> {
        self.nodes.iter().filter(|n| n.layer == NodeLayer::Zone)
    }

    /// Nodes on the widget layer.
    pub fn widgets(&self) -> impl Iterator<Item = &FrameNode> {
        self.nodes.iter().filter(|n| n.layer == NodeLayer::Widget)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&FrameNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Top-level screen state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScreenState {
    /// No playlist, or an empty one.
    AwaitingContent,
    /// The active entry references something that does not exist.
    NotFound {
        /// What was missing, e.g. `file 'abc'`.
        what: String,
    },
    /// The active file is neither image nor video.
    Unsupported {
        /// Reported MIME type.
        file_type: String,
    },
    /// A full-screen media file.
    Media {
        /// File id.
        file_id: String,
        /// Source URL.
        url: String,
        /// Image or video.
        media: MediaKind,
    },
    /// The active app entry names an unknown type or lacks required configuration.
    UnsupportedApp {
        /// App type as configured.
        app_type: String,
        /// Why the app cannot run.
        reason: String,
    },
    /// A composited layout.
    Layout(LayoutFrame),
    /// A full-screen app.
    App {
        /// App type as configured on the playlist item.
        app_type: String,
        /// App state.
        content: WidgetContent,
    },
    /// The presentation was torn down.
    Closed,
}

/// Screen state at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Frame {
    /// Session time of the frame.
    pub at: Millis,
    /// What is on screen.
    pub screen: ScreenState,
}

impl Frame {
    /// The layout frame, when a layout is on screen.
    pub fn layout(&self) -> Option<&LayoutFrame> {
        match &self.screen {
            ScreenState::Layout(l) => Some(l),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
