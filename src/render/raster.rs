use std::path::Path;

use anyhow::Context as _;
use image::{Rgba, RgbaImage};

use crate::foundation::core::Point;
use crate::foundation::error::ZonecastResult;
use crate::model::records::MediaKind;
use crate::render::frame::{Frame, FrameNode, LayoutFrame, NodeContent, ScreenState};
use crate::widgets::WidgetContent;

/// Premultiplied RGBA8.
pub type PremulRgba8 = [u8; 4];

const BACKGROUND: PremulRgba8 = [0, 0, 0, 255];
const PLACEHOLDER: PremulRgba8 = [58, 58, 58, 255];
const IMAGE: PremulRgba8 = [36, 92, 160, 255];
const VIDEO: PremulRgba8 = [160, 92, 36, 255];
const PROBLEM: PremulRgba8 = [150, 30, 30, 255];
const NESTED: PremulRgba8 = [92, 40, 140, 255];
const APP: PremulRgba8 = [30, 110, 70, 255];
const WIDGET: PremulRgba8 = [255, 255, 255, 255];
const WIDGET_ERROR: PremulRgba8 = [255, 0, 0, 255];
/// Opacity of overlay widget fills.
const WIDGET_OPACITY: f32 = 0.375;

/// Source-over for premultiplied pixels with an extra opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

fn mul_div255(a: u16, b: u16) -> u8 {
    let prod = u32::from(a) * u32::from(b);
    ((prod + 127) / 255).min(255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Fill color and opacity for one node.
fn node_paint(node: &FrameNode) -> (PremulRgba8, f32) {
    match &node.content {
        NodeContent::Placeholder { .. } => (PLACEHOLDER, 1.0),
        NodeContent::Media { media, .. } => (media_fill(*media), 1.0),
        NodeContent::MissingFile { .. } | NodeContent::UnsupportedFile { .. } => (PROBLEM, 1.0),
        NodeContent::NestedLayout { .. } => (NESTED, 1.0),
        NodeContent::Widget { content, .. } => {
            let color = match content {
                WidgetContent::Error { .. } => WIDGET_ERROR,
                WidgetContent::Text(t) => t.rgb().map_or(WIDGET, |[r, g, b]| [r, g, b, 255]),
                _ => WIDGET,
            };
            (color, WIDGET_OPACITY)
        }
    }
}

fn media_fill(kind: MediaKind) -> PremulRgba8 {
    match kind {
        MediaKind::Image => IMAGE,
        MediaKind::Video => VIDEO,
        MediaKind::Unsupported => PROBLEM,
    }
}

/// Paint a node's rotated rectangle onto `img`.
///
/// Each pixel center inside the rotated bounding box is mapped back through the inverse
/// transform and tested against the unrotated rectangle.
fn fill_node(img: &mut RgbaImage, node: &FrameNode, color: PremulRgba8, opacity: f32) {
    let (w, h) = img.dimensions();
    let rect = node.rect.to_pixels(w, h);
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }
    let xf = node.rotations.to_affine(rect.center());
    let inv = xf.inverse();
    let bbox = xf.transform_rect_bbox(rect);

    let x0 = bbox.x0.floor().max(0.0) as u32;
    let y0 = bbox.y0.floor().max(0.0) as u32;
    let x1 = (bbox.x1.ceil().max(0.0) as u32).min(w);
    let y1 = (bbox.y1.ceil().max(0.0) as u32).min(h);

    for y in y0..y1 {
        for x in x0..x1 {
            let p = inv * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if p.x >= rect.x0 && p.x < rect.x1 && p.y >= rect.y0 && p.y < rect.y1 {
                let px = img.get_pixel_mut(x, y);
                px.0 = over(px.0, color, opacity);
            }
        }
    }
}

/// Rasterize a layout frame onto a fresh canvas.
pub fn rasterize_layout(frame: &LayoutFrame, width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba(BACKGROUND));
    for node in &frame.nodes {
        let (color, opacity) = node_paint(node);
        fill_node(&mut img, node, color, opacity);
    }
    img
}

/// Rasterize any screen state. Non-layout states fill the whole canvas.
pub fn rasterize(frame: &Frame, width: u32, height: u32) -> RgbaImage {
    let fill = match &frame.screen {
        ScreenState::Layout(l) => return rasterize_layout(l, width, height),
        ScreenState::AwaitingContent | ScreenState::Closed => BACKGROUND,
        ScreenState::NotFound { .. }
        | ScreenState::Unsupported { .. }
        | ScreenState::UnsupportedApp { .. } => PROBLEM,
        ScreenState::Media { media, .. } => media_fill(*media),
        ScreenState::App { .. } => APP,
    };
    RgbaImage::from_pixel(width, height, Rgba(fill))
}

/// Write `img` as PNG, creating parent directories.
pub fn write_png(img: &RgbaImage, path: &Path) -> ZonecastResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
