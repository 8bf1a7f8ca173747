use crate::foundation::core::Millis;
use crate::widgets::FontSize;

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
}

/// Text motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAnimation {
    /// Static text.
    #[default]
    None,
    /// Marquee moving right to left across the widget.
    ScrollLeft,
}

/// Text overlay configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    /// Text to draw.
    #[serde(default)]
    pub text: String,
    /// Text size.
    #[serde(default)]
    pub font_size: FontSize,
    /// CSS hex color.
    #[serde(default = "white")]
    pub color: String,
    /// Alignment inside the widget box.
    #[serde(default)]
    pub alignment: Alignment,
    /// Motion.
    #[serde(default)]
    pub animation: TextAnimation,
    /// Seconds per full scroll pass.
    #[serde(default = "ten")]
    pub animation_speed: u32,
}

fn white() -> String {
    "#ffffff".to_string()
}

fn ten() -> u32 {
    10
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            text: "Text".to_string(),
            font_size: FontSize::Medium,
            color: white(),
            alignment: Alignment::Center,
            animation: TextAnimation::None,
            animation_speed: ten(),
        }
    }
}

/// Parse `#rgb` / `#rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |h: &str| u8::from_str_radix(h, 16).ok();
    match hex.len() {
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        3 => {
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(out)
        }
        _ => None,
    }
}

/// A text widget resolved at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextOverlay {
    /// Text to draw.
    pub text: String,
    /// Nominal font size in pixels.
    pub font_px: u32,
    /// CSS hex color.
    pub color: String,
    /// Alignment.
    pub alignment: Alignment,
    /// Horizontal offset in percent of the widget width (`100` enters from the right edge).
    pub offset_pct: f64,
}

impl TextOverlay {
    /// Resolve `cfg` at `elapsed` since the widget appeared.
    pub fn at(cfg: &TextConfig, elapsed: Millis) -> Self {
        let offset_pct = match cfg.animation {
            TextAnimation::None => 0.0,
            TextAnimation::ScrollLeft => {
                let period = u64::from(cfg.animation_speed.max(1)) * 1000;
                let phase = (elapsed.0 % period) as f64 / period as f64;
                100.0 - 200.0 * phase
            }
        };
        Self {
            text: cfg.text.clone(),
            font_px: cfg.font_size.px(),
            color: cfg.color.clone(),
            alignment: cfg.alignment,
            offset_pct,
        }
    }

    /// Parse [`TextOverlay::color`] as `#rgb` or `#rrggbb`; `None` when malformed.
    pub fn rgb(&self) -> Option<[u8; 3]> {
        parse_hex_color(&self.color)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/text.rs"]
mod tests;
