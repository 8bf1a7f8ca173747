//! Overlay widgets (weather, clock, text) and the content-fetching apps.
//!
//! Each widget is its own failure domain: a failed fetch becomes [`WidgetContent::Error`] inside
//! the widget's rectangle and never reaches the compositor as an error value.

/// Feed, quote, random image and weather apps.
pub mod apps;
/// Clock overlay formatting.
pub mod clock;
/// Per-widget runtime state driven by the presentation timers.
pub mod runtime;
/// Text overlay rendering.
pub mod text;
/// Weather lookups and report formatting.
pub mod weather;

use crate::content::feed::FeedEntry;
use crate::widgets::apps::Quote;
use crate::widgets::text::TextOverlay;
use crate::widgets::weather::WeatherOverlay;

/// Relative text size shared by every overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    /// Small text.
    Small,
    /// Medium text.
    #[default]
    Medium,
    /// Large text.
    Large,
}

impl FontSize {
    /// Nominal size in pixels at a 1080p canvas.
    pub fn px(self) -> u32 {
        match self {
            Self::Small => 18,
            Self::Medium => 30,
            Self::Large => 48,
        }
    }
}

/// What a widget shows at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetContent {
    /// No data yet.
    Loading,
    /// Fetch or parse failed; the message is drawn inside the widget.
    Error {
        /// User-visible message.
        message: String,
    },
    /// Formatted clock text.
    Clock {
        /// Time string.
        text: String,
    },
    /// Static or scrolling text.
    Text(TextOverlay),
    /// Current weather.
    Weather(WeatherOverlay),
    /// One feed entry out of the retained set.
    Feed {
        /// Entry being shown.
        entry: FeedEntry,
        /// Position of `entry` in the retained set.
        index: usize,
        /// Size of the retained set.
        count: usize,
    },
    /// A quote.
    Quote(Quote),
    /// A remote image URL.
    Image {
        /// Image URL.
        url: String,
    },
}
