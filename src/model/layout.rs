use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::foundation::core::{Rect, Rotation, new_id, null_as_default};
use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::widgets::clock::ClockConfig;
use crate::widgets::text::TextConfig;
use crate::widgets::weather::WeatherConfig;

/// Dwell time used when an item has no usable duration.
pub const DEFAULT_DURATION_SECS: u32 = 10;

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

/// Accepts integers, floats, numeric strings and `null`; anything unusable becomes the default.
pub(crate) fn lenient_duration<'de, D>(d: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    let secs = match v {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match secs {
        Some(s) if s.is_finite() && s >= 0.0 => s.round().min(f64::from(u32::MAX)) as u32,
        _ => DEFAULT_DURATION_SECS,
    })
}

/// Milliseconds to dwell for a duration in seconds; `0` counts as the default.
pub fn dwell_ms(duration_secs: u32) -> u64 {
    let secs = if duration_secs == 0 {
        DEFAULT_DURATION_SECS
    } else {
        duration_secs
    };
    u64::from(secs) * 1000
}

/// Kind of a timeline item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A media file.
    #[default]
    File,
    /// A nested layout (shown as a labelled placeholder).
    Layout,
}

/// One step of a zone (or global) timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Item id, unique within its timeline.
    #[serde(default = "new_id")]
    pub id: String,
    /// Item kind.
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    /// Dwell in seconds.
    #[serde(default = "default_duration", deserialize_with = "lenient_duration")]
    pub duration: u32,
    /// Referenced media file (required for [`ItemKind::File`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Rotation applied to this item inside its zone.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rotation: Rotation,
}

impl TimelineItem {
    /// A file item with a fresh id.
    pub fn file(file_id: impl Into<String>, duration: u32) -> Self {
        Self {
            id: new_id(),
            kind: ItemKind::File,
            duration,
            file_id: Some(file_id.into()),
            rotation: Rotation::Deg0,
        }
    }

    /// Scheduled dwell in milliseconds.
    pub fn dwell_ms(&self) -> u64 {
        dwell_ms(self.duration)
    }
}

/// A rectangular region with its own timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone id, unique within its layout.
    #[serde(default = "new_id")]
    pub id: String,
    /// Placement in canvas percent.
    #[serde(flatten)]
    pub rect: Rect,
    /// Rotation of the zone about its center.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rotation: Rotation,
    /// Content in playback order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Vec<TimelineItem>,
}

impl Zone {
    /// An empty zone.
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            rect,
            rotation: Rotation::Deg0,
            timeline: Vec::new(),
        }
    }
}

/// Overlay widget types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    /// Current weather.
    Weather,
    /// Wall clock.
    Clock,
    /// Static or scrolling text.
    Text,
}

impl WidgetKind {
    /// Size `(width, height)` in percent given to a newly added widget.
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::Weather => (25.0, 30.0),
            Self::Clock => (20.0, 15.0),
            Self::Text => (30.0, 10.0),
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Clock => "clock",
            Self::Text => "text",
        }
    }
}

/// Per-kind widget configuration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WidgetConfig {
    /// Weather overlay.
    Weather(WeatherConfig),
    /// Clock overlay.
    Clock(ClockConfig),
    /// Text overlay.
    Text(TextConfig),
}

impl WidgetConfig {
    /// Defaults for a freshly added widget of `kind`.
    pub fn default_for(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Weather => Self::Weather(WeatherConfig::default()),
            WidgetKind::Clock => Self::Clock(ClockConfig::default()),
            WidgetKind::Text => Self::Text(TextConfig::default()),
        }
    }

    /// Parse `raw` as the configuration of a `kind` widget; `null` yields the field defaults.
    pub fn from_value(kind: WidgetKind, raw: Value) -> ZonecastResult<Self> {
        let raw = if raw.is_null() {
            Value::Object(Default::default())
        } else {
            raw
        };
        Ok(match kind {
            WidgetKind::Weather => Self::Weather(serde_json::from_value(raw)?),
            WidgetKind::Clock => Self::Clock(serde_json::from_value(raw)?),
            WidgetKind::Text => Self::Text(serde_json::from_value(raw)?),
        })
    }

    /// The widget kind this configuration belongs to.
    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Weather(_) => WidgetKind::Weather,
            Self::Clock(_) => WidgetKind::Clock,
            Self::Text(_) => WidgetKind::Text,
        }
    }
}

/// A floating overlay drawn above every zone.
#[derive(Clone, Debug, PartialEq)]
pub struct Widget {
    /// Widget id.
    pub id: String,
    /// Placement in canvas percent.
    pub rect: Rect,
    /// Rotation about the widget center.
    pub rotation: Rotation,
    /// Kind-specific configuration; its variant is the widget's type.
    pub config: WidgetConfig,
}

impl Widget {
    /// A new widget of `kind` at the origin with its default size and configuration.
    pub fn new(kind: WidgetKind) -> Self {
        let (w, h) = kind.default_size();
        Self {
            id: new_id(),
            rect: Rect::new(0.0, 0.0, w, h),
            rotation: Rotation::Deg0,
            config: WidgetConfig::default_for(kind),
        }
    }

    /// The widget type.
    pub fn kind(&self) -> WidgetKind {
        self.config.kind()
    }
}

#[derive(Deserialize)]
struct RawWidget {
    #[serde(default = "new_id")]
    id: String,
    #[serde(rename = "type")]
    kind: WidgetKind,
    #[serde(flatten)]
    rect: Rect,
    #[serde(default, deserialize_with = "null_as_default")]
    rotation: Rotation,
    #[serde(default)]
    config: Value,
}

#[derive(Serialize)]
struct WidgetOut<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: WidgetKind,
    #[serde(flatten)]
    rect: &'a Rect,
    rotation: Rotation,
    config: &'a WidgetConfig,
}

impl Serialize for Widget {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        WidgetOut {
            id: &self.id,
            kind: self.kind(),
            rect: &self.rect,
            rotation: self.rotation,
            config: &self.config,
        }
        .serialize(s)
    }
}

impl<'de> Deserialize<'de> for Widget {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = RawWidget::deserialize(d)?;
        let config =
            WidgetConfig::from_value(raw.kind, raw.config).map_err(serde::de::Error::custom)?;
        Ok(Self {
            id: raw.id,
            rect: raw.rect,
            rotation: raw.rotation,
            config,
        })
    }
}

/// Parse each element on its own, dropping the ones that fail with a warning.
fn lenient_list<'de, D, T>(d: D, what: &'static str) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value::<T>(v) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "skipping malformed {what}");
                None
            }
        })
        .collect())
}

/// Zones that fail to parse are dropped instead of failing the layout.
fn lenient_zones<'de, D>(d: D) -> Result<Vec<Zone>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_list(d, "zone")
}

/// Widgets that fail to parse are dropped instead of failing the layout.
fn lenient_widgets<'de, D>(d: D) -> Result<Vec<Widget>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_list(d, "widget")
}

/// A complete screen layout: zones, overlay widgets and an optional global timeline.
///
/// This is the unit of persistence. Every field may be absent or `null` in stored data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Template the layout was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Zones, bottom to top.
    #[serde(default, deserialize_with = "lenient_zones")]
    pub zones: Vec<Zone>,
    /// Overlay widgets, bottom to top, drawn above all zones.
    #[serde(default, deserialize_with = "lenient_widgets")]
    pub widgets: Vec<Widget>,
    /// Layout-wide timeline, shown full canvas when the layout has no zones.
    #[serde(
        rename = "timeline",
        alias = "globalTimeline",
        default,
        deserialize_with = "null_as_default"
    )]
    pub global_timeline: Vec<TimelineItem>,
    /// Rotation of the whole layout.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rotation: Rotation,
}

impl Layout {
    /// Parse stored layout JSON.
    pub fn from_json(s: &str) -> ZonecastResult<Self> {
        let v: Value = serde_json::from_str(s)?;
        Self::from_value(v)
    }

    /// Parse a stored layout value; `null` is an empty layout.
    pub fn from_value(v: Value) -> ZonecastResult<Self> {
        if v.is_null() {
            return Ok(Self::default());
        }
        let layout: Self = serde_json::from_value(v)?;
        for w in layout.bounds_warnings() {
            tracing::warn!("{w}");
        }
        Ok(layout)
    }

    /// Serialize for storage.
    pub fn to_value(&self) -> ZonecastResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Find a zone by id.
    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Rectangles of every zone, in order.
    pub fn zone_rects(&self) -> Vec<Rect> {
        self.zones.iter().map(|z| z.rect).collect()
    }

    /// Every media file referenced by any timeline.
    pub fn file_refs(&self) -> BTreeSet<&str> {
        self.zones
            .iter()
            .flat_map(|z| z.timeline.iter())
            .chain(self.global_timeline.iter())
            .filter_map(|t| t.file_id.as_deref())
            .collect()
    }

    /// Check structural invariants: unique zone ids, unique widget ids and file references on
    /// file items.
    pub fn validate(&self) -> ZonecastResult<()> {
        let mut seen = HashSet::new();
        for z in &self.zones {
            if !seen.insert(z.id.as_str()) {
                return Err(ZonecastError::validation(format!(
                    "duplicate zone id '{}'",
                    z.id
                )));
            }
        }
        let mut seen = HashSet::new();
        for w in &self.widgets {
            if !seen.insert(w.id.as_str()) {
                return Err(ZonecastError::validation(format!(
                    "duplicate widget id '{}'",
                    w.id
                )));
            }
        }
        let timelines = self
            .zones
            .iter()
            .map(|z| (z.id.as_str(), &z.timeline))
            .chain(std::iter::once(("timeline", &self.global_timeline)));
        for (owner, timeline) in timelines {
            for item in timeline {
                if item.kind == ItemKind::File && item.file_id.is_none() {
                    return Err(ZonecastError::validation(format!(
                        "{owner}: file item '{}' has no file_id",
                        item.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Describe zones and widgets that extend past the canvas. Such layouts still load and play.
    pub fn bounds_warnings(&self) -> Vec<String> {
        let zones = self
            .zones
            .iter()
            .filter(|z| !z.rect.is_within_canvas())
            .map(|z| format!("zone '{}' extends past the canvas: {:?}", z.id, z.rect));
        let widgets = self
            .widgets
            .iter()
            .filter(|w| !w.rect.is_within_canvas())
            .map(|w| format!("widget '{}' extends past the canvas: {:?}", w.id, w.rect));
        zones.chain(widgets).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/layout.rs"]
mod tests;
