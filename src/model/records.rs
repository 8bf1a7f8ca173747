//! Row shapes of the records the engine reads from and writes to the store.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::foundation::error::ZonecastResult;
use crate::model::layout::{DEFAULT_DURATION_SECS, Layout, lenient_duration};
use crate::store::Record;

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

fn offline() -> String {
    "offline".to_string()
}

/// A physical display paired by a numeric code.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Screen {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Numeric pairing code entered on the device.
    pub code: String,
    /// Playlist currently assigned to the screen.
    #[serde(default)]
    pub current_playlist_id: Option<String>,
    /// `online` / `offline`.
    #[serde(default = "offline")]
    pub status: String,
    /// Last heartbeat.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    /// Bumped whenever content the screen shows changes.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Named, ordered list of entries.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Playlist {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// One playlist entry. Exactly one of `file_id`, `layout_id` or `app_type` is expected.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaylistItem {
    /// Record id.
    pub id: String,
    /// Owning playlist.
    pub playlist_id: String,
    /// Position in the playlist.
    #[serde(default)]
    pub order_index: i64,
    /// Dwell in seconds.
    #[serde(default = "default_duration", deserialize_with = "lenient_duration")]
    pub duration: u32,
    /// Media file shown full screen.
    #[serde(default)]
    pub file_id: Option<String>,
    /// Layout shown full screen.
    #[serde(default)]
    pub layout_id: Option<String>,
    /// App type (`weather`, `rss`, `random_image`, `quote`).
    #[serde(default)]
    pub app_type: Option<String>,
    /// App configuration.
    #[serde(default)]
    pub app_config: Option<Value>,
}

/// Broad class of a media file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// `image/*`
    Image,
    /// `video/*`
    Video,
    /// Anything else.
    Unsupported,
}

/// An uploaded media file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaFile {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Public URL.
    pub file_url: String,
    /// MIME type.
    pub file_type: String,
    /// Intrinsic duration in seconds, for videos.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl MediaFile {
    /// Classify by MIME prefix.
    pub fn kind(&self) -> MediaKind {
        let mime = self.file_type.to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Unsupported
        }
    }
}

/// A stored layout.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutRecord {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Serialized [`Layout`].
    #[serde(default)]
    pub layout_data: Value,
    /// Last save.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LayoutRecord {
    /// Decode `layout_data`.
    pub fn layout(&self) -> ZonecastResult<Layout> {
        Layout::from_value(self.layout_data.clone())
    }
}

/// A device credential.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ApiKey {
    /// Record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Secret value presented by devices.
    pub key: String,
    /// Disabled keys never validate; absent means active.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Last successful use.
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

macro_rules! record {
    ($ty:ty, $table:literal) => {
        impl Record for $ty {
            const TABLE: &'static str = $table;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

record!(Screen, "screens");
record!(Playlist, "playlists");
record!(PlaylistItem, "playlist_items");
record!(MediaFile, "files");
record!(LayoutRecord, "layouts");
record!(ApiKey, "api_keys");

#[cfg(test)]
#[path = "../../tests/unit/model/records.rs"]
mod tests;
