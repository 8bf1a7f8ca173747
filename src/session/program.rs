use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::foundation::error::ZonecastResult;
use crate::model::layout::{DEFAULT_DURATION_SECS, Layout};
use crate::model::records::{LayoutRecord, MediaFile, MediaKind, PlaylistItem, Screen};
use crate::schedule::Dwell;
use crate::store::{RecordStore, RecordStoreExt};
use crate::widgets::apps::AppSpec;

/// What a playlist entry resolved to.
#[derive(Clone, Debug, PartialEq)]
pub enum EntryContent {
    /// A full-screen media file.
    Media(MediaFile),
    /// A stored layout.
    Layout {
        /// Layout record id.
        layout_id: String,
        /// Parsed layout snapshot.
        layout: Arc<Layout>,
    },
    /// A full-screen app.
    App {
        /// App type as configured.
        app_type: String,
        /// Parsed app configuration.
        spec: AppSpec,
    },
    /// The referenced file or layout does not exist.
    NotFound(String),
    /// The file's MIME type is neither image nor video.
    Unsupported {
        /// Reported MIME type.
        file_type: String,
    },
    /// The app type is unknown or its configuration is incomplete.
    UnsupportedApp {
        /// App type as configured.
        app_type: String,
        /// Why it cannot run.
        reason: String,
    },
}

/// One resolved playlist entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaylistEntry {
    /// Playlist item id.
    pub id: String,
    /// Dwell in seconds.
    pub duration: u32,
    /// Resolved content.
    pub content: EntryContent,
}

impl Dwell for PlaylistEntry {
    fn dwell_ms(&self) -> u64 {
        crate::model::layout::dwell_ms(self.duration)
    }
}

/// A playlist with every reference resolved up front.
///
/// `revision` changes whenever the underlying records change, which is how the player notices
/// that it must reload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    /// Entries in playback order.
    pub entries: Vec<PlaylistEntry>,
    /// Media files referenced by any layout entry.
    pub files: HashMap<String, MediaFile>,
    /// Opaque change marker.
    pub revision: String,
}

impl Program {
    /// A program with nothing to show.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A program whose only entry reports `what` as missing.
    pub fn not_found(what: impl Into<String>) -> Self {
        let what = what.into();
        Self {
            entries: vec![PlaylistEntry {
                id: "not-found".to_string(),
                duration: DEFAULT_DURATION_SECS,
                content: EntryContent::NotFound(what.clone()),
            }],
            files: HashMap::new(),
            revision: format!("missing|{what}"),
        }
    }

    /// A program that shows one layout forever.
    pub fn single_layout(layout: Layout, files: HashMap<String, MediaFile>) -> Self {
        Self {
            entries: vec![PlaylistEntry {
                id: "layout".to_string(),
                duration: DEFAULT_DURATION_SECS,
                content: EntryContent::Layout {
                    layout_id: "layout".to_string(),
                    layout: Arc::new(layout),
                },
            }],
            files,
            revision: String::new(),
        }
    }

    /// Resolve the playlist currently assigned to `screen`.
    pub fn for_screen<S: RecordStore + ?Sized>(store: &S, screen: &Screen) -> ZonecastResult<Self> {
        match screen.current_playlist_id.as_deref() {
            Some(id) => Self::resolve(store, id),
            None => Ok(Self::empty()),
        }
    }

    /// Resolve every item of playlist `playlist_id`.
    ///
    /// References that do not resolve become [`EntryContent::NotFound`] instead of failing the
    /// whole program; only store errors propagate.
    #[tracing::instrument(skip(store))]
    pub fn resolve<S: RecordStore + ?Sized>(store: &S, playlist_id: &str) -> ZonecastResult<Self> {
        let items = store.playlist_items(playlist_id)?;
        let mut files = HashMap::new();
        let mut stamps: Vec<String> = Vec::new();
        let mut entries = Vec::with_capacity(items.len());

        for item in &items {
            let content = resolve_item(store, item, &mut files, &mut stamps)?;
            entries.push(PlaylistEntry {
                id: item.id.clone(),
                duration: item.duration,
                content,
            });
        }

        let revision = format!(
            "{}|{}",
            serde_json::to_string(&items)?,
            stamps.join(",")
        );
        tracing::debug!(entries = entries.len(), files = files.len(), "program resolved");
        Ok(Self {
            entries,
            files,
            revision,
        })
    }

    /// `true` when `other` has the same entries in the same order with the same kinds, so a
    /// running presentation can take it over without restarting the playlist.
    pub fn same_shape(&self, other: &Program) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.id == b.id && same_kind(&a.content, &b.content))
    }
}

fn same_kind(a: &EntryContent, b: &EntryContent) -> bool {
    match (a, b) {
        (EntryContent::Layout { layout_id: x, .. }, EntryContent::Layout { layout_id: y, .. }) => {
            x == y
        }
        _ => std::mem::discriminant(a) == std::mem::discriminant(b),
    }
}

fn resolve_item<S: RecordStore + ?Sized>(
    store: &S,
    item: &PlaylistItem,
    files: &mut HashMap<String, MediaFile>,
    stamps: &mut Vec<String>,
) -> ZonecastResult<EntryContent> {
    if let Some(file_id) = item.file_id.as_deref() {
        return Ok(match store.find::<MediaFile>(file_id)? {
            None => EntryContent::NotFound(format!("file '{file_id}'")),
            Some(f) if f.kind() == MediaKind::Unsupported => EntryContent::Unsupported {
                file_type: f.file_type,
            },
            Some(f) => EntryContent::Media(f),
        });
    }

    if let Some(layout_id) = item.layout_id.as_deref() {
        let Some(record) = store.find::<LayoutRecord>(layout_id)? else {
            return Ok(EntryContent::NotFound(format!("layout '{layout_id}'")));
        };
        stamps.push(format!("{layout_id}@{}", stamp(record.updated_at)));
        let layout = match record.layout() {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(layout_id, error = %e, "stored layout is unreadable");
                return Ok(EntryContent::NotFound(format!("layout '{layout_id}'")));
            }
        };
        for file_id in layout.file_refs() {
            if files.contains_key(file_id) {
                continue;
            }
            if let Some(f) = store.find::<MediaFile>(file_id)? {
                files.insert(file_id.to_string(), f);
            }
        }
        return Ok(EntryContent::Layout {
            layout_id: layout_id.to_string(),
            layout: Arc::new(layout),
        });
    }

    if let Some(app_type) = item.app_type.as_deref() {
        return Ok(
            match AppSpec::from_entry(app_type, item.app_config.as_ref()) {
                Ok(spec) => EntryContent::App {
                    app_type: app_type.to_string(),
                    spec,
                },
                Err(e) => EntryContent::UnsupportedApp {
                    app_type: app_type.to_string(),
                    reason: e.to_string(),
                },
            },
        );
    }

    Ok(EntryContent::NotFound(format!(
        "content for playlist item '{}'",
        item.id
    )))
}

fn stamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.to_rfc3339()).unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/session/program.rs"]
mod tests;
