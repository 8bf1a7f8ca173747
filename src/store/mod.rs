//! Persistence collaborator.
//!
//! [`RecordStore`] is the raw keyed-table interface an embedding application provides;
//! [`RecordStoreExt`] layers typed access and the handful of queries playback needs on top of it.

/// In-memory store backed by a JSON document.
pub mod memory;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::model::layout::Layout;
use crate::model::records::{LayoutRecord, PlaylistItem, Screen};

/// A row type stored in a named table and keyed by its `id`.
pub trait Record: Serialize + DeserializeOwned {
    /// Table name.
    const TABLE: &'static str;

    /// Primary key.
    fn id(&self) -> &str;
}

/// Keyed JSON rows grouped in tables.
pub trait RecordStore {
    /// Row `id` of `table`, if present.
    fn get_row(&self, table: &str, id: &str) -> ZonecastResult<Option<Value>>;

    /// Every row of `table`.
    fn list_rows(&self, table: &str) -> ZonecastResult<Vec<Value>>;

    /// Insert or replace row `id` of `table`.
    fn put_row(&mut self, table: &str, id: &str, row: Value) -> ZonecastResult<()>;

    /// Remove row `id`; returns whether it existed.
    fn delete_row(&mut self, table: &str, id: &str) -> ZonecastResult<bool>;

    /// Whether `key` is a known, active device credential.
    fn validate_api_key(&self, key: &str) -> ZonecastResult<bool>;

    /// Record a use of `key` at `now`.
    fn touch_api_key(&mut self, key: &str, now: DateTime<Utc>) -> ZonecastResult<()>;
}

/// Typed access and playback queries over any [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    /// Fetch a record, or `None` when absent.
    fn find<R: Record>(&self, id: &str) -> ZonecastResult<Option<R>> {
        self.get_row(R::TABLE, id)?
            .map(|v| serde_json::from_value(v).map_err(ZonecastError::from))
            .transpose()
    }

    /// Fetch a record that must exist.
    fn get<R: Record>(&self, id: &str) -> ZonecastResult<R> {
        self.find(id)?
            .ok_or_else(|| ZonecastError::not_found(format!("{} '{id}'", R::TABLE)))
    }

    /// Every record of a table.
    fn list<R: Record>(&self) -> ZonecastResult<Vec<R>> {
        self.list_rows(R::TABLE)?
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(ZonecastError::from))
            .collect()
    }

    /// Add a new record; fails when the id is taken.
    fn insert<R: Record>(&mut self, record: &R) -> ZonecastResult<()> {
        if self.get_row(R::TABLE, record.id())?.is_some() {
            return Err(ZonecastError::validation(format!(
                "{} '{}' already exists",
                R::TABLE,
                record.id()
            )));
        }
        self.put_row(R::TABLE, record.id(), serde_json::to_value(record)?)
    }

    /// Replace an existing record; fails when it does not exist.
    fn update<R: Record>(&mut self, record: &R) -> ZonecastResult<()> {
        if self.get_row(R::TABLE, record.id())?.is_none() {
            return Err(ZonecastError::not_found(format!(
                "{} '{}'",
                R::TABLE,
                record.id()
            )));
        }
        self.put_row(R::TABLE, record.id(), serde_json::to_value(record)?)
    }

    /// Remove a record; returns whether it existed.
    fn delete<R: Record>(&mut self, id: &str) -> ZonecastResult<bool> {
        self.delete_row(R::TABLE, id)
    }

    /// Look a screen up by pairing code.
    fn screen_by_code(&self, code: &str) -> ZonecastResult<Screen> {
        let code = code.trim();
        self.list::<Screen>()?
            .into_iter()
            .find(|s| s.code == code)
            .ok_or_else(|| ZonecastError::not_found(format!("screen with code '{code}'")))
    }

    /// Entries of a playlist ordered by `order_index`; ties keep store order.
    fn playlist_items(&self, playlist_id: &str) -> ZonecastResult<Vec<PlaylistItem>> {
        let mut items: Vec<PlaylistItem> = self
            .list::<PlaylistItem>()?
            .into_iter()
            .filter(|i| i.playlist_id == playlist_id)
            .collect();
        items.sort_by_key(|i| i.order_index);
        Ok(items)
    }

    /// Persist `layout` into record `layout_id` and bump `updated_at` on every screen whose
    /// current playlist references it. Returns the ids of the touched screens.
    ///
    /// The write replaces whatever was stored; concurrent editors are last-write-wins.
    fn save_layout(
        &mut self,
        layout_id: &str,
        layout: &Layout,
        now: DateTime<Utc>,
    ) -> ZonecastResult<Vec<String>> {
        let mut record: LayoutRecord = self.get(layout_id)?;
        record.layout_data = layout.to_value()?;
        record.updated_at = Some(now);
        self.update(&record)?;

        let playlists: Vec<String> = self
            .list::<PlaylistItem>()?
            .into_iter()
            .filter(|i| i.layout_id.as_deref() == Some(layout_id))
            .map(|i| i.playlist_id)
            .collect();

        let mut touched = Vec::new();
        for mut screen in self.list::<Screen>()? {
            let shows_layout = screen
                .current_playlist_id
                .as_ref()
                .is_some_and(|p| playlists.contains(p));
            if shows_layout {
                screen.updated_at = Some(now);
                self.update(&screen)?;
                touched.push(screen.id);
            }
        }
        tracing::debug!(layout_id, screens = touched.len(), "layout saved");
        Ok(touched)
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}

#[cfg(test)]
#[path = "../../tests/unit/store/mod.rs"]
mod tests;
