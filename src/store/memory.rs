use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::model::records::ApiKey;
use crate::store::{Record, RecordStore, RecordStoreExt};

/// Tables of JSON rows kept in memory.
///
/// The on-disk form is one object mapping table names to arrays of rows:
/// `{"screens": [{"id": "...", ...}], "playlists": [...]}`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document.
    pub fn from_json(s: &str) -> ZonecastResult<Self> {
        let doc: Map<String, Value> = serde_json::from_str(s)?;
        let mut store = Self::new();
        for (table, rows) in doc {
            let Value::Array(rows) = rows else {
                return Err(ZonecastError::validation(format!(
                    "table '{table}' must be an array of rows"
                )));
            };
            for row in rows {
                let id = row
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ZonecastError::validation(format!("row in '{table}' has no string id"))
                    })?
                    .to_string();
                store.put_row(&table, &id, row)?;
            }
        }
        Ok(store)
    }

    /// Load a JSON document from disk.
    pub fn load(path: &Path) -> ZonecastResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read store '{}'", path.display()))?;
        Self::from_json(&s)
    }

    /// Serialize every table.
    pub fn to_json(&self) -> ZonecastResult<String> {
        let doc: Map<String, Value> = self
            .tables
            .iter()
            .map(|(t, rows)| (t.clone(), Value::Array(rows.values().cloned().collect())))
            .collect();
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Write every table to disk.
    pub fn save(&self, path: &Path) -> ZonecastResult<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("write store '{}'", path.display()))?;
        Ok(())
    }

    fn api_key(&self, key: &str) -> ZonecastResult<Option<ApiKey>> {
        Ok(self.list::<ApiKey>()?.into_iter().find(|k| k.key == key))
    }
}

impl RecordStore for MemoryStore {
    fn get_row(&self, table: &str, id: &str) -> ZonecastResult<Option<Value>> {
        Ok(self.tables.get(table).and_then(|t| t.get(id)).cloned())
    }

    fn list_rows(&self, table: &str) -> ZonecastResult<Vec<Value>> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default())
    }

    fn put_row(&mut self, table: &str, id: &str, row: Value) -> ZonecastResult<()> {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), row);
        Ok(())
    }

    fn delete_row(&mut self, table: &str, id: &str) -> ZonecastResult<bool> {
        Ok(self
            .tables
            .get_mut(table)
            .is_some_and(|t| t.remove(id).is_some()))
    }

    fn validate_api_key(&self, key: &str) -> ZonecastResult<bool> {
        Ok(self
            .api_key(key)?
            .is_some_and(|k| k.is_active.unwrap_or(true)))
    }

    fn touch_api_key(&mut self, key: &str, now: DateTime<Utc>) -> ZonecastResult<()> {
        let mut record = self
            .api_key(key)?
            .ok_or_else(|| ZonecastError::not_found("api key"))?;
        record.last_used_at = Some(now);
        self.put_row(ApiKey::TABLE, &record.id, serde_json::to_value(&record)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/memory.rs"]
mod tests;
