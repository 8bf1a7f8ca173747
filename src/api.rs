use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::model::records::{LayoutRecord, MediaFile, Playlist, Screen};
use crate::store::{RecordStore, RecordStoreExt};

/// Status used when a screen reports in without one.
pub const DEFAULT_STATUS: &str = "online";

/// A JSON response from a device endpoint.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// `true` for 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Headers sent with every device response.
    pub fn headers(&self) -> [(&'static str, &'static str); 3] {
        [
            ("Access-Control-Allow-Origin", "*"),
            (
                "Access-Control-Allow-Headers",
                "authorization, x-client-info, apikey, content-type, x-api-key",
            ),
            ("Content-Type", "application/json"),
        ]
    }
}

impl From<ZonecastError> for ApiResponse {
    fn from(e: ZonecastError) -> Self {
        Self::error(500, e.to_string())
    }
}

/// Check the `x-api-key` value and record its use. `Err` carries the 401 response.
fn authorize<S: RecordStore + ?Sized>(
    store: &mut S,
    api_key: Option<&str>,
    now: DateTime<Utc>,
) -> ZonecastResult<Result<(), ApiResponse>> {
    let Some(key) = api_key.filter(|k| !k.is_empty()) else {
        return Ok(Err(ApiResponse::error(401, "API key is required")));
    };
    if !store.validate_api_key(key)? {
        return Ok(Err(ApiResponse::error(401, "Invalid API key")));
    }
    store.touch_api_key(key, now)?;
    Ok(Ok(()))
}

fn respond(r: ZonecastResult<ApiResponse>) -> ApiResponse {
    r.unwrap_or_else(|e| {
        tracing::error!(error = %e, "device request failed");
        e.into()
    })
}

/// `GET get-screen-by-code?code=...`: the screen with its current playlist embedded.
#[tracing::instrument(skip(store, api_key))]
pub fn screen_by_code<S: RecordStore + ?Sized>(
    store: &mut S,
    api_key: Option<&str>,
    code: Option<&str>,
    now: DateTime<Utc>,
) -> ApiResponse {
    respond((|| -> ZonecastResult<ApiResponse> {
        if let Err(denied) = authorize(store, api_key, now)? {
            return Ok(denied);
        }
        let Some(code) = code.filter(|c| !c.trim().is_empty()) else {
            return Ok(ApiResponse::error(400, "Screen code is required"));
        };
        let screen = match store.screen_by_code(code) {
            Ok(s) => s,
            Err(e) if e.is_not_found() => return Ok(ApiResponse::error(404, "Screen not found")),
            Err(e) => return Err(e),
        };
        let playlist = match screen.current_playlist_id.as_deref() {
            Some(id) => store.find::<Playlist>(id)?,
            None => None,
        };
        let mut body = serde_json::to_value(&screen)?;
        if let Value::Object(map) = &mut body {
            map.insert("playlists".to_string(), serde_json::to_value(playlist)?);
        }
        tracing::info!(screen = %screen.name, code, "screen found");
        Ok(ApiResponse::ok(json!({ "screen": body })))
    })())
}

/// `GET get-playlist-content?playlist_id=...`: ordered items with their file and layout
/// embedded.
#[tracing::instrument(skip(store, api_key))]
pub fn playlist_content<S: RecordStore + ?Sized>(
    store: &mut S,
    api_key: Option<&str>,
    playlist_id: Option<&str>,
    now: DateTime<Utc>,
) -> ApiResponse {
    respond((|| -> ZonecastResult<ApiResponse> {
        if let Err(denied) = authorize(store, api_key, now)? {
            return Ok(denied);
        }
        let Some(playlist_id) = playlist_id.filter(|p| !p.is_empty()) else {
            return Ok(ApiResponse::error(400, "Playlist ID is required"));
        };
        let mut items = Vec::new();
        for item in store.playlist_items(playlist_id)? {
            let file = match item.file_id.as_deref() {
                Some(id) => store.find::<MediaFile>(id)?,
                None => None,
            };
            let layout = match item.layout_id.as_deref() {
                Some(id) => store.find::<LayoutRecord>(id)?,
                None => None,
            };
            let mut v = serde_json::to_value(&item)?;
            if let Value::Object(map) = &mut v {
                map.insert("files".to_string(), serde_json::to_value(file)?);
                map.insert("layouts".to_string(), serde_json::to_value(layout)?);
            }
            items.push(v);
        }
        tracing::info!(playlist_id, items = items.len(), "playlist items found");
        Ok(ApiResponse::ok(json!({ "items": items })))
    })())
}

/// `POST update-screen-status`: mark a screen seen, with `status` defaulting to `online`.
#[tracing::instrument(skip(store, api_key))]
pub fn update_screen_status<S: RecordStore + ?Sized>(
    store: &mut S,
    api_key: Option<&str>,
    screen_code: Option<&str>,
    status: Option<&str>,
    now: DateTime<Utc>,
) -> ApiResponse {
    respond((|| -> ZonecastResult<ApiResponse> {
        if let Err(denied) = authorize(store, api_key, now)? {
            return Ok(denied);
        }
        let Some(code) = screen_code.filter(|c| !c.trim().is_empty()) else {
            return Ok(ApiResponse::error(400, "Screen code is required"));
        };
        let mut screen: Screen = match store.screen_by_code(code) {
            Ok(s) => s,
            Err(e) if e.is_not_found() => return Ok(ApiResponse::error(404, "Screen not found")),
            Err(e) => return Err(e),
        };
        screen.status = status
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STATUS)
            .to_string();
        screen.last_seen = Some(now);
        store.update(&screen)?;
        Ok(ApiResponse::ok(json!({ "success": true, "screen": screen })))
    })())
}

#[cfg(test)]
#[path = "../tests/unit/api.rs"]
mod tests;
