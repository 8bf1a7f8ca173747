//! Zonecast is a layout composition and scheduled playback engine for unattended display screens.
//!
//! A screen shows a playlist. Each playlist entry is a media file, a full-screen app or a
//! [`Layout`]: rectangular zones with their own timelines plus floating overlay widgets.
//!
//! # Pipeline overview
//!
//! 1. **Author**: build or edit a [`Layout`] through an [`EditSession`]; new zones are placed with
//!    [`find_free_slot`].
//! 2. **Resolve**: turn a stored playlist into a [`Program`] with every reference looked up.
//! 3. **Schedule**: a [`Presentation`] owns one [`TimerQueue`] that drives the playlist, every
//!    zone timeline and every widget refresh.
//! 4. **Compose**: [`Presentation::frame`] evaluates a [`Frame`] (paint-ordered nodes); the
//!    rasterizer can turn it into pixels.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Explicit time**: schedulers read [`Millis`] passed in by the caller, so playback runs on a
//!   virtual clock in tests and on the monotonic clock in the player.
//! - **Isolated failures**: a failed fetch or a dangling reference degrades one zone or widget,
//!   never the whole screen.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod content;
mod foundation;
mod geometry;
mod model;
mod render;
mod schedule;
mod session;
mod store;
mod widgets;

/// Device-facing endpoints (screen lookup, playlist content, status updates).
pub mod api;
/// Player configuration.
pub mod config;

pub use crate::foundation::core::{Affine, Millis, Point, Rect, Rotation, new_id};
pub use crate::foundation::error::{ZonecastError, ZonecastResult};

pub use crate::geometry::overlap::{overlapping_pairs, overlaps};
pub use crate::geometry::placement::{PLACEMENT_STEP, PlacementMode, find_free_slot, place};

pub use crate::model::edit::{EditSession, NEW_ZONE_SIZE, StackMove, TimelineRef, ZonePatch};
pub use crate::model::layout::{
    DEFAULT_DURATION_SECS, ItemKind, Layout, TimelineItem, Widget, WidgetConfig, WidgetKind, Zone,
    dwell_ms,
};
pub use crate::model::records::{
    ApiKey, LayoutRecord, MediaFile, MediaKind, Playlist, PlaylistItem, Screen,
};
pub use crate::model::templates::{TEMPLATE_NAMES, template};

pub use crate::store::memory::MemoryStore;
pub use crate::store::{Record, RecordStore, RecordStoreExt};

pub use crate::content::cache::{ContentCache, PoolCache, Read, ReadSource};
pub use crate::content::feed::{FeedEntry, MAX_FEED_ENTRIES, parse_feed};
pub use crate::content::fetch::{
    DEFAULT_USER_AGENT, FetchResponse, Fetcher, HttpFetcher, ProxyFetcher, Reply, ScriptedFetcher,
    fetch_text, proxied_url,
};
pub use crate::content::proxy::{CORS_HEADERS, RELAY_USER_AGENT, RelayResponse, relay};

pub use crate::widgets::apps::{AppSpec, QUOTE_URL, Quote, parse_quote, random_image_url};
pub use crate::widgets::clock::{ClockConfig, HourFormat, format_time};
pub use crate::widgets::runtime::{
    ContentRuntime, FEED_ROTATION_MS, Refreshed, WEATHER_WIDGET_TTL_MS,
};
pub use crate::widgets::text::{
    Alignment, TextAnimation, TextConfig, TextOverlay, parse_hex_color,
};
pub use crate::widgets::weather::{
    CITY_COORDINATES, DEFAULT_CITY, WeatherConfig, WeatherIcon, WeatherOverlay, WeatherReport,
    city_coordinates, current_weather_url, describe_weather_code, forecast_url,
    parse_current_weather, parse_forecast, parse_latlon,
};
pub use crate::widgets::{FontSize, WidgetContent};

pub use crate::schedule::Dwell;
pub use crate::schedule::playlist::PlaylistScheduler;
pub use crate::schedule::sequence::Sequencer;
pub use crate::schedule::timer::{Fired, SourceSlot, TimerId, TimerQueue, TimerTarget, ZoneSlot};
pub use crate::schedule::zone::{ZoneScheduler, ZoneState};

pub use crate::render::compositor::{GLOBAL_NODE_ID, LayoutState, compose_layout};
pub use crate::render::frame::{
    Frame, FrameNode, LayoutFrame, NodeContent, NodeLayer, RotationStack, ScreenState,
};
pub use crate::render::raster::{PremulRgba8, over, rasterize, rasterize_layout, write_png};

pub use crate::session::player::{HEARTBEAT_MS, POLL_MS, PlayerTiming, ScreenPlayer};
pub use crate::session::presentation::{Presentation, PresentationOpts, SessionEvent};
pub use crate::session::program::{EntryContent, PlaylistEntry, Program};

pub use crate::config::PlayerConfig;
