use chrono::{DateTime, Utc};
use rand::Rng;

use crate::content::cache::{ContentCache, PoolCache};
use crate::content::feed::{FeedEntry, parse_feed};
use crate::content::fetch::{Fetcher, fetch_text, proxied_url};
use crate::foundation::core::Millis;
use crate::model::layout::WidgetConfig;
use crate::widgets::WidgetContent;
use crate::widgets::apps::{AppSpec, QUOTE_URL, Quote, parse_quote, random_image_url};
use crate::widgets::clock::{ClockConfig, format_time};
use crate::widgets::text::{TextConfig, TextOverlay};
use crate::widgets::weather::{
    WeatherConfig, WeatherOverlay, WeatherReport, current_weather_url, parse_current_weather,
    parse_forecast,
};

/// Dwell time of one feed entry.
pub const FEED_ROTATION_MS: u64 = 8_000;

/// Refresh interval of weather overlays.
pub const WEATHER_WIDGET_TTL_MS: u64 = 60_000;

#[derive(Clone, Copy, Debug)]
enum WeatherApi {
    Forecast,
    CurrentWeather,
}

#[derive(Debug)]
struct WeatherSource {
    url: String,
    label: String,
    api: WeatherApi,
    display: WeatherConfig,
    cache: ContentCache<WeatherReport>,
    error: Option<String>,
}

#[derive(Debug)]
struct FeedSource {
    request_url: String,
    cache: ContentCache<Vec<FeedEntry>>,
    items: Vec<FeedEntry>,
    index: usize,
    error: Option<String>,
}

#[derive(Debug)]
enum Source {
    Clock(ClockConfig),
    Text(TextConfig),
    Weather(WeatherSource),
    Feed(FeedSource),
    Quote {
        pool: PoolCache<Quote>,
        current: Option<Quote>,
    },
    Image(ContentCache<String>),
}

/// Result of one refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Refreshed {
    /// A rotating source went from no entries to some; its rotation timer should start.
    pub rotation_ready: bool,
}

/// Live state of one widget or app for as long as it is on screen.
#[derive(Debug)]
pub struct ContentRuntime {
    source: Source,
    appeared_at: Millis,
}

impl ContentRuntime {
    /// Runtime for an overlay widget.
    pub fn for_widget(cfg: &WidgetConfig, now: Millis) -> Self {
        let source = match cfg {
            WidgetConfig::Clock(c) => Source::Clock(c.clone()),
            WidgetConfig::Text(c) => Source::Text(c.clone()),
            WidgetConfig::Weather(c) => Source::Weather(WeatherSource {
                url: c.forecast_url(),
                label: c.city.clone(),
                api: WeatherApi::Forecast,
                display: c.clone(),
                cache: ContentCache::new(WEATHER_WIDGET_TTL_MS),
                error: None,
            }),
        };
        Self {
            source,
            appeared_at: now,
        }
    }

    /// Runtime for a full-screen app; feeds go through `proxy` when given.
    pub fn for_app(spec: &AppSpec, proxy: Option<&url::Url>, now: Millis) -> Self {
        let ttl = spec.ttl_ms();
        let source = match spec {
            AppSpec::Weather { lat, lon } => Source::Weather(WeatherSource {
                url: current_weather_url(*lat, *lon),
                label: format!("{lat},{lon}"),
                api: WeatherApi::CurrentWeather,
                display: WeatherConfig::default(),
                cache: ContentCache::new(ttl),
                error: None,
            }),
            AppSpec::Rss { url } => Source::Feed(FeedSource {
                request_url: match proxy {
                    Some(base) => proxied_url(base, url),
                    None => url.clone(),
                },
                cache: ContentCache::new(ttl),
                items: Vec::new(),
                index: 0,
                error: None,
            }),
            AppSpec::Quote => Source::Quote {
                pool: PoolCache::new(ttl, Quote::fallback()),
                current: None,
            },
            AppSpec::RandomImage => Source::Image(ContentCache::new(ttl)),
        };
        Self {
            source,
            appeared_at: now,
        }
    }

    /// Refresh cadence, or `None` for sources that never fetch.
    pub fn refresh_interval_ms(&self) -> Option<u64> {
        match &self.source {
            Source::Clock(_) | Source::Text(_) => None,
            Source::Weather(w) => Some(w.cache.ttl_ms()),
            Source::Feed(f) => Some(f.cache.ttl_ms()),
            Source::Quote { pool, .. } => Some(pool.ttl_ms()),
            Source::Image(c) => Some(c.ttl_ms()),
        }
    }

    /// Index of the feed entry on screen, for rotating sources.
    pub fn rotation_index(&self) -> Option<usize> {
        match &self.source {
            Source::Feed(f) if !f.items.is_empty() => Some(f.index),
            _ => None,
        }
    }

    /// Pull content through the cache. Failures are kept as an inline error state.
    pub fn refresh<R: Rng>(
        &mut self,
        now: Millis,
        fetcher: &dyn Fetcher,
        rng: &mut R,
    ) -> Refreshed {
        match &mut self.source {
            Source::Clock(_) | Source::Text(_) => Refreshed::default(),
            Source::Weather(w) => {
                let (url, label, api) = (&w.url, &w.label, w.api);
                let read = w.cache.get_value(now, || {
                    let body = fetch_text(fetcher, url)?;
                    match api {
                        WeatherApi::Forecast => parse_forecast(&body, label),
                        WeatherApi::CurrentWeather => parse_current_weather(&body, label),
                    }
                });
                w.error = match read {
                    Ok(_) => None,
                    Err(e) => {
                        tracing::warn!(url = %w.url, error = %e, "weather refresh failed");
                        Some("Weather unavailable".to_string())
                    }
                };
                Refreshed::default()
            }
            Source::Feed(f) => {
                let url = &f.request_url;
                let read = f
                    .cache
                    .get_value(now, || parse_feed(&fetch_text(fetcher, url)?));
                match read {
                    Ok(r) => {
                        let was_empty = f.items.is_empty();
                        f.items = r.value;
                        f.index = if f.items.is_empty() {
                            0
                        } else {
                            f.index % f.items.len()
                        };
                        f.error = None;
                        Refreshed {
                            rotation_ready: was_empty && !f.items.is_empty(),
                        }
                    }
                    Err(e) => {
                        tracing::warn!(url = %f.request_url, error = %e, "feed refresh failed");
                        f.error = Some("Feed unavailable".to_string());
                        Refreshed::default()
                    }
                }
            }
            Source::Quote { pool, current } => {
                let read = pool.get_value(now, rng, || {
                    parse_quote(&fetch_text(fetcher, QUOTE_URL)?)
                });
                *current = Some(read.value);
                Refreshed::default()
            }
            Source::Image(cache) => {
                let minted = random_image_url(rng);
                // Minting cannot fail.
                if let Ok(read) = cache.get_value(now, || Ok(minted)) {
                    tracing::trace!(url = %read.value, "image refreshed");
                }
                Refreshed::default()
            }
        }
    }

    /// Advance a rotating source to its next entry. Returns `false` when there is nothing to
    /// rotate, in which case the rotation timer is not re-armed.
    pub fn rotate(&mut self) -> bool {
        match &mut self.source {
            Source::Feed(f) if !f.items.is_empty() => {
                f.index = (f.index + 1) % f.items.len();
                true
            }
            _ => false,
        }
    }

    /// What the widget shows at `now`; `wall` is the wall-clock time for clocks.
    pub fn content(&self, now: Millis, wall: DateTime<Utc>) -> WidgetContent {
        match &self.source {
            Source::Clock(c) => WidgetContent::Clock {
                text: format_time(c, wall),
            },
            Source::Text(c) => {
                WidgetContent::Text(TextOverlay::at(c, Millis(now.since(self.appeared_at))))
            }
            Source::Weather(w) => match (&w.error, w.cache.peek()) {
                (Some(message), _) => WidgetContent::Error {
                    message: message.clone(),
                },
                (None, Some(report)) => {
                    WidgetContent::Weather(WeatherOverlay::new(report, &w.display))
                }
                (None, None) => WidgetContent::Loading,
            },
            Source::Feed(f) => match (&f.error, f.items.get(f.index)) {
                (Some(message), _) => WidgetContent::Error {
                    message: message.clone(),
                },
                (None, Some(entry)) => WidgetContent::Feed {
                    entry: entry.clone(),
                    index: f.index,
                    count: f.items.len(),
                },
                (None, None) => WidgetContent::Loading,
            },
            Source::Quote { current, .. } => match current {
                Some(q) => WidgetContent::Quote(q.clone()),
                None => WidgetContent::Loading,
            },
            Source::Image(cache) => match cache.peek() {
                Some(url) => WidgetContent::Image { url: url.clone() },
                None => WidgetContent::Loading,
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/runtime.rs"]
mod tests;
