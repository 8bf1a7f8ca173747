use rand::Rng;
use serde_json::Value;

use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::widgets::weather::parse_latlon;

/// Remote random-quote endpoint.
pub const QUOTE_URL: &str = "https://api.quotable.io/random";

/// A quote with attribution.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Quote {
    /// Quote text.
    pub content: String,
    /// Attribution.
    pub author: String,
}

impl Quote {
    /// Shown when no quote can be fetched.
    pub fn fallback() -> Self {
        Self {
            content: "Keep moving forward.".to_string(),
            author: "Unknown".to_string(),
        }
    }
}

/// Parse the quote endpoint's JSON body.
pub fn parse_quote(body: &str) -> ZonecastResult<Quote> {
    serde_json::from_str(body).map_err(|e| ZonecastError::parse(format!("quote response: {e}")))
}

/// A fresh random image URL.
pub fn random_image_url<R: Rng>(rng: &mut R) -> String {
    format!(
        "https://picsum.photos/1280/720?random={}",
        rng.gen_range(0..100_000u32)
    )
}

/// A full-screen app referenced by a playlist entry (`app_type` + `app_config`).
#[derive(Clone, Debug, PartialEq)]
pub enum AppSpec {
    /// Current weather for explicit coordinates.
    Weather {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lon: f64,
    },
    /// RSS feed, fetched through the proxy.
    Rss {
        /// Feed URL.
        url: String,
    },
    /// Random photo, re-rolled every refresh.
    RandomImage,
    /// Random quote pool.
    Quote,
}

impl AppSpec {
    /// Interpret a playlist entry's app fields.
    pub fn from_entry(app_type: &str, app_config: Option<&Value>) -> ZonecastResult<Self> {
        let field = |name: &str| {
            app_config
                .and_then(|c| c.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        };
        match app_type {
            "weather" => {
                let latlon = field("latlon").ok_or_else(|| {
                    ZonecastError::validation("weather app requires 'latlon'")
                })?;
                let (lat, lon) = parse_latlon(latlon)?;
                Ok(Self::Weather { lat, lon })
            }
            "rss" => {
                let url = field("url")
                    .ok_or_else(|| ZonecastError::validation("rss app requires 'url'"))?;
                Ok(Self::Rss {
                    url: url.to_string(),
                })
            }
            "random_image" => Ok(Self::RandomImage),
            "quote" => Ok(Self::Quote),
            other => Err(ZonecastError::validation(format!(
                "unsupported app type '{other}'"
            ))),
        }
    }

    /// Refresh interval in milliseconds.
    pub fn ttl_ms(&self) -> u64 {
        match self {
            Self::Weather { .. } => 60_000,
            Self::Rss { .. } => 120_000,
            Self::RandomImage | Self::Quote => 30_000,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/apps.rs"]
mod tests;
