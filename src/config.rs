use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::content::fetch::DEFAULT_USER_AGENT;
use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::session::player::{HEARTBEAT_MS, POLL_MS, PlayerTiming};

/// Environment variable overriding [`PlayerConfig::proxy_base`].
pub const ENV_PROXY_BASE: &str = "ZONECAST_PROXY_BASE";
/// Environment variable overriding [`PlayerConfig::log_level`].
pub const ENV_LOG: &str = "ZONECAST_LOG";

/// Player settings, read from TOML.
///
/// Every field is optional in the file; missing ones take the [`Default`] value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Relay that feed requests go through (`{proxy_base}?url=...`).
    pub proxy_base: Option<String>,
    /// Timeout for each content request.
    pub http_timeout_ms: u64,
    /// Longest sleep between scheduler passes.
    pub tick_ms: u64,
    /// Interval between `last_seen` updates.
    pub heartbeat_secs: u64,
    /// Interval between checks for changed content.
    pub poll_secs: u64,
    /// `User-Agent` sent with content requests.
    pub user_agent: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// JSON store the player reads from.
    pub store_path: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            proxy_base: None,
            http_timeout_ms: 10_000,
            tick_ms: 250,
            heartbeat_secs: HEARTBEAT_MS / 1000,
            poll_secs: POLL_MS / 1000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: "info".to_string(),
            store_path: None,
        }
    }
}

impl PlayerConfig {
    /// Parse TOML text.
    pub fn from_toml(s: &str) -> ZonecastResult<Self> {
        toml::from_str(s).map_err(|e| ZonecastError::parse(format!("player config: {e}")))
    }

    /// Load `path` when given (defaults otherwise), then apply `ZONECAST_*` overrides.
    pub fn load(path: Option<&Path>) -> ZonecastResult<Self> {
        let mut config = match path {
            Some(p) => {
                let s = std::fs::read_to_string(p)
                    .with_context(|| format!("read config '{}'", p.display()))?;
                Self::from_toml(&s)?
            }
            None => Self::default(),
        };
        config.apply_env(|k| std::env::var(k).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup(ENV_PROXY_BASE).filter(|s| !s.is_empty()) {
            self.proxy_base = Some(base);
        }
        if let Some(level) = lookup(ENV_LOG).filter(|s| !s.is_empty()) {
            self.log_level = level;
        }
    }

    /// Reject values the player cannot run with.
    pub fn validate(&self) -> ZonecastResult<()> {
        self.proxy_url()?;
        if self.tick_ms == 0 {
            return Err(ZonecastError::validation("tick_ms must be > 0"));
        }
        if self.heartbeat_secs == 0 || self.poll_secs == 0 {
            return Err(ZonecastError::validation(
                "heartbeat_secs and poll_secs must be > 0",
            ));
        }
        Ok(())
    }

    /// The proxy base as a parsed URL.
    pub fn proxy_url(&self) -> ZonecastResult<Option<url::Url>> {
        self.proxy_base
            .as_deref()
            .map(|s| {
                url::Url::parse(s)
                    .map_err(|e| ZonecastError::validation(format!("proxy_base '{s}': {e}")))
            })
            .transpose()
    }

    /// Request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Scheduler tick.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Heartbeat and poll cadence.
    pub fn timing(&self) -> PlayerTiming {
        PlayerTiming {
            heartbeat_ms: self.heartbeat_secs.saturating_mul(1000),
            poll_ms: self.poll_secs.saturating_mul(1000),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
