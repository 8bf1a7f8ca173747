use chrono::{DateTime, Utc};

use crate::widgets::FontSize;

/// 12- or 24-hour display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HourFormat {
    /// `03:04 PM`
    #[serde(rename = "12h")]
    H12,
    /// `15:04`
    #[default]
    #[serde(rename = "24h")]
    H24,
}

/// Clock overlay configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockConfig {
    /// Hour format.
    #[serde(default)]
    pub format: HourFormat,
    /// Append seconds.
    #[serde(default)]
    pub show_seconds: bool,
    /// Text size.
    #[serde(default = "large")]
    pub font_size: FontSize,
    /// IANA zone name; the host zone is used when absent or unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn large() -> FontSize {
    FontSize::Large
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            format: HourFormat::H24,
            show_seconds: false,
            font_size: FontSize::Large,
            timezone: None,
        }
    }
}

impl ClockConfig {
    fn pattern(&self) -> &'static str {
        match (self.format, self.show_seconds) {
            (HourFormat::H24, false) => "%H:%M",
            (HourFormat::H24, true) => "%H:%M:%S",
            (HourFormat::H12, false) => "%I:%M %p",
            (HourFormat::H12, true) => "%I:%M:%S %p",
        }
    }
}

/// Format `now` for display.
pub fn format_time(cfg: &ClockConfig, now: DateTime<Utc>) -> String {
    let pattern = cfg.pattern();
    match cfg.timezone.as_deref().map(str::parse::<chrono_tz::Tz>) {
        Some(Ok(tz)) => now.with_timezone(&tz).format(pattern).to_string(),
        Some(Err(_)) => {
            tracing::warn!(timezone = ?cfg.timezone, "unknown timezone, using host zone");
            now.with_timezone(&chrono::Local).format(pattern).to_string()
        }
        None => now.with_timezone(&chrono::Local).format(pattern).to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/clock.rs"]
mod tests;
