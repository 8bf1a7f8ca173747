use serde::Deserialize;

use crate::foundation::error::{ZonecastError, ZonecastResult};
use crate::widgets::FontSize;

/// City used when a configured city is not in [`CITY_COORDINATES`].
pub const DEFAULT_CITY: &str = "São Paulo";

/// Built-in coordinates for named-city lookups, `(name, latitude, longitude)`.
pub const CITY_COORDINATES: &[(&str, f64, f64)] = &[
    ("São Paulo", -23.5505, -46.6333),
    ("Rio de Janeiro", -22.9068, -43.1729),
    ("Brasília", -15.7975, -47.8919),
    ("Salvador", -12.9714, -38.5014),
    ("Belo Horizonte", -19.9191, -43.9386),
    ("Recife", -8.0476, -34.877),
    ("Manaus", -3.1226, -60.0021),
    ("Curitiba", -25.4284, -49.2733),
    ("Fortaleza", -3.7319, -38.5267),
    ("Goiânia", -15.8267, -48.9385),
];

const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

/// Weather overlay configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConfig {
    /// City name shown in the widget and used for lookup when no coordinates are set.
    #[serde(default = "default_city")]
    pub city: String,
    /// Optional explicit latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Optional explicit longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Show relative humidity.
    #[serde(default = "default_true")]
    pub show_humidity: bool,
    /// Show wind speed.
    #[serde(default = "default_true")]
    pub show_wind: bool,
    /// Text size.
    #[serde(default)]
    pub font_size: FontSize,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            latitude: None,
            longitude: None,
            show_humidity: true,
            show_wind: true,
            font_size: FontSize::Medium,
        }
    }
}

impl WeatherConfig {
    /// Resolve the coordinates to query.
    ///
    /// Explicit coordinates win when both are present; otherwise the city table is consulted.
    pub fn coordinates(&self) -> (f64, f64) {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => city_coordinates(&self.city),
        }
    }

    /// Forecast URL for this configuration.
    pub fn forecast_url(&self) -> String {
        let (lat, lon) = self.coordinates();
        forecast_url(lat, lon)
    }
}

/// Look up a city by name, falling back to [`DEFAULT_CITY`].
pub fn city_coordinates(city: &str) -> (f64, f64) {
    let hit = CITY_COORDINATES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(city.trim()))
        .or_else(|| CITY_COORDINATES.first());
    hit.map(|&(_, lat, lon)| (lat, lon))
        .unwrap_or((-23.5505, -46.6333))
}

/// Current-conditions URL with temperature, humidity, weather code and wind.
pub fn forecast_url(lat: f64, lon: f64) -> String {
    format!(
        "{FORECAST_ENDPOINT}?latitude={lat}&longitude={lon}&current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m&timezone=auto"
    )
}

/// Legacy current-weather URL used by the weather app (`latlon` configs).
pub fn current_weather_url(lat: f64, lon: f64) -> String {
    format!(
        "{FORECAST_ENDPOINT}?latitude={lat}&longitude={lon}&current_weather=true&temperature_unit=celsius"
    )
}

/// Parse a `"lat,lon"` pair.
pub fn parse_latlon(s: &str) -> ZonecastResult<(f64, f64)> {
    let mut parts = s.split(',').map(str::trim);
    let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ZonecastError::validation(format!(
            "expected 'latitude,longitude', got '{s}'"
        )));
    };
    let lat: f64 = lat
        .parse()
        .map_err(|_| ZonecastError::validation(format!("invalid latitude '{lat}'")))?;
    let lon: f64 = lon
        .parse()
        .map_err(|_| ZonecastError::validation(format!("invalid longitude '{lon}'")))?;
    Ok((lat, lon))
}

/// Coarse icon class derived from a WMO weather code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherIcon {
    /// Clear or mostly clear.
    Clear,
    /// Clouds or fog.
    Cloudy,
    /// Precipitation or storms.
    Rain,
}

impl WeatherIcon {
    fn from_code(code: u32) -> Self {
        if code < 3 {
            Self::Clear
        } else if code < 50 {
            Self::Cloudy
        } else {
            Self::Rain
        }
    }
}

/// Human description of a WMO weather code.
pub fn describe_weather_code(code: u32) -> &'static str {
    match code {
        0 => "Sunny",
        1 | 3 => "Cloudy",
        2 => "Partly cloudy",
        45 => "Fog",
        48 => "Freezing fog",
        51 | 80 => "Light rain",
        53 | 63 => "Moderate rain",
        55 | 65 | 82 => "Heavy rain",
        61 | 81 => "Rain",
        71 | 85 => "Light snow",
        73 => "Snow",
        75 => "Heavy snow",
        77 => "Hail",
        86 => "Moderate snow",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Severe thunderstorm with hail",
        _ => "Cloudy",
    }
}

/// Current conditions as shown by weather widgets.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct WeatherReport {
    /// Label shown above the reading.
    pub city: String,
    /// Temperature rounded to whole degrees Celsius.
    pub temperature_c: i32,
    /// Condition text.
    pub description: String,
    /// Relative humidity in percent, when reported.
    pub humidity_pct: Option<u32>,
    /// Wind speed in km/h, when reported.
    pub wind_kmh: Option<i32>,
    /// Icon class.
    pub icon: WeatherIcon,
}

impl WeatherReport {
    /// Text lines for the overlay, honoring the humidity and wind toggles.
    pub fn lines(&self, cfg: &WeatherConfig) -> Vec<String> {
        let mut out = vec![
            self.city.clone(),
            format!("{}°C", self.temperature_c),
            self.description.clone(),
        ];
        if cfg.show_humidity
            && let Some(h) = self.humidity_pct
        {
            out.push(format!("Humidity {h}%"));
        }
        if cfg.show_wind
            && let Some(w) = self.wind_kmh
        {
            out.push(format!("Wind {w} km/h"));
        }
        out
    }
}

/// A report resolved against a widget's display settings.
///
/// Readings switched off in the [`WeatherConfig`] are cleared from `report` and left out of
/// `lines`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct WeatherOverlay {
    /// The reading, with hidden fields cleared.
    pub report: WeatherReport,
    /// Text lines to draw, top to bottom.
    pub lines: Vec<String>,
    /// Nominal font size in pixels.
    pub font_px: u32,
}

impl WeatherOverlay {
    /// Apply `cfg` to `report`.
    pub fn new(report: &WeatherReport, cfg: &WeatherConfig) -> Self {
        let mut shown = report.clone();
        if !cfg.show_humidity {
            shown.humidity_pct = None;
        }
        if !cfg.show_wind {
            shown.wind_kmh = None;
        }
        Self {
            lines: report.lines(cfg),
            report: shown,
            font_px: cfg.font_size.px(),
        }
    }
}

#[derive(Deserialize)]
struct ForecastBody {
    current: CurrentBlock,
}

#[derive(Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default)]
    weather_code: Option<u32>,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
}

#[derive(Deserialize)]
struct LegacyBody {
    current_weather: LegacyCurrent,
}

#[derive(Deserialize)]
struct LegacyCurrent {
    temperature: f64,
    #[serde(default)]
    windspeed: Option<f64>,
    #[serde(default)]
    weathercode: Option<u32>,
}

/// Parse a `current=` forecast response into a report labelled with `city`.
pub fn parse_forecast(body: &str, city: &str) -> ZonecastResult<WeatherReport> {
    let parsed: ForecastBody = serde_json::from_str(body)
        .map_err(|e| ZonecastError::parse(format!("weather response: {e}")))?;
    let c = parsed.current;
    let code = c.weather_code.unwrap_or(3);
    Ok(WeatherReport {
        city: city.to_string(),
        temperature_c: c.temperature_2m.round() as i32,
        description: describe_weather_code(code).to_string(),
        humidity_pct: c.relative_humidity_2m.map(|h| h.round().max(0.0) as u32),
        wind_kmh: c.wind_speed_10m.map(|w| w.round() as i32),
        icon: WeatherIcon::from_code(code),
    })
}

/// Parse a `current_weather=true` response into a report labelled with `label`.
pub fn parse_current_weather(body: &str, label: &str) -> ZonecastResult<WeatherReport> {
    let parsed: LegacyBody = serde_json::from_str(body)
        .map_err(|e| ZonecastError::parse(format!("weather response: {e}")))?;
    let c = parsed.current_weather;
    let code = c.weathercode.unwrap_or(3);
    Ok(WeatherReport {
        city: label.to_string(),
        temperature_c: c.temperature.round() as i32,
        description: describe_weather_code(code).to_string(),
        humidity_pct: None,
        wind_kmh: c.windspeed.map(|w| w.round() as i32),
        icon: WeatherIcon::from_code(code),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/widgets/weather.rs"]
mod tests;
