use super::*;

#[test]
fn unknown_city_falls_back_to_default() {
    let sp = city_coordinates(DEFAULT_CITY);
    assert_eq!(city_coordinates("Atlantis"), sp);
    assert_eq!(city_coordinates("recife"), (-8.0476, -34.877));
}

#[test]
fn explicit_coordinates_win_over_city() {
    let cfg = WeatherConfig {
        latitude: Some(1.5),
        longitude: Some(-2.5),
        ..WeatherConfig::default()
    };
    assert_eq!(cfg.coordinates(), (1.5, -2.5));
    assert!(cfg.forecast_url().contains("latitude=1.5&longitude=-2.5"));

    let half = WeatherConfig {
        latitude: Some(1.5),
        ..WeatherConfig::default()
    };
    assert_eq!(half.coordinates(), city_coordinates(DEFAULT_CITY));
}

#[test]
fn config_defaults_apply_to_partial_json() {
    let cfg: WeatherConfig = serde_json::from_str(r#"{"showWind": false}"#).unwrap();
    assert_eq!(cfg.city, DEFAULT_CITY);
    assert!(cfg.show_humidity);
    assert!(!cfg.show_wind);
    assert_eq!(cfg.font_size, FontSize::Medium);
}

#[test]
fn latlon_parsing() {
    assert_eq!(parse_latlon("-23.5, -46.6").unwrap(), (-23.5, -46.6));
    assert!(parse_latlon("-23.5").is_err());
    assert!(parse_latlon("a,b").is_err());
    assert!(parse_latlon("1,2,3").is_err());
}

#[test]
fn forecast_body_parses_into_report() {
    let body = r#"{"current":{"temperature_2m":21.6,"relative_humidity_2m":64,"weather_code":61,"wind_speed_10m":12.4}}"#;
    let r = parse_forecast(body, "Recife").unwrap();
    assert_eq!(r.city, "Recife");
    assert_eq!(r.temperature_c, 22);
    assert_eq!(r.description, "Rain");
    assert_eq!(r.humidity_pct, Some(64));
    assert_eq!(r.wind_kmh, Some(12));
    assert_eq!(r.icon, WeatherIcon::Rain);
}

#[test]
fn legacy_current_weather_parses() {
    let body = r#"{"current_weather":{"temperature":18.2,"windspeed":7.0,"weathercode":0}}"#;
    let r = parse_current_weather(body, "-23.5,-46.6").unwrap();
    assert_eq!(r.temperature_c, 18);
    assert_eq!(r.description, "Sunny");
    assert_eq!(r.icon, WeatherIcon::Clear);
    assert_eq!(r.humidity_pct, None);
}

#[test]
fn malformed_body_is_parse_error() {
    let err = parse_forecast("{}", "x").unwrap_err();
    assert!(matches!(err, ZonecastError::Parse(_)));
}

#[test]
fn lines_respect_toggles() {
    let r = WeatherReport {
        city: "Recife".into(),
        temperature_c: 30,
        description: "Sunny".into(),
        humidity_pct: Some(70),
        wind_kmh: Some(5),
        icon: WeatherIcon::Clear,
    };
    let all = r.lines(&WeatherConfig::default());
    assert_eq!(all.len(), 5);
    let cfg = WeatherConfig {
        show_humidity: false,
        show_wind: false,
        ..WeatherConfig::default()
    };
    assert_eq!(r.lines(&cfg), vec!["Recife", "30°C", "Sunny"]);
}
