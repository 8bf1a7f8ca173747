use super::*;

#[test]
fn empty_file_yields_defaults() {
    let c = PlayerConfig::from_toml("").unwrap();
    assert_eq!(c, PlayerConfig::default());
    assert_eq!(c.timing().heartbeat_ms, 30_000);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let c = PlayerConfig::from_toml(
        r#"
        proxy_base = "https://relay.test/proxy"
        tick_ms = 100
        "#,
    )
    .unwrap();
    assert_eq!(c.tick(), Duration::from_millis(100));
    assert_eq!(c.http_timeout_ms, 10_000);
    let url = c.proxy_url().unwrap().unwrap();
    assert_eq!(url.host_str(), Some("relay.test"));
}

#[test]
fn environment_overrides_file() {
    let mut c = PlayerConfig::default();
    c.apply_env(|k| match k {
        ENV_PROXY_BASE => Some("https://other.test/p".to_string()),
        ENV_LOG => Some("debug".to_string()),
        _ => None,
    });
    assert_eq!(c.proxy_base.as_deref(), Some("https://other.test/p"));
    assert_eq!(c.log_level, "debug");
}

#[test]
fn invalid_values_are_rejected() {
    assert!(PlayerConfig::from_toml("tick_ms = \"fast\"").is_err());
    let c = PlayerConfig {
        proxy_base: Some("not a url".to_string()),
        ..PlayerConfig::default()
    };
    assert!(c.validate().is_err());
    let c = PlayerConfig {
        tick_ms: 0,
        ..PlayerConfig::default()
    };
    assert!(c.validate().is_err());
}
