use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ZonecastError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ZonecastError::not_found("x").to_string().contains("not found:"));
    assert!(ZonecastError::fetch("x").to_string().contains("fetch error:"));
    assert!(ZonecastError::parse("x").to_string().contains("parse error:"));
    assert!(
        ZonecastError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ZonecastError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_class() {
    let err: ZonecastError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, ZonecastError::Serde(_)));
    assert!(!err.is_not_found());
    assert!(ZonecastError::not_found("screen").is_not_found());
}
