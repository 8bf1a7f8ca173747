use super::*;

#[test]
fn static_text_has_no_offset() {
    let o = TextOverlay::at(&TextConfig::default(), Millis(12_345));
    assert_eq!(o.offset_pct, 0.0);
    assert_eq!(o.font_px, FontSize::Medium.px());
    assert_eq!(o.alignment, Alignment::Center);
}

#[test]
fn scroll_left_wraps_each_period() {
    let cfg = TextConfig {
        animation: TextAnimation::ScrollLeft,
        animation_speed: 4,
        ..TextConfig::default()
    };
    assert_eq!(TextOverlay::at(&cfg, Millis(0)).offset_pct, 100.0);
    assert_eq!(TextOverlay::at(&cfg, Millis(2_000)).offset_pct, 0.0);
    assert_eq!(TextOverlay::at(&cfg, Millis(3_000)).offset_pct, -50.0);
    assert_eq!(TextOverlay::at(&cfg, Millis(4_000)).offset_pct, 100.0);
}

#[test]
fn zero_speed_does_not_divide_by_zero() {
    let cfg = TextConfig {
        animation: TextAnimation::ScrollLeft,
        animation_speed: 0,
        ..TextConfig::default()
    };
    let o = TextOverlay::at(&cfg, Millis(500));
    assert!(o.offset_pct.is_finite());
}

#[test]
fn hex_colors() {
    assert_eq!(parse_hex_color("#ffffff"), Some([255, 255, 255]));
    assert_eq!(parse_hex_color("#0a0B0c"), Some([10, 11, 12]));
    assert_eq!(parse_hex_color("#f00"), Some([255, 0, 0]));
    assert_eq!(parse_hex_color("red"), None);
    assert_eq!(parse_hex_color("#12345"), None);

    let o = TextOverlay::at(&TextConfig::default(), Millis(0));
    assert_eq!(o.rgb(), Some([255, 255, 255]));
}

#[test]
fn config_parses_kebab_animation() {
    let cfg: TextConfig =
        serde_json::from_str(r#"{"text":"Hi","animation":"scroll-left","alignment":"left"}"#)
            .unwrap();
    assert_eq!(cfg.animation, TextAnimation::ScrollLeft);
    assert_eq!(cfg.alignment, Alignment::Left);
    assert_eq!(cfg.color, "#ffffff");
    assert_eq!(cfg.animation_speed, 10);
}
