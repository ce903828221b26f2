use std::time::Duration;

use gif_player::config::{PlayerConfig, from_yaml_file};

#[test]
fn empty_document_yields_defaults() {
    let cfg: PlayerConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.min_frame_delay, Duration::from_millis(20));
    assert_eq!(cfg.max_frames, 1000);
    assert!(cfg.auto_play);
    assert_eq!(cfg.tick_interval, Duration::from_millis(15));
    cfg.validate().unwrap();
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
min-frame-delay: 50ms
max-frames: 10
auto-play: false
tick-interval: 5ms
"#;
    let cfg: PlayerConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.min_frame_delay, Duration::from_millis(50));
    assert_eq!(cfg.max_frames, 10);
    assert!(!cfg.auto_play);
    assert_eq!(cfg.tick_interval, Duration::from_millis(5));
    cfg.validate().unwrap();
}

#[test]
fn unknown_keys_are_rejected() {
    let yaml = r#"
max-frames: 10
frame-budget: 99
"#;
    assert!(serde_yaml::from_str::<PlayerConfig>(yaml).is_err());
}

#[test]
fn validate_rejects_zero_durations_and_limits() {
    let cfg: PlayerConfig = serde_yaml::from_str("min-frame-delay: 0s").unwrap();
    assert!(cfg.validate().is_err());

    let cfg: PlayerConfig = serde_yaml::from_str("max-frames: 0").unwrap();
    assert!(cfg.validate().is_err());

    let cfg: PlayerConfig = serde_yaml::from_str("tick-interval: 0s").unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn loads_from_a_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("player.yaml");
    std::fs::write(&path, "max-frames: 42\n").unwrap();

    let cfg = from_yaml_file(&path).unwrap();
    assert_eq!(cfg.max_frames, 42);

    assert!(from_yaml_file(&dir.path().join("missing.yaml")).is_err());
}
