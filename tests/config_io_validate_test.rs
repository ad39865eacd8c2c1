use porssisahko::config::Config;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.transfer_fee = 0.0425;
    cfg.poll_interval_seconds = 120;
    cfg.entry_file = tmp_dir.path().join("entry.json").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert!((loaded.transfer_fee - 0.0425).abs() < 1e-12);
    assert_eq!(loaded.poll_interval_seconds, 120);
    assert_eq!(loaded.entry_file, cfg.entry_file);
    assert_eq!(loaded.api.url, cfg.api.url);
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();

    cfg.poll_interval_seconds = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.setup_retry_seconds = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.api.timeout_seconds = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.transfer_fee = f64::NAN;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.entry_file.clear();
    assert!(cfg.validate().is_err());

    // Negative fees are allowed (credits)
    cfg = Config::default();
    cfg.transfer_fee = -0.01;
    assert!(cfg.validate().is_ok());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("Serialization error"));
}

#[test]
fn from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("nope.yaml")).unwrap_err();
    assert!(format!("{err}").starts_with("I/O error"));
}
