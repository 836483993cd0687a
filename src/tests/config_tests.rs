use crate::config::{OutputFormat, Settings, DEFAULT_TIMEOUT_MS};
use crate::connectivity::{PublicIpMethod, DEFAULT_HTTP_ENDPOINT, DEFAULT_STUN_SERVER};
use crate::Error;
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_settings_default() {
    let settings = Settings::default();
    assert_eq!(settings.method, PublicIpMethod::Stun);
    assert_eq!(settings.stun_server, DEFAULT_STUN_SERVER);
    assert_eq!(settings.http_endpoint, DEFAULT_HTTP_ENDPOINT);
    assert_eq!(settings.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert_eq!(settings.timeout(), Duration::from_secs(5));
    assert_eq!(settings.output, OutputFormat::Plain);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_settings_load_nonexistent_file() {
    let settings = Settings::load("/nonexistent/path/cgnat-check.json").unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_settings_load_empty_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let settings = Settings::load(temp_file.path()).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_settings_load_partial_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, r#"{{"method": "http", "timeout_ms": 1500}}"#).unwrap();

    let settings = Settings::load(temp_file.path()).unwrap();
    assert_eq!(settings.method, PublicIpMethod::Http);
    assert_eq!(settings.timeout(), Duration::from_millis(1500));
    assert_eq!(settings.stun_server, DEFAULT_STUN_SERVER);
    assert_eq!(settings.endpoint(), DEFAULT_HTTP_ENDPOINT);
}

#[test]
fn test_settings_load_invalid_json() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{{ not json").unwrap();

    assert!(matches!(
        Settings::load(temp_file.path()),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_settings_load_unknown_method() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, r#"{{"method": "carrier-pigeon"}}"#).unwrap();

    assert!(matches!(
        Settings::load(temp_file.path()),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_settings_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("cgnat-check.json");

    let settings = Settings {
        method: PublicIpMethod::Http,
        stun_server: "stun.example.net:3478".to_string(),
        http_endpoint: "https://ip.example.net".to_string(),
        timeout_ms: 2500,
        output: OutputFormat::Json,
    };
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_settings_validation() {
    let mut settings = Settings::default();
    settings.timeout_ms = 0;
    assert!(settings.validate().is_err());

    let mut settings = Settings::default();
    settings.stun_server = "stun.l.google.com".to_string();
    assert!(settings.validate().is_err());

    let mut settings = Settings::default();
    settings.stun_server = ":19302".to_string();
    assert!(settings.validate().is_err());

    let mut settings = Settings::default();
    settings.stun_server = "[2001:db8::1]:3478".to_string();
    assert!(settings.validate().is_ok());

    let mut settings = Settings::default();
    settings.http_endpoint = "ftp://example.net".to_string();
    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_load_rejects_invalid_values() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, r#"{{"timeout_ms": 0}}"#).unwrap();

    assert!(matches!(
        Settings::load(temp_file.path()),
        Err(Error::Config(_))
    ));
}
