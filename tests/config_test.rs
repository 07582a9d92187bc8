//! Tests for config loading from files and the environment

use iroiro::config::{Config, PublishMode};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;

const ENV_KEYS: &[&str] = &[
    "IROIRO_DATA_DIR",
    "IROIRO_PROBE_TIMEOUT_MS",
    "IROIRO_EXEMPT_HOSTS",
    "IROIRO_MAX_ATTEMPTS",
    "IROIRO_PUBLISH_MODE",
    "IROIRO_WEBHOOK_URL",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_env() {
    clear_env();
    let config = Config::from_env().unwrap();

    assert_eq!(config.data.data_dir, PathBuf::from("."));
    assert_eq!(config.probe.timeout_ms, 8000);
    assert_eq!(config.selection.max_attempts, 10);
    assert_eq!(config.selection.max_failure_count, 5);
    assert_eq!(config.probe.out_of_band_schemes, vec!["nostr"]);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("IROIRO_DATA_DIR", "/var/lib/iroiro");
    std::env::set_var("IROIRO_PROBE_TIMEOUT_MS", "2500");
    std::env::set_var("IROIRO_EXEMPT_HOSTS", "x.com, example.org ,");
    std::env::set_var("IROIRO_PUBLISH_MODE", "webhook");
    std::env::set_var("IROIRO_WEBHOOK_URL", "https://hooks.example.com/notes");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.data.data_dir, PathBuf::from("/var/lib/iroiro"));
    assert_eq!(config.probe.timeout_ms, 2500);
    assert_eq!(config.probe.exempt_hosts, vec!["x.com", "example.org"]);
    assert_eq!(config.publish.mode, PublishMode::Webhook);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_invalid_env_value() {
    clear_env();
    std::env::set_var("IROIRO_MAX_ATTEMPTS", "many");

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_webhook_mode_requires_url() {
    clear_env();
    std::env::set_var("IROIRO_PUBLISH_MODE", "webhook");

    let config = Config::from_env().unwrap();
    clear_env();

    assert!(config.validate().is_err());
}

#[test]
fn test_config_file_partial_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[data]
data_dir = "/srv/bookmarks"

[selection]
max_attempts = 3

[publish]
mode = "none"
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.data.data_dir, PathBuf::from("/srv/bookmarks"));
    assert_eq!(config.data.sites_file, "iroiro.json");
    assert_eq!(config.selection.max_attempts, 3);
    assert_eq!(config.selection.max_failure_count, 5);
    assert_eq!(config.publish.mode, PublishMode::None);
    assert_eq!(config.probe.timeout_ms, 8000);
}

#[test]
fn test_config_file_rejects_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[selection\nmax_attempts = ").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}
