// Config loading and validation tests

use hostpulse::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8003
host = "0.0.0.0"

[sampling]
interval_ms = 2000
collect_timeout_ms = 1500
stats_log_interval_secs = 60

[services]
mariadb = "MariaDB"
nginx = "Nginx"
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 8003
host = "127.0.0.1"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8003);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.sampling.interval_ms, 2000);
    assert_eq!(config.sampling.collect_timeout_ms, 1500);
    assert_eq!(config.services.len(), 2);
    assert_eq!(config.services.get("mariadb").map(String::as_str), Some("MariaDB"));
}

#[test]
fn test_config_sampling_defaults_when_omitted() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("valid");
    assert_eq!(config.sampling.interval_ms, 2000);
    assert_eq!(config.sampling.collect_timeout_ms, 1500);
    assert_eq!(config.sampling.stats_log_interval_secs, 60);
    assert!(config.services.is_empty());
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8003", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_host() {
    let bad = VALID_CONFIG.replace("host = \"0.0.0.0\"", "host = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.host"));
}

#[test]
fn test_config_validation_rejects_interval_zero() {
    let bad = VALID_CONFIG
        .replace("interval_ms = 2000", "interval_ms = 0")
        .replace("collect_timeout_ms = 1500", "collect_timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sampling.interval_ms"));
}

#[test]
fn test_config_validation_rejects_timeout_longer_than_interval() {
    let bad = VALID_CONFIG.replace("collect_timeout_ms = 1500", "collect_timeout_ms = 2500");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("must not exceed sampling.interval_ms"));
}

#[test]
fn test_config_validation_rejects_stats_log_interval_zero() {
    let bad = VALID_CONFIG.replace(
        "stats_log_interval_secs = 60",
        "stats_log_interval_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}

#[test]
fn test_config_validation_rejects_empty_service_name() {
    let bad = VALID_CONFIG.replace("nginx = \"Nginx\"", "nginx = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("services"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8003);
    assert_eq!(config.services.len(), 2);
}
