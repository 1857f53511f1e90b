use std::fs;

use tempfile::TempDir;
use tether_core::config::{dirs_path, GlobalConfig};

#[test]
fn test_default_config_has_no_environments() {
    let config = GlobalConfig::default();
    assert!(config.resolver.execution_environments.is_empty());
}

#[test]
fn test_default_platform_is_host() {
    let config = GlobalConfig::default();
    assert_eq!(config.resolver.platform.os, std::env::consts::OS);
    assert_eq!(config.resolver.platform.arch, std::env::consts::ARCH);
}

#[test]
fn test_rotation_defaults_true_from_empty_toml() {
    let config = GlobalConfig::from_str("").unwrap();
    assert!(config.resolver.search.rotation);
    assert_eq!(config.resolver.search.attempt_limit(), None);
}

#[test]
fn test_zero_max_attempts_means_unbounded() {
    let config = GlobalConfig::from_str(
        r#"
[resolver.search]
max-attempts = 0
"#,
    )
    .unwrap();
    assert_eq!(config.resolver.search.attempt_limit(), None);
}

#[test]
fn test_dirs_path_contains_tether() {
    assert!(dirs_path().ends_with(".tether"));
}

#[test]
fn test_parse_full_config() {
    let toml = r#"
[resolver]
execution-environments = ["JavaSE-17", "JavaSE-11"]

[resolver.platform]
os = "linux"
arch = "aarch64"

[resolver.search]
rotation = false
max-attempts = 500
"#;
    let config = GlobalConfig::from_str(toml).unwrap();
    assert_eq!(
        config.resolver.execution_environments,
        vec!["JavaSE-17".to_string(), "JavaSE-11".to_string()]
    );
    assert_eq!(config.resolver.platform.os, "linux");
    assert_eq!(config.resolver.platform.arch, "aarch64");
    assert!(!config.resolver.search.rotation);
    assert_eq!(config.resolver.search.attempt_limit(), Some(500));
}

#[test]
fn test_invalid_config_is_reported() {
    let err = GlobalConfig::from_str("[resolver]\nexecution-environments = 3\n").unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"), "got: {err}");
}

#[test]
fn test_from_path_reads_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[resolver.platform]\nos = \"windows\"\n").unwrap();
    let config = GlobalConfig::from_path(&path).unwrap();
    assert_eq!(config.resolver.platform.os, "windows");
}

#[test]
fn test_from_path_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let err = GlobalConfig::from_path(&tmp.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read"), "got: {err}");
}
