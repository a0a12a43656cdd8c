//! Configuration loading from files and the environment.

use std::io::Write;

use ratedposters::context::{load_config, AppContext};
use rp_core::config::{Config, OMDB_API_KEY_ENV, REDIS_URL_ENV};
use serial_test::serial;

fn clear_env() {
    std::env::remove_var(OMDB_API_KEY_ENV);
    std::env::remove_var(REDIS_URL_ENV);
}

#[test]
#[serial]
fn loads_file_sections() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[omdb]
api_key = "from-file"
timeout_secs = 3

[cache]
ttl_secs = 600

[annotation]
bar_height = 20
"#
    )
    .unwrap();

    let config = load_config(Some(file.path()));
    assert_eq!(config.omdb.api_key.as_deref(), Some("from-file"));
    assert_eq!(config.omdb.timeout_secs, 3);
    assert_eq!(config.cache.ttl_secs, 600);
    assert_eq!(config.cache.schema_version, "v1.0");
    assert_eq!(config.annotation.bar_height, 20);
    assert_eq!(config.annotation.padding, 4);
}

#[test]
#[serial]
fn environment_overrides_file() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[omdb]\napi_key = \"from-file\"").unwrap();

    std::env::set_var(OMDB_API_KEY_ENV, "from-env");
    std::env::set_var(REDIS_URL_ENV, "redis://127.0.0.1:6379");
    let config = load_config(Some(file.path()));
    clear_env();

    assert_eq!(config.omdb.api_key.as_deref(), Some("from-env"));
    assert_eq!(config.cache.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
}

#[test]
#[serial]
fn malformed_file_uses_defaults() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "this is = = not toml").unwrap();

    let config = load_config(Some(file.path()));
    assert!(config.omdb.api_key.is_none());
    assert_eq!(config.cache.ttl_secs, 86_400);
}

#[test]
#[serial]
fn default_config_warns_about_missing_key() {
    clear_env();
    let warnings = Config::default().validate();
    assert!(warnings.iter().any(|w| w.contains("omdb.api_key")));
    assert!(warnings.iter().any(|w| w.contains("redis_url")));
}

#[test]
#[serial]
fn context_builds_from_loaded_config() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ratings.db");
    let config_path = dir.path().join("ratedposters.toml");
    std::fs::write(
        &config_path,
        format!("[database]\npath = {:?}\n", db_path.to_string_lossy()),
    )
    .unwrap();

    let config = load_config(Some(&config_path));
    assert_eq!(config.database.path, db_path);
    AppContext::from_config(&config).unwrap();
    assert!(db_path.exists());
}
