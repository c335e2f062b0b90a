use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use encore_config::{ConfigSource, SiteConfig};
use tempfile::TempDir;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn nothing_configured_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let (config, source) =
        SiteConfig::load_with(lookup(&[]), dir.path()).unwrap();
    assert_eq!(source, ConfigSource::Default);
    assert_eq!(config, SiteConfig::default());
}

#[test]
fn path_variable_wins_over_inline_json_and_default_file() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("custom.toml");
    fs::write(&explicit, "[preloader]\nprefetch_count = 3\n").unwrap();
    fs::write(
        dir.path().join("encore.toml"),
        "[preloader]\nprefetch_count = 9\n",
    )
    .unwrap();

    let path = explicit.display().to_string();
    let (config, source) = SiteConfig::load_with(
        lookup(&[
            ("ENCORE_CONFIG_PATH", path.as_str()),
            ("ENCORE_CONFIG_JSON", r#"{"preloader":{"prefetch_count":5}}"#),
        ]),
        dir.path(),
    )
    .unwrap();

    assert_eq!(source, ConfigSource::EnvPath(explicit));
    assert_eq!(config.preloader.prefetch_count, 3);
}

#[test]
fn inline_json_wins_over_default_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("encore.toml"),
        "[preloader]\nprefetch_count = 9\n",
    )
    .unwrap();

    let (config, source) = SiteConfig::load_with(
        lookup(&[
            ("ENCORE_CONFIG_PATH", "  "),
            ("ENCORE_CONFIG_JSON", r#"{"preloader":{"prefetch_count":5}}"#),
        ]),
        dir.path(),
    )
    .unwrap();

    assert_eq!(source, ConfigSource::EnvInline);
    assert_eq!(config.preloader.prefetch_count, 5);
}

#[test]
fn default_file_is_picked_up_from_the_search_root() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("config")).unwrap();
    let file = dir.path().join("config/encore.json");
    fs::write(&file, r#"{"registry":{"asset_base_url":"/vids"}}"#).unwrap();

    let (config, source) =
        SiteConfig::load_with(lookup(&[]), dir.path()).unwrap();

    assert_eq!(source, ConfigSource::File(file));
    assert_eq!(config.registry.asset_base_url.as_deref(), Some("/vids"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing: PathBuf = dir.path().join("absent.toml");
    let path = missing.display().to_string();
    let err = SiteConfig::load_with(
        lookup(&[("ENCORE_CONFIG_PATH", path.as_str())]),
        dir.path(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("failed to read site config"));
}

#[test]
fn bad_inline_json_names_the_variable() {
    let dir = TempDir::new().unwrap();
    let err = SiteConfig::load_with(
        lookup(&[("ENCORE_CONFIG_JSON", "{not json")]),
        dir.path(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("ENCORE_CONFIG_JSON"));
}
