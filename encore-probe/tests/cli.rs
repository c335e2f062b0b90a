use assert_cmd::Command;

fn probe() -> Command {
    let mut cmd = Command::cargo_bin("encore-probe").unwrap();
    cmd.env_remove("ENCORE_CONFIG_PATH")
        .env_remove("ENCORE_CONFIG_JSON")
        .env_remove("ENCORE_ASSET_BASE_URL")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn registry_json_lists_all_videos() {
    let output = probe().args(["registry", "--json"]).output().unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value =
        serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ["hero", "guitar", "vinyl1", "vinyl2", "drumcym"]);
}

#[test]
fn asset_root_override_rebases_urls() {
    let output = probe()
        .args(["registry", "--json", "--asset-base-url", "/vids"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value =
        serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[1]["url"], "/vids/guitar-optimized.mp4");
}

#[test]
fn invalid_config_is_rejected_before_any_fetch() {
    let output = probe()
        .args(["critical"])
        .env("ENCORE_CONFIG_JSON", r#"{"preloader":{"critical_timeout_ms":0}}"#)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("critical_timeout_ms"), "{stderr}");
}
