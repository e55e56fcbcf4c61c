//! CLI integration tests for adapterkit.
//!
//! Every test runs in its own temporary directory with `HOME` pointed inside
//! it, so neither global nor project configuration leaks in from the host.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the adapterkit binary command, isolated to `tmp`.
fn adapterkit(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("adapterkit").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path().join("home"))
        .env_remove("ADAPTERKIT_ENV")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("home")).unwrap();
    tmp
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

// ============================================================================
// adapterkit list
// ============================================================================

#[test]
fn test_list_shows_builtin_backends() {
    let tmp = temp_dir();

    adapterkit(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("google_ad_manager (alias: gam)"))
        .stdout(predicate::str::contains("triton_digital (alias: triton)"))
        .stdout(predicate::str::contains("Ad Units & Placements (sync, profiles)"))
        .stdout(predicate::str::contains("strict mode"));
}

#[test]
fn test_list_json() {
    let tmp = temp_dir();

    let stdout = stdout_of(adapterkit(&tmp).args(["list", "--json"]));
    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entries = entries.as_array().unwrap();

    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["backend"], "broadstreet");
    assert_eq!(entries[1]["aliases"], serde_json::json!(["gam"]));
    assert_eq!(entries[3]["capabilities"]["supports_inventory_sync"], false);
}

// ============================================================================
// adapterkit describe
// ============================================================================

#[test]
fn test_describe_document_shape() {
    let tmp = temp_dir();

    let stdout = stdout_of(adapterkit(&tmp).args(["describe", "mock"]));
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["capabilities", "connection", "inventory", "product"]);

    let api_key = &doc["connection"]["properties"]["api_key"];
    assert_eq!(api_key["x-ui"]["secret"], true);
    assert_eq!(api_key["x-ui"]["ui_order"], 1);
    assert!(doc["connection"]["required"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("api_key")));
}

#[test]
fn test_describe_is_deterministic() {
    let tmp = temp_dir();

    let first = stdout_of(adapterkit(&tmp).args(["describe", "gam"]));
    let second = stdout_of(adapterkit(&tmp).args(["describe", "google_ad_manager"]));
    assert_eq!(first, second);

    let fingerprint = stdout_of(adapterkit(&tmp).args(["describe", "gam", "--fingerprint"]));
    let fingerprint = fingerprint.trim();
    assert_eq!(fingerprint.len(), 64);
    assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_describe_unknown_backend() {
    let tmp = temp_dir();

    adapterkit(&tmp)
        .args(["describe", "dfp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown backend `dfp`"))
        .stderr(predicate::str::contains("adapterkit list"));
}

// ============================================================================
// adapterkit validate
// ============================================================================

#[test]
fn test_validate_valid_payload() {
    let tmp = temp_dir();
    let file = write_file(tmp.path(), "mock.json", r#"{"api_key": "k", "latency_ms": "25"}"#);

    adapterkit(&tmp)
        .args(["validate", "mock"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("mock.json: ok"));
}

#[test]
fn test_validate_reports_every_problem() {
    let tmp = temp_dir();
    let file = write_file(
        tmp.path(),
        "mock.json",
        r#"{"scenario": "meltdown", "extra": 1, "other": true}"#,
    );

    adapterkit(&tmp)
        .args(["validate", "mock"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_key: required field is missing"))
        .stderr(predicate::str::contains("scenario: value 'meltdown' is not one of"))
        .stderr(predicate::str::contains("extra: unknown field"))
        .stderr(predicate::str::contains("other: unknown field"))
        .stderr(predicate::str::contains("1 of 1 file(s) failed validation"));
}

#[test]
fn test_validate_lenient_drops_unknown_fields() {
    let tmp = temp_dir();
    let file = write_file(tmp.path(), "mock.json", r#"{"api_key": "k", "extra": 1}"#);

    adapterkit(&tmp)
        .args(["validate", "mock", "--lenient"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring unknown field `extra`"))
        .stderr(predicate::str::contains("help: Pass `--strict`"));
}

#[test]
fn test_validate_production_environment_is_lenient() {
    let tmp = temp_dir();
    let file = write_file(tmp.path(), "mock.json", r#"{"api_key": "k", "extra": 1}"#);

    adapterkit(&tmp)
        .args(["validate", "mock"])
        .arg(&file)
        .env("ADAPTERKIT_ENV", "production")
        .assert()
        .success();
}

#[test]
fn test_validate_project_config_overrides_environment() {
    let tmp = temp_dir();
    fs::create_dir_all(tmp.path().join(".adapterkit")).unwrap();
    write_file(
        &tmp.path().join(".adapterkit"),
        "config.toml",
        "[validation]\nmode = \"strict\"\n",
    );
    let file = write_file(tmp.path(), "mock.json", r#"{"api_key": "k", "extra": 1}"#);

    adapterkit(&tmp)
        .args(["validate", "mock"])
        .arg(&file)
        .env("ADAPTERKIT_ENV", "production")
        .assert()
        .failure()
        .stderr(predicate::str::contains("extra: unknown field"));
}

#[test]
fn test_validate_multiple_files() {
    let tmp = temp_dir();
    let good = write_file(
        tmp.path(),
        "good.json",
        r#"{"zone_targeting": [{"zone_id": "z-1", "sizes": [{"width": 300, "height": 250}]}]}"#,
    );
    let bad = write_file(
        tmp.path(),
        "bad.json",
        r#"{"zone_targeting": [{"sizes": [{"width": 0, "height": 90}]}]}"#,
    );
    let broken = write_file(tmp.path(), "broken.json", "{not json");

    adapterkit(&tmp)
        .args(["validate", "broadstreet", "--kind", "product"])
        .arg(&good)
        .arg(&bad)
        .arg(&broken)
        .assert()
        .failure()
        .stdout(predicate::str::contains("good.json: ok"))
        .stderr(predicate::str::contains("zone_targeting[0].zone_id"))
        .stderr(predicate::str::contains("zone_targeting[0].sizes[0].width"))
        .stderr(predicate::str::contains("failed to parse"))
        .stderr(predicate::str::contains("| key must be a string"))
        .stderr(predicate::str::contains("help: Payload files must hold a single JSON document"))
        .stderr(predicate::str::contains("2 of 3 file(s) failed validation"));
}

#[test]
fn test_validate_show_redacts_secrets() {
    let tmp = temp_dir();
    let file = write_file(
        tmp.path(),
        "kevel.json",
        r#"{"network_id": "123", "api_key": "super-secret"}"#,
    );

    adapterkit(&tmp)
        .args(["validate", "kevel", "--show"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("super-secret").not());
}

#[test]
fn test_validate_rejects_bad_kind() {
    let tmp = temp_dir();
    let file = write_file(tmp.path(), "mock.json", "{}");

    adapterkit(&tmp)
        .args(["validate", "mock", "--kind", "creative"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid schema kind 'creative'"));
}

// ============================================================================
// adapterkit simulate
// ============================================================================

#[test]
fn test_simulate_gam_inventory_sync() {
    let tmp = temp_dir();
    let config = write_file(tmp.path(), "gam.json", r#"{"network_code": "12345"}"#);

    let stdout = stdout_of(
        adapterkit(&tmp)
            .args(["simulate", "gam", "sync_inventory", "--config"])
            .arg(&config),
    );
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(outcome["execution"]["mode"], "simulated");
    assert_eq!(outcome["execution"]["action"]["backend"], "google_ad_manager");
    assert_eq!(outcome["execution"]["action"]["principal"], "cli");
    assert_eq!(outcome["value"]["entity_label"], "Ad Units & Placements");
    assert_eq!(outcome["value"]["synced"], 0);
}

#[test]
fn test_simulate_capability_rejected() {
    let tmp = temp_dir();
    let config = write_file(tmp.path(), "mock.json", r#"{"api_key": "k"}"#);

    adapterkit(&tmp)
        .args(["simulate", "mock", "sync_inventory", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("supports_inventory_sync"));
}

#[test]
fn test_simulate_create_line_item() {
    let tmp = temp_dir();
    let config = write_file(tmp.path(), "mock.json", r#"{"api_key": "k"}"#);
    let request = write_file(
        tmp.path(),
        "line_item.json",
        r#"{"order_id": "po-7", "name": "Launch", "pricing_model": "cpm", "rate": 4.0, "budget": 900.0}"#,
    );

    let stdout = stdout_of(
        adapterkit(&tmp)
            .args(["simulate", "mock", "create_line_item", "--config"])
            .arg(&config)
            .arg("--request")
            .arg(&request),
    );
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(outcome["value"]["line_item_id"], "dry-run-po-7");
    assert_eq!(outcome["value"]["status"], "draft");
}

#[test]
fn test_simulate_live_dispatches_to_client() {
    let tmp = temp_dir();
    let config = write_file(tmp.path(), "mock.json", r#"{"api_key": "k"}"#);
    let request = write_file(
        tmp.path(),
        "line_item.json",
        r#"{"order_id": "po-7", "name": "Launch", "pricing_model": "cpm", "rate": 4.0, "budget": 900.0}"#,
    );

    let stdout = stdout_of(
        adapterkit(&tmp)
            .args(["simulate", "mock", "create_line_item", "--live", "--config"])
            .arg(&config)
            .arg("--request")
            .arg(&request),
    );
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(outcome["execution"]["mode"], "executed");
    assert_eq!(outcome["value"]["line_item_id"], "mock-li-000001");
    assert_eq!(outcome["value"]["status"], "active");
}

#[test]
fn test_simulate_configured_dry_run_overrides_live() {
    let tmp = temp_dir();
    fs::create_dir_all(tmp.path().join(".adapterkit")).unwrap();
    write_file(
        &tmp.path().join(".adapterkit"),
        "config.toml",
        "[adapter]\ndry_run = true\n",
    );
    let config = write_file(tmp.path(), "mock.json", r#"{"api_key": "k"}"#);
    let request = write_file(
        tmp.path(),
        "line_item.json",
        r#"{"order_id": "po-7", "name": "Launch", "pricing_model": "cpm", "rate": 4.0, "budget": 900.0}"#,
    );

    let stdout = stdout_of(
        adapterkit(&tmp)
            .args(["simulate", "mock", "create_line_item", "--live", "--config"])
            .arg(&config)
            .arg("--request")
            .arg(&request),
    );
    let outcome: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(outcome["execution"]["mode"], "simulated");
    assert_eq!(outcome["value"]["line_item_id"], "dry-run-po-7");
}

#[test]
fn test_simulate_requires_request_body() {
    let tmp = temp_dir();
    let config = write_file(tmp.path(), "mock.json", r#"{"api_key": "k"}"#);

    adapterkit(&tmp)
        .args(["simulate", "mock", "create_line_item", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a request body"));
}

#[test]
fn test_simulate_invalid_connection() {
    let tmp = temp_dir();
    let config = write_file(tmp.path(), "gam.json", r#"{"network_code": "abc"}"#);

    adapterkit(&tmp)
        .args(["simulate", "gam", "sync_inventory", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("network_code: value does not match pattern"));
}

// ============================================================================
// adapterkit completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    adapterkit(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("adapterkit"));
}
