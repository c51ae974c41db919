mod common;

use assert_cmd::Command;
use assert_cmd::cargo;
use common::{etcd_catalog, payload};
use predicates::prelude::*;
use std::path::Path;

fn cli(workdir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("catalog-graph"));
    cmd.current_dir(workdir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_packages_lists_names() {
    let (dir, path) = etcd_catalog().finish();

    cli(dir.path())
        .arg("--database")
        .arg(&path)
        .arg("packages")
        .assert()
        .success()
        .stdout(predicate::str::contains("etcd"));
}

#[test]
fn test_head_prints_payload_verbatim() {
    let (dir, path) = etcd_catalog().finish();

    cli(dir.path())
        .arg("--database")
        .arg(&path)
        .args(["head", "etcd", "beta"])
        .assert()
        .success()
        .stdout(predicate::str::contains(payload("etcd.v0.9.2")));
}

#[test]
fn test_provider_json_envelope() {
    let (dir, path) = etcd_catalog().finish();

    let output = cli(dir.path())
        .arg("--database")
        .arg(&path)
        .arg("--json")
        .args(["provider", "etcd.database.coreos.com/v1/EtcdCluster"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["ok"], true);
    assert_eq!(envelope["command"], "provider");
    assert_eq!(envelope["data"]["bundle"], payload("etcd.v1.0.0"));
}

#[test]
fn test_latest_providers_json() {
    let (dir, path) = etcd_catalog().finish();

    let output = cli(dir.path())
        .arg("--database")
        .arg(&path)
        .arg("--json")
        .args(["providers", "--latest", "etcd.database.coreos.com/v1/EtcdCluster"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = envelope["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["bundle_name"], "etcd.v1.0.0");
    assert_eq!(entries[1]["bundle_name"], "etcd.v0.9.2");
}

#[test]
fn test_missing_package_fails() {
    let (dir, path) = etcd_catalog().finish();

    cli(dir.path())
        .arg("--database")
        .arg(&path)
        .args(["package", "prometheus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package prometheus not found"));
}

#[test]
fn test_zero_channel_limit_rejected() {
    let (dir, path) = etcd_catalog().finish();

    cli(dir.path())
        .arg("--database")
        .arg(&path)
        .args(["package", "etcd", "--channel-limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package_channel_limit must be at least 1"));
}

#[test]
fn test_malformed_api_fails() {
    let (dir, path) = etcd_catalog().finish();

    cli(dir.path())
        .arg("--database")
        .arg(&path)
        .args(["provider", "EtcdCluster"])
        .assert()
        .failure();
}

#[test]
fn test_missing_database_fails() {
    let dir = tempfile::tempdir().unwrap();

    cli(dir.path())
        .arg("--database")
        .arg(dir.path().join("absent.db"))
        .arg("packages")
        .assert()
        .failure();
}

#[test]
fn test_init_writes_config_used_by_later_runs() {
    let (dir, path) = etcd_catalog().finish();
    let config = dir.path().join("catalog-graph.toml");

    cli(dir.path())
        .arg("--database")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .arg("init")
        .assert()
        .success();
    assert!(config.exists());

    // refuses to overwrite without --force
    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    // database comes from the config file now
    cli(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["bundle", "etcd.v0.6.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(payload("etcd.v0.6.1")));
}
