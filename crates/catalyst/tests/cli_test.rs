#![allow(deprecated)] // Command::cargo_bin is deprecated in favour of cargo_bin_cmd! in newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn catalyst() -> Command {
    Command::cargo_bin("catalyst").unwrap()
}

/// Help lists every command
#[test]
fn test_cli_help() {
    catalyst()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Declarative regions and projects"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_cli_version() {
    catalyst()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalyst"));
}

#[test]
fn test_apply_help_shows_yes_flag() {
    catalyst()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_import_rejects_unknown_kind() {
    catalyst()
        .args(["import", "cluster", "c1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_validate_accepts_good_manifest() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("catalyst.kdl");
    fs::write(
        &manifest,
        r#"
region "r1" {
    ingress "https://*.example.com:443"
}

project "p1" {
    region "r1"
    managed_pubsub #true
}

data "organization" "current"
"#,
    )
    .unwrap();

    catalyst()
        .arg("--manifest")
        .arg(&manifest)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manifest is valid"))
        .stdout(predicate::str::contains("Regions: 1"))
        .stdout(predicate::str::contains("Projects: 1"));
}

#[test]
fn test_validate_rejects_bad_ingress() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("catalyst.kdl");
    fs::write(
        &manifest,
        r#"
region "r1" {
    ingress "https://example.com"
}
"#,
    )
    .unwrap();

    catalyst()
        .arg("--manifest")
        .arg(&manifest)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http://*. or https://*."));
}

#[test]
fn test_validate_reports_missing_manifest() {
    let dir = tempdir().unwrap();
    catalyst()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("CATALYST_CONFIG_PATH")
        .arg("validate")
        .assert()
        .failure();
}

#[test]
fn test_show_with_empty_state() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("catalyst.kdl");
    fs::write(&manifest, "").unwrap();

    catalyst()
        .arg("--manifest")
        .arg(&manifest)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("No resources in state"));
}

#[test]
fn test_plan_without_api_key_reports_configuration_errors() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("catalyst.kdl");
    fs::write(&manifest, "").unwrap();

    catalyst()
        .arg("--manifest")
        .arg(&manifest)
        .arg("plan")
        .env_remove("CATALYST_API_KEY")
        .env("CATALYST_API_ENDPOINT", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing API Key Configuration"))
        .stderr(predicate::str::contains("Missing Endpoint Configuration"));
}

#[test]
fn test_huge_timeout_is_accepted() {
    let dir = tempdir().unwrap();
    let manifest = dir.path().join("catalyst.kdl");
    fs::write(&manifest, "region \"r1\" {\n    ingress \"https://*.example.com:443\"\n}\n").unwrap();

    catalyst()
        .arg("--manifest")
        .arg(&manifest)
        .args(["--timeout", &u64::MAX.to_string(), "validate"])
        .assert()
        .success();
}
