//! Integration tests for the partbench CLI
//!
//! These exercise the offline surfaces end-to-end with assert_cmd: help
//! output, configuration failures, and the CSV paths that run before any
//! server connection is made.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a partbench command with server configuration stripped
fn partbench() -> Command {
    let mut cmd = Command::cargo_bin("partbench").unwrap();
    cmd.env_remove("INVENTREE_BASE_URL");
    cmd.env_remove("INVENTREE_API_TOKEN");
    cmd
}

// ============================================================================
// Basic CLI
// ============================================================================

#[test]
fn test_help_displays() {
    partbench()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("InvenTree parts-maintenance toolkit"));
}

#[test]
fn test_version_displays() {
    partbench()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("partbench"));
}

#[test]
fn test_subcommand_help_displays() {
    for sub in ["name", "param", "selection", "part", "location"] {
        partbench()
            .args([sub, "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_unknown_subcommand_fails() {
    partbench().arg("frobnicate").assert().failure();
}

// ============================================================================
// Configuration errors
// ============================================================================

#[test]
fn test_server_command_without_config_fails_fast() {
    partbench()
        .args(["name", "check", "--category", "81", "--rule", "resistor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no server URL configured"));
}

#[test]
fn test_token_missing_is_reported() {
    partbench()
        .args(["selection", "list", "--base-url", "https://inv.example/api/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API token configured"));
}

#[test]
fn test_invalid_category_rejected_by_parser() {
    partbench()
        .args(["name", "check", "--category", "resistors"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid category pk"));
}

// ============================================================================
// Offline CSV surfaces (dry-run never connects)
// ============================================================================

#[test]
fn test_selection_create_dry_run_reports_choices() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("list.csv");
    fs::write(
        &csv,
        "Value,Label,Description\nMF,Metal film,Standard film resistor\nCF,Carbon film,Budget\n",
    )
    .unwrap();

    partbench()
        .args([
            "selection",
            "create",
            "--name",
            "Resistor types",
            "--from",
            csv.to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Value: MF"))
        .stdout(predicate::str::contains("Value: CF"))
        .stdout(predicate::str::contains("nothing created"));
}

#[test]
fn test_selection_create_rejects_csv_without_value_column() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("list.csv");
    fs::write(&csv, "Label,Description\nMetal film,x\n").unwrap();

    partbench()
        .args([
            "selection",
            "create",
            "--name",
            "Resistor types",
            "--from",
            csv.to_str().unwrap(),
            "--dry-run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Value"));
}

#[test]
fn test_part_import_dry_run_lists_parts() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("import_list.csv");
    fs::write(
        &csv,
        "name,description\nR_10kOhm_MF_SMD,10k 1% 0805\nR_22kOhm_MF_SMD,22k 1% 0805\n",
    )
    .unwrap();

    partbench()
        .args([
            "part",
            "import",
            csv.to_str().unwrap(),
            "--category",
            "81",
            "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("R_10kOhm_MF_SMD"))
        .stdout(predicate::str::contains("2 part(s) to create"));
}

#[test]
fn test_part_import_missing_name_fails() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("import_list.csv");
    fs::write(&csv, "name,description\n,orphan row\n").unwrap();

    partbench()
        .args([
            "part",
            "import",
            csv.to_str().unwrap(),
            "--category",
            "81",
            "--dry-run",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field 'name'"));
}
