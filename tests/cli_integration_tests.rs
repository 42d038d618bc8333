//! CLI Integration Tests
//!
//! Tests the binary directly using assert_cmd to exercise main.rs code paths.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn test_data_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("test-data");
    path.push(filename);
    path
}

fn excel2erp() -> Command {
    let mut cmd = Command::cargo_bin("excel2erp").unwrap();
    cmd.env_remove("EXCEL2ERP_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn acme_workbook(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("pedido.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(1, 4, "PED-7").unwrap();
    sheet.write_string(7, 0, "Cod.").unwrap();
    sheet.write_string(7, 1, "Cant.").unwrap();
    sheet.write_string(8, 0, "123").unwrap();
    sheet.write_number(8, 1, 5).unwrap();
    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    excel2erp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("excel2erp"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    excel2erp()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("excel2erp"));
}

#[test]
fn test_convert_help() {
    excel2erp()
        .args(["convert", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--set"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG INSPECTION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sources_lists_layouts() {
    excel2erp()
        .arg("--config")
        .arg(test_data_path("excel2erp.yaml"))
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("acme"))
        .stdout(predicate::str::contains("globex"))
        .stdout(predicate::str::contains("Acme Corp"));
}

#[test]
fn test_config_from_environment() {
    excel2erp()
        .env("EXCEL2ERP_CONFIG", test_data_path("excel2erp.yaml"))
        .arg("sources")
        .assert()
        .success()
        .stdout(predicate::str::contains("acme"));
}

#[test]
fn test_missing_lists_user_input() {
    excel2erp()
        .arg("-c")
        .arg(test_data_path("excel2erp.yaml"))
        .args(["missing", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DocDate"))
        .stdout(predicate::str::contains("Order date"))
        .stdout(predicate::str::contains("NumAtCard").not());
}

#[test]
fn test_unknown_source_fails() {
    excel2erp()
        .arg("-c")
        .arg(test_data_path("excel2erp.yaml"))
        .args(["missing", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown source"));
}

#[test]
fn test_malformed_config_fails() {
    excel2erp()
        .arg("-c")
        .arg(test_data_path("malformed.json"))
        .arg("sources")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON"));
}

#[test]
fn test_missing_config_file_fails() {
    excel2erp()
        .args(["-c", "/nonexistent/excel2erp.yaml", "sources"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONVERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_preview_prints_values() {
    let dir = TempDir::new().unwrap();
    let workbook = acme_workbook(&dir);

    excel2erp()
        .arg("-c")
        .arg(test_data_path("excel2erp.yaml"))
        .args(["preview", "acme"])
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("PED-7"))
        .stdout(predicate::str::contains("123 | 5"));
}

#[test]
fn test_convert_writes_archive() {
    let dir = TempDir::new().unwrap();
    let workbook = acme_workbook(&dir);
    let out = dir.path().join("out");

    excel2erp()
        .arg("-c")
        .arg(test_data_path("excel2erp.yaml"))
        .args(["convert", "acme"])
        .arg(&workbook)
        .arg("-o")
        .arg(&out)
        .args(["--set", "DocDate=2024-12-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme-PED-7.zip"));

    assert!(out.join("acme-PED-7.zip").exists());
}

#[test]
fn test_convert_without_inputs_fails() {
    let dir = TempDir::new().unwrap();
    let workbook = acme_workbook(&dir);

    excel2erp()
        .arg("-c")
        .arg(test_data_path("excel2erp.yaml"))
        .args(["convert", "acme"])
        .arg(&workbook)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing values: DocDate"))
        .stderr(predicate::str::contains("Missing user input: DocDate"));

    assert!(!dir.path().join("acme-PED-7.zip").exists());
}

#[test]
fn test_convert_reports_detail_inputs_by_name() {
    let dir = TempDir::new().unwrap();
    let workbook = acme_workbook(&dir);

    excel2erp()
        .arg("-c")
        .arg(test_data_path("detail-input.yaml"))
        .args(["convert", "acme"])
        .arg(&workbook)
        .arg("-o")
        .arg(dir.path())
        .args(["--set", "DocDate=2024-12-15"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing values: Project"))
        .stderr(predicate::str::contains("Missing user input: Project"))
        .stderr(predicate::str::contains("header:").not());
}

#[test]
fn test_convert_fills_detail_inputs_on_every_row() {
    let dir = TempDir::new().unwrap();
    let workbook = acme_workbook(&dir);
    let out = dir.path().join("out");

    excel2erp()
        .arg("-c")
        .arg(test_data_path("detail-input.yaml"))
        .args(["convert", "acme"])
        .arg(&workbook)
        .arg("-o")
        .arg(&out)
        .args(["--set", "DocDate=2024-12-15", "--set", "Project=P-9"])
        .assert()
        .success();

    assert!(out.join("acme-PED-7.zip").exists());
}

#[test]
fn test_convert_rejects_bad_assignment() {
    excel2erp()
        .arg("-c")
        .arg(test_data_path("excel2erp.yaml"))
        .args(["convert", "acme", "x.xlsx", "--set", "DocDate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME=VALUE"));
}
