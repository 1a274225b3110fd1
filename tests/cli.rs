//! Black-box CLI tests exercising the `zonerisk` binary end to end.

use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::NamedTempFile;

fn zone_fixture() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    writeln!(file, "Name,Type,Content,TTL,Proxied,Created,Modified").unwrap();
    writeln!(file, "old-admin.example.com,A,192.0.2.1,300,false,,").unwrap();
    writeln!(file, "www.example.com,CNAME,example.com,300,true,,").unwrap();
    file
}

#[test]
fn analyze_table_output_reports_provider_and_counts() {
    let file = zone_fixture();
    let mut cmd = Command::cargo_bin("zonerisk").expect("binary built");
    cmd.arg("--quiet")
        .arg("analyze")
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("cloudflare"));
}

#[test]
fn analyze_json_output_is_well_formed() {
    let file = zone_fixture();
    let mut cmd = Command::cargo_bin("zonerisk").expect("binary built");
    let output = cmd
        .arg("--quiet")
        .arg("analyze")
        .arg(file.path())
        .arg("--output")
        .arg("json")
        .output()
        .expect("run");
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout");
    assert!(parsed.get("summary").is_some());
    assert!(parsed.get("results").is_some());
}

#[test]
fn analyze_json_rejects_stream_flag() {
    let file = zone_fixture();
    let mut cmd = Command::cargo_bin("zonerisk").expect("binary built");
    cmd.arg("--quiet")
        .arg("analyze")
        .arg(file.path())
        .arg("--output")
        .arg("json")
        .arg("--stream")
        .assert()
        .failure();
}

#[test]
fn analyze_missing_file_exits_with_input_error_code() {
    let mut cmd = Command::cargo_bin("zonerisk").expect("binary built");
    cmd.arg("--quiet")
        .arg("analyze")
        .arg("/no/such/file.csv")
        .assert()
        .code(1);
}

#[test]
fn print_default_config_emits_a_versioned_catalog() {
    let mut cmd = Command::cargo_bin("zonerisk").expect("binary built");
    cmd.arg("print-default-config")
        .assert()
        .success()
        .stdout(contains("version"));
}

#[test]
fn validate_config_accepts_the_printed_default_catalog() {
    let mut print_cmd = Command::cargo_bin("zonerisk").expect("binary built");
    let printed = print_cmd.arg("print-default-config").output().expect("run");
    assert!(printed.status.success());

    let mut catalog_file = NamedTempFile::new().expect("tempfile");
    catalog_file.write_all(&printed.stdout).expect("write catalog");

    let mut validate_cmd = Command::cargo_bin("zonerisk").expect("binary built");
    validate_cmd
        .arg("validate-config")
        .arg(catalog_file.path())
        .assert()
        .success();
}

#[test]
fn validate_config_rejects_a_malformed_catalog() {
    let mut catalog_file = NamedTempFile::new().expect("tempfile");
    writeln!(catalog_file, "not: a valid catalog document").unwrap();

    let mut cmd = Command::cargo_bin("zonerisk").expect("binary built");
    cmd.arg("validate-config")
        .arg(catalog_file.path())
        .assert()
        .failure();
}

#[test]
fn dry_run_reports_detection_without_classifying() {
    let file = zone_fixture();
    let mut cmd = Command::cargo_bin("zonerisk").expect("binary built");
    cmd.arg("--quiet")
        .arg("analyze")
        .arg(file.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("provider=cloudflare"));
}
