//! End-to-end tests for the setl binary
//!
//! These tests validate:
//! - Full runs writing both tables
//! - Flag, environment and config file precedence
//! - Schema inspection output
//! - Exit codes and diagnostics on failure

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CSV_SOURCE: &str = "D1,D2,M1\na,b,1\na,b,2\nc,d,x\n";

/// Helper to write a file into the fixture directory
fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// The binary, isolated from the caller's environment and working directory
fn setl(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("setl").unwrap();
    cmd.current_dir(dir)
        .env_remove("SETL_CONFIG")
        .env_remove("SETL_OUT_BASIC")
        .env_remove("SETL_OUT_ADVANCED")
        .env_remove("SETL_SORT_KEY")
        .env_remove("SETL_DELIMITER")
        .env_remove("SETL_ON_MALFORMED")
        .env_remove("SETL_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_writes_default_outputs() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", CSV_SOURCE);

    setl(dir.path())
        .args(["run", "-i", "in.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Run complete"))
        .stdout(predicate::str::contains("Coercion failures"));

    assert_eq!(
        fs::read_to_string(dir.path().join("result_basic.tsv")).unwrap(),
        "D1\tD2\tM1\na\tb\t1\na\tb\t2\nc\td\t0\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("result_advanced.tsv")).unwrap(),
        "D1\tD2\tMS1\na\tb\t3\nc\td\t0\n"
    );
}

#[test]
fn test_coercion_failures_are_logged_to_stderr() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", CSV_SOURCE);

    setl(dir.path())
        .args(["run", "-i", "in.csv"])
        .assert()
        .success()
        .stderr(predicate::str::contains("M1"));
}

#[test]
fn test_run_output_flags_and_report() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", CSV_SOURCE);

    setl(dir.path())
        .args([
            "run",
            "--in-files",
            "in.csv",
            "--out-basic",
            "rows.tsv",
            "--out-advanced",
            "groups.tsv",
            "--report",
            "report.json",
        ])
        .assert()
        .success();

    assert!(dir.path().join("rows.tsv").exists());
    assert!(dir.path().join("groups.tsv").exists());
    assert!(!dir.path().join("result_basic.tsv").exists());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["groups"], 2);
    assert_eq!(report["measure_keys"][0], "M1");
}

#[test]
fn test_environment_overrides_config_file_and_flags_override_both() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", CSV_SOURCE);
    write(
        dir.path(),
        "setl.toml",
        "out_basic = \"from_file.tsv\"\nout_advanced = \"agg_file.tsv\"\n",
    );

    setl(dir.path())
        .env("SETL_OUT_BASIC", "from_env.tsv")
        .args(["run", "-i", "in.csv"])
        .assert()
        .success();

    assert!(dir.path().join("from_env.tsv").exists());
    assert!(dir.path().join("agg_file.tsv").exists());
    assert!(!dir.path().join("from_file.tsv").exists());

    setl(dir.path())
        .env("SETL_OUT_BASIC", "from_env_2.tsv")
        .args(["run", "-i", "in.csv", "--out-basic", "from_flag.tsv"])
        .assert()
        .success();

    assert!(dir.path().join("from_flag.tsv").exists());
    assert!(!dir.path().join("from_env_2.tsv").exists());
}

#[test]
fn test_flag_resolves_output_clash_in_config_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", CSV_SOURCE);
    write(
        dir.path(),
        "setl.toml",
        "out_basic = \"same.tsv\"\nout_advanced = \"same.tsv\"\n",
    );

    setl(dir.path())
        .args(["run", "-i", "in.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("outputs must differ"));

    setl(dir.path())
        .args(["run", "-i", "in.csv", "--out-basic", "rows.tsv"])
        .assert()
        .success();

    assert!(dir.path().join("rows.tsv").exists());
    assert!(dir.path().join("same.tsv").exists());
}

#[test]
fn test_missing_source_is_named() {
    let dir = TempDir::new().unwrap();

    setl(dir.path())
        .args(["run", "-i", "nope.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[read] cannot open source 'nope.csv'"));
}

#[test]
fn test_skip_malformed_flag() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", CSV_SOURCE);
    write(dir.path(), "broken.json", "{\"records\": []}");

    setl(dir.path())
        .args(["run", "-i", "in.csv", "broken.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed source"))
        .stderr(predicate::str::contains("broken.json"));

    setl(dir.path())
        .args(["run", "-i", "in.csv", "broken.json", "--skip-malformed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unsupported_format_exits_with_one() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.tsv", "D1\tM1\na\t1\n");

    setl(dir.path())
        .args(["run", "-i", "in.tsv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[read] unsupported format"));

    assert!(!dir.path().join("result_basic.tsv").exists());
}

#[test]
fn test_missing_sources_is_an_argument_error() {
    let dir = TempDir::new().unwrap();

    setl(dir.path()).arg("run").assert().code(2);
}

#[test]
fn test_bad_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", CSV_SOURCE);
    write(dir.path(), "bad.toml", "delimiter = 5\n");

    setl(dir.path())
        .args(["--config", "bad.toml", "run", "-i", "in.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad.toml"));
}

// ============================================================================
// schema / config
// ============================================================================

#[test]
fn test_schema_table_and_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "in.csv", "D1,note,M1\na,x,1\n");
    write(dir.path(), "in.json", r#"{"fields": [{"M1": 2, "D1": "b", "note": "y"}]}"#);

    setl(dir.path())
        .args(["schema", "-i", "in.csv", "in.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dimension"))
        .stdout(predicate::str::contains("unclassified"));

    let output = setl(dir.path())
        .args(["schema", "-i", "in.csv", "in.json", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["records"], 2);
    assert_eq!(json["columns"][0]["column"], "D1");
    assert_eq!(json["columns"][1]["role"], "measure");
}

#[test]
fn test_config_show_prints_toml() {
    let dir = TempDir::new().unwrap();

    setl(dir.path())
        .env("SETL_SORT_KEY", "D2")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("out_basic = \"result_basic.tsv\""))
        .stdout(predicate::str::contains("sort_key = \"D2\""))
        .stdout(predicate::str::contains("on_malformed = \"abort\""));
}

#[test]
fn test_markdown_help() {
    let dir = TempDir::new().unwrap();

    setl(dir.path())
        .arg("--markdown-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setl run"));
}
