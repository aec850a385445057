//! End-to-end tests for the `recprio` binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TABLE: &str = r#"[
    {"id": "lab-1", "year": 2024, "sector": "labour",
     "recommendation": "Report to all citizens on the unemployment guideline for small business."},
    {"id": "en-1", "year": 2023, "sector": "energy",
     "recommendation": "Eskom should publish a plan to end load shedding in the Western Cape."},
    {"id": "fin-1", "year": 2022, "sector": "finance",
     "recommendation": "National Treasury should strengthen budget oversight of provincial grants."}
]"#;

fn recprio() -> Command {
    Command::cargo_bin("recprio").expect("recprio binary")
}

fn create_workspace() -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(td.path().join("data")).unwrap();
    fs::write(td.path().join("data").join("recommendations.json"), TABLE).unwrap();
    td
}

fn read_json(path: &Path) -> serde_json::Value {
    let s = fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_json::from_str(&s).expect("valid json")
}

#[test]
fn test_prioritize_defaults_write_all_artifacts() {
    let temp = create_workspace();

    recprio()
        .current_dir(temp.path())
        .arg("prioritize")
        .assert()
        .success()
        .stdout(predicate::str::contains("scored 3 recommendations"));

    let out = temp.path().join("artifacts").join("recprio");
    for name in [
        "scored.json",
        "summary.json",
        "summary.md",
        "memo.md",
        "recommendations_prioritized.xlsx",
        "report.json",
    ] {
        assert!(out.join(name).exists(), "missing {name}");
    }

    let scored = read_json(&out.join("scored.json"));
    assert_eq!(scored["schema"], "recprio.scored.v1");
    assert_eq!(scored["records"].as_array().map(Vec::len), Some(3));

    let report = read_json(&out.join("report.json"));
    assert_eq!(report["verdict"]["status"], "pass");
    assert_eq!(report["tool"]["name"], "recprio");
}

#[test]
fn test_prioritize_skips_optional_outputs() {
    let temp = create_workspace();

    recprio()
        .current_dir(temp.path())
        .args(["prioritize", "--out-dir", "out", "--no-workbook", "--no-memo"])
        .assert()
        .success();

    let out = temp.path().join("out");
    assert!(out.join("scored.json").exists());
    assert!(!out.join("memo.md").exists());
    assert!(!out.join("recommendations_prioritized.xlsx").exists());
}

#[test]
fn test_prioritize_reads_config_from_working_dir() {
    let temp = create_workspace();
    fs::write(
        temp.path().join("recprio.toml"),
        r#"
[pipeline]
out_dir = "from-config"

[output]
workbook = false
"#,
    )
    .unwrap();

    recprio()
        .current_dir(temp.path())
        .arg("prioritize")
        .assert()
        .success();

    let out = temp.path().join("from-config");
    assert!(out.join("report.json").exists());
    assert!(!out.join("recommendations_prioritized.xlsx").exists());
}

#[test]
fn test_prioritize_explicit_config_path() {
    let temp = create_workspace();
    fs::write(
        temp.path().join("custom.toml"),
        "[pipeline]\ninput = \"data/recommendations.json\"\nout_dir = \"custom-out\"\n",
    )
    .unwrap();

    recprio()
        .current_dir(temp.path())
        .args(["prioritize", "--config", "custom.toml", "--no-workbook"])
        .assert()
        .success();

    assert!(temp.path().join("custom-out").join("scored.json").exists());
}

#[test]
fn test_prioritize_missing_input_exits_one() {
    let temp = tempfile::tempdir().expect("tempdir");

    recprio()
        .current_dir(temp.path())
        .args(["prioritize", "--input", "nope.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_prioritize_invalid_config_exits_two() {
    let temp = create_workspace();
    fs::write(temp.path().join("recprio.toml"), "[pipeline\nbroken").unwrap();

    recprio()
        .current_dir(temp.path())
        .arg("prioritize")
        .assert()
        .code(2);
}

#[test]
fn test_prioritize_invalid_rule_pattern_exits_two() {
    let temp = create_workspace();
    fs::write(
        temp.path().join("recprio.toml"),
        "[rules.cost]\nbillion_pattern = \"(unclosed\"\n",
    )
    .unwrap();

    recprio()
        .current_dir(temp.path())
        .arg("prioritize")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("billion_pattern"));
}

#[test]
fn test_prioritize_rejects_out_of_range_threshold() {
    let temp = create_workspace();

    recprio()
        .current_dir(temp.path())
        .args(["prioritize", "--dedup-threshold", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("dedup_threshold"));
}

#[test]
fn test_prioritize_rejects_unreachable_tier_cut_off() {
    let temp = create_workspace();
    fs::write(
        temp.path().join("recprio.toml"),
        "[tiers.quick_win]\ncost = 6\n",
    )
    .unwrap();

    recprio()
        .current_dir(temp.path())
        .arg("prioritize")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("tiers.quick_win"));
    assert!(!temp.path().join("artifacts").exists());
}

#[test]
fn test_prioritize_rerun_is_byte_identical() {
    let temp = create_workspace();
    let scored = temp.path().join("artifacts").join("recprio").join("scored.json");

    recprio()
        .current_dir(temp.path())
        .args(["prioritize", "--no-workbook"])
        .assert()
        .success();
    let first = fs::read(&scored).unwrap();

    recprio()
        .current_dir(temp.path())
        .args(["prioritize", "--no-workbook"])
        .assert()
        .success();
    assert_eq!(first, fs::read(&scored).unwrap());
}

#[test]
fn test_extract_writes_table() {
    let temp = tempfile::tempdir().expect("tempdir");
    let sector = temp.path().join("text").join("finance");
    fs::create_dir_all(&sector).unwrap();
    fs::write(
        sector.join("brrr_2023.txt"),
        "RECOMMENDATIONS\n\
         1. National Treasury should strengthen budget oversight of provincial grants.\n\
         2. The department should submit an audit action plan to the committee.\n",
    )
    .unwrap();

    recprio()
        .current_dir(temp.path())
        .args(["extract", "--text-dir", "text", "--out", "table.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extracted 2 recommendations from 1 reports"));

    let table = read_json(&temp.path().join("table.json"));
    let rows = table.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["sector"], "finance");
    assert_eq!(rows[0]["year"], 2023);
}

#[test]
fn test_extract_requires_text_dir() {
    recprio()
        .arg("extract")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--text-dir"));
}

#[test]
fn test_explain_known_rule() {
    recprio()
        .args(["explain", "quick-win"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RULE: Quick win"))
        .stdout(predicate::str::contains("[tiers.quick_win]"));
}

#[test]
fn test_explain_accepts_field_name() {
    recprio()
        .args(["explain", "roi_score"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not configurable."));
}

#[test]
fn test_explain_unknown_rule_lists_available() {
    recprio()
        .args(["explain", "momentum"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Available rules"));
}

#[test]
fn test_list_rules_text() {
    recprio()
        .arg("list-rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("fiscally-optimal"))
        .stdout(predicate::str::contains("recprio explain <key>"));
}

#[test]
fn test_list_rules_json() {
    let output = recprio()
        .args(["list-rules", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let rules: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rules = rules.as_array().expect("array");
    assert!(rules.iter().any(|r| r["key"] == "high-priority" && r["kind"] == "tier"));
    assert!(rules.iter().all(|r| r["rule_id"].is_string()));
}

#[test]
fn test_list_rules_rejects_unknown_format() {
    recprio()
        .args(["list-rules", "--format", "yaml"])
        .assert()
        .failure();
}
