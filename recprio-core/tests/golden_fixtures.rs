//! Golden fixture tests for recprio.
//!
//! These tests verify that the prioritize pipeline produces deterministic, expected output for
//! known record tables. Each fixture contains:
//!
//! - `recommendations.json` - The input record table
//! - `expected/` - Expected output files (scored.json, summary.json, summary.md, report.json)
//!
//! Missing expected files are written on first run. Set `RECPRIO_BLESS=1` to overwrite them
//! after an intentional rule change (`cargo xtask bless-fixtures` does this).

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use recprio_core::adapters::{FsRecordSource, FsWritePort};
use recprio_core::{PrioritizeSettings, run_prioritize, write_prioritize_artifacts};
use recprio_types::report::ReportToolInfo;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const COMPARED: &[&str] = &["scored.json", "summary.json", "summary.md", "report.json"];

fn blessing() -> bool {
    std::env::var_os("RECPRIO_BLESS").is_some_and(|v| v == "1")
}

/// Strips run-specific fields: timestamps, duration and the absolute input path.
fn normalize_report_json(json: &str) -> serde_json::Value {
    let mut v: serde_json::Value = serde_json::from_str(json).expect("valid JSON");
    if let Some(obj) = v.as_object_mut() {
        if let Some(run) = obj.get_mut("run").and_then(|r| r.as_object_mut()) {
            run.remove("started_at");
            run.remove("ended_at");
            run.remove("duration_ms");
        }
        if let Some(inputs) = obj.get_mut("inputs").and_then(|i| i.as_object_mut()) {
            inputs.insert("available".to_string(), serde_json::json!(["<INPUT>"]));
        }
        if let Some(tool) = obj.get_mut("tool").and_then(|t| t.as_object_mut()) {
            tool.insert("version".to_string(), serde_json::json!("<VERSION>"));
        }
    }
    v
}

fn normalize(name: &str, contents: &str) -> String {
    if name == "report.json" {
        serde_json::to_string_pretty(&normalize_report_json(contents)).expect("serialize")
    } else {
        contents.replace("\r\n", "\n")
    }
}

fn run_fixture_test(fixture_name: &str) {
    // Fixtures are at workspace root: ../tests/fixtures relative to recprio-core
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir.parent().expect("workspace root");
    let fixture_path = workspace_root
        .join("tests")
        .join("fixtures")
        .join(fixture_name);

    assert!(
        fixture_path.exists(),
        "Fixture directory does not exist: {}",
        fixture_path.display()
    );

    let temp_dir = TempDir::new().expect("create temp dir");
    let out_dir = Utf8PathBuf::from_path_buf(temp_dir.path().join("out")).expect("utf8 path");
    let input = Utf8PathBuf::from_path_buf(fixture_path.join("recommendations.json"))
        .expect("utf8 path");

    let settings = PrioritizeSettings {
        input: input.clone(),
        out_dir: out_dir.clone(),
        write_workbook: false,
        ..PrioritizeSettings::default()
    };
    let tool = ReportToolInfo {
        name: "recprio".to_string(),
        version: "test".to_string(),
    };
    let outcome =
        run_prioritize(&settings, &FsRecordSource::new(input), tool).expect("run prioritize");
    write_prioritize_artifacts(&outcome, &settings, &FsWritePort).expect("write artifacts");

    let expected_dir = fixture_path.join("expected");
    for name in COMPARED {
        let actual = normalize(
            name,
            &fs::read_to_string(out_dir.join(name)).expect("read generated artifact"),
        );
        let expected_path = expected_dir.join(name);

        if expected_path.exists() && !blessing() {
            let expected = normalize(
                name,
                &fs::read_to_string(&expected_path).expect("read expected artifact"),
            );
            assert_eq!(
                actual, expected,
                "{} mismatch for fixture '{}'",
                name, fixture_name
            );
        } else {
            fs::create_dir_all(&expected_dir).expect("create expected dir");
            fs::write(&expected_path, &actual).expect("write expected artifact");
            println!(
                "Wrote expected {} for '{}' at {}",
                name,
                fixture_name,
                expected_path.display()
            );
        }
    }

    // Summary counts agree with the records they were computed from.
    let records = &outcome.dataset.records;
    let quick_wins = records.iter().filter(|r| r.is_quick_win()).count() as u64;
    let high_priority = records.iter().filter(|r| r.is_high_priority()).count() as u64;
    assert_eq!(outcome.summary.total_recommendations, records.len() as u64);
    assert_eq!(outcome.summary.quick_wins, quick_wins);
    assert_eq!(outcome.summary.high_priority, high_priority);
}

#[test]
fn golden_sample() {
    run_fixture_test("sample");
}

#[test]
fn golden_duplicates_and_noise() {
    run_fixture_test("duplicates_and_noise");
}
