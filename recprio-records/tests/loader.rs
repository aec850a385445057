//! Tests for the record table loader and the report directory walker.

use camino::Utf8PathBuf;
use recprio_records::{RecordLoadError, extract_dir, load_records, parse_records};
use std::fs;
use tempfile::TempDir;

fn utf8(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 tempdir")
}

#[test]
fn test_bare_array_table() {
    let entries = parse_records(
        "inline",
        r#"[{"sector": "energy", "recommendation": "Report on load shedding progress monthly."}]"#,
    )
    .expect("parse");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index, 0);
    let rec = entries[0].record.as_ref().expect("record");
    assert_eq!(rec.sector, "energy");
}

#[test]
fn test_wrapped_table() {
    let entries = parse_records(
        "inline",
        r#"{"generated": "2024-01-01", "recommendations": [{"text": "a"}, {"text": "b"}]}"#,
    )
    .expect("parse");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].index, 1);
}

#[test]
fn test_non_object_entry_is_reported_not_fatal() {
    let entries = parse_records("inline", r#"[{"text": "fine"}, 42, "nope"]"#).expect("parse");
    assert_eq!(entries.len(), 3);
    assert!(entries[0].record.is_ok());
    assert!(matches!(
        entries[1].record,
        Err(RecordLoadError::Entry { .. })
    ));
    assert!(entries[2].record.is_err());
}

#[test]
fn test_invalid_json_is_fatal() {
    let err = parse_records("inline", "{not json").expect_err("should fail");
    assert!(matches!(err, RecordLoadError::Json { .. }));
}

#[test]
fn test_wrong_shape_is_fatal() {
    assert!(matches!(
        parse_records("inline", r#"{"rows": []}"#),
        Err(RecordLoadError::Shape { .. })
    ));
    assert!(matches!(
        parse_records("inline", r#""just a string""#),
        Err(RecordLoadError::Shape { .. })
    ));
    assert!(matches!(
        parse_records("inline", r#"{"recommendations": {}}"#),
        Err(RecordLoadError::Shape { .. })
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = utf8(&temp).join("absent.json");
    assert!(matches!(
        load_records(&missing),
        Err(RecordLoadError::Io { .. })
    ));
}

#[test]
fn test_extract_dir_walks_sectors_in_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = utf8(&temp);
    for (sector, file) in [("trade", "brrr_2022.txt"), ("energy", "brrr_2023.txt")] {
        let dir = root.join(sector);
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(
            dir.join(file),
            "RECOMMENDATIONS\n1. The department should publish quarterly performance reports.\n",
        )
        .expect("write");
    }

    let reports = extract_dir(&root).expect("extract");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].sector, "energy");
    assert_eq!(reports[0].year, Some(2023));
    assert_eq!(reports[1].sector, "trade");
    assert_eq!(reports[1].records.len(), 1);
    assert_eq!(reports[1].records[0].report, "brrr_2022.txt");
}

#[test]
fn test_extract_dir_missing_dir_is_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    let reports = extract_dir(&utf8(&temp).join("nope")).expect("extract");
    assert!(reports.is_empty());
}
