use camino::Utf8Path;
use fs_err as fs;
use recprio_types::record::RawRecommendation;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LoadedEntry {
    /// Zero-based position in the input table.
    pub index: usize,
    pub record: Result<RawRecommendation, RecordLoadError>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("json parse error: {message}")]
    Json { message: String },

    #[error("unexpected table shape: {message}")]
    Shape { message: String },

    #[error("unusable entry: {message}")]
    Entry { message: String },
}

/// Read and parse a record table from disk.
pub fn load_records(path: &Utf8Path) -> Result<Vec<LoadedEntry>, RecordLoadError> {
    debug!(path = %path, "loading record table");
    let contents = fs::read_to_string(path).map_err(|e| RecordLoadError::Io {
        message: e.to_string(),
    })?;
    parse_records(path.as_str(), &contents)
}

/// Parse a record table: either a bare JSON array or an object with a `recommendations` array.
///
/// Whole-table problems (bad JSON, wrong shape) are errors. Problems with a single entry are
/// returned in that entry's `record` so the caller can report them and keep going.
pub fn parse_records(label: &str, contents: &str) -> Result<Vec<LoadedEntry>, RecordLoadError> {
    let root: Value = serde_json::from_str(contents).map_err(|e| RecordLoadError::Json {
        message: e.to_string(),
    })?;

    let items = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("recommendations") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(RecordLoadError::Shape {
                    message: format!("`recommendations` is {}, expected array", kind(&other)),
                });
            }
            None => {
                return Err(RecordLoadError::Shape {
                    message: "object has no `recommendations` array".to_string(),
                });
            }
        },
        other => {
            return Err(RecordLoadError::Shape {
                message: format!("top level is {}, expected array or object", kind(&other)),
            });
        }
    };

    let entries: Vec<LoadedEntry> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| LoadedEntry {
            index,
            record: parse_entry(item),
        })
        .collect();

    let rejected = entries.iter().filter(|e| e.record.is_err()).count();
    if rejected > 0 {
        warn!(source = label, rejected, total = entries.len(), "some entries were unusable");
    }
    debug!(source = label, total = entries.len(), "record table parsed");
    Ok(entries)
}

fn parse_entry(item: Value) -> Result<RawRecommendation, RecordLoadError> {
    if !item.is_object() {
        return Err(RecordLoadError::Entry {
            message: format!("entry is {}, expected object", kind(&item)),
        });
    }
    serde_json::from_value(item).map_err(|e| RecordLoadError::Entry {
        message: e.to_string(),
    })
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
