//! Default filesystem-backed port implementations.

use crate::ports::{RecordSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use recprio_records::LoadedEntry;
use recprio_types::record::RawRecommendation;

/// Loads the record table from a JSON file via `recprio_records::load_records`.
#[derive(Debug, Clone)]
pub struct FsRecordSource {
    pub path: Utf8PathBuf,
}

impl FsRecordSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl RecordSource for FsRecordSource {
    fn load_records(&self) -> anyhow::Result<Vec<LoadedEntry>> {
        recprio_records::load_records(&self.path)
            .with_context(|| format!("load records from {}", self.path))
    }
}

/// In-memory record source for embedding and testing.
///
/// Entries are re-indexed by position so findings point at the order they were supplied in.
#[derive(Debug, Clone)]
pub struct InMemoryRecordSource {
    entries: Vec<LoadedEntry>,
}

impl InMemoryRecordSource {
    pub fn new(entries: Vec<LoadedEntry>) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(index, e)| LoadedEntry {
                index,
                record: e.record,
            })
            .collect();
        Self { entries }
    }

    pub fn from_records(records: Vec<RawRecommendation>) -> Self {
        Self::new(
            records
                .into_iter()
                .map(|r| LoadedEntry {
                    index: 0,
                    record: Ok(r),
                })
                .collect(),
        )
    }
}

impl RecordSource for InMemoryRecordSource {
    fn load_records(&self) -> anyhow::Result<Vec<LoadedEntry>> {
        Ok(self.entries.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        std::fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recprio_records::RecordLoadError;
    use tempfile::TempDir;

    fn raw(text: &str) -> RawRecommendation {
        RawRecommendation {
            sector: "energy".to_string(),
            recommendation: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn in_memory_source_reindexes_entries() {
        let source = InMemoryRecordSource::new(vec![
            LoadedEntry {
                index: 7,
                record: Ok(raw("first")),
            },
            LoadedEntry {
                index: 3,
                record: Err(RecordLoadError::Entry {
                    message: "stub".to_string(),
                }),
            },
        ]);
        let entries = source.load_records().expect("load");
        let indexes: Vec<usize> = entries.iter().map(|e| e.index).collect();
        assert_eq!(indexes, vec![0, 1]);
        assert!(entries[1].record.is_err());
    }

    #[test]
    fn from_records_wraps_each_record() {
        let source = InMemoryRecordSource::from_records(vec![raw("a"), raw("b")]);
        let entries = source.load_records().expect("load");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 1);
        assert_eq!(
            entries[1].record.as_ref().map(|r| r.recommendation.as_str()),
            Ok("b")
        );
    }

    #[test]
    fn fs_source_reports_missing_file_with_path() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
        let source = FsRecordSource::new(root.join("missing.json"));
        let err = source.load_records().expect_err("missing file");
        assert!(format!("{err:#}").contains("missing.json"));
    }

    #[test]
    fn fs_source_loads_table() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
        let path = root.join("recs.json");
        std::fs::write(&path, r#"[{"sector": "energy", "recommendation": "x"}]"#).expect("write");
        let entries = FsRecordSource::new(path).load_records().expect("load");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn fs_write_port_creates_parents() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
        let path = root.join("nested").join("dir").join("out.txt");
        FsWritePort.write_file(&path, b"hello").expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "hello");
    }
}
