//! Port traits that abstract I/O away from the pipeline logic.

use camino::Utf8Path;
use recprio_records::LoadedEntry;

/// Source of loaded recommendation entries.
pub trait RecordSource {
    fn load_records(&self) -> anyhow::Result<Vec<LoadedEntry>>;
}

/// Abstraction over filesystem writes for artifacts.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
