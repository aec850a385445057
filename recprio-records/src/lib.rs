//! Record ingestion utilities.
//!
//! recprio consumes tables produced by upstream text extraction. It does not enforce a strict
//! schema here: unknown fields are ignored, missing ones defaulted, and an entry that cannot be
//! read at all is reported alongside the good ones instead of failing the whole table.

mod extract;
mod load;

pub use extract::{
    ExtractedReport, extract_dir, extract_report, find_recommendation_sections,
    split_recommendations, that_clauses, year_from_file_name,
};
pub use load::{LoadedEntry, RecordLoadError, load_records, parse_records};
