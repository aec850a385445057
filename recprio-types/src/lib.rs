//! Shared DTOs (schemas-as-code) for the recprio workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod record;
pub mod report;
pub mod score;
pub mod scored;
pub mod summary;

pub use score::{Score, ScoreCard, ScoreOutOfRange, roi_score, round_to};

/// Schema identifiers.
pub mod schema {
    pub const RECPRIO_SCORED_V1: &str = "recprio.scored.v1";
    pub const RECPRIO_SUMMARY_V1: &str = "recprio.summary.v1";
    pub const RECPRIO_REPORT_V1: &str = "recprio.report.v1";
}
