//! BDD harness (cucumber-rs).
//!
//! This crate exists to keep scenario tests isolated from the production crates. The helpers here
//! build the record tables the scenarios start from.

use serde_json::{Value, json};

/// Scores 5/5/5 in the labour sector: a quick win and high priority under default thresholds.
pub const QUICK_WIN_TEXT: &str =
    "Report to all citizens on the unemployment guideline for small business.";

/// One edit away from [`QUICK_WIN_TEXT`] after normalization.
pub const NEAR_DUPLICATE_TEXT: &str =
    "Report to all citizens on the unemployment guidelines for small businesses.";

/// Digit-heavy table debris as it comes out of a PDF text layer.
pub const NOISE_TEXT: &str = "2023/24 1 234 567 890 12 345 678 901 234 567 89";

pub fn record(id: &str, year: i32, sector: &str, text: &str) -> Value {
    json!({
        "id": id,
        "year": year,
        "sector": sector,
        "report": format!("BRRR {year}"),
        "recommendation": text,
    })
}

/// Wrap records in the `{"recommendations": [...]}` envelope the loader accepts.
pub fn table(records: Vec<Value>) -> String {
    serde_json::to_string_pretty(&json!({ "recommendations": records }))
        .unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_wraps_records() {
        let t = table(vec![record("a", 2024, "labour", QUICK_WIN_TEXT)]);
        let v: Value = serde_json::from_str(&t).expect("json");
        assert_eq!(v["recommendations"][0]["id"], "a");
        assert_eq!(v["recommendations"][0]["report"], "BRRR 2024");
    }
}
