//! Property-based tests for score bounds and run determinism.
//!
//! These tests verify that:
//! - Every score stays within its bounds for arbitrary text
//! - Scoring the same table twice produces byte-identical JSON
//! - Every input entry is either scored or reported as dropped

use proptest::prelude::*;
use recprio_domain::{Prioritizer, PrioritizerConfig, Ruleset};
use recprio_records::parse_records;

const VOCAB: &[&str] = &[
    "report",
    "improve",
    "develop",
    "legislation",
    "billion",
    "R50 million",
    "eskom",
    "port",
    "municipal",
    "sme",
    "unemployment",
    "all citizens",
    "training",
    "system",
    "policy",
    "urgent",
    "concern",
    "inter-departmental",
    "no cost",
    "multi-year",
    "the",
    "department",
    "should",
    "within",
    "quarterly",
];

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB), 6..20).prop_map(|w| w.join(" "))
}

fn arb_table() -> impl Strategy<Value = Vec<(String, String, Option<i32>)>> {
    prop::collection::vec(
        (
            arb_text(),
            prop::sample::select(&["energy", "finance", "health", "trade"][..]),
            prop::option::of(2018i32..2026),
        )
            .prop_map(|(t, s, y)| (t, s.to_string(), y)),
        0..12,
    )
}

fn table_json(rows: &[(String, String, Option<i32>)]) -> String {
    let rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|(text, sector, year)| {
            serde_json::json!({ "recommendation": text, "sector": sector, "year": year })
        })
        .collect();
    serde_json::Value::Array(rows).to_string()
}

fn prioritizer() -> Prioritizer {
    Prioritizer::new(
        Ruleset::builtin().expect("rules"),
        PrioritizerConfig::default(),
    )
}

proptest! {
    #[test]
    fn scores_stay_in_bounds(rows in arb_table()) {
        let entries = parse_records("prop", &table_json(&rows)).expect("parse");
        let result = prioritizer().prioritize(&entries);
        for r in &result.dataset.records {
            prop_assert!((1..=5).contains(&r.scores.feasibility().get()));
            prop_assert!((1..=5).contains(&r.scores.impact().get()));
            prop_assert!((1..=5).contains(&r.scores.cost().get()));
            prop_assert!(r.scores.roi_score() >= 1.0 && r.scores.roi_score() <= 10.0);
            prop_assert!((1..=4).contains(&r.fiscal.fiscal_feasibility));
            prop_assert!((0.0..=1.0).contains(&r.political.total_score));
        }
    }

    #[test]
    fn rerun_is_byte_identical(rows in arb_table()) {
        let json = table_json(&rows);
        let p = prioritizer();
        let a = p.prioritize(&parse_records("prop", &json).expect("parse"));
        let b = p.prioritize(&parse_records("prop", &json).expect("parse"));
        prop_assert_eq!(
            serde_json::to_string_pretty(&a.dataset).expect("ser"),
            serde_json::to_string_pretty(&b.dataset).expect("ser")
        );
        prop_assert_eq!(
            serde_json::to_string_pretty(&a.summary).expect("ser"),
            serde_json::to_string_pretty(&b.summary).expect("ser")
        );
    }

    #[test]
    fn kept_plus_dropped_accounts_for_every_entry(rows in arb_table()) {
        let entries = parse_records("prop", &table_json(&rows)).expect("parse");
        let result = prioritizer().prioritize(&entries);
        let dropped = result
            .anomalies
            .iter()
            .filter(|a| matches!(
                a.kind,
                recprio_domain::AnomalyKind::NoiseDropped
                    | recprio_domain::AnomalyKind::DuplicateRemoved
                    | recprio_domain::AnomalyKind::RecordRejected
            ))
            .count();
        prop_assert_eq!(result.dataset.records.len() + dropped, rows.len());
    }
}
