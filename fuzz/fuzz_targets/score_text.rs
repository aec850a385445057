#![no_main]

//! Fuzz target for the scorer.
//!
//! Any sector, year, text and hint combination must score without panicking, with every
//! dimension inside 1..=5 and ROI inside 1..=10.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use recprio_domain::{NormalizedRecord, Prioritizer, PrioritizerConfig, Ruleset};
use recprio_domain::overlay::OverlayHints;

#[derive(Debug, Arbitrary)]
struct Input {
    sector: String,
    year: Option<i32>,
    text: String,
}

fuzz_target!(|input: Input| {
    let Ok(rules) = Ruleset::builtin() else {
        return;
    };
    let prioritizer = Prioritizer::new(rules, PrioritizerConfig::default());

    let rec = NormalizedRecord {
        index: 0,
        id: "fuzz".to_string(),
        year: input.year,
        sector: input.sector,
        report: String::new(),
        text: input.text,
        category: None,
        hints: OverlayHints::default(),
    };
    let scored = prioritizer.score(&rec);

    let s = &scored.scores;
    for v in [s.feasibility().get(), s.impact().get(), s.cost().get()] {
        assert!((1..=5).contains(&v), "score out of range: {v}");
    }
    assert!((1.0..=10.0).contains(&s.roi_score()));
    assert!((1..=4).contains(&scored.fiscal.fiscal_feasibility));
    assert_eq!(scored, prioritizer.score(&rec));
});
