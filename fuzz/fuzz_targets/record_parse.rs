#![no_main]

//! Fuzz target for record table parsing.
//!
//! Arbitrary bytes go through `parse_records`, then every entry that survives is pushed through
//! the full prioritizer. Neither step may panic, and every score must stay in range.

use libfuzzer_sys::fuzz_target;
use recprio_domain::{Prioritizer, PrioritizerConfig, Ruleset};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let _ = serde_json::from_str::<recprio_types::record::RawRecommendation>(s);

    let Ok(entries) = recprio_records::parse_records("fuzz", s) else {
        return;
    };

    let Ok(rules) = Ruleset::builtin() else {
        return;
    };
    let result = Prioritizer::new(rules, PrioritizerConfig::default()).prioritize(&entries);
    for rec in &result.dataset.records {
        let roi = rec.scores.roi_score();
        assert!((1.0..=10.0).contains(&roi), "roi out of range: {roi}");
    }
    assert!(result.dataset.records.len() <= entries.len());
});
