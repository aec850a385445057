#![no_main]

//! Fuzz target for report segmentation. Arbitrary text must never panic the section finder or
//! the item splitter, including on multi-byte characters at cut points.

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let records = recprio_records::extract_report("fuzz", "fuzz.txt", Some(2024), text);
    for rec in &records {
        assert_eq!(rec.sector, "fuzz");
    }
    let _ = recprio_records::find_recommendation_sections(text);
    let _ = recprio_records::that_clauses(text);
});
