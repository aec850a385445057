//! Segmenting plain report text into raw recommendation records.
//!
//! Input is text that an upstream tool has already pulled out of the report PDFs, laid out as
//! `<dir>/<sector>/<file>.txt`. A report is scanned for recommendation sections first; each
//! section is split into numbered, bulleted or "that ..." items. A report without any recognised
//! section falls back to harvesting every "(recommends) that ... ." clause in the text.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use recprio_types::record::RawRecommendation;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

const MIN_ITEM_CHARS: usize = 20;
const MIN_CLAUSE_CHARS: usize = 30;

static SECTION_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:recommendations?\b|the committee recommends?\b|\d+\.?\s*recommendation|key recommendations?\b)",
    )
    .expect("section start pattern")
});

static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Z][A-Z\s]+:").expect("section heading pattern"));

static ITEM_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+\.?\d*\s|[•\-\*]\s|that\s)").expect("item start pattern")
});

static THAT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:recommends?\s+)?that\s+[^.]+\.").expect("that clause pattern")
});

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").expect("year pattern"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("ws pattern"));

#[derive(Debug, Clone)]
pub struct ExtractedReport {
    pub path: Utf8PathBuf,
    pub sector: String,
    pub year: Option<i32>,
    pub records: Vec<RawRecommendation>,
}

/// Find every recommendation section in `text`.
///
/// A section opens on a heading line ("RECOMMENDATIONS", "The Committee recommends",
/// "4. RECOMMENDATION", "Key recommendations") and runs until a blank line that is followed by
/// an upper-case heading ending in a colon, or until the next section opens.
pub fn find_recommendation_sections(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for (i, line) in lines.iter().enumerate() {
        if SECTION_START.is_match(line) {
            if let Some(done) = current.take() {
                sections.push(done.join("\n"));
            }
            current = Some(vec![line]);
            continue;
        }

        let Some(section) = current.as_mut() else {
            continue;
        };

        let closes = line.trim().is_empty()
            && lines
                .get(i + 1)
                .is_some_and(|next| SECTION_HEADING.is_match(next));
        if closes {
            if let Some(done) = current.take() {
                sections.push(done.join("\n"));
            }
        } else {
            section.push(line);
        }
    }

    if let Some(done) = current {
        sections.push(done.join("\n"));
    }
    sections
}

/// Split a section into individual items.
///
/// An item opens on a numbered line, a bulleted line or a line starting with "that"; following
/// lines continue it until a blank line. Lines before the first item are ignored, as are items of
/// 20 characters or fewer.
pub fn split_recommendations(section: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let flush = |current: &mut Vec<&str>, out: &mut Vec<String>| {
        if current.is_empty() {
            return;
        }
        let joined = current.join(" ");
        if joined.chars().count() > MIN_ITEM_CHARS {
            out.push(joined);
        }
        current.clear();
    };

    for raw in section.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut current, &mut out);
            continue;
        }
        if ITEM_START.is_match(line) {
            flush(&mut current, &mut out);
            current.push(line);
        } else if !current.is_empty() {
            current.push(line);
        }
    }
    flush(&mut current, &mut out);
    out
}

/// Every "(recommends) that ... ." clause longer than 30 characters.
pub fn that_clauses(text: &str) -> Vec<String> {
    THAT_CLAUSE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|s| s.chars().count() > MIN_CLAUSE_CHARS)
        .map(str::to_string)
        .collect()
}

/// The first run of four digits in a file name, read as a year.
pub fn year_from_file_name(name: &str) -> Option<i32> {
    YEAR.find(name).and_then(|m| m.as_str().parse().ok())
}

/// Segment one report's text into raw records.
pub fn extract_report(sector: &str, report: &str, year: Option<i32>, text: &str) -> Vec<RawRecommendation> {
    let mut items: Vec<String> = find_recommendation_sections(text)
        .iter()
        .flat_map(|s| split_recommendations(s))
        .collect();

    if items.is_empty() {
        debug!(report, "no recommendation sections, falling back to that-clauses");
        items = that_clauses(text);
    }

    items
        .into_iter()
        .map(|item| RawRecommendation {
            year,
            sector: sector.to_string(),
            report: report.to_string(),
            recommendation: WHITESPACE.replace_all(&item, " ").trim().to_string(),
            ..Default::default()
        })
        .collect()
}

/// Segment every `<dir>/<sector>/*.txt` report, in path order.
pub fn extract_dir(dir: &Utf8Path) -> anyhow::Result<Vec<ExtractedReport>> {
    let pattern = dir.join("*/*.txt");
    let pattern_str = pattern.as_str();
    debug!(pattern = %pattern_str, "scanning for report text");

    let mut paths = Vec::new();
    for entry in glob(pattern_str).context("glob <dir>/*/*.txt")? {
        let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| anyhow::anyhow!("non-utf8 path: {}", p.display()))?;
        paths.push(path);
    }
    paths.sort();

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let sector = path
            .parent()
            .and_then(|p| p.file_name())
            .unwrap_or("unknown")
            .to_string();
        let file_name = path.file_name().unwrap_or_default().to_string();
        let year = year_from_file_name(&file_name);
        let text = fs::read_to_string(&path).with_context(|| format!("read {path}"))?;

        let records = extract_report(&sector, &file_name, year, &text);
        info!(path = %path, sector = %sector, count = records.len(), "extracted recommendations");
        out.push(ExtractedReport {
            path,
            sector,
            year,
            records,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = "\
INTRODUCTION:
The committee met with the department.

RECOMMENDATIONS
The Committee recommends the following:
1. The Minister should report quarterly on progress with the turnaround plan.
2. The department must fill all vacant senior posts
   within six months of adoption of this report.
- ok
- The Auditor-General should audit procurement deviations annually.

CONCLUSION:
Nothing further.
";

    #[test]
    fn finds_section_and_stops_at_next_heading() {
        let sections = find_recommendation_sections(REPORT);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].starts_with("RECOMMENDATIONS"));
        assert!(sections[1].starts_with("The Committee recommends"));
        assert!(!sections[1].contains("Nothing further"));
    }

    #[test]
    fn splits_numbered_and_bulleted_items() {
        let sections = find_recommendation_sections(REPORT);
        let items = split_recommendations(&sections[1]);
        assert_eq!(
            items,
            vec![
                "1. The Minister should report quarterly on progress with the turnaround plan."
                    .to_string(),
                "2. The department must fill all vacant senior posts within six months of adoption of this report."
                    .to_string(),
                "- The Auditor-General should audit procurement deviations annually.".to_string(),
            ]
        );
    }

    #[test]
    fn falls_back_to_that_clauses() {
        let text = "The committee recommends that the Minister table a revised plan for the port. \
                    It notes that it is late.";
        let recs = extract_report("transport", "t_2022.txt", Some(2022), text);
        assert_eq!(recs.len(), 1);
        assert_eq!(
            recs[0].recommendation,
            "recommends that the Minister table a revised plan for the port."
        );
        assert_eq!(recs[0].year, Some(2022));
        assert_eq!(recs[0].sector, "transport");
    }

    #[test]
    fn year_is_first_four_digit_run() {
        assert_eq!(year_from_file_name("brrr_2021_energy_2020.txt"), Some(2021));
        assert_eq!(year_from_file_name("energy.txt"), None);
    }
}
