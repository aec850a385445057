//! Political-economy feasibility: seven factors in `[0, 1]`, a weighted total and a level.
//!
//! Every factor is oriented so that higher means easier to get done.

use crate::rules::{Ruleset, count_matches};
use crate::scoring::TextView;
use recprio_types::round_to;
use recprio_types::scored::{FeasibilityLevel, PoliticalAssessment, PoliticalFactors};
use regex::Regex;

const BARRIER_BELOW: f64 = 0.4;
const ENABLER_AT: f64 = 0.7;

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

fn match_count(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(text)).count()
}

fn executive_alignment(rules: &Ruleset, view: &TextView) -> f64 {
    let t = &rules.tables().political;
    let mut score: f64 = 0.5;
    for area in &t.executive_priorities {
        match count_matches(&view.text, &area.keywords) {
            0 => {}
            1 => score += 0.08,
            _ => score += 0.15,
        }
    }
    if t
        .priority_sectors
        .iter()
        .any(|s| view.sector.contains(s.as_str()))
    {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

pub fn factors(rules: &Ruleset, view: &TextView) -> PoliticalFactors {
    let p = &rules.political;
    let text = view.text.as_str();

    let legislative_complexity = if any_match(&p.requires_legislation, text) {
        0.2
    } else if any_match(&p.administrative_only, text) {
        0.9
    } else {
        0.5
    };

    let coordination_complexity = if any_match(&p.inter_departmental, text) {
        0.3
    } else {
        0.7
    };

    let stakeholder_opposition = match match_count(&p.stakeholder_opposition, text) {
        0 => 0.7,
        1 => 0.4,
        _ => 0.2,
    };

    let public_support = match match_count(&p.public_support, text) {
        0 => 0.5,
        1 | 2 => 0.7,
        _ => 0.9,
    };

    let fiscal_implications = if any_match(&p.high_cost, text) {
        0.2
    } else if any_match(&p.low_cost, text) {
        0.9
    } else {
        0.5
    };

    let time_horizon = if any_match(&p.quick_implementation, text) {
        0.9
    } else if any_match(&p.long_term, text) {
        0.3
    } else {
        0.5
    };

    PoliticalFactors {
        executive_alignment: executive_alignment(rules, view),
        legislative_complexity,
        coordination_complexity,
        stakeholder_opposition,
        public_support,
        fiscal_implications,
        time_horizon,
    }
}

pub fn assess(rules: &Ruleset, view: &TextView) -> PoliticalAssessment {
    let f = factors(rules, view);
    let w = &rules.tables().political.weights;

    let total = f.executive_alignment * w.executive_alignment
        + f.legislative_complexity * w.legislative_complexity
        + f.coordination_complexity * w.coordination_complexity
        + f.stakeholder_opposition * w.stakeholder_opposition
        + f.public_support * w.public_support
        + f.fiscal_implications * w.fiscal_implications
        + f.time_horizon * w.time_horizon;

    let barriers = [
        (f.legislative_complexity, "Requires legislative change"),
        (
            f.coordination_complexity,
            "Requires inter-departmental coordination",
        ),
        (f.stakeholder_opposition, "Likely stakeholder opposition"),
        (f.fiscal_implications, "High implementation cost"),
        (f.time_horizon, "Long implementation timeline"),
    ]
    .into_iter()
    .filter(|(v, _)| *v < BARRIER_BELOW)
    .map(|(_, label)| label.to_string())
    .collect();

    let enablers = [
        (f.executive_alignment, "Aligned with Executive priorities"),
        (f.legislative_complexity, "Administrative change only"),
        (f.public_support, "High public support likely"),
        (f.fiscal_implications, "Low/no additional funding needed"),
        (f.time_horizon, "Quick implementation possible"),
    ]
    .into_iter()
    .filter(|(v, _)| *v >= ENABLER_AT)
    .map(|(_, label)| label.to_string())
    .collect();

    // Level uses the unrounded total.
    PoliticalAssessment {
        total_score: round_to(total, 3),
        level: FeasibilityLevel::from_score(total),
        factors: f,
        barriers,
        enablers,
    }
}
