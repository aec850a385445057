use crate::rules::{KeywordGroup, Ruleset, contains_any};
use recprio_types::scored::{Category, ReformTag};
use recprio_types::{Score, ScoreCard};
use std::collections::BTreeSet;

/// Lowercased views of the fields the rules look at, built once per record.
#[derive(Debug, Clone)]
pub struct TextView {
    pub text: String,
    pub sector: String,
}

impl TextView {
    pub fn new(text: &str, sector: &str) -> Self {
        Self {
            text: text.to_lowercase(),
            sector: sector.trim().to_lowercase(),
        }
    }
}

fn first_group(text: &str, groups: &[KeywordGroup]) -> Option<u8> {
    groups
        .iter()
        .find(|g| contains_any(text, &g.keywords))
        .map(|g| g.score)
}

/// Ease of implementation, 5 = administrative.
pub fn feasibility(rules: &Ruleset, view: &TextView) -> Score {
    let t = &rules.tables().feasibility;
    let raw = first_group(&view.text, &t.groups).unwrap_or(t.default);
    Score::saturating(i64::from(raw))
}

pub fn impact(rules: &Ruleset, view: &TextView) -> Score {
    let t = &rules.tables().impact;
    let mut impact = i64::from(t.base);
    if t.sectors.iter().any(|s| *s == view.sector) {
        impact += 1;
    }
    if contains_any(&view.text, &t.high_impact) {
        impact += 1;
    }
    if contains_any(&view.text, &t.broad_reach) {
        impact += 1;
    }
    if contains_any(&view.text, &t.sme) {
        impact += 1;
    }
    Score::saturating(impact)
}

/// Implementation cost, 5 = cheapest.
///
/// Stated amounts win over activity keywords: any "N billion" scores lowest, "N million" is
/// banded by N, and only then are activity groups tried in order.
pub fn cost(rules: &Ruleset, view: &TextView) -> Score {
    let t = &rules.tables().cost;

    if rules.billion.is_match(&view.text) {
        return Score::saturating(i64::from(t.billion_score));
    }

    if let Some(caps) = rules.million.captures(&view.text) {
        // An amount too large for u64 is still an amount.
        let amount = caps
            .get(1)
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .unwrap_or(0);
        let score = t
            .million_bands
            .iter()
            .find(|b| amount > b.above)
            .map(|b| b.score)
            .unwrap_or(t.million_floor);
        return Score::saturating(i64::from(score));
    }

    let raw = first_group(&view.text, &t.activities).unwrap_or(t.default);
    Score::saturating(i64::from(raw))
}

pub fn score_card(rules: &Ruleset, view: &TextView) -> ScoreCard {
    ScoreCard::new(feasibility(rules, view), impact(rules, view), cost(rules, view))
}

/// First matching category group, or [`Category::Other`].
pub fn classify_category(rules: &Ruleset, text_lower: &str) -> Category {
    rules
        .tables()
        .categories
        .iter()
        .find(|r| contains_any(text_lower, &r.keywords))
        .map(|r| r.category)
        .unwrap_or(Category::Other)
}

/// Every reform type with at least one matching keyword.
pub fn reform_tags(rules: &Ruleset, text_lower: &str) -> BTreeSet<ReformTag> {
    rules
        .tables()
        .reforms
        .iter()
        .filter(|r| contains_any(text_lower, &r.keywords))
        .map(|r| r.tag)
        .collect()
}
