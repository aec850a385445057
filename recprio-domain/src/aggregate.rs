use crate::rules::{Ruleset, contains_any};
use recprio_types::round_to;
use recprio_types::scored::ScoredRecommendation;
use recprio_types::summary::{
    AverageScores, CountEntry, PrioritizationSummary, SectorStat, ThemeStat,
};
use std::collections::{BTreeMap, BTreeSet};

const TOP_LABELS: usize = 10;

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0u64), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { round_to(sum / n as f64, 2) }
}

fn bump(map: &mut BTreeMap<String, u64>, key: &str) {
    *map.entry(key.to_string()).or_default() += 1;
}

/// Labels by count descending, then label ascending.
fn ranked(counts: BTreeMap<String, u64>, limit: usize) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(label, count)| CountEntry { label, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(limit);
    entries
}

/// Recurring themes: how many records mention each theme, and in which years.
pub fn themes(rules: &Ruleset, records: &[ScoredRecommendation]) -> Vec<ThemeStat> {
    let lowered: Vec<String> = records.iter().map(|r| r.text.to_lowercase()).collect();
    let mut out: Vec<ThemeStat> = rules
        .tables()
        .themes
        .iter()
        .map(|theme| {
            let mut count = 0u64;
            let mut years = BTreeSet::new();
            for (rec, text) in records.iter().zip(&lowered) {
                if contains_any(text, &theme.keywords) {
                    count += 1;
                    if let Some(y) = rec.year {
                        years.insert(y);
                    }
                }
            }
            ThemeStat {
                theme: theme.name.clone(),
                count,
                years: years.into_iter().collect(),
            }
        })
        .filter(|t| t.count > 0)
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.theme.cmp(&b.theme)));
    out
}

pub fn summarize(rules: &Ruleset, records: &[ScoredRecommendation]) -> PrioritizationSummary {
    let mut summary = PrioritizationSummary {
        schema: recprio_types::schema::RECPRIO_SUMMARY_V1.to_string(),
        total_recommendations: records.len() as u64,
        ..Default::default()
    };

    let mut barriers = BTreeMap::new();
    let mut enablers = BTreeMap::new();
    let mut sector_roi: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for r in records {
        summary.quick_wins += u64::from(r.is_quick_win());
        summary.high_priority += u64::from(r.is_high_priority());
        summary.institutional_reforms += u64::from(r.is_institutional_reform());
        summary.fiscally_optimal += u64::from(r.is_fiscally_optimal());

        let sector = if r.sector.is_empty() { "unknown" } else { r.sector.as_str() };
        let stat = summary
            .by_sector
            .entry(sector.to_string())
            .or_insert_with(SectorStat::default);
        stat.count += 1;
        stat.quick_wins += u64::from(r.is_quick_win());
        stat.high_priority += u64::from(r.is_high_priority());
        sector_roi
            .entry(sector.to_string())
            .or_default()
            .push(r.scores.roi_score());

        if let Some(y) = r.year {
            *summary.by_year.entry(y).or_default() += 1;
        }
        bump(&mut summary.by_category, r.category.label());
        bump(&mut summary.by_fiscal_tier, r.fiscal.fiscal_tier.label());
        bump(
            &mut summary.by_binding_constraint,
            r.growth.binding_constraint.key(),
        );
        bump(&mut summary.by_political_level, r.political.level.key());
        bump(&mut summary.by_urgency, r.signals.urgency.key());
        for b in &r.political.barriers {
            bump(&mut barriers, b);
        }
        for e in &r.political.enablers {
            bump(&mut enablers, e);
        }
    }

    for (sector, rois) in sector_roi {
        if let Some(stat) = summary.by_sector.get_mut(&sector) {
            stat.avg_roi = mean(rois.into_iter());
        }
    }

    summary.averages = AverageScores {
        feasibility: mean(records.iter().map(|r| f64::from(r.scores.feasibility().get()))),
        impact: mean(records.iter().map(|r| f64::from(r.scores.impact().get()))),
        cost: mean(records.iter().map(|r| f64::from(r.scores.cost().get()))),
        roi: mean(records.iter().map(|r| r.scores.roi_score())),
        growth_priority: mean(records.iter().map(|r| r.growth.growth_priority_score)),
        fiscal_priority: mean(records.iter().map(|r| r.fiscal.fiscal_priority_score)),
        political_feasibility: mean(records.iter().map(|r| r.political.total_score)),
    };

    summary.themes = themes(rules, records);
    summary.top_barriers = ranked(barriers, TOP_LABELS);
    summary.top_enablers = ranked(enablers, TOP_LABELS);
    summary
}
