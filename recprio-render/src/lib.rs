//! Rendering helpers (markdown) for human-readable artifacts.

use recprio_types::scored::{ScoredDataset, ScoredRecommendation, ranked_by};
use recprio_types::summary::PrioritizationSummary;
use std::collections::BTreeMap;

/// How much of the dataset the policy memo lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoOptions {
    /// Quick wins listed in Part I.
    pub quick_wins: usize,
    /// High priority records listed per sector in Part II.
    pub per_sector: usize,
    /// Recommendation text is cut to this many characters.
    pub text_limit: usize,
}

impl Default for MemoOptions {
    fn default() -> Self {
        Self {
            quick_wins: 15,
            per_sector: 5,
            text_limit: 500,
        }
    }
}

const SUMMARY_TOP: usize = 20;
const SUMMARY_TEXT_LIMIT: usize = 300;

pub fn render_summary_md(dataset: &ScoredDataset, summary: &PrioritizationSummary) -> String {
    let mut out = String::new();
    out.push_str("# recprio summary\n\n");
    out.push_str(&format!(
        "- Recommendations scored: {}\n",
        summary.total_recommendations
    ));
    out.push_str(&format!("- Quick wins: {}\n", summary.quick_wins));
    out.push_str(&format!("- High priority: {}\n", summary.high_priority));
    out.push_str(&format!(
        "- Institutional reforms: {}\n",
        summary.institutional_reforms
    ));
    out.push_str(&format!("- Fiscally optimal: {}\n", summary.fiscally_optimal));
    out.push_str(&format!("- Rules fingerprint: `{}`\n\n", dataset.rules_fingerprint));

    if dataset.records.is_empty() {
        out.push_str("_No recommendations scored._\n");
        return out;
    }

    let avg = &summary.averages;
    out.push_str("## Averages\n\n");
    out.push_str("| Dimension | Mean |\n|---|---|\n");
    for (label, value) in [
        ("Feasibility", avg.feasibility),
        ("Impact", avg.impact),
        ("Cost", avg.cost),
        ("ROI", avg.roi),
        ("Growth priority", avg.growth_priority),
        ("Fiscal priority", avg.fiscal_priority),
        ("Political feasibility", avg.political_feasibility),
    ] {
        out.push_str(&format!("| {} | {:.2} |\n", label, value));
    }
    out.push('\n');

    out.push_str("## By sector\n\n");
    out.push_str("| Sector | Count | Quick wins | High priority | Avg ROI |\n|---|---|---|---|---|\n");
    for (sector, stat) in &summary.by_sector {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {:.2} |\n",
            sector, stat.count, stat.quick_wins, stat.high_priority, stat.avg_roi
        ));
    }
    out.push('\n');

    if !summary.by_year.is_empty() {
        out.push_str("## By year\n\n| Year | Count |\n|---|---|\n");
        for (year, count) in &summary.by_year {
            out.push_str(&format!("| {} | {} |\n", year, count));
        }
        out.push('\n');
    }

    count_table(&mut out, "By category", "Category", &summary.by_category);
    count_table(&mut out, "By fiscal tier", "Fiscal tier", &summary.by_fiscal_tier);
    count_table(
        &mut out,
        "By binding constraint",
        "Constraint",
        &summary.by_binding_constraint,
    );

    if !summary.themes.is_empty() {
        out.push_str("## Recurring themes\n\n| Theme | Count | Years |\n|---|---|---|\n");
        for t in &summary.themes {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                t.theme,
                t.count,
                year_span(&t.years)
            ));
        }
        out.push('\n');
    }

    out.push_str("## Top immediate action priorities\n\n");
    let quick_wins = ranked_by(
        dataset.records.iter().filter(|r| r.is_quick_win()),
        |r| r.scores.roi_score(),
    );
    if quick_wins.is_empty() {
        out.push_str("_No quick wins identified._\n");
        return out;
    }
    for (i, r) in quick_wins.iter().take(SUMMARY_TOP).enumerate() {
        out.push_str(&format!(
            "### {}. {} ({})\n\n",
            i + 1,
            r.sector.to_uppercase(),
            year_label(r.year)
        ));
        out.push_str(&score_line(r));
        out.push_str(&format!("\n\n{}\n\n", truncate(&r.text, SUMMARY_TEXT_LIMIT)));
    }

    out
}

pub fn render_memo_md(
    dataset: &ScoredDataset,
    summary: &PrioritizationSummary,
    opts: &MemoOptions,
) -> String {
    let mut out = String::new();
    out.push_str("# Economic reform agenda\n\n");
    out.push_str("## Data-driven recommendations from parliamentary budget reviews\n\n");
    out.push_str(&format!(
        "**Total recommendations analysed:** {}\n\n",
        summary.total_recommendations
    ));
    if let (Some(first), Some(last)) = (
        summary.by_year.keys().next(),
        summary.by_year.keys().next_back(),
    ) {
        out.push_str(&format!("**Reports covered:** {}-{}\n\n", first, last));
    }
    out.push_str("---\n\n");

    out.push_str("## Executive summary\n\n");
    out.push_str("Each recommendation is scored on:\n\n");
    out.push_str("- **Feasibility**: ease of implementation\n");
    out.push_str("- **Impact**: breadth and depth of economic and social benefit\n");
    out.push_str("- **Cost**: implementation resources required (higher is cheaper)\n");
    out.push_str("- **ROI**: impact times feasibility over cost, on a 1-10 scale\n\n");

    out.push_str("### Key findings\n\n");
    out.push_str(&format!(
        "1. **Quick wins identified:** {} recommendations with high impact, high feasibility and low cost\n",
        summary.quick_wins
    ));
    out.push_str(&format!(
        "2. **High priority actions:** {} recommendations meeting elevated thresholds across all dimensions\n",
        summary.high_priority
    ));
    out.push_str(&format!(
        "3. **Institutional reforms required:** {} recommendations require institutional or systemic change\n\n",
        summary.institutional_reforms
    ));

    out.push_str("### Persistent challenges\n\n");
    let persistent: Vec<_> = summary.themes.iter().filter(|t| t.is_persistent()).collect();
    if persistent.is_empty() {
        out.push_str("_No theme recurs across three or more years._\n\n");
    } else {
        for t in persistent {
            out.push_str(&format!(
                "- **{}**: {} recommendations across {} years ({})\n",
                t.theme,
                t.count,
                t.years.len(),
                year_span(&t.years)
            ));
        }
        out.push('\n');
    }
    out.push_str("---\n\n");

    out.push_str("## Part I: Immediate action priorities (quick wins)\n\n");
    let quick_wins = ranked_by(
        dataset.records.iter().filter(|r| r.is_quick_win()),
        |r| r.scores.roi_score(),
    );
    if quick_wins.is_empty() {
        out.push_str("_No quick wins identified._\n\n");
    }
    for (i, r) in quick_wins.iter().take(opts.quick_wins).enumerate() {
        out.push_str(&format!(
            "**{}. {} ({})**\n",
            i + 1,
            r.sector.to_uppercase(),
            year_label(r.year)
        ));
        out.push_str(&format!("- {}\n", score_line(r)));
        out.push_str(&format!(
            "- **Recommendation:** {}\n",
            truncate(&r.text, opts.text_limit)
        ));
        out.push_str(&format!("- **Category:** {}\n", r.category.label()));
        out.push_str(&format!(
            "- **Institutional reform required:** {}\n\n",
            reform_label(r)
        ));
    }
    out.push_str("---\n\n");

    out.push_str("## Part II: Sector-specific high priority reforms\n\n");
    let mut by_sector: BTreeMap<&str, Vec<&ScoredRecommendation>> = BTreeMap::new();
    for r in dataset.records.iter().filter(|r| r.is_high_priority()) {
        by_sector.entry(r.sector.as_str()).or_default().push(r);
    }
    if by_sector.is_empty() {
        out.push_str("_No high priority recommendations._\n\n");
    }
    for (sector, records) in by_sector {
        let name = if sector.is_empty() { "unknown" } else { sector };
        out.push_str(&format!("### {}\n\n", name.to_uppercase()));
        for r in ranked_by(records, |r| r.scores.roi_score())
            .into_iter()
            .take(opts.per_sector)
        {
            out.push_str(&format!(
                "**{} priority (ROI: {:.1}/10)**\n",
                year_label(r.year),
                r.scores.roi_score()
            ));
            out.push_str(&format!("  - {}\n", truncate(&r.text, opts.text_limit)));
            out.push_str(&format!(
                "  - *Impact: {}/5 | Cost: {}/5 | Institutional reform: {}*\n\n",
                r.scores.impact(),
                r.scores.cost(),
                reform_label(r)
            ));
        }
    }
    out.push_str("---\n\n");

    out.push_str("## Part III: Required institutional reforms\n\n");
    let mut reforms: BTreeMap<&str, u64> = BTreeMap::new();
    for r in &dataset.records {
        for tag in &r.institutional_reform_tags {
            *reforms.entry(tag.label()).or_default() += 1;
        }
    }
    if reforms.is_empty() {
        out.push_str("_No institutional reforms identified._\n\n");
    } else {
        for (label, count) in reforms {
            out.push_str(&format!("- **{}**: {} recommendations\n", label, count));
        }
        out.push('\n');
    }

    out.push_str("## Part IV: Fiscal sequencing\n\n");
    if summary.by_fiscal_tier.is_empty() {
        out.push_str("_No recommendations scored._\n");
    } else {
        for (tier, count) in &summary.by_fiscal_tier {
            out.push_str(&format!("- {}: {}\n", tier, count));
        }
    }

    out
}

fn count_table(out: &mut String, title: &str, column: &str, counts: &BTreeMap<String, u64>) {
    if counts.is_empty() {
        return;
    }
    out.push_str(&format!("## {}\n\n| {} | Count |\n|---|---|\n", title, column));
    for (label, count) in counts {
        out.push_str(&format!("| {} | {} |\n", label, count));
    }
    out.push('\n');
}

fn score_line(r: &ScoredRecommendation) -> String {
    format!(
        "**ROI: {:.1}/10** | Impact: {}/5 | Feasibility: {}/5 | Cost: {}/5",
        r.scores.roi_score(),
        r.scores.impact(),
        r.scores.feasibility(),
        r.scores.cost()
    )
}

fn reform_label(r: &ScoredRecommendation) -> String {
    if r.institutional_reform_tags.is_empty() {
        "No".to_string()
    } else {
        r.institutional_reform_tags
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn year_label(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| "undated".to_string())
}

fn year_span(years: &[i32]) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "-".to_string(),
    }
}

/// Cut to `limit` characters, marking the cut with `...`.
fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("héllo wörld", 4), "héll...");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exact", 5), "exact");
    }

    #[test]
    fn year_span_formats() {
        assert_eq!(year_span(&[]), "-");
        assert_eq!(year_span(&[2021]), "2021");
        assert_eq!(year_span(&[2019, 2021, 2024]), "2019-2024");
    }
}
