//! Rule explanation module for the `recprio explain` command.
//!
//! Provides detailed explanations of each scoring rule including:
//! - What the rule measures
//! - How the value is computed
//! - Which `recprio.toml` section tunes it

use recprio_domain::{TierMeta, builtin_tier_metas};
use recprio_types::scored::TierTag;
use std::sync::LazyLock;

/// Kind of rule an explanation describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// A 1-5 score read from the recommendation text.
    Dimension,
    /// A value computed from other scores.
    Derived,
    /// A tier membership. Tiers are independent; a record may carry any number of them.
    Tier,
    /// Supplementary analysis attached to each record.
    Overlay,
}

/// Information about a scoring rule.
#[derive(Debug, Clone)]
pub struct RuleExplanation {
    /// Short key for the rule (user-facing, e.g., "quick-win").
    pub key: &'static str,
    /// Field or tag name as it appears in `scored.json` (e.g., "quick_win").
    pub rule_id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    pub kind: RuleKind,
    /// What the rule measures and how it is computed.
    pub description: &'static str,
    /// Config sections that change the rule's outcome.
    pub config_sections: &'static [&'static str],
}

/// Registry of all rule explanations: score dimensions, tiers, then overlays.
///
/// Tier entries come from the tier rules' own metadata.
pub static RULE_REGISTRY: LazyLock<Vec<RuleExplanation>> = LazyLock::new(|| {
    SCORE_RULES
        .iter()
        .cloned()
        .chain(builtin_tier_metas().into_iter().map(tier_explanation))
        .chain(OVERLAY_RULES.iter().cloned())
        .collect()
});

fn tier_explanation(meta: TierMeta) -> RuleExplanation {
    RuleExplanation {
        key: meta.key,
        rule_id: meta.tag.key(),
        title: meta.title,
        kind: RuleKind::Tier,
        description: meta.description,
        config_sections: tier_config_sections(meta.tag),
    }
}

fn tier_config_sections(tag: TierTag) -> &'static [&'static str] {
    match tag {
        TierTag::QuickWin => &["[tiers.quick_win]"],
        TierTag::HighPriority => &["[tiers.high_priority]"],
        TierTag::InstitutionalReform => &["[rules.reforms]"],
        TierTag::FiscallyOptimal => &["[tiers.fiscally_optimal]"],
    }
}

static SCORE_RULES: &[RuleExplanation] = &[
    RuleExplanation {
        key: "feasibility",
        rule_id: "feasibility",
        title: "Feasibility",
        kind: RuleKind::Dimension,
        description: r#"How easily the recommendation can be acted on, from 1 (hardest) to 5.

Keyword groups are checked in order and the first group with a matching keyword wins:
- 5: reporting and information requests (report, submit, clarify, notify, ...)
- 4: improvements to existing work (improve, strengthen, coordinate, streamline, ...)
- 3: new programmes or reviews (develop, implement, establish, review, monitor, ...)
- 2: legislative or structural change (legislation, act, law, restructure, overhaul, ...)
- 1: large funding commitments (billion, significant funding, major investment, ...)

Text matching no group scores 3."#,
        config_sections: &["[rules.feasibility]"],
    },
    RuleExplanation {
        key: "impact",
        rule_id: "impact",
        title: "Impact",
        kind: RuleKind::Dimension,
        description: r#"How much difference the recommendation would make, from 1 to 5.

Starts at 3 and adds one point for each of:
- the sector is a high-impact sector (energy, finance, labour)
- a high-impact keyword (employment, economic growth, investment, ...)
- a broad-reach keyword (national, all, citizens, ...)
- an SME keyword (SME, small business, informal sector)

The result is capped at 5."#,
        config_sections: &["[rules.impact]"],
    },
    RuleExplanation {
        key: "cost",
        rule_id: "cost",
        title: "Cost",
        kind: RuleKind::Dimension,
        description: r#"Implementation cost on an inverted scale: 5 is cheapest, 1 most expensive.

- an amount in billions scores 1
- an amount in millions scores 2 above 100 million, 3 above 10 million, else 4
- otherwise activity keywords decide: expensive (infrastructure, build, ...) 1,
  moderate (system, technology, training programme, ...) 3, cheap (policy, regulation, ...) 5

Text matching nothing scores 3."#,
        config_sections: &["[rules.cost]"],
    },
    RuleExplanation {
        key: "roi",
        rule_id: "roi_score",
        title: "Return on investment",
        kind: RuleKind::Derived,
        description: r#"Combines the three dimensions into a single 1-10 score.

    raw = impact * feasibility / cost
    roi = clamp(round(1 + (raw - 0.2) / (25 - 0.2) * 9, 1), 1, 10)

0.2 and 25 are the smallest and largest values raw can take, so the map spans the whole
1-10 range. Cost is never below 1, so the division is always defined."#,
        config_sections: &[],
    },
];

static OVERLAY_RULES: &[RuleExplanation] = &[
    RuleExplanation {
        key: "fiscal-tier",
        rule_id: "fiscal_tier",
        title: "Fiscal tier",
        kind: RuleKind::Overlay,
        description: r#"Implementation horizon under the fiscal framework. Exactly one tier per record.

- tier_1_immediate: fiscal feasibility 4 and impact >= 4
- tier_2_near_term: fiscal feasibility >= 3 and impact >= 4
- tier_3_medium_term: fiscal feasibility >= 3 and impact >= 3
- tier_4_phased: fiscal feasibility 2
- tier_5_future: everything else

Fiscal feasibility (1-4) is 4 for fiscally neutral text, otherwise follows cost:
cost 5 gives 4, cost 4 gives 3, cost 3 gives 3 with efficiency keywords or 2 without,
and cost 2 or below gives 1."#,
        config_sections: &["[rules.fiscal]"],
    },
    RuleExplanation {
        key: "fiscal-priority",
        rule_id: "fiscal_priority_score",
        title: "Fiscal priority score",
        kind: RuleKind::Overlay,
        description: r#"Ranks records for the Fiscally Optimal sheet.

    score = roi * 0.4 + fiscal_feasibility * 2.0 + (1.5 if aligned with an MTBPS area)

Rounded to two decimals. Up to two MTBPS priority areas are recorded per record; a record
matching none is listed under General Reform."#,
        config_sections: &["[rules.fiscal]"],
    },
    RuleExplanation {
        key: "growth-priority",
        rule_id: "growth_priority_score",
        title: "Growth priority score",
        kind: RuleKind::Overlay,
        description: r#"Ranks records by how directly they relieve a growth bottleneck.

    score = 0.35 * elasticity + 0.25 * roi + 0.15 * feasibility
          + 0.15 * fiscal_weight * 4 + 0.10 * evidence_weight * 4 - blocker_penalty

Elasticity comes from the binding constraint: energy and logistics 5; permits, skills,
municipal, water and crime 4; competition and digital 3; anything else 2. A penalty of 0.2
applies when the blocker is legislation, institutional capacity or intergovernmental
coordination. Rounded to two decimals."#,
        config_sections: &["[rules.constraints]", "[rules.growth]"],
    },
    RuleExplanation {
        key: "political",
        rule_id: "political",
        title: "Political feasibility",
        kind: RuleKind::Overlay,
        description: r#"How easily the recommendation could get through the political process.

Seven factors in [0, 1] are read from the text: executive alignment, legislative complexity,
coordination complexity, stakeholder opposition, public support, fiscal implications and
time horizon. Their weighted sum (weights add up to 1.0) is rounded to three decimals and
mapped to a level. Factors below 0.4 are listed as barriers, factors at or above 0.7 as
enablers."#,
        config_sections: &["[rules.political]"],
    },
    RuleExplanation {
        key: "signals",
        rule_id: "signals",
        title: "Keyword signals",
        kind: RuleKind::Overlay,
        description: r#"Urgency and sentiment read from the wording.

Urgency counts urgency keywords (urgent, immediate, critical, ...) and is high once the
count reaches the configured threshold. Sentiment compares positive and negative keyword
counts and reports a label with a score rounded to three decimals."#,
        config_sections: &["[rules.signals]"],
    },
];

/// Look up a rule explanation by key or rule_id.
pub fn lookup_rule(query: &str) -> Option<&'static RuleExplanation> {
    let query_lower = query.to_lowercase();
    let query_normalized = query_lower.replace('_', "-");

    RULE_REGISTRY.iter().find(|rule| {
        rule.key == query_normalized
            || rule.rule_id == query_lower
            || rule.rule_id.replace('_', "-") == query_normalized
    })
}

/// List all available rule keys.
pub fn list_rule_keys() -> Vec<&'static str> {
    RULE_REGISTRY.iter().map(|r| r.key).collect()
}

/// Format a rule kind for display.
pub fn format_rule_kind(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::Dimension => "Dimension",
        RuleKind::Derived => "Derived",
        RuleKind::Tier => "Tier",
        RuleKind::Overlay => "Overlay",
    }
}
