use crate::rules::{Ruleset, contains_any, count_matches};
use crate::scoring::TextView;
use recprio_types::scored::{
    BindingConstraint, EvidenceConfidence, FiscalImpact, FiscalOverlay, GrowthOverlay,
    KeywordSignals, Sentiment, TextFacts, Urgency,
};
use recprio_types::{ScoreCard, round_to};
use regex::{Captures, Regex};
use std::ops::Range;

/// Overlay hints carried on an input record. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayHints {
    pub fiscal_impact: Option<FiscalImpact>,
    pub evidence_confidence: Option<EvidenceConfidence>,
    pub blocker_type: Option<String>,
}

/// Fiscal feasibility on a 1-4 scale, 4 = fiscally neutral.
pub fn fiscal_feasibility(rules: &Ruleset, text_lower: &str, scores: &ScoreCard) -> u8 {
    let t = &rules.tables().fiscal;
    if contains_any(text_lower, &t.neutral) {
        return 4;
    }
    match scores.cost().get() {
        5 => 4,
        4 => 3,
        3 if contains_any(text_lower, &t.efficiency) => 3,
        3 => 2,
        _ => 1,
    }
}

/// Matched MTBPS priority areas in table order, capped.
pub fn mtbps_alignment(rules: &Ruleset, text_lower: &str) -> Vec<String> {
    let t = &rules.tables().fiscal;
    t.alignment
        .iter()
        .filter(|a| contains_any(text_lower, &a.keywords))
        .take(t.max_alignment)
        .map(|a| a.name.clone())
        .collect()
}

pub fn fiscal_overlay(rules: &Ruleset, view: &TextView, scores: &ScoreCard) -> FiscalOverlay {
    let ff = fiscal_feasibility(rules, &view.text, scores);
    let alignment = mtbps_alignment(rules, &view.text);
    let bonus = if alignment.is_empty() {
        0.0
    } else {
        rules.tables().fiscal.alignment_bonus
    };
    let fiscal_priority_score = round_to(scores.roi_score() * 0.4 + f64::from(ff) * 2.0 + bonus, 2);

    FiscalOverlay {
        fiscal_feasibility: ff,
        fiscal_tier: crate::tiers::fiscal_tier(ff, scores.impact()),
        fiscal_priority_score,
        mtbps_alignment: alignment,
    }
}

/// First matching constraint group and its elasticity.
pub fn binding_constraint(rules: &Ruleset, text_lower: &str) -> (BindingConstraint, u8) {
    let t = &rules.tables().constraints;
    t.groups
        .iter()
        .find(|g| contains_any(text_lower, &g.keywords))
        .map(|g| (g.constraint, g.elasticity))
        .unwrap_or((BindingConstraint::Other, t.other_elasticity))
}

pub fn growth_overlay(
    rules: &Ruleset,
    view: &TextView,
    scores: &ScoreCard,
    hints: &OverlayHints,
) -> GrowthOverlay {
    let g = &rules.tables().growth;
    let (constraint, elasticity) = binding_constraint(rules, &view.text);
    let fiscal_impact = hints.fiscal_impact.unwrap_or_default();
    let evidence = hints.evidence_confidence.unwrap_or_default();

    let fiscal_weight = match fiscal_impact {
        FiscalImpact::Savings => g.fiscal_weights.savings,
        FiscalImpact::Neutral => g.fiscal_weights.neutral,
        FiscalImpact::LowCost => g.fiscal_weights.low_cost,
        FiscalImpact::CapexHeavy => g.fiscal_weights.capex_heavy,
    };
    let evidence_weight = match evidence {
        EvidenceConfidence::High => g.evidence_weights.high,
        EvidenceConfidence::Medium => g.evidence_weights.medium,
        EvidenceConfidence::Low => g.evidence_weights.low,
    };
    let penalty = match &hints.blocker_type {
        Some(b) if g.penalized_blockers.contains(&b.to_lowercase()) => g.blocker_penalty,
        _ => 0.0,
    };

    let score = 0.35 * f64::from(elasticity)
        + 0.25 * scores.roi_score()
        + 0.15 * f64::from(scores.feasibility().get())
        + 0.15 * fiscal_weight * 4.0
        + 0.10 * evidence_weight * 4.0
        - penalty;

    GrowthOverlay {
        binding_constraint: constraint,
        growth_elasticity: elasticity,
        fiscal_impact,
        evidence_confidence: evidence,
        blocker_type: hints.blocker_type.clone(),
        growth_priority_score: round_to(score, 2),
    }
}

/// Keyword urgency and sentiment. Each indicator counts once, however often it appears.
pub fn keyword_signals(rules: &Ruleset, text_lower: &str) -> KeywordSignals {
    let t = &rules.tables().signals;
    let positive = count_matches(text_lower, &t.positive);
    let negative = count_matches(text_lower, &t.negative);
    let urgency_count = count_matches(text_lower, &t.urgency) as u32;

    let total = positive + negative;
    let sentiment_score = if total == 0 {
        0.0
    } else {
        (positive as f64 - negative as f64) / total as f64
    };
    let sentiment = if sentiment_score > 0.2 {
        Sentiment::Positive
    } else if sentiment_score < -0.2 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };
    let urgency = if urgency_count >= t.high_urgency_at {
        Urgency::High
    } else if urgency_count >= 1 {
        Urgency::Medium
    } else {
        Urgency::Low
    };

    KeywordSignals {
        urgency,
        urgency_count,
        sentiment,
        sentiment_score: round_to(sentiment_score, 3),
    }
}

fn span(caps: &Captures<'_>) -> Range<usize> {
    caps.get(0).map_or(0..0, |m| m.range())
}

/// Matches of every pattern in table order, dropping any that overlap an earlier match, sorted
/// by position in the text.
fn first_matches<'t>(patterns: &[Regex], text: &'t str) -> Vec<Captures<'t>> {
    let mut taken: Vec<Captures<'t>> = Vec::new();
    for re in patterns {
        for caps in re.captures_iter(text) {
            let here = span(&caps);
            let free = taken.iter().all(|t| {
                let there = span(t);
                here.end <= there.start || here.start >= there.end
            });
            if free {
                taken.push(caps);
            }
        }
    }
    taken.sort_by_key(|c| span(c).start);
    taken
}

fn rand_value(caps: &Captures<'_>) -> Option<f64> {
    let amount: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let unit = caps.get(2).map(|m| m.as_str().to_lowercase());
    let scale = match unit.as_deref() {
        Some("billion" | "bn") => 1e9,
        Some("million" | "m") => 1e6,
        Some("thousand" | "k") => 1e3,
        _ => 1.0,
    };
    Some(round_to(amount * scale, 2))
}

/// Quoted rand amounts and time references.
pub fn text_facts(rules: &Ruleset, text_lower: &str) -> TextFacts {
    let monetary_values = first_matches(&rules.facts.money, text_lower)
        .iter()
        .filter_map(rand_value)
        .collect();

    let mut timeframes: Vec<String> = Vec::new();
    for caps in first_matches(&rules.facts.timeframes, text_lower) {
        let found = caps.get(0).map_or("", |m| m.as_str()).trim();
        if !found.is_empty() && !timeframes.iter().any(|t| t == found) {
            timeframes.push(found.to_string());
        }
    }

    TextFacts {
        monetary_values,
        timeframes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::score_card;
    use recprio_types::Score;
    use recprio_types::scored::FiscalTier;

    fn rules() -> Ruleset {
        Ruleset::builtin().expect("rules")
    }

    fn card(f: u8, i: u8, c: u8) -> ScoreCard {
        let s = |v| Score::new(v).expect("score");
        ScoreCard::new(s(f), s(i), s(c))
    }

    #[test]
    fn fiscal_feasibility_ladder() {
        let r = rules();
        assert_eq!(fiscal_feasibility(&r, "strengthen oversight", &card(3, 3, 1)), 4);
        assert_eq!(fiscal_feasibility(&r, "xyz", &card(3, 3, 5)), 4);
        assert_eq!(fiscal_feasibility(&r, "xyz", &card(3, 3, 4)), 3);
        assert_eq!(fiscal_feasibility(&r, "automation of xyz", &card(3, 3, 3)), 3);
        assert_eq!(fiscal_feasibility(&r, "xyz", &card(3, 3, 3)), 2);
        assert_eq!(fiscal_feasibility(&r, "xyz", &card(3, 3, 2)), 1);
    }

    #[test]
    fn alignment_keeps_first_two_in_table_order() {
        let r = rules();
        let areas = mtbps_alignment(&r, "employment in eskom electricity and tax");
        assert_eq!(areas, vec!["Energy".to_string(), "Tax Admin".to_string()]);
        assert!(mtbps_alignment(&r, "xyz").is_empty());
    }

    #[test]
    fn fiscal_priority_score_formula() {
        let r = rules();
        let view = TextView::new("Improve tax compliance", "finance");
        let scores = card(4, 4, 5);
        let overlay = fiscal_overlay(&r, &view, &scores);
        // roi(4,4,5) = 1 + (3.2 - 0.2) / 24.8 * 9 = 2.09 -> 2.1; 0.84 + 8.0 + 1.5
        assert_eq!(overlay.fiscal_feasibility, 4);
        assert_eq!(overlay.fiscal_priority_score, 10.34);
        assert_eq!(overlay.fiscal_tier, FiscalTier::Immediate);
        assert_eq!(overlay.alignment_label(), "Tax Admin");
    }

    #[test]
    fn binding_constraint_first_match() {
        let r = rules();
        assert_eq!(
            binding_constraint(&r, "eskom port congestion"),
            (BindingConstraint::Energy, 5)
        );
        assert_eq!(binding_constraint(&r, "xyz"), (BindingConstraint::Other, 2));
    }

    #[test]
    fn facts_pick_up_amounts_and_time_references_in_order() {
        let r = rules();
        let text = "The department must spend R1,500 million and 2.3 billion rand by 2025/26 \
                    within 6 months, and report by 2027.";
        let facts = text_facts(&r, &text.to_lowercase());
        assert_eq!(facts.monetary_values, vec![1_500_000_000.0, 2_300_000_000.0]);
        assert_eq!(
            facts.timeframes,
            vec!["by", "2025/26", "within", "6 months", "2027"]
        );
        assert_eq!(facts.largest_amount(), Some(2_300_000_000.0));
    }

    #[test]
    fn facts_ignore_r_inside_words_and_plain_numbers() {
        let r = rules();
        let facts = text_facts(&r, "appoint four 20 officials for 12 regions");
        assert!(facts.monetary_values.is_empty());
        assert!(facts.timeframes.is_empty());

        let facts = text_facts(&r, "a grant of r250k and r5m");
        assert_eq!(facts.monetary_values, vec![250_000.0, 5_000_000.0]);
    }

    #[test]
    fn growth_score_defaults_and_penalty() {
        let r = rules();
        let view = TextView::new("Xyz", "");
        let scores = card(3, 3, 3);
        let base = growth_overlay(&r, &view, &scores, &OverlayHints::default());
        // 0.35*2 + 0.25*2.0 + 0.15*3 + 0.15*0.8*4 + 0.10*0.7*4 = 2.41
        assert_eq!(base.growth_priority_score, 2.41);
        assert_eq!(base.fiscal_impact, FiscalImpact::Neutral);

        let hints = OverlayHints {
            fiscal_impact: Some(FiscalImpact::CapexHeavy),
            evidence_confidence: Some(EvidenceConfidence::High),
            blocker_type: Some("Legislation".to_string()),
        };
        let penalized = growth_overlay(&r, &view, &scores, &hints);
        // 0.7 + 0.5 + 0.45 + 0.06 + 0.4 - 0.2 = 1.91
        assert_eq!(penalized.growth_priority_score, 1.91);
        assert_eq!(penalized.blocker_type.as_deref(), Some("Legislation"));
    }

    #[test]
    fn signals_levels() {
        let r = rules();
        let s = keyword_signals(&r, "urgent and critical: we must act");
        assert_eq!(s.urgency, Urgency::High);
        assert_eq!(s.urgency_count, 3);

        let s = keyword_signals(&r, "concern about failure and delay");
        assert_eq!(s.sentiment, Sentiment::Negative);
        assert_eq!(s.sentiment_score, -1.0);

        let s = keyword_signals(&r, "xyz");
        assert_eq!(s.urgency, Urgency::Low);
        assert_eq!(s.sentiment, Sentiment::Neutral);
        assert_eq!(s.sentiment_score, 0.0);
    }

    #[test]
    fn overlays_follow_scores() {
        let r = rules();
        let view = TextView::new("Report on eskom load shedding", "energy");
        let scores = score_card(&r, &view);
        let growth = growth_overlay(&r, &view, &scores, &OverlayHints::default());
        assert_eq!(growth.binding_constraint, BindingConstraint::Energy);
        assert_eq!(growth.growth_elasticity, 5);
    }
}
