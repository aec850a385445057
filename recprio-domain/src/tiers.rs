use crate::rules::RuleError;
use recprio_types::scored::{FiscalTier, ReformTag, TierTag};
use recprio_types::{Score, ScoreCard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickWinThresholds {
    pub feasibility: u8,
    pub impact: u8,
    pub cost: u8,
}

impl Default for QuickWinThresholds {
    fn default() -> Self {
        Self {
            feasibility: 4,
            impact: 4,
            cost: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighPriorityThresholds {
    pub impact: u8,
    pub feasibility: u8,
    pub cost: u8,
    pub min_roi: f64,
}

impl Default for HighPriorityThresholds {
    fn default() -> Self {
        Self {
            impact: 4,
            feasibility: 3,
            cost: 3,
            min_roi: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiscallyOptimalThresholds {
    pub fiscal_feasibility: u8,
    pub impact: u8,
    pub feasibility: u8,
}

impl Default for FiscallyOptimalThresholds {
    fn default() -> Self {
        Self {
            fiscal_feasibility: 3,
            impact: 4,
            feasibility: 3,
        }
    }
}

/// Tier cut-offs. Each tier compares with `>=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub quick_win: QuickWinThresholds,
    pub high_priority: HighPriorityThresholds,
    pub fiscally_optimal: FiscallyOptimalThresholds,
}

const MAX_SCORE: u8 = 5;
const MAX_FISCAL_FEASIBILITY: u8 = 4;

impl TierThresholds {
    /// Reject cut-offs no record could ever reach.
    pub fn validate(&self) -> Result<(), RuleError> {
        let q = &self.quick_win;
        let h = &self.high_priority;
        let f = &self.fiscally_optimal;
        let checks = [
            ("tiers.quick_win", "feasibility", q.feasibility, MAX_SCORE),
            ("tiers.quick_win", "impact", q.impact, MAX_SCORE),
            ("tiers.quick_win", "cost", q.cost, MAX_SCORE),
            ("tiers.high_priority", "impact", h.impact, MAX_SCORE),
            ("tiers.high_priority", "feasibility", h.feasibility, MAX_SCORE),
            ("tiers.high_priority", "cost", h.cost, MAX_SCORE),
            (
                "tiers.fiscally_optimal",
                "fiscal_feasibility",
                f.fiscal_feasibility,
                MAX_FISCAL_FEASIBILITY,
            ),
            ("tiers.fiscally_optimal", "impact", f.impact, MAX_SCORE),
            ("tiers.fiscally_optimal", "feasibility", f.feasibility, MAX_SCORE),
        ];
        for (table, field, value, max) in checks {
            if !(1..=max).contains(&value) {
                return Err(RuleError::Invalid {
                    table: table.to_string(),
                    message: format!("{field} must be in 1..={max}, got {value}"),
                });
            }
        }
        if h.min_roi.is_nan() || h.min_roi > 10.0 {
            return Err(RuleError::Invalid {
                table: "tiers.high_priority".to_string(),
                message: format!("min_roi must be at most 10, got {}", h.min_roi),
            });
        }
        Ok(())
    }
}

/// What a tier rule sees of a record.
#[derive(Debug, Clone, Copy)]
pub struct TierInput<'a> {
    pub scores: &'a ScoreCard,
    pub reform_tags: &'a BTreeSet<ReformTag>,
    pub fiscal_feasibility: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierMeta {
    pub tag: TierTag,
    /// User-facing key, e.g. `quick-win`.
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub trait TierRule {
    fn meta(&self) -> TierMeta;
    fn applies(&self, input: &TierInput<'_>, thresholds: &TierThresholds) -> bool;
}

fn at_least(score: Score, min: u8) -> bool {
    score.get() >= min
}

struct QuickWin;

impl TierRule for QuickWin {
    fn meta(&self) -> TierMeta {
        TierMeta {
            tag: TierTag::QuickWin,
            key: "quick-win",
            title: "Quick win",
            description: r#"Can move now with existing resources.

Applies when feasibility >= 4, impact >= 4 and cost >= 4 (cost is inverted, so 4 means cheap).
A record scoring 5 on all three dimensions is always a quick win."#,
        }
    }

    fn applies(&self, input: &TierInput<'_>, t: &TierThresholds) -> bool {
        let q = &t.quick_win;
        at_least(input.scores.feasibility(), q.feasibility)
            && at_least(input.scores.impact(), q.impact)
            && at_least(input.scores.cost(), q.cost)
    }
}

struct HighPriority;

impl TierRule for HighPriority {
    fn meta(&self) -> TierMeta {
        TierMeta {
            tag: TierTag::HighPriority,
            key: "high-priority",
            title: "High priority",
            description: r#"High impact work worth scheduling ahead of the rest.

Applies when impact >= 4, feasibility >= 3, cost >= 3 and roi_score >= 1.0."#,
        }
    }

    fn applies(&self, input: &TierInput<'_>, t: &TierThresholds) -> bool {
        let h = &t.high_priority;
        at_least(input.scores.impact(), h.impact)
            && at_least(input.scores.feasibility(), h.feasibility)
            && at_least(input.scores.cost(), h.cost)
            && input.scores.roi_score() >= h.min_roi
    }
}

struct InstitutionalReform;

impl TierRule for InstitutionalReform {
    fn meta(&self) -> TierMeta {
        TierMeta {
            tag: TierTag::InstitutionalReform,
            key: "institutional-reform",
            title: "Institutional reform",
            description: r#"Needs a change to how institutions work rather than more of the same.

Applies when at least one reform tag matches: legislative, structural, governance, process,
capacity building, systems or policy."#,
        }
    }

    fn applies(&self, input: &TierInput<'_>, _t: &TierThresholds) -> bool {
        !input.reform_tags.is_empty()
    }
}

struct FiscallyOptimal;

impl TierRule for FiscallyOptimal {
    fn meta(&self) -> TierMeta {
        TierMeta {
            tag: TierTag::FiscallyOptimal,
            key: "fiscally-optimal",
            title: "Fiscally optimal",
            description: r#"Affordable under current fiscal constraints and still worth doing.

Applies when fiscal feasibility >= 3, impact >= 4 and feasibility >= 3."#,
        }
    }

    fn applies(&self, input: &TierInput<'_>, t: &TierThresholds) -> bool {
        let f = &t.fiscally_optimal;
        input.fiscal_feasibility >= f.fiscal_feasibility
            && at_least(input.scores.impact(), f.impact)
            && at_least(input.scores.feasibility(), f.feasibility)
    }
}

pub fn builtin_tier_rules() -> Vec<Box<dyn TierRule>> {
    vec![
        Box::new(QuickWin),
        Box::new(HighPriority),
        Box::new(InstitutionalReform),
        Box::new(FiscallyOptimal),
    ]
}

pub fn builtin_tier_metas() -> Vec<TierMeta> {
    builtin_tier_rules().iter().map(|r| r.meta()).collect()
}

/// Every tier whose rule applies. Tiers are independent memberships.
pub fn classify(
    rules: &[Box<dyn TierRule>],
    input: &TierInput<'_>,
    thresholds: &TierThresholds,
) -> BTreeSet<TierTag> {
    rules
        .iter()
        .filter(|r| r.applies(input, thresholds))
        .map(|r| r.meta().tag)
        .collect()
}

pub fn fiscal_tier(fiscal_feasibility: u8, impact: Score) -> FiscalTier {
    let impact = impact.get();
    match fiscal_feasibility {
        4 if impact >= 4 => FiscalTier::Immediate,
        ff if ff >= 3 && impact >= 4 => FiscalTier::NearTerm,
        ff if ff >= 3 && impact >= 3 => FiscalTier::MediumTerm,
        2 => FiscalTier::Phased,
        _ => FiscalTier::Future,
    }
}
